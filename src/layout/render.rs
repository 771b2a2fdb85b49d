use anyhow::{Context, Result, anyhow};
use image::RgbaImage;
use resvg::render;
use tiny_skia::Pixmap;
use tracing::{debug, warn};
use usvg::{Options, Tree};

use super::fit::{LayoutPlan, plan_layout};
use super::font::FontResource;
use crate::region::BBox;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayStyle {
    pub text_color: String,
    pub fill_color: String,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            text_color: "#000000".to_string(),
            fill_color: "#ffffff".to_string(),
        }
    }
}

/// Draws translated text into page regions. Shared read-only across pages.
#[derive(Clone)]
pub struct Typesetter {
    fonts: FontResource,
    style: OverlayStyle,
}

impl Typesetter {
    pub fn new(fonts: FontResource, style: OverlayStyle) -> Self {
        Self { fonts, style }
    }

    pub fn fonts(&self) -> &FontResource {
        &self.fonts
    }

    /// Blanks `bbox` and draws `text` centered inside it.
    ///
    /// The box is clamped to the image first; a box with no overlap is skipped.
    /// Returns the plan that was drawn, or `None` when nothing was drawn.
    pub fn render(
        &self,
        image: &mut RgbaImage,
        bbox: &BBox,
        text: &str,
        multiplier: f32,
    ) -> Option<LayoutPlan> {
        let Some(target) = bbox.clamp_to(image.width(), image.height()) else {
            warn!(
                "region {:?} lies outside the {}x{} page; skipped",
                bbox,
                image.width(),
                image.height()
            );
            return None;
        };
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let (width, height) = (target.width(), target.height());
        let plan = plan_layout(width, height, text, multiplier, self.fonts.metrics());
        if plan.overflows {
            debug!(
                "text still overflows {}x{} at {}px: {}",
                width, height, plan.font_size, text
            );
        }

        match self.rasterize(width, height, &plan) {
            Ok(patch) => {
                image::imageops::replace(image, &patch, target.x1 as i64, target.y1 as i64);
                Some(plan)
            }
            Err(err) => {
                warn!("failed to draw region {:?}: {:#}", target, err);
                None
            }
        }
    }

    fn rasterize(&self, width: u32, height: u32, plan: &LayoutPlan) -> Result<RgbaImage> {
        let svg = build_svg(width, height, plan, &self.style, self.fonts.family());
        let options = Options {
            fontdb: self.fonts.database(),
            ..Options::default()
        };
        let tree = Tree::from_str(&svg, &options).with_context(|| "failed to parse SVG")?;
        let mut pixmap =
            Pixmap::new(width, height).ok_or_else(|| anyhow!("empty region size"))?;
        let mut pixmap_mut = pixmap.as_mut();
        render(&tree, tiny_skia::Transform::identity(), &mut pixmap_mut);
        RgbaImage::from_raw(width, height, pixmap.take())
            .ok_or_else(|| anyhow!("failed to build image buffer from SVG"))
    }
}

/// An opaque box in the fill color with the plan's lines centered on it.
fn build_svg(
    width: u32,
    height: u32,
    plan: &LayoutPlan,
    style: &OverlayStyle,
    family: Option<&str>,
) -> String {
    let mut svg = String::new();
    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = width,
        h = height
    ));
    svg.push_str(&format!(
        r#"<rect x="0" y="0" width="{w}" height="{h}" fill="{fill}"/>"#,
        w = width,
        h = height,
        fill = escape_xml(&style.fill_color)
    ));

    let center_x = width as f32 / 2.0;
    let top = (height as f32 - plan.block_height) / 2.0;
    let family = family.unwrap_or("sans-serif");
    svg.push_str(&format!(
        r#"<text font-size="{size}" fill="{color}" font-family="{family}" text-anchor="middle">"#,
        size = plan.font_size,
        color = escape_xml(&style.text_color),
        family = escape_xml(family)
    ));
    for (idx, line) in plan.lines.iter().enumerate() {
        let baseline = top + plan.line_height * idx as f32 + plan.font_size;
        svg.push_str(&format!(
            r#"<tspan x="{x}" y="{y}">{text}</tspan>"#,
            x = center_x,
            y = baseline,
            text = escape_xml(line)
        ));
    }
    svg.push_str("</text></svg>");
    svg
}

fn escape_xml(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn page(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba([40, 40, 40, 255]))
    }

    fn typesetter() -> Typesetter {
        Typesetter::new(FontResource::bundled(), OverlayStyle::default())
    }

    #[test]
    fn blanks_the_box_and_leaves_the_rest() {
        let mut image = page(300, 200);
        let bbox = BBox::new(50, 40, 250, 160).expect("bbox");
        let plan = typesetter().render(&mut image, &bbox, "ARE YOU OKAY?", 1.0);
        assert!(plan.is_some());

        assert_eq!(image.get_pixel(52, 42), &Rgba([255, 255, 255, 255]));
        assert_eq!(image.get_pixel(248, 158), &Rgba([255, 255, 255, 255]));
        assert_eq!(image.get_pixel(49, 39), &Rgba([40, 40, 40, 255]));
        assert_eq!(image.get_pixel(250, 100), &Rgba([40, 40, 40, 255]));
        assert_eq!(image.get_pixel(150, 160), &Rgba([40, 40, 40, 255]));
    }

    #[test]
    fn text_is_drawn_inside_the_box() {
        let mut image = page(300, 200);
        let bbox = BBox::new(50, 40, 250, 160).expect("bbox");
        typesetter()
            .render(&mut image, &bbox, "STOP IT!", 1.0)
            .expect("plan");

        let dark = (40..160)
            .flat_map(|y| (50..250).map(move |x| (x, y)))
            .filter(|&(x, y)| image.get_pixel(x, y)[0] < 128)
            .count();
        assert!(dark > 50, "expected glyph pixels, found {dark}");
    }

    #[test]
    fn boxes_past_the_edge_are_clamped() {
        let mut image = page(100, 100);
        let bbox = BBox::new(60, 60, 400, 400).expect("bbox");
        assert!(typesetter().render(&mut image, &bbox, "HEY", 1.0).is_some());
        assert_eq!(image.get_pixel(99, 99), &Rgba([255, 255, 255, 255]));
        assert_eq!(image.get_pixel(59, 59), &Rgba([40, 40, 40, 255]));
    }

    #[test]
    fn boxes_outside_the_page_are_skipped() {
        let mut image = page(100, 100);
        let before = image.clone();
        let bbox = BBox::new(150, 150, 300, 300).expect("bbox");
        assert!(typesetter().render(&mut image, &bbox, "HEY", 1.0).is_none());
        assert_eq!(image, before);
    }

    #[test]
    fn empty_text_draws_nothing() {
        let mut image = page(100, 100);
        let before = image.clone();
        let bbox = BBox::new(10, 10, 90, 90).expect("bbox");
        assert!(typesetter().render(&mut image, &bbox, "  ", 1.0).is_none());
        assert_eq!(image, before);
    }

    #[test]
    fn svg_escapes_text_and_centers_lines() {
        let plan = plan_layout(200, 100, "TOM & JERRY <3", 1.0, None);
        let svg = build_svg(200, 100, &plan, &OverlayStyle::default(), Some("Wild Words"));
        assert!(svg.contains("TOM &amp; JERRY &lt;3"));
        assert!(svg.contains(r#"text-anchor="middle""#));
        assert!(svg.contains(r#"font-family="Wild Words""#));
        assert!(svg.contains(r#"x="100""#));
    }
}
