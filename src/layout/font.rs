use anyhow::{Context, Result, anyhow};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};
use ttf_parser::{Face, name_id};
use usvg::fontdb;

/// Face used when neither the configured font nor any system fallback
/// resolves, so text is always drawn.
const BUNDLED_FONT: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans-Bold.ttf");

#[derive(Clone)]
pub struct FontMetrics {
    data: Arc<Vec<u8>>,
    units_per_em: u16,
    space_advance: u16,
    family: Option<String>,
    face_index: u32,
}

impl FontMetrics {
    pub fn family(&self) -> Option<&str> {
        self.family.as_deref()
    }

    pub fn data(&self) -> &[u8] {
        self.data.as_ref()
    }
}

impl std::fmt::Debug for FontMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontMetrics")
            .field("family", &self.family)
            .field("units_per_em", &self.units_per_em)
            .field("face_index", &self.face_index)
            .finish()
    }
}

/// Fonts for one run: the rasterizer database plus, when a face could be
/// resolved, its family name and advance metrics.
#[derive(Clone)]
pub struct FontResource {
    db: Arc<fontdb::Database>,
    family: Option<String>,
    metrics: Option<FontMetrics>,
}

impl FontResource {
    /// Loads `font_path` if given, else the first of `font_family` and the
    /// platform fallbacks found among system fonts, else the bundled face.
    /// Never fails.
    pub fn load(font_path: Option<&Path>, font_family: Option<&str>) -> Self {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();

        if let Some(path) = font_path {
            match load_font_metrics(path) {
                Ok(metrics) => {
                    db.load_font_data(metrics.data().to_vec());
                    let family = metrics
                        .family()
                        .map(|name| name.to_string())
                        .or_else(|| font_family.map(|name| name.to_string()));
                    debug!("using font {} ({:?})", path.display(), family);
                    return Self {
                        db: Arc::new(db),
                        family,
                        metrics: Some(metrics),
                    };
                }
                Err(err) => warn!("{:#}; falling back to system fonts", err),
            }
        }

        let candidates = font_family
            .into_iter()
            .chain(fallback_fonts().iter().copied());
        for candidate in candidates {
            match load_font_metrics_from_family(&db, candidate) {
                Ok(metrics) => {
                    let family = metrics
                        .family()
                        .map(|name| name.to_string())
                        .unwrap_or_else(|| candidate.to_string());
                    debug!("using system font {}", family);
                    return Self {
                        db: Arc::new(db),
                        family: Some(family),
                        metrics: Some(metrics),
                    };
                }
                Err(err) => debug!("{:#}", err),
            }
        }

        warn!("no usable system font found; using the bundled font");
        with_bundled_font(db)
    }

    /// Only the bundled face, without scanning system fonts.
    pub fn bundled() -> Self {
        with_bundled_font(fontdb::Database::new())
    }

    pub fn database(&self) -> Arc<fontdb::Database> {
        Arc::clone(&self.db)
    }

    pub fn family(&self) -> Option<&str> {
        self.family.as_deref()
    }

    pub fn metrics(&self) -> Option<&FontMetrics> {
        self.metrics.as_ref()
    }
}

fn with_bundled_font(mut db: fontdb::Database) -> FontResource {
    db.load_font_data(BUNDLED_FONT.to_vec());
    let metrics = load_font_metrics_from_data(BUNDLED_FONT, None).ok();
    let family = metrics
        .as_ref()
        .and_then(|metrics| metrics.family())
        .map(|name| name.to_string());
    if let Some(name) = &family {
        db.set_sans_serif_family(name.clone());
    }
    FontResource {
        db: Arc::new(db),
        family,
        metrics,
    }
}

#[cfg(target_os = "macos")]
fn fallback_fonts() -> &'static [&'static str] {
    &["CC Wild Words", "Hiragino Sans", "sans-serif"]
}

#[cfg(target_os = "windows")]
fn fallback_fonts() -> &'static [&'static str] {
    &["CC Wild Words", "Arial", "sans-serif"]
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn fallback_fonts() -> &'static [&'static str] {
    &["CC Wild Words", "DejaVu Sans", "sans-serif"]
}

pub fn load_font_metrics(path: &Path) -> Result<FontMetrics> {
    let data =
        std::fs::read(path).with_context(|| format!("failed to read font: {}", path.display()))?;
    load_font_metrics_from_data(&data, None)
        .map_err(|err| anyhow!("failed to parse font: {} ({})", path.display(), err))
}

/// Pixel width of a single line at `font_size`.
pub fn measure_text_width_px(text: &str, font_size: f32, font: Option<&FontMetrics>) -> f32 {
    let face = font.and_then(|font| {
        Face::parse(&font.data, font.face_index)
            .ok()
            .map(|face| (font, face))
    });
    if let Some((font, face)) = face {
        let mut advance = 0u32;
        for ch in text.chars() {
            if ch == ' ' {
                advance = advance.saturating_add(font.space_advance as u32);
                continue;
            }
            let glyph_advance = face
                .glyph_index(ch)
                .and_then(|glyph| face.glyph_hor_advance(glyph))
                .unwrap_or(font.space_advance);
            advance = advance.saturating_add(glyph_advance as u32);
        }
        let units = font.units_per_em.max(1) as f32;
        return advance as f32 * (font_size / units);
    }
    estimate_text_width_units(text) * font_size
}

fn estimate_char_units(ch: char) -> f32 {
    if ch.is_whitespace() {
        0.25
    } else if ch.is_ascii_uppercase() {
        0.65
    } else if ch.is_ascii_alphanumeric() {
        0.55
    } else if ch.is_ascii() {
        0.35
    } else if matches!(
        ch as u32,
        0x4E00..=0x9FFF | 0x3040..=0x30FF | 0x31F0..=0x31FF
    ) {
        1.0
    } else {
        0.9
    }
}

fn estimate_text_width_units(text: &str) -> f32 {
    text.chars().map(estimate_char_units).sum()
}

fn load_font_metrics_from_data(data: &[u8], preferred_family: Option<&str>) -> Result<FontMetrics> {
    let mut fallback = None;
    let shared = Arc::new(data.to_vec());
    let count = ttf_parser::fonts_in_collection(data).unwrap_or(1);
    for index in 0..count {
        let Ok(face) = Face::parse(data, index) else {
            continue;
        };
        let family = extract_family_name(&face);
        let units_per_em = face.units_per_em().max(1);
        let space_advance = face
            .glyph_index(' ')
            .and_then(|id| face.glyph_hor_advance(id))
            .unwrap_or(units_per_em / 2);
        let metrics = FontMetrics {
            data: Arc::clone(&shared),
            units_per_em,
            space_advance,
            family: family.clone(),
            face_index: index,
        };
        let preferred_match = match (preferred_family, &family) {
            (Some(preferred), Some(found)) => found.eq_ignore_ascii_case(preferred),
            _ => false,
        };
        if preferred_match {
            return Ok(metrics);
        }
        if fallback.is_none() {
            fallback = Some(metrics);
        }
    }
    fallback.ok_or_else(|| anyhow!("failed to parse font data"))
}

fn load_font_metrics_from_family(db: &fontdb::Database, family: &str) -> Result<FontMetrics> {
    let families = if family.eq_ignore_ascii_case("sans-serif") {
        vec![fontdb::Family::SansSerif]
    } else {
        vec![fontdb::Family::Name(family)]
    };
    let query = fontdb::Query {
        families: &families,
        ..Default::default()
    };
    let id = db
        .query(&query)
        .ok_or_else(|| anyhow!("font not found: {}", family))?;
    let data = db
        .with_face_data(id, |data, _index| data.to_vec())
        .ok_or_else(|| anyhow!("failed to load font data: {}", family))?;
    let preferred = (!family.eq_ignore_ascii_case("sans-serif")).then_some(family);
    load_font_metrics_from_data(&data, preferred)
}

fn extract_family_name(face: &Face<'_>) -> Option<String> {
    let mut fallback = None;
    for name in face.names() {
        if name.name_id == name_id::TYPOGRAPHIC_FAMILY {
            if let Some(value) = name.to_string() {
                return Some(value);
            }
        } else if name.name_id == name_id::FAMILY && fallback.is_none() {
            fallback = name.to_string();
        }
    }
    fallback
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreadable_font_path_falls_back_without_failing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let bogus = dir.path().join("broken.ttf");
        std::fs::write(&bogus, b"not a font").expect("write");

        assert!(load_font_metrics(&bogus).is_err());
        let fonts = FontResource::load(Some(&bogus), None);
        let metrics = fonts.metrics().expect("metrics");
        assert!(!metrics.data().is_empty());
        assert!(fonts.family().is_some());
    }

    #[test]
    fn bundled_font_resolves_with_metrics() {
        let fonts = FontResource::bundled();
        assert_eq!(fonts.family(), Some("DejaVu Sans"));
        assert!(fonts.database().len() > 0);

        let measured = measure_text_width_px("HEY", 20.0, fonts.metrics());
        assert!(measured > 0.0);
        assert!(measured < measure_text_width_px("HEY THERE", 20.0, fonts.metrics()));
    }

    #[test]
    fn estimated_width_scales_with_size_and_length() {
        let short = measure_text_width_px("HEY", 20.0, None);
        let long = measure_text_width_px("HEY THERE", 20.0, None);
        assert!(long > short);
        let doubled = measure_text_width_px("HEY", 40.0, None);
        assert!((doubled - short * 2.0).abs() < 0.001);
        assert_eq!(measure_text_width_px("", 20.0, None), 0.0);
    }
}
