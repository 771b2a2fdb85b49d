use anyhow::{Error, Result, anyhow};
use serde::{Deserialize, Serialize};

/// Axis-aligned pixel rectangle in page coordinates, `x2 > x1` and `y2 > y1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "[i32; 4]", into = "[i32; 4]")]
pub struct BBox {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl BBox {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Result<Self> {
        if x2 <= x1 || y2 <= y1 {
            return Err(anyhow!(
                "invalid bbox ({}, {}, {}, {}): expected x2 > x1 and y2 > y1",
                x1,
                y1,
                x2,
                y2
            ));
        }
        Ok(Self { x1, y1, x2, y2 })
    }

    pub fn width(&self) -> u32 {
        span(self.x1, self.x2)
    }

    pub fn height(&self) -> u32 {
        span(self.y1, self.y2)
    }

    pub fn area(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    /// Intersection with a `width` x `height` canvas, or `None` when nothing is left.
    pub fn clamp_to(&self, width: u32, height: u32) -> Option<BBox> {
        let max_x = i32::try_from(width).unwrap_or(i32::MAX);
        let max_y = i32::try_from(height).unwrap_or(i32::MAX);
        let x1 = self.x1.clamp(0, max_x);
        let y1 = self.y1.clamp(0, max_y);
        let x2 = self.x2.clamp(0, max_x);
        let y2 = self.y2.clamp(0, max_y);
        BBox::new(x1, y1, x2, y2).ok()
    }
}

fn span(start: i32, end: i32) -> u32 {
    (i64::from(end) - i64::from(start)).clamp(0, i64::from(u32::MAX)) as u32
}

impl TryFrom<[i32; 4]> for BBox {
    type Error = Error;

    fn try_from(value: [i32; 4]) -> Result<Self> {
        BBox::new(value[0], value[1], value[2], value[3])
    }
}

impl From<BBox> for [i32; 4] {
    fn from(value: BBox) -> Self {
        [value.x1, value.y1, value.x2, value.y2]
    }
}

/// Raw detector output before recognition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detection {
    pub bbox: BBox,
    pub class_id: u32,
}

/// A recognized text region. `id` is assigned once at detection time and never
/// derived from list position afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Region {
    pub id: usize,
    pub bbox: BBox,
    pub class_id: u32,
    pub raw_text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_degenerate_boxes() {
        assert!(BBox::new(10, 10, 10, 20).is_err());
        assert!(BBox::new(10, 20, 30, 5).is_err());
        let bbox = BBox::new(10, 20, 110, 70).expect("bbox");
        assert_eq!(bbox.width(), 100);
        assert_eq!(bbox.height(), 50);
        assert_eq!(bbox.area(), 5000);
    }

    #[test]
    fn extreme_coordinates_do_not_overflow() {
        let bbox: BBox = serde_json::from_str("[-2147483648, 0, 2147483647, 10]").expect("parse");
        assert_eq!(bbox.width(), u32::MAX);
        assert_eq!(bbox.height(), 10);
        assert_eq!(bbox.area(), u32::MAX as u64 * 10);
        assert_eq!(bbox.clamp_to(100, 50), Some(BBox::new(0, 0, 100, 10).expect("bbox")));
    }

    #[test]
    fn clamp_to_canvas() {
        let bbox = BBox::new(-10, 5, 120, 60).expect("bbox");
        assert_eq!(bbox.clamp_to(100, 50), Some(BBox::new(0, 5, 100, 50).unwrap()));
        let outside = BBox::new(200, 200, 220, 240).expect("bbox");
        assert_eq!(outside.clamp_to(100, 100), None);
    }

    #[test]
    fn bbox_deserializes_from_array() {
        let bbox: BBox = serde_json::from_str("[1, 2, 30, 40]").expect("parse");
        assert_eq!(bbox, BBox::new(1, 2, 30, 40).unwrap());
        assert!(serde_json::from_str::<BBox>("[30, 2, 1, 40]").is_err());
    }
}
