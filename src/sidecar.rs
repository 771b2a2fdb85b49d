//! Region annotations stored next to a page image as `<stem>.regions.json`.
//!
//! ```json
//! [{"bbox": [40, 32, 220, 180], "class_id": 3, "text": "元気？"}]
//! ```

use anyhow::{Context, Result, anyhow};
use image::DynamicImage;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::recognition::{Detector, Recognizer};
use crate::region::{BBox, Detection};

pub const SIDECAR_SUFFIX: &str = ".regions.json";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Annotation {
    pub bbox: BBox,
    pub class_id: u32,
    #[serde(default)]
    pub text: String,
}

/// Detector and recognizer backed by annotations instead of models.
#[derive(Debug, Clone, Default)]
pub struct Annotations {
    entries: Vec<Annotation>,
    texts: HashMap<BBox, String>,
}

impl Annotations {
    /// The first non-empty text wins for boxes listed more than once.
    pub fn new(entries: Vec<Annotation>) -> Self {
        let mut texts: HashMap<BBox, String> = HashMap::new();
        for entry in &entries {
            let text = texts.entry(entry.bbox).or_default();
            if text.trim().is_empty() {
                text.clone_from(&entry.text);
            }
        }
        Self { entries, texts }
    }

    pub fn parse(json: &str) -> Result<Self> {
        let entries: Vec<Annotation> =
            serde_json::from_str(json).with_context(|| "failed to parse region annotations")?;
        Ok(Self::new(entries))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read annotations: {}", path.display()))?;
        Self::parse(&json).with_context(|| format!("invalid annotations: {}", path.display()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// `<dir>/<stem>.regions.json` for `<dir>/<stem>.<ext>`.
pub fn sidecar_path(image_path: &Path) -> Option<PathBuf> {
    let stem = image_path.file_stem()?.to_str()?;
    Some(image_path.with_file_name(format!("{}{}", stem, SIDECAR_SUFFIX)))
}

impl Detector for Annotations {
    fn detect(&self, _image: &DynamicImage) -> Result<Vec<Detection>> {
        Ok(self
            .entries
            .iter()
            .map(|entry| Detection {
                bbox: entry.bbox,
                class_id: entry.class_id,
            })
            .collect())
    }
}

impl Recognizer for Annotations {
    fn recognize(&self, _crop: &DynamicImage, bbox: &BBox) -> Result<String> {
        self.texts
            .get(bbox)
            .cloned()
            .ok_or_else(|| anyhow!("no annotation for region {:?}", bbox))
    }

    /// Annotated text is taken as-is; only empty entries are rejected.
    fn is_valid(&self, text: &str, _crop: &DynamicImage) -> bool {
        text.trim().chars().count() >= 2
    }

    fn is_plausible_script(&self, text: &str) -> bool {
        !text.trim().is_empty()
    }
}
