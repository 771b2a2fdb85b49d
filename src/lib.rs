use anyhow::{Context, Result, anyhow};
use futures_util::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub mod consolidate;
pub mod layout;
pub mod logging;
pub mod pipeline;
pub mod providers;
pub mod reading_order;
pub mod recognition;
pub mod region;
pub mod settings;
pub mod sidecar;
pub mod text;
mod translator;

pub use layout::{FontResource, OverlayStyle, Typesetter};
pub use pipeline::{PageOutcome, PageTranslator, render_page};
pub use providers::{DeepL, OpenAI, Placeholder, ProviderKind};
pub use recognition::{Detector, Recognizer};
pub use region::{BBox, Detection, Region};
pub use sidecar::Annotations;
pub use translator::{TranslateOptions, Translator};

const OUTPUT_PREFIX: &str = "translated_";
const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub provider: Option<String>,
    pub key: Option<String>,
    pub model: Option<String>,
    pub source_lang: Option<String>,
    pub target_lang: Option<String>,
    pub font_path: Option<PathBuf>,
    pub settings_path: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub translated: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Translates every page image in `config.input_dir` that has an annotation
/// sidecar and writes `translated_<name>` into `config.output_dir`.
///
/// A failing page is logged and counted; it never stops the run.
pub async fn run(config: Config) -> Result<RunSummary> {
    let settings_path = config.settings_path.as_deref().map(Path::new);
    let settings = settings::load_settings(settings_path)?;

    let provider = config.provider.as_deref().or(settings.provider.as_deref());
    let model = config.model.as_deref().or(settings.model.as_deref());
    let selection = providers::resolve_provider_selection(provider, config.key.as_deref(), model)?;
    let translator = providers::build_translator(selection);

    let options = TranslateOptions {
        source_lang: config.source_lang.clone().unwrap_or(settings.source_lang.clone()),
        target_lang: config.target_lang.clone().unwrap_or(settings.target_lang.clone()),
        concurrency: settings.concurrency,
        timeout: settings.timeout_secs.map(Duration::from_secs),
    };

    let font_path = config
        .font_path
        .clone()
        .or_else(|| settings.overlay_font_path.as_ref().map(PathBuf::from));
    let font_family = settings.overlay_font_family.clone();
    let fonts = tokio::task::spawn_blocking(move || {
        FontResource::load(font_path.as_deref(), font_family.as_deref())
    })
    .await
    .with_context(|| "font loading task failed")?;
    let style = OverlayStyle {
        text_color: settings.overlay_text_color.clone(),
        fill_color: settings.overlay_fill_color.clone(),
    };
    let typesetter = Arc::new(Typesetter::new(fonts, style));
    let pages = PageTranslator::new(translator, typesetter, options, settings.text_class_id);

    let (inputs, skipped) = collect_pages(&config.input_dir)?;
    if inputs.is_empty() {
        warn!("no annotated pages found in {}", config.input_dir.display());
    }
    std::fs::create_dir_all(&config.output_dir).with_context(|| {
        format!(
            "failed to create output directory: {}",
            config.output_dir.display()
        )
    })?;

    let workers = num_cpus::get().max(1);
    let results: Vec<(PathBuf, Result<PathBuf>)> = stream::iter(inputs)
        .map(|(image_path, sidecar)| {
            let pages = pages.clone();
            let output_dir = config.output_dir.clone();
            async move {
                let result = process_page(&pages, &image_path, &sidecar, &output_dir).await;
                (image_path, result)
            }
        })
        .buffer_unordered(workers)
        .collect()
        .await;

    let mut summary = RunSummary {
        skipped,
        ..RunSummary::default()
    };
    for (image_path, result) in results {
        match result {
            Ok(output) => {
                info!("{} -> {}", image_path.display(), output.display());
                summary.translated += 1;
            }
            Err(err) => {
                warn!("failed to translate {}: {:#}", image_path.display(), err);
                summary.failed += 1;
            }
        }
    }
    info!(
        "done: {} translated, {} skipped, {} failed",
        summary.translated, summary.skipped, summary.failed
    );
    Ok(summary)
}

async fn process_page(
    pages: &PageTranslator,
    image_path: &Path,
    sidecar: &Path,
    output_dir: &Path,
) -> Result<PathBuf> {
    let annotations = Annotations::load(sidecar)?;
    let source = image_path.to_path_buf();
    let image = tokio::task::spawn_blocking(move || {
        image::open(&source).with_context(|| format!("failed to open image: {}", source.display()))
    })
    .await
    .with_context(|| "image decoding task failed")??;

    let outcome = pages
        .translate_page(image, &annotations, &annotations)
        .await?;

    let file_name = image_path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow!("invalid file name: {}", image_path.display()))?;
    let output = output_dir.join(format!("{}{}", OUTPUT_PREFIX, file_name));
    let target = output.clone();
    tokio::task::spawn_blocking(move || {
        outcome
            .image
            .save(&target)
            .with_context(|| format!("failed to write image: {}", target.display()))
    })
    .await
    .with_context(|| "image encoding task failed")??;
    Ok(output)
}

/// Page images in `dir` paired with their sidecar, sorted by name, plus the
/// number of images skipped for lack of one.
fn collect_pages(dir: &Path) -> Result<(Vec<(PathBuf, PathBuf)>, usize)> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read input directory: {}", dir.display()))?;
    let mut images: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.is_file() && is_page_image(path))
        .collect();
    images.sort();

    let mut pages = Vec::new();
    let mut skipped = 0;
    for image in images {
        match sidecar::sidecar_path(&image).filter(|path| path.is_file()) {
            Some(sidecar) => pages.push((image, sidecar)),
            None => {
                warn!("no region annotations for {}; skipped", image.display());
                skipped += 1;
            }
        }
    }
    Ok((pages, skipped))
}

fn is_page_image(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
        return false;
    };
    if name.starts_with(OUTPUT_PREFIX) {
        return false;
    }
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
}
