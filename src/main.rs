use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "manga-translator",
    version,
    about = "Translate manga pages and typeset the result into the speech bubbles"
)]
struct Cli {
    /// Directory with page images and their <stem>.regions.json annotations
    #[arg(default_value = "input")]
    input_dir: PathBuf,

    /// Directory for translated_<name> outputs (default: the input directory)
    #[arg(short = 'o', long = "output")]
    output_dir: Option<PathBuf>,

    /// Translation provider (deepl, openai, placeholder)
    #[arg(short = 'p', long = "provider")]
    provider: Option<String>,

    /// API key (overrides environment variables)
    #[arg(short = 'k', long = "key")]
    key: Option<String>,

    /// Model name for chat-completion providers
    #[arg(short = 'm', long = "model")]
    model: Option<String>,

    /// Target language (default from settings: EN-US)
    #[arg(short = 'l', long = "lang")]
    lang: Option<String>,

    /// Source language (default from settings: JA)
    #[arg(short = 'L', long = "source-lang")]
    source_lang: Option<String>,

    /// Font file used for the translated text
    #[arg(long = "font")]
    font: Option<PathBuf>,

    /// Read extra settings from a local TOML file
    #[arg(short = 'r', long = "read-settings")]
    read_settings: Option<String>,

    /// Enable verbose logging
    #[arg(long = "verbose")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    manga_translator_rust::logging::init(cli.verbose)?;

    if !cli.input_dir.is_dir() {
        return Err(anyhow!(
            "input directory not found: {}",
            cli.input_dir.display()
        ));
    }
    let output_dir = cli.output_dir.unwrap_or_else(|| cli.input_dir.clone());

    let summary = manga_translator_rust::run(manga_translator_rust::Config {
        input_dir: cli.input_dir,
        output_dir,
        provider: cli.provider,
        key: cli.key,
        model: cli.model,
        source_lang: cli.source_lang,
        target_lang: cli.lang,
        font_path: cli.font,
        settings_path: cli.read_settings,
    })
    .await?;

    println!(
        "{} translated, {} skipped, {} failed",
        summary.translated, summary.skipped, summary.failed
    );
    Ok(())
}
