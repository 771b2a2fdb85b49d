use anyhow::Result;
use futures_util::future::BoxFuture;

/// Capability used by the consolidator to turn one sentence into the target
/// language. Implementations are chosen once at startup and shared across
/// pages, so they must be usable from several tasks at once.
pub trait Translator: Send + Sync {
    fn name(&self) -> &str;

    fn translate<'a>(
        &'a self,
        text: &'a str,
        source_lang: &'a str,
        target_lang: &'a str,
    ) -> BoxFuture<'a, Result<String>>;
}

#[derive(Debug, Clone)]
pub struct TranslateOptions {
    pub source_lang: String,
    pub target_lang: String,
    pub concurrency: usize,
    pub timeout: Option<std::time::Duration>,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        Self {
            source_lang: "JA".to_string(),
            target_lang: "EN-US".to_string(),
            concurrency: 4,
            timeout: None,
        }
    }
}
