use anyhow::Result;
use futures_util::future::BoxFuture;

use crate::translator::Translator;

/// Stand-in used when no provider credentials are configured. The output is
/// visibly marked so untranslated pages are easy to spot.
#[derive(Debug, Clone, Copy, Default)]
pub struct Placeholder;

impl Translator for Placeholder {
    fn name(&self) -> &str {
        "placeholder"
    }

    fn translate<'a>(
        &'a self,
        text: &'a str,
        _source_lang: &'a str,
        _target_lang: &'a str,
    ) -> BoxFuture<'a, Result<String>> {
        Box::pin(async move { Ok(format!("[TRANSLATION: {}]", text)) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn wraps_text_in_marker() {
        let output = Placeholder
            .translate("やめろ", "JA", "EN-US")
            .await
            .expect("translate");
        assert_eq!(output, "[TRANSLATION: やめろ]");
    }
}
