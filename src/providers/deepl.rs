use anyhow::{Context, Result, anyhow};
use futures_util::future::BoxFuture;
use serde::Deserialize;
use serde_json::json;

use crate::translator::Translator;

const FREE_BASE_URL: &str = "https://api-free.deepl.com/v2";
const PRO_BASE_URL: &str = "https://api.deepl.com/v2";

#[derive(Debug, Clone)]
pub struct DeepL {
    key: String,
    base_url: String,
    client: reqwest::Client,
}

impl DeepL {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        let base_url = std::env::var("DEEPL_BASE_URL")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| default_base_url(&key).to_string());
        Self {
            key,
            base_url,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        if !base_url.trim().is_empty() {
            self.base_url = base_url.trim_end_matches('/').to_string();
        }
        self
    }
}

/// Free-tier keys carry a `:fx` suffix and live on a separate host.
fn default_base_url(key: &str) -> &'static str {
    if key.trim().ends_with(":fx") {
        FREE_BASE_URL
    } else {
        PRO_BASE_URL
    }
}

impl Translator for DeepL {
    fn name(&self) -> &str {
        "deepl"
    }

    fn translate<'a>(
        &'a self,
        text: &'a str,
        source_lang: &'a str,
        target_lang: &'a str,
    ) -> BoxFuture<'a, Result<String>> {
        Box::pin(async move {
            let url = format!("{}/translate", self.base_url);
            let body = json!({
                "text": [text],
                "source_lang": source_lang,
                "target_lang": target_lang,
                "preserve_formatting": true
            });
            let response = self
                .client
                .post(&url)
                .header("Authorization", format!("DeepL-Auth-Key {}", self.key))
                .json(&body)
                .send()
                .await
                .with_context(|| "failed to reach DeepL")?;

            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            if !status.is_success() {
                return Err(anyhow!(
                    "DeepL API error ({}): {}",
                    status,
                    extract_deepl_error(&text).unwrap_or(text)
                ));
            }
            extract_translation(&text)
        })
    }
}

#[derive(Debug, Deserialize)]
struct DeepLResponse {
    #[serde(default)]
    translations: Vec<DeepLTranslation>,
}

#[derive(Debug, Deserialize)]
struct DeepLTranslation {
    text: String,
}

fn extract_translation(payload: &str) -> Result<String> {
    let parsed: DeepLResponse =
        serde_json::from_str(payload).with_context(|| "failed to parse DeepL response JSON")?;
    parsed
        .translations
        .into_iter()
        .next()
        .map(|translation| translation.text)
        .ok_or_else(|| anyhow!("no translation returned from DeepL"))
}

fn extract_deepl_error(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: Option<String>,
        detail: Option<String>,
    }

    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match (parsed.message, parsed.detail) {
        (Some(message), Some(detail)) if !detail.trim().is_empty() => {
            Some(format!("{} | {}", message, detail))
        }
        (Some(message), _) => Some(message),
        (None, detail) => detail,
    }
}
