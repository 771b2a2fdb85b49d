use anyhow::{Result, anyhow};
use std::sync::Arc;
use tracing::{info, warn};

use crate::translator::Translator;

mod deepl;
mod openai;
mod placeholder;

pub use deepl::DeepL;
pub use openai::OpenAI;
pub use placeholder::Placeholder;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    DeepL,
    OpenAI,
    Placeholder,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::DeepL => "deepl",
            ProviderKind::OpenAI => "openai",
            ProviderKind::Placeholder => "placeholder",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProviderSelection {
    pub provider: ProviderKind,
    pub key: Option<String>,
    pub model: Option<String>,
}

/// Picks the translation backend once per run.
///
/// An explicit `provider` wins; otherwise the first provider with a key in the
/// environment is used. Anything without a usable key degrades to the
/// placeholder translator instead of failing.
pub fn resolve_provider_selection(
    provider_arg: Option<&str>,
    override_key: Option<&str>,
    model: Option<&str>,
) -> Result<ProviderSelection> {
    let model = model
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string);
    let provider = match provider_arg.map(str::trim).filter(|value| !value.is_empty()) {
        Some(name) => provider_from_name(&name.to_lowercase()).ok_or_else(|| {
            anyhow!(
                "unknown translation provider '{}' (expected deepl, openai or placeholder)",
                name
            )
        })?,
        None => default_provider(override_key),
    };
    if provider == ProviderKind::Placeholder {
        return Ok(ProviderSelection {
            provider,
            key: None,
            model,
        });
    }
    match resolve_key(provider, override_key) {
        Some(key) => Ok(ProviderSelection {
            provider,
            key: Some(key),
            model,
        }),
        None => {
            warn!(
                "no API key found for {}; using placeholder translator",
                provider.as_str()
            );
            Ok(ProviderSelection {
                provider: ProviderKind::Placeholder,
                key: None,
                model,
            })
        }
    }
}

pub fn resolve_key(provider: ProviderKind, override_key: Option<&str>) -> Option<String> {
    if let Some(key) = override_key.filter(|key| !key.trim().is_empty()) {
        return Some(key.trim().to_string());
    }
    match provider {
        ProviderKind::DeepL => get_env("DEEPL_API_KEY"),
        ProviderKind::OpenAI => get_env("OPENAI_API_KEY"),
        ProviderKind::Placeholder => None,
    }
}

pub fn build_translator(selection: ProviderSelection) -> Arc<dyn Translator> {
    let ProviderSelection {
        provider,
        key,
        model,
    } = selection;
    let translator: Arc<dyn Translator> = match (provider, key) {
        (ProviderKind::DeepL, Some(key)) => Arc::new(DeepL::new(key)),
        (ProviderKind::OpenAI, Some(key)) => {
            let openai = OpenAI::new(key);
            Arc::new(match model {
                Some(model) => openai.with_model(model),
                None => openai,
            })
        }
        _ => Arc::new(Placeholder),
    };
    info!("translation provider: {}", translator.name());
    translator
}

fn default_provider(override_key: Option<&str>) -> ProviderKind {
    if get_env("DEEPL_API_KEY").is_some() {
        return ProviderKind::DeepL;
    }
    if get_env("OPENAI_API_KEY").is_some() {
        return ProviderKind::OpenAI;
    }
    if override_key.is_some_and(|key| !key.trim().is_empty()) {
        return ProviderKind::DeepL;
    }
    warn!("no translation API key configured (DEEPL_API_KEY, OPENAI_API_KEY); using placeholder translator");
    ProviderKind::Placeholder
}

fn provider_from_name(name: &str) -> Option<ProviderKind> {
    match name {
        "deepl" => Some(ProviderKind::DeepL),
        "openai" => Some(ProviderKind::OpenAI),
        "placeholder" | "none" => Some(ProviderKind::Placeholder),
        _ => None,
    }
}

fn get_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
}
