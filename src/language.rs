//! Language detection and translation.
//!
//! Detection is a Unicode-range heuristic over the Indic scripts the service
//! supports. Marathi shares the Devanagari script with Hindi, so detection
//! alone cannot distinguish the two; a session whose profile selects Marathi
//! keeps it for Devanagari input.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{AdvisorError, Result};
use crate::models::Fetch;

const DEEPL_API_URL: &str = "https://api-free.deepl.com/v1/translate";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    English,
    Hindi,
    Marathi,
    Gujarati,
    Tamil,
}

impl Language {
    pub const ALL: [Language; 5] = [
        Language::English,
        Language::Hindi,
        Language::Marathi,
        Language::Gujarati,
        Language::Tamil,
    ];

    /// Provider code for the DeepL API. Each language maps to its own code;
    /// routing Marathi or Gujarati through another language's model loses
    /// the translation entirely.
    pub fn deepl_code(&self) -> &'static str {
        match self {
            Language::English => "EN",
            Language::Hindi => "HI",
            Language::Marathi => "MR",
            Language::Gujarati => "GU",
            Language::Tamil => "TA",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Hindi => "Hindi",
            Language::Marathi => "Marathi",
            Language::Gujarati => "Gujarati",
            Language::Tamil => "Tamil",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "english" | "en" => Ok(Language::English),
            "hindi" | "hi" => Ok(Language::Hindi),
            "marathi" | "mr" => Ok(Language::Marathi),
            "gujarati" | "gu" => Ok(Language::Gujarati),
            "tamil" | "ta" => Ok(Language::Tamil),
            other => Err(format!("unsupported language '{other}'")),
        }
    }
}

/// Detect the language of `text` from its script.
///
/// Devanagari resolves to Hindi (see module docs for the Marathi caveat);
/// anything outside the supported Indic blocks resolves to English.
pub fn detect(text: &str) -> Language {
    for c in text.chars() {
        match c as u32 {
            0x0900..=0x097F => return Language::Hindi,
            0x0A80..=0x0AFF => return Language::Gujarati,
            0x0B80..=0x0BFF => return Language::Tamil,
            _ => {}
        }
    }
    Language::English
}

#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` from `source` to `target`, degrading to the original
    /// text when the provider is unavailable or errors.
    async fn translate(&self, text: &str, source: Language, target: Language) -> Fetch<String>;
}

pub struct DeeplClient {
    client: reqwest::Client,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DeeplPayload {
    translations: Vec<DeeplTranslation>,
}

#[derive(Debug, Deserialize)]
struct DeeplTranslation {
    text: String,
}

impl DeeplClient {
    pub fn new(api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, api_key })
    }

    async fn request(
        &self,
        key: &str,
        text: &str,
        source: Language,
        target: Language,
    ) -> Result<String> {
        let params = [
            ("auth_key", key),
            ("text", text),
            ("source_lang", source.deepl_code()),
            ("target_lang", target.deepl_code()),
        ];

        let response = self.client.post(DEEPL_API_URL).form(&params).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AdvisorError::UpstreamStatus {
                provider: "DeepL",
                status: status.as_u16(),
                body,
            });
        }

        let payload: DeeplPayload = response.json().await?;
        payload
            .translations
            .into_iter()
            .next()
            .map(|t| t.text)
            .ok_or(AdvisorError::MalformedResponse {
                provider: "DeepL",
                detail: "empty translations array".to_string(),
            })
    }
}

#[async_trait]
impl Translator for DeeplClient {
    async fn translate(&self, text: &str, source: Language, target: Language) -> Fetch<String> {
        if source == target {
            return Fetch::fresh(text.to_string());
        }

        let Some(key) = self.api_key.as_deref() else {
            tracing::warn!(%source, %target, "translation key not configured, passing text through");
            return Fetch::degraded(text.to_string(), "translation key not configured");
        };

        match self.request(key, text, source, target).await {
            Ok(translated) => Fetch::fresh(translated),
            Err(e) => {
                tracing::warn!(%source, %target, error = %e, "translation failed, passing text through");
                Fetch::degraded(text.to_string(), format!("translation failed: {e}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_hindi_from_devanagari() {
        assert_eq!(detect("मौसम कैसा है?"), Language::Hindi);
    }

    #[test]
    fn detects_gujarati_and_tamil() {
        assert_eq!(detect("હવામાન કેવું છે?"), Language::Gujarati);
        assert_eq!(detect("வானிலை எப்படி உள்ளது?"), Language::Tamil);
    }

    #[test]
    fn defaults_to_english() {
        assert_eq!(detect("How is the weather today?"), Language::English);
        assert_eq!(detect(""), Language::English);
    }

    #[test]
    fn every_language_has_its_own_provider_code() {
        // Marathi and Gujarati were once routed through other languages'
        // codes; each must map to itself.
        assert_eq!(Language::English.deepl_code(), "EN");
        assert_eq!(Language::Hindi.deepl_code(), "HI");
        assert_eq!(Language::Marathi.deepl_code(), "MR");
        assert_eq!(Language::Gujarati.deepl_code(), "GU");
        assert_eq!(Language::Tamil.deepl_code(), "TA");

        let mut codes: Vec<&str> = Language::ALL.iter().map(|l| l.deepl_code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), Language::ALL.len());
    }

    #[test]
    fn parses_labels_and_codes() {
        assert_eq!("Hindi".parse::<Language>().unwrap(), Language::Hindi);
        assert_eq!("gu".parse::<Language>().unwrap(), Language::Gujarati);
        assert!("klingon".parse::<Language>().is_err());
    }

    #[tokio::test]
    async fn same_language_passes_through_fresh() {
        let client = DeeplClient::new(None, Duration::from_secs(5)).unwrap();
        let out = client
            .translate("hello", Language::English, Language::English)
            .await;
        assert!(!out.is_degraded());
        assert_eq!(out.value(), "hello");
    }

    #[tokio::test]
    async fn missing_key_degrades_to_original_text() {
        let client = DeeplClient::new(None, Duration::from_secs(5)).unwrap();
        let out = client
            .translate("hello", Language::English, Language::Hindi)
            .await;
        assert!(out.is_degraded());
        assert_eq!(out.value(), "hello");
    }
}
