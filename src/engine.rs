//! The advisory pipeline.
//!
//! One chat turn runs: detect language → clean input → translate to English
//! → weather lookup (when the session has a location) → crop
//! recommendations → prompt composition and LLM completion → translate back
//! → append the exchange to the session. Integration failures degrade to
//! fallbacks and are reported to the caller; only caller errors (empty
//! input, unknown session) surface as hard errors.

use chrono::{Datelike, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::advisory;
use crate::config::Config;
use crate::disease::{self, Classification, DiseaseDetector};
use crate::error::{AdvisorError, Result};
use crate::knowledge::KnowledgeBase;
use crate::language::{self, DeeplClient, Language, Translator};
use crate::llm::{ChatCompletion, HfInferenceClient, PromptContext, ResponseGenerator};
use crate::market::MarketEstimator;
use crate::models::{
    ChatOutcome, ConversationTurn, Fetch, GenerationParams, GrowingConditions, PriceQuote,
    ScoredCrop, WeatherReport,
};
use crate::recommend::CropRecommender;
use crate::session::SessionStore;
use crate::weather::{OpenWeatherClient, WeatherProvider};

/// Crop records offered to the LLM as prompt context.
const PROMPT_RECOMMENDATION_LIMIT: usize = 5;

pub struct AdvisoryEngine {
    kb: Arc<KnowledgeBase>,
    weather: Arc<dyn WeatherProvider>,
    translator: Arc<dyn Translator>,
    generator: ResponseGenerator,
    recommender: CropRecommender,
    market: MarketEstimator,
    detector: DiseaseDetector,
    sessions: SessionStore,
    max_input_chars: usize,
    default_rainfall_mm: f64,
}

impl AdvisoryEngine {
    /// Wire up the production clients from configuration.
    pub fn new(cfg: &Config) -> Result<Self> {
        let weather = Arc::new(OpenWeatherClient::new(
            cfg.weather_api_key(),
            cfg.weather_timeout(),
            cfg.weather_cache_ttl(),
        )?);
        let translator = Arc::new(DeeplClient::new(
            cfg.translation_api_key(),
            cfg.translation_timeout(),
        )?);
        let completion = Arc::new(HfInferenceClient::new(
            cfg.llm_token(),
            cfg.llm.model.clone(),
            cfg.llm_timeout(),
        )?);

        Ok(Self::from_parts(weather, translator, completion, cfg))
    }

    /// Assemble an engine from explicit integration seams. Tests inject
    /// mocks here; `new` is a thin wrapper over it.
    pub fn from_parts(
        weather: Arc<dyn WeatherProvider>,
        translator: Arc<dyn Translator>,
        completion: Arc<dyn ChatCompletion>,
        cfg: &Config,
    ) -> Self {
        let kb = Arc::new(KnowledgeBase::new());
        let params = GenerationParams {
            max_new_tokens: cfg.llm.max_new_tokens,
            temperature: cfg.llm.temperature,
            top_p: cfg.llm.top_p,
            return_full_text: false,
        };

        Self {
            weather,
            translator,
            generator: ResponseGenerator::new(completion, params, cfg.llm.max_history_turns),
            recommender: CropRecommender::new(Arc::clone(&kb)),
            market: MarketEstimator::new(Arc::clone(&kb)),
            detector: DiseaseDetector,
            sessions: SessionStore::new(cfg.session.max_history_entries),
            max_input_chars: cfg.session.max_input_chars,
            default_rainfall_mm: cfg.recommendation.default_rainfall_mm,
            kb,
        }
    }

    /// Run one full chat turn for a session.
    pub async fn chat(&self, session_id: Uuid, message: &str) -> Result<ChatOutcome> {
        let cleaned = advisory::clean_input(message, self.max_input_chars);
        if cleaned.is_empty() {
            return Err(AdvisorError::EmptyQuery);
        }

        let session = self.sessions.get(session_id).await?;
        let lang = resolve_language(&cleaned, session.language);
        tracing::info!(session = %session_id, %lang, "processing chat turn");

        let mut degradations = Vec::new();

        let inbound = self
            .translator
            .translate(&cleaned, lang, Language::English)
            .await;
        if let Some(reason) = inbound.reason() {
            degradations.push(format!("inbound translation: {reason}"));
        }
        let query_en = inbound.into_value();

        let weather = match session.location.as_deref() {
            Some(location) if !location.trim().is_empty() => {
                Some(self.weather.current(location).await)
            }
            _ => None,
        };
        if let Some(reason) = weather.as_ref().and_then(Fetch::reason) {
            degradations.push(format!("weather: {reason}"));
        }

        let conditions = GrowingConditions {
            soil: session.soil_type.clone().unwrap_or_default(),
            season: advisory::season_for_month(Utc::now().month()),
            rainfall_mm: self.default_rainfall_mm,
            temperature_c: weather
                .as_ref()
                .map(|w| w.value().temperature_c)
                .unwrap_or(25.0),
        };
        let mut recommendations = self.recommender.recommend(&conditions);
        recommendations.truncate(PROMPT_RECOMMENDATION_LIMIT);

        let live_weather = weather.as_ref().and_then(Fetch::fresh_value);
        let field_warnings = live_weather
            .map(|w| {
                advisory::field_condition_warnings(
                    w.temperature_c,
                    w.humidity_pct,
                    self.default_rainfall_mm,
                )
            })
            .unwrap_or_default();

        let ctx = PromptContext {
            weather: live_weather,
            recommendations: &recommendations,
            field_warnings: &field_warnings,
        };
        let generated = self
            .generator
            .generate(&query_en, &ctx, &session.history)
            .await;
        if let Some(reason) = generated.reason() {
            degradations.push(format!("generation: {reason}"));
        }

        let outbound = self
            .translator
            .translate(generated.value(), Language::English, lang)
            .await;
        if let Some(reason) = outbound.reason() {
            degradations.push(format!("outbound translation: {reason}"));
        }
        let reply = outbound.into_value();

        self.sessions
            .append_exchange(
                session_id,
                ConversationTurn::user(cleaned),
                ConversationTurn::assistant(reply.clone()),
            )
            .await?;

        Ok(ChatOutcome {
            reply,
            language: lang,
            degradations,
        })
    }

    // ── Advisory lookups exposed to the HTTP surface ──────────────────────

    pub async fn weather_lookup(&self, location: &str) -> Fetch<WeatherReport> {
        self.weather.current(location).await
    }

    pub fn recommend(&self, conditions: &GrowingConditions) -> Vec<ScoredCrop> {
        self.recommender.recommend(conditions)
    }

    pub fn recommendation_advisory(&self, conditions: &GrowingConditions) -> String {
        self.recommender.advisory(conditions)
    }

    pub fn market_quote(&self, crop: &str, location: Option<&str>) -> Option<PriceQuote> {
        self.market.quote(crop, location)
    }

    pub fn disease_advisory(&self, name: &str) -> Option<String> {
        disease::treatment_advisory(&self.kb, name)
    }

    pub fn classify_disease(&self) -> Classification {
        self.detector.classify()
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.kb
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn default_rainfall_mm(&self) -> f64 {
        self.default_rainfall_mm
    }
}

/// Pick the reply language for a message. Detection is script-based; a
/// Devanagari message in a session profiled as Marathi stays Marathi, since
/// Hindi and Marathi share the script.
fn resolve_language(text: &str, profile: Language) -> Language {
    match language::detect(text) {
        Language::Hindi if profile == Language::Marathi => Language::Marathi,
        detected => detected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    use crate::session::ProfileUpdate;
    use crate::weather::fallback_report;

    struct MockWeather {
        fresh: bool,
    }

    #[async_trait]
    impl WeatherProvider for MockWeather {
        async fn current(&self, location: &str) -> Fetch<WeatherReport> {
            if self.fresh {
                let mut report = fallback_report(location);
                report.resolved_name = "Nashik".to_string();
                report.country = "IN".to_string();
                report.temperature_c = 28.0;
                report.description = "clear sky".to_string();
                Fetch::fresh(report)
            } else {
                Fetch::degraded(fallback_report(location), "weather API key not configured")
            }
        }
    }

    /// Records translation calls; "translates" by tagging the text.
    struct MockTranslator {
        calls: Mutex<Vec<(Language, Language)>>,
    }

    impl MockTranslator {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Translator for MockTranslator {
        async fn translate(&self, text: &str, source: Language, target: Language) -> Fetch<String> {
            self.calls.lock().unwrap().push((source, target));
            if source == target {
                Fetch::fresh(text.to_string())
            } else {
                Fetch::fresh(format!("[{}] {text}", target.deepl_code()))
            }
        }
    }

    struct MockChat;

    #[async_trait]
    impl ChatCompletion for MockChat {
        async fn complete(&self, _prompt: &str, _params: &GenerationParams) -> Result<String> {
            Ok("Sow cotton after the first good monsoon rain.".to_string())
        }
    }

    struct FailingChat;

    #[async_trait]
    impl ChatCompletion for FailingChat {
        async fn complete(&self, _prompt: &str, _params: &GenerationParams) -> Result<String> {
            Err(AdvisorError::Internal("inference endpoint down".into()))
        }
    }

    fn engine(fresh_weather: bool, chat_ok: bool) -> (AdvisoryEngine, Arc<MockTranslator>) {
        let translator = Arc::new(MockTranslator::new());
        let completion: Arc<dyn ChatCompletion> = if chat_ok {
            Arc::new(MockChat)
        } else {
            Arc::new(FailingChat)
        };
        let engine = AdvisoryEngine::from_parts(
            Arc::new(MockWeather {
                fresh: fresh_weather,
            }),
            translator.clone(),
            completion,
            &Config::default(),
        );
        (engine, translator)
    }

    #[tokio::test]
    async fn english_round_trip_appends_two_turns() {
        let (engine, _) = engine(true, true);
        let session = engine.sessions().create(ProfileUpdate::default()).await;

        let outcome = engine
            .chat(session.id, "When should I sow cotton?")
            .await
            .unwrap();

        assert_eq!(outcome.language, Language::English);
        assert_eq!(outcome.reply, "Sow cotton after the first good monsoon rain.");
        assert!(outcome.degradations.is_empty());

        let session = engine.sessions().get(session.id).await.unwrap();
        assert_eq!(session.history.len(), 2);
        assert_eq!(session.history[0].content, "When should I sow cotton?");
    }

    #[tokio::test]
    async fn hindi_message_translates_both_ways() {
        let (engine, translator) = engine(true, true);
        let session = engine.sessions().create(ProfileUpdate::default()).await;

        let outcome = engine.chat(session.id, "कपास कब बोएं?").await.unwrap();

        assert_eq!(outcome.language, Language::Hindi);
        assert!(outcome.reply.starts_with("[HI]"));

        let calls = translator.calls.lock().unwrap();
        assert_eq!(
            calls.as_slice(),
            &[
                (Language::Hindi, Language::English),
                (Language::English, Language::Hindi),
            ]
        );
    }

    #[tokio::test]
    async fn marathi_profile_keeps_devanagari_input_marathi() {
        let (engine, _) = engine(true, true);
        let session = engine
            .sessions()
            .create(ProfileUpdate {
                language: Some(Language::Marathi),
                ..Default::default()
            })
            .await;

        let outcome = engine.chat(session.id, "कापूस कधी पेरायचा?").await.unwrap();
        assert_eq!(outcome.language, Language::Marathi);
    }

    #[tokio::test]
    async fn degraded_weather_is_reported_not_fatal() {
        let (engine, _) = engine(false, true);
        let session = engine
            .sessions()
            .create(ProfileUpdate {
                location: Some("Nashik, Maharashtra".into()),
                ..Default::default()
            })
            .await;

        let outcome = engine.chat(session.id, "Will it rain?").await.unwrap();
        assert!(
            outcome
                .degradations
                .iter()
                .any(|d| d.starts_with("weather:"))
        );
        assert!(!outcome.reply.is_empty());
    }

    #[tokio::test]
    async fn failed_generation_degrades_to_canned_reply() {
        let (engine, _) = engine(true, false);
        let session = engine.sessions().create(ProfileUpdate::default()).await;

        let outcome = engine.chat(session.id, "help me").await.unwrap();
        assert_eq!(outcome.reply, crate::llm::UNAVAILABLE_REPLY);
        assert!(
            outcome
                .degradations
                .iter()
                .any(|d| d.starts_with("generation:"))
        );

        // The degraded exchange still lands in history.
        let session = engine.sessions().get(session.id).await.unwrap();
        assert_eq!(session.history.len(), 2);
    }

    #[tokio::test]
    async fn empty_input_is_a_hard_error() {
        let (engine, _) = engine(true, true);
        let session = engine.sessions().create(ProfileUpdate::default()).await;

        assert!(matches!(
            engine.chat(session.id, "   ").await,
            Err(AdvisorError::EmptyQuery)
        ));
    }

    #[tokio::test]
    async fn unknown_session_is_a_hard_error() {
        let (engine, _) = engine(true, true);
        assert!(matches!(
            engine.chat(Uuid::new_v4(), "hello").await,
            Err(AdvisorError::SessionNotFound(_))
        ));
    }

    #[test]
    fn resolve_language_prefers_profile_for_shared_script() {
        assert_eq!(
            resolve_language("कपास कब बोएं?", Language::Marathi),
            Language::Marathi
        );
        assert_eq!(
            resolve_language("कपास कब बोएं?", Language::English),
            Language::Hindi
        );
        assert_eq!(
            resolve_language("plain english", Language::Marathi),
            Language::English
        );
    }
}
