//! Response generation against a hosted instruction-tuned model.
//!
//! [`ChatCompletion`] is the raw transport seam (HuggingFace Inference API
//! in production, mocks in tests); [`ResponseGenerator`] composes the
//! advisory prompt and degrades to a fixed reply when the provider is
//! unavailable.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{AdvisorError, Result};
use crate::models::{
    ConversationTurn, Fetch, GenerationParams, HfGenerateRequest, HfGenerated, Role, ScoredCrop,
    WeatherReport,
};

const HF_INFERENCE_BASE: &str = "https://api-inference.huggingface.co/models";

const SYSTEM_PROMPT: &str = "You are an expert agricultural advisor for Indian farmers.\n\
Provide practical, actionable advice in simple language.\n\
Explain WHAT, HOW, WHEN, WHERE, and WHY.\n\
Always prioritize farmer safety.";

pub const UNAVAILABLE_REPLY: &str =
    "The advisory service is temporarily unavailable. Please try again in a moment.";

#[async_trait]
pub trait ChatCompletion: Send + Sync {
    async fn complete(&self, prompt: &str, params: &GenerationParams) -> Result<String>;
}

pub struct HfInferenceClient {
    client: reqwest::Client,
    token: Option<String>,
    model: String,
}

impl HfInferenceClient {
    pub fn new(token: Option<String>, model: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            token,
            model,
        })
    }
}

#[async_trait]
impl ChatCompletion for HfInferenceClient {
    async fn complete(&self, prompt: &str, params: &GenerationParams) -> Result<String> {
        let token = self.token.as_deref().ok_or(AdvisorError::Config(
            "HUGGINGFACE_TOKEN not configured".to_string(),
        ))?;

        let request = HfGenerateRequest {
            inputs: prompt.to_string(),
            parameters: params.clone(),
        };

        let response = self
            .client
            .post(format!("{HF_INFERENCE_BASE}/{}", self.model))
            .header("Authorization", format!("Bearer {token}"))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AdvisorError::UpstreamStatus {
                provider: "HuggingFace Inference",
                status: status.as_u16(),
                body,
            });
        }

        let generated: Vec<HfGenerated> = response.json().await?;
        generated
            .into_iter()
            .next()
            .map(|g| g.generated_text)
            .filter(|text| !text.trim().is_empty())
            .ok_or(AdvisorError::MalformedResponse {
                provider: "HuggingFace Inference",
                detail: "empty generation".to_string(),
            })
    }
}

/// Context assembled by the pipeline for one prompt.
#[derive(Debug, Default)]
pub struct PromptContext<'a> {
    /// Present only when the weather fetch was live, never the fallback.
    pub weather: Option<&'a WeatherReport>,
    pub recommendations: &'a [ScoredCrop],
    /// Threshold warnings for current field conditions.
    pub field_warnings: &'a [String],
}

pub struct ResponseGenerator {
    tx: Arc<dyn ChatCompletion>,
    params: GenerationParams,
    max_history_turns: usize,
}

impl ResponseGenerator {
    pub fn new(tx: Arc<dyn ChatCompletion>, params: GenerationParams, max_history_turns: usize) -> Self {
        Self {
            tx,
            params,
            max_history_turns,
        }
    }

    /// Compose the advisory prompt for one farmer question.
    pub fn build_prompt(
        &self,
        query: &str,
        ctx: &PromptContext<'_>,
        history: &[ConversationTurn],
    ) -> String {
        let mut prompt = SYSTEM_PROMPT.to_string();

        if let Some(weather) = ctx.weather {
            prompt.push_str(&format!(
                "\n\nCurrent weather: {}, {:.1}°C, humidity {}%",
                weather.description, weather.temperature_c, weather.humidity_pct
            ));
        }

        if !ctx.field_warnings.is_empty() {
            prompt.push_str("\n\nField conditions to watch:");
            for warning in ctx.field_warnings {
                prompt.push_str(&format!("\n- {warning}"));
            }
        }

        if !ctx.recommendations.is_empty() {
            let names: Vec<&str> = ctx
                .recommendations
                .iter()
                .map(|r| r.crop.name.as_str())
                .collect();
            prompt.push_str(&format!(
                "\n\nCrops suited to the farmer's conditions: {}",
                names.join(", ")
            ));
        }

        let start = history.len().saturating_sub(self.max_history_turns);
        for turn in &history[start..] {
            let speaker = match turn.role {
                Role::User => "Farmer",
                Role::Assistant => "Advisor",
            };
            prompt.push_str(&format!("\n{speaker}: {}", turn.content));
        }

        prompt.push_str(&format!("\n\nFarmer question: {query}"));
        prompt
    }

    pub async fn generate(
        &self,
        query: &str,
        ctx: &PromptContext<'_>,
        history: &[ConversationTurn],
    ) -> Fetch<String> {
        let prompt = self.build_prompt(query, ctx, history);

        match self.tx.complete(&prompt, &self.params).await {
            Ok(text) => Fetch::fresh(text.trim().to_string()),
            Err(e) => {
                tracing::error!(error = %e, "LLM generation failed");
                Fetch::degraded(UNAVAILABLE_REPLY.to_string(), format!("generation failed: {e}"))
            }
        }
    }
}
