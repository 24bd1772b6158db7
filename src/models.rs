use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::language::Language;

/// Outcome of an outbound integration call.
///
/// Every provider client resolves to a usable value; `Degraded` carries the
/// fallback together with the reason the live path failed, so callers can
/// surface degradation instead of treating a default as live data. Hard
/// failures stay on [`crate::error::AdvisorError`].
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Fetch<T> {
    Fresh { value: T },
    Degraded { value: T, reason: String },
}

impl<T> Fetch<T> {
    pub fn fresh(value: T) -> Self {
        Self::Fresh { value }
    }

    pub fn degraded(value: T, reason: impl Into<String>) -> Self {
        Self::Degraded {
            value,
            reason: reason.into(),
        }
    }

    pub fn value(&self) -> &T {
        match self {
            Self::Fresh { value } | Self::Degraded { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Self::Fresh { value } | Self::Degraded { value, .. } => value,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    /// The value only when it came from the live path.
    pub fn fresh_value(&self) -> Option<&T> {
        match self {
            Self::Fresh { value } => Some(value),
            Self::Degraded { .. } => None,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Fresh { .. } => None,
            Self::Degraded { reason, .. } => Some(reason),
        }
    }
}

// ───────────────────────────────────────────────────────────────────────────
// Reference tables
// ───────────────────────────────────────────────────────────────────────────

/// India's two main cropping seasons: monsoon-sown and winter-sown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Season {
    Kharif,
    Rabi,
}

impl std::fmt::Display for Season {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Season::Kharif => f.write_str("Kharif"),
            Season::Rabi => f.write_str("Rabi"),
        }
    }
}

impl std::str::FromStr for Season {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "kharif" => Ok(Season::Kharif),
            "rabi" => Ok(Season::Rabi),
            other => Err(format!("unknown season '{other}' (expected Kharif or Rabi)")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CropRecord {
    pub key: String,
    pub name: String,
    pub scientific_name: String,
    pub hindi_name: String,
    pub season: Season,
    pub duration_days: u32,
    pub temp_min: f64,
    pub temp_max: f64,
    pub rainfall_mm: f64,
    pub ph_min: f64,
    pub ph_max: f64,
    pub yield_kg_ha: u32,
    pub price_per_quintal: f64,
    pub water_requirement_mm: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiseaseRecord {
    pub key: String,
    pub name: String,
    pub hindi_name: String,
    pub description: String,
    pub affected_crops: Vec<String>,
    pub symptoms: Vec<String>,
    pub treatment: Vec<String>,
    pub prevention: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoilRecord {
    pub key: String,
    pub name: String,
    pub hindi_name: String,
    pub characteristics: Vec<String>,
    pub suitable_crops: Vec<String>,
    pub ph_min: f64,
    pub ph_max: f64,
    pub drainage: String,
    pub water_holding: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FertilizerRecord {
    pub key: String,
    pub name: String,
    pub hindi_name: String,
    pub sources: Vec<String>,
    pub benefits: Vec<String>,
    pub deficiency_signs: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemeRecord {
    pub key: String,
    pub name: String,
    pub description: String,
    pub amount: String,
    pub eligibility: String,
    pub website: String,
}

// ───────────────────────────────────────────────────────────────────────────
// Weather
// ───────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherReport {
    /// Location as the user typed it.
    pub location: String,
    /// Place name as resolved by the geocoder, if the fetch succeeded.
    pub resolved_name: String,
    pub country: String,
    pub temperature_c: f64,
    pub humidity_pct: u32,
    pub pressure_hpa: u32,
    pub wind_speed_ms: f64,
    pub description: String,
    pub observed_at: DateTime<Utc>,
}

// ───────────────────────────────────────────────────────────────────────────
// Market
// ───────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceQuote {
    pub crop: String,
    pub location: String,
    pub price_per_quintal: f64,
    pub price_per_kg: f64,
    pub min_price: f64,
    pub max_price: f64,
    pub avg_price: f64,
    pub trend: String,
    pub source: String,
    pub quoted_at: DateTime<Utc>,
}

// ───────────────────────────────────────────────────────────────────────────
// Crop recommendation
// ───────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct GrowingConditions {
    pub soil: String,
    pub season: Season,
    pub rainfall_mm: f64,
    pub temperature_c: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoredCrop {
    pub crop: CropRecord,
    /// Suitability score, 0-100.
    pub score: u8,
}

// ───────────────────────────────────────────────────────────────────────────
// Conversation
// ───────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
    pub at: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            at: Utc::now(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            at: Utc::now(),
        }
    }
}

// ───────────────────────────────────────────────────────────────────────────
// LLM inference wire types (HuggingFace Inference API)
// ───────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct HfGenerateRequest {
    pub inputs: String,
    pub parameters: GenerationParams,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationParams {
    pub max_new_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
    pub return_full_text: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HfGenerated {
    pub generated_text: String,
}

// ───────────────────────────────────────────────────────────────────────────
// Chat pipeline
// ───────────────────────────────────────────────────────────────────────────

/// Result of one full chat turn through the pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct ChatOutcome {
    pub reply: String,
    pub language: Language,
    /// Reasons any stage fell back to a default, in pipeline order.
    pub degradations: Vec<String>,
}
