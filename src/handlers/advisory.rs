//! Advisory lookup handlers: weather, crop recommendation, market quotes,
//! disease reference, and raw reference-table dumps.

use axum::Json;
use axum::extract::{Path, Query, State};
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::AppState;
use crate::advisory::{format_quote, format_weather, season_for_month};
use crate::disease::Classification;
use crate::error::{AdvisorError, Result};
use crate::models::{Fetch, GrowingConditions, PriceQuote, ScoredCrop, Season, WeatherReport};

#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    pub location: String,
}

#[derive(Debug, Serialize)]
pub struct WeatherResponse {
    pub report: Fetch<WeatherReport>,
    /// Human-readable conditions block.
    pub text: String,
}

pub async fn weather(
    State(engine): State<AppState>,
    Query(query): Query<WeatherQuery>,
) -> Result<Json<WeatherResponse>> {
    if query.location.trim().is_empty() {
        return Err(AdvisorError::InvalidParameter("location is empty".into()));
    }

    let report = engine.weather_lookup(&query.location).await;
    let text = format_weather(report.value());
    Ok(Json(WeatherResponse { report, text }))
}

#[derive(Debug, Deserialize)]
pub struct RecommendQuery {
    pub soil: String,
    /// Kharif or Rabi; defaults to the season implied by the current month.
    pub season: Option<String>,
    pub rainfall_mm: Option<f64>,
    pub temperature: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub advisory: String,
    pub crops: Vec<ScoredCrop>,
}

pub async fn recommend(
    State(engine): State<AppState>,
    Query(query): Query<RecommendQuery>,
) -> Result<Json<RecommendResponse>> {
    let season = match query.season.as_deref() {
        Some(raw) => raw
            .parse::<Season>()
            .map_err(AdvisorError::InvalidParameter)?,
        None => season_for_month(Utc::now().month()),
    };

    let conditions = GrowingConditions {
        soil: query.soil,
        season,
        rainfall_mm: query.rainfall_mm.unwrap_or(engine.default_rainfall_mm()),
        temperature_c: query.temperature.unwrap_or(25.0),
    };

    Ok(Json(RecommendResponse {
        advisory: engine.recommendation_advisory(&conditions),
        crops: engine.recommend(&conditions),
    }))
}

#[derive(Debug, Deserialize)]
pub struct MarketQuery {
    pub location: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MarketResponse {
    pub quote: PriceQuote,
    /// Human-readable quote block.
    pub text: String,
}

pub async fn market(
    State(engine): State<AppState>,
    Path(crop): Path<String>,
    Query(query): Query<MarketQuery>,
) -> Result<Json<MarketResponse>> {
    let quote = engine
        .market_quote(&crop, query.location.as_deref())
        .ok_or_else(|| AdvisorError::unknown_reference("crop", &crop))?;
    let text = format_quote(&quote);
    Ok(Json(MarketResponse { quote, text }))
}

#[derive(Debug, Serialize)]
pub struct DiseaseAdvisory {
    pub advisory: String,
}

pub async fn disease(
    State(engine): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<DiseaseAdvisory>> {
    engine
        .disease_advisory(&name)
        .map(|advisory| Json(DiseaseAdvisory { advisory }))
        .ok_or_else(|| AdvisorError::unknown_reference("disease", &name))
}

/// Stub classification endpoint; no vision model is deployed.
pub async fn detect_disease(State(engine): State<AppState>) -> Json<Classification> {
    Json(engine.classify_disease())
}

pub async fn reference(
    State(engine): State<AppState>,
    Path(table): Path<String>,
) -> Result<Json<Value>> {
    let kb = engine.knowledge();

    let value = match table.as_str() {
        "crops" => {
            let mut records: Vec<_> = kb.crops().collect();
            records.sort_by_key(|r| r.key.clone());
            serde_json::to_value(records)?
        }
        "diseases" => {
            let mut records: Vec<_> = kb.diseases().collect();
            records.sort_by_key(|r| r.key.clone());
            serde_json::to_value(records)?
        }
        "soils" => {
            let mut records: Vec<_> = kb.soils().collect();
            records.sort_by_key(|r| r.key.clone());
            serde_json::to_value(records)?
        }
        "fertilizers" => {
            let mut records: Vec<_> = kb.fertilizers().collect();
            records.sort_by_key(|r| r.key.clone());
            serde_json::to_value(records)?
        }
        "schemes" => {
            let mut records: Vec<_> = kb.schemes().collect();
            records.sort_by_key(|r| r.key.clone());
            serde_json::to_value(records)?
        }
        other => return Err(AdvisorError::unknown_reference("reference table", other)),
    };

    Ok(Json(value))
}
