//! Current-conditions lookup via the OpenWeather API.
//!
//! Two-step fetch: geocode the free-text location, then read current
//! conditions at the resolved coordinates. Any failure along the way
//! degrades to a fixed fallback report; a chat turn never fails because the
//! weather provider did.

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use std::time::Duration;

use crate::cache::{TtlCache, cache_key};
use crate::error::{AdvisorError, Result};
use crate::models::{Fetch, WeatherReport};

const GEO_URL: &str = "https://api.openweathermap.org/geo/1.0/direct";
const WEATHER_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

/// Fallback conditions when the live fetch is unavailable.
const FALLBACK_TEMP_C: f64 = 25.0;
const FALLBACK_HUMIDITY_PCT: u32 = 60;

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn current(&self, location: &str) -> Fetch<WeatherReport>;
}

pub struct OpenWeatherClient {
    client: reqwest::Client,
    api_key: Option<String>,
    cache: TtlCache<WeatherReport>,
}

#[derive(Debug, Deserialize)]
struct GeoEntry {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct WeatherPayload {
    main: MainPayload,
    wind: WindPayload,
    weather: Vec<ConditionPayload>,
    name: String,
    sys: SysPayload,
}

#[derive(Debug, Deserialize)]
struct MainPayload {
    temp: f64,
    humidity: u32,
    pressure: u32,
}

#[derive(Debug, Deserialize)]
struct WindPayload {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct ConditionPayload {
    description: String,
}

#[derive(Debug, Deserialize)]
struct SysPayload {
    country: String,
}

pub fn fallback_report(location: &str) -> WeatherReport {
    WeatherReport {
        location: location.to_string(),
        resolved_name: String::new(),
        country: String::new(),
        temperature_c: FALLBACK_TEMP_C,
        humidity_pct: FALLBACK_HUMIDITY_PCT,
        pressure_hpa: 1013,
        wind_speed_ms: 0.0,
        description: "weather data unavailable".to_string(),
        observed_at: Utc::now(),
    }
}

impl OpenWeatherClient {
    pub fn new(api_key: Option<String>, timeout: Duration, cache_ttl: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key,
            cache: TtlCache::new(cache_ttl),
        })
    }

    async fn geocode(&self, key: &str, location: &str) -> Result<Option<(f64, f64)>> {
        let response = self
            .client
            .get(GEO_URL)
            .query(&[("q", location), ("limit", "1"), ("appid", key)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AdvisorError::UpstreamStatus {
                provider: "OpenWeather geocoder",
                status: status.as_u16(),
                body,
            });
        }

        let entries: Vec<GeoEntry> = response.json().await?;
        Ok(entries.first().map(|e| (e.lat, e.lon)))
    }

    async fn fetch(&self, key: &str, location: &str, lat: f64, lon: f64) -> Result<WeatherReport> {
        let response = self
            .client
            .get(WEATHER_URL)
            .query(&[
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("appid", key.to_string()),
                ("units", "metric".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AdvisorError::UpstreamStatus {
                provider: "OpenWeather",
                status: status.as_u16(),
                body,
            });
        }

        let payload: WeatherPayload = response.json().await?;
        let description = payload
            .weather
            .first()
            .map(|c| c.description.clone())
            .ok_or(AdvisorError::MalformedResponse {
                provider: "OpenWeather",
                detail: "empty weather conditions array".to_string(),
            })?;

        Ok(WeatherReport {
            location: location.to_string(),
            resolved_name: payload.name,
            country: payload.sys.country,
            temperature_c: payload.main.temp,
            humidity_pct: payload.main.humidity,
            pressure_hpa: payload.main.pressure,
            wind_speed_ms: payload.wind.speed,
            description,
            observed_at: Utc::now(),
        })
    }

    async fn live(&self, key: &str, location: &str) -> Result<Option<WeatherReport>> {
        let Some((lat, lon)) = self.geocode(key, location).await? else {
            return Ok(None);
        };
        self.fetch(key, location, lat, lon).await.map(Some)
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn current(&self, location: &str) -> Fetch<WeatherReport> {
        let Some(key) = self.api_key.as_deref() else {
            tracing::warn!("weather API key not configured, using fallback report");
            return Fetch::degraded(fallback_report(location), "weather API key not configured");
        };

        let ck = cache_key(&[&location.trim().to_lowercase()]);
        if let Some(cached) = self.cache.get(&ck) {
            tracing::debug!(%location, "weather served from cache");
            return Fetch::fresh(cached);
        }

        match self.live(key, location).await {
            Ok(Some(report)) => {
                self.cache.put(ck, report.clone());
                Fetch::fresh(report)
            }
            Ok(None) => {
                tracing::warn!(%location, "geocoder could not resolve location");
                Fetch::degraded(fallback_report(location), "location not found")
            }
            Err(e) => {
                tracing::error!(%location, error = %e, "weather fetch failed");
                Fetch::degraded(fallback_report(location), format!("weather fetch failed: {e}"))
            }
        }
    }
}
