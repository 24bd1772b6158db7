//! Advisory text helpers: weather and price formatting, seasonal context,
//! field-condition warnings, and input hygiene.

use crate::models::{PriceQuote, Season, WeatherReport};

/// Cropping season implied by a calendar month (1-12). Monsoon sowing runs
/// June through October; everything else falls in the winter-sown window.
pub fn season_for_month(month: u32) -> Season {
    match month {
        6..=10 => Season::Kharif,
        _ => Season::Rabi,
    }
}

/// Human-readable current-conditions block.
pub fn format_weather(report: &WeatherReport) -> String {
    let place = if report.resolved_name.is_empty() {
        report.location.clone()
    } else {
        format!("{}, {}", report.resolved_name, report.country)
    };

    format!(
        "Weather in {place}\n\
         - Temperature: {:.1}°C\n\
         - Humidity: {}%\n\
         - Pressure: {} hPa\n\
         - Wind speed: {} m/s\n\
         - Condition: {}\n\
         Updated at: {}",
        report.temperature_c,
        report.humidity_pct,
        report.pressure_hpa,
        report.wind_speed_ms,
        report.description,
        report.observed_at.to_rfc3339(),
    )
}

/// Human-readable market quote block.
pub fn format_quote(quote: &PriceQuote) -> String {
    format!(
        "Market prices for {} in {}\n\
         - Current price: ₹{:.0}/quintal\n\
         - Price per kg: ₹{:.2}\n\
         - Range: ₹{:.0} - ₹{:.0}/quintal\n\
         - Trend: {}\n\
         Source: {} ({})",
        quote.crop,
        quote.location,
        quote.price_per_quintal,
        quote.price_per_kg,
        quote.min_price,
        quote.max_price,
        quote.trend,
        quote.source,
        quote.quoted_at.to_rfc3339(),
    )
}

/// Threshold warnings for current field conditions. Empty when everything
/// is in the comfortable band.
pub fn field_condition_warnings(
    temperature_c: f64,
    humidity_pct: u32,
    rainfall_mm: f64,
) -> Vec<String> {
    let mut warnings = Vec::new();

    if temperature_c > 40.0 {
        warnings.push("High temperature - water crops regularly".to_string());
    } else if temperature_c < 10.0 {
        warnings.push("Low temperature - monitor for frost damage".to_string());
    }

    if humidity_pct > 80 {
        warnings.push("High humidity - watch for fungal diseases".to_string());
    } else if humidity_pct < 30 {
        warnings.push("Low humidity - increase irrigation".to_string());
    }

    if rainfall_mm < 200.0 {
        warnings.push("Low rainfall - supplemental irrigation needed".to_string());
    } else if rainfall_mm > 1000.0 {
        warnings.push("High rainfall - ensure good drainage".to_string());
    }

    warnings
}

/// Collapse whitespace, drop control characters, and cap the length.
pub fn clean_input(text: &str, max_chars: usize) -> String {
    let collapsed = text
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .filter(|c| !c.is_control())
        .collect::<String>();

    truncate(&collapsed, max_chars)
}

/// Truncate to `max_chars` characters, marking the cut with an ellipsis.
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{kept}...")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn monsoon_months_are_kharif() {
        assert_eq!(season_for_month(6), Season::Kharif);
        assert_eq!(season_for_month(10), Season::Kharif);
        assert_eq!(season_for_month(11), Season::Rabi);
        assert_eq!(season_for_month(1), Season::Rabi);
        assert_eq!(season_for_month(5), Season::Rabi);
    }

    #[test]
    fn weather_block_uses_resolved_name_when_present() {
        let mut report = WeatherReport {
            location: "nashik".into(),
            resolved_name: "Nashik".into(),
            country: "IN".into(),
            temperature_c: 28.0,
            humidity_pct: 65,
            pressure_hpa: 1010,
            wind_speed_ms: 2.5,
            description: "clear sky".into(),
            observed_at: Utc::now(),
        };
        assert!(format_weather(&report).contains("Weather in Nashik, IN"));

        report.resolved_name.clear();
        assert!(format_weather(&report).contains("Weather in nashik"));
    }

    #[test]
    fn warnings_fire_on_threshold_crossings() {
        assert!(field_condition_warnings(25.0, 60, 500.0).is_empty());

        let hot = field_condition_warnings(41.0, 60, 500.0);
        assert_eq!(hot.len(), 1);
        assert!(hot[0].contains("High temperature"));

        let rough = field_condition_warnings(5.0, 90, 1500.0);
        assert_eq!(rough.len(), 3);
    }

    #[test]
    fn clean_input_collapses_whitespace() {
        assert_eq!(
            clean_input("  kapaas   kab\n boyein?  ", 500),
            "kapaas kab boyein?"
        );
    }

    #[test]
    fn clean_input_preserves_indic_text() {
        assert_eq!(clean_input("कपास कब बोएं?", 500), "कपास कब बोएं?");
    }

    #[test]
    fn truncate_marks_the_cut() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 8), "abcde...");
    }
}
