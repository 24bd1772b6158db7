//! Crop suitability scoring.
//!
//! One scorer serves both the quick advisory string and the prompt-context
//! record list; the two legacy call shapes differ only in how many results
//! they take from the same ranking.

use std::cmp::Reverse;
use std::sync::Arc;

use crate::knowledge::KnowledgeBase;
use crate::models::{CropRecord, GrowingConditions, ScoredCrop};

const SOIL_WEIGHT: u8 = 30;
const SEASON_WEIGHT: u8 = 20;
const RAINFALL_WEIGHT: u8 = 20;
const TEMPERATURE_WEIGHT: u8 = 30;

/// Rainfall within this distance of the crop's requirement still scores.
const RAINFALL_TOLERANCE_MM: f64 = 300.0;

pub struct CropRecommender {
    kb: Arc<KnowledgeBase>,
}

impl CropRecommender {
    pub fn new(kb: Arc<KnowledgeBase>) -> Self {
        Self { kb }
    }

    /// Suitability of one crop for the given conditions, 0-100.
    pub fn score(&self, crop: &CropRecord, conditions: &GrowingConditions) -> u8 {
        let mut score = 0;

        if self
            .kb
            .suitable_crops(&conditions.soil)
            .contains(&crop.key)
        {
            score += SOIL_WEIGHT;
        }

        if crop.season == conditions.season {
            score += SEASON_WEIGHT;
        }

        if (crop.rainfall_mm - conditions.rainfall_mm).abs() < RAINFALL_TOLERANCE_MM {
            score += RAINFALL_WEIGHT;
        }

        if (crop.temp_min..=crop.temp_max).contains(&conditions.temperature_c) {
            score += TEMPERATURE_WEIGHT;
        }

        score
    }

    /// All crops with a non-zero score, best first. Ties break on key so
    /// the ranking is deterministic.
    pub fn recommend(&self, conditions: &GrowingConditions) -> Vec<ScoredCrop> {
        let mut scored: Vec<ScoredCrop> = self
            .kb
            .crops()
            .map(|crop| ScoredCrop {
                crop: crop.clone(),
                score: self.score(crop, conditions),
            })
            .filter(|s| s.score > 0)
            .collect();

        scored.sort_by_key(|s| (Reverse(s.score), s.crop.key.clone()));
        scored
    }

    /// Short advisory line naming the top three candidates.
    pub fn advisory(&self, conditions: &GrowingConditions) -> String {
        let ranked = self.recommend(conditions);
        if ranked.is_empty() {
            return "Unable to recommend crops for these conditions. \
                    Please provide more detailed information."
                .to_string();
        }

        let top: Vec<&str> = ranked.iter().take(3).map(|s| s.crop.name.as_str()).collect();
        format!(
            "Recommended crops: {}. Based on your soil type, season, and climate conditions.",
            top.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Season;

    fn recommender() -> CropRecommender {
        CropRecommender::new(Arc::new(KnowledgeBase::new()))
    }

    fn black_soil_kharif() -> GrowingConditions {
        GrowingConditions {
            soil: "Black Soil".to_string(),
            season: Season::Kharif,
            rainfall_mm: 700.0,
            temperature_c: 25.0,
        }
    }

    #[test]
    fn cotton_sweeps_black_soil_kharif_conditions() {
        let r = recommender();
        let conditions = black_soil_kharif();

        let kb = KnowledgeBase::new();
        let cotton = kb.crop("cotton").unwrap();
        let score = r.score(cotton, &conditions);
        // 30 soil + 20 season + 20 rainfall + 30 temperature.
        assert!(score >= 80);
        assert_eq!(score, 100);

        let ranked = r.recommend(&conditions);
        assert_eq!(ranked[0].crop.key, "cotton");
    }

    #[test]
    fn rainfall_window_is_exclusive_at_300mm() {
        let r = recommender();
        let kb = KnowledgeBase::new();
        let wheat = kb.crop("wheat").unwrap(); // needs 400mm, Rabi, 15-25°C

        let mut conditions = GrowingConditions {
            soil: "Alluvial".to_string(),
            season: Season::Rabi,
            rainfall_mm: 700.0, // exactly 300 away
            temperature_c: 20.0,
        };
        // soil 30 + season 20 + temp 30, rainfall misses the open interval.
        assert_eq!(r.score(wheat, &conditions), 80);

        conditions.rainfall_mm = 699.0;
        assert_eq!(r.score(wheat, &conditions), 100);
    }

    #[test]
    fn zero_score_crops_are_dropped() {
        let r = recommender();
        let conditions = GrowingConditions {
            soil: "nowhere".to_string(),
            season: Season::Rabi,
            rainfall_mm: 5000.0,
            temperature_c: -10.0,
        };
        let ranked = r.recommend(&conditions);
        // Only wheat picks up the season match; everything else scores zero.
        assert!(ranked.iter().all(|s| s.score > 0));
        assert!(ranked.len() < 5);
    }

    #[test]
    fn advisory_names_top_three() {
        let r = recommender();
        let text = r.advisory(&black_soil_kharif());
        assert!(text.starts_with("Recommended crops: Cotton"));
    }
}
