//! Static agronomy reference tables.
//!
//! Loaded once at startup into a [`KnowledgeBase`] and never mutated. Keys
//! are normalized snake_case names; lookups accept display names ("Black
//! Soil") and fall back to fuzzy matching for near-miss spellings.
//!
//! No cross-table referential integrity is enforced: a soil may list a
//! suitable crop (peanut, tea) that has no crop record of its own.

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use std::collections::HashMap;

use crate::models::{CropRecord, DiseaseRecord, FertilizerRecord, SchemeRecord, Season, SoilRecord};

/// Minimum skim score for a fuzzy key match to count.
const FUZZY_THRESHOLD: i64 = 60;

pub struct KnowledgeBase {
    crops: HashMap<String, CropRecord>,
    diseases: HashMap<String, DiseaseRecord>,
    soils: HashMap<String, SoilRecord>,
    fertilizers: HashMap<String, FertilizerRecord>,
    schemes: HashMap<String, SchemeRecord>,
    matcher: SkimMatcherV2,
}

/// Normalize a display name to a table key: "Black Soil" -> "black_soil".
pub fn normalize_key(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}

impl KnowledgeBase {
    pub fn new() -> Self {
        Self {
            crops: build_crops(),
            diseases: build_diseases(),
            soils: build_soils(),
            fertilizers: build_fertilizers(),
            schemes: build_schemes(),
            matcher: SkimMatcherV2::default(),
        }
    }

    fn fuzzy_lookup<'a, T>(&self, table: &'a HashMap<String, T>, name: &str) -> Option<&'a T> {
        let key = normalize_key(name);
        if let Some(record) = table.get(&key) {
            return Some(record);
        }

        // Skim matching is directional (pattern chars must appear in the
        // text in order), so score both directions to cover insertions and
        // deletions in the query.
        table
            .iter()
            .filter_map(|(k, v)| {
                let score = self
                    .matcher
                    .fuzzy_match(k, &key)
                    .max(self.matcher.fuzzy_match(&key, k))?;
                (score >= FUZZY_THRESHOLD).then_some((score, v))
            })
            .max_by_key(|(score, _)| *score)
            .map(|(_, v)| v)
    }

    pub fn crop(&self, name: &str) -> Option<&CropRecord> {
        self.fuzzy_lookup(&self.crops, name)
    }

    pub fn disease(&self, name: &str) -> Option<&DiseaseRecord> {
        self.fuzzy_lookup(&self.diseases, name)
    }

    pub fn soil(&self, name: &str) -> Option<&SoilRecord> {
        self.fuzzy_lookup(&self.soils, name)
    }

    pub fn fertilizer(&self, name: &str) -> Option<&FertilizerRecord> {
        self.fuzzy_lookup(&self.fertilizers, name)
    }

    pub fn scheme(&self, name: &str) -> Option<&SchemeRecord> {
        self.fuzzy_lookup(&self.schemes, name)
    }

    /// Crop keys suitable for the named soil, empty when the soil is unknown.
    pub fn suitable_crops(&self, soil: &str) -> &[String] {
        self.soil(soil)
            .map(|s| s.suitable_crops.as_slice())
            .unwrap_or(&[])
    }

    pub fn crops(&self) -> impl Iterator<Item = &CropRecord> {
        self.crops.values()
    }

    pub fn diseases(&self) -> impl Iterator<Item = &DiseaseRecord> {
        self.diseases.values()
    }

    pub fn soils(&self) -> impl Iterator<Item = &SoilRecord> {
        self.soils.values()
    }

    pub fn fertilizers(&self) -> impl Iterator<Item = &FertilizerRecord> {
        self.fertilizers.values()
    }

    pub fn schemes(&self) -> impl Iterator<Item = &SchemeRecord> {
        self.schemes.values()
    }
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::new()
    }
}

fn build_crops() -> HashMap<String, CropRecord> {
    let records = [
        CropRecord {
            key: "wheat".into(),
            name: "Wheat".into(),
            scientific_name: "Triticum aestivum".into(),
            hindi_name: "गेहूँ".into(),
            season: Season::Rabi,
            duration_days: 120,
            temp_min: 15.0,
            temp_max: 25.0,
            rainfall_mm: 400.0,
            ph_min: 6.5,
            ph_max: 7.5,
            yield_kg_ha: 4500,
            price_per_quintal: 2200.0,
            water_requirement_mm: 400.0,
        },
        CropRecord {
            key: "rice".into(),
            name: "Rice".into(),
            scientific_name: "Oryza sativa".into(),
            hindi_name: "चावल".into(),
            season: Season::Kharif,
            duration_days: 120,
            temp_min: 20.0,
            temp_max: 35.0,
            rainfall_mm: 1200.0,
            ph_min: 5.5,
            ph_max: 7.5,
            yield_kg_ha: 5500,
            price_per_quintal: 2500.0,
            water_requirement_mm: 1200.0,
        },
        CropRecord {
            key: "cotton".into(),
            name: "Cotton".into(),
            scientific_name: "Gossypium herbaceum".into(),
            hindi_name: "कपास".into(),
            season: Season::Kharif,
            duration_days: 180,
            temp_min: 20.0,
            temp_max: 30.0,
            rainfall_mm: 700.0,
            ph_min: 6.0,
            ph_max: 7.5,
            yield_kg_ha: 20,
            price_per_quintal: 5500.0,
            water_requirement_mm: 700.0,
        },
        CropRecord {
            key: "sugarcane".into(),
            name: "Sugarcane".into(),
            scientific_name: "Saccharum officinarum".into(),
            hindi_name: "गन्ना".into(),
            season: Season::Kharif,
            duration_days: 300,
            temp_min: 20.0,
            temp_max: 35.0,
            rainfall_mm: 1250.0,
            ph_min: 6.0,
            ph_max: 7.5,
            yield_kg_ha: 60000,
            price_per_quintal: 295.0,
            water_requirement_mm: 1250.0,
        },
        CropRecord {
            key: "soybean".into(),
            name: "Soybean".into(),
            scientific_name: "Glycine max".into(),
            hindi_name: "सोयाबीन".into(),
            season: Season::Kharif,
            duration_days: 110,
            temp_min: 20.0,
            temp_max: 30.0,
            rainfall_mm: 500.0,
            ph_min: 6.0,
            ph_max: 7.5,
            yield_kg_ha: 2000,
            price_per_quintal: 4200.0,
            water_requirement_mm: 500.0,
        },
    ];

    records.into_iter().map(|r| (r.key.clone(), r)).collect()
}

fn build_diseases() -> HashMap<String, DiseaseRecord> {
    let records = [
        DiseaseRecord {
            key: "powdery_mildew".into(),
            name: "Powdery Mildew".into(),
            hindi_name: "चूर्णी फफूंद".into(),
            description: "White powdery growth on leaves".into(),
            affected_crops: vec!["wheat".into(), "rice".into()],
            symptoms: vec![
                "White powder on leaves".into(),
                "Yellow leaves".into(),
                "Leaf curling".into(),
                "Stunted growth".into(),
            ],
            treatment: vec![
                "Spray Sulfur dust (organic)".into(),
                "Use Carbendazim".into(),
                "Improve air circulation".into(),
                "Reduce humidity".into(),
            ],
            prevention: vec![
                "Use resistant varieties".into(),
                "Proper spacing".into(),
                "Avoid excess nitrogen".into(),
                "Timely irrigation".into(),
            ],
        },
        DiseaseRecord {
            key: "brown_spot".into(),
            name: "Brown Spot".into(),
            hindi_name: "भूरे धब्बे".into(),
            description: "Brown spots on leaves and stems".into(),
            affected_crops: vec!["rice".into()],
            symptoms: vec![
                "Brown circular spots".into(),
                "Concentric rings".into(),
                "Leaf damage".into(),
                "Reduced yield".into(),
            ],
            treatment: vec![
                "Spray Tricyclazole".into(),
                "Use Mancozeb".into(),
                "Remove infected leaves".into(),
            ],
            prevention: vec![
                "Clean seeds".into(),
                "Crop rotation".into(),
                "Proper drainage".into(),
                "Balanced fertilization".into(),
            ],
        },
        DiseaseRecord {
            key: "leaf_blight".into(),
            name: "Leaf Blight".into(),
            hindi_name: "पत्ती अंगमारी".into(),
            description: "Large necrotic lesions on leaves".into(),
            affected_crops: vec!["rice".into(), "wheat".into()],
            symptoms: vec![
                "Gray-green lesions".into(),
                "Yellow border".into(),
                "Rapid spread".into(),
                "Leaf death".into(),
            ],
            treatment: vec![
                "Spray Metalaxyl".into(),
                "Use Copper fungicide".into(),
                "Remove infected plant parts".into(),
            ],
            prevention: vec![
                "Use resistant varieties".into(),
                "Avoid overcrowding".into(),
                "Maintain sanitation".into(),
                "Proper air circulation".into(),
            ],
        },
    ];

    records.into_iter().map(|r| (r.key.clone(), r)).collect()
}

fn build_soils() -> HashMap<String, SoilRecord> {
    let records = [
        SoilRecord {
            key: "black_soil".into(),
            name: "Black Soil".into(),
            hindi_name: "काली मिट्टी".into(),
            characteristics: vec![
                "Rich in clay".into(),
                "High water retention".into(),
                "Fertile".into(),
                "Good for cotton".into(),
            ],
            suitable_crops: vec!["cotton".into(), "sugarcane".into(), "wheat".into()],
            ph_min: 6.5,
            ph_max: 7.5,
            drainage: "Poor".into(),
            water_holding: "High".into(),
        },
        SoilRecord {
            key: "alluvial".into(),
            name: "Alluvial Soil".into(),
            hindi_name: "दोमट मिट्टी".into(),
            characteristics: vec![
                "Deposited by rivers".into(),
                "Fertile".into(),
                "Well-drained".into(),
                "Good structure".into(),
            ],
            suitable_crops: vec!["wheat".into(), "rice".into(), "sugarcane".into()],
            ph_min: 6.5,
            ph_max: 7.5,
            drainage: "Good".into(),
            water_holding: "Medium".into(),
        },
        SoilRecord {
            key: "red_soil".into(),
            name: "Red Soil".into(),
            hindi_name: "लाल मिट्टी".into(),
            characteristics: vec![
                "Iron oxide rich".into(),
                "Less fertile".into(),
                "Acidic".into(),
                "Well-drained".into(),
            ],
            suitable_crops: vec!["cotton".into(), "peanut".into(), "tobacco".into()],
            ph_min: 5.5,
            ph_max: 6.5,
            drainage: "Good".into(),
            water_holding: "Low".into(),
        },
        SoilRecord {
            key: "laterite".into(),
            name: "Laterite Soil".into(),
            hindi_name: "लेटराइट मिट्टी".into(),
            characteristics: vec![
                "Iron-rich".into(),
                "Hard when dry".into(),
                "Acidic".into(),
                "Low fertility".into(),
            ],
            suitable_crops: vec!["tea".into(), "coffee".into(), "coconut".into()],
            ph_min: 4.5,
            ph_max: 5.5,
            drainage: "Good".into(),
            water_holding: "Low".into(),
        },
    ];

    records.into_iter().map(|r| (r.key.clone(), r)).collect()
}

fn build_fertilizers() -> HashMap<String, FertilizerRecord> {
    let records = [
        FertilizerRecord {
            key: "nitrogen".into(),
            name: "Nitrogen (N)".into(),
            hindi_name: "नाइट्रोजन".into(),
            sources: vec!["Urea".into(), "Ammonium Nitrate".into(), "Manure".into()],
            benefits: vec![
                "Leaf growth".into(),
                "Protein formation".into(),
                "Green color".into(),
            ],
            deficiency_signs: vec![
                "Pale leaves".into(),
                "Stunted growth".into(),
                "Poor yield".into(),
            ],
        },
        FertilizerRecord {
            key: "phosphorus".into(),
            name: "Phosphorus (P)".into(),
            hindi_name: "फॉस्फोरस".into(),
            sources: vec![
                "Superphosphate".into(),
                "Rock phosphate".into(),
                "Bone meal".into(),
            ],
            benefits: vec![
                "Root development".into(),
                "Flowering".into(),
                "Energy transfer".into(),
            ],
            deficiency_signs: vec![
                "Purple leaves".into(),
                "Weak roots".into(),
                "Poor flowering".into(),
            ],
        },
        FertilizerRecord {
            key: "potassium".into(),
            name: "Potassium (K)".into(),
            hindi_name: "पोटेशियम".into(),
            sources: vec![
                "Muriate of potash".into(),
                "Sulfate of potash".into(),
                "Wood ash".into(),
            ],
            benefits: vec![
                "Disease resistance".into(),
                "Fruit quality".into(),
                "Drought tolerance".into(),
            ],
            deficiency_signs: vec![
                "Leaf edges brown".into(),
                "Poor fruit quality".into(),
                "Wilting".into(),
            ],
        },
    ];

    records.into_iter().map(|r| (r.key.clone(), r)).collect()
}

fn build_schemes() -> HashMap<String, SchemeRecord> {
    let records = [
        SchemeRecord {
            key: "pm_kisan".into(),
            name: "PM Kisan Samman Nidhi".into(),
            description: "Income support for farmers".into(),
            amount: "₹6000/year".into(),
            eligibility: "All farmers".into(),
            website: "https://pmkisan.gov.in".into(),
        },
        SchemeRecord {
            key: "pm_fasal_bima".into(),
            name: "Pradhan Mantri Fasal Bima Yojana".into(),
            description: "Crop insurance scheme".into(),
            amount: "Variable".into(),
            eligibility: "All farmers".into(),
            website: "https://pmfby.gov.in".into(),
        },
        SchemeRecord {
            key: "soil_health".into(),
            name: "Soil Health Card Scheme".into(),
            description: "Free soil testing & recommendations".into(),
            amount: "Free".into(),
            eligibility: "All farmers".into(),
            website: "https://soilhealth.dac.gov.in".into(),
        },
    ];

    records.into_iter().map(|r| (r.key.clone(), r)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_display_names() {
        assert_eq!(normalize_key("Black Soil"), "black_soil");
        assert_eq!(normalize_key("  Powdery Mildew "), "powdery_mildew");
    }

    #[test]
    fn looks_up_by_display_name() {
        let kb = KnowledgeBase::new();
        assert_eq!(kb.soil("Black Soil").unwrap().key, "black_soil");
        assert_eq!(kb.crop("Cotton").unwrap().name, "Cotton");
        assert_eq!(kb.disease("Powdery Mildew").unwrap().key, "powdery_mildew");
    }

    #[test]
    fn fuzzy_matches_near_miss_spellings() {
        let kb = KnowledgeBase::new();
        assert_eq!(kb.disease("powdry mildew").unwrap().key, "powdery_mildew");
        assert_eq!(kb.crop("soyabean").unwrap().key, "soybean");
    }

    #[test]
    fn unknown_names_return_none() {
        let kb = KnowledgeBase::new();
        assert!(kb.crop("dragonfruit").is_none());
        assert!(kb.soil("martian regolith").is_none());
    }

    #[test]
    fn black_soil_suits_cotton() {
        let kb = KnowledgeBase::new();
        let crops = kb.suitable_crops("Black Soil");
        assert!(crops.contains(&"cotton".to_string()));
        assert!(kb.suitable_crops("unknown dirt").is_empty());
    }

    #[test]
    fn tables_have_expected_sizes() {
        let kb = KnowledgeBase::new();
        assert_eq!(kb.crops().count(), 5);
        assert_eq!(kb.diseases().count(), 3);
        assert_eq!(kb.soils().count(), 4);
        assert_eq!(kb.fertilizers().count(), 3);
        assert_eq!(kb.schemes().count(), 3);
    }
}
