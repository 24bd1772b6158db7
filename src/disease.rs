//! Disease reference lookups and the image-classification stub.

use crate::knowledge::KnowledgeBase;
use serde::Serialize;

/// Classification result for a leaf image.
#[derive(Debug, Clone, Serialize)]
pub struct Classification {
    pub disease: String,
    pub confidence: f64,
    pub recommendation: String,
}

/// Stub detector. No vision model is loaded; `classify` always returns the
/// same result. Kept so the API surface matches a deployment where the
/// model weights are actually present.
#[derive(Debug, Default)]
pub struct DiseaseDetector;

impl DiseaseDetector {
    pub fn classify(&self) -> Classification {
        Classification {
            disease: "Powdery Mildew".to_string(),
            confidence: 0.94,
            recommendation: "Use Sulfur dust spray".to_string(),
        }
    }
}

/// Formatted treatment advisory for a disease, or None when unknown.
pub fn treatment_advisory(kb: &KnowledgeBase, name: &str) -> Option<String> {
    let disease = kb.disease(name)?;

    let mut out = format!("Disease: {}\nDescription: {}\n", disease.name, disease.description);

    out.push_str("\nSymptoms:\n");
    for symptom in &disease.symptoms {
        out.push_str(&format!("- {symptom}\n"));
    }

    out.push_str("\nTreatment:\n");
    for step in &disease.treatment {
        out.push_str(&format!("- {step}\n"));
    }

    out.push_str("\nPrevention:\n");
    for step in &disease.prevention {
        out.push_str(&format!("- {step}\n"));
    }

    Some(out.trim_end().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stub_classification_is_fixed() {
        let detector = DiseaseDetector;
        let c = detector.classify();
        assert_eq!(c.disease, "Powdery Mildew");
        assert_eq!(c.confidence, 0.94);
    }

    #[test]
    fn advisory_covers_symptoms_treatment_prevention() {
        let kb = KnowledgeBase::new();
        let text = treatment_advisory(&kb, "Brown Spot").unwrap();
        assert!(text.contains("Disease: Brown Spot"));
        assert!(text.contains("Brown circular spots"));
        assert!(text.contains("Spray Tricyclazole"));
        assert!(text.contains("Crop rotation"));
    }

    #[test]
    fn unknown_disease_has_no_advisory() {
        let kb = KnowledgeBase::new();
        assert!(treatment_advisory(&kb, "space blight").is_none());
    }
}
