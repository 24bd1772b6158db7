//! Market price estimation.
//!
//! Quotes are derived from the static crop table's reference price; there
//! is no live mandi integration. The spread is a fixed ±10% band around the
//! reference, labeled with the public market boards a live integration
//! would consult.

use std::sync::Arc;

use chrono::Utc;

use crate::knowledge::KnowledgeBase;
use crate::models::PriceQuote;

const DEFAULT_LOCATION: &str = "Maharashtra";
const QUOTE_SOURCE: &str = "e-NAM/AGMARK";

pub struct MarketEstimator {
    kb: Arc<KnowledgeBase>,
}

impl MarketEstimator {
    pub fn new(kb: Arc<KnowledgeBase>) -> Self {
        Self { kb }
    }

    /// Price quote for a crop, or None when the crop is not in the table.
    pub fn quote(&self, crop: &str, location: Option<&str>) -> Option<PriceQuote> {
        let record = self.kb.crop(crop)?;
        let reference = record.price_per_quintal;

        Some(PriceQuote {
            crop: record.name.clone(),
            location: location.unwrap_or(DEFAULT_LOCATION).to_string(),
            price_per_quintal: reference,
            price_per_kg: reference / 100.0,
            min_price: reference * 0.9,
            max_price: reference * 1.1,
            avg_price: reference,
            trend: "stable".to_string(),
            source: QUOTE_SOURCE.to_string(),
            quoted_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn estimator() -> MarketEstimator {
        MarketEstimator::new(Arc::new(KnowledgeBase::new()))
    }

    #[test]
    fn quote_spreads_around_reference_price() {
        let quote = estimator().quote("wheat", None).unwrap();
        assert_eq!(quote.crop, "Wheat");
        assert_eq!(quote.location, "Maharashtra");
        assert_eq!(quote.price_per_quintal, 2200.0);
        assert_eq!(quote.price_per_kg, 22.0);
        assert_eq!(quote.min_price, 1980.0);
        assert_eq!(quote.max_price, 2420.0);
        assert_eq!(quote.avg_price, 2200.0);
        assert_eq!(quote.trend, "stable");
    }

    #[test]
    fn quote_honors_caller_location() {
        let quote = estimator().quote("Cotton", Some("Gujarat")).unwrap();
        assert_eq!(quote.location, "Gujarat");
        assert_eq!(quote.price_per_quintal, 5500.0);
    }

    #[test]
    fn unknown_crop_has_no_quote() {
        assert!(estimator().quote("saffron", None).is_none());
    }
}
