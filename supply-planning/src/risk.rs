//! Supplier risk rules and the pure categoriser.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use supply_shared::models::supplier::{RiskCategory, RiskFactor, RiskProfile};
use supply_shared::{RiskLevel, Supplier};

/// A factor at or above this score makes the supplier high risk
pub const HIGH_RISK_SCORE: f64 = 7.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskThresholds {
    pub flagged_credit_ratings: Vec<String>,
    pub on_time_delivery: f64,
    pub quality_score: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            flagged_credit_ratings: vec!["B".to_string(), "C".to_string()],
            on_time_delivery: 90.0,
            quality_score: 7.0,
        }
    }
}

fn factor(
    category: RiskCategory,
    description: String,
    impact: f64,
    probability: f64,
    risk_score: f64,
    mitigation: &str,
) -> RiskFactor {
    RiskFactor {
        category,
        description,
        impact,
        probability,
        risk_score,
        mitigation: mitigation.to_string(),
    }
}

/// Evaluate the rule set against the supplier's current data
pub fn evaluate(supplier: &Supplier, thresholds: &RiskThresholds) -> Vec<RiskFactor> {
    let mut factors = Vec::new();

    let rating = supplier.financial.credit_rating.trim().to_uppercase();
    if thresholds.flagged_credit_ratings.iter().any(|r| r.eq_ignore_ascii_case(&rating)) {
        factors.push(factor(
            RiskCategory::Financial,
            format!("Low credit rating ({})", rating),
            8.0,
            0.6,
            7.0,
            "Require payment guarantees and review financial statements quarterly",
        ));
    }

    let on_time = supplier.performance.on_time_delivery;
    if on_time < thresholds.on_time_delivery {
        factors.push(factor(
            RiskCategory::Operational,
            format!("On-time delivery at {:.1}%", on_time),
            7.0,
            0.5,
            6.0,
            "Agree a delivery improvement plan and qualify a backup supplier",
        ));
    }

    let quality = supplier.performance.quality_score;
    if quality < thresholds.quality_score {
        factors.push(factor(
            RiskCategory::Quality,
            format!("Quality score at {:.1}", quality),
            6.0,
            0.4,
            5.0,
            "Increase incoming inspection and schedule a quality audit",
        ));
    }

    factors
}

/// Overall category from factor scores; with no factors the prior category stands
pub fn categorize(factors: &[RiskFactor], prior: RiskLevel) -> RiskLevel {
    if factors.iter().any(|f| f.risk_score >= HIGH_RISK_SCORE) {
        RiskLevel::High
    } else if !factors.is_empty() {
        RiskLevel::Medium
    } else {
        prior
    }
}

/// Next risk profile for `supplier`.
///
/// Sub-scores are rebuilt from baseline on every call; only the overall
/// category carries over when no factor applies.
pub fn assess(supplier: &Supplier, thresholds: &RiskThresholds, now: DateTime<Utc>) -> RiskProfile {
    let factors = evaluate(supplier, thresholds);
    let mut profile = RiskProfile {
        overall_risk: categorize(&factors, supplier.risk_profile.overall_risk),
        ..RiskProfile::default()
    };

    for f in &factors {
        match f.category {
            RiskCategory::Financial => profile.financial_risk = f.risk_score,
            RiskCategory::Operational | RiskCategory::Quality => {
                profile.operational_risk = profile.operational_risk.max(f.risk_score)
            }
            RiskCategory::Geographic => profile.geographic_risk = f.risk_score,
            RiskCategory::Compliance => profile.compliance_risk = f.risk_score,
            RiskCategory::Cyber => profile.cyber_risk = f.risk_score,
        }
    }
    profile.risk_factors = factors;
    profile.last_assessment = Some(now);
    profile
}

#[cfg(test)]
mod tests {
    use super::*;
    use supply_shared::models::supplier::{FinancialInfo, NewSupplier, SupplierContact, SupplierPerformance};
    use supply_shared::{SupplierTier, SupplierType};

    fn supplier(credit_rating: &str, on_time: f64, quality: f64) -> Supplier {
        Supplier::from_request(
            NewSupplier {
                name: "Acme".to_string(),
                supplier_type: SupplierType::Manufacturer,
                tier: SupplierTier::Tier2,
                status: None,
                rating: 7.0,
                contact: SupplierContact {
                    contact_name: "Ops".to_string(),
                    email: "ops@acme.test".to_string(),
                    phone: None,
                    country: "US".to_string(),
                    city: None,
                },
                financial: FinancialInfo {
                    credit_rating: credit_rating.to_string(),
                    payment_terms: "Net 30".to_string(),
                    annual_revenue: 5_000_000.0,
                    currency: "USD".to_string(),
                },
                categories: vec![],
                certifications: vec![],
                performance: Some(SupplierPerformance {
                    on_time_delivery: on_time,
                    quality_score: quality,
                    ..SupplierPerformance::default()
                }),
            },
            Utc::now(),
        )
    }

    fn scored(score: f64) -> RiskFactor {
        factor(RiskCategory::Operational, String::new(), score, 0.5, score, "")
    }

    #[test]
    fn test_categorize() {
        assert_eq!(categorize(&[scored(7.0)], RiskLevel::Low), RiskLevel::High);
        assert_eq!(categorize(&[scored(6.0), scored(2.0)], RiskLevel::Low), RiskLevel::Medium);
        assert_eq!(categorize(&[], RiskLevel::High), RiskLevel::High);
        assert_eq!(categorize(&[], RiskLevel::Low), RiskLevel::Low);
    }

    #[test]
    fn test_low_credit_rating_is_high_risk() {
        let profile = assess(&supplier("B", 98.0, 9.0), &RiskThresholds::default(), Utc::now());
        assert_eq!(profile.overall_risk, RiskLevel::High);
        assert_eq!(profile.risk_factors.len(), 1);
        assert_eq!(profile.risk_factors[0].risk_score, 7.0);
        assert_eq!(profile.financial_risk, 7.0);
        assert!(profile.last_assessment.is_some());
    }

    #[test]
    fn test_late_deliveries_are_medium_risk() {
        let profile = assess(&supplier("AA", 88.0, 9.0), &RiskThresholds::default(), Utc::now());
        assert_eq!(profile.overall_risk, RiskLevel::Medium);
        assert_eq!(profile.risk_factors[0].category, RiskCategory::Operational);
        assert_eq!(profile.operational_risk, 6.0);
    }

    #[test]
    fn test_clean_supplier_keeps_prior_category() {
        let mut s = supplier("A", 97.0, 9.0);
        s.risk_profile.overall_risk = RiskLevel::Medium;
        let profile = assess(&s, &RiskThresholds::default(), Utc::now());
        assert_eq!(profile.overall_risk, RiskLevel::Medium);
        assert!(profile.risk_factors.is_empty());
    }

    #[test]
    fn test_recovered_supplier_resets_sub_scores() {
        let thresholds = RiskThresholds::default();
        let mut s = supplier("C", 88.0, 6.5);
        s.risk_profile = assess(&s, &thresholds, Utc::now());
        assert_eq!(s.risk_profile.financial_risk, 7.0);
        assert_eq!(s.risk_profile.operational_risk, 6.0);

        s.financial.credit_rating = "A".to_string();
        s.performance.on_time_delivery = 96.0;
        s.performance.quality_score = 8.5;
        let profile = assess(&s, &thresholds, Utc::now());
        assert!(profile.risk_factors.is_empty());
        assert_eq!(profile.financial_risk, 1.0);
        assert_eq!(profile.operational_risk, 1.0);
        assert_eq!(profile.overall_risk, RiskLevel::High);
    }
}
