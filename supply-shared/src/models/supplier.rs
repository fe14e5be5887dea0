use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SupplierType {
    Manufacturer,
    Distributor,
    Wholesaler,
    ServiceProvider,
    RawMaterial,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SupplierTier {
    Tier1,
    Tier2,
    Tier3,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SupplierStatus {
    Active,
    Inactive,
    Pending,
    Suspended,
    Blacklisted,
}

/// Categorical outcome of a risk assessment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    Financial,
    Operational,
    Quality,
    Geographic,
    Compliance,
    Cyber,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SupplierContact {
    pub contact_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub country: String,
    pub city: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FinancialInfo {
    /// Letter grade, e.g. "AA", "B"
    pub credit_rating: String,
    pub payment_terms: String,
    pub annual_revenue: f64,
    pub currency: String,
}

/// Rolling performance counters, mutated only by the engine
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SupplierPerformance {
    /// Percentage, 0-100
    pub on_time_delivery: f64,
    /// 1-10
    pub quality_score: f64,
    pub responsiveness: f64,
    pub flexibility: f64,
    pub cost_competitiveness: f64,
    pub sustainability: f64,
    pub total_orders: u32,
    pub total_value: f64,
    /// Days
    pub average_lead_time: f64,
    pub defect_rate: f64,
    pub return_rate: f64,
    pub last_order_date: Option<DateTime<Utc>>,
}

impl Default for SupplierPerformance {
    fn default() -> Self {
        Self {
            on_time_delivery: 100.0,
            quality_score: 8.0,
            responsiveness: 8.0,
            flexibility: 7.0,
            cost_competitiveness: 7.0,
            sustainability: 7.0,
            total_orders: 0,
            total_value: 0.0,
            average_lead_time: 14.0,
            defect_rate: 0.0,
            return_rate: 0.0,
            last_order_date: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskFactor {
    pub category: RiskCategory,
    pub description: String,
    /// 1-10
    pub impact: f64,
    /// 0-1
    pub probability: f64,
    pub risk_score: f64,
    pub mitigation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskProfile {
    pub overall_risk: RiskLevel,
    pub financial_risk: f64,
    pub operational_risk: f64,
    pub geographic_risk: f64,
    pub compliance_risk: f64,
    pub cyber_risk: f64,
    pub risk_factors: Vec<RiskFactor>,
    pub last_assessment: Option<DateTime<Utc>>,
}

impl Default for RiskProfile {
    fn default() -> Self {
        Self {
            overall_risk: RiskLevel::Low,
            financial_risk: 1.0,
            operational_risk: 1.0,
            geographic_risk: 1.0,
            compliance_risk: 1.0,
            cyber_risk: 1.0,
            risk_factors: Vec::new(),
            last_assessment: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Supplier {
    pub id: Uuid,
    pub name: String,
    pub supplier_type: SupplierType,
    pub tier: SupplierTier,
    pub status: SupplierStatus,
    /// 1-10
    pub rating: f64,
    pub contact: SupplierContact,
    pub financial: FinancialInfo,
    pub categories: Vec<String>,
    pub certifications: Vec<String>,
    pub performance: SupplierPerformance,
    pub risk_profile: RiskProfile,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Supplier {
    pub fn from_request(request: NewSupplier, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: request.name,
            supplier_type: request.supplier_type,
            tier: request.tier,
            status: request.status.unwrap_or(SupplierStatus::Active),
            rating: request.rating,
            contact: request.contact,
            financial: request.financial,
            categories: request.categories,
            certifications: request.certifications,
            performance: request.performance.unwrap_or_default(),
            risk_profile: RiskProfile::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == SupplierStatus::Active
    }
}

/// Registration command payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSupplier {
    pub name: String,
    pub supplier_type: SupplierType,
    pub tier: SupplierTier,
    #[serde(default)]
    pub status: Option<SupplierStatus>,
    pub rating: f64,
    pub contact: SupplierContact,
    pub financial: FinancialInfo,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub certifications: Vec<String>,
    /// Seed counters when onboarding a supplier with known history
    #[serde(default)]
    pub performance: Option<SupplierPerformance>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SupplierFilter {
    pub status: Option<SupplierStatus>,
    pub supplier_type: Option<SupplierType>,
    pub tier: Option<SupplierTier>,
}

impl SupplierFilter {
    pub fn matches(&self, supplier: &Supplier) -> bool {
        self.status.map_or(true, |s| supplier.status == s)
            && self.supplier_type.map_or(true, |t| supplier.supplier_type == t)
            && self.tier.map_or(true, |t| supplier.tier == t)
    }
}
