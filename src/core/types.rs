use serde::Serialize;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum InterestMode {
    Compound,
    Simple,
}

#[derive(Debug, Clone, Copy)]
pub struct ProjectionInputs {
    pub initial_capital: f64,
    pub monthly_saving: f64,
    pub yearly_saving: f64,
    pub years: u32,
    pub annual_rate: f64,
    pub mode: InterestMode,
}

/// One row of the projection series. Recorded values are whole currency
/// units; `earnings == total - contributions` holds exactly after rounding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct YearRow {
    pub year: u32,
    pub total: f64,
    pub contributions: f64,
    pub earnings: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct SimulationInputs {
    pub initial_capital: f64,
    pub monthly_saving: f64,
    pub yearly_saving: f64,
    pub years: u32,
    pub mean_return: f64,
    pub volatility: f64,
    pub simulations: u32,
    pub seed: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioResult {
    pub label: String,
    pub annual_rate: f64,
    pub final_total: f64,
    pub final_earnings: f64,
}

/// Ratio metrics over the final projection row. `None` marks a metric that
/// is undefined for the given inputs (zero initial capital or contributions).
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnMetrics {
    pub annualized_return: Option<f64>,
    pub total_return: Option<f64>,
    pub multiplier: Option<f64>,
    pub efficiency_ratio: Option<f64>,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionSummary {
    pub min: f64,
    pub p5: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p95: f64,
    pub max: f64,
    pub mean: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionBreakdown {
    pub monthly_deposit: f64,
    pub monthly_per_year: f64,
    pub monthly_lifetime: f64,
    pub yearly_deposit: f64,
    pub yearly_lifetime: f64,
    pub combined_per_year: f64,
}
