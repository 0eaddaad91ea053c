mod analytics;
mod engine;
mod types;

pub use analytics::{
    SCENARIO_RATE_DELTA, contribution_breakdown, percentile, rate_scenarios, recommendations,
    return_metrics, summarize,
};
pub use engine::{project, simulate};
pub use types::{
    ContributionBreakdown, DistributionSummary, InterestMode, ProjectionInputs, ReturnMetrics,
    ScenarioResult, SimulationInputs, YearRow,
};
