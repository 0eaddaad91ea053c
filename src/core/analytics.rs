use super::engine::project;
use super::types::{
    ContributionBreakdown, DistributionSummary, InterestMode, ProjectionInputs, ReturnMetrics,
    ScenarioResult, YearRow,
};

/// Rate shift applied on either side of the base rate for scenario analysis.
pub const SCENARIO_RATE_DELTA: f64 = 0.02;

pub fn percentile(values: &mut [f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    values.sort_by(|a, b| a.total_cmp(b));

    let n = values.len();
    if n == 1 {
        return values[0];
    }

    let rank = (p / 100.0) * (n as f64 - 1.0);
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;

    if lower == upper {
        values[lower]
    } else {
        let w = rank - lower as f64;
        values[lower] * (1.0 - w) + values[upper] * w
    }
}

pub fn summarize(samples: &[f64]) -> DistributionSummary {
    if samples.is_empty() {
        return DistributionSummary {
            min: 0.0,
            p5: 0.0,
            p25: 0.0,
            p50: 0.0,
            p75: 0.0,
            p95: 0.0,
            max: 0.0,
            mean: 0.0,
        };
    }

    let mut values = samples.to_vec();
    values.sort_by(|a, b| a.total_cmp(b));
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let min = values[0];
    let max = values[values.len() - 1];

    DistributionSummary {
        min,
        p5: percentile(&mut values, 5.0),
        p25: percentile(&mut values, 25.0),
        p50: percentile(&mut values, 50.0),
        p75: percentile(&mut values, 75.0),
        p95: percentile(&mut values, 95.0),
        max,
        mean,
    }
}

pub fn return_metrics(initial_capital: f64, years: u32, final_row: &YearRow) -> ReturnMetrics {
    let annualized_return = if initial_capital > 0.0 && years > 0 {
        Some((final_row.total / initial_capital).powf(1.0 / f64::from(years)) - 1.0)
    } else {
        None
    };

    let total_return = if initial_capital > 0.0 {
        Some(final_row.total / initial_capital - 1.0)
    } else {
        None
    };

    let (multiplier, efficiency_ratio) = if final_row.contributions > 0.0 {
        (
            Some(final_row.total / final_row.contributions),
            Some(final_row.earnings / final_row.contributions),
        )
    } else {
        (None, None)
    };

    ReturnMetrics {
        annualized_return,
        total_return,
        multiplier,
        efficiency_ratio,
    }
}

/// Re-runs the projector at base - 2%, base, and base + 2% and keeps the
/// final row of each variant.
pub fn rate_scenarios(inputs: &ProjectionInputs) -> Vec<ScenarioResult> {
    let rates = [
        inputs.annual_rate - SCENARIO_RATE_DELTA,
        inputs.annual_rate,
        inputs.annual_rate + SCENARIO_RATE_DELTA,
    ];

    rates
        .into_iter()
        .map(|rate| {
            let mut variant = *inputs;
            variant.annual_rate = rate;
            let rows = project(&variant);
            let last = rows[rows.len() - 1];
            ScenarioResult {
                label: format!("rate {:.1}%", rate * 100.0),
                annual_rate: rate,
                final_total: last.total,
                final_earnings: last.earnings,
            }
        })
        .collect()
}

pub fn contribution_breakdown(inputs: &ProjectionInputs) -> ContributionBreakdown {
    let years = f64::from(inputs.years);
    ContributionBreakdown {
        monthly_deposit: inputs.monthly_saving,
        monthly_per_year: inputs.monthly_saving * 12.0,
        monthly_lifetime: inputs.monthly_saving * 12.0 * years,
        yearly_deposit: inputs.yearly_saving,
        yearly_lifetime: inputs.yearly_saving * years,
        combined_per_year: inputs.monthly_saving * 12.0 + inputs.yearly_saving,
    }
}

/// Ordered advisory rules on saving effort, horizon, and interest mode.
/// Every matching message is returned, in rule order.
pub fn recommendations(inputs: &ProjectionInputs) -> Vec<&'static str> {
    let mut advice = Vec::new();

    let monthly_total = inputs.monthly_saving + inputs.yearly_saving / 12.0;
    if monthly_total < 100.0 {
        advice.push("Consider raising your monthly saving to reach your goals sooner.");
    } else if monthly_total > 1000.0 {
        advice.push("Your saving rate is excellent; consider diversifying your investments.");
    }

    if inputs.years < 5 {
        advice.push("For equity investments, prefer a horizon of at least 5 years.");
    } else if inputs.years > 20 {
        advice.push("Over a long horizon, revisit your investment strategy regularly.");
    }

    if inputs.mode == InterestMode::Simple {
        advice.push("Reinvesting gains (compound interest) can significantly improve returns.");
    }

    advice
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, proptest};

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn sample_projection() -> ProjectionInputs {
        ProjectionInputs {
            initial_capital: 1000.0,
            monthly_saving: 150.0,
            yearly_saving: 1000.0,
            years: 15,
            annual_rate: 0.07,
            mode: InterestMode::Compound,
        }
    }

    fn final_row(total: f64, contributions: f64) -> YearRow {
        YearRow {
            year: 10,
            total,
            contributions,
            earnings: total - contributions,
        }
    }

    #[test]
    fn percentile_interpolates_between_points() {
        let mut values = vec![4.0, 1.0, 3.0, 2.0];
        assert_approx(percentile(&mut values, 5.0), 1.15);
        assert_approx(percentile(&mut values, 25.0), 1.75);
        assert_approx(percentile(&mut values, 50.0), 2.5);
        assert_approx(percentile(&mut values, 75.0), 3.25);
        assert_approx(percentile(&mut values, 95.0), 3.85);
    }

    #[test]
    fn percentile_handles_degenerate_inputs() {
        assert_approx(percentile(&mut [], 50.0), 0.0);
        assert_approx(percentile(&mut [7.0], 95.0), 7.0);
        assert_approx(percentile(&mut [10.0, 20.0], 50.0), 15.0);
    }

    #[test]
    fn summarize_reports_the_sample_extremes_and_median() {
        let samples = vec![5.0, 1.0, 3.0, 2.0, 4.0];
        let summary = summarize(&samples);
        assert_approx(summary.min, 1.0);
        assert_approx(summary.p50, 3.0);
        assert_approx(summary.max, 5.0);
        assert_approx(summary.mean, 3.0);
    }

    #[test]
    fn summarize_of_nothing_is_all_zero() {
        let summary = summarize(&[]);
        assert_approx(summary.min, 0.0);
        assert_approx(summary.p95, 0.0);
        assert_approx(summary.mean, 0.0);
    }

    #[test]
    fn return_metrics_computes_the_ratio_set() {
        let metrics = return_metrics(1000.0, 10, &final_row(2000.0, 1600.0));
        assert_approx(metrics.annualized_return.unwrap(), 2.0_f64.powf(0.1) - 1.0);
        assert_approx(metrics.total_return.unwrap(), 1.0);
        assert_approx(metrics.multiplier.unwrap(), 1.25);
        assert_approx(metrics.efficiency_ratio.unwrap(), 400.0 / 1600.0);
    }

    #[test]
    fn return_metrics_guards_zero_initial_capital() {
        let metrics = return_metrics(0.0, 10, &final_row(2000.0, 1600.0));
        assert!(metrics.annualized_return.is_none());
        assert!(metrics.total_return.is_none());
        assert!(metrics.multiplier.is_some());
    }

    #[test]
    fn return_metrics_guards_zero_contributions() {
        let metrics = return_metrics(0.0, 10, &final_row(0.0, 0.0));
        assert!(metrics.multiplier.is_none());
        assert!(metrics.efficiency_ratio.is_none());
    }

    #[test]
    fn return_metrics_guards_a_zero_year_horizon() {
        let metrics = return_metrics(1000.0, 0, &final_row(1000.0, 1000.0));
        assert!(metrics.annualized_return.is_none());
        assert!(metrics.total_return.is_some());
    }

    #[test]
    fn scenarios_cover_the_shifted_rate_grid() {
        let scenarios = rate_scenarios(&sample_projection());
        assert_eq!(scenarios.len(), 3);
        assert_approx(scenarios[0].annual_rate, 0.05);
        assert_approx(scenarios[1].annual_rate, 0.07);
        assert_approx(scenarios[2].annual_rate, 0.09);
        assert_eq!(scenarios[0].label, "rate 5.0%");
        assert_eq!(scenarios[2].label, "rate 9.0%");
    }

    #[test]
    fn scenario_finals_increase_with_the_rate() {
        let scenarios = rate_scenarios(&sample_projection());
        assert_approx(scenarios[0].final_total, 65_357.0);
        assert_approx(scenarios[1].final_total, 79_133.0);
        assert_approx(scenarios[2].final_total, 96_567.0);
        assert!(scenarios[0].final_total < scenarios[1].final_total);
        assert!(scenarios[1].final_total < scenarios[2].final_total);
    }

    #[test]
    fn contribution_breakdown_totals_the_deposit_schedule() {
        let breakdown = contribution_breakdown(&sample_projection());
        assert_approx(breakdown.monthly_deposit, 150.0);
        assert_approx(breakdown.monthly_per_year, 1800.0);
        assert_approx(breakdown.monthly_lifetime, 27_000.0);
        assert_approx(breakdown.yearly_lifetime, 15_000.0);
        assert_approx(breakdown.combined_per_year, 2800.0);
    }

    #[test]
    fn low_saving_effort_triggers_the_raise_nudge() {
        let mut inputs = sample_projection();
        inputs.monthly_saving = 50.0;
        inputs.yearly_saving = 0.0;

        let advice = recommendations(&inputs);
        assert!(advice[0].contains("raising your monthly saving"));
    }

    #[test]
    fn high_saving_effort_triggers_the_diversification_nudge() {
        let mut inputs = sample_projection();
        inputs.monthly_saving = 1200.0;

        let advice = recommendations(&inputs);
        assert!(advice[0].contains("diversifying"));
    }

    #[test]
    fn saving_effort_counts_the_yearly_deposit_pro_rata() {
        let mut inputs = sample_projection();
        inputs.monthly_saving = 95.0;
        inputs.yearly_saving = 120.0;

        // 95 + 120/12 = 105, above the low-saving threshold.
        let advice = recommendations(&inputs);
        assert!(!advice.iter().any(|msg| msg.contains("raising your monthly saving")));
    }

    #[test]
    fn horizon_rules_fire_on_short_and_long_plans() {
        let mut inputs = sample_projection();
        inputs.years = 3;
        assert!(
            recommendations(&inputs)
                .iter()
                .any(|msg| msg.contains("at least 5 years"))
        );

        inputs.years = 25;
        assert!(
            recommendations(&inputs)
                .iter()
                .any(|msg| msg.contains("revisit your investment strategy"))
        );
    }

    #[test]
    fn simple_mode_triggers_the_compounding_nudge() {
        let mut inputs = sample_projection();
        inputs.mode = InterestMode::Simple;

        let advice = recommendations(&inputs);
        assert!(advice.iter().any(|msg| msg.contains("compound interest")));
    }

    #[test]
    fn balanced_plans_get_no_advice() {
        let mut inputs = sample_projection();
        inputs.monthly_saving = 500.0;
        inputs.yearly_saving = 0.0;
        inputs.years = 10;

        assert!(recommendations(&inputs).is_empty());
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_percentiles_are_monotonic(
            samples in proptest::collection::vec(-1_000_000.0f64..1_000_000.0, 1..200)
        ) {
            let summary = summarize(&samples);
            prop_assert!(summary.min <= summary.p5 + EPS);
            prop_assert!(summary.p5 <= summary.p25 + EPS);
            prop_assert!(summary.p25 <= summary.p50 + EPS);
            prop_assert!(summary.p50 <= summary.p75 + EPS);
            prop_assert!(summary.p75 <= summary.p95 + EPS);
            prop_assert!(summary.p95 <= summary.max + EPS);
        }

        #[test]
        fn prop_scenario_finals_never_decrease_in_rate(
            initial in 1u32..100_000,
            monthly in 0u32..3_000,
            yearly in 0u32..20_000,
            years in 1u32..30,
            rate_bp in 0u32..1200,
            compound in proptest::bool::ANY
        ) {
            let inputs = ProjectionInputs {
                initial_capital: f64::from(initial),
                monthly_saving: f64::from(monthly),
                yearly_saving: f64::from(yearly),
                years,
                annual_rate: f64::from(rate_bp) / 10_000.0,
                mode: if compound { InterestMode::Compound } else { InterestMode::Simple },
            };

            let scenarios = rate_scenarios(&inputs);
            prop_assert!(scenarios[0].final_total <= scenarios[1].final_total + EPS);
            prop_assert!(scenarios[1].final_total <= scenarios[2].final_total + EPS);
        }
    }
}
