use std::f64::consts::PI;

use super::types::{InterestMode, ProjectionInputs, SimulationInputs, YearRow};

/// Year-by-year account projection under fixed contribution and rate
/// assumptions. Running totals stay unrounded between years; each recorded
/// row is a rounded copy of the state at the start of that year.
pub fn project(inputs: &ProjectionInputs) -> Vec<YearRow> {
    match inputs.mode {
        InterestMode::Compound => project_compound(inputs),
        InterestMode::Simple => project_simple(inputs),
    }
}

fn record_row(year: u32, total: f64, contributions: f64) -> YearRow {
    let total = total.round();
    let contributions = contributions.round();
    YearRow {
        year,
        total,
        contributions,
        earnings: total - contributions,
    }
}

fn project_compound(inputs: &ProjectionInputs) -> Vec<YearRow> {
    let monthly_rate = inputs.annual_rate / 12.0;
    let mut rows = Vec::with_capacity(inputs.years as usize + 1);
    let mut total = inputs.initial_capital;
    let mut contributions = inputs.initial_capital;

    for year in 0..=inputs.years {
        rows.push(record_row(year, total, contributions));

        if year < inputs.years {
            // The yearly top-up starts in the second simulated year and
            // rides along with one month's growth before the monthly loop.
            if year > 0 {
                total = (total + inputs.yearly_saving) * (1.0 + monthly_rate);
                contributions += inputs.yearly_saving;
            }

            for _ in 0..12 {
                total = (total + inputs.monthly_saving) * (1.0 + monthly_rate);
                contributions += inputs.monthly_saving;
            }
        }
    }

    rows
}

fn project_simple(inputs: &ProjectionInputs) -> Vec<YearRow> {
    if inputs.years == 0 {
        return vec![record_row(0, inputs.initial_capital, inputs.initial_capital)];
    }

    let years = f64::from(inputs.years);
    let total_investment = inputs.initial_capital
        + inputs.monthly_saving * 12.0 * years
        + inputs.yearly_saving * years;
    // Interest accrues linearly on the total eventual investment, so early
    // rows are credited for deposits that have not been made yet.
    let total_interest = total_investment * inputs.annual_rate * years;

    let mut rows = Vec::with_capacity(inputs.years as usize + 1);
    let mut current_investment = inputs.initial_capital;

    for year in 0..=inputs.years {
        let accrued = total_interest * f64::from(year) / years;
        rows.push(record_row(year, current_investment + accrued, current_investment));

        if year < inputs.years {
            current_investment += inputs.yearly_saving + inputs.monthly_saving * 12.0;
        }
    }

    rows
}

/// Monte Carlo estimate of terminal capital under normally distributed
/// monthly returns. Each trial runs on its own derived random stream, so the
/// sample set is reproducible for a fixed seed and trials stay independent.
pub fn simulate(inputs: &SimulationInputs) -> Vec<f64> {
    let monthly_mean = inputs.mean_return / 12.0;
    let monthly_vol = inputs.volatility / 12.0_f64.sqrt();

    let mut samples = Vec::with_capacity(inputs.simulations as usize);
    for trial in 0..inputs.simulations {
        let mut rng = Rng::new(derive_seed(inputs.seed, trial));
        let mut total = inputs.initial_capital;

        for year in 0..inputs.years {
            if year > 0 {
                total += inputs.yearly_saving;
            }

            for _ in 0..12 {
                let return_rate = monthly_mean + monthly_vol * rng.standard_normal();
                total = (total + inputs.monthly_saving) * (1.0 + return_rate);
            }
        }

        samples.push(total);
    }

    samples
}

fn derive_seed(base_seed: u64, trial: u32) -> u64 {
    splitmix64(base_seed ^ u64::from(trial))
}

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

struct Rng {
    state: u64,
    cached_normal: Option<f64>,
}

impl Rng {
    fn new(seed: u64) -> Self {
        let state = if seed == 0 {
            0xA5A5_A5A5_A5A5_A5A5
        } else {
            seed
        };
        Self {
            state,
            cached_normal: None,
        }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    fn next_f64(&mut self) -> f64 {
        const DENOM: f64 = (1_u64 << 53) as f64;
        let v = self.next_u64() >> 11;
        ((v as f64) + 0.5) / DENOM
    }

    fn standard_normal(&mut self) -> f64 {
        if let Some(z) = self.cached_normal.take() {
            return z;
        }

        let u1 = self.next_f64().max(1e-12);
        let u2 = self.next_f64();
        let r = (-2.0 * u1.ln()).sqrt();
        let theta = 2.0 * PI * u2;

        let z0 = r * theta.cos();
        let z1 = r * theta.sin();
        self.cached_normal = Some(z1);
        z0
    }
}
