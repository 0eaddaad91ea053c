use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::core::{
    ContributionBreakdown, DistributionSummary, InterestMode, ProjectionInputs, ReturnMetrics,
    ScenarioResult, SimulationInputs, YearRow, contribution_breakdown, project, rate_scenarios,
    recommendations, return_metrics, simulate, summarize,
};

/// Canonical parameter table: defaults, units, and help text. Rates and
/// volatility are taken in percent at this boundary and converted to
/// fractions before they reach the engine.
#[derive(Parser, Debug)]
#[command(
    name = "nestegg",
    about = "Savings projector with compound/simple interest and Monte Carlo outcome estimation"
)]
struct Cli {
    #[arg(long, default_value_t = 1000.0, help = "Starting capital")]
    initial_capital: f64,
    #[arg(long, default_value_t = 150.0, help = "Deposit added every month")]
    monthly_saving: f64,
    #[arg(
        long,
        default_value_t = 1000.0,
        help = "Extra deposit added once a year"
    )]
    yearly_saving: f64,
    #[arg(long, default_value_t = 15, help = "Investment horizon in years")]
    years: u32,
    #[arg(
        long,
        default_value_t = 7.0,
        help = "Expected annual return in percent, e.g. 7"
    )]
    annual_rate: f64,
    #[arg(
        long,
        default_value_t = true,
        action = clap::ArgAction::Set,
        help = "Reinvest gains so they earn subsequent returns"
    )]
    compound_interest: bool,
    #[arg(
        long,
        default_value_t = 15.0,
        help = "Annual return volatility in percent"
    )]
    volatility: f64,
    #[arg(long, default_value_t = 1000)]
    simulations: u32,
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ProjectPayload {
    initial_capital: Option<f64>,
    monthly_saving: Option<f64>,
    yearly_saving: Option<f64>,
    years: Option<u32>,
    annual_rate: Option<f64>,
    compound_interest: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SimulatePayload {
    initial_capital: Option<f64>,
    monthly_saving: Option<f64>,
    yearly_saving: Option<f64>,
    years: Option<u32>,
    mean_return: Option<f64>,
    volatility: Option<f64>,
    simulations: Option<u32>,
    seed: Option<u64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectResponse {
    years: u32,
    annual_rate: f64,
    compound_interest: bool,
    rows: Vec<YearRow>,
    final_row: YearRow,
    metrics: ReturnMetrics,
    scenarios: Vec<ScenarioResult>,
    breakdown: ContributionBreakdown,
    recommendations: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SimulateResponse {
    years: u32,
    mean_return: f64,
    volatility: f64,
    simulations: u32,
    seed: u64,
    summary: DistributionSummary,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn default_cli_for_api() -> Cli {
    Cli {
        initial_capital: 1000.0,
        monthly_saving: 150.0,
        yearly_saving: 1000.0,
        years: 15,
        annual_rate: 7.0,
        compound_interest: true,
        volatility: 15.0,
        simulations: 1000,
        seed: 42,
    }
}

fn build_projection_inputs(cli: &Cli) -> Result<ProjectionInputs, String> {
    if !cli.initial_capital.is_finite() || cli.initial_capital < 0.0 {
        return Err("--initial-capital must be >= 0".to_string());
    }

    if !cli.monthly_saving.is_finite() || cli.monthly_saving < 0.0 {
        return Err("--monthly-saving must be >= 0".to_string());
    }

    if !cli.yearly_saving.is_finite() || cli.yearly_saving < 0.0 {
        return Err("--yearly-saving must be >= 0".to_string());
    }

    if cli.years == 0 {
        return Err("--years must be >= 1".to_string());
    }

    if cli.years > 100 {
        return Err("--years must be <= 100".to_string());
    }

    if !(-100.0..=100.0).contains(&cli.annual_rate) {
        return Err("--annual-rate must be between -100 and 100".to_string());
    }

    Ok(ProjectionInputs {
        initial_capital: cli.initial_capital,
        monthly_saving: cli.monthly_saving,
        yearly_saving: cli.yearly_saving,
        years: cli.years,
        annual_rate: cli.annual_rate / 100.0,
        mode: if cli.compound_interest {
            InterestMode::Compound
        } else {
            InterestMode::Simple
        },
    })
}

fn build_simulation_inputs(cli: &Cli) -> Result<SimulationInputs, String> {
    let projection = build_projection_inputs(cli)?;

    if !(0.0..=100.0).contains(&cli.volatility) {
        return Err("--volatility must be between 0 and 100".to_string());
    }

    if cli.simulations == 0 {
        return Err("--simulations must be > 0".to_string());
    }

    Ok(SimulationInputs {
        initial_capital: projection.initial_capital,
        monthly_saving: projection.monthly_saving,
        yearly_saving: projection.yearly_saving,
        years: projection.years,
        mean_return: projection.annual_rate,
        volatility: cli.volatility / 100.0,
        simulations: cli.simulations,
        seed: cli.seed,
    })
}

fn projection_inputs_from_payload(payload: ProjectPayload) -> Result<ProjectionInputs, String> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.initial_capital {
        cli.initial_capital = v;
    }
    if let Some(v) = payload.monthly_saving {
        cli.monthly_saving = v;
    }
    if let Some(v) = payload.yearly_saving {
        cli.yearly_saving = v;
    }
    if let Some(v) = payload.years {
        cli.years = v;
    }
    if let Some(v) = payload.annual_rate {
        cli.annual_rate = v;
    }
    if let Some(v) = payload.compound_interest {
        cli.compound_interest = v;
    }

    build_projection_inputs(&cli)
}

fn simulation_inputs_from_payload(payload: SimulatePayload) -> Result<SimulationInputs, String> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.initial_capital {
        cli.initial_capital = v;
    }
    if let Some(v) = payload.monthly_saving {
        cli.monthly_saving = v;
    }
    if let Some(v) = payload.yearly_saving {
        cli.yearly_saving = v;
    }
    if let Some(v) = payload.years {
        cli.years = v;
    }
    if let Some(v) = payload.mean_return {
        cli.annual_rate = v;
    }
    if let Some(v) = payload.volatility {
        cli.volatility = v;
    }
    if let Some(v) = payload.simulations {
        cli.simulations = v;
    }
    if let Some(v) = payload.seed {
        cli.seed = v;
    }

    build_simulation_inputs(&cli)
}

fn build_project_response(inputs: &ProjectionInputs) -> ProjectResponse {
    let rows = project(inputs);
    let final_row = rows[rows.len() - 1];

    ProjectResponse {
        years: inputs.years,
        annual_rate: inputs.annual_rate,
        compound_interest: inputs.mode == InterestMode::Compound,
        metrics: return_metrics(inputs.initial_capital, inputs.years, &final_row),
        scenarios: rate_scenarios(inputs),
        breakdown: contribution_breakdown(inputs),
        recommendations: recommendations(inputs),
        rows,
        final_row,
    }
}

fn build_simulate_response(inputs: &SimulationInputs) -> SimulateResponse {
    let samples = simulate(inputs);

    SimulateResponse {
        years: inputs.years,
        mean_return: inputs.mean_return,
        volatility: inputs.volatility,
        simulations: inputs.simulations,
        seed: inputs.seed,
        summary: summarize(&samples),
    }
}

/// Projection series in the export schema: a header row plus one line per
/// year with whole-unit values.
fn render_csv(rows: &[YearRow]) -> Result<String, String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(["year", "total", "contributions", "earnings"])
        .map_err(|e| format!("CSV encoding failed: {e}"))?;

    for row in rows {
        writer
            .write_record([
                row.year.to_string(),
                format!("{:.0}", row.total),
                format!("{:.0}", row.contributions),
                format!("{:.0}", row.earnings),
            ])
            .map_err(|e| format!("CSV encoding failed: {e}"))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| format!("CSV encoding failed: {e}"))?;
    String::from_utf8(bytes).map_err(|e| format!("CSV encoding failed: {e}"))
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route(
            "/api/project",
            get(project_get_handler).post(project_post_handler),
        )
        .route("/api/project.csv", get(project_csv_handler))
        .route(
            "/api/simulate",
            get(simulate_get_handler).post(simulate_post_handler),
        )
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    println!("nestegg HTTP API listening on http://{addr}");
    println!("Local access: http://127.0.0.1:{port}/api/project");

    axum::serve(listener, app).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn project_get_handler(Query(payload): Query<ProjectPayload>) -> Response {
    project_handler_impl(payload)
}

async fn project_post_handler(Json(payload): Json<ProjectPayload>) -> Response {
    project_handler_impl(payload)
}

fn project_handler_impl(payload: ProjectPayload) -> Response {
    match projection_inputs_from_payload(payload) {
        Ok(inputs) => json_response(StatusCode::OK, build_project_response(&inputs)),
        Err(msg) => error_response(StatusCode::BAD_REQUEST, &msg),
    }
}

async fn project_csv_handler(Query(payload): Query<ProjectPayload>) -> Response {
    let inputs = match projection_inputs_from_payload(payload) {
        Ok(inputs) => inputs,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };

    match render_csv(&project(&inputs)) {
        Ok(body) => with_cache_control((
            [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
            body,
        )),
        Err(msg) => error_response(StatusCode::INTERNAL_SERVER_ERROR, &msg),
    }
}

async fn simulate_get_handler(Query(payload): Query<SimulatePayload>) -> Response {
    simulate_handler_impl(payload)
}

async fn simulate_post_handler(Json(payload): Json<SimulatePayload>) -> Response {
    simulate_handler_impl(payload)
}

fn simulate_handler_impl(payload: SimulatePayload) -> Response {
    match simulation_inputs_from_payload(payload) {
        Ok(inputs) => json_response(StatusCode::OK, build_simulate_response(&inputs)),
        Err(msg) => error_response(StatusCode::BAD_REQUEST, &msg),
    }
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)))
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}
