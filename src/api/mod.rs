pub mod plan;

use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{Datelike, Local, NaiveDate};
use clap::{Parser, error::ErrorKind};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::core::{RateSolveIteration, YearRecord};
use plan::{PlanError, PlanOutcome, PlanRequest, build_plan, evaluate_plan};

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SolvePayload {
    current_value: Option<f64>,
    annual_contribution: Option<f64>,
    withdrawal_today: Option<f64>,
    income_growth: Option<f64>,
    payout_years: Option<u32>,
    current_date: Option<NaiveDate>,
    asset_date: Option<NaiveDate>,
    payout_start_date: Option<NaiveDate>,
}

#[derive(Parser, Debug)]
#[command(
    name = "required-growth",
    about = "Average annual asset growth rate needed to fund an inflation-adjusted withdrawal stream"
)]
struct Cli {
    #[arg(long, help = "Asset balance measured or received on --asset-date")]
    current_value: f64,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "Constant yearly contribution until payouts start"
    )]
    annual_contribution: f64,
    #[arg(long, help = "Yearly withdrawal needed, in today's money")]
    withdrawal_today: f64,
    #[arg(
        long,
        default_value_t = 3.0,
        help = "Yearly withdrawal growth (inflation) in percent, e.g. 3"
    )]
    income_growth_rate: f64,
    #[arg(long, default_value_t = 30, help = "Number of payout years")]
    payout_years: u32,
    #[arg(long, help = "Today's date (YYYY-MM-DD); defaults to the local date")]
    current_date: Option<NaiveDate>,
    #[arg(
        long,
        help = "Date the current value applies from (YYYY-MM-DD); defaults to --current-date"
    )]
    asset_date: Option<NaiveDate>,
    #[arg(long, help = "First payout date (YYYY-MM-DD)")]
    payout_start_date: NaiveDate,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SolveResponse {
    current_date: NaiveDate,
    asset_date: NaiveDate,
    payout_start_date: NaiveDate,
    growth_phase_years: f64,
    inflation_years: f64,
    withdrawal_today: f64,
    inflated_withdrawal: f64,
    achievable: bool,
    required_growth_rate: Option<f64>,
    starting_balance: Option<f64>,
    converged: bool,
    message: String,
    iterations: Vec<RateSolveIteration>,
    yearly_schedule: Vec<YearRecord>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn build_plan_request(cli: Cli, today: NaiveDate) -> PlanRequest {
    let current_date = cli.current_date.unwrap_or(today);
    PlanRequest {
        current_value: cli.current_value,
        annual_contribution: cli.annual_contribution,
        withdrawal_today: cli.withdrawal_today,
        income_growth_rate: cli.income_growth_rate / 100.0,
        payout_years: cli.payout_years,
        current_date,
        asset_date: cli.asset_date.unwrap_or(current_date),
        payout_start_date: cli.payout_start_date,
    }
}

fn build_solve_response(request: &PlanRequest, outcome: &PlanOutcome) -> SolveResponse {
    let scenario = outcome.plan.scenario;
    SolveResponse {
        current_date: request.current_date,
        asset_date: request.asset_date,
        payout_start_date: request.payout_start_date,
        growth_phase_years: scenario.growth_phase_years,
        inflation_years: outcome.plan.inflation_years,
        withdrawal_today: outcome.plan.withdrawal_today,
        inflated_withdrawal: scenario.first_year_withdrawal,
        achievable: outcome.report.result.is_solved(),
        required_growth_rate: outcome.report.result.rate(),
        starting_balance: outcome.report.result.starting_balance(),
        converged: outcome.report.converged,
        message: outcome.message(),
        iterations: outcome.report.iterations.clone(),
        yearly_schedule: outcome.yearly_schedule.clone(),
    }
}

fn solve_request(request: &PlanRequest) -> Result<SolveResponse, PlanError> {
    let plan = build_plan(request)?;
    let outcome = evaluate_plan(plan);
    Ok(build_solve_response(request, &outcome))
}

/// Parses command line arguments (program name first) and returns the solve
/// result as pretty JSON.
pub fn run_cli<I, T>(args: I) -> Result<String, String>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            return Ok(e.to_string());
        }
        Err(e) => return Err(e.to_string()),
    };
    let today = Local::now().date_naive();
    let request = build_plan_request(cli, today);
    let response = solve_request(&request).map_err(|e| e.to_string())?;
    serde_json::to_string_pretty(&response).map_err(|e| format!("failed to encode result: {e}"))
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/api/solve", get(solve_get_handler).post(solve_post_handler))
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    info!("required growth HTTP API listening on http://{addr}");
    info!("Local access: http://127.0.0.1:{port}/api/solve");
    axum::serve(listener, app).await
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, serde_json::json!({ "status": "ok" }))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn solve_get_handler(Query(payload): Query<SolvePayload>) -> Response {
    solve_handler_impl(payload).await
}

async fn solve_post_handler(Json(payload): Json<SolvePayload>) -> Response {
    solve_handler_impl(payload).await
}

async fn solve_handler_impl(payload: SolvePayload) -> Response {
    let today = Local::now().date_naive();
    let request = api_request_from_payload(payload, today);
    match solve_request(&request) {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(err) => {
            warn!("rejected solve request: {err}");
            error_response(StatusCode::BAD_REQUEST, &err.to_string())
        }
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn api_request_from_json(json: &str, today: NaiveDate) -> Result<PlanRequest, String> {
    let payload = serde_json::from_str::<SolvePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    Ok(api_request_from_payload(payload, today))
}

fn api_request_from_payload(payload: SolvePayload, today: NaiveDate) -> PlanRequest {
    let mut cli = default_cli_for_api(today);

    if let Some(v) = payload.current_value {
        cli.current_value = v;
    }
    if let Some(v) = payload.annual_contribution {
        cli.annual_contribution = v;
    }
    if let Some(v) = payload.withdrawal_today {
        cli.withdrawal_today = v;
    }
    if let Some(v) = payload.income_growth {
        cli.income_growth_rate = v;
    }
    if let Some(v) = payload.payout_years {
        cli.payout_years = v;
    }
    if let Some(v) = payload.current_date {
        cli.current_date = Some(v);
    }
    if let Some(v) = payload.asset_date {
        cli.asset_date = Some(v);
    }
    if let Some(v) = payload.payout_start_date {
        cli.payout_start_date = v;
    }

    build_plan_request(cli, today)
}

fn default_cli_for_api(today: NaiveDate) -> Cli {
    Cli {
        current_value: 100_000.0,
        annual_contribution: 12_000.0,
        withdrawal_today: 50_000.0,
        income_growth_rate: 3.0,
        payout_years: 20,
        current_date: Some(today),
        asset_date: Some(january_first(today.year() + 6, today)),
        payout_start_date: january_first(today.year() + 14, today),
    }
}

fn january_first(year: i32, fallback: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(fallback)
}
