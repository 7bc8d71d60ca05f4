//! Turns dated, user-facing inputs into the numeric scenario the solver works
//! on, and runs the solve-then-project sequence for the surfaces.

use chrono::NaiveDate;
use thiserror::Error;

use crate::core::{
    RateSolveReport, ScenarioInput, SolverResult, YearRecord, compute_yearly_schedule,
    solve_with_trace,
};

pub const DAYS_PER_YEAR: f64 = 365.25;
pub const MAX_PAYOUT_YEARS: u32 = 200;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    #[error("{field} must be a finite number")]
    InvalidNumber { field: &'static str },
    #[error("dates are not in chronological order: {later} is before {earlier}")]
    InvalidDuration { earlier: NaiveDate, later: NaiveDate },
    #[error("{0}")]
    InvalidInput(String),
}

/// Inputs as a person states them: today's withdrawal need plus the three
/// dates that bound the growth and inflation periods. Rates are fractions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanRequest {
    pub current_value: f64,
    pub annual_contribution: f64,
    pub withdrawal_today: f64,
    pub income_growth_rate: f64,
    pub payout_years: u32,
    pub current_date: NaiveDate,
    pub asset_date: NaiveDate,
    pub payout_start_date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plan {
    pub scenario: ScenarioInput,
    pub withdrawal_today: f64,
    pub inflation_years: f64,
}

#[derive(Debug, Clone)]
pub struct PlanOutcome {
    pub plan: Plan,
    pub report: RateSolveReport,
    pub yearly_schedule: Vec<YearRecord>,
}

impl PlanOutcome {
    pub fn message(&self) -> String {
        match self.report.result {
            SolverResult::Solved { rate, .. } => format!(
                "Under the given conditions, the required average annual asset growth rate is approximately {:.2}%.",
                rate * 100.0
            ),
            SolverResult::Unachievable => "The goal is not achievable within a realistic growth rate range with the given conditions. Try adjusting the variables.".to_string(),
        }
    }
}

/// Elapsed years between two dates on a 365.25-day year.
pub fn years_between(earlier: NaiveDate, later: NaiveDate) -> Result<f64, PlanError> {
    let days = (later - earlier).num_days();
    if days < 0 {
        return Err(PlanError::InvalidDuration { earlier, later });
    }
    Ok(days as f64 / DAYS_PER_YEAR)
}

/// Today's withdrawal need expressed in money of `years` from now.
pub fn inflate_withdrawal(withdrawal_today: f64, income_growth_rate: f64, years: f64) -> f64 {
    withdrawal_today * (1.0 + income_growth_rate).powf(years)
}

pub fn build_plan(request: &PlanRequest) -> Result<Plan, PlanError> {
    for (field, value) in [
        ("current_value", request.current_value),
        ("annual_contribution", request.annual_contribution),
        ("withdrawal_today", request.withdrawal_today),
        ("income_growth_rate", request.income_growth_rate),
    ] {
        if !value.is_finite() {
            return Err(PlanError::InvalidNumber { field });
        }
    }
    if request.withdrawal_today <= 0.0 {
        return Err(PlanError::InvalidInput(
            "withdrawal_today must be > 0".to_string(),
        ));
    }
    if request.payout_years == 0 || request.payout_years > MAX_PAYOUT_YEARS {
        return Err(PlanError::InvalidInput(format!(
            "payout_years must be between 1 and {MAX_PAYOUT_YEARS}"
        )));
    }
    if request.income_growth_rate <= -1.0 {
        return Err(PlanError::InvalidInput(
            "income_growth_rate must be > -100%".to_string(),
        ));
    }

    let growth_phase_years = years_between(request.asset_date, request.payout_start_date)?;
    let inflation_years = years_between(request.current_date, request.payout_start_date)?;
    let first_year_withdrawal = inflate_withdrawal(
        request.withdrawal_today,
        request.income_growth_rate,
        inflation_years,
    );

    Ok(Plan {
        scenario: ScenarioInput {
            current_value: request.current_value,
            annual_contribution: request.annual_contribution,
            growth_phase_years,
            first_year_withdrawal,
            payout_years: request.payout_years,
            income_growth_rate: request.income_growth_rate,
        },
        withdrawal_today: request.withdrawal_today,
        inflation_years,
    })
}

pub fn evaluate_plan(plan: Plan) -> PlanOutcome {
    let scenario = plan.scenario;
    let report = solve_with_trace(&scenario);
    let yearly_schedule = match report.result {
        SolverResult::Solved {
            rate,
            starting_balance,
        } => compute_yearly_schedule(
            starting_balance,
            scenario.payout_years,
            rate,
            scenario.first_year_withdrawal,
            scenario.income_growth_rate,
        ),
        SolverResult::Unachievable => Vec::new(),
    };
    PlanOutcome {
        plan,
        report,
        yearly_schedule,
    }
}
