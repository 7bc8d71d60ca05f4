use serde::Serialize;

/// Numeric description of one retirement scenario, with every date already
/// reduced to a duration by the caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScenarioInput {
    pub current_value: f64,
    pub annual_contribution: f64,
    pub growth_phase_years: f64,
    pub first_year_withdrawal: f64,
    pub payout_years: u32,
    pub income_growth_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SolverResult {
    Solved { rate: f64, starting_balance: f64 },
    Unachievable,
}

impl SolverResult {
    pub fn rate(&self) -> Option<f64> {
        match self {
            SolverResult::Solved { rate, .. } => Some(*rate),
            SolverResult::Unachievable => None,
        }
    }

    pub fn starting_balance(&self) -> Option<f64> {
        match self {
            SolverResult::Solved {
                starting_balance, ..
            } => Some(*starting_balance),
            SolverResult::Unachievable => None,
        }
    }

    pub fn is_solved(&self) -> bool {
        matches!(self, SolverResult::Solved { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateSolveIteration {
    pub iteration: u32,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub candidate_rate: f64,
    pub assets: f64,
    pub liabilities: f64,
}

#[derive(Debug, Clone)]
pub struct RateSolveReport {
    pub result: SolverResult,
    pub iterations: Vec<RateSolveIteration>,
    pub converged: bool,
}

/// One payout year of the balance projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearRecord {
    pub year: u32,
    pub starting_balance: f64,
    pub growth_amount: f64,
    pub withdrawal: f64,
    pub ending_balance: f64,
}
