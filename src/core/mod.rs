mod schedule;
mod solver;
mod types;
mod valuation;

pub use schedule::{YearlySchedule, compute_yearly_schedule};
pub use solver::{
    MAX_ITERATIONS, RATE_TOLERANCE, SEARCH_MAX_RATE, SEARCH_MIN_RATE,
    compute_required_growth_rate, solve, solve_with_trace,
};
pub use types::{RateSolveIteration, RateSolveReport, ScenarioInput, SolverResult, YearRecord};
pub use valuation::{RATE_EPSILON, future_value_of_assets, present_value_of_payouts};
