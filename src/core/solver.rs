use log::debug;

use super::types::{RateSolveIteration, RateSolveReport, ScenarioInput, SolverResult};
use super::valuation::{future_value_of_assets, present_value_of_payouts};

pub const SEARCH_MIN_RATE: f64 = -0.2;
pub const SEARCH_MAX_RATE: f64 = 0.5;
pub const RATE_TOLERANCE: f64 = 1e-6;
pub const MAX_ITERATIONS: u32 = 100;

// A midpoint this close to either search bound means no sign change was found.
const UNACHIEVABLE_AT_OR_ABOVE: f64 = 0.499;
const UNACHIEVABLE_AT_OR_BELOW: f64 = -0.199;

const REFINE_ITERATIONS: u32 = 8;

/// Break-even average annual growth rate for the scenario, or `Unachievable`
/// when no rate inside (-20%, 50%) lets the assets fund every withdrawal.
pub fn compute_required_growth_rate(
    current_value: f64,
    growth_phase_years: f64,
    annual_contribution: f64,
    first_year_withdrawal: f64,
    payout_years: u32,
    income_growth_rate: f64,
) -> SolverResult {
    solve(&ScenarioInput {
        current_value,
        annual_contribution,
        growth_phase_years,
        first_year_withdrawal,
        payout_years,
        income_growth_rate,
    })
}

pub fn solve(scenario: &ScenarioInput) -> SolverResult {
    solve_with_trace(scenario).result
}

/// Same as [`solve`], keeping every bisection step for display.
pub fn solve_with_trace(scenario: &ScenarioInput) -> RateSolveReport {
    let mut iterations = Vec::with_capacity(MAX_ITERATIONS as usize);
    let mut lo = SEARCH_MIN_RATE;
    let mut hi = SEARCH_MAX_RATE;
    // Signed funding gap at each bound, filled in once the bound has moved.
    let mut gap_lo = f64::NAN;
    let mut gap_hi = f64::NAN;
    let mut mid = (lo + hi) * 0.5;
    let mut converged = false;

    for it in 1..=MAX_ITERATIONS {
        mid = (lo + hi) * 0.5;
        if (hi - lo).abs() < RATE_TOLERANCE {
            converged = true;
            break;
        }

        let assets = assets_at(scenario, mid);
        let liabilities = liabilities_at(scenario, mid);
        iterations.push(RateSolveIteration {
            iteration: it,
            lower_bound: lo,
            upper_bound: hi,
            candidate_rate: mid,
            assets,
            liabilities,
        });

        if assets > liabilities {
            hi = mid;
            gap_hi = assets - liabilities;
        } else {
            lo = mid;
            gap_lo = assets - liabilities;
        }
    }

    if mid >= UNACHIEVABLE_AT_OR_ABOVE || mid <= UNACHIEVABLE_AT_OR_BELOW {
        debug!(
            "no break-even rate inside search bounds (midpoint {mid:.6} after {} steps)",
            iterations.len()
        );
        return RateSolveReport {
            result: SolverResult::Unachievable,
            iterations,
            converged,
        };
    }

    let rate = refine_within_bracket(scenario, mid, (lo, gap_lo), (hi, gap_hi));
    let starting_balance = assets_at(scenario, rate);
    debug!(
        "solved break-even rate {rate:.8} after {} steps, starting balance {starting_balance:.2}",
        iterations.len()
    );

    RateSolveReport {
        result: SolverResult::Solved {
            rate,
            starting_balance,
        },
        iterations,
        converged,
    }
}

fn assets_at(scenario: &ScenarioInput, rate: f64) -> f64 {
    future_value_of_assets(
        scenario.current_value,
        scenario.growth_phase_years,
        scenario.annual_contribution,
        rate,
    )
}

fn liabilities_at(scenario: &ScenarioInput, rate: f64) -> f64 {
    present_value_of_payouts(
        scenario.first_year_withdrawal,
        scenario.payout_years,
        scenario.income_growth_rate,
        rate,
    )
}

fn funding_gap(scenario: &ScenarioInput, rate: f64) -> f64 {
    assets_at(scenario, rate) - liabilities_at(scenario, rate)
}

/// Illinois false-position steps inside the final bisection bracket. Falls
/// back to the bisection midpoint whenever the bracket is not a clean sign
/// change. The result never leaves `[lo, hi]`.
fn refine_within_bracket(
    scenario: &ScenarioInput,
    midpoint: f64,
    (mut lo, mut gap_lo): (f64, f64),
    (mut hi, mut gap_hi): (f64, f64),
) -> f64 {
    if !(gap_lo.is_finite() && gap_hi.is_finite()) || gap_lo > 0.0 || gap_hi <= 0.0 {
        return midpoint;
    }

    let mut estimate = midpoint;
    let mut last_side = 0i8;
    for _ in 0..REFINE_ITERATIONS {
        let denom = gap_hi - gap_lo;
        if denom <= 0.0 || !denom.is_finite() {
            break;
        }
        let candidate = (lo * gap_hi - hi * gap_lo) / denom;
        estimate = if (lo..=hi).contains(&candidate) {
            candidate
        } else {
            (lo + hi) * 0.5
        };

        let gap = funding_gap(scenario, estimate);
        if !gap.is_finite() {
            return midpoint;
        }
        if gap == 0.0 {
            break;
        }
        if gap > 0.0 {
            hi = estimate;
            gap_hi = gap;
            if last_side == 1 {
                gap_lo *= 0.5;
            }
            last_side = 1;
        } else {
            lo = estimate;
            gap_lo = gap;
            if last_side == -1 {
                gap_hi *= 0.5;
            }
            last_side = -1;
        }
    }
    estimate
}
