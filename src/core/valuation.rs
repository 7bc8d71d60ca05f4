/// Rates closer than this are treated as equal and the closed forms switch to
/// their limits.
pub const RATE_EPSILON: f64 = 1e-9;

/// Balance at the end of the growth phase: the current value compounded for
/// `years` plus a level contribution stream at the same rate.
pub fn future_value_of_assets(
    current_value: f64,
    years: f64,
    annual_contribution: f64,
    growth_rate: f64,
) -> f64 {
    let compounding = (1.0 + growth_rate).powf(years);
    let from_current_value = current_value * compounding;
    let from_contributions = if growth_rate.abs() < RATE_EPSILON {
        annual_contribution * years
    } else {
        annual_contribution * ((compounding - 1.0) / growth_rate)
    };
    from_current_value + from_contributions
}

/// Value at payout start of `payout_years` end-of-year withdrawals that begin
/// at `first_withdrawal` and grow by `income_growth_rate`, discounted at
/// `growth_rate`.
pub fn present_value_of_payouts(
    first_withdrawal: f64,
    payout_years: u32,
    income_growth_rate: f64,
    growth_rate: f64,
) -> f64 {
    let years = payout_years as f64;
    if (growth_rate - income_growth_rate).abs() < RATE_EPSILON {
        return first_withdrawal * years / (1.0 + income_growth_rate);
    }

    let growth_factor = (1.0 + income_growth_rate) / (1.0 + growth_rate);
    (first_withdrawal / (growth_rate - income_growth_rate))
        * (1.0 - growth_factor.powf(years))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::{prop_assert, prop_assume, proptest};

    #[test]
    fn zero_rate_future_value_is_simple_sum() {
        assert_relative_eq!(
            future_value_of_assets(100_000.0, 10.0, 12_000.0, 0.0),
            220_000.0,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            future_value_of_assets(5_000.0, 2.5, 1_000.0, 5e-10),
            7_500.0,
            max_relative = 1e-9
        );
    }

    #[test]
    fn future_value_matches_manual_compounding() {
        // 3 years at 10%: 1000 * 1.331 + 100 * (1.1^2 + 1.1 + 1)
        let fv = future_value_of_assets(1_000.0, 3.0, 100.0, 0.10);
        assert_relative_eq!(fv, 1_331.0 + 331.0, max_relative = 1e-12);
    }

    #[test]
    fn future_value_with_no_growth_phase_is_current_value() {
        assert_relative_eq!(
            future_value_of_assets(42_000.0, 0.0, 9_000.0, 0.07),
            42_000.0,
            max_relative = 1e-12
        );
    }

    #[test]
    fn equal_rates_use_limit_formula() {
        let pv = present_value_of_payouts(50_000.0, 15, 0.03, 0.03);
        assert_relative_eq!(pv, 50_000.0 * 15.0 / 1.03, max_relative = 1e-12);
        assert!((pv - 728_155.34).abs() < 0.01);
    }

    #[test]
    fn present_value_matches_discounted_sum() {
        let (p, m, gi, g) = (60_000.0, 20u32, 0.03, 0.07);
        let mut expected = 0.0;
        let mut payment = p;
        for k in 1..=m {
            expected += payment / (1.0_f64 + g).powi(k as i32);
            payment *= 1.0 + gi;
        }
        assert_relative_eq!(
            present_value_of_payouts(p, m, gi, g),
            expected,
            max_relative = 1e-10
        );
    }

    #[test]
    fn payout_counts_beyond_i32_range_stay_positive() {
        // Effectively a perpetuity: p / (g - g_income).
        let pv = present_value_of_payouts(1_000.0, 3_000_000_000, 0.0, 0.05);
        assert_relative_eq!(pv, 20_000.0, max_relative = 1e-12);
        let limit = present_value_of_payouts(1_000.0, u32::MAX, 0.02, 0.02);
        assert_relative_eq!(limit, 1_000.0 * u32::MAX as f64 / 1.02, max_relative = 1e-12);
    }

    #[test]
    fn limit_formula_is_continuous_with_general_formula() {
        let limit = present_value_of_payouts(80_000.0, 25, 0.025, 0.025);
        let nearby = present_value_of_payouts(80_000.0, 25, 0.025, 0.025 + 1e-7);
        assert_relative_eq!(limit, nearby, max_relative = 1e-4);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_future_value_strictly_increases_with_rate(
            current_value in 0u32..2_000_000,
            contribution in 0u32..100_000,
            years_tenths in 15u32..400,
            low_bp in -1_999i32..4_900,
            step_bp in 10i32..1_000
        ) {
            prop_assume!(current_value > 0 || contribution > 0);
            let high_bp = low_bp + step_bp;
            prop_assume!(high_bp < 5_000);

            let years = years_tenths as f64 / 10.0;
            let low = future_value_of_assets(
                current_value as f64,
                years,
                contribution as f64,
                low_bp as f64 / 10_000.0,
            );
            let high = future_value_of_assets(
                current_value as f64,
                years,
                contribution as f64,
                high_bp as f64 / 10_000.0,
            );
            prop_assert!(high > low, "fv({high_bp}bp)={high} <= fv({low_bp}bp)={low}");
        }

        #[test]
        fn prop_equal_rate_limit_matches_nearby_general_formula(
            withdrawal in 1_000u32..500_000,
            payout_years in 1u32..60,
            income_bp in -500i32..1_000
        ) {
            let income_growth = income_bp as f64 / 10_000.0;
            let limit = present_value_of_payouts(withdrawal as f64, payout_years, income_growth, income_growth);
            let expected = withdrawal as f64 * payout_years as f64 / (1.0 + income_growth);
            prop_assert!((limit - expected).abs() <= 1e-9 * expected);

            let nearby = present_value_of_payouts(
                withdrawal as f64,
                payout_years,
                income_growth,
                income_growth + 1e-7,
            );
            prop_assert!(nearby.is_finite());
            prop_assert!((limit - nearby).abs() <= 1e-4 * limit);
        }
    }
}
