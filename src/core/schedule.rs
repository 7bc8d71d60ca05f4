use super::types::YearRecord;

/// Year-by-year payout projection at a fixed growth rate.
///
/// Each call to [`YearlySchedule::new`] starts from scratch, so the same
/// inputs always produce the same records. Balances are not clamped at zero:
/// a negative ending balance means the scenario ran out of money.
#[derive(Debug, Clone)]
pub struct YearlySchedule {
    year: u32,
    payout_years: u32,
    balance: f64,
    withdrawal: f64,
    rate: f64,
    income_growth_rate: f64,
}

impl YearlySchedule {
    pub fn new(
        starting_balance: f64,
        payout_years: u32,
        rate: f64,
        first_year_withdrawal: f64,
        income_growth_rate: f64,
    ) -> Self {
        Self {
            year: 0,
            payout_years,
            balance: starting_balance,
            withdrawal: first_year_withdrawal,
            rate,
            income_growth_rate,
        }
    }
}

impl Iterator for YearlySchedule {
    type Item = YearRecord;

    fn next(&mut self) -> Option<YearRecord> {
        if self.year >= self.payout_years {
            return None;
        }
        self.year += 1;

        let starting_balance = self.balance;
        let growth_amount = starting_balance * self.rate;
        let ending_balance = starting_balance + growth_amount - self.withdrawal;
        let record = YearRecord {
            year: self.year,
            starting_balance,
            growth_amount,
            withdrawal: self.withdrawal,
            ending_balance,
        };

        self.balance = ending_balance;
        self.withdrawal *= 1.0 + self.income_growth_rate;
        Some(record)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.payout_years.saturating_sub(self.year) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for YearlySchedule {}

pub fn compute_yearly_schedule(
    starting_balance: f64,
    payout_years: u32,
    rate: f64,
    first_year_withdrawal: f64,
    income_growth_rate: f64,
) -> Vec<YearRecord> {
    YearlySchedule::new(
        starting_balance,
        payout_years,
        rate,
        first_year_withdrawal,
        income_growth_rate,
    )
    .collect()
}
