use super::amortization::{LoanTerms, PeriodEntry, amortization_schedule, overflow, round_money};
use crate::error::{LoanError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Payments due in one month, summed over a set of loans.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyAggregate {
    pub month: u32,
    pub total_principal_payment: Decimal,
    pub total_interest_payment: Decimal,
    pub total_monthly_payment: Decimal,
}

impl MonthlyAggregate {
    fn empty(month: u32) -> Self {
        Self {
            month,
            total_principal_payment: Decimal::ZERO,
            total_interest_payment: Decimal::ZERO,
            total_monthly_payment: Decimal::ZERO,
        }
    }

    fn add(&mut self, entry: &PeriodEntry) -> Result<()> {
        self.total_principal_payment =
            accumulate(self.total_principal_payment, entry.principal_payment)?;
        self.total_interest_payment =
            accumulate(self.total_interest_payment, entry.interest_payment)?;
        self.total_monthly_payment =
            accumulate(self.total_monthly_payment, entry.monthly_payment)?;
        Ok(())
    }

    fn rounded(self) -> Self {
        Self {
            month: self.month,
            total_principal_payment: round_money(self.total_principal_payment),
            total_interest_payment: round_money(self.total_interest_payment),
            total_monthly_payment: round_money(self.total_monthly_payment),
        }
    }
}

/// Everything paid over the full life of a set of loans.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PaymentTotals {
    pub total_principal_paid: Decimal,
    pub total_interest_paid: Decimal,
    pub total_payments: Decimal,
}

impl PaymentTotals {
    fn add(&mut self, entry: &PeriodEntry) -> Result<()> {
        self.total_principal_paid =
            accumulate(self.total_principal_paid, entry.principal_payment)?;
        self.total_interest_paid =
            accumulate(self.total_interest_paid, entry.interest_payment)?;
        self.total_payments =
            accumulate(self.total_payments, entry.monthly_payment)?;
        Ok(())
    }

    fn rounded(self) -> Self {
        Self {
            total_principal_paid: round_money(self.total_principal_paid),
            total_interest_paid: round_money(self.total_interest_paid),
            total_payments: round_money(self.total_payments),
        }
    }
}

fn accumulate(sum: Decimal, value: Decimal) -> Result<Decimal> {
    sum.checked_add(value).ok_or_else(overflow)
}

/// State of a single loan after a given month has been paid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointInTimeSummary {
    pub current_balance: Decimal,
    pub principal_paid: Decimal,
    pub interest_paid: Decimal,
}

/// Sums same-month payments across the schedules of all `loans`.
///
/// A loan only contributes to the months of its own term. The result is
/// ordered by month and each sum is rounded to cents. Sums are taken over
/// the already-rounded schedule entries.
pub fn monthly_payments(loans: &[LoanTerms]) -> Result<Vec<MonthlyAggregate>> {
    let mut by_month: BTreeMap<u32, MonthlyAggregate> = BTreeMap::new();

    for terms in loans {
        for entry in &amortization_schedule(terms)? {
            by_month
                .entry(entry.month)
                .or_insert_with(|| MonthlyAggregate::empty(entry.month))
                .add(entry)?;
        }
    }

    Ok(by_month.into_values().map(MonthlyAggregate::rounded).collect())
}

/// Sums every schedule entry of every loan into one set of totals.
pub fn payment_totals(loans: &[LoanTerms]) -> Result<PaymentTotals> {
    let mut totals = PaymentTotals::default();

    for terms in loans {
        for entry in &amortization_schedule(terms)? {
            totals.add(entry)?;
        }
    }

    Ok(totals.rounded())
}

/// Reports paid-to-date figures and the balance of a loan at `month`.
pub fn summarize_at(terms: &LoanTerms, month: u32) -> Result<PointInTimeSummary> {
    if !(1..=terms.loan_term()).contains(&month) {
        return Err(LoanError::invalid("Invalid month number"));
    }

    let schedule = amortization_schedule(terms)?;
    let paid = &schedule.entries()[..month as usize];
    let current_balance = paid
        .last()
        .map(|entry| entry.remaining_balance)
        .unwrap_or_default();

    Ok(PointInTimeSummary {
        current_balance,
        principal_paid: paid
            .iter()
            .try_fold(Decimal::ZERO, |sum, e| accumulate(sum, e.principal_payment))?,
        interest_paid: paid
            .iter()
            .try_fold(Decimal::ZERO, |sum, e| accumulate(sum, e.interest_payment))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn terms(amount: Decimal, rate: Decimal, term: u32) -> LoanTerms {
        LoanTerms::new(amount, rate, term).unwrap()
    }

    #[test]
    fn test_monthly_payments_empty() {
        assert!(monthly_payments(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_monthly_payments_mixed_terms() {
        let long = terms(dec!(20000), dec!(3.5), 48);
        let short = terms(dec!(10000), dec!(4.0), 36);
        let aggregates = monthly_payments(&[long, short]).unwrap();

        assert_eq!(aggregates.len(), 48);
        assert!(aggregates.windows(2).all(|w| w[0].month + 1 == w[1].month));

        let first = aggregates[0];
        assert_eq!(first.month, 1);
        assert_eq!(first.total_principal_payment, dec!(650.70));
        assert_eq!(first.total_interest_payment, dec!(91.66));
        assert_eq!(first.total_monthly_payment, dec!(742.36));

        // Months past the short loan's term only carry the long loan.
        let long_schedule = amortization_schedule(&long).unwrap();
        for aggregate in &aggregates[36..] {
            let entry = long_schedule.period(aggregate.month).unwrap();
            assert_eq!(aggregate.total_principal_payment, entry.principal_payment);
            assert_eq!(aggregate.total_interest_payment, entry.interest_payment);
            assert_eq!(aggregate.total_monthly_payment, entry.monthly_payment);
        }
    }

    #[test]
    fn test_payment_totals_empty() {
        assert_eq!(payment_totals(&[]).unwrap(), PaymentTotals::default());
    }

    #[test]
    fn test_payment_totals_single_loan() {
        let totals = payment_totals(&[terms(dec!(10000), dec!(5.0), 24)]).unwrap();
        assert_eq!(totals.total_principal_paid, dec!(10000.01));
        assert_eq!(totals.total_interest_paid, dec!(529.14));
        assert_eq!(totals.total_payments, dec!(10529.04));
    }

    #[test]
    fn test_payment_totals_are_additive() {
        let a = terms(dec!(20000), dec!(3.5), 48);
        let b = terms(dec!(10000), dec!(4.0), 36);

        let combined = payment_totals(&[a, b]).unwrap();
        let ta = payment_totals(&[a]).unwrap();
        let tb = payment_totals(&[b]).unwrap();

        assert_eq!(
            combined.total_principal_paid,
            ta.total_principal_paid + tb.total_principal_paid
        );
        assert_eq!(
            combined.total_interest_paid,
            ta.total_interest_paid + tb.total_interest_paid
        );
        assert_eq!(combined.total_payments, ta.total_payments + tb.total_payments);
    }

    #[test]
    fn test_summarize_at_mid_term() {
        let summary = summarize_at(&terms(dec!(25000), dec!(5.0), 60), 12).unwrap();
        assert_eq!(summary.current_balance, dec!(20486.12));
        assert_eq!(summary.principal_paid, dec!(4513.88));
        assert_eq!(summary.interest_paid, dec!(1147.48));
    }

    #[test]
    fn test_summarize_at_final_month_matches_totals() {
        let loan = terms(dec!(20000), dec!(3.5), 48);
        let summary = summarize_at(&loan, 48).unwrap();
        let totals = payment_totals(&[loan]).unwrap();
        let schedule = amortization_schedule(&loan).unwrap();

        assert_eq!(
            summary.current_balance,
            schedule.last().unwrap().remaining_balance
        );
        assert_eq!(summary.principal_paid, totals.total_principal_paid);
        assert_eq!(summary.interest_paid, totals.total_interest_paid);
    }

    #[test]
    fn test_summarize_at_first_month() {
        let summary = summarize_at(&terms(dec!(10000), dec!(5.0), 24), 1).unwrap();
        assert_eq!(summary.current_balance, dec!(9602.95));
        assert_eq!(summary.principal_paid, dec!(397.05));
        assert_eq!(summary.interest_paid, dec!(41.67));
    }

    #[test]
    fn test_summarize_at_rejects_out_of_range_months() {
        let loan = terms(dec!(10000), dec!(5.0), 24);
        assert!(matches!(
            summarize_at(&loan, 0),
            Err(LoanError::InvalidArgument(_))
        ));
        assert!(matches!(
            summarize_at(&loan, 25),
            Err(LoanError::InvalidArgument(_))
        ));
    }

    fn oversized() -> LoanTerms {
        terms(Decimal::from_i128_with_scale(5 * 10i128.pow(28), 0), dec!(0), 1)
    }

    #[test]
    fn test_monthly_payments_overflow_is_an_error() {
        assert!(matches!(
            monthly_payments(&[oversized(), oversized()]),
            Err(LoanError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_payment_totals_overflow_is_an_error() {
        assert!(matches!(
            payment_totals(&[oversized(), oversized()]),
            Err(LoanError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_summarize_at_overflow_is_an_error() {
        // Each payment fits, but the interest paid so far does not.
        let loan = terms(Decimal::from_i128_with_scale(7 * 10i128.pow(28), 0), dec!(600), 12);
        assert!(amortization_schedule(&loan).is_ok());
        assert!(summarize_at(&loan, 1).is_ok());
        assert!(matches!(
            summarize_at(&loan, 12),
            Err(LoanError::InvalidArgument(_))
        ));
    }
}
