use crate::error::{LoanError, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

const MONTHS_PER_YEAR: Decimal = dec!(12);
const PERCENT: Decimal = dec!(100);
const MONEY_DP: u32 = 2;

/// Longest accepted term: one hundred years of monthly payments.
pub const MAX_LOAN_TERM: u32 = 1200;

/// Rounds a monetary value to cents.
///
/// Uses banker's rounding and normalizes `-0.00` to `0`.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp(MONEY_DP).normalize()
}

/// Validated inputs of the amortization engine.
///
/// The amount must be positive, the annual rate (a percentage) non-negative
/// and the term between one and [`MAX_LOAN_TERM`] months. Deserialization
/// goes through the same checks, so a `LoanTerms` value is always safe to
/// amortize.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLoanTerms")]
pub struct LoanTerms {
    amount: Decimal,
    annual_interest_rate: Decimal,
    loan_term: u32,
}

#[derive(Deserialize)]
struct RawLoanTerms {
    amount: Decimal,
    annual_interest_rate: Decimal,
    loan_term: u32,
}

impl TryFrom<RawLoanTerms> for LoanTerms {
    type Error = LoanError;

    fn try_from(raw: RawLoanTerms) -> Result<Self> {
        Self::new(raw.amount, raw.annual_interest_rate, raw.loan_term)
    }
}

impl LoanTerms {
    pub fn new(amount: Decimal, annual_interest_rate: Decimal, loan_term: u32) -> Result<Self> {
        if amount <= Decimal::ZERO {
            return Err(LoanError::invalid("Loan amount must be positive"));
        }
        if annual_interest_rate < Decimal::ZERO {
            return Err(LoanError::invalid(
                "Annual interest rate must not be negative",
            ));
        }
        if loan_term == 0 {
            return Err(LoanError::invalid("Loan term must be at least one month"));
        }
        if loan_term > MAX_LOAN_TERM {
            return Err(LoanError::invalid(format!(
                "Loan term must not exceed {MAX_LOAN_TERM} months"
            )));
        }
        Ok(Self {
            amount,
            annual_interest_rate,
            loan_term,
        })
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn annual_interest_rate(&self) -> Decimal {
        self.annual_interest_rate
    }

    pub fn loan_term(&self) -> u32 {
        self.loan_term
    }

    /// Monthly decimal rate derived from the annual percentage.
    pub fn periodic_rate(&self) -> Decimal {
        self.annual_interest_rate / MONTHS_PER_YEAR / PERCENT
    }

    /// The constant payment that fully amortizes the loan over its term.
    pub fn level_payment(&self) -> Result<Decimal> {
        let rate = self.periodic_rate();
        let periods = Decimal::from(self.loan_term);

        let mut growth = Decimal::ONE;
        let step = Decimal::ONE + rate;
        for _ in 0..self.loan_term {
            growth = growth.checked_mul(step).ok_or_else(overflow)?;
        }

        // Rates too small to register in 28 digits behave like a zero rate.
        if rate.is_zero() || growth == Decimal::ONE {
            return Ok(self.amount / periods);
        }

        // amount * r / (1 - (1 + r)^-n) == amount * r * (g / (g - 1))
        let factor = growth
            .checked_div(growth - Decimal::ONE)
            .ok_or_else(overflow)?;
        self.amount
            .checked_mul(rate)
            .and_then(|v| v.checked_mul(factor))
            .ok_or_else(overflow)
    }
}

pub(crate) fn overflow() -> LoanError {
    LoanError::invalid("Loan terms exceed the supported numeric range")
}

/// One row of an amortization schedule. Money fields are rounded to cents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodEntry {
    pub month: u32,
    pub remaining_balance: Decimal,
    pub monthly_payment: Decimal,
    pub principal_payment: Decimal,
    pub interest_payment: Decimal,
}

/// An ordered amortization schedule covering months `1..=loan_term`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Schedule {
    entries: Vec<PeriodEntry>,
}

impl Schedule {
    pub fn entries(&self) -> &[PeriodEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the entry for a 1-based month.
    pub fn period(&self, month: u32) -> Option<&PeriodEntry> {
        let index = usize::try_from(month).ok()?.checked_sub(1)?;
        self.entries.get(index)
    }

    pub fn last(&self) -> Option<&PeriodEntry> {
        self.entries.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PeriodEntry> {
        self.entries.iter()
    }
}

impl IntoIterator for Schedule {
    type Item = PeriodEntry;
    type IntoIter = std::vec::IntoIter<PeriodEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a Schedule {
    type Item = &'a PeriodEntry;
    type IntoIter = std::slice::Iter<'a, PeriodEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Generates the fixed-payment amortization schedule for a loan.
///
/// Every entry is rounded to cents as it is emitted, while the running
/// balance itself is carried unrounded. Because of that the principal column
/// may not add up to the amount exactly.
pub fn amortization_schedule(terms: &LoanTerms) -> Result<Schedule> {
    let rate = terms.periodic_rate();
    let payment = terms.level_payment()?;

    let mut balance = terms.amount();
    let entries = (1..=terms.loan_term())
        .map(|month| {
            let interest = balance * rate;
            let principal = payment - interest;
            balance -= principal;

            PeriodEntry {
                month,
                remaining_balance: round_money(balance),
                monthly_payment: round_money(payment),
                principal_payment: round_money(principal),
                interest_payment: round_money(interest),
            }
        })
        .collect();

    Ok(Schedule { entries })
}
