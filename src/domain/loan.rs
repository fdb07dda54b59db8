use super::amortization::LoanTerms;
use super::user::UserId;
use crate::error::Result;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub type LoanId = u32;

/// Payload for opening a loan on behalf of a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLoan {
    pub amount: Decimal,
    pub annual_interest_rate: Decimal,
    pub loan_term: u32,
    pub owner_id: UserId,
}

impl NewLoan {
    /// Validates the payload's terms.
    pub fn terms(&self) -> Result<LoanTerms> {
        LoanTerms::new(self.amount, self.annual_interest_rate, self.loan_term)
    }
}

/// A stored loan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub id: LoanId,
    pub amount: Decimal,
    pub annual_interest_rate: Decimal,
    pub loan_term: u32,
    pub owner_id: UserId,
}

impl Loan {
    pub fn new(id: LoanId, loan: NewLoan) -> Self {
        Self {
            id,
            amount: loan.amount,
            annual_interest_rate: loan.annual_interest_rate,
            loan_term: loan.loan_term,
            owner_id: loan.owner_id,
        }
    }

    /// Maps the stored record onto the amortization engine's input.
    pub fn terms(&self) -> Result<LoanTerms> {
        LoanTerms::new(self.amount, self.annual_interest_rate, self.loan_term)
    }
}
