use super::loan::Loan;
use crate::error::{LoanError, Result};
use serde::{Deserialize, Serialize};

pub type UserId = u32;

/// Returned by a user store when the email is already in use.
pub(crate) const EMAIL_TAKEN: &str = "Email already registered";

/// Payload for registering a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
}

impl NewUser {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(LoanError::invalid("Name must not be empty"));
        }
        if self.email.trim().is_empty() {
            return Err(LoanError::invalid("Email must not be empty"));
        }
        Ok(())
    }
}

/// A stored user. Email addresses are unique across the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

impl User {
    pub fn new(id: UserId, user: NewUser) -> Self {
        Self {
            id,
            name: user.name,
            email: user.email,
        }
    }
}

/// A user together with the loans they own.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: User,
    pub loans: Vec<Loan>,
}
