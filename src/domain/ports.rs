use super::loan::{Loan, LoanId, NewLoan};
use super::user::{NewUser, User, UserId};
use crate::error::Result;
use async_trait::async_trait;
use serde::Deserialize;

pub const DEFAULT_PAGE_LIMIT: usize = 10;
pub const MAX_PAGE_LIMIT: usize = 100;

/// Offset pagination for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Page {
    pub skip: usize,
    pub limit: usize,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl Page {
    pub fn new(skip: usize, limit: usize) -> Self {
        Self {
            skip,
            limit: limit.min(MAX_PAGE_LIMIT),
        }
    }

    /// Clamps the limit to the maximum page size.
    pub fn clamped(self) -> Self {
        Self::new(self.skip, self.limit)
    }
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Stores a new user under a freshly assigned id.
    ///
    /// Fails with `AlreadyExists` when the email is taken.
    async fn insert(&self, user: NewUser) -> Result<User>;
    async fn get(&self, user_id: UserId) -> Result<Option<User>>;
    /// Users in ascending id order.
    async fn list(&self, page: Page) -> Result<Vec<User>>;
}

#[async_trait]
pub trait LoanStore: Send + Sync {
    /// Stores a new loan under a freshly assigned id.
    async fn insert(&self, loan: NewLoan) -> Result<Loan>;
    async fn get(&self, loan_id: LoanId) -> Result<Option<Loan>>;
    /// Loans in ascending id order.
    async fn list(&self, page: Page) -> Result<Vec<Loan>>;
    async fn list_by_owner(&self, owner_id: UserId) -> Result<Vec<Loan>>;
}

pub type UserStoreBox = Box<dyn UserStore>;
pub type LoanStoreBox = Box<dyn LoanStore>;
