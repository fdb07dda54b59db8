use crate::domain::loan::{Loan, LoanId, NewLoan};
use crate::domain::ports::{LoanStore, Page, UserStore};
use crate::domain::user::{EMAIL_TAKEN, NewUser, User, UserId};
use crate::error::{LoanError, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

struct Table<K, V> {
    last_id: K,
    rows: BTreeMap<K, V>,
}

impl<K: Default, V> Default for Table<K, V> {
    fn default() -> Self {
        Self {
            last_id: K::default(),
            rows: BTreeMap::new(),
        }
    }
}

fn page_of<V>(rows: impl Iterator<Item = V>, page: Page) -> Vec<V> {
    rows.skip(page.skip).take(page.limit).collect()
}

/// A thread-safe in-memory store for users.
///
/// Ids are handed out sequentially starting at 1. The email uniqueness check
/// and the insert happen under the same write lock.
#[derive(Default, Clone)]
pub struct InMemoryUserStore {
    users: Arc<RwLock<Table<UserId, User>>>,
}

impl InMemoryUserStore {
    /// Creates a new, empty in-memory user store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn insert(&self, user: NewUser) -> Result<User> {
        let mut users = self.users.write().await;
        if users.rows.values().any(|u| u.email == user.email) {
            return Err(LoanError::AlreadyExists(EMAIL_TAKEN.to_string()));
        }

        users.last_id += 1;
        let stored = User::new(users.last_id, user);
        users.rows.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn get(&self, user_id: UserId) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.rows.get(&user_id).cloned())
    }

    async fn list(&self, page: Page) -> Result<Vec<User>> {
        let users = self.users.read().await;
        Ok(page_of(users.rows.values().cloned(), page))
    }
}

/// A thread-safe in-memory store for loans.
#[derive(Default, Clone)]
pub struct InMemoryLoanStore {
    loans: Arc<RwLock<Table<LoanId, Loan>>>,
}

impl InMemoryLoanStore {
    /// Creates a new, empty in-memory loan store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LoanStore for InMemoryLoanStore {
    async fn insert(&self, loan: NewLoan) -> Result<Loan> {
        let mut loans = self.loans.write().await;
        loans.last_id += 1;
        let stored = Loan::new(loans.last_id, loan);
        loans.rows.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn get(&self, loan_id: LoanId) -> Result<Option<Loan>> {
        let loans = self.loans.read().await;
        Ok(loans.rows.get(&loan_id).cloned())
    }

    async fn list(&self, page: Page) -> Result<Vec<Loan>> {
        let loans = self.loans.read().await;
        Ok(page_of(loans.rows.values().cloned(), page))
    }

    async fn list_by_owner(&self, owner_id: UserId) -> Result<Vec<Loan>> {
        let loans = self.loans.read().await;
        Ok(loans
            .rows
            .values()
            .filter(|loan| loan.owner_id == owner_id)
            .cloned()
            .collect())
    }
}
