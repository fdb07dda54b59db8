use crate::domain::loan::{Loan, LoanId, NewLoan};
use crate::domain::ports::{LoanStore, Page, UserStore};
use crate::domain::user::{EMAIL_TAKEN, NewUser, User, UserId};
use crate::error::{LoanError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Column Family for storing users.
pub const CF_USERS: &str = "users";
/// Column Family mapping an email address to its user id.
pub const CF_USER_EMAILS: &str = "user_emails";
/// Column Family for storing loans.
pub const CF_LOANS: &str = "loans";

/// A persistent store implementation using RocksDB.
///
/// Users and loans live in separate Column Families keyed by their id in
/// big-endian form, so iteration order is id order and the last key is the
/// highest id handed out so far. Values are JSON.
///
/// Id allocation and the email uniqueness check are serialized through
/// `writes`. This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    writes: Arc<Mutex<()>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the required column families exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let families = [CF_USERS, CF_USER_EMAILS, CF_LOANS]
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()));

        let db = DB::open_cf_descriptors(&opts, path, families)?;

        Ok(Self {
            db: Arc::new(db),
            writes: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| {
            LoanError::InternalError(Box::new(std::io::Error::other(format!(
                "{name} column family not found"
            ))))
        })
    }

    fn next_id(&self, cf: &ColumnFamily) -> Result<u32> {
        match self.db.iterator_cf(cf, IteratorMode::End).next() {
            Some(item) => {
                let (key, _) = item?;
                Ok(decode_id(&key)? + 1)
            }
            None => Ok(1),
        }
    }

    fn put<T: Serialize>(&self, cf: &ColumnFamily, id: u32, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec(value).map_err(|e| LoanError::InternalError(Box::new(e)))?;
        self.db.put_cf(cf, id.to_be_bytes(), bytes)?;
        Ok(())
    }

    fn fetch<T: DeserializeOwned>(&self, cf: &ColumnFamily, id: u32) -> Result<Option<T>> {
        match self.db.get_cf(cf, id.to_be_bytes())? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    fn scan<T: DeserializeOwned>(&self, cf: &ColumnFamily) -> impl Iterator<Item = Result<T>> {
        self.db
            .iterator_cf(cf, IteratorMode::Start)
            .map(|item| decode(&item?.1))
    }
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| LoanError::InternalError(Box::new(e)))
}

fn decode_id(key: &[u8]) -> Result<u32> {
    let bytes: [u8; 4] = key.try_into().map_err(|_| {
        LoanError::InternalError(Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("Malformed id key of {} bytes", key.len()),
        )))
    })?;
    Ok(u32::from_be_bytes(bytes))
}

#[async_trait]
impl UserStore for RocksDBStore {
    async fn insert(&self, user: NewUser) -> Result<User> {
        let _guard = self.writes.lock().await;
        let users = self.cf(CF_USERS)?;
        let emails = self.cf(CF_USER_EMAILS)?;

        if self.db.get_pinned_cf(emails, user.email.as_bytes())?.is_some() {
            return Err(LoanError::AlreadyExists(EMAIL_TAKEN.to_string()));
        }

        let stored = User::new(self.next_id(users)?, user);
        self.put(users, stored.id, &stored)?;
        self.db
            .put_cf(emails, stored.email.as_bytes(), stored.id.to_be_bytes())?;

        Ok(stored)
    }

    async fn get(&self, user_id: UserId) -> Result<Option<User>> {
        self.fetch(self.cf(CF_USERS)?, user_id)
    }

    async fn list(&self, page: Page) -> Result<Vec<User>> {
        self.scan(self.cf(CF_USERS)?)
            .skip(page.skip)
            .take(page.limit)
            .collect()
    }
}

#[async_trait]
impl LoanStore for RocksDBStore {
    async fn insert(&self, loan: NewLoan) -> Result<Loan> {
        let _guard = self.writes.lock().await;
        let loans = self.cf(CF_LOANS)?;

        let stored = Loan::new(self.next_id(loans)?, loan);
        self.put(loans, stored.id, &stored)?;

        Ok(stored)
    }

    async fn get(&self, loan_id: LoanId) -> Result<Option<Loan>> {
        self.fetch(self.cf(CF_LOANS)?, loan_id)
    }

    async fn list(&self, page: Page) -> Result<Vec<Loan>> {
        self.scan(self.cf(CF_LOANS)?)
            .skip(page.skip)
            .take(page.limit)
            .collect()
    }

    async fn list_by_owner(&self, owner_id: UserId) -> Result<Vec<Loan>> {
        let mut owned = Vec::new();
        for loan in self.scan::<Loan>(self.cf(CF_LOANS)?) {
            let loan = loan?;
            if loan.owner_id == owner_id {
                owned.push(loan);
            }
        }
        Ok(owned)
    }
}
