use crate::domain::aggregate::{
    self, MonthlyAggregate, PaymentTotals, PointInTimeSummary,
};
use crate::domain::amortization::{LoanTerms, Schedule, amortization_schedule};
use crate::domain::loan::{Loan, LoanId, NewLoan};
use crate::domain::ports::{LoanStoreBox, Page, UserStoreBox};
use crate::domain::user::{NewUser, User, UserId, UserProfile};
use crate::error::{LoanError, Result};
use tracing::info;

const USER_NOT_FOUND: &str = "User not found";
const LOAN_NOT_FOUND: &str = "Loan not found";

/// The entry point for the users-and-loans use cases.
///
/// `LoanService` owns the storage backends, resolves ids to records and feeds
/// the stored loan terms into the amortization engine. Lookups that find
/// nothing surface as `LoanError::NotFound`.
pub struct LoanService {
    users: UserStoreBox,
    loans: LoanStoreBox,
}

impl LoanService {
    /// Creates a new `LoanService` instance.
    ///
    /// # Arguments
    ///
    /// * `users` - The store for users.
    /// * `loans` - The store for loans.
    pub fn new(users: UserStoreBox, loans: LoanStoreBox) -> Self {
        Self { users, loans }
    }

    /// Registers a user. Fails if the email is already taken.
    pub async fn create_user(&self, user: NewUser) -> Result<UserProfile> {
        user.validate()?;
        let user = self.users.insert(user).await?;
        info!(user_id = user.id, "user created");

        Ok(UserProfile {
            user,
            loans: Vec::new(),
        })
    }

    pub async fn get_user(&self, user_id: UserId) -> Result<UserProfile> {
        let user = self.require_user(user_id).await?;
        self.profile(user).await
    }

    pub async fn list_users(&self, page: Page) -> Result<Vec<UserProfile>> {
        let users = self.users.list(page.clamped()).await?;
        let mut profiles = Vec::with_capacity(users.len());
        for user in users {
            profiles.push(self.profile(user).await?);
        }
        Ok(profiles)
    }

    /// Opens a loan for an existing user after validating its terms.
    pub async fn create_loan(&self, loan: NewLoan) -> Result<Loan> {
        loan.terms()?;
        self.require_user(loan.owner_id).await?;

        let loan = self.loans.insert(loan).await?;
        info!(loan_id = loan.id, owner_id = loan.owner_id, "loan created");
        Ok(loan)
    }

    pub async fn get_loan(&self, loan_id: LoanId) -> Result<Loan> {
        self.loans
            .get(loan_id)
            .await?
            .ok_or_else(|| LoanError::not_found(LOAN_NOT_FOUND))
    }

    pub async fn list_loans(&self, page: Page) -> Result<Vec<Loan>> {
        self.loans.list(page.clamped()).await
    }

    pub async fn loans_for_user(&self, user_id: UserId) -> Result<Vec<Loan>> {
        self.require_user(user_id).await?;
        self.loans.list_by_owner(user_id).await
    }

    /// Amortization schedule of a stored loan.
    pub async fn loan_schedule(&self, loan_id: LoanId) -> Result<Schedule> {
        let loan = self.get_loan(loan_id).await?;
        amortization_schedule(&loan.terms()?)
    }

    /// Payments due per month across all loans of a user.
    pub async fn monthly_payments(&self, user_id: UserId) -> Result<Vec<MonthlyAggregate>> {
        let terms = self.user_loan_terms(user_id).await?;
        aggregate::monthly_payments(&terms)
    }

    /// Lifetime payment totals across all loans of a user.
    pub async fn total_payments(&self, user_id: UserId) -> Result<PaymentTotals> {
        let terms = self.user_loan_terms(user_id).await?;
        aggregate::payment_totals(&terms)
    }

    /// Paid-to-date figures of a stored loan as of `month`.
    pub async fn loan_summary(&self, loan_id: LoanId, month: u32) -> Result<PointInTimeSummary> {
        let loan = self.get_loan(loan_id).await?;
        aggregate::summarize_at(&loan.terms()?, month)
    }

    async fn require_user(&self, user_id: UserId) -> Result<User> {
        self.users
            .get(user_id)
            .await?
            .ok_or_else(|| LoanError::not_found(USER_NOT_FOUND))
    }

    async fn profile(&self, user: User) -> Result<UserProfile> {
        let loans = self.loans.list_by_owner(user.id).await?;
        Ok(UserProfile { user, loans })
    }

    async fn user_loan_terms(&self, user_id: UserId) -> Result<Vec<LoanTerms>> {
        self.loans_for_user(user_id)
            .await?
            .iter()
            .map(Loan::terms)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::in_memory::{InMemoryLoanStore, InMemoryUserStore};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn service() -> LoanService {
        LoanService::new(
            Box::new(InMemoryUserStore::new()),
            Box::new(InMemoryLoanStore::new()),
        )
    }

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Janet Doe".to_string(),
            email: email.to_string(),
        }
    }

    fn new_loan(owner_id: UserId, amount: Decimal, rate: Decimal, term: u32) -> NewLoan {
        NewLoan {
            amount,
            annual_interest_rate: rate,
            loan_term: term,
            owner_id,
        }
    }

    #[tokio::test]
    async fn test_create_user_rejects_duplicate_email() {
        let service = service();
        service.create_user(new_user("janet@example.com")).await.unwrap();

        let result = service.create_user(new_user("janet@example.com")).await;
        match result {
            Err(LoanError::AlreadyExists(message)) => {
                assert_eq!(message, "Email already registered")
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_loan_requires_owner() {
        let service = service();
        let result = service
            .create_loan(new_loan(42, dec!(1000), dec!(5), 12))
            .await;
        assert!(matches!(result, Err(LoanError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_create_loan_validates_terms() {
        let service = service();
        let user = service.create_user(new_user("a@example.com")).await.unwrap();

        let result = service
            .create_loan(new_loan(user.user.id, dec!(-10), dec!(5), 12))
            .await;
        assert!(matches!(result, Err(LoanError::InvalidArgument(_))));
        assert!(service.list_loans(Page::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_user_profile_lists_loans() {
        let service = service();
        let user = service.create_user(new_user("jill@example.com")).await.unwrap();
        assert!(user.loans.is_empty());

        let id = user.user.id;
        service
            .create_loan(new_loan(id, dec!(8000), dec!(4.5), 36))
            .await
            .unwrap();
        service
            .create_loan(new_loan(id, dec!(12000), dec!(6.0), 48))
            .await
            .unwrap();

        let profile = service.get_user(id).await.unwrap();
        assert_eq!(profile.loans.len(), 2);
        assert_eq!(service.loans_for_user(id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_ids_are_not_found() {
        let service = service();
        assert!(matches!(
            service.get_user(1).await,
            Err(LoanError::NotFound(_))
        ));
        assert!(matches!(
            service.get_loan(1).await,
            Err(LoanError::NotFound(_))
        ));
        assert!(matches!(
            service.loan_schedule(1).await,
            Err(LoanError::NotFound(_))
        ));
        assert!(matches!(
            service.monthly_payments(1).await,
            Err(LoanError::NotFound(_))
        ));
        assert!(matches!(
            service.total_payments(1).await,
            Err(LoanError::NotFound(_))
        ));
        assert!(matches!(
            service.loan_summary(1, 1).await,
            Err(LoanError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_user_aggregates() {
        let service = service();
        let id = service
            .create_user(new_user("janet@example.com"))
            .await
            .unwrap()
            .user
            .id;
        service
            .create_loan(new_loan(id, dec!(20000), dec!(3.5), 48))
            .await
            .unwrap();
        service
            .create_loan(new_loan(id, dec!(10000), dec!(4.0), 36))
            .await
            .unwrap();

        let monthly = service.monthly_payments(id).await.unwrap();
        assert_eq!(monthly.len(), 48);
        assert_eq!(monthly[0].total_monthly_payment, dec!(742.36));

        let totals = service.total_payments(id).await.unwrap();
        assert_eq!(totals.total_principal_paid, dec!(29999.99));
        assert_eq!(totals.total_interest_paid, dec!(2090.41));
        assert_eq!(totals.total_payments, dec!(32090.40));
    }

    #[tokio::test]
    async fn test_user_without_loans_has_empty_aggregates() {
        let service = service();
        let id = service
            .create_user(new_user("solo@example.com"))
            .await
            .unwrap()
            .user
            .id;

        assert!(service.monthly_payments(id).await.unwrap().is_empty());
        assert_eq!(
            service.total_payments(id).await.unwrap(),
            PaymentTotals::default()
        );
    }

    #[tokio::test]
    async fn test_loan_summary() {
        let service = service();
        let id = service
            .create_user(new_user("jim@example.com"))
            .await
            .unwrap()
            .user
            .id;
        let loan = service
            .create_loan(new_loan(id, dec!(25000), dec!(5.0), 60))
            .await
            .unwrap();

        let summary = service.loan_summary(loan.id, 12).await.unwrap();
        assert_eq!(summary.current_balance, dec!(20486.12));

        assert!(matches!(
            service.loan_summary(loan.id, 61).await,
            Err(LoanError::InvalidArgument(_))
        ));
    }
}
