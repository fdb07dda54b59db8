//! Route definitions.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};

use crate::application::service::LoanService;

use super::handlers;

/// Create the API router.
///
/// Collection routes answer both with and without a trailing slash.
pub fn create_router(service: Arc<LoanService>) -> Router {
    Router::new()
        // Health
        .route("/health", get(handlers::health))
        // Users
        .route("/users", get(handlers::list_users).post(handlers::create_user))
        .route("/users/", get(handlers::list_users).post(handlers::create_user))
        .route("/users/{user_id}", get(handlers::get_user))
        .route("/users/{user_id}/loans", get(handlers::user_loans))
        .route("/users/{user_id}/monthly_payments", get(handlers::monthly_payments))
        .route("/users/{user_id}/total_payments", get(handlers::total_payments))
        // Loans
        .route("/loans", get(handlers::list_loans).post(handlers::create_loan))
        .route("/loans/", get(handlers::list_loans).post(handlers::create_loan))
        .route("/loans/{loan_id}", get(handlers::get_loan))
        .route("/loans/{loan_id}/schedule", get(handlers::loan_schedule))
        .route("/loans/{loan_id}/summary/{month}", get(handlers::loan_summary))
        // Ad-hoc schedules
        .route("/schedule", post(handlers::preview_schedule))
        .with_state(service)
}
