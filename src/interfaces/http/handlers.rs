//! Request handlers.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::application::service::LoanService;
use crate::domain::aggregate::{MonthlyAggregate, PaymentTotals, PointInTimeSummary};
use crate::domain::amortization::{LoanTerms, Schedule, amortization_schedule};
use crate::domain::loan::{Loan, LoanId, NewLoan};
use crate::domain::ports::Page;
use crate::domain::user::{NewUser, UserId, UserProfile};
use crate::error::LoanError;

/// Application state shared by all handlers.
pub type AppState = Arc<LoanService>;

type ApiResult<T> = Result<Json<T>, LoanError>;

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Error response body.
#[derive(Serialize)]
pub struct ErrorResponse {
    detail: String,
}

impl IntoResponse for LoanError {
    fn into_response(self) -> Response {
        let status = match &self {
            LoanError::InvalidArgument(_) | LoanError::AlreadyExists(_) => StatusCode::BAD_REQUEST,
            LoanError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let detail = if status.is_server_error() {
            error!(error = %self, "request failed");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(ErrorResponse { detail })).into_response()
    }
}

/// Loan terms submitted for an ad-hoc schedule.
#[derive(Debug, Deserialize)]
pub struct ScheduleRequest {
    pub amount: Decimal,
    pub annual_interest_rate: Decimal,
    pub loan_term: u32,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn create_user(
    State(service): State<AppState>,
    Json(user): Json<NewUser>,
) -> ApiResult<UserProfile> {
    service.create_user(user).await.map(Json)
}

pub async fn list_users(
    State(service): State<AppState>,
    Query(page): Query<Page>,
) -> ApiResult<Vec<UserProfile>> {
    service.list_users(page).await.map(Json)
}

pub async fn get_user(
    State(service): State<AppState>,
    Path(user_id): Path<UserId>,
) -> ApiResult<UserProfile> {
    service.get_user(user_id).await.map(Json)
}

pub async fn user_loans(
    State(service): State<AppState>,
    Path(user_id): Path<UserId>,
) -> ApiResult<Vec<Loan>> {
    service.loans_for_user(user_id).await.map(Json)
}

/// Payment breakdown per month across all loans of a user.
pub async fn monthly_payments(
    State(service): State<AppState>,
    Path(user_id): Path<UserId>,
) -> ApiResult<Vec<MonthlyAggregate>> {
    service.monthly_payments(user_id).await.map(Json)
}

/// Lifetime totals across all loans of a user.
pub async fn total_payments(
    State(service): State<AppState>,
    Path(user_id): Path<UserId>,
) -> ApiResult<PaymentTotals> {
    service.total_payments(user_id).await.map(Json)
}

pub async fn create_loan(
    State(service): State<AppState>,
    Json(loan): Json<NewLoan>,
) -> ApiResult<Loan> {
    service.create_loan(loan).await.map(Json)
}

pub async fn list_loans(
    State(service): State<AppState>,
    Query(page): Query<Page>,
) -> ApiResult<Vec<Loan>> {
    service.list_loans(page).await.map(Json)
}

pub async fn get_loan(
    State(service): State<AppState>,
    Path(loan_id): Path<LoanId>,
) -> ApiResult<Loan> {
    service.get_loan(loan_id).await.map(Json)
}

pub async fn loan_schedule(
    State(service): State<AppState>,
    Path(loan_id): Path<LoanId>,
) -> ApiResult<Schedule> {
    service.loan_schedule(loan_id).await.map(Json)
}

pub async fn loan_summary(
    State(service): State<AppState>,
    Path((loan_id, month)): Path<(LoanId, u32)>,
) -> ApiResult<PointInTimeSummary> {
    service.loan_summary(loan_id, month).await.map(Json)
}

/// Schedule for terms that are not stored anywhere.
///
/// Runs inline on the request task; `LoanTerms` bounds the term to
/// `MAX_LOAN_TERM` months.
pub async fn preview_schedule(Json(request): Json<ScheduleRequest>) -> ApiResult<Schedule> {
    let terms = LoanTerms::new(
        request.amount,
        request.annual_interest_rate,
        request.loan_term,
    )?;
    amortization_schedule(&terms).map(Json)
}
