//! Application layer orchestrating storage and the amortization engine.
//!
//! `LoanService` is shared by every interface. It holds no state of its own
//! beyond the store handles, so it can sit behind an `Arc` and serve
//! concurrent requests.

pub mod service;
