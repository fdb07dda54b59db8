//! Domain layer: the amortization engine and the records it is fed from.
//!
//! `amortization` and `aggregate` are pure and synchronous. Everything that
//! touches storage goes through the async traits in `ports`.

pub mod aggregate;
pub mod amortization;
pub mod loan;
pub mod ports;
pub mod user;
