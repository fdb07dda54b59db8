//! CSV adapters for batch use of the amortization engine.

pub mod loan_reader;
pub mod report_writer;
