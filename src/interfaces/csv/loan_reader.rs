use crate::domain::amortization::LoanTerms;
use crate::error::{LoanError, Result};
use std::io::Read;

/// Reads loan terms from a CSV source.
///
/// Expects the header `amount,annual_interest_rate,loan_term`. Whitespace
/// around fields is trimmed and every row is validated like any other
/// `LoanTerms`, so a bad row yields an error without ending the stream.
pub struct LoanReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> LoanReader<R> {
    /// Creates a new `LoanReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and validates loan terms.
    pub fn loans(self) -> impl Iterator<Item = Result<LoanTerms>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(LoanError::from))
    }
}
