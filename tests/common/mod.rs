#![allow(dead_code)]

use loanbook::domain::amortization::LoanTerms;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rust_decimal::Decimal;
use std::fs::File;
use std::io::Error;
use std::path::Path;

pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// A plausible consumer loan: 1k..50k principal, 0..15% with one decimal,
/// 1..360 months.
pub fn random_terms(rng: &mut impl Rng) -> LoanTerms {
    let amount = Decimal::from(rng.gen_range(1_000i64..=50_000));
    let rate = Decimal::new(rng.gen_range(0..=150), 1);
    let term = rng.gen_range(1..=360);
    LoanTerms::new(amount, rate, term).unwrap()
}

pub fn generate_loans_csv(path: &Path, rows: usize, seed: u64) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);
    let mut rng = seeded_rng(seed);

    wtr.write_record(["amount", "annual_interest_rate", "loan_term"])?;

    for _ in 0..rows {
        let terms = random_terms(&mut rng);
        wtr.write_record([
            terms.amount().to_string(),
            terms.annual_interest_rate().to_string(),
            terms.loan_term().to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
