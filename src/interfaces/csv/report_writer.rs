use crate::domain::aggregate::{MonthlyAggregate, PaymentTotals};
use crate::domain::amortization::Schedule;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

/// Writes engine output as CSV, one record per row with a header line.
///
/// Column names match the JSON keys of the HTTP API.
pub struct ReportWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_schedule(&mut self, schedule: &Schedule) -> Result<()> {
        self.write_rows(schedule.iter())
    }

    pub fn write_monthly(&mut self, aggregates: &[MonthlyAggregate]) -> Result<()> {
        self.write_rows(aggregates.iter())
    }

    pub fn write_totals(&mut self, totals: &PaymentTotals) -> Result<()> {
        self.write_rows(std::iter::once(totals))
    }

    fn write_rows<T: Serialize>(&mut self, rows: impl Iterator<Item = T>) -> Result<()> {
        for row in rows {
            self.writer.serialize(row)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
