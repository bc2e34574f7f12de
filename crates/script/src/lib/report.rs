use std::io::Write;
use std::path::Path;

use csv::WriterBuilder;
use frozen_synth_settlement_shared::fixed_point::from_units;
use frozen_synth_settlement_shared::settlement::{SettlementParameters, SettlementRecord, SettlementTable};
use serde::Serialize;
use thiserror::Error;

pub const DEFAULT_REPORT_FILE: &str = "owedBalances.csv";

const HEADER: [&str; 5] = [
    "Address",
    "Staked Balance",
    "Owed sUSD",
    "Readable Staked Balance",
    "Readable Owed sUSD",
];

#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to write CSV: {0:?}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0:?}")]
    Io(#[from] std::io::Error),

    #[error("Failed to flush CSV writer: {0}")]
    Flush(String),
}

#[derive(Debug, Serialize)]
struct ReportRow<'a> {
    address: String,
    balance: String,
    owed: String,
    readable_balance: &'a str,
    readable_owed: &'a str,
}

impl<'a> From<&'a SettlementRecord> for ReportRow<'a> {
    fn from(record: &'a SettlementRecord) -> Self {
        Self {
            address: record.address.to_checksum(None),
            balance: record.balance.to_string(),
            owed: record.owed.to_string(),
            readable_balance: &record.readable_balance,
            readable_owed: &record.readable_owed,
        }
    }
}

/// Writes the settlement table followed by a blank line and the `Price` / `Exchange Fee`
/// summary rows.
pub fn write_report<W: Write>(table: &SettlementTable, params: &SettlementParameters, writer: W) -> Result<(), Error> {
    let mut rows = WriterBuilder::new().has_headers(false).from_writer(writer);
    rows.write_record(HEADER)?;
    for record in &table.records {
        rows.serialize(ReportRow::from(record))?;
    }
    let mut writer = rows.into_inner().map_err(|e| Error::Flush(e.to_string()))?;

    writeln!(writer)?;

    // Summary rows have a different width than the table, so they get their own writer
    let mut summary = WriterBuilder::new().has_headers(false).from_writer(writer);
    summary.write_record(["Price", from_units(params.frozen_price()).as_str()])?;
    summary.write_record(["Exchange Fee", from_units(params.exchange_fee()).as_str()])?;
    summary.flush()?;
    Ok(())
}

pub fn render_report(table: &SettlementTable, params: &SettlementParameters) -> Result<Vec<u8>, Error> {
    let mut buffer = Vec::new();
    write_report(table, params, &mut buffer)?;
    Ok(buffer)
}

/// Renders the whole report in memory and writes it with a single call, so a failed run
/// never leaves a partial file behind.
pub fn write_report_file(path: &Path, table: &SettlementTable, params: &SettlementParameters) -> Result<(), Error> {
    let content = render_report(table, params)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    tracing::info!("Report written to {}", path.display());
    Ok(())
}
