//! Load investor contributions from CSV (`InvestorId,Name,Amount`)

use csv::Reader;
use serde::Deserialize;
use std::path::Path;

use super::allocation::Contribution;
use crate::error::Result;

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "InvestorId")]
    investor_id: String,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Amount")]
    amount: f64,
}

/// Load all contributions from a CSV file
pub fn load_contributions<P: AsRef<Path>>(path: P) -> Result<Vec<Contribution>> {
    read_rows(Reader::from_path(path)?)
}

/// Load contributions from any reader
pub fn load_contributions_from_reader<R: std::io::Read>(reader: R) -> Result<Vec<Contribution>> {
    read_rows(Reader::from_reader(reader))
}

fn read_rows<R: std::io::Read>(mut reader: Reader<R>) -> Result<Vec<Contribution>> {
    let mut contributions = Vec::new();
    for result in reader.deserialize() {
        let row: CsvRow = result?;
        contributions.push(Contribution::new(row.investor_id, row.name, row.amount));
    }
    Ok(contributions)
}
