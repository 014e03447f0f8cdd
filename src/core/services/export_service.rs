use std::{
    fs::File,
    io::{self, Write},
    path::Path,
};

use crate::errors::LedgerError;
use crate::ledger::Transaction;

pub const CSV_HEADER: [&str; 8] = [
    "Date",
    "Type",
    "Amount",
    "Currency",
    "Category",
    "Merchant",
    "Payment Method",
    "Notes",
];

/// CSV export of a (filtered) transaction list. Amounts are written in each
/// record's own currency; nothing is converted.
///
/// Leading columns are quoted only when they need it. The notes column is
/// always quoted, so a row ends `,""` when a transaction has no notes.
pub struct ExportService;

impl ExportService {
    pub fn write_csv<W: io::Write>(
        mut writer: W,
        transactions: &[&Transaction],
    ) -> Result<(), LedgerError> {
        let mut cells = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());
        let (leading, notes) = CSV_HEADER.split_at(CSV_HEADER.len() - 1);
        write_row(&mut cells, &mut writer, leading, notes[0])?;
        for txn in transactions {
            write_row(
                &mut cells,
                &mut writer,
                [
                    txn.date.to_string(),
                    txn.kind.as_str().to_string(),
                    txn.amount.to_string(),
                    txn.currency.to_string(),
                    txn.category.clone(),
                    txn.merchant.clone(),
                    txn.payment_method.clone(),
                ],
                &quoted(txn.notes_or_empty()),
            )?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn to_csv_string(transactions: &[&Transaction]) -> Result<String, LedgerError> {
        let mut buffer = Vec::new();
        Self::write_csv(&mut buffer, transactions)?;
        String::from_utf8(buffer).map_err(|err| LedgerError::Storage(err.to_string()))
    }

    /// Writes the export to `path`, replacing any existing file. Returns the
    /// number of rows written.
    pub fn export_to_path(path: &Path, transactions: &[&Transaction]) -> Result<usize, LedgerError> {
        let file = File::create(path)?;
        Self::write_csv(file, transactions)?;
        Ok(transactions.len())
    }
}

/// Writes the leading cells through the csv encoder, then appends the final
/// cell verbatim.
fn write_row<W, I, T>(
    cells: &mut csv::Writer<Vec<u8>>,
    out: &mut W,
    leading: I,
    last: &str,
) -> Result<(), LedgerError>
where
    W: io::Write,
    I: IntoIterator<Item = T>,
    T: AsRef<[u8]>,
{
    cells.write_record(leading)?;
    cells.flush()?;
    let mut line = std::mem::take(cells.get_mut());
    line.pop();
    out.write_all(&line)?;
    writeln!(out, ",{last}")?;
    Ok(())
}

fn quoted(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}
