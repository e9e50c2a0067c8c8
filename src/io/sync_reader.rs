//! Synchronous CSV readers
//!
//! `SyncReader` streams transfer requests from a CSV file one row at a time;
//! `read_accounts` loads the (small) seed account file in one go.
//!
//! # Error Handling
//!
//! - Fatal errors (file not found, I/O errors) are returned from `new()`
//! - Individual transfer rows that fail to parse are yielded as `Err` items,
//!   with their line number, and the iteration carries on
//! - A bad seed account row is fatal: `read_accounts` returns the first error

use crate::io::csv_format::{
    convert_account_record, convert_transfer_record, AccountCsvRecord, TransferCsvRecord,
};
use crate::types::{NewAccount, TransferRequest};
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;

fn open(path: &Path) -> Result<File, String> {
    File::open(path).map_err(|e| format!("Failed to open file '{}': {}", path.display(), e))
}

fn csv_reader<R: Read>(input: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .buffer_capacity(8 * 1024)
        .from_reader(input)
}

/// Streaming reader of transfer requests
///
/// # Examples
///
/// ```no_run
/// use rust_transfer_engine::io::sync_reader::SyncReader;
/// use std::path::Path;
///
/// let reader = SyncReader::new(Path::new("transfers.csv")).unwrap();
/// let requests: Vec<_> = reader.filter_map(Result::ok).collect();
/// println!("Successfully parsed {} requests", requests.len());
/// ```
#[derive(Debug)]
pub struct SyncReader {
    reader: csv::Reader<File>,
    line_num: usize,
}

impl SyncReader {
    /// Open a transfers CSV (`sender,receiver,amount`) for streaming iteration
    pub fn new(path: &Path) -> Result<Self, String> {
        Ok(Self {
            reader: csv_reader(open(path)?),
            line_num: 0,
        })
    }
}

impl Iterator for SyncReader {
    type Item = Result<TransferRequest, String>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut deserializer = self.reader.deserialize::<TransferCsvRecord>();
        let next = deserializer.next()?;
        self.line_num += 1;

        // +1 for the header row
        let line = self.line_num + 1;
        Some(match next {
            Ok(record) => convert_transfer_record(record).map_err(|e| format!("Line {}: {}", line, e)),
            Err(e) => Err(format!("Line {}: CSV parse error: {}", line, e)),
        })
    }
}

/// Load every seed account (`id,name,email,balance`) from a CSV file
pub fn read_accounts(path: &Path) -> Result<Vec<NewAccount>, String> {
    read_accounts_from(open(path)?)
        .map_err(|e| format!("Invalid accounts file '{}': {}", path.display(), e))
}

fn read_accounts_from<R: Read>(input: R) -> Result<Vec<NewAccount>, String> {
    let mut reader = csv_reader(input);
    let mut accounts = Vec::new();

    for (index, row) in reader.deserialize::<AccountCsvRecord>().enumerate() {
        let line = index + 2;
        let record = row.map_err(|e| format!("Line {}: CSV parse error: {}", line, e))?;
        accounts.push(convert_account_record(record).map_err(|e| format!("Line {}: {}", line, e))?);
    }

    Ok(accounts)
}
