//! Asynchronous CSV reader with batch interface
//!
//! Streams transfer requests from any `futures::io::AsyncRead` source and
//! hands them out in batches.
//!
//! # Architecture
//!
//! ```text
//! CSV Reader → AsyncReader → Batches of TransferRequests
//!                  ↓
//!           csv_format module
//!           (TransferCsvRecord, convert_transfer_record)
//! ```

use crate::io::csv_format::{convert_transfer_record, TransferCsvRecord};
use crate::types::TransferRequest;
use csv_async::AsyncReaderBuilder;
use futures::io::AsyncRead;
use futures::stream::StreamExt;

/// Asynchronous CSV reader
///
/// Provides batch reading interface over transfer requests.
/// Maintains streaming behavior with constant memory usage.
pub struct AsyncReader<R: AsyncRead + Unpin> {
    csv_reader: csv_async::AsyncDeserializer<R>,
    skipped: usize,
}

impl<R: AsyncRead + Unpin + Send + 'static> AsyncReader<R> {
    /// Create a new AsyncReader from an async reader
    pub fn new(reader: R) -> Self {
        let csv_reader = AsyncReaderBuilder::new()
            .flexible(true)
            .trim(csv_async::Trim::All)
            .create_deserializer(reader);

        Self {
            csv_reader,
            skipped: 0,
        }
    }

    /// Number of malformed rows skipped so far
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Read a batch of transfer requests
    ///
    /// Reads up to `batch_size` valid requests. Malformed rows are logged and
    /// skipped. Returns an empty vector once the input is exhausted.
    pub async fn read_batch(&mut self, batch_size: usize) -> Vec<TransferRequest> {
        let mut batch = Vec::with_capacity(batch_size);
        let mut skipped = 0;
        let mut records = self.csv_reader.deserialize::<TransferCsvRecord>();

        while batch.len() < batch_size {
            match records.next().await {
                Some(Ok(csv_record)) => match convert_transfer_record(csv_record) {
                    Ok(request) => batch.push(request),
                    Err(e) => {
                        skipped += 1;
                        tracing::warn!(error = %e, "Skipping transfer row");
                    }
                },
                Some(Err(e)) => {
                    skipped += 1;
                    tracing::warn!(error = %e, "CSV parse error, skipping row");
                }
                None => break,
            }
        }

        drop(records);
        self.skipped += skipped;
        batch
    }
}
