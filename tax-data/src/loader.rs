use std::io::Read;

use csv::{ReaderBuilder, StringRecord, Trim};
use tax_core::validation::{parse_non_negative, validate_csv_record};
use tax_core::{AllowanceType, TaxError, TaxRequest, TaxService, TaxUploadResponse, ValidationError};
use tracing::{debug, info, warn};

/// Message returned for an upload without even a header row.
pub const MSG_EMPTY_UPLOAD: &str = "uploaded file is empty";

/// Reads tax upload CSV files and runs them through a [`TaxService`].
///
/// The file starts with a header row, which is skipped without being
/// checked. Every following row holds `totalIncome,wht,donation`:
///
/// ```text
/// totalIncome,wht,donation
/// 500000.0,0.0,0.0
/// 600000.0,40000.0,20000.0
/// ```
///
/// The first malformed row aborts the whole upload; rows are numbered from 1
/// starting after the header.
pub struct CsvBatchProcessor;

impl CsvBatchProcessor {
    /// Parse upload rows into calculation requests, in file order.
    ///
    /// The reader can be any type that implements `Read`, such as a file or
    /// a byte slice.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<TaxRequest>, TaxError> {
        let mut csv_reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);

        let header_is_empty = csv_reader
            .headers()
            .map_err(|err| Self::unreadable(0, err))?
            .is_empty();
        if header_is_empty {
            warn!("upload rejected: no header row");
            return Err(ValidationError::single(MSG_EMPTY_UPLOAD).into());
        }

        let mut requests = Vec::new();
        for (index, result) in csv_reader.records().enumerate() {
            let row = index + 1;
            let record = result.map_err(|err| Self::unreadable(row, err))?;
            let request = Self::request_from_record(row, &record)?;
            debug!(
                row,
                total_income = %request.total_income,
                wht = %request.wht,
                "upload row parsed"
            );
            requests.push(request);
        }

        info!(rows = requests.len(), "upload parsed");
        Ok(requests)
    }

    /// Parse an upload and calculate every row.
    pub async fn process<R: Read>(
        service: &TaxService,
        reader: R,
    ) -> Result<TaxUploadResponse, TaxError> {
        let requests = Self::parse(reader)?;
        service.calculate_batch(&requests).await
    }

    fn request_from_record(
        row: usize,
        record: &StringRecord,
    ) -> Result<TaxRequest, TaxError> {
        let fields: Vec<&str> = record.iter().collect();
        if let Err(err) = validate_csv_record(&fields) {
            warn!(row, error = %err, "upload row rejected");
            return Err(err.prefixed(&format!("row {row}")).into());
        }

        // Validated above: exactly three non-negative numbers.
        let [income, wht, donation] = [fields[0], fields[1], fields[2]].map(parse_non_negative);
        match (income, wht, donation) {
            (Some(income), Some(wht), Some(donation)) => {
                Ok(TaxRequest::new(income, wht).with_allowance(AllowanceType::Donation, donation))
            }
            _ => Err(TaxError::Unexpected(format!(
                "row {row} passed validation but could not be parsed"
            ))),
        }
    }

    fn unreadable(
        row: usize,
        err: csv::Error,
    ) -> TaxError {
        if err.is_io_error() {
            return TaxError::Unexpected(format!("failed to read upload: {err}"));
        }
        warn!(row, error = %err, "upload row unreadable");
        let message = if row == 0 {
            format!("header: could not be read ({err})")
        } else {
            format!("row {row}: could not be read ({err})")
        };
        ValidationError::single(message).into()
    }
}
