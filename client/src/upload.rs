//! CSV files for the bulk-upload endpoints

use csv::WriterBuilder;
use reqwest::multipart::Part;
use serde::Serialize;
use shared::{FieldErrors, SaleCsvRow, WineCsvRow, SALE_CSV_HEADERS, WINE_CSV_HEADERS};

use crate::error::ClientResult;

/// A file ready to be posted as the multipart `file` field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    file_name: String,
    bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    /// Write wine rows in the column order the wine import reads
    pub fn wines(file_name: impl Into<String>, rows: &[WineCsvRow]) -> ClientResult<Self> {
        Ok(Self::new(file_name, write_rows(&WINE_CSV_HEADERS, rows)?))
    }

    /// Write sale rows; each row names its wine rather than its id
    pub fn sales(file_name: impl Into<String>, rows: &[SaleCsvRow]) -> ClientResult<Self> {
        Ok(Self::new(file_name, write_rows(&SALE_CSV_HEADERS, rows)?))
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The API only accepts names ending in `.csv`
    pub fn check(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if !self.file_name.ends_with(".csv") {
            errors.add("file", "File must be a CSV");
        }
        errors.into_result(())
    }

    pub(crate) fn into_part(self) -> ClientResult<Part> {
        Ok(Part::bytes(self.bytes)
            .file_name(self.file_name)
            .mime_str("text/csv")?)
    }
}

fn write_rows<R: Serialize>(headers: &[&str], rows: &[R]) -> ClientResult<Vec<u8>> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(Vec::new());
    writer.write_record(headers)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()).into())
}
