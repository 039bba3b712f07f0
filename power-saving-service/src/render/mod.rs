//! Output formats for a [`ResultSet`](kepco_client::domain::ResultSet).
//!
//! JSON and XLSX both walk `ResultSet::cell_rows`, so the two formats carry
//! the same values: numbers stay numbers, `null` becomes an empty cell.

pub mod json;
pub mod xlsx;

use std::str::FromStr;

pub use json::{ErrorEnvelope, OkEnvelope};

#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("Invalid returnType. Use 'json' or 'xlsx'.")]
    InvalidReturnType,
    #[error("failed to build spreadsheet: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
    #[error("failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnType {
    Json,
    Xlsx,
}

impl FromStr for ReturnType {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(ReturnType::Json),
            "xlsx" => Ok(ReturnType::Xlsx),
            _ => Err(RenderError::InvalidReturnType),
        }
    }
}

impl ReturnType {
    /// `returnType` query value; JSON when absent.
    pub fn from_param(value: Option<&str>) -> Result<Self, RenderError> {
        value.map_or(Ok(ReturnType::Json), str::parse)
    }
}
