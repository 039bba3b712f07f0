use kepco_client::domain::ResultSet;
use serde::Serialize;

use super::RenderError;

pub const RETURN_CODE_OK: &str = "ok";
pub const RETURN_CODE_ERROR: &str = "le";
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// `{"returnCode": "ok", "data": [...]}`
#[derive(Debug, Serialize)]
pub struct OkEnvelope<'a> {
    #[serde(rename = "returnCode")]
    pub return_code: &'static str,
    pub data: &'a ResultSet,
}

impl<'a> OkEnvelope<'a> {
    pub fn new(data: &'a ResultSet) -> Self {
        Self {
            return_code: RETURN_CODE_OK,
            data,
        }
    }
}

/// `{"returnCode": "le", "error": "<message>"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorEnvelope {
    #[serde(rename = "returnCode")]
    pub return_code: String,
    pub error: String,
}

impl ErrorEnvelope {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            return_code: RETURN_CODE_ERROR.to_string(),
            error: error.into(),
        }
    }
}

/// serde_json never escapes non-ASCII, so labels stay readable.
pub fn to_json_bytes(set: &ResultSet) -> Result<Vec<u8>, RenderError> {
    Ok(serde_json::to_vec(&OkEnvelope::new(set))?)
}

#[cfg(test)]
mod tests {
    use kepco_client::domain::{CustomerLabels, CustomerRecord, OutputRow, PowerUsage, RowShape};
    use time::macros::date;

    use super::*;

    #[test]
    fn envelope_keeps_hangul_literal() {
        let customer = CustomerRecord::new(
            "0135338560",
            CustomerLabels {
                guksa: Some("혜화".to_string()),
                ..Default::default()
            },
        );
        let mut set = ResultSet::new(RowShape::DailyTotal);
        set.extend([OutputRow::daily(&customer, date!(2024 - 10 - 01), PowerUsage::NoData)]);

        let text = String::from_utf8(to_json_bytes(&set).unwrap()).unwrap();
        assert!(text.starts_with(r#"{"returnCode":"ok","data":[{"Customer Number":"0135338560""#));
        assert!(text.contains(r#""Guksa":"혜화""#), "{text}");
        assert!(text.contains(r#""Power Usage":null"#), "{text}");
    }

    #[test]
    fn error_envelope_shape() {
        let message = "Invalid returnType. Use 'json' or 'xlsx'.";
        let v = serde_json::to_value(ErrorEnvelope::new(message)).unwrap();
        assert_eq!(v, serde_json::json!({ "returnCode": "le", "error": message }));
    }
}
