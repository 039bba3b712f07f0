use std::time::Duration;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::Value;
use time::{Date, PrimitiveDateTime};

use super::{FetchOutcome, LoadProfileApi, UpstreamFailure};
use crate::domain::{stamp, LpRecord};

const DAY_LP_PATH: &str = "getDayLpData.do";
const MINUTE_LP_PATH: &str = "getMinuteLpData.do";
const DAY_LP_LIST: &str = "dayLpDataInfoList";
const MINUTE_LP_LIST: &str = "minuteLpDataInfoList";
/// `02` asks upstream for JSON.
const RETURN_TYPE: &str = "02";

/// HTTP client for the KEPCO open API.
///
/// Calls are issued one at a time by the caller; the client holds no
/// per-request state beyond reqwest's connection pool.
pub struct KepcoClient {
    http: reqwest::Client,
    base_url: String,
    service_key: String,
}

impl KepcoClient {
    pub fn new(
        base_url: impl Into<String>,
        service_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            service_key: service_key.into(),
        })
    }

    async fn fetch_list(
        &self,
        path: &str,
        customer_number: &str,
        stamp_param: (&str, &str),
        list_field: &str,
    ) -> FetchOutcome {
        let url = format!("{}/{}", self.base_url, path);
        tracing::debug!(customer_number, path, stamp = stamp_param.1, "requesting load profile");

        let response = self
            .http
            .get(&url)
            .query(&[
                ("custNo", customer_number),
                stamp_param,
                ("serviceKey", self.service_key.as_str()),
                ("returnType", RETURN_TYPE),
            ])
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) => {
                // reqwest errors carry the URL, which includes the service key.
                let e = e.without_url();
                tracing::warn!(customer_number, path, error = %e, "upstream request failed");
                return FetchOutcome::Failed(UpstreamFailure::Transport(e.to_string()));
            }
        };

        let status = response.status();
        if status != StatusCode::OK {
            tracing::warn!(
                customer_number,
                path,
                status = status.as_u16(),
                "upstream returned non-200"
            );
            return FetchOutcome::Failed(UpstreamFailure::Status(status.as_u16()));
        }

        let body = match response.json::<Value>().await {
            Ok(v) => v,
            Err(e) => {
                let e = e.without_url();
                tracing::warn!(customer_number, path, error = %e, "upstream body is not JSON");
                return FetchOutcome::Failed(UpstreamFailure::Decode(e.to_string()));
            }
        };

        match extract_list(body, list_field) {
            Ok(records) => FetchOutcome::from_records(records),
            Err(failure) => {
                tracing::warn!(
                    customer_number,
                    path,
                    error = %failure,
                    "unexpected upstream envelope"
                );
                FetchOutcome::Failed(failure)
            }
        }
    }
}

/// Pulls the named list out of the upstream envelope. Missing or null lists are empty.
fn extract_list(body: Value, list_field: &str) -> Result<Vec<LpRecord>, UpstreamFailure> {
    let Value::Object(mut envelope) = body else {
        return Err(UpstreamFailure::Decode("expected a JSON object".to_string()));
    };

    match envelope.remove(list_field) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(list) => serde_json::from_value(list)
            .map_err(|e| UpstreamFailure::Decode(format!("{list_field}: {e}"))),
    }
}

#[async_trait::async_trait]
impl LoadProfileApi for KepcoClient {
    async fn day_lp(&self, customer_number: &str, date: Date) -> FetchOutcome {
        let date = stamp::compact_date(date);
        self.fetch_list(DAY_LP_PATH, customer_number, ("date", &date), DAY_LP_LIST)
            .await
    }

    async fn minute_lp(&self, customer_number: &str, at: PrimitiveDateTime) -> FetchOutcome {
        let date_time = stamp::compact_date_time(at);
        self.fetch_list(MINUTE_LP_PATH, customer_number, ("dateTime", &date_time), MINUTE_LP_LIST)
            .await
    }
}
