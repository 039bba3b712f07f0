use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
    Json,
};
use kepco_client::domain::{
    stamp::{compact_date, compact_date_time},
    ResultSet,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{AppState, ApiError};
use crate::{
    aggregate::{self, DailyTotal, FailurePolicy, Interval, Minute},
    dates,
    render::{
        json::{to_json_bytes, JSON_CONTENT_TYPE},
        xlsx::{self, XLSX_CONTENT_TYPE},
        ReturnType,
    },
};

const TABLE_NAME: &str = "KepcoDataTable";

#[derive(Debug, Deserialize)]
pub struct DayQuery {
    pub date: Option<String>,
    #[serde(rename = "returnType")]
    pub return_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DateTimeQuery {
    #[serde(rename = "dateTime")]
    pub date_time: Option<String>,
    #[serde(rename = "returnType")]
    pub return_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    #[serde(rename = "startDate")]
    pub start_date: Option<String>,
    #[serde(rename = "endDate")]
    pub end_date: Option<String>,
    #[serde(rename = "returnType")]
    pub return_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HelloQuery {
    pub name: Option<String>,
}

fn count_request(endpoint: &'static str) {
    metrics::counter!("http_requests_total", "endpoint" => endpoint).increment(1);
}

fn respond(set: &ResultSet, format: ReturnType, filename: String) -> Result<Response, ApiError> {
    match format {
        ReturnType::Json => {
            let bytes = to_json_bytes(set)?;
            Ok(([(CONTENT_TYPE, JSON_CONTENT_TYPE)], bytes).into_response())
        }
        ReturnType::Xlsx => {
            let bytes = xlsx::to_xlsx_bytes(set, TABLE_NAME)?;
            let headers = [
                (CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
                (CONTENT_DISPOSITION, format!("attachment; filename=\"{filename}\"")),
            ];
            Ok((headers, bytes).into_response())
        }
    }
}

/// Whole-day totals for one date (default: yesterday).
pub async fn kepco_daily_data(
    State(state): State<AppState>,
    query: Result<Query<DayQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    count_request("kepcoDailyData");
    let Query(q) = query?;

    let format = ReturnType::from_param(q.return_type.as_deref())?;
    let date = dates::date_param("date", q.date.as_deref(), state.clock.yesterday())?;
    let customers = state.customers().await?;

    let set = aggregate::collect(
        &DailyTotal,
        state.api.as_ref(),
        &customers,
        &[date],
        FailurePolicy::RecordInline,
    )
    .await?;
    tracing::info!(%date, customers = customers.len(), rows = set.len(), "daily data");

    respond(&set, format, format!("kepco_daily_data_{}.xlsx", compact_date(date)))
}

/// 15-minute readings for one date (default: yesterday).
pub async fn kepco_daily_data_15min(
    State(state): State<AppState>,
    query: Result<Query<DayQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    count_request("kepcoDailyData15min");
    let Query(q) = query?;

    let format = ReturnType::from_param(q.return_type.as_deref())?;
    let date = dates::date_param("date", q.date.as_deref(), state.clock.yesterday())?;
    let customers = state.customers().await?;

    let set = aggregate::collect(
        &Interval,
        state.api.as_ref(),
        &customers,
        &[date],
        FailurePolicy::RecordInline,
    )
    .await?;
    tracing::info!(%date, customers = customers.len(), rows = set.len(), "15-minute data");

    respond(&set, format, format!("kepco_daily_15min_data_{}.xlsx", compact_date(date)))
}

/// Readings at one timestamp. Any failed or empty customer fails the request.
pub async fn kepco_15min_data(
    State(state): State<AppState>,
    query: Result<Query<DateTimeQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    count_request("kepco15minData");
    let Query(q) = query?;

    let format = ReturnType::from_param(q.return_type.as_deref())?;
    let at = dates::date_time_param("dateTime", q.date_time.as_deref())?;
    let customers = state.customers().await?;

    let set =
        aggregate::collect(&Minute, state.api.as_ref(), &customers, &[at], FailurePolicy::Abort)
            .await?;
    tracing::info!(%at, customers = customers.len(), rows = set.len(), "minute data");

    respond(&set, format, format!("kepco_15min_data_{}.xlsx", compact_date_time(at)))
}

/// Daily totals for every date in `[startDate, endDate]`.
pub async fn kepco_daily_range_data(
    State(state): State<AppState>,
    query: Result<Query<RangeQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    count_request("kepcoDailyRangeData");
    let Query(q) = query?;

    let format = ReturnType::from_param(q.return_type.as_deref())?;
    let (start, end) = dates::range_params(
        q.start_date.as_deref(),
        q.end_date.as_deref(),
        state.clock.yesterday(),
    )?;
    let days = dates::expand_range(start, end);
    let customers = state.customers().await?;

    let set = aggregate::collect(
        &DailyTotal,
        state.api.as_ref(),
        &customers,
        &days,
        FailurePolicy::RecordInline,
    )
    .await?;
    tracing::info!(%start, %end, days = days.len(), rows = set.len(), "daily range data");

    let filename = format!(
        "kepco_daily_range_data_{}_{}.xlsx",
        compact_date(start),
        compact_date(end)
    );
    respond(&set, format, filename)
}

pub async fn hello(Query(q): Query<HelloQuery>) -> Json<Value> {
    let name = q.name.unwrap_or_else(|| "World".to_string());
    Json(json!({ "message": format!("Hello {name}") }))
}

pub async fn datetime(State(state): State<AppState>) -> Json<Value> {
    let now = state.clock.now();
    let stamp = format!(
        "{} {:02}:{:02}:{:02}",
        now.date(),
        now.hour(),
        now.minute(),
        now.second()
    );
    Json(json!({ "datetime": stamp }))
}
