#![allow(dead_code)]

use std::{
    collections::HashMap,
    net::SocketAddr,
    path::PathBuf,
    sync::{Arc, Mutex},
};

use kepco_client::{FetchOutcome, LoadProfileApi, UpstreamFailure};
use power_saving_service::{dates::Clock, router, AppState};
use serde_json::Value;
use tempfile::TempDir;
use time::{Date, PrimitiveDateTime};

/// Upstream stand-in: per-customer outcomes, everything else is empty.
#[derive(Default)]
pub struct FakeApi {
    outcomes: HashMap<String, FetchOutcome>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeApi {
    pub fn records(mut self, customer_number: &str, list: Value) -> Self {
        let records = serde_json::from_value(list).unwrap();
        self.outcomes
            .insert(customer_number.to_string(), FetchOutcome::from_records(records));
        self
    }

    pub fn status(mut self, customer_number: &str, status: u16) -> Self {
        self.outcomes.insert(
            customer_number.to_string(),
            FetchOutcome::Failed(UpstreamFailure::Status(status)),
        );
        self
    }

    fn answer(&self, customer_number: &str, key: String) -> FetchOutcome {
        self.calls.lock().unwrap().push(format!("{customer_number}@{key}"));
        self.outcomes
            .get(customer_number)
            .cloned()
            .unwrap_or(FetchOutcome::NoData)
    }
}

#[async_trait::async_trait]
impl LoadProfileApi for FakeApi {
    async fn day_lp(&self, customer_number: &str, date: Date) -> FetchOutcome {
        self.answer(customer_number, date.to_string())
    }

    async fn minute_lp(&self, customer_number: &str, at: PrimitiveDateTime) -> FetchOutcome {
        self.answer(customer_number, at.to_string())
    }
}

pub struct TestServer {
    pub base: String,
    pub api: Arc<FakeApi>,
    pub http: reqwest::Client,
    _dir: TempDir,
}

impl TestServer {
    pub async fn get_json(&self, path: &str) -> Value {
        let res = self.http.get(format!("{}{path}", self.base)).send().await.unwrap();
        assert_eq!(res.status(), 200);
        res.json().await.unwrap()
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.http.get(format!("{}{path}", self.base)).send().await.unwrap()
    }

    pub fn calls(&self) -> Vec<String> {
        self.api.calls.lock().unwrap().clone()
    }
}

pub const DIRECTORY_CSV: &str = "\u{feff}고객번호,본부명,센터,팀,국사\n\
    12345,강북/강원광역본부,강북센터,운용1팀,혜화\n\
    ,강북/강원광역본부,강북센터,운용1팀,혜화\n\
    67890,강남광역본부,강남센터,운용2팀,\n";

/// Serves the router on an ephemeral port against `api` and a temp directory file.
pub async fn spawn(api: FakeApi) -> TestServer {
    spawn_with_directory(api, Some(DIRECTORY_CSV)).await
}

pub async fn spawn_with_directory(api: FakeApi, csv: Option<&str>) -> TestServer {
    let dir = tempfile::tempdir().unwrap();
    let directory: PathBuf = dir.path().join("kepcolist_gg.csv");
    if let Some(csv) = csv {
        std::fs::write(&directory, csv).unwrap();
    }

    let api = Arc::new(api);
    let state = AppState {
        api: api.clone(),
        directory,
        clock: Clock::from_hours(9),
    };

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(state).into_make_service()).await.unwrap();
    });

    TestServer {
        base: format!("http://{addr}"),
        api,
        http: reqwest::Client::new(),
        _dir: dir,
    }
}
