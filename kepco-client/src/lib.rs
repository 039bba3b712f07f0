pub mod api;
pub mod domain;

pub use api::{FetchOutcome, KepcoClient, LoadProfileApi, UpstreamFailure};
