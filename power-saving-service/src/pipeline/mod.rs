use std::pin::Pin;

use futures::{Stream, TryStreamExt};

#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("source error: {0}")]
    Source(String),
}

pub type SourceStream<T> = Pin<Box<dyn Stream<Item = Result<T, PipelineError>> + Send>>;

#[async_trait::async_trait]
pub trait Source<T>: Send + Sync {
    async fn stream(&self) -> SourceStream<T>;
}

/// Reads a source to the end, keeping its order. The first error wins.
pub async fn drain<T, S>(source: &S) -> Result<Vec<T>, PipelineError>
where
    S: Source<T> + ?Sized,
    T: Send,
{
    source.stream().await.try_collect().await
}
