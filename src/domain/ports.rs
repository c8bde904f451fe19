use crate::domain::model::{PostRecord, SearchQuery, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

/// Keyword search over a time window. One call, one page.
#[async_trait]
pub trait PostSearch: Send + Sync {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<PostRecord>>;

    fn name(&self) -> &'static str;
}

/// Sends a prompt to a completion service and returns its raw text output.
#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    async fn classify(&self, prompt: &str) -> Result<String>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<PostRecord>>;
    async fn transform(&self, posts: Vec<PostRecord>) -> Result<TransformResult>;
    async fn load(&self, result: &TransformResult) -> Result<Vec<String>>;
}
