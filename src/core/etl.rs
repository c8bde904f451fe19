use crate::core::{Pipeline, RunOutcome};
use crate::utils::error::Result;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<RunOutcome> {
        tracing::info!("🚀 Starting search and sentiment run");

        // Extract
        let posts = self.pipeline.extract().await?;
        if posts.is_empty() {
            tracing::warn!("No posts matched the search criteria");
            return Ok(RunOutcome::NoResults);
        }
        tracing::info!("Found {} posts, classifying sentiment...", posts.len());

        // Transform
        let result = self.pipeline.transform(posts).await?;
        tracing::info!("Labeled {} posts", result.labeled_posts.len());

        // Load
        let files = self.pipeline.load(&result).await?;
        for file in &files {
            tracing::info!("📁 Output saved to: {}", file);
        }

        Ok(RunOutcome::Exported {
            files,
            posts: result.labeled_posts,
        })
    }
}
