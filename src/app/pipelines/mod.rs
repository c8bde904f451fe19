pub mod sentiment_pipeline;

pub use sentiment_pipeline::SentimentPipeline;
