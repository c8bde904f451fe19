pub mod etl;
pub mod labeler;
pub mod query;

pub use crate::domain::model::{
    LabeledPost, PostRecord, RunOutcome, SearchQuery, SearchRequest, SearchWindow, Sentiment,
    TransformResult,
};
pub use crate::domain::ports::{Pipeline, PostSearch, SentimentClassifier, Storage};
pub use crate::utils::error::Result;
