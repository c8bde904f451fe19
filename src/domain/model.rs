use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// A post as returned by the search service, before labeling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRecord {
    pub id: String,
    pub text: String,
    pub author_id: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Classification result for one post.
///
/// Any well-formed model output is kept verbatim in `Label`, even when it is
/// not one of `positivo`, `negativo` or `neutro`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sentiment {
    Label(String),
    Error,
}

impl Sentiment {
    pub const ERROR_LABEL: &'static str = "Error";

    pub fn as_str(&self) -> &str {
        match self {
            Sentiment::Label(label) => label,
            Sentiment::Error => Self::ERROR_LABEL,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Sentiment::Error)
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Sentiment {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabeledPost {
    #[serde(flatten)]
    pub post: PostRecord,
    pub sentiment: Sentiment,
}

/// What the user asked for: keyword, calendar dates and a result limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub keyword: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub max_results: usize,
}

/// Resolved UTC bounds sent to the search service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchWindow {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl SearchWindow {
    pub fn start_param(&self) -> String {
        format_timestamp(&self.start_time)
    }

    pub fn end_param(&self) -> String {
        format_timestamp(&self.end_time)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub keyword: String,
    pub window: SearchWindow,
    pub max_results: usize,
}

/// 匯出用的一列資料，欄位名稱沿用試算表的西班牙文標題
#[derive(Debug, Serialize)]
pub struct ExportRow<'a> {
    pub id: &'a str,
    pub texto: &'a str,
    pub autor: Option<&'a str>,
    pub fecha: Option<String>,
    pub sentimiento: &'a str,
}

impl<'a> From<&'a LabeledPost> for ExportRow<'a> {
    fn from(labeled: &'a LabeledPost) -> Self {
        Self {
            id: &labeled.post.id,
            texto: &labeled.post.text,
            autor: labeled.post.author_id.as_deref(),
            fecha: labeled.post.created_at.as_ref().map(format_timestamp),
            sentimiento: labeled.sentiment.as_str(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub labeled_posts: Vec<LabeledPost>,
    pub xlsx_output: Vec<u8>,
    pub csv_output: String,
    pub json_output: String,
}

#[derive(Debug, Clone)]
pub enum RunOutcome {
    NoResults,
    Exported {
        files: Vec<String>,
        posts: Vec<LabeledPost>,
    },
}

/// ISO-8601 UTC, second precision, `Z` suffix.
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}
