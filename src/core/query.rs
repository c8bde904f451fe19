use crate::core::{PostRecord, PostSearch, Result, SearchQuery, SearchRequest, SearchWindow};
use crate::utils::error::EtlError;
use crate::utils::validation::{validate_date_order, validate_keyword, validate_positive_number};
use chrono::{DateTime, Duration, NaiveDate, SubsecRound, Utc};

/// The search service rejects end timestamps that are in the future or too
/// close to the present.
pub const SAFETY_MARGIN_SECS: i64 = 10;

/// Page-size ceiling of the search service.
pub const MAX_PAGE_SIZE: usize = 100;

pub struct QueryExecutor<Q: PostSearch> {
    search: Q,
}

impl<Q: PostSearch> QueryExecutor<Q> {
    pub fn new(search: Q) -> Self {
        Self { search }
    }

    pub async fn execute(&self, request: &SearchRequest) -> Result<Vec<PostRecord>> {
        self.execute_at(request, Utc::now()).await
    }

    pub async fn execute_at(
        &self,
        request: &SearchRequest,
        now: DateTime<Utc>,
    ) -> Result<Vec<PostRecord>> {
        let query = build_query(request, now)?;

        tracing::info!(
            "🔎 Searching '{}' via {} from {} to {} (max {})",
            query.keyword,
            self.search.name(),
            query.window.start_param(),
            query.window.end_param(),
            query.max_results
        );

        // 服務錯誤直接往上拋，不重試
        let mut posts = self.search.search(&query).await?;
        posts.truncate(query.max_results);

        tracing::info!("📊 Search returned {} posts", posts.len());
        Ok(posts)
    }
}

pub fn build_query(request: &SearchRequest, now: DateTime<Utc>) -> Result<SearchQuery> {
    validate_keyword(&request.keyword)?;
    validate_positive_number("max_results", request.max_results, 1).map_err(|_| {
        EtlError::ValidationError {
            message: "max_results must be at least 1".to_string(),
        }
    })?;

    let window = resolve_window(request.start_date, request.end_date, now)?;

    let max_results = if request.max_results > MAX_PAGE_SIZE {
        tracing::warn!(
            "max_results {} exceeds the service limit, capping at {}",
            request.max_results,
            MAX_PAGE_SIZE
        );
        MAX_PAGE_SIZE
    } else {
        request.max_results
    };

    Ok(SearchQuery {
        keyword: request.keyword.clone(),
        window,
        max_results,
    })
}

/// Start is midnight UTC of `start`. End is 23:59:00 UTC of `end`, or `now`
/// when no end date is given, and is clamped to `now - SAFETY_MARGIN_SECS`.
pub fn resolve_window(
    start: NaiveDate,
    end: Option<NaiveDate>,
    now: DateTime<Utc>,
) -> Result<SearchWindow> {
    validate_date_order(start, end)?;

    let start_time = start
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .ok_or_else(|| EtlError::ValidationError {
            message: format!("invalid start date {}", start),
        })?;

    let requested_end = match end {
        Some(date) => date
            .and_hms_opt(23, 59, 0)
            .map(|dt| dt.and_utc())
            .ok_or_else(|| EtlError::ValidationError {
                message: format!("invalid end date {}", date),
            })?,
        None => now,
    };

    // 捨去毫秒，確保送出的時間不會晚於 now - margin
    let latest_allowed = (now - Duration::seconds(SAFETY_MARGIN_SECS)).trunc_subsecs(0);
    let end_time = if requested_end < latest_allowed {
        requested_end
    } else {
        tracing::debug!(
            "End time {} is too recent, clamping to {}",
            requested_end,
            latest_allowed
        );
        latest_allowed
    };

    if start_time >= end_time {
        return Err(EtlError::ValidationError {
            message: format!("start date {} is in the future", start),
        });
    }

    Ok(SearchWindow {
        start_time,
        end_time,
    })
}
