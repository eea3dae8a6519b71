use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::types::SearchQuery;

/// Per-run logging context, created once by the caller and handed to every stage.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub query: SearchQuery,
}

impl RunContext {
    #[must_use]
    pub fn new(query: SearchQuery) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            query,
        }
    }

    /// Span tagging every event of `stage` with the run id and query.
    #[must_use]
    pub fn stage_span(&self, stage: &'static str) -> tracing::Span {
        tracing::info_span!(
            "stage",
            run_id = %self.run_id,
            stage,
            area = %self.query.area,
            search_type = %self.query.search_type,
        )
    }

    /// Seconds elapsed since the run started.
    #[must_use]
    pub fn elapsed_secs(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }
}
