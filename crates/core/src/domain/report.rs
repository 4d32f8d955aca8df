use crate::domain::snapshot::BusinessSnapshot;
use crate::metrics::DerivedMetrics;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// The fully enriched daily report. Snapshot and metrics are flattened so the
/// serialized form is a single flat record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyReport {
    pub as_of_date: NaiveDate,
    pub generated_at: DateTime<Utc>,

    #[serde(flatten)]
    pub snapshot: BusinessSnapshot,

    #[serde(flatten)]
    pub metrics: DerivedMetrics,

    pub recommendations: String,
}
