use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Submission {
    pub id: i64,
    pub user_id: i64,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// A submission joined with the words it uses and its rating totals
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SubmissionSummary {
    pub id: i64,
    pub user_id: i64,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub words: Vec<String>,
    pub average_score: Option<f64>,
    pub rating_count: i64,
}
