use sqlx::PgPool;
use tracing::info;

use crate::database::manager::DatabaseError;
use crate::database::models::{Submission, SubmissionSummary};

const SUMMARY_SELECT: &str = r#"
    SELECT
        s.id, s.user_id, s.body, s.created_at,
        COALESCE(
            ARRAY_AGG(w.word ORDER BY w.word) FILTER (WHERE w.word IS NOT NULL),
            ARRAY[]::TEXT[]
        ) AS words,
        (SELECT AVG(r.score)::FLOAT8 FROM ratings r WHERE r.submission_id = s.id) AS average_score,
        (SELECT COUNT(*) FROM ratings r WHERE r.submission_id = s.id) AS rating_count
    FROM submissions s
    LEFT JOIN submission_words sw ON sw.submission_id = s.id
    LEFT JOIN words w ON w.word_id = sw.word_id
"#;

pub const MIN_SCORE: i16 = 1;
pub const MAX_SCORE: i16 = 5;

#[derive(Clone)]
pub struct SubmissionRepository {
    pool: PgPool,
}

impl SubmissionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Store a submission and link it to the given word IDs in one transaction
    pub async fn create(&self, user_id: i64, body: &str, word_ids: &[i32]) -> Result<Submission, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let submission = sqlx::query_as::<_, Submission>(
            "INSERT INTO submissions (user_id, body) VALUES ($1, $2) \
             RETURNING id, user_id, body, created_at",
        )
        .bind(user_id)
        .bind(body)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| DatabaseError::user_gone_on_fk(e, user_id))?;

        for word_id in word_ids {
            sqlx::query(
                "INSERT INTO submission_words (submission_id, word_id) VALUES ($1, $2) \
                 ON CONFLICT DO NOTHING",
            )
            .bind(submission.id)
            .bind(word_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        info!("User {} submitted {} using {} words", user_id, submission.id, word_ids.len());
        Ok(submission)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Submission>, DatabaseError> {
        let submission = sqlx::query_as::<_, Submission>(
            "SELECT id, user_id, body, created_at FROM submissions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(submission)
    }

    /// A user's submissions, newest first
    pub async fn history_for_user(&self, user_id: i64) -> Result<Vec<SubmissionSummary>, DatabaseError> {
        let sql = format!(
            "{SUMMARY_SELECT} WHERE s.user_id = $1 GROUP BY s.id ORDER BY s.created_at DESC, s.id DESC"
        );
        let rows = sqlx::query_as::<_, SubmissionSummary>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Every submission that uses one of `word_ids`, newest first
    pub async fn using_words(&self, word_ids: &[i32]) -> Result<Vec<SubmissionSummary>, DatabaseError> {
        if word_ids.is_empty() {
            return Err(DatabaseError::empty_list());
        }

        let sql = format!(
            "{SUMMARY_SELECT} WHERE s.id IN \
             (SELECT submission_id FROM submission_words WHERE word_id = ANY($1)) \
             GROUP BY s.id ORDER BY s.created_at DESC, s.id DESC"
        );
        let rows = sqlx::query_as::<_, SubmissionSummary>(&sql)
            .bind(word_ids)
            .fetch_all(&self.pool)
            .await?;

        if rows.is_empty() {
            return Err(DatabaseError::empty_list());
        }
        Ok(rows)
    }

    /// Submissions by other users that `user_id` has not rated yet, oldest first
    pub async fn rating_queue(&self, user_id: i64, limit: i64) -> Result<Vec<SubmissionSummary>, DatabaseError> {
        let sql = format!(
            "{SUMMARY_SELECT} WHERE s.user_id <> $1 \
             AND NOT EXISTS (SELECT 1 FROM ratings r WHERE r.submission_id = s.id AND r.user_id = $1) \
             GROUP BY s.id ORDER BY s.created_at ASC, s.id ASC LIMIT $2"
        );
        let rows = sqlx::query_as::<_, SubmissionSummary>(&sql)
            .bind(user_id)
            .bind(limit.max(0))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Record (or replace) `user_id`'s score for a submission
    pub async fn rate(&self, submission_id: i64, user_id: i64, score: i16) -> Result<(), DatabaseError> {
        if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
            return Err(DatabaseError::QueryError(format!(
                "score must be between {} and {}",
                MIN_SCORE, MAX_SCORE
            )));
        }

        sqlx::query(
            "INSERT INTO ratings (submission_id, user_id, score) VALUES ($1, $2, $3) \
             ON CONFLICT (submission_id, user_id) DO UPDATE SET score = EXCLUDED.score, created_at = NOW()",
        )
        .bind(submission_id)
        .bind(user_id)
        .bind(score)
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::user_gone_on_fk(e, user_id))?;

        info!("User {} rated submission {} with {}", user_id, submission_id, score);
        Ok(())
    }
}
