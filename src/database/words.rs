use std::collections::BTreeSet;

use sqlx::PgPool;
use tracing::debug;

use crate::database::manager::DatabaseError;
use crate::database::models::WordRow;
use crate::database::query_builder::ParamList;

const WORD_COLUMNS: &str = "word_id, word, homophone_group";

/// Outcome of seeding one homophone group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupImport {
    pub homophone_group: i32,
    pub inserted: u64,
}

/// Data-access object for the `words` table.
///
/// Every lookup treats an empty result set as an error
/// (`DatabaseError::NotFound("empty list")`) so callers never have to
/// distinguish "no rows" from "nothing to show".
#[derive(Clone)]
pub struct WordRepository {
    pool: PgPool,
}

impl WordRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All words whose first character is `first_letter`, ignoring case,
    /// in alphabetical order.
    pub async fn query_alph(&self, first_letter: char) -> Result<Vec<WordRow>, DatabaseError> {
        let sql = format!(
            "SELECT {WORD_COLUMNS} FROM words \
             WHERE LOWER(LEFT(word, 1)) = LOWER($1) \
             ORDER BY LOWER(word), word"
        );

        let words = sqlx::query_as::<_, WordRow>(&sql)
            .bind(first_letter.to_string())
            .fetch_all(&self.pool)
            .await?;

        debug!("query_alph('{}') matched {} words", first_letter, words.len());
        non_empty(words)
    }

    /// The other members of `word`'s homophone group, alphabetically.
    /// The input itself is never part of the result, whatever its case.
    pub async fn query_homophones(&self, word: &str) -> Result<Vec<WordRow>, DatabaseError> {
        let word = word.trim();
        let sql = format!(
            "SELECT {WORD_COLUMNS} FROM words \
             WHERE homophone_group IN (SELECT homophone_group FROM words WHERE LOWER(word) = LOWER($1)) \
             AND LOWER(word) <> LOWER($1) \
             ORDER BY LOWER(word), word"
        );

        let words = sqlx::query_as::<_, WordRow>(&sql)
            .bind(word)
            .fetch_all(&self.pool)
            .await?;

        debug!("query_homophones('{}') matched {} words", word, words.len());
        non_empty(words)
    }

    /// Resolve a batch of words to their IDs with a single IN query.
    /// Words that are not in the table are skipped; if none match the call fails.
    pub async fn get_word_id_list<S: AsRef<str>>(&self, words: &[S]) -> Result<Vec<i32>, DatabaseError> {
        let Some((sql, params)) = word_id_list_sql(words) else {
            return Err(DatabaseError::empty_list());
        };

        let mut query = sqlx::query_scalar::<_, i32>(&sql);
        for param in params {
            query = query.bind(param);
        }
        let ids = query.fetch_all(&self.pool).await?;

        debug!("get_word_id_list resolved {} of {} words", ids.len(), words.len());
        non_empty(ids)
    }

    /// A random sample of at most `limit` words
    pub async fn random_words(&self, limit: i64) -> Result<Vec<WordRow>, DatabaseError> {
        let sql = format!("SELECT {WORD_COLUMNS} FROM words ORDER BY RANDOM() LIMIT $1");
        let words = sqlx::query_as::<_, WordRow>(&sql)
            .bind(limit.max(0))
            .fetch_all(&self.pool)
            .await?;
        non_empty(words)
    }

    /// Seed one homophone group. If any of the words already exists its group
    /// is reused, so overlapping imports merge instead of splitting a group.
    pub async fn insert_group<S: AsRef<str>>(&self, words: &[S]) -> Result<GroupImport, DatabaseError> {
        let words = normalize_group(words);
        if words.is_empty() {
            return Err(DatabaseError::QueryError("homophone group has no words".to_string()));
        }

        let mut tx = self.pool.begin().await?;
        sqlx::query("LOCK TABLE words IN SHARE ROW EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await?;

        let mut params = ParamList::new();
        let in_list = params
            .in_list(words.iter().map(|w| w.to_lowercase()))
            .ok_or_else(DatabaseError::empty_list)?;
        let existing_sql = format!(
            "SELECT MIN(homophone_group) FROM words WHERE LOWER(word) IN {in_list}"
        );
        let mut existing = sqlx::query_scalar::<_, Option<i32>>(&existing_sql);
        for param in params.into_params() {
            existing = existing.bind(param);
        }
        let existing = existing.fetch_one(&mut *tx).await?;

        let homophone_group = match existing {
            Some(group) => group,
            None => {
                sqlx::query_scalar::<_, i32>("SELECT COALESCE(MAX(homophone_group), 0) + 1 FROM words")
                    .fetch_one(&mut *tx)
                    .await?
            }
        };

        let mut inserted = 0;
        for word in &words {
            let result = sqlx::query(
                "INSERT INTO words (word, homophone_group) VALUES ($1, $2) ON CONFLICT ((LOWER(word))) DO NOTHING",
            )
            .bind(word)
            .bind(homophone_group)
            .execute(&mut *tx)
            .await?;
            inserted += result.rows_affected();
        }

        tx.commit().await?;
        debug!("Seeded homophone group {} ({} new words)", homophone_group, inserted);
        Ok(GroupImport { homophone_group, inserted })
    }
}

/// Build the IN query for `get_word_id_list`. Inputs are trimmed, lowercased
/// and de-duplicated; `None` when nothing is left to look up.
pub fn word_id_list_sql<S: AsRef<str>>(words: &[S]) -> Option<(String, Vec<String>)> {
    let unique: BTreeSet<String> = words
        .iter()
        .map(|w| w.as_ref().trim().to_lowercase())
        .filter(|w| !w.is_empty())
        .collect();

    let mut params = ParamList::new();
    let in_list = params.in_list(unique)?;
    let sql = format!("SELECT word_id FROM words WHERE LOWER(word) IN {in_list} ORDER BY word_id");
    Some((sql, params.into_params()))
}

fn normalize_group<S: AsRef<str>>(words: &[S]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    words
        .iter()
        .map(|w| w.as_ref().trim().to_string())
        .filter(|w| !w.is_empty() && seen.insert(w.to_lowercase()))
        .collect()
}

fn non_empty<T>(rows: Vec<T>) -> Result<Vec<T>, DatabaseError> {
    if rows.is_empty() {
        Err(DatabaseError::empty_list())
    } else {
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_list_sql_has_one_placeholder_per_unique_word() {
        let (sql, params) = word_id_list_sql(&["Pear", "pair", "pear ", "pare"]).unwrap();
        assert_eq!(
            sql,
            "SELECT word_id FROM words WHERE LOWER(word) IN ($1, $2, $3) ORDER BY word_id"
        );
        assert_eq!(params, vec!["pair", "pare", "pear"]);
    }

    #[test]
    fn id_list_sql_is_none_without_words() {
        assert!(word_id_list_sql::<&str>(&[]).is_none());
        assert!(word_id_list_sql(&["", "   "]).is_none());
    }

    #[test]
    fn group_normalization_keeps_first_spelling() {
        let words = normalize_group(&[" Knight", "night", "knight", ""]);
        assert_eq!(words, vec!["Knight", "night"]);
    }

    #[test]
    fn empty_rows_are_an_error() {
        assert!(matches!(non_empty(Vec::<i32>::new()), Err(DatabaseError::NotFound(_))));
        assert_eq!(non_empty(vec![1]).unwrap(), vec![1]);
    }
}
