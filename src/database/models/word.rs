use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One row of the `words` table. Rows sharing `homophone_group` are
/// pronounced the same.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct WordRow {
    pub word_id: i32,
    pub word: String,
    pub homophone_group: i32,
}
