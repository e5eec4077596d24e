use axum::{
    extract::{Extension, Query},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::database::models::WordRow;
use crate::database::WordRepository;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, Db};

const DEFAULT_LETTER: char = 'a';

#[derive(Debug, Deserialize)]
pub struct WordsQuery {
    pub letter: Option<String>,
    pub word: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HomophoneRequest {
    pub word: String,
}

#[derive(Debug, Serialize)]
pub struct WordList {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub letter: Option<char>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homophones_of: Option<String>,
    pub words: Vec<WordRow>,
}

/// GET /words?letter=x - browse alphabetically (defaults to `a`)
/// GET /words?word=w   - the homophones of `w`
pub async fn get_words(
    Extension(Db(pool)): Extension<Db>,
    Query(query): Query<WordsQuery>,
) -> ApiResult<WordList> {
    let words = WordRepository::new(pool);

    if let Some(word) = query.word.as_deref().map(str::trim).filter(|w| !w.is_empty()) {
        return homophones(&words, word).await;
    }

    let letter = parse_letter(query.letter.as_deref())?;
    let rows = words.query_alph(letter).await?;

    Ok(ApiResponse::success(WordList {
        letter: Some(letter),
        homophones_of: None,
        words: rows,
    }))
}

/// POST /words - the homophones of the posted word
pub async fn post_words(
    Extension(Db(pool)): Extension<Db>,
    Json(payload): Json<HomophoneRequest>,
) -> ApiResult<WordList> {
    let word = payload.word.trim();
    if word.is_empty() {
        return Err(ApiError::field_error("word", "Word cannot be empty"));
    }
    homophones(&WordRepository::new(pool), word).await
}

async fn homophones(words: &WordRepository, word: &str) -> ApiResult<WordList> {
    let rows = words.query_homophones(word).await?;
    Ok(ApiResponse::success(WordList {
        letter: None,
        homophones_of: Some(word.to_string()),
        words: rows,
    }))
}

fn parse_letter(raw: Option<&str>) -> Result<char, ApiError> {
    let raw = raw.map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return Ok(DEFAULT_LETTER);
    }

    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(ApiError::field_error("letter", "Letter must be a single character")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letter_defaults_and_limits() {
        assert_eq!(parse_letter(None).unwrap(), 'a');
        assert_eq!(parse_letter(Some(" ")).unwrap(), 'a');
        assert_eq!(parse_letter(Some("Q")).unwrap(), 'Q');
        assert_eq!(parse_letter(Some("é")).unwrap(), 'é');
        assert!(parse_letter(Some("ab")).is_err());
    }
}
