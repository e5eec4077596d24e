use std::collections::HashMap;

use axum::{extract::Extension, Json};
use serde::{Deserialize, Serialize};

use crate::database::models::{Submission, WordRow};
use crate::database::{DatabaseError, SubmissionRepository, WordRepository};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser, Db};

use super::home::random_words_or_empty;
use super::validation::{validate_submission_body, FieldErrors};

const SUGGESTION_COUNT: i64 = 5;

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub body: String,
    #[serde(default)]
    pub words: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SubmitForm {
    pub suggestions: Vec<WordRow>,
}

#[derive(Debug, Serialize)]
pub struct SubmitResult {
    pub submission: Submission,
    pub word_ids: Vec<i32>,
}

/// GET /submit - a few random words to build a pun around
pub async fn get_submit(Extension(Db(pool)): Extension<Db>) -> ApiResult<SubmitForm> {
    let suggestions = random_words_or_empty(&WordRepository::new(pool), SUGGESTION_COUNT).await?;
    Ok(ApiResponse::success(SubmitForm { suggestions }))
}

/// POST /submit - store a pun together with the dictionary words it plays on
pub async fn post_submit(
    user: CurrentUser,
    Extension(Db(pool)): Extension<Db>,
    Json(payload): Json<SubmitRequest>,
) -> ApiResult<SubmitResult> {
    let mut errors = FieldErrors::new();
    errors.check("body", validate_submission_body(&payload.body));
    if payload.words.iter().all(|w| w.trim().is_empty()) {
        errors.check("words", Err("At least one word is required".to_string()));
    }
    errors.into_result()?;

    let word_ids = match WordRepository::new(pool.clone()).get_word_id_list(payload.words.as_slice()).await {
        Ok(ids) => ids,
        Err(DatabaseError::NotFound(_)) => {
            let mut field_errors = HashMap::new();
            field_errors.insert(
                "words".to_string(),
                "None of the words are in the dictionary".to_string(),
            );
            return Err(ApiError::unprocessable_entity("Unknown words", field_errors));
        }
        Err(e) => return Err(e.into()),
    };

    let submission = SubmissionRepository::new(pool)
        .create(user.id(), payload.body.trim(), &word_ids)
        .await?;

    Ok(ApiResponse::created(SubmitResult { submission, word_ids }))
}
