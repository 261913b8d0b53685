//! Book intake: validate, price, and enrich a submitted book.

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use thiserror::Error;

use bookstall_http::error::AppError;

use super::isbn::{self, IsbnError};
use super::models::{Condition, IntakeRequest, IntakeResponse};
use super::title::{lookup_title, TitleLookup};
use crate::modules::pricing::price::price_for;

pub const MISSING_FIELDS_MESSAGE: &str = "ISBN and condition are required";
pub const INVALID_CONDITION_MESSAGE: &str = "Condition must be one of: new, as_new, damaged";
pub const INVALID_ISBN_MESSAGE: &str = "Invalid ISBN format";

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("isbn or condition missing")]
    MissingFields,

    #[error("condition '{0}' is not one of new, as_new, damaged")]
    InvalidCondition(String),

    #[error("invalid isbn '{raw}': {source}")]
    InvalidIsbn {
        raw: String,
        #[source]
        source: IsbnError,
    },
}

impl From<IntakeError> for AppError {
    fn from(error: IntakeError) -> Self {
        match error {
            IntakeError::MissingFields => AppError::bad_request(MISSING_FIELDS_MESSAGE),
            IntakeError::InvalidCondition(_) => AppError::bad_request(INVALID_CONDITION_MESSAGE),
            IntakeError::InvalidIsbn { .. } => AppError::bad_request(INVALID_ISBN_MESSAGE),
        }
    }
}

/// Completed intake record plus the status it should be served with.
#[derive(Debug, Clone, PartialEq)]
pub struct IntakeOutcome {
    pub record: IntakeResponse,
}

impl IntakeOutcome {
    /// 200 for a complete record, 202 when a human has to finish it.
    pub fn status(&self) -> StatusCode {
        if self.record.needs_manual_completion {
            StatusCode::ACCEPTED
        } else {
            StatusCode::OK
        }
    }
}

/// Orchestrates one intake. Holds no per-request state.
#[derive(Clone)]
pub struct IntakeService {
    titles: Arc<dyn TitleLookup>,
    lookup_timeout: Duration,
}

impl IntakeService {
    pub fn new(titles: Arc<dyn TitleLookup>, lookup_timeout: Duration) -> Self {
        Self {
            titles,
            lookup_timeout,
        }
    }

    pub async fn intake(&self, request: IntakeRequest) -> Result<IntakeOutcome, IntakeError> {
        let (raw_isbn, raw_condition) = match (request.isbn, request.condition) {
            (Some(isbn), Some(condition)) if !isbn.is_empty() && !condition.is_empty() => {
                (isbn, condition)
            }
            _ => return Err(IntakeError::MissingFields),
        };

        let condition: Condition = raw_condition
            .parse()
            .map_err(|_| IntakeError::InvalidCondition(raw_condition.clone()))?;

        let pair = isbn::normalize(&raw_isbn).map_err(|source| IntakeError::InvalidIsbn {
            raw: raw_isbn.clone(),
            source,
        })?;

        // Priced on the identifier as submitted, not the normalized form.
        let price = price_for(&raw_isbn).map(|base| f64::from(base) * condition.coefficient());

        let title = lookup_title(self.titles.as_ref(), &pair.isbn13, self.lookup_timeout)
            .await
            .into_option();

        let needs_manual_completion = price.is_none() || title.is_none();

        tracing::info!(
            isbn13 = %pair.isbn13,
            condition = %condition,
            price_found = price.is_some(),
            title_found = title.is_some(),
            needs_manual_completion,
            "book intake processed"
        );

        Ok(IntakeOutcome {
            record: IntakeResponse {
                isbn10: pair.isbn10,
                isbn13: pair.isbn13,
                condition,
                price,
                title,
                needs_manual_completion,
            },
        })
    }
}
