pub mod intake;
pub mod isbn;
pub mod models;
pub mod title;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::{FromRequest, Request, State},
    http::{header, StatusCode},
    routing::{get, post},
    Form, Json, Router,
};
use bookstall_http::error::AppError;
use bookstall_kernel::settings::Settings;
use bookstall_kernel::{InitCtx, Module};
use serde_json::{json, Value};

use intake::IntakeService;
use models::{IntakeRequest, IntakeResponse};
use title::{OpenLibraryClient, TitleLookup};

pub const INVALID_BODY_MESSAGE: &str = "Invalid JSON body";
pub const INVALID_FORM_MESSAGE: &str = "Invalid form body";

/// Book intake module: `POST /api/books`
pub struct BooksModule {
    service: IntakeService,
}

impl BooksModule {
    pub fn new(service: IntakeService) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            catalog = %ctx.settings.catalog.base_url,
            catalog_timeout_ms = ctx.settings.catalog.timeout_ms,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/", post(add_book))
            .route("/health", get(health_check))
            .with_state(self.service.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(json!({
            "paths": {
                "/": {
                    "post": {
                        "summary": "Take in a book",
                        "description": "Validates the ISBN, prices it for the given condition and looks up its title. Responds 202 when price or title is missing and the record needs manual completion.",
                        "tags": ["Books"],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/IntakeRequest" }
                                },
                                "application/x-www-form-urlencoded": {
                                    "schema": { "$ref": "#/components/schemas/IntakeRequest" }
                                }
                            }
                        },
                        "responses": {
                            "200": {
                                "description": "Complete intake record",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/IntakeResponse" }
                                    }
                                }
                            },
                            "202": {
                                "description": "Intake record that needs manual completion",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/IntakeResponse" }
                                    }
                                }
                            },
                            "400": {
                                "description": "Validation error",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                                    }
                                }
                            },
                            "500": {
                                "description": "Internal server error",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                                    }
                                }
                            }
                        }
                    }
                },
                "/health": {
                    "get": {
                        "summary": "Books health check",
                        "tags": ["Books"],
                        "responses": {
                            "200": {
                                "description": "OK",
                                "content": {
                                    "text/plain": {
                                        "schema": { "type": "string" }
                                    }
                                }
                            }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "IntakeRequest": {
                        "type": "object",
                        "properties": {
                            "isbn": {
                                "type": "string",
                                "description": "ISBN-10 or ISBN-13, hyphens and spaces allowed"
                            },
                            "condition": {
                                "type": "string",
                                "enum": ["new", "as_new", "damaged"]
                            }
                        },
                        "required": ["isbn", "condition"]
                    },
                    "IntakeResponse": {
                        "type": "object",
                        "properties": {
                            "isbn10": { "type": "string" },
                            "isbn13": { "type": "string" },
                            "condition": {
                                "type": "string",
                                "enum": ["new", "as_new", "damaged"]
                            },
                            "price": {
                                "type": "number",
                                "description": "Base price times the condition coefficient"
                            },
                            "title": { "type": "string" },
                            "needsManualCompletion": { "type": "boolean" }
                        },
                        "required": ["isbn10", "isbn13", "condition", "needsManualCompletion"]
                    }
                }
            }
        }))
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "books module is healthy"
}

/// Book intake endpoint
///
/// Accepts a JSON object or an `application/x-www-form-urlencoded` form. An
/// empty JSON body reads as `{}` so it fails on the missing fields.
async fn add_book(
    State(service): State<IntakeService>,
    request: Request,
) -> Result<(StatusCode, Json<IntakeResponse>), AppError> {
    let intake = if is_form(&request) {
        let Form(intake) = Form::<IntakeRequest>::from_request(request, &())
            .await
            .map_err(|rejection| {
                tracing::debug!(error = %rejection, "rejecting intake form");
                AppError::bad_request(INVALID_FORM_MESSAGE)
            })?;
        intake
    } else {
        let body = Bytes::from_request(request, &()).await.map_err(|rejection| {
            tracing::debug!(error = %rejection, "unreadable intake body");
            AppError::bad_request(INVALID_BODY_MESSAGE)
        })?;
        parse_intake_request(&body)?
    };

    let outcome = service.intake(intake).await?;

    Ok((outcome.status(), Json(outcome.record)))
}

fn is_form(request: &Request) -> bool {
    request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"))
}

fn parse_intake_request(body: &[u8]) -> Result<IntakeRequest, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(IntakeRequest::default());
    }

    let invalid = |error: serde_json::Error| {
        tracing::debug!(%error, "rejecting intake body");
        AppError::bad_request(INVALID_BODY_MESSAGE)
    };

    // Only an object is a request; serde would otherwise read arrays positionally.
    match serde_json::from_slice::<Value>(body).map_err(invalid)? {
        object @ Value::Object(_) => serde_json::from_value(object).map_err(invalid),
        _ => Err(AppError::bad_request(INVALID_BODY_MESSAGE)),
    }
}

/// Build the books module with an Open Library title lookup
pub fn create_module(settings: &Settings) -> anyhow::Result<Arc<dyn Module>> {
    let titles = OpenLibraryClient::new(&settings.catalog)?;
    Ok(create_module_with_lookup(
        Arc::new(titles),
        Duration::from_millis(settings.catalog.timeout_ms),
    ))
}

/// Build the books module around an arbitrary title lookup
pub fn create_module_with_lookup(
    titles: Arc<dyn TitleLookup>,
    lookup_timeout: Duration,
) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(IntakeService::new(titles, lookup_timeout)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_reads_as_empty_request() {
        let request = parse_intake_request(b"").unwrap();
        assert!(request.isbn.is_none());
        assert!(request.condition.is_none());

        let request = parse_intake_request(b"  \n").unwrap();
        assert!(request.isbn.is_none());
    }

    #[test]
    fn partial_body_keeps_present_fields() {
        let request = parse_intake_request(br#"{"isbn":"9780140328721"}"#).unwrap();
        assert_eq!(request.isbn.as_deref(), Some("9780140328721"));
        assert!(request.condition.is_none());
    }

    #[test]
    fn malformed_body_is_bad_request() {
        for body in [
            &b"{not json"[..],
            br#"{"isbn": 9780140328721}"#,
            b"[]",
            br#"["9780140328721","new"]"#,
            b"\"9780140328721\"",
            b"null",
        ] {
            let error = parse_intake_request(body).unwrap_err();
            assert_eq!(error.status(), StatusCode::BAD_REQUEST);
        }
    }
}
