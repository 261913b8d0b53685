pub mod price;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{rejection::QueryRejection, Query},
    routing::get,
    Json, Router,
};
use bookstall_http::error::AppError;
use bookstall_kernel::{InitCtx, Module};
use serde::{Deserialize, Serialize};
use serde_json::json;

use price::price_for;

pub const MISSING_ISBN_MESSAGE: &str = "ISBN query parameter is required";
pub const PRICE_NOT_FOUND_MESSAGE: &str = "Price not found for this ISBN";

/// Price lookup module: `GET /api/pricing?isbn=...`
pub struct PricingModule;

impl PricingModule {
    pub const fn new() -> Self {
        Self
    }
}

impl Default for PricingModule {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
pub struct PricingQuery {
    pub isbn: Option<String>,
}

/// Body of a successful price lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    /// The identifier exactly as it was queried
    pub isbn: String,
    pub price: u32,
}

#[async_trait]
impl Module for PricingModule {
    fn name(&self) -> &'static str {
        "pricing"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "pricing module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/", get(get_pricing))
            .route("/health", get(health_check))
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "Look up the base price of an ISBN",
                        "tags": ["Pricing"],
                        "parameters": [
                            {
                                "name": "isbn",
                                "in": "query",
                                "required": true,
                                "schema": { "type": "string" }
                            }
                        ],
                        "responses": {
                            "200": {
                                "description": "Base price",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/PriceQuote" }
                                    }
                                }
                            },
                            "400": {
                                "description": "Missing isbn parameter",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                                    }
                                }
                            },
                            "404": {
                                "description": "No price for this ISBN",
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
                        "summary": "Pricing health check",
                        "tags": ["Pricing"],
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
                    "PriceQuote": {
                        "type": "object",
                        "properties": {
                            "isbn": {
                                "type": "string",
                                "description": "The identifier exactly as queried"
                            },
                            "price": {
                                "type": "integer",
                                "minimum": 10,
                                "maximum": 4999
                            }
                        },
                        "required": ["isbn", "price"]
                    }
                }
            }
        }))
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "pricing module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "pricing module stopped");
        Ok(())
    }
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "pricing module is healthy"
}

/// Price lookup endpoint
async fn get_pricing(
    query: Result<Query<PricingQuery>, QueryRejection>,
) -> Result<Json<PriceQuote>, AppError> {
    let isbn = query
        .ok()
        .and_then(|Query(query)| query.isbn)
        .filter(|isbn| !isbn.is_empty())
        .ok_or_else(|| AppError::bad_request(MISSING_ISBN_MESSAGE))?;

    let price = price_for(&isbn).ok_or_else(|| AppError::not_found(PRICE_NOT_FOUND_MESSAGE))?;

    Ok(Json(PriceQuote { isbn, price }))
}

/// Create a new instance of the pricing module
pub fn create_module() -> Arc<dyn Module> {
    Arc::new(PricingModule::new())
}
