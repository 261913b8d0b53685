//! Title lookup against an external book catalog.
//!
//! [`TitleLookup`] is the raw, fallible call. [`lookup_title`] is the
//! boundary the intake flow uses: it bounds the call with a timeout and folds
//! every failure into [`TitleOutcome::Unavailable`], so transport problems
//! never surface as request errors.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use bookstall_kernel::settings::CatalogSettings;

/// Failure modes of a catalog call.
#[derive(Debug, Clone, Error)]
pub enum LookupError {
    #[error("catalog request failed: {0}")]
    Transport(String),

    #[error("catalog request timed out after {0}ms")]
    Timeout(u64),

    #[error("catalog answered with HTTP {0}")]
    Status(u16),

    #[error("catalog response could not be decoded: {0}")]
    Decode(String),
}

/// Source of book titles keyed by ISBN-13.
#[async_trait]
pub trait TitleLookup: Send + Sync {
    /// Returns `Ok(None)` when the catalog has no usable title for `isbn13`.
    async fn fetch_title(&self, isbn13: &str) -> Result<Option<String>, LookupError>;

    /// Source name for logging.
    fn source_name(&self) -> &'static str;
}

/// Result of the title boundary as seen by the intake flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TitleOutcome {
    Found(String),
    /// The catalog answered but has no title for this ISBN.
    NotListed,
    /// The catalog could not be reached or answered garbage.
    Unavailable,
}

impl TitleOutcome {
    pub fn into_option(self) -> Option<String> {
        match self {
            TitleOutcome::Found(title) => Some(title),
            TitleOutcome::NotListed | TitleOutcome::Unavailable => None,
        }
    }
}

/// Fetch a title, converting timeouts and errors into [`TitleOutcome::Unavailable`].
pub async fn lookup_title(
    lookup: &dyn TitleLookup,
    isbn13: &str,
    timeout: Duration,
) -> TitleOutcome {
    let result = match tokio::time::timeout(timeout, lookup.fetch_title(isbn13)).await {
        Ok(result) => result,
        Err(_) => Err(LookupError::Timeout(duration_ms(timeout))),
    };

    match result {
        Ok(Some(title)) => TitleOutcome::Found(title),
        Ok(None) => {
            tracing::info!(source = lookup.source_name(), isbn13, "catalog has no title");
            TitleOutcome::NotListed
        }
        Err(error) => {
            tracing::warn!(
                source = lookup.source_name(),
                isbn13,
                error = %error,
                "title lookup failed; continuing without title"
            );
            TitleOutcome::Unavailable
        }
    }
}

#[derive(Debug, Deserialize)]
struct CatalogEntry {
    #[serde(default)]
    title: Option<serde_json::Value>,
}

impl CatalogEntry {
    fn into_title(self) -> Option<String> {
        match self.title {
            Some(serde_json::Value::String(title)) if !title.is_empty() => Some(title),
            _ => None,
        }
    }
}

/// Open Library client: `GET {base_url}/isbn/{isbn13}.json`.
pub struct OpenLibraryClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl OpenLibraryClient {
    pub fn new(settings: &CatalogSettings) -> anyhow::Result<Self> {
        let timeout = Duration::from_millis(settings.timeout_ms);
        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    fn entry_url(&self, isbn13: &str) -> String {
        format!("{}/isbn/{}.json", self.base_url, isbn13)
    }
}

#[async_trait]
impl TitleLookup for OpenLibraryClient {
    async fn fetch_title(&self, isbn13: &str) -> Result<Option<String>, LookupError> {
        let timeout_ms = duration_ms(self.timeout);

        let response = self
            .client
            .get(self.entry_url(isbn13))
            .send()
            .await
            .map_err(|error| {
                if error.is_timeout() {
                    LookupError::Timeout(timeout_ms)
                } else {
                    LookupError::Transport(error.to_string())
                }
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }

        let entry: CatalogEntry = response.json().await.map_err(|error| {
            if error.is_timeout() {
                LookupError::Timeout(timeout_ms)
            } else {
                LookupError::Decode(error.to_string())
            }
        })?;

        Ok(entry.into_title())
    }

    fn source_name(&self) -> &'static str {
        "open-library"
    }
}

/// Fixed-answer lookup for tests and offline runs.
pub struct StubTitleLookup {
    result: Result<Option<String>, LookupError>,
    delay: Option<Duration>,
}

impl StubTitleLookup {
    /// Always answers `title`.
    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            result: Ok(Some(title.into())),
            delay: None,
        }
    }

    /// Always answers "no title".
    pub fn not_listed() -> Self {
        Self {
            result: Ok(None),
            delay: None,
        }
    }

    /// Always fails with `error`.
    pub fn with_error(error: LookupError) -> Self {
        Self {
            result: Err(error),
            delay: None,
        }
    }

    /// Delay every answer by `delay`.
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl TitleLookup for StubTitleLookup {
    async fn fetch_title(&self, _isbn13: &str) -> Result<Option<String>, LookupError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.result.clone()
    }

    fn source_name(&self) -> &'static str {
        "stub"
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::Path,
        http::StatusCode,
        response::{IntoResponse, Response},
        routing::get,
        Json, Router,
    };
    use serde_json::json;

    async fn catalog_entry(Path(file): Path<String>) -> Response {
        match file.as_str() {
            "9780140328721.json" => Json(json!({ "title": "Fantastic Mr Fox" })).into_response(),
            "9780306406157.json" => Json(json!({ "key": "/books/OL1M" })).into_response(),
            "9780804429573.json" => Json(json!({ "title": 42 })).into_response(),
            "9780131103627.json" => "<html>not json</html>".into_response(),
            "9780201633610.json" => StatusCode::SERVICE_UNAVAILABLE.into_response(),
            "9780262033848.json" => {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(json!({ "title": "Too late" })).into_response()
            }
            _ => StatusCode::NOT_FOUND.into_response(),
        }
    }

    async fn spawn_catalog() -> String {
        let app = Router::new().route("/isbn/{file}", get(catalog_entry));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/", address)
    }

    async fn client(timeout_ms: u64) -> OpenLibraryClient {
        let settings = CatalogSettings {
            base_url: spawn_catalog().await,
            timeout_ms,
            ..CatalogSettings::default()
        };
        OpenLibraryClient::new(&settings).unwrap()
    }

    #[tokio::test]
    async fn fetches_title_from_catalog() {
        let client = client(2000).await;
        let title = client.fetch_title("9780140328721").await.unwrap();
        assert_eq!(title.as_deref(), Some("Fantastic Mr Fox"));
    }

    #[tokio::test]
    async fn missing_or_unusable_title_is_none() {
        let client = client(2000).await;
        assert_eq!(client.fetch_title("9780306406157").await.unwrap(), None);
        assert_eq!(client.fetch_title("9780804429573").await.unwrap(), None);
    }

    #[tokio::test]
    async fn unknown_isbn_is_none() {
        let client = client(2000).await;
        assert_eq!(client.fetch_title("9781111111113").await.unwrap(), None);
    }

    #[tokio::test]
    async fn server_errors_and_bad_bodies_are_errors() {
        let client = client(2000).await;
        assert!(matches!(
            client.fetch_title("9780201633610").await,
            Err(LookupError::Status(503))
        ));
        assert!(matches!(
            client.fetch_title("9780131103627").await,
            Err(LookupError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn slow_catalog_times_out() {
        let client = client(200).await;
        assert!(matches!(
            client.fetch_title("9780262033848").await,
            Err(LookupError::Timeout(200))
        ));
    }

    #[tokio::test]
    async fn unreachable_catalog_is_a_transport_error() {
        let settings = CatalogSettings {
            // Port 9 (discard) on localhost is expected to refuse connections.
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_ms: 1000,
            ..CatalogSettings::default()
        };
        let client = OpenLibraryClient::new(&settings).unwrap();

        assert!(client.fetch_title("9780140328721").await.is_err());
    }

    #[tokio::test]
    async fn boundary_folds_failures_into_unavailable() {
        let outcome = lookup_title(
            &StubTitleLookup::with_error(LookupError::Status(500)),
            "9780140328721",
            Duration::from_secs(1),
        )
        .await;
        assert_eq!(outcome, TitleOutcome::Unavailable);
        assert_eq!(outcome.into_option(), None);
    }

    #[tokio::test]
    async fn boundary_distinguishes_not_listed_from_found() {
        let timeout = Duration::from_secs(1);

        let outcome = lookup_title(&StubTitleLookup::not_listed(), "9780140328721", timeout).await;
        assert_eq!(outcome, TitleOutcome::NotListed);

        let outcome = lookup_title(
            &StubTitleLookup::with_title("Fantastic Mr Fox"),
            "9780140328721",
            timeout,
        )
        .await;
        assert_eq!(outcome, TitleOutcome::Found("Fantastic Mr Fox".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn boundary_imposes_its_own_timeout() {
        let lookup = StubTitleLookup::with_title("Too late").delayed(Duration::from_secs(60));

        let outcome = lookup_title(&lookup, "9780140328721", Duration::from_secs(3)).await;

        assert_eq!(outcome, TitleOutcome::Unavailable);
    }
}
