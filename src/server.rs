//! HTTP server exposing price lookups

use crate::models::RtechPriceDto;
use crate::scrapers::PriceSource;
use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

const MISSING_ADDRESS: &str = "주소를 입력해주세요.";

/// Application state shared across handlers
pub struct AppState {
    pub source: Arc<dyn PriceSource>,
}

impl AppState {
    pub fn new(source: Arc<dyn PriceSource>) -> Self {
        Self { source }
    }
}

type AppStateArc = Arc<AppState>;

#[derive(Debug, Deserialize)]
pub struct CrawlQuery {
    pub address: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

pub fn router(state: AppStateArc) -> Router {
    Router::new()
        .route("/crawl", get(crawl))
        .route("/health", get(health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Run the HTTP server
pub async fn run(bind: SocketAddr, state: AppState) -> Result<()> {
    let app = router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    info!("Listening on http://{}", bind);

    axum::serve(listener, app).await?;
    Ok(())
}

async fn crawl(
    State(state): State<AppStateArc>,
    Query(query): Query<CrawlQuery>,
) -> Result<Json<RtechPriceDto>, (StatusCode, Json<ErrorBody>)> {
    let address = query.address.as_deref().map(str::trim).unwrap_or_default();
    if address.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorBody {
                detail: MISSING_ADDRESS.to_string(),
            }),
        ));
    }

    info!("Crawling {} for {}", state.source.source_name(), address);

    // Lookup failures are reported in the body, not as an HTTP error
    let dto = match state.source.lookup(address).await {
        Ok(quote) => RtechPriceDto::from_quote(address, quote),
        Err(e) => {
            error!("Crawl failed for {}: {:#}", address, e);
            RtechPriceDto::failed(address, &e)
        }
    };

    Ok(Json(dto))
}

async fn health(State(state): State<AppStateArc>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "source": state.source.source_name(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::{AreaPrices, PriceQuote};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use std::sync::Mutex;
    use tower::ServiceExt;

    struct FakeSource {
        outcome: std::result::Result<PriceQuote, String>,
        seen: Mutex<Vec<String>>,
    }

    impl FakeSource {
        fn new(outcome: std::result::Result<PriceQuote, String>) -> Arc<Self> {
            Arc::new(Self {
                outcome,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl PriceSource for FakeSource {
        async fn lookup(&self, address: &str) -> Result<PriceQuote> {
            self.seen.lock().unwrap().push(address.to_string());
            self.outcome.clone().map_err(|msg| anyhow::anyhow!(msg))
        }

        fn source_name(&self) -> &'static str {
            "fake"
        }
    }

    fn quote() -> PriceQuote {
        PriceQuote {
            prices: AreaPrices {
                sale_lower_avg: Some(590_000_000),
                sale_upper_avg: Some(635_000_000),
                rent_lower_avg: Some(380_000_000),
                rent_upper_avg: Some(410_000_000),
            },
            source_url: Some("https://rtech.or.kr/popup.do".to_string()),
        }
    }

    async fn get(source: Arc<FakeSource>, uri: &str) -> (StatusCode, Vec<u8>) {
        let app = router(Arc::new(AppState::new(source)));
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, body.to_vec())
    }

    #[tokio::test]
    async fn test_missing_address_is_bad_request() {
        let source = FakeSource::new(Ok(quote()));

        for uri in ["/crawl", "/crawl?address=", "/crawl?address=%20%20"] {
            let (status, body) = get(source.clone(), uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
            let body: ErrorBody = serde_json::from_slice(&body).unwrap();
            assert_eq!(body.detail, MISSING_ADDRESS);
        }
        assert!(source.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_crawl_returns_prices() {
        let source = FakeSource::new(Ok(quote()));
        // 서울 잠실
        let (status, body) = get(source.clone(), "/crawl?address=%EC%84%9C%EC%9A%B8%20%EC%9E%A0%EC%8B%A4").await;

        assert_eq!(status, StatusCode::OK);
        let dto: RtechPriceDto = serde_json::from_slice(&body).unwrap();
        assert_eq!(dto.address, "서울 잠실");
        assert_eq!(dto.sale_lower_avg, Some(590_000_000));
        assert_eq!(dto.rent_upper_avg, Some(410_000_000));
        assert_eq!(dto.source_url.as_deref(), Some("https://rtech.or.kr/popup.do"));
        assert_eq!(dto.error, None);
        assert_eq!(*source.seen.lock().unwrap(), vec!["서울 잠실".to_string()]);
    }

    #[tokio::test]
    async fn test_lookup_failure_is_reported_in_body() {
        let source = FakeSource::new(Err("Search input did not appear".to_string()));
        let (status, body) = get(source, "/crawl?address=abc").await;

        assert_eq!(status, StatusCode::OK);
        let dto: RtechPriceDto = serde_json::from_slice(&body).unwrap();
        assert_eq!(dto.address, "abc");
        assert_eq!(dto.sale_lower_avg, None);
        assert_eq!(
            dto.error.as_deref(),
            Some("크롤링 오류 발생: Search input did not appear")
        );
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get(FakeSource::new(Ok(PriceQuote::default())), "/health").await;

        assert_eq!(status, StatusCode::OK);
        let value: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["status"], "ok");
        assert_eq!(value["source"], "fake");
    }
}
