//! HTTP server entry point and Axum router setup.
//!
//! Resolves configuration from the environment, builds one hosted-model
//! client per agent, and serves the medical analysis and health tracking
//! routes.

mod dto;
mod error;
mod handlers;
mod services;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use doctorx_config::{AgentKind, ServiceConfig};
use doctorx_core::AgentError;
use doctorx_llm::{ModelInvoker, UnifiedLlmClient};

use anyhow::Result;
use axum::body::Body;
use axum::extract::DefaultBodyLimit;
use axum::http::{Request, Response};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// One hosted-model client per agent.
pub struct AgentSet {
    medical_image: Arc<dyn ModelInvoker>,
    report_extraction: Arc<dyn ModelInvoker>,
    health_tracking: Arc<dyn ModelInvoker>,
    trend_visualization: Arc<dyn ModelInvoker>,
}

impl AgentSet {
    /// Builds a client for every agent from the service configuration.
    pub fn from_config(config: &ServiceConfig) -> Result<Self, AgentError> {
        let build = |kind: AgentKind| -> Result<Arc<dyn ModelInvoker>, AgentError> {
            let client = UnifiedLlmClient::new(&kind.config(config), config.api_base.as_deref())?;
            let client: Arc<dyn ModelInvoker> = Arc::new(client);
            Ok(client)
        };

        Ok(Self {
            medical_image: build(AgentKind::MedicalImage)?,
            report_extraction: build(AgentKind::ReportExtraction)?,
            health_tracking: build(AgentKind::HealthTracking)?,
            trend_visualization: build(AgentKind::TrendVisualization)?,
        })
    }

    /// Uses the same invoker for every agent.
    #[cfg(test)]
    pub fn uniform(invoker: Arc<dyn ModelInvoker>) -> Self {
        Self {
            medical_image: invoker.clone(),
            report_extraction: invoker.clone(),
            health_tracking: invoker.clone(),
            trend_visualization: invoker,
        }
    }

    pub fn get(&self, kind: AgentKind) -> &dyn ModelInvoker {
        match kind {
            AgentKind::MedicalImage => self.medical_image.as_ref(),
            AgentKind::ReportExtraction => self.report_extraction.as_ref(),
            AgentKind::HealthTracking => self.health_tracking.as_ref(),
            AgentKind::TrendVisualization => self.trend_visualization.as_ref(),
        }
    }
}

/// Shared server state accessible from all handlers.
pub struct ServerState {
    pub agents: AgentSet,
    pub upload_dir: PathBuf,
    pub model_timeout: Duration,
    pub cleanup_delay: Duration,
    pub max_upload_bytes: usize,
}

impl ServerState {
    pub fn new(config: &ServiceConfig, agents: AgentSet) -> Self {
        Self {
            agents,
            upload_dir: config.upload_dir.clone(),
            model_timeout: config.model_timeout,
            cleanup_delay: config.cleanup_delay,
            max_upload_bytes: config.max_upload_bytes,
        }
    }
}

/// Builds the application router over the given state.
pub fn app(state: Arc<ServerState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request<Body>| {
            tracing::info_span!(
                "request",
                method = %req.method(),
                uri = %req.uri(),
                version = ?req.version(),
            )
        })
        .on_response(|res: &Response<Body>, latency: Duration, _span: &tracing::Span| {
            info!(
                latency = %format!("{} ms", latency.as_millis()),
                status = %res.status().as_u16(),
                "finished processing request"
            );
        });

    let logged_routes = Router::new()
        .route("/api/medical-analysis", post(handlers::medical::analyze_image))
        .route("/api/health-tracking/scan-report", post(handlers::medical::scan_report))
        .route("/api/health-tracking/analyze", post(handlers::tracking::analyze))
        .route("/api/health-tracking/trend-analysis", post(handlers::tracking::trend_analysis))
        .route("/api/health-tracking/quick-log", post(handlers::tracking::quick_log))
        .route("/api/chronic-care", post(handlers::chronic_care))
        .route("/api/recovery-plan", post(handlers::recovery_plan))
        .route("/api/find-specialist", post(handlers::find_specialist))
        .layer(DefaultBodyLimit::max(state.max_upload_bytes))
        .layer(trace_layer);

    Router::new()
        .merge(logged_routes)
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .compact()
        .init();

    let config = ServiceConfig::from_env()?;
    info!("Loaded configuration: {:?}", config);

    let agents = AgentSet::from_config(&config)?;
    let state = Arc::new(ServerState::new(&config, agents));

    info!("Starting server on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Router fixtures shared by the handler tests.

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use axum::http::{header, Request, StatusCode};
    use doctorx_llm::{Attachment, LlmResponse};
    use http_body_util::BodyExt;
    use tempfile::TempDir;
    use tower::ServiceExt;

    use super::*;

    /// Records what each call received and answers with a canned reply.
    pub struct StubInvoker {
        reply: std::result::Result<String, String>,
        delay: Duration,
        calls: AtomicUsize,
        prompts: Mutex<Vec<String>>,
        /// (mime type, file existed at call time) per attachment.
        attachments: Mutex<Vec<(String, bool)>>,
    }

    impl StubInvoker {
        fn build(reply: std::result::Result<String, String>, delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                reply,
                delay,
                calls: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
                attachments: Mutex::new(Vec::new()),
            })
        }

        pub fn replying(reply: &str) -> Arc<Self> {
            Self::build(Ok(reply.to_string()), Duration::ZERO)
        }

        pub fn failing(message: &str) -> Arc<Self> {
            Self::build(Err(message.to_string()), Duration::ZERO)
        }

        pub fn stalling(delay: Duration) -> Arc<Self> {
            Self::build(Ok("late".to_string()), delay)
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn last_prompt(&self) -> String {
            self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
        }

        pub fn attachments(&self) -> Vec<(String, bool)> {
            self.attachments.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ModelInvoker for StubInvoker {
        async fn invoke(&self, prompt: &str, attachments: &[Attachment]) -> std::result::Result<LlmResponse, AgentError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.attachments.lock().unwrap().extend(
                attachments
                    .iter()
                    .map(|a| (a.mime_type().to_string(), a.path().exists())),
            );
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            match &self.reply {
                Ok(text) => Ok(LlmResponse::text(text.clone())),
                Err(message) => Err(AgentError::LlmError(message.clone())),
            }
        }
    }

    /// A router over `invoker` with a scratch upload directory.
    pub struct TestApp {
        pub router: Router,
        pub upload_dir: TempDir,
    }

    impl TestApp {
        pub fn new(invoker: Arc<StubInvoker>) -> Self {
            Self::with_timeout(invoker, Duration::from_secs(5))
        }

        pub fn with_timeout(invoker: Arc<StubInvoker>, model_timeout: Duration) -> Self {
            let upload_dir = tempfile::tempdir().unwrap();
            let state = ServerState {
                agents: AgentSet::uniform(invoker),
                upload_dir: upload_dir.path().to_path_buf(),
                model_timeout,
                cleanup_delay: Duration::ZERO,
                max_upload_bytes: 1024 * 1024,
            };
            Self { router: app(Arc::new(state)), upload_dir }
        }

        pub fn staged_files(&self) -> usize {
            std::fs::read_dir(self.upload_dir.path()).unwrap().count()
        }

        pub async fn send(&self, request: Request<Body>) -> (StatusCode, serde_json::Value) {
            let response = self.router.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = response.into_body().collect().await.unwrap().to_bytes();
            let body = serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| serde_json::Value::String(String::from_utf8_lossy(&bytes).into_owned()));
            (status, body)
        }

        pub async fn post_json(&self, uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
            let request = Request::post(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap();
            self.send(request).await
        }

        pub async fn post_multipart(
            &self,
            uri: &str,
            file: Option<(&str, &[u8])>,
            fields: &[(&str, &str)],
        ) -> (StatusCode, serde_json::Value) {
            const BOUNDARY: &str = "doctorx-test-boundary";
            let mut body = Vec::new();
            if let Some((filename, bytes)) = file {
                body.extend_from_slice(
                    format!(
                        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
                body.extend_from_slice(b"\r\n");
            }
            for (name, value) in fields {
                body.extend_from_slice(
                    format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                        .as_bytes(),
                );
            }
            body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

            let request = Request::post(uri)
                .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
                .body(Body::from(body))
                .unwrap();
            self.send(request).await
        }
    }
}
