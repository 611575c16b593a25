use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::{
    collections::HashMap,
    convert::Infallible,
    net::SocketAddr,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::{Duration, SystemTime, UNIX_EPOCH},
};
use tokio::sync::{broadcast, Mutex};
use tokio_stream::{wrappers::BroadcastStream, StreamExt};
use tower_http::services::{ServeDir, ServeFile};
use tracing::{info, warn};

use campaign_risk::api::{ApiAnalysisRequest, ApiAnalysisResponse, ApiHealth, ApiPersonaList};
use campaign_risk::persona::PersonaSummary;
use campaign_risk::{AnalysisError, Analyzer, AnalyzerConfig, Stage};

type Channels = Arc<Mutex<HashMap<String, broadcast::Sender<StreamEvent>>>>;

const CHANNEL_TTL: Duration = Duration::from_secs(10);

#[derive(Clone)]
struct AppState {
    analyzer: Arc<Analyzer>,
    channels: Channels,
    /// How long a progress channel outlives its last use.
    channel_ttl: Duration,
}

#[derive(Clone, Serialize)]
struct StreamEvent {
    event: String,
    message: String,
    progress: u8,
    timestamp_ms: u128,
}

#[derive(serde::Deserialize)]
struct StreamQuery {
    request_id: String,
}

#[derive(serde::Deserialize)]
struct PersonaQuery {
    category: Option<String>,
}

static REQUEST_COUNTER: AtomicUsize = AtomicUsize::new(0);

pub async fn serve(args: crate::ServeArgs, config: AnalyzerConfig) -> Result<(), String> {
    let analyzer = Analyzer::from_config(&config).await?;
    info!(
        personas = analyzer.personas().len(),
        image = analyzer.image_enabled(),
        "analyzer ready"
    );
    let state = AppState {
        analyzer: Arc::new(analyzer),
        channels: Arc::new(Mutex::new(HashMap::new())),
        channel_ttl: CHANNEL_TTL,
    };

    let mut app = Router::new()
        .route("/api/health", get(health))
        .route("/api/personas", get(personas_handler))
        .route("/api/analyze", post(analyze_handler))
        .route("/api/analyze/stream", get(stream_handler));
    if let Some(web_root) = args.web_root {
        let index_path = format!("{}/index.html", web_root.trim_end_matches('/'));
        let static_service =
            ServeDir::new(web_root).not_found_service(ServeFile::new(index_path));
        app = app.nest_service("/", static_service);
    }
    let app = app.with_state(state);

    let host = args.host.unwrap_or(config.server.host);
    let port = args.port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .map_err(|err| format!("invalid bind address: {}", err))?;

    info!(%addr, "listening");
    axum::serve(tokio::net::TcpListener::bind(addr).await.map_err(|err| {
        format!("failed to bind server: {}", err)
    })?, app)
    .await
    .map_err(|err| format!("server error: {}", err))?;

    Ok(())
}

async fn health(State(state): State<AppState>) -> Json<ApiHealth> {
    Json(ApiHealth::from_analyzer(&state.analyzer).await)
}

async fn personas_handler(
    State(state): State<AppState>,
    Query(query): Query<PersonaQuery>,
) -> Json<ApiPersonaList> {
    let catalog = state.analyzer.personas();
    let personas: Vec<PersonaSummary> = match query.category.as_deref().map(str::trim) {
        Some(category) if !category.is_empty() => catalog
            .by_category(category)
            .into_iter()
            .map(PersonaSummary::from)
            .collect(),
        _ => catalog.summaries(),
    };
    Json(ApiPersonaList {
        total: personas.len(),
        categories: catalog.categories(),
        personas,
    })
}

async fn analyze_handler(
    State(state): State<AppState>,
    Json(request): Json<ApiAnalysisRequest>,
) -> Result<Json<ApiAnalysisResponse>, (StatusCode, String)> {
    let request_id = request
        .request_id
        .clone()
        .unwrap_or_else(generate_request_id);
    let sender = get_or_create_channel(&state, &request_id).await;
    let content = match request.into_content() {
        Ok(content) => content,
        Err(err) => {
            send_event(&sender, "error", &err, 100);
            schedule_cleanup(&state, request_id);
            return Err((StatusCode::BAD_REQUEST, err));
        }
    };

    let result = state
        .analyzer
        .analyze_with_progress(content, |stage: Stage| {
            send_event(&sender, stage.event(), stage.label(), stage.percent());
        })
        .await;
    schedule_cleanup(&state, request_id.clone());

    match result {
        Ok(outcome) => Ok(Json(ApiAnalysisResponse::from_outcome(outcome, request_id))),
        Err(err) => {
            send_event(&sender, "error", &err.to_string(), 100);
            Err(error_response(err))
        }
    }
}

fn error_response(err: AnalysisError) -> (StatusCode, String) {
    match err {
        AnalysisError::Validation(message) => (StatusCode::BAD_REQUEST, message),
        AnalysisError::Internal(message) => {
            warn!(error = %message, "analysis failed");
            (StatusCode::INTERNAL_SERVER_ERROR, message)
        }
    }
}

async fn stream_handler(
    State(state): State<AppState>,
    Query(query): Query<StreamQuery>,
) -> Result<Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>>, StatusCode> {
    let sender = get_or_create_channel(&state, &query.request_id).await;
    schedule_cleanup(&state, query.request_id.clone());
    let receiver = sender.subscribe();
    let stream = BroadcastStream::new(receiver).filter_map(|event| match event {
        Ok(event) => {
            let data = serde_json::to_string(&event).unwrap_or_default();
            Some(Ok(Event::default().event(event.event.clone()).data(data)))
        }
        Err(_) => None,
    });

    send_event(&sender, "connected", "Streaming analysis progress", 0);
    Ok(Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(8))))
}

async fn get_or_create_channel(
    state: &AppState,
    request_id: &str,
) -> broadcast::Sender<StreamEvent> {
    let mut guard = state.channels.lock().await;
    if let Some(sender) = guard.get(request_id) {
        return sender.clone();
    }
    let (sender, _) = broadcast::channel(32);
    guard.insert(request_id.to_string(), sender.clone());
    sender
}

fn send_event(sender: &broadcast::Sender<StreamEvent>, event: &str, message: &str, progress: u8) {
    let _ = sender.send(StreamEvent {
        event: event.to_string(),
        message: message.to_string(),
        progress,
        timestamp_ms: now_ms(),
    });
}

fn schedule_cleanup(state: &AppState, request_id: String) {
    let channels = state.channels.clone();
    let ttl = state.channel_ttl;
    tokio::spawn(async move {
        tokio::time::sleep(ttl).await;
        let mut guard = channels.lock().await;
        guard.remove(&request_id);
    });
}

fn generate_request_id() -> String {
    let counter = REQUEST_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("req-{}-{}", now_ms(), counter)
}

fn now_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_millis())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    async fn state() -> AppState {
        let mut config = AnalyzerConfig::default();
        config.data.dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data");
        config.image.enabled = false;
        AppState {
            analyzer: Arc::new(Analyzer::from_config(&config).await.expect("analyzer")),
            channels: Arc::new(Mutex::new(HashMap::new())),
            channel_ttl: Duration::from_millis(20),
        }
    }

    async fn open_channels(state: &AppState) -> usize {
        state.channels.lock().await.len()
    }

    #[tokio::test]
    async fn rejected_request_releases_its_channel() {
        let state = state().await;
        let request = ApiAnalysisRequest {
            caption: Some("Diwali sale".to_string()),
            platform: Some("myspace".to_string()),
            request_id: Some("bad-platform".to_string()),
            ..ApiAnalysisRequest::default()
        };
        let result = analyze_handler(State(state.clone()), Json(request)).await;
        let (status, _) = result.err().expect("invalid platform is rejected");
        assert_eq!(status, StatusCode::BAD_REQUEST);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(open_channels(&state).await, 0);
    }

    #[tokio::test]
    async fn abandoned_stream_channel_is_released() {
        let state = state().await;
        let query = StreamQuery {
            request_id: "never-posted".to_string(),
        };
        let stream = stream_handler(State(state.clone()), Query(query)).await;
        assert!(stream.is_ok());
        assert_eq!(open_channels(&state).await, 1);
        drop(stream);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(open_channels(&state).await, 0);
    }

    #[tokio::test]
    async fn health_reports_loaded_tables() {
        let state = state().await;
        let Json(health) = health(State(state)).await;
        assert_eq!(health.status, "ok");
        assert_eq!(health.triggers, 40);
        assert_eq!(health.festivals, 24);
        assert_eq!(health.personas, 57);
        assert_eq!(health.historical_campaigns, 25);
        assert!(!health.image_enabled);
        assert!(health.trigger_categories.iter().any(|category| category == "Colorism"));
        assert_eq!(health.cache.entries, 0);
    }
}
