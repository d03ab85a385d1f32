//! Mock metadata API lifecycle management
//!
//! The enricher uses a blocking HTTP client, which must not run inside an
//! async runtime. The mock server therefore gets its own runtime on a
//! background thread, and tests stay plain `#[test]` functions.

use super::constants::*;
use super::fixtures::{mock_anime, MockAnime};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

struct MockState {
    anime: HashMap<u64, MockAnime>,
    /// Sub-resources of these ids always answer 429
    rate_limited: HashSet<u64>,
    /// Episode lists of these ids are malformed
    malformed: HashSet<u64>,
    requests: Mutex<Vec<String>>,
}

impl MockState {
    fn log(&self, request: String) {
        self.requests
            .lock()
            .expect("requests lock poisoned")
            .push(request);
    }
}

/// Mock Jikan API listening on a random local port.
///
/// When dropped, the server shuts down and its thread is joined.
pub struct MockApi {
    /// Base URL to hand to the client (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    state: Arc<MockState>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl MockApi {
    /// Spawns the mock API serving [`mock_anime`].
    ///
    /// # Panics
    ///
    /// Panics if the port cannot be bound or the runtime cannot be built.
    pub fn spawn() -> Self {
        let state = Arc::new(MockState {
            anime: mock_anime().into_iter().map(|a| (a.mal_id, a)).collect(),
            rate_limited: HashSet::from([BUSY_SHOW_ID]),
            malformed: HashSet::from([BROKEN_SHOW_ID]),
            requests: Mutex::new(Vec::new()),
        });

        // Bind before spawning so connections queue until the server runs
        let listener =
            std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind to random port");
        listener
            .set_nonblocking(true)
            .expect("Failed to set listener non-blocking");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        let app = make_app(state.clone());

        let thread = std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("Failed to build mock runtime");
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::from_std(listener)
                    .expect("Failed to adopt listener");
                axum::serve(listener, app)
                    .with_graceful_shutdown(async {
                        shutdown_rx.await.ok();
                    })
                    .await
                    .expect("Mock server failed");
            });
        });

        Self {
            base_url,
            state,
            shutdown_tx: Some(shutdown_tx),
            thread: Some(thread),
        }
    }

    /// Every request received so far, as `path?query`.
    pub fn requests(&self) -> Vec<String> {
        self.state
            .requests
            .lock()
            .expect("requests lock poisoned")
            .clone()
    }

    /// Number of requests whose path starts with `prefix`.
    pub fn count_requests(&self, prefix: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.starts_with(prefix))
            .count()
    }
}

impl Drop for MockApi {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

// ============================================================================
// Routes
// ============================================================================

fn make_app(state: Arc<MockState>) -> Router {
    Router::new()
        .route("/anime", get(search))
        .route("/anime/{id}", get(detail))
        .route("/anime/{id}/episodes", get(episodes))
        .route("/anime/{id}/themes", get(themes))
        .route("/anime/{id}/relations", get(relations))
        .with_state(state)
}

#[derive(Deserialize)]
struct SearchParams {
    q: String,
}

#[derive(Deserialize)]
struct PageParams {
    page: Option<u32>,
}

async fn search(State(state): State<Arc<MockState>>, Query(params): Query<SearchParams>) -> Response {
    state.log(format!("/anime?q={}", params.q));
    let data: Vec<Value> = state
        .anime
        .values()
        .filter(|a| a.title.eq_ignore_ascii_case(params.q.trim()))
        .map(MockAnime::to_json)
        .collect();
    Json(json!({ "data": data })).into_response()
}

async fn detail(State(state): State<Arc<MockState>>, Path(id): Path<u64>) -> Response {
    state.log(format!("/anime/{}", id));
    match state.anime.get(&id) {
        Some(anime) => Json(json!({ "data": anime.to_json() })).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn episodes(
    State(state): State<Arc<MockState>>,
    Path(id): Path<u64>,
    Query(params): Query<PageParams>,
) -> Response {
    let page = params.page.unwrap_or(1).max(1);
    state.log(format!("/anime/{}/episodes?page={}", id, page));
    if state.rate_limited.contains(&id) {
        return StatusCode::TOO_MANY_REQUESTS.into_response();
    }
    if state.malformed.contains(&id) {
        return Json(json!({ "data": "temporarily unavailable" })).into_response();
    }
    let Some(anime) = state.anime.get(&id) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let first = (page - 1) * EPISODES_PAGE_SIZE + 1;
    let last = (page * EPISODES_PAGE_SIZE).min(anime.episodes);
    let data: Vec<Value> = (first..=last)
        .map(|n| {
            json!({
                "mal_id": n,
                "title": format!("{} Episode {}", anime.title, n),
                "aired": "2014-04-01T00:00:00+00:00",
                "score": 4.5,
                "filler": n % 5 == 0,
            })
        })
        .collect();
    let last_visible_page = anime.episodes.div_ceil(EPISODES_PAGE_SIZE).max(1);
    Json(json!({
        "data": data,
        "pagination": {
            "last_visible_page": last_visible_page,
            "has_next_page": page < last_visible_page,
        }
    }))
    .into_response()
}

async fn themes(State(state): State<Arc<MockState>>, Path(id): Path<u64>) -> Response {
    state.log(format!("/anime/{}/themes", id));
    if state.rate_limited.contains(&id) {
        return StatusCode::TOO_MANY_REQUESTS.into_response();
    }
    match state.anime.get(&id) {
        Some(anime) => Json(json!({
            "data": { "openings": anime.openings, "endings": anime.endings }
        }))
        .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn relations(State(state): State<Arc<MockState>>, Path(id): Path<u64>) -> Response {
    state.log(format!("/anime/{}/relations", id));
    if state.rate_limited.contains(&id) {
        return StatusCode::TOO_MANY_REQUESTS.into_response();
    }
    let Some(anime) = state.anime.get(&id) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let data: Vec<Value> = anime
        .relations
        .iter()
        .map(|(relation, mal_id, kind, name)| {
            json!({
                "relation": relation,
                "entry": [{ "mal_id": mal_id, "type": kind, "name": name }],
            })
        })
        .collect();
    Json(json!({ "data": data })).into_response()
}
