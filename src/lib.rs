//! tutor-survey library - sequential tutor dialog evaluation survey
//!
//! Serves a small embedded web UI that walks one rater at a time through a
//! fixed list of tutor/student dialog transcripts and records Likert-style
//! judgments for each one.

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod config;
pub mod dataset;
pub mod error;
pub mod responses;
pub mod session;
pub mod sink;
pub mod transcript;

use config::CompletionInfo;
use dataset::Dataset;
use responses::SurveyVariant;
use session::SessionStore;
use sink::ResponseSink;
use transcript::TranscriptParser;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Ordered instance dataset, immutable for the process lifetime
    pub dataset: Arc<Dataset>,
    /// Live sessions, keyed by participant id
    pub sessions: SessionStore,
    /// Analytics sink for response batches
    pub sink: Arc<dyn ResponseSink>,
    /// Variant served by this process
    pub variant: SurveyVariant,
    /// Completion-screen extras
    pub completion: Arc<CompletionInfo>,
}

impl AppState {
    pub fn new(
        dataset: Arc<Dataset>,
        sink: Arc<dyn ResponseSink>,
        variant: SurveyVariant,
        completion: CompletionInfo,
    ) -> Self {
        Self {
            dataset,
            sessions: SessionStore::new(),
            sink,
            variant,
            completion: Arc::new(completion),
        }
    }

    /// Parser configured for this process's variant
    pub fn parser(&self) -> TranscriptParser {
        TranscriptParser::new(self.variant)
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    Router::new()
        .route("/", get(api::serve_index))
        .route("/static/app.js", get(api::serve_app_js))
        .route("/static/survey.css", get(api::serve_survey_css))
        .route("/api/session", get(api::get_session))
        .route("/api/session/start", post(api::start_session))
        .route("/api/session/submit", post(api::submit_response))
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
