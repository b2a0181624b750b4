//! Session screens and submission handling
//!
//! The client never manipulates the session cursor directly: it asks for the
//! current screen, and the only mutations are `start` and `submit`. A submit
//! names the instance index it was rendered for, so a stale or repeated
//! submission is rejected instead of double-advancing the session.

use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};

use crate::responses::{collect, RatingDimension, RatingLabel};
use crate::session::Phase;
use crate::sink::ResponseSink;
use crate::transcript::ParsedTranscript;
use crate::AppState;

/// Query parameters for session lookup
#[derive(Debug, Deserialize)]
pub struct SessionQuery {
    /// Identity hint from the recruitment link; a fresh participant id is
    /// generated when absent
    pub id: Option<String>,
}

/// Screen to render, as determined by the session cursor
#[derive(Debug, Serialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum ScreenPayload {
    Welcome {
        participant_id: String,
    },
    Active {
        participant_id: String,
        /// Zero-based position in the dataset
        index: usize,
        total: usize,
        /// Fraction of the survey reached, for the progress bar
        progress: f64,
        transcript: ParsedTranscript,
        dimensions: &'static [RatingDimension],
    },
    Complete {
        participant_id: String,
        completion_code: Option<String>,
        redirect_url: Option<String>,
    },
}

/// POST /api/session/start request body
#[derive(Debug, Deserialize)]
pub struct StartRequest {
    pub participant_id: String,
}

/// POST /api/session/submit request body
#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub participant_id: String,
    /// Dataset position this submission was rendered for
    pub instance_index: i64,
    /// Rating label -> selected scale value
    pub ratings: HashMap<String, String>,
}

/// POST /api/session/submit response body
///
/// `saved` is always true: persistence failures are an operator concern and
/// never block the rater (at-most-once contract).
#[derive(Debug, Serialize)]
pub struct SubmitAck {
    pub saved: bool,
    pub next: ScreenPayload,
}

/// Session API errors
#[derive(Debug)]
pub enum SessionError {
    UnknownSession(String),
    StaleIndex(i64),
    InvalidRatings(String),
    Internal(String),
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            SessionError::UnknownSession(id) => (
                StatusCode::NOT_FOUND,
                format!("Unknown session: {}", id),
            ),
            SessionError::StaleIndex(index) => (
                StatusCode::CONFLICT,
                format!("Instance {} is not the one under review", index),
            ),
            SessionError::InvalidRatings(msg) => {
                (StatusCode::BAD_REQUEST, format!("Invalid ratings: {}", msg))
            }
            SessionError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, format!("Internal error: {}", msg))
            }
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

/// GET /api/session?id=...
///
/// Creates the session on first contact and returns the current screen.
pub async fn get_session(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
) -> Result<Json<ScreenPayload>, SessionError> {
    let identity_hint = query.id.filter(|id| !id.is_empty());
    let session = state.sessions.get_or_create(identity_hint).await;
    Ok(Json(screen_for(&state, &session.participant_id, session.phase(state.dataset.len()))?))
}

/// POST /api/session/start
///
/// Welcome -> first instance. Starting an already-started session is a no-op
/// so a reloaded welcome page cannot skip an instance.
pub async fn start_session(
    State(state): State<AppState>,
    Json(request): Json<StartRequest>,
) -> Result<Json<ScreenPayload>, SessionError> {
    let session = state.sessions.start(&request.participant_id).await;
    info!("Session {} started", session.participant_id);
    Ok(Json(screen_for(&state, &session.participant_id, session.phase(state.dataset.len()))?))
}

/// POST /api/session/submit
///
/// Validates the submission, atomically claims the named instance by
/// advancing the cursor, then hands the response batch to the sink. Claiming
/// before persisting means concurrent duplicates (a double-click) race on the
/// cursor, not on the sink: exactly one of them persists a batch, the rest
/// get 409. The sink outcome is logged but never surfaced to the rater.
pub async fn submit_response(
    State(state): State<AppState>,
    Json(request): Json<SubmitRequest>,
) -> Result<Json<SubmitAck>, SessionError> {
    let total = state.dataset.len();
    state
        .sessions
        .get(&request.participant_id)
        .await
        .ok_or_else(|| SessionError::UnknownSession(request.participant_id.clone()))?;

    if request.instance_index < 0 {
        return Err(SessionError::StaleIndex(request.instance_index));
    }
    let index = request.instance_index as usize;

    let ratings = validate_ratings(&state, &request.ratings)?;

    // Atomic claim: only the submission that moves the cursor past this
    // instance gets to emit its batch
    let session = state
        .sessions
        .advance_from(&request.participant_id, index, total)
        .await
        .ok_or(SessionError::StaleIndex(request.instance_index))?;

    // The claim guarantees index < total
    let instance = state
        .dataset
        .get(index)
        .ok_or_else(|| SessionError::Internal(format!("No instance at index {}", index)))?;

    let records = collect(&ratings, &request.participant_id, instance.instance_id);

    // Fire-and-forget: failures are visible to the operator only
    match state.sink.persist(&records).await {
        Ok(errors) if errors.is_empty() => {
            info!(
                "Saved {} responses for participant {} instance {}",
                records.len(),
                request.participant_id,
                instance.instance_id
            );
        }
        Ok(errors) => {
            error!(
                "Encountered errors while inserting rows for participant {} instance {}: {:?}",
                request.participant_id, instance.instance_id, errors
            );
        }
        Err(e) => {
            error!(
                "Failed to persist responses for participant {} instance {}: {}",
                request.participant_id, instance.instance_id, e
            );
        }
    }

    let next = screen_for(&state, &session.participant_id, session.phase(total))?;
    Ok(Json(SubmitAck { saved: true, next }))
}

/// Require exactly the variant's label set, in display order
fn validate_ratings(
    state: &AppState,
    ratings: &HashMap<String, String>,
) -> Result<Vec<(RatingLabel, String)>, SessionError> {
    let dimensions = state.variant.dimensions();

    for key in ratings.keys() {
        if !dimensions.iter().any(|d| d.label.as_str() == key) {
            return Err(SessionError::InvalidRatings(format!(
                "unexpected label '{}'",
                key
            )));
        }
    }

    dimensions
        .iter()
        .map(|dimension| {
            ratings
                .get(dimension.label.as_str())
                .map(|value| (dimension.label, value.clone()))
                .ok_or_else(|| {
                    SessionError::InvalidRatings(format!(
                        "missing label '{}'",
                        dimension.label.as_str()
                    ))
                })
        })
        .collect()
}

/// Build the screen payload for a session phase
fn screen_for(
    state: &AppState,
    participant_id: &str,
    phase: Phase,
) -> Result<ScreenPayload, SessionError> {
    match phase {
        Phase::Welcome => Ok(ScreenPayload::Welcome {
            participant_id: participant_id.to_string(),
        }),
        Phase::Active(index) => {
            let total = state.dataset.len();
            let instance = state.dataset.get(index).ok_or_else(|| {
                SessionError::Internal(format!("No instance at index {}", index))
            })?;
            Ok(ScreenPayload::Active {
                participant_id: participant_id.to_string(),
                index,
                total,
                progress: (index + 1) as f64 / total as f64,
                transcript: state.parser().parse(&instance.text),
                dimensions: state.variant.dimensions(),
            })
        }
        Phase::Complete => Ok(ScreenPayload::Complete {
            participant_id: participant_id.to_string(),
            completion_code: state.completion.completion_code.clone(),
            redirect_url: state.completion.redirect_url.clone(),
        }),
    }
}
