//! UI serving routes
//!
//! Serves the embedded HTML/JS survey UI

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

const INDEX_HTML: &str = include_str!("../ui/index.html");
const APP_JS: &str = include_str!("../ui/app.js");
const SURVEY_CSS: &str = include_str!("../ui/survey.css");

/// GET /
///
/// Serves the main survey page
pub async fn serve_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /static/app.js
///
/// Serves the JavaScript application
pub async fn serve_app_js() -> Response {
    (
        StatusCode::OK,
        [("content-type", "application/javascript")],
        APP_JS,
    )
        .into_response()
}

/// GET /static/survey.css
///
/// Serves the survey styles
pub async fn serve_survey_css() -> Response {
    (StatusCode::OK, [("content-type", "text/css")], SURVEY_CSS).into_response()
}
