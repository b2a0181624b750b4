//! HTTP API handlers for tutor-survey

pub mod health;
pub mod session;
pub mod ui;

pub use health::health_routes;
pub use session::{get_session, start_session, submit_response};
pub use ui::{serve_app_js, serve_index, serve_survey_css};
