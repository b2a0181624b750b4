//! Service configuration
//!
//! All knobs come from the command line with environment-variable fallbacks;
//! there is no configuration file.

use std::path::PathBuf;

use clap::Parser;

use crate::responses::SurveyVariant;

/// Tutor dialog evaluation survey server
#[derive(Parser, Debug, Clone)]
#[command(name = "tutor-survey", version)]
pub struct Config {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:5780", env = "SURVEY_BIND")]
    pub bind: String,

    /// CSV file with the selected dialog instances
    #[arg(long, default_value = "selected_instances.csv", env = "SURVEY_DATASET")]
    pub dataset: PathBuf,

    /// SQLite database collecting the responses
    #[arg(long, default_value = "responses.db", env = "SURVEY_DATABASE")]
    pub database: PathBuf,

    /// Survey variant (controls rating dimensions and answer extraction)
    #[arg(long, value_enum, default_value = "base", env = "SURVEY_VARIANT")]
    pub variant: SurveyVariant,

    /// Serve only the first N instances of the dataset
    #[arg(long, env = "SURVEY_LIMIT")]
    pub limit: Option<usize>,

    /// Completion code shown on the final screen
    #[arg(long, env = "SURVEY_COMPLETION_CODE")]
    pub completion_code: Option<String>,

    /// Link offered to the rater after completion (e.g. back to the
    /// recruitment platform)
    #[arg(long, env = "SURVEY_REDIRECT_URL")]
    pub redirect_url: Option<String>,
}

/// What to show a rater who finished the survey
#[derive(Debug, Clone, Default)]
pub struct CompletionInfo {
    pub completion_code: Option<String>,
    pub redirect_url: Option<String>,
}

impl Config {
    pub fn completion_info(&self) -> CompletionInfo {
        CompletionInfo {
            completion_code: self.completion_code.clone(),
            redirect_url: self.redirect_url.clone(),
        }
    }
}
