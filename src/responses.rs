//! Rating schema and response batch construction
//!
//! One submission produces one batch of flat records, one record per rating
//! dimension. All records in a batch carry the same capture timestamp so the
//! analytics side can group them back into a single judgment.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which survey variant this process is serving
///
/// The two deployed variants share the transcript template but differ in
/// rating schema (the growth-mindset dimension is additive) and in whether
/// the template spells out the correct answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SurveyVariant {
    /// Coherence, care and correctness
    Base,
    /// Base dimensions plus growth-mindset supportive language usage
    Extended,
}

impl SurveyVariant {
    /// Rating dimensions presented for this variant, in display order
    pub fn dimensions(&self) -> &'static [RatingDimension] {
        match self {
            SurveyVariant::Base => &ALL_DIMENSIONS[..3],
            SurveyVariant::Extended => &ALL_DIMENSIONS,
        }
    }
}

/// Enumerated rating dimension labels, stable identifiers in the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatingLabel {
    CoherenceRating,
    CareRating,
    CorrectnessRating,
    GmslUsage,
}

impl RatingLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RatingLabel::CoherenceRating => "coherence_rating",
            RatingLabel::CareRating => "care_rating",
            RatingLabel::CorrectnessRating => "correctness_rating",
            RatingLabel::GmslUsage => "gmsl_usage",
        }
    }
}

/// One rating dimension as presented to the rater
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RatingDimension {
    pub label: RatingLabel,
    pub title: &'static str,
    pub help: &'static str,
    /// Fixed 5-point ordinal scale, worst to best
    pub scale: [&'static str; 5],
}

static ALL_DIMENSIONS: [RatingDimension; 4] = [
    RatingDimension {
        label: RatingLabel::CoherenceRating,
        title: "Coherence",
        help: "Coherent responses are logically consistent and relevant to the \
               preceding dialogue. They make sense in the conversation and are \
               easy to understand.",
        scale: [
            "Strongly Incoherent",
            "Incoherent",
            "Neutral",
            "Coherent",
            "Strongly Coherent",
        ],
    },
    RatingDimension {
        label: RatingLabel::CareRating,
        title: "Care",
        help: "Caring responses are responses that express kindness or concern \
               for the student. They foster a collaborative and supportive \
               relationship between the tutor and the student.",
        scale: [
            "Strongly Uncaring",
            "Uncaring",
            "Neutral",
            "Caring",
            "Strongly Caring",
        ],
    },
    RatingDimension {
        label: RatingLabel::CorrectnessRating,
        title: "Correctness",
        help: "Correct responses are accurate and aligned with the passage and \
               question at hand.",
        scale: [
            "Strongly Incorrect",
            "Incorrect",
            "Neutral",
            "Correct",
            "Strongly Correct",
        ],
    },
    RatingDimension {
        label: RatingLabel::GmslUsage,
        title: "Growth Mindset Language",
        help: "How often do the tutor's responses use growth mindset \
               supportive language, encouraging effort and improvement rather \
               than fixed ability?",
        scale: ["Never", "Rarely", "Sometimes", "Often", "Always"],
    },
];

/// One rating dimension for one instance, immutable once created
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseRecord {
    pub participant_id: String,
    pub instance_id: i64,
    pub question_label: RatingLabel,
    pub response_value: String,
    pub timestamp: DateTime<Utc>,
}

/// Build the record batch for one submission
///
/// The timestamp is captured once and applied to every record so a batch is
/// identifiable in the store by (participant_id, instance_id, timestamp).
pub fn collect(
    ratings: &[(RatingLabel, String)],
    participant_id: &str,
    instance_id: i64,
) -> Vec<ResponseRecord> {
    let timestamp = Utc::now();
    ratings
        .iter()
        .map(|(label, value)| ResponseRecord {
            participant_id: participant_id.to_string(),
            instance_id,
            question_label: *label,
            response_value: value.clone(),
            timestamp,
        })
        .collect()
}
