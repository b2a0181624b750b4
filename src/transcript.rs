//! Transcript parsing
//!
//! Extracts display fields from the templated transcript blobs the tutoring
//! model emitted. The format is a fixed set of sentinel substrings rather
//! than a grammar, so every extraction is best-effort: a missing sentinel
//! resolves to an absent field or an empty list, never an error. Keeping the
//! sentinel search behind this module means a real grammar could replace it
//! later without touching callers.

use serde::Serialize;

use crate::responses::SurveyVariant;

/// Opening sentinel of the reading passage (end of the prompt preamble)
pub const PASSAGE_START: &str = "Remember, short sentences and clear hints are key.";
/// Sentinel that terminates the passage and introduces the question
pub const QUESTION_START: &str = "Question:";
/// Sentinel that introduces the answer options
pub const OPTIONS_START: &str = "Options:";
/// Instruction-turn separator used throughout the transcript
pub const TURN_SEPARATOR: &str = "[/INST]";
/// End-of-sequence token that closes each segment
pub const END_TOKEN: &str = "</s>";

// The extended transcript template spells out the correct answer inline.
const ANSWER_START: &str = "which is :'";
const ANSWER_END: &str = "', by thinking";

/// Who uttered a dialog turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Speaker {
    Tutor,
    Student,
}

/// One utterance within a transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
}

/// Structured view of one transcript, derived from the raw text on every
/// render. Recomputation is cheap and side-effect-free, so nothing is cached.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedTranscript {
    pub passage: Option<String>,
    pub question: Option<String>,
    pub options: Vec<String>,
    pub correct_answer: Option<String>,
    pub turns: Vec<Turn>,
}

/// Best-effort sentinel extractor for transcript blobs
///
/// The two survey variants share one template except for the inline
/// correct-answer marker, which only the extended variant carries.
#[derive(Debug, Clone, Copy)]
pub struct TranscriptParser {
    variant: SurveyVariant,
}

impl TranscriptParser {
    pub fn new(variant: SurveyVariant) -> Self {
        Self { variant }
    }

    /// Parse one raw transcript blob into display fields
    pub fn parse(&self, raw_text: &str) -> ParsedTranscript {
        let mut parsed = ParsedTranscript {
            passage: extract_passage(raw_text),
            ..Default::default()
        };

        if self.variant == SurveyVariant::Extended {
            parsed.correct_answer =
                between(raw_text, ANSWER_START, ANSWER_END).map(|s| s.to_string());
        }

        let mut turn_position = 0usize;
        for part in raw_text.split(TURN_SEPARATOR) {
            let has_question = part.contains(QUESTION_START);
            let has_options = part.contains(OPTIONS_START);

            if has_question && parsed.question.is_none() {
                parsed.question = extract_question(part);
            }
            if has_options && parsed.options.is_empty() {
                parsed.options = extract_options(part);
            }
            if !has_question && !has_options && !part.trim().is_empty() {
                // Odd positions (1-indexed) are tutor turns, the template
                // always opens the dialog with the tutor.
                turn_position += 1;
                let text = part.split(END_TOKEN).next().unwrap_or(part).trim();
                parsed.turns.push(Turn {
                    speaker: if turn_position % 2 == 1 {
                        Speaker::Tutor
                    } else {
                        Speaker::Student
                    },
                    text: text.to_string(),
                });
            }
        }

        parsed
    }
}

/// Extract the reading passage between its two sentinels
///
/// Returns None only when a sentinel is missing or they appear out of order;
/// adjacent sentinels yield an empty passage, not an absent one.
pub fn extract_passage(text: &str) -> Option<String> {
    let start = text.find(PASSAGE_START)? + PASSAGE_START.len();
    let end = text.find(QUESTION_START)?;
    if end < start {
        return None;
    }
    Some(text[start..end].trim().to_string())
}

fn extract_question(part: &str) -> Option<String> {
    let after = part.splitn(2, QUESTION_START).nth(1)?;
    let question = after.split(OPTIONS_START).next().unwrap_or(after).trim();
    if question.is_empty() {
        None
    } else {
        Some(question.to_string())
    }
}

fn extract_options(part: &str) -> Vec<String> {
    let Some(after) = part.splitn(2, OPTIONS_START).nth(1) else {
        return Vec::new();
    };
    let list = after.split(END_TOKEN).next().unwrap_or(after).trim();
    if list.is_empty() {
        return Vec::new();
    }
    list.split(", ").map(|s| s.to_string()).collect()
}

/// Substring strictly between two sentinels, or None if either is missing
fn between<'a>(text: &'a str, start: &str, end: &str) -> Option<&'a str> {
    let start_idx = text.find(start)? + start.len();
    let end_idx = text[start_idx..].find(end)? + start_idx;
    Some(&text[start_idx..end_idx])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_parser() -> TranscriptParser {
        TranscriptParser::new(SurveyVariant::Base)
    }

    #[test]
    fn test_passage_between_sentinels() {
        let text = "intro Remember, short sentences and clear hints are key.  The sky is blue.  Question: why?";
        assert_eq!(extract_passage(text), Some("The sky is blue.".to_string()));
    }

    #[test]
    fn test_passage_missing_start_sentinel() {
        assert_eq!(extract_passage("no preamble here Question: why?"), None);
    }

    #[test]
    fn test_passage_missing_end_sentinel() {
        let text = "Remember, short sentences and clear hints are key. passage without question";
        assert_eq!(extract_passage(text), None);
    }

    #[test]
    fn test_passage_empty_between_adjacent_sentinels() {
        let text = "Remember, short sentences and clear hints are key.Question: why?";
        assert_eq!(extract_passage(text), Some(String::new()));
    }

    #[test]
    fn test_passage_sentinels_out_of_order() {
        let text = "Question: early? Remember, short sentences and clear hints are key. tail";
        assert_eq!(extract_passage(text), None);
    }

    #[test]
    fn test_question_and_options() {
        let text = "Remember, short sentences and clear hints are key. P Question: What color? Options: Red, Green, Blue</s>";
        let parsed = base_parser().parse(text);
        assert_eq!(parsed.question, Some("What color?".to_string()));
        assert_eq!(parsed.options, vec!["Red", "Green", "Blue"]);
    }

    #[test]
    fn test_options_without_end_token() {
        let text = "Question: q Options: A, B";
        let parsed = base_parser().parse(text);
        assert_eq!(parsed.options, vec!["A", "B"]);
    }

    #[test]
    fn test_turn_alternation() {
        let text = "Question: q Options: A</s>[/INST] one</s>[/INST] two</s>[/INST] three</s>";
        let parsed = base_parser().parse(text);
        let speakers: Vec<Speaker> = parsed.turns.iter().map(|t| t.speaker).collect();
        assert_eq!(
            speakers,
            vec![Speaker::Tutor, Speaker::Student, Speaker::Tutor]
        );
        assert_eq!(parsed.turns[2].text, "three");
    }

    #[test]
    fn test_blank_parts_are_not_turns() {
        let text = "Question: q Options: A</s>[/INST]   [/INST] hello</s>";
        let parsed = base_parser().parse(text);
        assert_eq!(parsed.turns.len(), 1);
        assert_eq!(parsed.turns[0].speaker, Speaker::Tutor);
        assert_eq!(parsed.turns[0].text, "hello");
    }

    #[test]
    fn test_correct_answer_extended_only() {
        let text = "Question: q Options: A, B</s> which is :'B', by thinking about it[/INST] hi</s>";
        let base = base_parser().parse(text);
        assert_eq!(base.correct_answer, None);

        let extended = TranscriptParser::new(SurveyVariant::Extended).parse(text);
        assert_eq!(extended.correct_answer, Some("B".to_string()));
    }

    #[test]
    fn test_correct_answer_absent_when_pattern_missing() {
        let parsed = TranscriptParser::new(SurveyVariant::Extended).parse("Question: q");
        assert_eq!(parsed.correct_answer, None);
    }

    #[test]
    fn test_malformed_input_degrades_quietly() {
        let parsed = base_parser().parse("");
        assert_eq!(parsed, ParsedTranscript::default());

        let parsed = base_parser().parse("completely unrelated text");
        assert_eq!(parsed.passage, None);
        assert_eq!(parsed.question, None);
        assert!(parsed.options.is_empty());
        // The whole blob is one non-question, non-options part
        assert_eq!(parsed.turns.len(), 1);
    }

    #[test]
    fn test_full_template() {
        let text = "...Remember, short sentences and clear hints are key. PASSAGE_TEXT Question: Q1 Options: A, B, C</s>[/INST] tutor turn 1</s>[/INST] student turn 1</s>";
        let parsed = base_parser().parse(text);
        assert_eq!(parsed.passage, Some("PASSAGE_TEXT".to_string()));
        assert_eq!(parsed.question, Some("Q1".to_string()));
        assert_eq!(parsed.options, vec!["A", "B", "C"]);
        assert_eq!(
            parsed.turns,
            vec![
                Turn {
                    speaker: Speaker::Tutor,
                    text: "tutor turn 1".to_string()
                },
                Turn {
                    speaker: Speaker::Student,
                    text: "student turn 1".to_string()
                },
            ]
        );
    }
}
