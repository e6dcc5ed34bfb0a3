//! Turns a free-text model reply into a validated `Feedback`.
//!
//! Models wrap JSON in chatter and drift on key names, so parsing is two-staged:
//! cut the outermost `{ ... }` region, then resolve each canonical field
//! through an ordered alias list before validating.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::evaluation::models::{clamp_score, clamp_score_10, meets_resolution_ceiling, Feedback};

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("reply contains no JSON object")]
    NoJsonObject,

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("missing or non-numeric field '{0}'")]
    MissingScore(&'static str),

    #[error("missing or empty summary")]
    MissingSummary,
}

/// A canonical field and the keys accepted for it, highest priority first.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: &'static str,
    pub aliases: &'static [&'static str],
}

pub const EMPATHY: FieldRule = FieldRule {
    field: "empathy",
    aliases: &["empathy", "empathyScore", "empathy_score"],
};

pub const CURIOSITY: FieldRule = FieldRule {
    field: "curiosity",
    aliases: &["curiosity", "curiosityScore", "curiosity_score"],
};

pub const STRUCTURE: FieldRule = FieldRule {
    field: "structure",
    aliases: &["structure", "structureScore", "structure_score"],
};

pub const SATISFACTION: FieldRule = FieldRule {
    field: "satisfaction",
    aliases: &[
        "satisfaction",
        "studentSatisfaction",
        "satisfactionScore",
        "student_satisfaction",
        "satisfaction_score",
    ],
};

pub const RESOLVED: FieldRule = FieldRule {
    field: "resolved",
    aliases: &["resolved", "completed", "done", "closure"],
};

pub const SUMMARY: FieldRule = FieldRule {
    field: "summary",
    aliases: &["summary"],
};

impl FieldRule {
    /// First alias present with a non-null value.
    pub fn resolve<'a>(&self, object: &'a Map<String, Value>) -> Option<&'a Value> {
        self.aliases
            .iter()
            .filter_map(|key| object.get(*key))
            .find(|value| !value.is_null())
    }
}

/// Greedy slice from the first `{` to the last `}`.
pub fn extract_json_region(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Parses and validates a model reply.
///
/// Rubric scores and a non-empty summary are mandatory. Satisfaction falls back to
/// `mean(rubric) × 2`; `resolved` is the model's `true` or the ceiling rule.
pub fn parse_feedback_reply(reply: &str) -> Result<Feedback, ExtractionError> {
    let region = extract_json_region(reply).ok_or(ExtractionError::NoJsonObject)?;
    let object: Map<String, Value> = serde_json::from_str(region)?;

    let empathy = clamp_score(required_number(&object, &EMPATHY)?);
    let curiosity = clamp_score(required_number(&object, &CURIOSITY)?);
    let structure = clamp_score(required_number(&object, &STRUCTURE)?);

    let summary = SUMMARY
        .resolve(&object)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(ExtractionError::MissingSummary)?
        .to_string();

    let satisfaction = clamp_score_10(
        SATISFACTION
            .resolve(&object)
            .and_then(as_number)
            .unwrap_or_else(|| {
                (empathy as f64 + curiosity as f64 + structure as f64) / 3.0 * 2.0
            }),
    );

    let model_resolved = RESOLVED.resolve(&object).and_then(as_flag).unwrap_or(false);
    let resolved =
        model_resolved || meets_resolution_ceiling(empathy, curiosity, structure, satisfaction);

    Ok(Feedback {
        empathy,
        curiosity,
        structure,
        satisfaction,
        resolved,
        summary,
    })
}

fn required_number(object: &Map<String, Value>, rule: &FieldRule) -> Result<f64, ExtractionError> {
    rule.resolve(object)
        .and_then(as_number)
        .ok_or(ExtractionError::MissingScore(rule.field))
}

/// JSON numbers, or strings holding one (`"4"`, `" 3.5 "`).
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

/// Booleans, or the strings "true" / "false" in any case.
fn as_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_region_with_surrounding_chatter() {
        let text = r#"Sure! {"a": {"b": 1}} Hope that helps."#;
        assert_eq!(extract_json_region(text), Some(r#"{"a": {"b": 1}}"#));
    }

    #[test]
    fn test_extract_region_missing_or_reversed() {
        assert_eq!(extract_json_region("no json here"), None);
        assert_eq!(extract_json_region("} backwards {"), None);
        assert_eq!(extract_json_region("{ unterminated"), None);
    }

    #[test]
    fn test_full_reply_parses_unchanged() {
        let reply = "Sure! {\"empathy\":5,\"curiosity\":5,\"structure\":5,\"satisfaction\":10,\"resolved\":true,\"summary\":\"Great job.\"} Hope that helps.";
        let feedback = parse_feedback_reply(reply).unwrap();
        assert_eq!(
            feedback,
            Feedback {
                empathy: 5,
                curiosity: 5,
                structure: 5,
                satisfaction: 10,
                resolved: true,
                summary: "Great job.".to_string(),
            }
        );
    }

    #[test]
    fn test_missing_structure_and_summary_is_rejected() {
        let err = parse_feedback_reply(r#"{"empathy":5,"curiosity":5}"#).unwrap_err();
        assert!(matches!(err, ExtractionError::MissingScore("structure")), "got {err:?}");
    }

    #[test]
    fn test_missing_summary_is_rejected() {
        let err =
            parse_feedback_reply(r#"{"empathy":3,"curiosity":3,"structure":3}"#).unwrap_err();
        assert!(matches!(err, ExtractionError::MissingSummary));
    }

    #[test]
    fn test_blank_summary_is_rejected() {
        let err = parse_feedback_reply(
            r#"{"empathy":3,"curiosity":3,"structure":3,"summary":"   "}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ExtractionError::MissingSummary));
    }

    #[test]
    fn test_no_json_is_rejected() {
        let err = parse_feedback_reply("I think they did fine.").unwrap_err();
        assert!(matches!(err, ExtractionError::NoJsonObject));
    }

    #[test]
    fn test_broken_json_is_rejected() {
        let err = parse_feedback_reply("{empathy: five}").unwrap_err();
        assert!(matches!(err, ExtractionError::Parse(_)));
    }

    #[test]
    fn test_aliases_are_resolved() {
        let reply = r#"{
            "empathyScore": 4,
            "curiosityScore": 3,
            "structureScore": 2,
            "studentSatisfaction": 7,
            "completed": false,
            "summary": "  Solid start.  "
        }"#;
        let feedback = parse_feedback_reply(reply).unwrap();
        assert_eq!(feedback.empathy, 4);
        assert_eq!(feedback.curiosity, 3);
        assert_eq!(feedback.structure, 2);
        assert_eq!(feedback.satisfaction, 7);
        assert!(!feedback.resolved);
        assert_eq!(feedback.summary, "Solid start.");
    }

    #[test]
    fn test_canonical_key_wins_over_alias() {
        let reply = r#"{"empathy":2,"empathyScore":5,"curiosity":1,"structure":1,"summary":"x"}"#;
        assert_eq!(parse_feedback_reply(reply).unwrap().empathy, 2);
    }

    #[test]
    fn test_null_canonical_key_falls_through_to_alias() {
        let reply = r#"{"empathy":null,"empathyScore":4,"curiosity":1,"structure":1,"summary":"x"}"#;
        assert_eq!(parse_feedback_reply(reply).unwrap().empathy, 4);
    }

    #[test]
    fn test_out_of_range_values_are_clamped_and_rounded() {
        let reply = r#"{"empathy":9,"curiosity":-2,"structure":3.6,"satisfaction":14.2,"summary":"x"}"#;
        let feedback = parse_feedback_reply(reply).unwrap();
        assert_eq!(feedback.empathy, 5);
        assert_eq!(feedback.curiosity, 1);
        assert_eq!(feedback.structure, 4);
        assert_eq!(feedback.satisfaction, 10);
    }

    #[test]
    fn test_numeric_strings_are_accepted() {
        let reply = r#"{"empathy":"4","curiosity":" 3 ","structure":"2","summary":"x"}"#;
        let feedback = parse_feedback_reply(reply).unwrap();
        assert_eq!((feedback.empathy, feedback.curiosity, feedback.structure), (4, 3, 2));
    }

    #[test]
    fn test_non_numeric_score_is_rejected() {
        let reply = r#"{"empathy":"high","curiosity":3,"structure":2,"summary":"x"}"#;
        let err = parse_feedback_reply(reply).unwrap_err();
        assert!(matches!(err, ExtractionError::MissingScore("empathy")));
    }

    #[test]
    fn test_satisfaction_fallback_is_mean_times_two() {
        // mean(4, 3, 2) × 2 = 6
        let reply = r#"{"empathy":4,"curiosity":3,"structure":2,"summary":"x"}"#;
        assert_eq!(parse_feedback_reply(reply).unwrap().satisfaction, 6);

        let reply = r#"{"empathy":4,"curiosity":3,"structure":2,"satisfaction":"lots","summary":"x"}"#;
        assert_eq!(parse_feedback_reply(reply).unwrap().satisfaction, 6);
    }

    #[test]
    fn test_resolved_string_forms() {
        let reply = r#"{"empathy":2,"curiosity":2,"structure":2,"resolved":" TRUE ","summary":"x"}"#;
        assert!(parse_feedback_reply(reply).unwrap().resolved);

        let reply = r#"{"empathy":2,"curiosity":2,"structure":2,"resolved":"False","summary":"x"}"#;
        assert!(!parse_feedback_reply(reply).unwrap().resolved);
    }

    #[test]
    fn test_absent_resolved_uses_ceiling_rule() {
        let at_ceiling = r#"{"empathy":5,"curiosity":5,"structure":5,"satisfaction":9,"summary":"x"}"#;
        assert!(parse_feedback_reply(at_ceiling).unwrap().resolved);

        let below = r#"{"empathy":4,"curiosity":5,"structure":5,"satisfaction":10,"summary":"x"}"#;
        assert!(!parse_feedback_reply(below).unwrap().resolved);
    }

    #[test]
    fn test_greedy_region_spanning_two_objects_is_rejected() {
        // The greedy region here is `{"a":1}, {"b":2}` which is invalid JSON.
        let err = parse_feedback_reply(r#"[{"a":1}, {"b":2}]"#).unwrap_err();
        assert!(matches!(err, ExtractionError::Parse(_)));
    }
}
