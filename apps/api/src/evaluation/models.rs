use serde::{Deserialize, Serialize};

/// Who said a turn. The wire names match the chat front end:
/// the trainee is `"user"`, the simulated student is `"assistant"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "user", alias = "coach")]
    Coach,
    #[serde(rename = "assistant", alias = "persona", alias = "ai")]
    Persona,
}

/// One utterance in a practice conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

#[cfg(test)]
impl Turn {
    pub fn coach(content: impl Into<String>) -> Self {
        Self {
            role: Role::Coach,
            content: content.into(),
        }
    }

    pub fn persona(content: impl Into<String>) -> Self {
        Self {
            role: Role::Persona,
            content: content.into(),
        }
    }
}

/// Scored assessment of one transcript.
///
/// `empathy`, `curiosity`, `structure` are always in 1..=5 and
/// `satisfaction` in 1..=10. Scorers pass every number through
/// [`clamp_score`] / [`clamp_score_10`] before building one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub empathy: u8,
    pub curiosity: u8,
    pub structure: u8,
    pub satisfaction: u8,
    pub resolved: bool,
    pub summary: String,
}

impl Feedback {
    /// Checks the rubric ranges for feedback that did not come from a scorer.
    pub fn validate(&self) -> Result<(), String> {
        let rubric = [
            ("empathy", self.empathy),
            ("curiosity", self.curiosity),
            ("structure", self.structure),
        ];
        for (name, value) in rubric {
            if !(1..=5).contains(&value) {
                return Err(format!("feedback.{name} must be between 1 and 5, got {value}"));
            }
        }
        if !(1..=10).contains(&self.satisfaction) {
            return Err(format!(
                "feedback.satisfaction must be between 1 and 10, got {}",
                self.satisfaction
            ));
        }
        if self.summary.trim().is_empty() {
            return Err("feedback.summary is required".to_string());
        }
        Ok(())
    }
}

/// Rounds and clamps to the 1–5 rubric scale.
pub fn clamp_score(x: f64) -> u8 {
    clamp_to(x, 5.0)
}

/// Rounds and clamps to the 1–10 satisfaction scale.
pub fn clamp_score_10(x: f64) -> u8 {
    clamp_to(x, 10.0)
}

fn clamp_to(x: f64, max: f64) -> u8 {
    if x.is_nan() {
        return 1;
    }
    x.round().clamp(1.0, max) as u8
}

/// Resolution is a ceiling condition: every rubric score maxed and satisfaction ≥ 9.
pub fn meets_resolution_ceiling(empathy: u8, curiosity: u8, structure: u8, satisfaction: u8) -> bool {
    empathy >= 5 && curiosity >= 5 && structure >= 5 && satisfaction >= 9
}

pub fn coach_turn_count(transcript: &[Turn]) -> usize {
    transcript.iter().filter(|t| t.role == Role::Coach).count()
}

/// All coach turns joined by a single space, in conversation order.
pub fn coach_text(transcript: &[Turn]) -> String {
    transcript
        .iter()
        .filter(|t| t.role == Role::Coach)
        .map(|t| t.content.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feedback(empathy: u8, satisfaction: u8, summary: &str) -> Feedback {
        Feedback {
            empathy,
            curiosity: 3,
            structure: 3,
            satisfaction,
            resolved: false,
            summary: summary.to_string(),
        }
    }

    #[test]
    fn test_validate_accepts_bounds() {
        assert!(feedback(1, 1, "ok").validate().is_ok());
        assert!(feedback(5, 10, "ok").validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range_and_blank_summary() {
        assert_eq!(
            feedback(200, 5, "ok").validate(),
            Err("feedback.empathy must be between 1 and 5, got 200".to_string())
        );
        assert!(feedback(0, 5, "ok").validate().is_err());
        assert!(feedback(3, 0, "ok").validate().is_err());
        assert!(feedback(3, 11, "ok").validate().is_err());
        assert_eq!(
            feedback(3, 5, "  ").validate(),
            Err("feedback.summary is required".to_string())
        );
    }

    #[test]
    fn test_clamp_score_rounds_half_up() {
        assert_eq!(clamp_score(2.5), 3);
        assert_eq!(clamp_score(2.49), 2);
        assert_eq!(clamp_score(2.7), 3);
    }

    #[test]
    fn test_clamp_score_bounds() {
        assert_eq!(clamp_score(-3.0), 1);
        assert_eq!(clamp_score(0.0), 1);
        assert_eq!(clamp_score(17.0), 5);
        assert_eq!(clamp_score(f64::INFINITY), 5);
        assert_eq!(clamp_score(f64::NAN), 1);
    }

    #[test]
    fn test_clamp_score_10_bounds() {
        assert_eq!(clamp_score_10(3.27), 3);
        assert_eq!(clamp_score_10(9.5), 10);
        assert_eq!(clamp_score_10(42.0), 10);
        assert_eq!(clamp_score_10(0.2), 1);
    }

    #[test]
    fn test_resolution_ceiling() {
        assert!(meets_resolution_ceiling(5, 5, 5, 9));
        assert!(meets_resolution_ceiling(5, 5, 5, 10));
        assert!(!meets_resolution_ceiling(4, 5, 5, 10));
        assert!(!meets_resolution_ceiling(5, 5, 5, 8));
    }

    #[test]
    fn test_role_wire_names() {
        let turn: Turn = serde_json::from_str(r#"{"role":"user","content":"hi"}"#).unwrap();
        assert_eq!(turn.role, Role::Coach);
        let turn: Turn = serde_json::from_str(r#"{"role":"assistant","content":"hey"}"#).unwrap();
        assert_eq!(turn.role, Role::Persona);
        let turn: Turn = serde_json::from_str(r#"{"role":"ai","content":"hey"}"#).unwrap();
        assert_eq!(turn.role, Role::Persona);
        assert_eq!(
            serde_json::to_string(&Turn::coach("x")).unwrap(),
            r#"{"role":"user","content":"x"}"#
        );
    }

    #[test]
    fn test_coach_text_skips_persona_turns() {
        let transcript = vec![
            Turn::persona("I failed."),
            Turn::coach("That sounds hard."),
            Turn::persona("It is."),
            Turn::coach("What happened?"),
        ];
        assert_eq!(coach_text(&transcript), "That sounds hard. What happened?");
        assert_eq!(coach_turn_count(&transcript), 2);
    }

    #[test]
    fn test_feedback_serializes_flat() {
        let feedback = Feedback {
            empathy: 3,
            curiosity: 2,
            structure: 2,
            satisfaction: 3,
            resolved: false,
            summary: "ok".to_string(),
        };
        let value = serde_json::to_value(&feedback).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "empathy": 3, "curiosity": 2, "structure": 2,
                "satisfaction": 3, "resolved": false, "summary": "ok"
            })
        );
    }
}
