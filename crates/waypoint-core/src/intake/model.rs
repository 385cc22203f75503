//! Intake questionnaire models.
//!
//! The intake asks four qualification questions. The answers are sent to the
//! recommender, and the answers plus the recommendation are kept on the session
//! record for later inspection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Citizenship status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum Nationality {
    /// EU/EEA/Swiss citizen
    Eu,
    NonEu,
}

/// Where the user is right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum EntryContext {
    /// Not arrived in the country yet
    FirstEntry,
    InCountry,
}

/// Reason for moving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum Purpose {
    Employment,
    /// Starting a business or freelancing
    Business,
    Family,
    Study,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum City {
    Bratislava,
    Other,
}

/// Answers to the intake questionnaire. Unanswered questions are `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntakeAnswers {
    pub nationality: Option<Nationality>,
    pub entry_context: Option<EntryContext>,
    pub purpose: Option<Purpose>,
    pub city: Option<City>,
}

impl IntakeAnswers {
    /// True once every question has an answer.
    pub fn is_complete(&self) -> bool {
        self.nationality.is_some()
            && self.entry_context.is_some()
            && self.purpose.is_some()
            && self.city.is_some()
    }
}

/// How sure the recommender is about its suggestion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
    #[default]
    #[serde(other)]
    Unknown,
}

/// A suggested flow for a set of intake answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub flow_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default)]
    pub confidence: Confidence,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_count: Option<u32>,
}

/// Outcome of the intake questionnaire, kept on the session for auditing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntakeRecord {
    pub answers: IntakeAnswers,
    #[serde(default)]
    pub recommendation: Option<Recommendation>,
    /// Whether the user went with the recommendation.
    pub accepted: bool,
    pub timestamp: DateTime<Utc>,
}

impl IntakeRecord {
    /// The user accepted the recommendation.
    pub fn accepted(answers: IntakeAnswers, recommendation: Recommendation) -> Self {
        Self {
            answers,
            recommendation: Some(recommendation),
            accepted: true,
            timestamp: Utc::now(),
        }
    }

    /// The user asked to see all options instead.
    pub fn declined(answers: IntakeAnswers, recommendation: Option<Recommendation>) -> Self {
        Self {
            answers,
            recommendation,
            accepted: false,
            timestamp: Utc::now(),
        }
    }

    /// Flow to start when the recommendation was accepted.
    pub fn accepted_flow_id(&self) -> Option<&str> {
        if !self.accepted {
            return None;
        }
        self.recommendation
            .as_ref()
            .map(|recommendation| recommendation.flow_id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn recommendation() -> Recommendation {
        Recommendation {
            flow_id: "sk_non_eu_employee".to_string(),
            title: "Non-EU employee".to_string(),
            reason: None,
            confidence: Confidence::High,
            step_count: Some(7),
        }
    }

    #[test]
    fn test_answers_wire_format() {
        let answers = IntakeAnswers {
            nationality: Some(Nationality::NonEu),
            entry_context: Some(EntryContext::FirstEntry),
            purpose: Some(Purpose::Employment),
            city: Some(City::Bratislava),
        };
        let json = serde_json::to_value(answers).unwrap();
        assert_eq!(json["nationality"], "NON_EU");
        assert_eq!(json["entry_context"], "FIRST_ENTRY");
        assert!(answers.is_complete());
    }

    #[test]
    fn test_parse_answer_values() {
        assert_eq!(Nationality::from_str("eu").unwrap(), Nationality::Eu);
        assert_eq!(EntryContext::from_str("IN_COUNTRY").unwrap(), EntryContext::InCountry);
        assert!(Purpose::from_str("TOURISM").is_err());
    }

    #[test]
    fn test_unknown_confidence_is_tolerated() {
        let rec: Recommendation =
            serde_json::from_str(r#"{"flow_id": "f", "confidence": "certain"}"#).unwrap();
        assert_eq!(rec.confidence, Confidence::Unknown);
    }

    #[test]
    fn test_accepted_flow_id() {
        let answers = IntakeAnswers::default();
        assert_eq!(
            IntakeRecord::accepted(answers, recommendation()).accepted_flow_id(),
            Some("sk_non_eu_employee")
        );
        assert_eq!(
            IntakeRecord::declined(answers, Some(recommendation())).accepted_flow_id(),
            None
        );
    }
}
