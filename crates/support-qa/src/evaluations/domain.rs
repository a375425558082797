use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::scoring::PerformanceCategory;

/// Tenant the evaluated agent belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrganizationId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(pub String);

/// Identifier wrapper for persisted evaluations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EvaluationId(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionChannel {
    Chat,
    Email,
    Ticket,
}

impl InteractionChannel {
    pub const fn label(self) -> &'static str {
        match self {
            InteractionChannel::Chat => "chat",
            InteractionChannel::Email => "email",
            InteractionChannel::Ticket => "ticket",
        }
    }
}

/// The support interaction being graded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionRef {
    pub channel: InteractionChannel,
    pub reference: String,
}

/// Raw per-metric grades keyed by metric key.
///
/// Holds grades exactly as entered. The service clamps a copy into `[1, 10]` when persisting,
/// so the evaluator's own sheet survives a failed submission untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreSheet(BTreeMap<String, f64>);

impl ScoreSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, raw: f64) -> Option<f64> {
        self.0.insert(key.into(), raw)
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.0.get(key).copied()
    }

    pub fn remove(&mut self, key: &str) -> Option<f64> {
        self.0.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, f64)> {
        self.0.iter().map(|(key, value)| (key, *value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for ScoreSheet {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value))
                .collect(),
        )
    }
}

/// Evaluator-submitted grading of one interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSubmission {
    pub organization_id: OrganizationId,
    pub agent_id: AgentId,
    pub evaluator: String,
    pub interaction: InteractionRef,
    pub metric_scores: ScoreSheet,
    #[serde(default)]
    pub remarks: String,
    #[serde(default)]
    pub coaching_area: Option<String>,
}

/// Replacement grades and notes for an existing evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRevision {
    pub metric_scores: ScoreSheet,
    #[serde(default)]
    pub remarks: Option<String>,
    #[serde(default)]
    pub coaching_area: Option<String>,
}

/// Shape handed to the external persistence API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationPayload {
    pub metric_scores: ScoreSheet,
    pub total_score: f64,
    pub performance_category: PerformanceCategory,
    pub remarks: String,
    pub coaching_area: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_sheet_serializes_as_plain_map() {
        let sheet: ScoreSheet = [("accuracy", 8.0), ("greeting", 10.0)].into_iter().collect();
        let json = serde_json::to_value(&sheet).expect("serializes");
        assert_eq!(json, serde_json::json!({ "accuracy": 8.0, "greeting": 10.0 }));
    }

    #[test]
    fn payload_uses_collaborator_field_names() {
        let payload = EvaluationPayload {
            metric_scores: ScoreSheet::new(),
            total_score: 64.5,
            performance_category: PerformanceCategory::Good,
            remarks: "Solid close".to_string(),
            coaching_area: Some("Empathy".to_string()),
        };
        let json = serde_json::to_value(&payload).expect("serializes");
        assert_eq!(json["metricScores"], serde_json::json!({}));
        assert_eq!(json["totalScore"], 64.5);
        assert_eq!(json["performanceCategory"], "Good");
        assert_eq!(json["coachingArea"], "Empathy");
    }

    #[test]
    fn submission_defaults_optional_notes() {
        let submission: EvaluationSubmission = serde_json::from_value(serde_json::json!({
            "organization_id": "org-1",
            "agent_id": "agent-7",
            "evaluator": "qa-lead",
            "interaction": { "channel": "email", "reference": "T-1001" },
            "metric_scores": { "accuracy": 9 }
        }))
        .expect("submission parses");
        assert_eq!(submission.remarks, "");
        assert!(submission.coaching_area.is_none());
        assert_eq!(submission.interaction.channel, InteractionChannel::Email);
        assert_eq!(submission.metric_scores.get("accuracy"), Some(9.0));
    }
}
