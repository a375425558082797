use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    AgentId, EvaluationId, EvaluationPayload, InteractionRef, OrganizationId, ScoreSheet,
};
use super::scoring::{EvaluationResult, PerformanceCategory};

/// Repository record pairing the graded sheet with the result derived from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub id: EvaluationId,
    pub organization_id: OrganizationId,
    pub agent_id: AgentId,
    pub evaluator: String,
    pub interaction: InteractionRef,
    pub metric_scores: ScoreSheet,
    pub result: EvaluationResult,
    pub remarks: String,
    pub coaching_area: Option<String>,
    pub revision: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EvaluationRecord {
    pub fn payload(&self) -> EvaluationPayload {
        EvaluationPayload {
            metric_scores: self.metric_scores.clone(),
            total_score: self.result.total_score,
            performance_category: self.result.performance_category,
            remarks: self.remarks.clone(),
            coaching_area: self.coaching_area.clone(),
        }
    }

    pub fn status_view(&self) -> EvaluationStatusView {
        EvaluationStatusView {
            evaluation_id: self.id.clone(),
            agent_id: self.agent_id.clone(),
            channel: self.interaction.channel.label(),
            total_score: self.result.total_score,
            performance_category: self.result.performance_category,
            coaching_required: self.result.performance_category.requires_coaching(),
            revision: self.revision,
            updated_at: self.updated_at,
        }
    }
}

/// Storage abstraction so the service can be exercised in isolation.
pub trait EvaluationRepository: Send + Sync {
    fn insert(&self, record: EvaluationRecord) -> Result<EvaluationRecord, RepositoryError>;
    fn update(&self, record: EvaluationRecord) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &EvaluationId) -> Result<Option<EvaluationRecord>, RepositoryError>;
    /// Most recent evaluations for an agent, newest first.
    fn for_agent(
        &self,
        organization_id: &OrganizationId,
        agent_id: &AgentId,
        limit: usize,
    ) -> Result<Vec<EvaluationRecord>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Outbound hook so list views and coaching queues can refresh.
pub trait EvaluationNotifier: Send + Sync {
    fn publish(&self, event: EvaluationEvent) -> Result<(), NotifyError>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EvaluationEvent {
    Recorded {
        evaluation_id: EvaluationId,
        organization_id: OrganizationId,
        agent_id: AgentId,
        performance_category: PerformanceCategory,
    },
    Revised {
        evaluation_id: EvaluationId,
        organization_id: OrganizationId,
        agent_id: AgentId,
        revision: u32,
        performance_category: PerformanceCategory,
    },
    CoachingRequired {
        evaluation_id: EvaluationId,
        organization_id: OrganizationId,
        agent_id: AgentId,
        coaching_area: Option<String>,
        performance_category: PerformanceCategory,
    },
}

impl EvaluationEvent {
    pub fn evaluation_id(&self) -> &EvaluationId {
        match self {
            EvaluationEvent::Recorded { evaluation_id, .. }
            | EvaluationEvent::Revised { evaluation_id, .. }
            | EvaluationEvent::CoachingRequired { evaluation_id, .. } => evaluation_id,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}

/// Sanitized representation of an evaluation for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationStatusView {
    pub evaluation_id: EvaluationId,
    pub agent_id: AgentId,
    pub channel: &'static str,
    pub total_score: f64,
    pub performance_category: PerformanceCategory,
    pub coaching_required: bool,
    pub revision: u32,
    pub updated_at: DateTime<Utc>,
}
