use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::Utc;
use serde_json::Value;

use crate::evaluations::catalog::MetricCatalog;
use crate::evaluations::domain::{
    AgentId, EvaluationId, EvaluationSubmission, InteractionChannel, InteractionRef,
    OrganizationId, ScoreSheet,
};
use crate::evaluations::repository::{
    EvaluationEvent, EvaluationNotifier, EvaluationRecord, EvaluationRepository, NotifyError,
    RepositoryError,
};
use crate::evaluations::scoring::{EvaluationResult, PerformanceCategory};
use crate::evaluations::{evaluation_router, QaEvaluationService};

pub(super) fn catalog() -> Arc<MetricCatalog> {
    Arc::new(MetricCatalog::standard())
}

/// Every catalog metric, hidden ones included, set to `grade`.
pub(super) fn uniform_sheet(grade: f64) -> ScoreSheet {
    MetricCatalog::standard()
        .metrics()
        .iter()
        .map(|metric| (metric.key.clone(), grade))
        .collect()
}

/// Visible metrics only, leaving hidden ones to their fixed grade.
pub(super) fn visible_sheet(grade: f64) -> ScoreSheet {
    MetricCatalog::standard()
        .visible_metrics()
        .map(|metric| (metric.key.clone(), grade))
        .collect()
}

pub(super) fn organization() -> OrganizationId {
    OrganizationId("org-northwind".to_string())
}

pub(super) fn agent() -> AgentId {
    AgentId("agent-042".to_string())
}

pub(super) fn submission(sheet: ScoreSheet) -> EvaluationSubmission {
    EvaluationSubmission {
        organization_id: organization(),
        agent_id: agent(),
        evaluator: "qa-lead@northwind.example".to_string(),
        interaction: InteractionRef {
            channel: InteractionChannel::Chat,
            reference: "CHAT-88120".to_string(),
        },
        metric_scores: sheet,
        remarks: "Followed the refund macro".to_string(),
        coaching_area: Some("Empathy statements".to_string()),
    }
}

/// Stored record carrying legacy 0-100 percentages instead of 1-10 grades.
pub(super) fn legacy_record(id: &str) -> EvaluationRecord {
    let metric_scores: ScoreSheet = MetricCatalog::standard()
        .metrics()
        .iter()
        .map(|metric| (metric.key.clone(), 85.0))
        .collect();
    let now = Utc::now();
    EvaluationRecord {
        id: EvaluationId(id.to_string()),
        organization_id: organization(),
        agent_id: agent(),
        evaluator: "legacy-import".to_string(),
        interaction: InteractionRef {
            channel: InteractionChannel::Ticket,
            reference: "TCK-1001".to_string(),
        },
        metric_scores,
        result: EvaluationResult {
            total_score: 85.0,
            performance_category: PerformanceCategory::Excellent,
        },
        remarks: String::new(),
        coaching_area: None,
        revision: 1,
        created_at: now,
        updated_at: now,
    }
}

pub(super) fn build_service() -> (
    QaEvaluationService<MemoryRepository, MemoryNotifier>,
    Arc<MemoryRepository>,
    Arc<MemoryNotifier>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let notifier = Arc::new(MemoryNotifier::default());
    let service = QaEvaluationService::new(repository.clone(), notifier.clone(), catalog());
    (service, repository, notifier)
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<HashMap<EvaluationId, EvaluationRecord>>>,
}

impl MemoryRepository {
    pub(super) fn seed(&self, record: EvaluationRecord) {
        self.records
            .lock()
            .expect("repository mutex poisoned")
            .insert(record.id.clone(), record);
    }

    pub(super) fn len(&self) -> usize {
        self.records.lock().expect("repository mutex poisoned").len()
    }
}

impl EvaluationRepository for MemoryRepository {
    fn insert(&self, record: EvaluationRecord) -> Result<EvaluationRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: EvaluationRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard.insert(record.id.clone(), record);
        Ok(())
    }

    fn fetch(&self, id: &EvaluationId) -> Result<Option<EvaluationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn for_agent(
        &self,
        organization_id: &OrganizationId,
        agent_id: &AgentId,
        limit: usize,
    ) -> Result<Vec<EvaluationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut records: Vec<EvaluationRecord> = guard
            .values()
            .filter(|record| {
                &record.organization_id == organization_id && &record.agent_id == agent_id
            })
            .cloned()
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        records.truncate(limit);
        Ok(records)
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryNotifier {
    events: Arc<Mutex<Vec<EvaluationEvent>>>,
}

impl MemoryNotifier {
    pub(super) fn events(&self) -> Vec<EvaluationEvent> {
        self.events.lock().expect("notifier mutex poisoned").clone()
    }
}

impl EvaluationNotifier for MemoryNotifier {
    fn publish(&self, event: EvaluationEvent) -> Result<(), NotifyError> {
        self.events
            .lock()
            .expect("notifier mutex poisoned")
            .push(event);
        Ok(())
    }
}

pub(super) struct OfflineNotifier;

impl EvaluationNotifier for OfflineNotifier {
    fn publish(&self, _event: EvaluationEvent) -> Result<(), NotifyError> {
        Err(NotifyError::Transport("socket closed".to_string()))
    }
}

pub(super) struct ConflictRepository;

impl EvaluationRepository for ConflictRepository {
    fn insert(&self, _record: EvaluationRecord) -> Result<EvaluationRecord, RepositoryError> {
        Err(RepositoryError::Conflict)
    }

    fn update(&self, _record: EvaluationRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("read only".to_string()))
    }

    fn fetch(&self, _id: &EvaluationId) -> Result<Option<EvaluationRecord>, RepositoryError> {
        Ok(None)
    }

    fn for_agent(
        &self,
        _organization_id: &OrganizationId,
        _agent_id: &AgentId,
        _limit: usize,
    ) -> Result<Vec<EvaluationRecord>, RepositoryError> {
        Ok(Vec::new())
    }
}

pub(super) struct UnavailableRepository;

impl EvaluationRepository for UnavailableRepository {
    fn insert(&self, _record: EvaluationRecord) -> Result<EvaluationRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _record: EvaluationRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &EvaluationId) -> Result<Option<EvaluationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn for_agent(
        &self,
        _organization_id: &OrganizationId,
        _agent_id: &AgentId,
        _limit: usize,
    ) -> Result<Vec<EvaluationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn router_with_service(
    service: QaEvaluationService<MemoryRepository, MemoryNotifier>,
) -> axum::Router {
    evaluation_router(Arc::new(service))
}
