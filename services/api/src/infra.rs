use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use support_qa::config::ScoringConfig;
use support_qa::evaluations::{
    AgentId, CatalogError, EvaluationEvent, EvaluationId, EvaluationNotifier, EvaluationRecord,
    EvaluationRepository, MetricCatalog, NotifyError, OrganizationId, RepositoryError,
};
use tokio::sync::broadcast;
use tracing::info;

const EVENT_BUFFER: usize = 256;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryEvaluationRepository {
    records: Arc<Mutex<HashMap<EvaluationId, EvaluationRecord>>>,
}

impl EvaluationRepository for InMemoryEvaluationRepository {
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
        if guard.contains_key(&record.id) {
            guard.insert(record.id.clone(), record);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
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
        records.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        records.truncate(limit);
        Ok(records)
    }
}

/// Fans evaluation events out to in-process subscribers such as list refreshers.
#[derive(Clone)]
pub(crate) struct BroadcastNotifier {
    sender: broadcast::Sender<EvaluationEvent>,
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        let (sender, _) = broadcast::channel(EVENT_BUFFER);
        Self { sender }
    }
}

impl BroadcastNotifier {
    pub(crate) fn subscribe(&self) -> broadcast::Receiver<EvaluationEvent> {
        self.sender.subscribe()
    }
}

impl EvaluationNotifier for BroadcastNotifier {
    fn publish(&self, event: EvaluationEvent) -> Result<(), NotifyError> {
        // No subscribers is not an error; nobody is waiting to refresh.
        if self.sender.receiver_count() == 0 {
            return Ok(());
        }
        self.sender
            .send(event)
            .map(|_| ())
            .map_err(|err| NotifyError::Transport(err.to_string()))
    }
}

/// Log every event so operators can follow evaluation traffic.
pub(crate) fn spawn_event_logger(notifier: &BroadcastNotifier) {
    let mut receiver = notifier.subscribe();
    tokio::spawn(async move {
        loop {
            match receiver.recv().await {
                Ok(event) => info!(
                    evaluation_id = %event.evaluation_id().0,
                    ?event,
                    "evaluation event"
                ),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "evaluation event logger lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}

pub(crate) fn load_catalog(config: &ScoringConfig) -> Result<Arc<MetricCatalog>, CatalogError> {
    let catalog = match &config.catalog_path {
        Some(path) => {
            info!(path = %path.display(), "loading QA catalog override");
            MetricCatalog::from_json_path(path)?
        }
        None => MetricCatalog::standard(),
    };
    Ok(Arc::new(catalog))
}
