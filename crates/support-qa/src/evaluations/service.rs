use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use super::catalog::MetricCatalog;
use super::domain::{
    AgentId, EvaluationId, EvaluationRevision, EvaluationSubmission, OrganizationId, ScoreSheet,
};
use super::repository::{
    EvaluationEvent, EvaluationNotifier, EvaluationRecord, EvaluationRepository, RepositoryError,
};
use super::scoring::{
    clamp_score_sheet, normalize_legacy_score_sheet, round_to_cents, PerformanceCategory,
    ScoreBreakdown, Scorer,
};

const DEFAULT_SCORECARD_WINDOW: usize = 20;

/// Service composing the scorer, repository, and notifier.
pub struct QaEvaluationService<R, N> {
    scorer: Arc<Scorer>,
    repository: Arc<R>,
    notifier: Arc<N>,
    scorecard_window: usize,
}

static EVALUATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_evaluation_id() -> EvaluationId {
    let id = EVALUATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    EvaluationId(format!("qa-{id:06}"))
}

impl<R, N> QaEvaluationService<R, N>
where
    R: EvaluationRepository + 'static,
    N: EvaluationNotifier + 'static,
{
    pub fn new(repository: Arc<R>, notifier: Arc<N>, catalog: Arc<MetricCatalog>) -> Self {
        Self {
            scorer: Arc::new(Scorer::new(catalog)),
            repository,
            notifier,
            scorecard_window: DEFAULT_SCORECARD_WINDOW,
        }
    }

    pub fn with_scorecard_window(mut self, window: usize) -> Self {
        self.scorecard_window = window.max(1);
        self
    }

    pub fn catalog(&self) -> &MetricCatalog {
        self.scorer.catalog()
    }

    pub fn scorecard_window(&self) -> usize {
        self.scorecard_window
    }

    /// Live feedback while a sheet is being filled in. Never fails and never persists.
    pub fn preview(&self, sheet: &ScoreSheet) -> ScoreBreakdown {
        self.scorer.breakdown(sheet)
    }

    /// Grade a new interaction and persist the outcome.
    ///
    /// Grades are persisted clamped to `[1, 10]`. Persistence is attempted once. On failure
    /// nothing is stored and the caller still owns its copy of the sheet for a retry.
    pub fn submit(
        &self,
        submission: EvaluationSubmission,
    ) -> Result<EvaluationRecord, EvaluationServiceError> {
        self.validate(&submission.metric_scores)?;

        let metric_scores = clamp_score_sheet(&submission.metric_scores);
        let result = self.scorer.compute_result(&metric_scores);
        let now = Utc::now();
        let record = EvaluationRecord {
            id: next_evaluation_id(),
            organization_id: submission.organization_id,
            agent_id: submission.agent_id,
            evaluator: submission.evaluator,
            interaction: submission.interaction,
            metric_scores,
            result,
            remarks: submission.remarks,
            coaching_area: submission.coaching_area,
            revision: 1,
            created_at: now,
            updated_at: now,
        };

        let stored = self.repository.insert(record)?;
        info!(
            evaluation_id = %stored.id.0,
            agent_id = %stored.agent_id.0,
            total_score = stored.result.total_score,
            category = %stored.result.performance_category,
            "evaluation recorded"
        );

        self.notify(EvaluationEvent::Recorded {
            evaluation_id: stored.id.clone(),
            organization_id: stored.organization_id.clone(),
            agent_id: stored.agent_id.clone(),
            performance_category: stored.result.performance_category,
        });
        self.notify_coaching(&stored);

        Ok(stored)
    }

    /// Replace the grades of an existing evaluation and recompute its result.
    pub fn revise(
        &self,
        evaluation_id: &EvaluationId,
        revision: EvaluationRevision,
    ) -> Result<EvaluationRecord, EvaluationServiceError> {
        self.validate(&revision.metric_scores)?;

        let mut record = self
            .repository
            .fetch(evaluation_id)?
            .ok_or(RepositoryError::NotFound)?;
        let previous = record.result.performance_category;

        record.metric_scores = clamp_score_sheet(&revision.metric_scores);
        record.result = self.scorer.compute_result(&record.metric_scores);
        if let Some(remarks) = revision.remarks {
            record.remarks = remarks;
        }
        if revision.coaching_area.is_some() {
            record.coaching_area = revision.coaching_area;
        }
        record.revision += 1;
        record.updated_at = Utc::now();

        self.repository.update(record.clone())?;
        info!(
            evaluation_id = %record.id.0,
            revision = record.revision,
            total_score = record.result.total_score,
            category = %record.result.performance_category,
            "evaluation revised"
        );

        self.notify(EvaluationEvent::Revised {
            evaluation_id: record.id.clone(),
            organization_id: record.organization_id.clone(),
            agent_id: record.agent_id.clone(),
            revision: record.revision,
            performance_category: record.result.performance_category,
        });
        if !previous.requires_coaching() {
            self.notify_coaching(&record);
        }

        Ok(record)
    }

    pub fn get(
        &self,
        evaluation_id: &EvaluationId,
    ) -> Result<EvaluationRecord, EvaluationServiceError> {
        let record = self
            .repository
            .fetch(evaluation_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    /// Sheet for re-opening an evaluation in the rating form, on the 1-10 scale.
    pub fn edit_form(
        &self,
        evaluation_id: &EvaluationId,
    ) -> Result<ScoreSheet, EvaluationServiceError> {
        let record = self.get(evaluation_id)?;
        Ok(normalize_legacy_score_sheet(&record.metric_scores))
    }

    /// Mean of the agent's most recent evaluation totals.
    pub fn agent_scorecard(
        &self,
        organization_id: &OrganizationId,
        agent_id: &AgentId,
    ) -> Result<AgentScorecard, EvaluationServiceError> {
        let records =
            self.repository
                .for_agent(organization_id, agent_id, self.scorecard_window)?;

        let evaluations = records.len();
        let average_score = if records.is_empty() {
            None
        } else {
            let sum: f64 = records.iter().map(|record| record.result.total_score).sum();
            Some(round_to_cents(sum / evaluations as f64))
        };
        let coaching_flags = records
            .iter()
            .filter(|record| record.result.performance_category.requires_coaching())
            .count();

        Ok(AgentScorecard {
            organization_id: organization_id.clone(),
            agent_id: agent_id.clone(),
            evaluations,
            average_score,
            performance_category: average_score.map(PerformanceCategory::classify),
            coaching_flags,
        })
    }

    fn validate(&self, sheet: &ScoreSheet) -> Result<(), SubmissionError> {
        let catalog = self.scorer.catalog();

        let unknown: Vec<String> = sheet
            .keys()
            .filter(|key| !catalog.contains(key))
            .map(str::to_string)
            .collect();
        if !unknown.is_empty() {
            return Err(SubmissionError::UnknownMetrics(unknown));
        }

        let missing: Vec<String> = catalog
            .visible_metrics()
            .filter(|metric| sheet.get(&metric.key).map_or(true, f64::is_nan))
            .map(|metric| metric.key.clone())
            .collect();
        if !missing.is_empty() {
            return Err(SubmissionError::MissingScores(missing));
        }

        Ok(())
    }

    fn notify_coaching(&self, record: &EvaluationRecord) {
        if record.result.performance_category.requires_coaching() {
            self.notify(EvaluationEvent::CoachingRequired {
                evaluation_id: record.id.clone(),
                organization_id: record.organization_id.clone(),
                agent_id: record.agent_id.clone(),
                coaching_area: record.coaching_area.clone(),
                performance_category: record.result.performance_category,
            });
        }
    }

    // Best effort: the evaluation is already stored when this runs.
    fn notify(&self, event: EvaluationEvent) {
        if let Err(err) = self.notifier.publish(event.clone()) {
            warn!(
                evaluation_id = %event.evaluation_id().0,
                error = %err,
                "failed to publish evaluation event"
            );
        }
    }
}

/// Rolling summary of an agent's recent evaluations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentScorecard {
    pub organization_id: OrganizationId,
    pub agent_id: AgentId,
    pub evaluations: usize,
    pub average_score: Option<f64>,
    pub performance_category: Option<PerformanceCategory>,
    pub coaching_flags: usize,
}

/// Sheet rejected before scoring.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    #[error("missing scores for: {}", .0.join(", "))]
    MissingScores(Vec<String>),
    #[error("unknown metrics: {}", .0.join(", "))]
    UnknownMetrics(Vec<String>),
}

/// Error raised by the evaluation service.
#[derive(Debug, thiserror::Error)]
pub enum EvaluationServiceError {
    #[error(transparent)]
    Submission(#[from] SubmissionError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
