//! QA evaluation of support interactions against a weighted rubric.
//!
//! A [`ScoreSheet`] of raw 1-10 grades is combined with the immutable [`MetricCatalog`] to
//! produce an [`EvaluationResult`]. The result is never stored on its own: records keep the
//! sheet and the derived result side by side, and the result can be recomputed from the sheet
//! at any time.

pub mod catalog;
pub mod domain;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use catalog::{CatalogError, CategoryWeight, Metric, MetricCatalog};
pub use domain::{
    AgentId, EvaluationId, EvaluationPayload, EvaluationRevision, EvaluationSubmission,
    InteractionChannel, InteractionRef, OrganizationId, ScoreSheet,
};
pub use repository::{
    EvaluationEvent, EvaluationNotifier, EvaluationRecord, EvaluationRepository,
    EvaluationStatusView, NotifyError, RepositoryError,
};
pub use router::evaluation_router;
pub use scoring::{
    compute_result, normalize_legacy_score_sheet, CategorySubtotal, EvaluationResult,
    MetricContribution, PerformanceCategory, ScoreBreakdown, Scorer,
};
pub use service::{
    AgentScorecard, EvaluationServiceError, QaEvaluationService, SubmissionError,
};
