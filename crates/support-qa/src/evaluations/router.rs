use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;

use super::catalog::{CategoryWeight, Metric};
use super::domain::{
    AgentId, EvaluationId, EvaluationRevision, EvaluationSubmission, OrganizationId, ScoreSheet,
};
use super::repository::{EvaluationNotifier, EvaluationRepository, RepositoryError};
use super::service::{EvaluationServiceError, QaEvaluationService};

/// Rubric as shown to the rating form.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogView {
    pub metrics: Vec<Metric>,
    pub categories: Vec<CategoryWeight>,
}

/// Persisted grades re-projected onto the 1-10 scale for editing.
#[derive(Debug, Clone, Serialize)]
pub struct EditFormView {
    pub evaluation_id: EvaluationId,
    pub metric_scores: ScoreSheet,
}

/// Router builder exposing rubric, preview, and evaluation endpoints.
pub fn evaluation_router<R, N>(service: Arc<QaEvaluationService<R, N>>) -> Router
where
    R: EvaluationRepository + 'static,
    N: EvaluationNotifier + 'static,
{
    Router::new()
        .route("/api/v1/qa/catalog", get(catalog_handler::<R, N>))
        .route(
            "/api/v1/qa/evaluations/preview",
            post(preview_handler::<R, N>),
        )
        .route("/api/v1/qa/evaluations", post(submit_handler::<R, N>))
        .route(
            "/api/v1/qa/evaluations/:evaluation_id",
            get(status_handler::<R, N>).put(revise_handler::<R, N>),
        )
        .route(
            "/api/v1/qa/evaluations/:evaluation_id/form",
            get(form_handler::<R, N>),
        )
        .route(
            "/api/v1/qa/organizations/:organization_id/agents/:agent_id/scorecard",
            get(scorecard_handler::<R, N>),
        )
        .with_state(service)
}

pub(crate) async fn catalog_handler<R, N>(
    State(service): State<Arc<QaEvaluationService<R, N>>>,
) -> Json<CatalogView>
where
    R: EvaluationRepository + 'static,
    N: EvaluationNotifier + 'static,
{
    let catalog = service.catalog();
    Json(CatalogView {
        metrics: catalog.metrics().to_vec(),
        categories: catalog.category_weights(),
    })
}

pub(crate) async fn preview_handler<R, N>(
    State(service): State<Arc<QaEvaluationService<R, N>>>,
    Json(sheet): Json<ScoreSheet>,
) -> Response
where
    R: EvaluationRepository + 'static,
    N: EvaluationNotifier + 'static,
{
    (StatusCode::OK, Json(service.preview(&sheet))).into_response()
}

pub(crate) async fn submit_handler<R, N>(
    State(service): State<Arc<QaEvaluationService<R, N>>>,
    Json(submission): Json<EvaluationSubmission>,
) -> Response
where
    R: EvaluationRepository + 'static,
    N: EvaluationNotifier + 'static,
{
    match service.submit(submission) {
        Ok(record) => (StatusCode::CREATED, Json(record.status_view())).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn status_handler<R, N>(
    State(service): State<Arc<QaEvaluationService<R, N>>>,
    Path(evaluation_id): Path<String>,
) -> Response
where
    R: EvaluationRepository + 'static,
    N: EvaluationNotifier + 'static,
{
    match service.get(&EvaluationId(evaluation_id)) {
        Ok(record) => (StatusCode::OK, Json(record.status_view())).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn revise_handler<R, N>(
    State(service): State<Arc<QaEvaluationService<R, N>>>,
    Path(evaluation_id): Path<String>,
    Json(revision): Json<EvaluationRevision>,
) -> Response
where
    R: EvaluationRepository + 'static,
    N: EvaluationNotifier + 'static,
{
    match service.revise(&EvaluationId(evaluation_id), revision) {
        Ok(record) => (StatusCode::OK, Json(record.status_view())).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn form_handler<R, N>(
    State(service): State<Arc<QaEvaluationService<R, N>>>,
    Path(evaluation_id): Path<String>,
) -> Response
where
    R: EvaluationRepository + 'static,
    N: EvaluationNotifier + 'static,
{
    let evaluation_id = EvaluationId(evaluation_id);
    match service.edit_form(&evaluation_id) {
        Ok(metric_scores) => {
            let view = EditFormView {
                evaluation_id,
                metric_scores,
            };
            (StatusCode::OK, Json(view)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn scorecard_handler<R, N>(
    State(service): State<Arc<QaEvaluationService<R, N>>>,
    Path((organization_id, agent_id)): Path<(String, String)>,
) -> Response
where
    R: EvaluationRepository + 'static,
    N: EvaluationNotifier + 'static,
{
    match service.agent_scorecard(&OrganizationId(organization_id), &AgentId(agent_id)) {
        Ok(scorecard) => (StatusCode::OK, Json(scorecard)).into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(err: EvaluationServiceError) -> Response {
    let status = match &err {
        EvaluationServiceError::Submission(_) => StatusCode::UNPROCESSABLE_ENTITY,
        EvaluationServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        EvaluationServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        EvaluationServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({
        "error": err.to_string(),
    });
    (status, Json(payload)).into_response()
}
