use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{ApplicantId, CreditEvaluation, SubmissionProgressView};
use super::service::{AccreditationService, WorkflowError};
use super::sources::{ProfileSource, TranscriptSource};
use super::store::{AccreditationStore, StoreError};

/// Router builder exposing the workflow actions and query views over HTTP.
pub fn accreditation_router<S, T, P>(service: Arc<AccreditationService<S, T, P>>) -> Router
where
    S: AccreditationStore + 'static,
    T: TranscriptSource + 'static,
    P: ProfileSource + 'static,
{
    Router::new()
        .route(
            "/api/v1/accreditation/requests",
            post(submit_handler::<S, T, P>).get(request_queue_handler::<S, T, P>),
        )
        .route(
            "/api/v1/accreditation/pending",
            get(pending_queue_handler::<S, T, P>),
        )
        .route(
            "/api/v1/accreditation/requests/:applicant_id",
            get(details_handler::<S, T, P>),
        )
        .route(
            "/api/v1/accreditation/requests/:applicant_id/progress",
            get(progress_handler::<S, T, P>),
        )
        .route(
            "/api/v1/accreditation/requests/:applicant_id/history",
            get(history_handler::<S, T, P>),
        )
        .route(
            "/api/v1/accreditation/requests/:applicant_id/entries",
            get(entries_handler::<S, T, P>),
        )
        .route(
            "/api/v1/accreditation/requests/:applicant_id/summary",
            get(summary_handler::<S, T, P>),
        )
        .route(
            "/api/v1/accreditation/requests/:applicant_id/accept",
            post(accept_handler::<S, T, P>),
        )
        .route(
            "/api/v1/accreditation/requests/:applicant_id/deny",
            post(deny_handler::<S, T, P>),
        )
        .route(
            "/api/v1/accreditation/requests/:applicant_id/cancel",
            post(cancel_handler::<S, T, P>),
        )
        .route(
            "/api/v1/accreditation/requests/:applicant_id/sync",
            post(sync_handler::<S, T, P>),
        )
        .route(
            "/api/v1/accreditation/requests/:applicant_id/finalize",
            post(finalize_handler::<S, T, P>),
        )
        .route(
            "/api/v1/accreditation/requests/:applicant_id/entries/:subject_code/evaluation",
            put(evaluation_handler::<S, T, P>),
        )
        .route(
            "/api/v1/accreditation/requests/:applicant_id/entries/:subject_code/notes",
            put(notes_handler::<S, T, P>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubmitRequest {
    pub(crate) applicant_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EvaluationUpdateRequest {
    pub(crate) status: CreditEvaluation,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NoteUpdateRequest {
    pub(crate) notes: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct EntriesQuery {
    pub(crate) status: Option<CreditEvaluation>,
}

pub(crate) async fn submit_handler<S, T, P>(
    State(service): State<Arc<AccreditationService<S, T, P>>>,
    Json(payload): Json<SubmitRequest>,
) -> Response
where
    S: AccreditationStore + 'static,
    T: TranscriptSource + 'static,
    P: ProfileSource + 'static,
{
    let applicant = ApplicantId(payload.applicant_id);
    match service.submit(&applicant) {
        Ok(outcome) => (StatusCode::ACCEPTED, Json(outcome)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn request_queue_handler<S, T, P>(
    State(service): State<Arc<AccreditationService<S, T, P>>>,
) -> Response
where
    S: AccreditationStore + 'static,
    T: TranscriptSource + 'static,
    P: ProfileSource + 'static,
{
    match service.request_queue() {
        Ok(queue) => (StatusCode::OK, Json(queue)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn pending_queue_handler<S, T, P>(
    State(service): State<Arc<AccreditationService<S, T, P>>>,
) -> Response
where
    S: AccreditationStore + 'static,
    T: TranscriptSource + 'static,
    P: ProfileSource + 'static,
{
    match service.pending_queue() {
        Ok(queue) => (StatusCode::OK, Json(queue)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn details_handler<S, T, P>(
    State(service): State<Arc<AccreditationService<S, T, P>>>,
    Path(applicant_id): Path<String>,
) -> Response
where
    S: AccreditationStore + 'static,
    T: TranscriptSource + 'static,
    P: ProfileSource + 'static,
{
    match service.details(&ApplicantId(applicant_id)) {
        Ok(details) => (StatusCode::OK, Json(details)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn progress_handler<S, T, P>(
    State(service): State<Arc<AccreditationService<S, T, P>>>,
    Path(applicant_id): Path<String>,
) -> Response
where
    S: AccreditationStore + 'static,
    T: TranscriptSource + 'static,
    P: ProfileSource + 'static,
{
    let applicant = ApplicantId(applicant_id);
    match service.progress(&applicant) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        // Nothing on file renders as milestone zero rather than an error so
        // the tracker can always draw something.
        Err(WorkflowError::Store(StoreError::NotFound)) => (
            StatusCode::OK,
            Json(SubmissionProgressView::empty(applicant)),
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn history_handler<S, T, P>(
    State(service): State<Arc<AccreditationService<S, T, P>>>,
    Path(applicant_id): Path<String>,
) -> Response
where
    S: AccreditationStore + 'static,
    T: TranscriptSource + 'static,
    P: ProfileSource + 'static,
{
    match service.history(&ApplicantId(applicant_id)) {
        Ok(history) => (StatusCode::OK, Json(history)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn entries_handler<S, T, P>(
    State(service): State<Arc<AccreditationService<S, T, P>>>,
    Path(applicant_id): Path<String>,
    Query(query): Query<EntriesQuery>,
) -> Response
where
    S: AccreditationStore + 'static,
    T: TranscriptSource + 'static,
    P: ProfileSource + 'static,
{
    match service.entries(&ApplicantId(applicant_id), query.status) {
        Ok(entries) => (StatusCode::OK, Json(entries)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn summary_handler<S, T, P>(
    State(service): State<Arc<AccreditationService<S, T, P>>>,
    Path(applicant_id): Path<String>,
) -> Response
where
    S: AccreditationStore + 'static,
    T: TranscriptSource + 'static,
    P: ProfileSource + 'static,
{
    match service.finalized_summary(&ApplicantId(applicant_id)) {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn accept_handler<S, T, P>(
    State(service): State<Arc<AccreditationService<S, T, P>>>,
    Path(applicant_id): Path<String>,
) -> Response
where
    S: AccreditationStore + 'static,
    T: TranscriptSource + 'static,
    P: ProfileSource + 'static,
{
    match service.accept(&ApplicantId(applicant_id)) {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn deny_handler<S, T, P>(
    State(service): State<Arc<AccreditationService<S, T, P>>>,
    Path(applicant_id): Path<String>,
) -> Response
where
    S: AccreditationStore + 'static,
    T: TranscriptSource + 'static,
    P: ProfileSource + 'static,
{
    match service.deny(&ApplicantId(applicant_id)) {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn cancel_handler<S, T, P>(
    State(service): State<Arc<AccreditationService<S, T, P>>>,
    Path(applicant_id): Path<String>,
) -> Response
where
    S: AccreditationStore + 'static,
    T: TranscriptSource + 'static,
    P: ProfileSource + 'static,
{
    match service.cancel(&ApplicantId(applicant_id)) {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn sync_handler<S, T, P>(
    State(service): State<Arc<AccreditationService<S, T, P>>>,
    Path(applicant_id): Path<String>,
) -> Response
where
    S: AccreditationStore + 'static,
    T: TranscriptSource + 'static,
    P: ProfileSource + 'static,
{
    match service.sync_entries(&ApplicantId(applicant_id)) {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn finalize_handler<S, T, P>(
    State(service): State<Arc<AccreditationService<S, T, P>>>,
    Path(applicant_id): Path<String>,
) -> Response
where
    S: AccreditationStore + 'static,
    T: TranscriptSource + 'static,
    P: ProfileSource + 'static,
{
    match service.finalize(&ApplicantId(applicant_id)) {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn evaluation_handler<S, T, P>(
    State(service): State<Arc<AccreditationService<S, T, P>>>,
    Path((applicant_id, subject_code)): Path<(String, String)>,
    Json(payload): Json<EvaluationUpdateRequest>,
) -> Response
where
    S: AccreditationStore + 'static,
    T: TranscriptSource + 'static,
    P: ProfileSource + 'static,
{
    match service.set_evaluation(&ApplicantId(applicant_id), &subject_code, payload.status) {
        Ok(entry) => (StatusCode::OK, Json(entry)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn notes_handler<S, T, P>(
    State(service): State<Arc<AccreditationService<S, T, P>>>,
    Path((applicant_id, subject_code)): Path<(String, String)>,
    Json(payload): Json<NoteUpdateRequest>,
) -> Response
where
    S: AccreditationStore + 'static,
    T: TranscriptSource + 'static,
    P: ProfileSource + 'static,
{
    match service.set_notes(&ApplicantId(applicant_id), &subject_code, &payload.notes) {
        Ok(entry) => (StatusCode::OK, Json(entry)).into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(err: WorkflowError) -> Response {
    let status = match &err {
        WorkflowError::Transition(_) => StatusCode::CONFLICT,
        WorkflowError::Store(StoreError::NotFound) => StatusCode::NOT_FOUND,
        WorkflowError::Store(StoreError::Locked) => StatusCode::LOCKED,
        WorkflowError::Store(StoreError::Conflict) => StatusCode::CONFLICT,
        WorkflowError::Store(StoreError::Unavailable(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        WorkflowError::Upstream(_) => StatusCode::BAD_GATEWAY,
        WorkflowError::UnreviewedEntries { .. } => StatusCode::UNPROCESSABLE_ENTITY,
    };

    let body = Json(json!({ "error": err.to_string() }));
    (status, body).into_response()
}
