use crate::AppState;
use crate::api::extractors::JsonBody;
use crate::api::handlers::{not_found_as, parse_id};
use crate::api::models::common::{ErrorResponse, MessageResponse};
use crate::api::models::doctors::{DoctorCreate, DoctorResponse, DoctorUpdate, SpecializationCount};
use crate::db::handlers::{Doctors, Repository};
use crate::db::models::doctors::Doctor;
use crate::errors::{Error, Result};
use crate::validation::validate_into;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

#[utoipa::path(
    post,
    path = "/doctors",
    tag = "doctors",
    summary = "Add a doctor",
    request_body = DoctorCreate,
    responses(
        (status = 201, description = "Doctor created", body = DoctorResponse),
        (status = 400, description = "Missing or malformed fields", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_doctor(State(state): State<AppState>, JsonBody(body): JsonBody) -> Result<(StatusCode, Json<DoctorResponse>)> {
    let request: DoctorCreate = validate_into(DoctorCreate::FIELDS, body)?;

    let mut repo = Doctors::new(state.store.as_ref());
    let doctor = repo.create(&Doctor::from(request)).await?;

    Ok((StatusCode::CREATED, Json(doctor.into())))
}

#[utoipa::path(
    get,
    path = "/doctors",
    tag = "doctors",
    summary = "List doctors",
    responses(
        (status = 200, description = "All doctors, oldest first", body = Vec<DoctorResponse>),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_doctors(State(state): State<AppState>) -> Result<Json<Vec<DoctorResponse>>> {
    let mut repo = Doctors::new(state.store.as_ref());
    let doctors = repo.list(&()).await?;
    Ok(Json(doctors.into_iter().map(DoctorResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/doctors/{id}",
    tag = "doctors",
    summary = "Get a doctor",
    params(("id" = String, Path, description = "Doctor ID")),
    responses(
        (status = 200, description = "Doctor found", body = DoctorResponse),
        (status = 400, description = "Malformed ID", body = ErrorResponse),
        (status = 404, description = "Doctor not found", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_doctor(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<DoctorResponse>> {
    let id = parse_id("doctor", &id)?;

    let mut repo = Doctors::new(state.store.as_ref());
    match repo.get_by_id(id).await? {
        Some(doctor) => Ok(Json(doctor.into())),
        None => Err(Error::NotFound {
            resource: "Doctor".to_string(),
            id: id.to_string(),
        }),
    }
}

#[utoipa::path(
    put,
    path = "/doctors/{id}",
    tag = "doctors",
    summary = "Replace a doctor",
    params(("id" = String, Path, description = "Doctor ID")),
    request_body = DoctorUpdate,
    responses(
        (status = 200, description = "Doctor updated", body = DoctorResponse),
        (status = 400, description = "Malformed ID or fields, or nothing changed", body = ErrorResponse),
        (status = 404, description = "Doctor not found", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn update_doctor(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody,
) -> Result<Json<DoctorResponse>> {
    let id = parse_id("doctor", &id)?;
    let request: DoctorUpdate = validate_into(DoctorUpdate::FIELDS, body)?;

    let mut repo = Doctors::new(state.store.as_ref());
    let doctor = repo
        .update(id, &Doctor::from(request))
        .await
        .map_err(not_found_as("Doctor", id))?;

    Ok(Json(doctor.into()))
}

#[utoipa::path(
    delete,
    path = "/doctors/{id}",
    tag = "doctors",
    summary = "Delete a doctor",
    description = "Refused while any appointment references the doctor.",
    params(("id" = String, Path, description = "Doctor ID")),
    responses(
        (status = 200, description = "Doctor deleted", body = MessageResponse),
        (status = 400, description = "Malformed ID", body = ErrorResponse),
        (status = 404, description = "Doctor not found", body = ErrorResponse),
        (status = 409, description = "Doctor still has appointments", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn delete_doctor(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<MessageResponse>> {
    let id = parse_id("doctor", &id)?;

    let mut repo = Doctors::new(state.store.as_ref());
    if !repo.delete(id).await? {
        return Err(Error::NotFound {
            resource: "Doctor".to_string(),
            id: id.to_string(),
        });
    }

    Ok(Json(MessageResponse::new("Doctor deleted successfully")))
}

#[utoipa::path(
    get,
    path = "/doctors/specialization-counts",
    tag = "doctors",
    summary = "Count doctors per specialization",
    responses(
        (status = 200, description = "Counts per specialization, or a message when there are no doctors", body = Vec<SpecializationCount>),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn specialization_counts(State(state): State<AppState>) -> Result<Response> {
    let mut repo = Doctors::new(state.store.as_ref());
    let counts = repo.specialization_counts().await?;

    if counts.is_empty() {
        return Ok(Json(MessageResponse::new("No specializations found")).into_response());
    }

    let counts: Vec<SpecializationCount> = counts
        .into_iter()
        .map(|(specialization, count)| SpecializationCount { specialization, count })
        .collect();
    Ok(Json(counts).into_response())
}
