use std::collections::HashMap;

use crate::AppState;
use crate::api::extractors::JsonBody;
use crate::api::handlers::{not_found_as, parse_id};
use crate::api::models::appointments::{AppointmentCreate, AppointmentResponse, AppointmentUpdate};
use crate::api::models::common::{ErrorResponse, MessageResponse};
use crate::api::models::doctors::DoctorResponse;
use crate::db::handlers::{Appointments, Doctors, Repository};
use crate::db::models::doctors::DoctorDBResponse;
use crate::errors::{Error, Result};
use crate::notifications::Notification;
use crate::types::DoctorId;
use crate::validation::validate_into;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

/// Resolve the doctor an appointment refers to.
///
/// Not transactional with the write that follows: the doctor can still be
/// deleted in between, in which case the appointment lists no doctor details.
async fn resolve_doctor(state: &AppState, raw: &str) -> Result<DoctorDBResponse> {
    let doctor_id: DoctorId = parse_id("doctor", raw)?;
    Doctors::new(state.store.as_ref())
        .get_by_id(doctor_id)
        .await?
        .ok_or_else(|| Error::NotFound {
            resource: "Doctor".to_string(),
            id: doctor_id.to_string(),
        })
}

#[utoipa::path(
    post,
    path = "/appointments",
    tag = "appointments",
    summary = "Book an appointment",
    description = "Sends a confirmation email to the patient once the appointment is stored.",
    request_body = AppointmentCreate,
    responses(
        (status = 201, description = "Appointment created", body = AppointmentResponse),
        (status = 400, description = "Missing or malformed fields, or malformed doctor ID", body = ErrorResponse),
        (status = 404, description = "Doctor not found", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_appointment(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> Result<(StatusCode, Json<AppointmentResponse>)> {
    let request: AppointmentCreate = validate_into(AppointmentCreate::FIELDS, body)?;
    let doctor = resolve_doctor(&state, &request.doctor).await?;

    let mut repo = Appointments::new(state.store.as_ref());
    let appointment = repo.create(&request.into_appointment(doctor.id)).await?;

    state.notifier.notify(Notification::AppointmentConfirmation {
        patient_name: appointment.data.name.clone(),
        patient_email: appointment.data.email.clone(),
        doctor_name: doctor.data.doctor_name.clone(),
        date: appointment.data.date,
        time: appointment.data.time.clone(),
    });

    Ok((
        StatusCode::CREATED,
        Json(AppointmentResponse::new(appointment, Some(doctor.into()))),
    ))
}

#[utoipa::path(
    get,
    path = "/appointments",
    tag = "appointments",
    summary = "List appointments",
    responses(
        (status = 200, description = "All appointments with their doctor, oldest first", body = Vec<AppointmentResponse>),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_appointments(State(state): State<AppState>) -> Result<Json<Vec<AppointmentResponse>>> {
    let appointments = Appointments::new(state.store.as_ref()).list(&()).await?;

    let mut doctor_ids: Vec<DoctorId> = appointments.iter().map(|a| a.data.doctor).collect();
    doctor_ids.sort_unstable();
    doctor_ids.dedup();
    let doctors: HashMap<DoctorId, DoctorDBResponse> = Doctors::new(state.store.as_ref()).get_bulk(doctor_ids).await?;

    let response = appointments
        .into_iter()
        .map(|appointment| {
            let details = doctors.get(&appointment.data.doctor).cloned().map(DoctorResponse::from);
            AppointmentResponse::new(appointment, details)
        })
        .collect();

    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/appointments/{id}",
    tag = "appointments",
    summary = "Get an appointment",
    params(("id" = String, Path, description = "Appointment ID")),
    responses(
        (status = 200, description = "Appointment found", body = AppointmentResponse),
        (status = 400, description = "Malformed ID", body = ErrorResponse),
        (status = 404, description = "Appointment not found", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_appointment(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<AppointmentResponse>> {
    let id = parse_id("appointment", &id)?;

    let appointment = Appointments::new(state.store.as_ref())
        .get_by_id(id)
        .await?
        .ok_or_else(|| Error::NotFound {
            resource: "Appointment".to_string(),
            id: id.to_string(),
        })?;
    let doctor = Doctors::new(state.store.as_ref()).get_by_id(appointment.data.doctor).await?;

    Ok(Json(AppointmentResponse::new(appointment, doctor.map(DoctorResponse::from))))
}

#[utoipa::path(
    put,
    path = "/appointments/{id}",
    tag = "appointments",
    summary = "Replace an appointment",
    params(("id" = String, Path, description = "Appointment ID")),
    request_body = AppointmentUpdate,
    responses(
        (status = 200, description = "Appointment updated", body = AppointmentResponse),
        (status = 400, description = "Malformed ID or fields, or nothing changed", body = ErrorResponse),
        (status = 404, description = "Appointment or doctor not found", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn update_appointment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody,
) -> Result<Json<AppointmentResponse>> {
    let id = parse_id("appointment", &id)?;
    let request: AppointmentUpdate = validate_into(AppointmentUpdate::FIELDS, body)?;

    let mut repo = Appointments::new(state.store.as_ref());
    if repo.get_by_id(id).await?.is_none() {
        return Err(Error::NotFound {
            resource: "Appointment".to_string(),
            id: id.to_string(),
        });
    }
    let doctor = resolve_doctor(&state, &request.doctor).await?;

    let appointment = repo
        .update(id, &request.into_appointment(doctor.id))
        .await
        .map_err(not_found_as("Appointment", id))?;

    Ok(Json(AppointmentResponse::new(appointment, Some(doctor.into()))))
}

#[utoipa::path(
    delete,
    path = "/appointments/{id}",
    tag = "appointments",
    summary = "Cancel an appointment",
    params(("id" = String, Path, description = "Appointment ID")),
    responses(
        (status = 200, description = "Appointment deleted", body = MessageResponse),
        (status = 400, description = "Malformed ID", body = ErrorResponse),
        (status = 404, description = "Appointment not found", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn delete_appointment(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<MessageResponse>> {
    let id = parse_id("appointment", &id)?;

    if !Appointments::new(state.store.as_ref()).delete(id).await? {
        return Err(Error::NotFound {
            resource: "Appointment".to_string(),
            id: id.to_string(),
        });
    }

    Ok(Json(MessageResponse::new("Appointment deleted successfully")))
}

#[cfg(test)]
mod tests {
    use crate::test_utils::*;
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    #[test_log::test(tokio::test)]
    async fn test_booking_sends_one_confirmation() {
        let (server, mail) = create_test_app().await;
        let doctor_id = create_doctor(&server, "Perera", "Cardiology").await;

        let response = server.post("/appointments").json(&appointment_json(&doctor_id)).await;
        response.assert_status(StatusCode::CREATED);
        let appointment: Value = response.json();
        assert_eq!(appointment["doctor"], doctor_id.as_str());
        assert_eq!(appointment["doctorDetails"]["doctorName"], "Perera");

        let sent = mail.wait_for_sends(1).await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "kamala@example.com");
        assert_eq!(sent[0].subject, "Appointment Confirmation");
        assert!(sent[0].body.contains("Dr. Perera"));
    }

    #[test_log::test(tokio::test)]
    async fn test_unresolved_doctor_creates_nothing() {
        let (server, mail) = create_test_app().await;

        let malformed = server.post("/appointments").json(&appointment_json("12345")).await;
        malformed.assert_status_bad_request();
        assert_eq!(malformed.json::<Value>()["message"], "Invalid doctor ID");

        let unknown = server
            .post("/appointments")
            .json(&appointment_json(&uuid::Uuid::new_v4().to_string()))
            .await;
        unknown.assert_status_not_found();
        assert_eq!(unknown.json::<Value>()["message"], "Doctor not found");

        assert_eq!(server.get("/appointments").await.json::<Value>(), json!([]));
        assert_eq!(mail.attempts(), 0);
    }

    #[test_log::test(tokio::test)]
    async fn test_missing_fields_count_matches_omissions() {
        let (server, _mail) = create_test_app().await;

        let response = server
            .post("/appointments")
            .json(&json!({"name": "Kamala", "age": 0, "time": "10:30"}))
            .await;

        response.assert_status_bad_request();
        let missing = response.json::<Value>()["missingFields"].clone();
        assert_eq!(missing, json!(["age", "contact", "doctor", "date", "email"]));
    }

    #[test_log::test(tokio::test)]
    async fn test_numeric_strings_are_accepted() {
        let (server, _mail) = create_test_app().await;
        let doctor_id = create_doctor(&server, "Perera", "Cardiology").await;

        let mut body = appointment_json(&doctor_id);
        body["age"] = json!("41");
        let response = server.post("/appointments").json(&body).await;

        response.assert_status(StatusCode::CREATED);
        assert_eq!(response.json::<Value>()["age"], 41);
    }

    #[test_log::test(tokio::test)]
    async fn test_update_and_double_delete() {
        let (server, _mail) = create_test_app().await;
        let doctor_id = create_doctor(&server, "Perera", "Cardiology").await;
        let created: Value = server.post("/appointments").json(&appointment_json(&doctor_id)).await.json();
        let id = created["id"].as_str().unwrap().to_string();

        let unchanged = server
            .put(&format!("/appointments/{id}"))
            .json(&appointment_json(&doctor_id))
            .await;
        unchanged.assert_status_bad_request();
        assert_eq!(unchanged.json::<Value>()["message"], "No changes were made");

        let mut changed = appointment_json(&doctor_id);
        changed["time"] = json!("14:00");
        let updated = server.put(&format!("/appointments/{id}")).json(&changed).await;
        updated.assert_status_ok();
        assert_eq!(updated.json::<Value>()["time"], "14:00");

        server
            .put(&format!("/appointments/{}", uuid::Uuid::new_v4()))
            .json(&changed)
            .await
            .assert_status_not_found();

        server.delete(&format!("/appointments/{id}")).await.assert_status_ok();
        let second = server.delete(&format!("/appointments/{id}")).await;
        second.assert_status_not_found();
        assert_eq!(second.json::<Value>()["message"], "Appointment not found");
    }

    #[test_log::test(tokio::test)]
    async fn test_update_reports_missing_appointment_before_doctor() {
        let (server, _mail) = create_test_app().await;
        let unknown_doctor = uuid::Uuid::new_v4().to_string();

        let missing = server
            .put(&format!("/appointments/{}", uuid::Uuid::new_v4()))
            .json(&appointment_json(&unknown_doctor))
            .await;
        missing.assert_status_not_found();
        assert_eq!(missing.json::<Value>()["message"], "Appointment not found");

        let doctor_id = create_doctor(&server, "Perera", "Cardiology").await;
        let created: Value = server.post("/appointments").json(&appointment_json(&doctor_id)).await.json();
        let id = created["id"].as_str().unwrap();

        let stale_doctor = server
            .put(&format!("/appointments/{id}"))
            .json(&appointment_json(&unknown_doctor))
            .await;
        stale_doctor.assert_status_not_found();
        assert_eq!(stale_doctor.json::<Value>()["message"], "Doctor not found");
    }

    #[test_log::test(tokio::test)]
    async fn test_get_and_list_embed_doctor() {
        let (server, _mail) = create_test_app().await;
        let doctor_id = create_doctor(&server, "Perera", "Cardiology").await;
        let created: Value = server.post("/appointments").json(&appointment_json(&doctor_id)).await.json();
        let id = created["id"].as_str().unwrap();

        let fetched: Value = server.get(&format!("/appointments/{id}")).await.json();
        assert_eq!(fetched["doctorDetails"]["id"], doctor_id.as_str());

        let listed: Value = server.get("/appointments").await.json();
        assert_eq!(listed[0]["doctorDetails"]["specialization"], "Cardiology");

        server.get("/appointments/xyz").await.assert_status_bad_request();
    }
}
