use crate::AppState;
use crate::api::extractors::JsonBody;
use crate::api::handlers::{not_found_as, parse_id};
use crate::api::models::common::{ErrorResponse, MessageResponse};
use crate::api::models::users::{LoginRequest, LoginResponse, Role, UserCreate, UserResponse, UserUpdate};
use crate::auth::password::{self, Argon2Params};
use crate::db::handlers::{Repository, Users};
use crate::db::models::users::{UserCreateDBRequest, UserUpdateDBRequest};
use crate::errors::{Error, Result};
use crate::validation::validate_into;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

// Hash the password on a blocking thread to avoid blocking async runtime
async fn hash_password(params: Argon2Params, password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || password::hash_string(&password, params))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password hashing task: {e}"),
        })?
}

#[utoipa::path(
    post,
    path = "/users/register",
    tag = "users",
    summary = "Register a user",
    description = "Also served at `POST /users`. New accounts get the `user` role.",
    request_body = UserCreate,
    responses(
        (status = 201, description = "User registered", body = UserResponse),
        (status = 400, description = "Missing or malformed fields", body = ErrorResponse),
        (status = 409, description = "Email or NIC already registered", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn register_user(State(state): State<AppState>, JsonBody(body): JsonBody) -> Result<(StatusCode, Json<UserResponse>)> {
    let request: UserCreate = validate_into(UserCreate::FIELDS, body)?;
    let password_hash = hash_password(state.password_params, request.password).await?;

    let user = Users::new(state.store.as_ref())
        .create(&UserCreateDBRequest {
            profile: request.profile,
            role: Role::User,
            password_hash: Some(password_hash),
        })
        .await?;

    tracing::info!(user_id = %user.id, "User registered");
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[utoipa::path(
    post,
    path = "/users/login",
    tag = "users",
    summary = "Log in",
    description = "Checks credentials and tells the dashboard where to go next. No session or token is issued.",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Credentials accepted", body = LoginResponse),
        (status = 400, description = "Missing fields", body = ErrorResponse),
        (status = 401, description = "Invalid email or password", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn login(State(state): State<AppState>, JsonBody(body): JsonBody) -> Result<Json<LoginResponse>> {
    let request: LoginRequest = validate_into(LoginRequest::FIELDS, body)?;
    let invalid = || Error::Unauthenticated {
        message: Some(INVALID_CREDENTIALS.to_string()),
    };

    let user = Users::new(state.store.as_ref())
        .get_user_by_email(&request.email_address)
        .await?
        .ok_or_else(invalid)?;
    let hash = user.data.password_hash.clone().ok_or_else(invalid)?;

    let password = request.password;
    let is_valid = tokio::task::spawn_blocking(move || password::verify_string(&password, &hash))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password verification task: {e}"),
        })??;
    if !is_valid {
        return Err(invalid());
    }

    let redirect = user.data.role.landing_page().to_string();
    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        user: user.into(),
        redirect,
    }))
}

#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    summary = "List users",
    responses(
        (status = 200, description = "All users, oldest first", body = Vec<UserResponse>),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserResponse>>> {
    let users = Users::new(state.store.as_ref()).list(&()).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    summary = "Get a user",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 400, description = "Malformed ID", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_user(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<UserResponse>> {
    let id = parse_id("user", &id)?;

    match Users::new(state.store.as_ref()).get_by_id(id).await? {
        Some(user) => Ok(Json(user.into())),
        None => Err(Error::NotFound {
            resource: "User".to_string(),
            id: id.to_string(),
        }),
    }
}

#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "users",
    summary = "Replace a user's profile",
    description = "The password is re-hashed only when one is supplied. The role cannot be changed.",
    params(("id" = String, Path, description = "User ID")),
    request_body = UserUpdate,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Malformed ID or fields, or nothing changed", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 409, description = "Email or NIC belongs to another user", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody,
) -> Result<Json<UserResponse>> {
    let id = parse_id("user", &id)?;
    let request: UserUpdate = validate_into(UserUpdate::FIELDS, body)?;

    let password_hash = match request.password {
        Some(password) => Some(hash_password(state.password_params, password).await?),
        None => None,
    };

    let user = Users::new(state.store.as_ref())
        .update(
            id,
            &UserUpdateDBRequest {
                profile: request.profile,
                password_hash,
            },
        )
        .await
        .map_err(not_found_as("User", id))?;

    Ok(Json(user.into()))
}

#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "users",
    summary = "Delete a user",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 400, description = "Malformed ID", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn delete_user(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<MessageResponse>> {
    let id = parse_id("user", &id)?;

    if !Users::new(state.store.as_ref()).delete(id).await? {
        return Err(Error::NotFound {
            resource: "User".to_string(),
            id: id.to_string(),
        });
    }

    Ok(Json(MessageResponse::new("User deleted successfully")))
}
