use crate::registration::{Candidate, RegisterError, Registrar};
use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};
use utoipa::ToSchema;

pub const MSG_REGISTERED: &str = "User registered successfully";
pub const MSG_MISSING_FIELDS: &str = "All fields are required";
pub const MSG_ALREADY_REGISTERED: &str = "Username or email already registered";
pub const MSG_INVALID_BODY: &str = "Invalid request body";
pub const MSG_SERVER_ERROR: &str = "Server error";
pub const MSG_REGISTER_FAILED: &str = "Error registering user";

#[derive(ToSchema, Serialize, Deserialize, Default)]
pub struct UserRegister {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl std::fmt::Debug for UserRegister {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserRegister")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RegisterResponse {
    pub message: String,
}

fn reply(status: StatusCode, message: &str) -> (StatusCode, Json<RegisterResponse>) {
    (
        status,
        Json(RegisterResponse {
            message: message.to_string(),
        }),
    )
}

#[utoipa::path(
    post,
    path= "/register",
    request_body = UserRegister,
    responses (
        (status = 200, description = "Registration successful", body = RegisterResponse, content_type = "application/json"),
        (status = 400, description = "Missing fields, or username/email already registered", body = RegisterResponse),
        (status = 500, description = "Database error", body = RegisterResponse),
    ),
    tag= "register"
)]
#[instrument(skip(registrar, payload))]
pub async fn register(
    registrar: Extension<Registrar>,
    payload: Result<Json<UserRegister>, JsonRejection>,
) -> impl IntoResponse {
    let user: UserRegister = match payload {
        Ok(Json(payload)) => payload,
        Err(rejection) => {
            warn!("Rejected registration payload: {}", rejection.body_text());
            return reply(StatusCode::BAD_REQUEST, MSG_INVALID_BODY);
        }
    };

    debug!("user: {:?}", user);

    let candidate = match Candidate::from_fields(
        user.username,
        user.email,
        user.password.map(SecretString::from),
    ) {
        Ok(candidate) => candidate,
        Err(err) => return error_reply(&err),
    };

    match registrar.register(candidate).await {
        Ok(id) => {
            info!(user_id = id, "User registered");
            reply(StatusCode::OK, MSG_REGISTERED)
        }
        Err(err) => error_reply(&err),
    }
}

fn error_reply(err: &RegisterError) -> (StatusCode, Json<RegisterResponse>) {
    match err {
        RegisterError::MissingFields => reply(StatusCode::BAD_REQUEST, MSG_MISSING_FIELDS),
        RegisterError::AlreadyRegistered => {
            debug!("User already registered");
            reply(StatusCode::BAD_REQUEST, MSG_ALREADY_REGISTERED)
        }
        RegisterError::Lookup(source) => {
            error!("Error checking if user exists: {:?}", source);
            reply(StatusCode::INTERNAL_SERVER_ERROR, MSG_SERVER_ERROR)
        }
        RegisterError::Hash(reason) => {
            error!("Error hashing password: {}", reason);
            reply(StatusCode::INTERNAL_SERVER_ERROR, MSG_REGISTER_FAILED)
        }
        RegisterError::Insert(source) => {
            error!("Error inserting user: {:?}", source);
            reply(StatusCode::INTERNAL_SERVER_ERROR, MSG_REGISTER_FAILED)
        }
    }
}
