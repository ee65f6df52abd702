//! Handlers for the `/auth` resource (register, login).

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use cinelog_core::error::CoreError;
use cinelog_core::types::UserId;
use cinelog_core::validation::is_valid_username;
use cinelog_db::models::user::CreateUser;
use cinelog_db::repositories::UserRepo;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::jwt::generate_access_token;
use crate::auth::password::{hash_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Unique constraint on `users.username`.
const USERNAME_CONSTRAINT: &str = "uq_users_username";

/// Reported for an unknown user and a wrong password alike.
const BAD_CREDENTIALS: &str = "incorrect username or password";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register` and `POST /auth/login`.
#[derive(Debug, Deserialize, Validate)]
pub struct Credentials {
    #[validate(length(min = 5, max = 40))]
    pub username: String,
    #[validate(length(min = 8, max = 30))]
    pub password: String,
}

impl Credentials {
    fn check(&self) -> AppResult<()> {
        self.validate()?;
        if !is_valid_username(&self.username) {
            return Err(CoreError::validation(
                "username",
                "may only contain letters, digits and underscores",
            )
            .into());
        }
        Ok(())
    }
}

/// Public view of a newly registered user.
#[derive(Debug, Serialize)]
pub struct RegisteredUser {
    pub id: UserId,
    pub username: String,
}

/// Successful login response.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/register
///
/// Create an account. Usernames are unique and case-sensitive.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<Credentials>,
) -> AppResult<impl IntoResponse> {
    input.check()?;

    if UserRepo::find_by_username(&state.pool, &input.username)
        .await?
        .is_some()
    {
        return Err(username_taken());
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let create = CreateUser {
        username: input.username,
        password_hash,
    };
    let user = match UserRepo::create(&state.pool, &create).await {
        Ok(user) => user,
        // Lost a race with a concurrent registration.
        Err(sqlx::Error::Database(db_err)) if db_err.constraint() == Some(USERNAME_CONSTRAINT) => {
            return Err(username_taken());
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(user_id = %user.id, username = %user.username, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: RegisteredUser {
                id: user.id,
                username: user.username,
            },
        }),
    ))
}

/// POST /api/v1/auth/login
///
/// Authenticate with username + password. Returns a bearer access token.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<Credentials>,
) -> AppResult<Json<DataResponse<TokenResponse>>> {
    input.check()?;

    let user = UserRepo::find_by_username(&state.pool, &input.username)
        .await?
        .ok_or_else(bad_credentials)?;

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        return Err(bad_credentials());
    }

    let jwt = &state.config.jwt;
    let access_token = generate_access_token(user.id, &user.username, jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(DataResponse {
        data: TokenResponse {
            access_token,
            token_type: "Bearer",
            expires_in: jwt.access_token_expiry_mins * 60,
        },
    }))
}

fn username_taken() -> AppError {
    CoreError::validation("username", "username already taken").into()
}

fn bad_credentials() -> AppError {
    CoreError::validation("password", BAD_CREDENTIALS).into()
}
