use axum::{
    extract::{DefaultBodyLimit, Query, State},
    routing::{get, post},
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{
            AuthResponse, GateQuery, GateResponse, LoginForm, LogoutResponse, PublicUser,
            SignupRequest, StrengthRequest,
        },
        image::ProfileUpload,
        services::AuthSuccess,
        validate::{password_strength, PasswordStrength},
    },
    error::AuthError,
    state::AppState,
    ui::Page,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route(
            "/auth/signup",
            post(signup).layer(DefaultBodyLimit::max(16 * 1024 * 1024)), // base64 pictures
        )
        .route("/auth/logout", post(logout))
        .route("/auth/password-strength", post(strength))
}

pub fn session_routes() -> Router<AppState> {
    Router::new().route("/session", get(session_gate))
}

fn respond(ok: AuthSuccess) -> Json<AuthResponse> {
    Json(AuthResponse {
        user: PublicUser::from(&ok.user),
        notice: ok.notice,
        redirect: ok.redirect,
    })
}

#[instrument(skip(state, form))]
pub async fn login(
    State(state): State<AppState>,
    Json(form): Json<LoginForm>,
) -> Result<Json<AuthResponse>, AuthError> {
    let ok = state.auth.login(form).await?;
    Ok(respond(ok))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<Json<AuthResponse>, AuthError> {
    let SignupRequest {
        mut form,
        profile_picture,
    } = payload;

    if let Some(picture) = profile_picture {
        let body = STANDARD.decode(picture.data_base64.as_bytes()).map_err(|e| {
            warn!(error = %e, "profile picture is not valid base64");
            state.auth.reject(AuthError::InvalidImage)
        })?;
        form.attach_picture(ProfileUpload::new(picture.content_type, body))
            .map_err(|e| state.auth.reject(e))?;
    }

    let ok = state.auth.signup(form).await?;
    Ok(respond(ok))
}

#[instrument(skip(state))]
pub async fn logout(State(state): State<AppState>) -> Json<LogoutResponse> {
    Json(LogoutResponse {
        redirect: state.auth.logout(),
    })
}

pub async fn strength(Json(req): Json<StrengthRequest>) -> Json<PasswordStrength> {
    Json(password_strength(&req.password))
}

#[instrument(skip(state))]
pub async fn session_gate(
    State(state): State<AppState>,
    Query(q): Query<GateQuery>,
) -> Result<Json<GateResponse>, AuthError> {
    let page = Page::from_path(&q.page)
        .ok_or_else(|| AuthError::validation(format!("Unknown page: {}", q.page)))?;
    let gate = state.auth.check_session(page);
    if let Some(r) = &gate.redirect {
        info!(to = r.to.path(), "session present, redirecting");
    }
    Ok(Json(GateResponse {
        authenticated: gate.user.is_some(),
        user: gate.user.as_ref().map(PublicUser::from),
        redirect: gate.redirect,
    }))
}
