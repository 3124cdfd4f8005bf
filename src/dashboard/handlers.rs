use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tracing::{info, instrument};

use crate::{
    dashboard::services::DashboardLoad, error::AuthError, state::AppState, ui::Notice,
};

pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(show))
        .route("/dashboard/pathways/:id", get(details))
        .route("/dashboard/pathways/:id/enroll", post(enroll))
}

#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> Response {
    match state.dashboard.load().await {
        DashboardLoad::Ready(view) => Json(view).into_response(),
        DashboardLoad::Redirect(redirect) => {
            info!(to = redirect.to.path(), "no session, leaving dashboard");
            Json(json!({ "redirect": redirect })).into_response()
        }
    }
}

#[instrument(skip(state))]
pub async fn enroll(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Notice>, AuthError> {
    Ok(Json(state.dashboard.enroll(&id).await?))
}

#[instrument(skip(state))]
pub async fn details(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Notice>, AuthError> {
    Ok(Json(state.dashboard.pathway_details(&id).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    #[tokio::test]
    async fn dashboard_without_session_points_to_auth() {
        let app = dashboard_routes().with_state(AppState::fake());
        let res = app
            .oneshot(Request::get("/dashboard").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["redirect"]["to"], json!("auth.html"));
    }

    #[tokio::test]
    async fn unknown_pathway_is_not_found() {
        let app = dashboard_routes().with_state(AppState::fake());
        let res = app
            .oneshot(
                Request::post("/dashboard/pathways/missing/enroll")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
