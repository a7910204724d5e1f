use axum::{
    Json, Router,
    extract::State,
    routing::{get, put},
};

use crate::{
    dto::bmi::{BmiResult, Recommendations, UpdateBmiRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::bmi_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/bmi", put(update_bmi))
        .route("/recommendations", get(recommendations))
}

#[utoipa::path(
    put,
    path = "/api/me/bmi",
    request_body = UpdateBmiRequest,
    responses(
        (status = 200, description = "BMI stored", body = ApiResponse<BmiResult>),
        (status = 400, description = "Invalid height or weight")
    ),
    tag = "Me"
)]
pub async fn update_bmi(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<UpdateBmiRequest>,
) -> AppResult<Json<ApiResponse<BmiResult>>> {
    let resp = bmi_service::update_bmi(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/me/recommendations",
    responses(
        (status = 200, description = "Products for the caller's BMI category", body = ApiResponse<Recommendations>)
    ),
    tag = "Me"
)]
pub async fn recommendations(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<Recommendations>>> {
    let resp = bmi_service::recommendations(&state, &user).await?;
    Ok(Json(resp))
}
