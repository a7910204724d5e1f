use sea_orm::{ActiveModelTrait, EntityTrait, Set};

use crate::{
    domain::bmi::{compute_bmi, recommended_category},
    dto::bmi::{BmiResult, Recommendations, UpdateBmiRequest},
    entity::users::{ActiveModel as UserActive, Entity as Users},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    response::{ApiResponse, Meta},
    services::product_service::products_in_category,
    state::AppState,
};

pub async fn update_bmi(
    state: &AppState,
    user: &AuthUser,
    payload: UpdateBmiRequest,
) -> AppResult<ApiResponse<BmiResult>> {
    let bmi = compute_bmi(payload.height, payload.weight)?;

    let existing = Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::NotFound("User".into()))?;

    let mut active: UserActive = existing.into();
    active.height = Set(Some(payload.height));
    active.weight = Set(Some(payload.weight));
    active.bmi = Set(Some(bmi));
    active.update(&state.orm).await?;

    tracing::debug!(user_id = %user.user_id, bmi, "bmi updated");

    Ok(ApiResponse::success(
        "BMI updated",
        BmiResult {
            bmi,
            category: recommended_category(bmi),
        },
        Some(Meta::empty()),
    ))
}

pub async fn recommendations(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<Recommendations>> {
    let existing = Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::NotFound("User".into()))?;

    let data = match existing.bmi {
        Some(bmi) => {
            let category = recommended_category(bmi);
            Recommendations {
                bmi: Some(bmi),
                category: Some(category),
                products: products_in_category(state, category).await?,
            }
        }
        None => Recommendations {
            bmi: None,
            category: None,
            products: Vec::new(),
        },
    };

    Ok(ApiResponse::success(
        "Recommendations",
        data,
        Some(Meta::empty()),
    ))
}
