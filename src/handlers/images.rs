use axum::{
    extract::{Query, State},
    response::Json,
};

use crate::{
    errors::Result,
    handlers::AppState,
    middleware::auth::AuthenticatedUser,
    models::{GenerateRequest, GenerateResponse, GenerationStyle, MyImagesParams, MyImagesResponse},
};

pub async fn generate(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>> {
    let style: GenerationStyle = request.style.parse()?;
    let image_urls = state.generator.generate(user.id, &request.prompt, style).await?;

    Ok(Json(GenerateResponse { image_urls }))
}

pub async fn my_images(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(params): Query<MyImagesParams>,
) -> Result<Json<MyImagesResponse>> {
    let limit = params.limit.unwrap_or(20).clamp(1, 100);
    let offset = params.offset.unwrap_or(0).max(0);

    // `total` is the day's count, not the page size: the client reads it as
    // its quota indicator.
    let usage = state.generator.usage_today(user.id).await?;
    let images = state.generator.list_for_user(user.id, limit, offset).await?;

    Ok(Json(MyImagesResponse {
        total: usage.count,
        images,
    }))
}
