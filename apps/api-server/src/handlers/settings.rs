//! API key settings.

use actix_web::{HttpResponse, web};

use scriptorium_core::ports::ApiKey;
use scriptorium_shared::dto::{SettingsRequest, SettingsResponse};

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /api/settings - whether a key is configured, never the key itself.
pub async fn get_settings(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let key = state
        .credentials
        .get_active_key()
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(HttpResponse::Ok().json(SettingsResponse {
        has_api_key: key.is_some(),
    }))
}

/// POST /api/settings
pub async fn update_settings(
    state: web::Data<AppState>,
    body: web::Json<SettingsRequest>,
) -> AppResult<HttpResponse> {
    let api_key = body.into_inner().api_key.trim().to_string();
    if api_key.is_empty() {
        return Err(AppError::Validation(vec!["api_key must not be empty".to_string()]));
    }

    state
        .credentials
        .set_active_key(ApiKey::new(api_key))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(HttpResponse::Ok().json(SettingsResponse { has_api_key: true }))
}
