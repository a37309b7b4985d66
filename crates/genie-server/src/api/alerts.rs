use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use genie_db::{NewPriceAlert, PriceAlertRow};

use crate::middleware::{RequestId, UserId};

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct CreateAlertBody {
    pub product_id: String,
    pub platform: String,
    pub target_price: i64,
}

#[derive(Debug, Serialize)]
pub(super) struct CreatedData {
    pub id: i64,
}

/// Creates a price-drop alert on a product's platform quote.
///
/// The alert's `current_price` is resolved from the catalog at creation
/// time; the quote must exist but need not be in stock (a restock at the
/// right price should still trigger).
pub(super) async fn create_alert(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(UserId(user_id)): Extension<UserId>,
    Json(body): Json<CreateAlertBody>,
) -> Result<Json<ApiResponse<CreatedData>>, ApiError> {
    if body.target_price < 0 {
        return Err(ApiError::new(
            req_id.0.clone(),
            "validation_error",
            "target_price must not be negative",
        ));
    }

    let platform = body.platform.parse::<genie_core::Platform>().map_err(|e| {
        ApiError::new(req_id.0.clone(), "validation_error", e.to_string())
    })?;

    let product = state
        .catalog
        .iter()
        .find(|p| p.id == body.product_id)
        .ok_or_else(|| {
            ApiError::new(req_id.0.clone(), "validation_error", "unknown product id")
        })?;

    let quote = product.quote_for(platform).ok_or_else(|| {
        ApiError::new(
            req_id.0.clone(),
            "validation_error",
            "product has no quote on that platform",
        )
    })?;

    let alert = NewPriceAlert {
        product_id: &product.id,
        product_name: &product.name,
        product_image: &product.image_url,
        platform,
        target_price: body.target_price,
        current_price: quote.price,
    };

    let id = genie_db::insert_price_alert(&state.pool, user_id, &alert)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: CreatedData { id },
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn list_alerts(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(UserId(user_id)): Extension<UserId>,
) -> Result<Json<ApiResponse<Vec<PriceAlertRow>>>, ApiError> {
    let alerts = genie_db::list_price_alerts(&state.pool, user_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: alerts,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn remove_alert(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(UserId(user_id)): Extension<UserId>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    genie_db::delete_price_alert(&state.pool, id, user_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: (),
        meta: ResponseMeta::new(req_id.0),
    }))
}
