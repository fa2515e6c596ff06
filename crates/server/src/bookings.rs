//! `/booking` handlers.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use models::booking::Model as Booking;
use service::booking::errors::BookingError;

use crate::auth::{CallerId, ServerState};
use crate::errors::ApiError;
use crate::validation::{
    validate_create_booking, validate_update_booking, CreateBookingRequest, UpdateBookingRequest,
};

/// Create a booking owned by the caller.
#[utoipa::path(
    post,
    path = "/booking",
    tag = "booking",
    request_body = CreateBookingRequest,
    security(("bearer_token" = [])),
    responses(
        (status = 201, description = "Booking created", body = BookingDoc),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Missing or invalid token"),
    )
)]
pub async fn create_booking(
    State(state): State<ServerState>,
    CallerId(caller): CallerId,
    Json(req): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<Booking>), ApiError> {
    let fields = validate_create_booking(req)?;
    let booking = state.bookings.create(caller, fields).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

/// Public catalogue of all bookings.
#[utoipa::path(
    get,
    path = "/booking",
    tag = "booking",
    responses((status = 200, description = "All bookings", body = [BookingDoc]))
)]
pub async fn list_all_bookings(
    State(state): State<ServerState>,
) -> Result<Json<Vec<Booking>>, ApiError> {
    Ok(Json(state.bookings.list_all().await?))
}

/// Bookings owned by the caller.
#[utoipa::path(
    get,
    path = "/booking/user",
    tag = "booking",
    security(("bearer_token" = [])),
    responses(
        (status = 200, description = "Caller's bookings", body = [BookingDoc]),
        (status = 401, description = "Missing or invalid token"),
    )
)]
pub async fn list_my_bookings(
    State(state): State<ServerState>,
    CallerId(caller): CallerId,
) -> Result<Json<Vec<Booking>>, ApiError> {
    Ok(Json(state.bookings.list_owned(caller).await?))
}

/// Partial update of a booking the caller owns. A booking that does not
/// exist and one owned by someone else produce the same 404.
#[utoipa::path(
    put,
    path = "/booking/{id}",
    tag = "booking",
    request_body = UpdateBookingRequest,
    params(("id" = Uuid, Path, description = "Booking id")),
    security(("bearer_token" = [])),
    responses(
        (status = 200, description = "Updated booking", body = BookingDoc),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Not found or not owned"),
    )
)]
pub async fn update_booking(
    State(state): State<ServerState>,
    CallerId(caller): CallerId,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateBookingRequest>,
) -> Result<Json<Booking>, ApiError> {
    let patch = validate_update_booking(req)?;
    let booking = state.bookings.update(caller, id, &patch).await.map_err(|e| match e {
        BookingError::NotFound => ApiError::NotFound("Booking not found or not updated.".into()),
        other => other.into(),
    })?;
    Ok(Json(booking))
}

/// Hard delete of a booking the caller owns.
#[utoipa::path(
    delete,
    path = "/booking/{id}",
    tag = "booking",
    params(("id" = Uuid, Path, description = "Booking id")),
    security(("bearer_token" = [])),
    responses(
        (status = 200, description = "Booking deleted"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Not found or not owned"),
    )
)]
pub async fn delete_booking(
    State(state): State<ServerState>,
    CallerId(caller): CallerId,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.bookings.delete(caller, id).await.map_err(|e| match e {
        BookingError::NotFound => ApiError::NotFound("Booking not found or not deleted.".into()),
        other => other.into(),
    })?;
    Ok(Json(json!({ "message": "Booking deleted." })))
}

/// Upload a cover image (multipart field `coverImage`) and attach its
/// public URL to the booking.
#[utoipa::path(
    put,
    path = "/booking/{id}/uploadImage",
    tag = "booking",
    params(("id" = Uuid, Path, description = "Booking id")),
    security(("bearer_token" = [])),
    responses(
        (status = 200, description = "Booking with cover image set", body = BookingDoc),
        (status = 400, description = "Missing, oversized or non-image file"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Not found or not owned"),
    )
)]
pub async fn upload_booking_image(
    State(state): State<ServerState>,
    CallerId(caller): CallerId,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<Booking>, ApiError> {
    let mut image: Option<(String, String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("coverImage") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().unwrap_or("").to_string();
        let data = field.bytes().await.map_err(|e| ApiError::BadRequest(e.to_string()))?;
        image = Some((file_name, content_type, data.to_vec()));
        break;
    }

    let (file_name, content_type, data) =
        image.ok_or_else(|| ApiError::BadRequest("No image provided".into()))?;

    let url = state.blob_store.put_image(&file_name, &content_type, &data).await?;
    info!(booking_id = %id, url = %url, "cover image uploaded");

    match state.bookings.attach_image(caller, id, &url).await {
        Ok(booking) => Ok(Json(booking)),
        Err(BookingError::NotFound) => {
            // The object was stored before the ownership check matched
            // nothing; remove it rather than leave it orphaned
            if let Err(e) = state.blob_store.delete_image(&url).await {
                warn!(url = %url, error = %e, "failed to remove unattached image");
            }
            Err(ApiError::NotFound("Booking not found or not updated.".into()))
        }
        Err(other) => Err(other.into()),
    }
}

/// OpenAPI-only mirror of the booking wire shape. The live payload is the
/// persistence model itself, which utoipa cannot derive for.
#[derive(serde::Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(as = Booking)]
pub struct BookingDoc {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub start_date: String,
    pub end_date: String,
    pub price: f64,
    pub location: String,
    pub cover_image: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}
