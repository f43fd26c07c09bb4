use axum::extract::rejection::JsonRejection;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::debug;

use crate::{
    AppState,
    error::{ApiError, INVALID_REQUEST_PREFIX},
    models::{ApiResponse, BookingRequest, ClassRequest},
    validation::{require_field, validate_capacity},
};

fn decode<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        debug!("Rejected request body: {rejection}");
        ApiError::BadRequest(format!("{INVALID_REQUEST_PREFIX}{}", rejection.body_text()))
    })
}

#[utoipa::path(get, path = "/", tag = "scheduling")]
pub async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "Class Booking API",
        "endpoints": {
            "/classes": "Create a class (POST)",
            "/bookings": "Book a member into a class (POST)"
        }
    }))
}

#[utoipa::path(get, path = "/healthz/live", tag = "scheduling")]
pub async fn healthz_live() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

#[utoipa::path(get, path = "/healthz/ready", tag = "scheduling")]
pub async fn healthz_ready() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

#[utoipa::path(
    post,
    path = "/classes",
    request_body = ClassRequest,
    responses(
        (status = 201, description = "Class created", body = ApiResponse),
        (status = 400, description = "Invalid request or dates", body = ApiResponse),
        (status = 409, description = "Class already exists", body = ApiResponse),
        (status = 500, description = "Internal server error", body = ApiResponse)
    ),
    tag = "scheduling"
)]
pub async fn create_class(
    State(state): State<AppState>,
    payload: Result<Json<ClassRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let req = decode(payload)?;
    let name = require_field("name", &req.name)?;
    let start_date = require_field("start_date", &req.start_date)?;
    let end_date = require_field("end_date", &req.end_date)?;
    let capacity = validate_capacity(req.capacity)?;

    state
        .service
        .create_class(name, start_date, end_date, capacity)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(format!(
            "Class {name} created successfully"
        ))),
    ))
}

#[utoipa::path(
    post,
    path = "/bookings",
    request_body = BookingRequest,
    responses(
        (status = 201, description = "Booking created", body = ApiResponse),
        (status = 400, description = "Invalid request or date outside the class range", body = ApiResponse),
        (status = 404, description = "Class not found", body = ApiResponse),
        (status = 500, description = "Internal server error", body = ApiResponse)
    ),
    tag = "scheduling"
)]
pub async fn create_booking(
    State(state): State<AppState>,
    payload: Result<Json<BookingRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let req = decode(payload)?;
    let class_name = require_field("class_name", &req.class_name)?;
    let member_name = require_field("name", &req.member_name)?;
    let date = require_field("date", &req.date)?;

    state.service.book_class(class_name, member_name, date)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(format!(
            "Booking created for {member_name} on {date} for class {class_name}"
        ))),
    ))
}
