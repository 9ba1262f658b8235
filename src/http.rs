use crate::backend::SlotBackend;
use crate::configuration::Configuration;
use crate::error::BookingError;
use crate::notification::{confirmation_message, Notifier};
use crate::types::{CheckIn, Requester, Reservation, ReservationStats, Slot};
use crate::AppState;
use axum::body::Body;
use axum::extract::{Path, Request};
use axum::middleware::{self, Next};
use axum::response::{Html, Response};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use axum::{
    routing::{get, post},
    Router,
};
use chrono::{Days, Local, NaiveDate};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tokio::fs;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, warn};
use validator::Validate;

lazy_static! {
    static ref PHONE_PATTERN: Regex = Regex::new(r"^\+?[0-9][0-9 ()/-]{4,30}$").unwrap();
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
struct BookingRequest {
    #[validate(length(min = 1, max = 200))]
    full_name: String,
    #[validate(length(min = 5, max = 32))]
    phone: String,
    #[validate(email)]
    email: String,
    appointment_date: NaiveDate,
}

impl BookingRequest {
    fn check(&self) -> Result<(), ApiError> {
        self.validate()
            .map_err(|err| ApiError::Validation(err.to_string()))?;
        if self.full_name.trim().is_empty() {
            return Err(ApiError::Validation("full_name: must not be blank".into()));
        }
        if !PHONE_PATTERN.is_match(&self.phone) {
            return Err(ApiError::Validation(
                "phone: not a valid phone number".into(),
            ));
        }
        Ok(())
    }

    fn requester(self) -> Requester {
        Requester {
            full_name: self.full_name.trim().to_string(),
            phone: self.phone,
            email: self.email,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CheckInRequest {
    reservation_id: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CheckInResponse {
    reservation_id: i32,
    outcome: CheckIn,
}

#[derive(Debug, Error)]
enum ApiError {
    #[error(transparent)]
    Booking(#[from] BookingError),
    #[error("Invalid booking request: {0}")]
    Validation(String),
    #[error("{0} is outside the bookable window")]
    DateOutsideWindow(NaiveDate),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Booking(BookingError::NoCapacity { .. }) => StatusCode::CONFLICT,
            ApiError::Booking(BookingError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Booking(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::DateOutsideWindow(_) => StatusCode::BAD_REQUEST,
        };

        if status.is_server_error() {
            error!(err = %self, "Request failed");
        } else {
            debug!(err = %self, "Request rejected");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn create_app<T: SlotBackend, C: Configuration>(
    backend: T,
    configuration: C,
    notifier: Arc<dyn Notifier>,
) -> Router {
    let state = AppState {
        backend,
        configuration,
        notifier,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let public = Router::new()
        .route("/health", get(health))
        .route("/frontend", get(get_frontend::<T, C>))
        .route("/dates", get(get_dates::<T, C>))
        .route("/slots/:date", get(get_slots::<T, C>))
        .route("/book", post(book_slot::<T, C>));

    let admin = Router::new()
        .route("/admin", get(get_stats::<T, C>))
        .route("/admin/reservations/:date", get(get_reservations::<T, C>))
        .route("/check_in", post(check_in::<T, C>))
        .route("/remove_all", post(remove_all::<T, C>))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            admin_auth::<T, C>,
        ));

    Router::new()
        .merge(public)
        .merge(admin)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

async fn admin_auth<T: SlotBackend, C: Configuration>(
    State(state): State<AppState<T, C>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, (StatusCode, String)> {
    let Some(auth_header) = request.headers().get("x-admin-password") else {
        return Err((StatusCode::UNAUTHORIZED, "Missing credentials".to_string()));
    };
    if auth_header.to_str().unwrap_or("") != state.configuration.password() {
        warn!("Rejected admin request with wrong password");
        return Err((StatusCode::UNAUTHORIZED, "Unauthorized".to_string()));
    }
    Ok(next.run(request).await)
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "healthy" }))
}

async fn get_dates<T: SlotBackend, C: Configuration>(
    State(state): State<AppState<T, C>>,
) -> Json<Vec<NaiveDate>> {
    let today = today();
    let dates = (1..=state.configuration.booking_window_days())
        .filter_map(|offset| today.checked_add_days(Days::new(offset.into())))
        .collect();
    Json(dates)
}

async fn get_slots<T: SlotBackend, C: Configuration>(
    State(state): State<AppState<T, C>>,
    Path(date): Path<NaiveDate>,
) -> Result<Json<Vec<Slot>>, ApiError> {
    Ok(Json(state.backend.slots(date)?))
}

async fn book_slot<T: SlotBackend, C: Configuration>(
    State(state): State<AppState<T, C>>,
    Json(booking): Json<BookingRequest>,
) -> Result<(StatusCode, Json<Reservation>), ApiError> {
    booking.check()?;

    let date = booking.appointment_date;
    let today = today();
    let last_bookable = today
        .checked_add_days(Days::new(state.configuration.booking_window_days().into()))
        .unwrap_or(NaiveDate::MAX);
    if date < today || date > last_bookable {
        return Err(ApiError::DateOutsideWindow(date));
    }

    let reservation = state.backend.assign_booking(
        date,
        booking.requester(),
        &state.configuration.slot_config(),
    )?;

    let message = confirmation_message(&state.configuration.service_name(), &reservation);
    if let Err(err) = state.notifier.send_confirmation(&reservation, &message) {
        warn!(?err, reservation_id = reservation.id, "Confirmation was not delivered");
    }

    Ok((StatusCode::CREATED, Json(reservation)))
}

async fn get_stats<T: SlotBackend, C: Configuration>(
    State(state): State<AppState<T, C>>,
) -> Result<Json<ReservationStats>, ApiError> {
    Ok(Json(state.backend.reservation_stats(today())?))
}

async fn get_reservations<T: SlotBackend, C: Configuration>(
    State(state): State<AppState<T, C>>,
    Path(date): Path<NaiveDate>,
) -> Result<Json<Vec<Reservation>>, ApiError> {
    Ok(Json(state.backend.reservations(date)?))
}

async fn check_in<T: SlotBackend, C: Configuration>(
    State(state): State<AppState<T, C>>,
    Json(request): Json<CheckInRequest>,
) -> Result<Json<CheckInResponse>, ApiError> {
    let outcome = state.backend.check_in(request.reservation_id)?;
    Ok(Json(CheckInResponse {
        reservation_id: request.reservation_id,
        outcome,
    }))
}

async fn remove_all<T: SlotBackend, C: Configuration>(
    State(state): State<AppState<T, C>>,
) -> Result<impl IntoResponse, ApiError> {
    state.backend.remove_all()?;
    Ok((
        StatusCode::OK,
        "All slots and reservations removed successfully".to_string(),
    ))
}

async fn get_frontend<T: SlotBackend, C: Configuration>(
    State(state): State<AppState<T, C>>,
) -> Result<Html<String>, (StatusCode, String)> {
    let path = state.configuration.frontend_path();

    match fs::read_to_string(&path).await {
        Ok(contents) => Ok(Html(contents)),
        Err(err) => {
            error!(?err, ?path, "Failed to read frontend file");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to read frontend file: {err}"),
            ))
        }
    }
}
