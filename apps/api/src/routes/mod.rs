pub mod health;

use axum::{
    routing::{get, patch, post},
    Json, Router,
};
use serde_json::{json, Value};

use crate::auth::{handlers as auth_handlers, oauth};
use crate::bookings::handlers as booking_handlers;
use crate::contact;
use crate::profiles::handlers as profile_handlers;
use crate::state::AppState;
use crate::waitlist;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health::health_handler))
        // Authentication
        .route("/api/auth/register", post(auth_handlers::register))
        .route("/api/auth/login", post(auth_handlers::login))
        .route("/api/auth/me", get(auth_handlers::me))
        .route("/api/auth/oauth/:provider", get(oauth::oauth_authorize))
        .route(
            "/api/auth/oauth/:provider/callback",
            get(oauth::oauth_callback),
        )
        .route(
            "/api/auth/oauth/complete-signup",
            post(oauth::complete_signup),
        )
        // Bookings
        .route(
            "/api/bookings",
            post(booking_handlers::create_booking).get(booking_handlers::list_bookings),
        )
        .route("/api/bookings/my", get(booking_handlers::my_bookings))
        .route(
            "/api/bookings/availability/:date",
            get(booking_handlers::get_availability),
        )
        .route(
            "/api/bookings/:id",
            get(booking_handlers::get_booking).delete(booking_handlers::delete_booking),
        )
        .route(
            "/api/bookings/:id/status",
            patch(booking_handlers::update_booking_status),
        )
        // Employer intelligence
        .route(
            "/api/employer-profiles",
            get(profile_handlers::list_employer_profiles),
        )
        .route(
            "/api/employer-profiles/:id",
            get(profile_handlers::get_employer_profile)
                .patch(profile_handlers::update_employer_profile),
        )
        // Public forms
        .route(
            "/api/waitlist",
            post(waitlist::join_waitlist).get(waitlist::list_waitlist),
        )
        .route("/api/contact", post(contact::create_contact))
        .with_state(state)
}

async fn root_handler() -> Json<Value> {
    Json(json!({"message": "It Works!"}))
}
