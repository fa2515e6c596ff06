use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::auth::{LoginResponse, RegisterResponse};
use crate::bookings::BookingDoc;
use crate::errors::FieldError;
use crate::validation::{
    CreateBookingRequest, LoginRequest, RegisterRequest, UpdateBookingRequest,
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_token",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::auth::register,
        crate::auth::login,
        crate::bookings::create_booking,
        crate::bookings::list_all_bookings,
        crate::bookings::list_my_bookings,
        crate::bookings::update_booking,
        crate::bookings::delete_booking,
        crate::bookings::upload_booking_image,
    ),
    components(
        schemas(
            RegisterRequest,
            LoginRequest,
            RegisterResponse,
            LoginResponse,
            CreateBookingRequest,
            UpdateBookingRequest,
            BookingDoc,
            FieldError,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "booking")
    )
)]
pub struct ApiDoc;
