//! Typed request bodies with field-level validation.
//!
//! Every field is optional at the serde level so that missing or malformed
//! values surface as entries in the structured 400 error array instead of a
//! transport-level rejection. Each `validate_*` function runs the full rule
//! table for its endpoint and reports every violation at once.

use sea_orm::prelude::DateTimeWithTimeZone;
use serde::Deserialize;

use models::booking::{BookingPatch, NewBooking};
use service::auth::domain::{password_rule_failures, LoginInput, RegisterInput};

use crate::errors::{ApiError, FieldError};

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub price: Option<f64>,
    pub location: Option<String>,
    /// Already-uploaded image URL; the upload itself goes through the
    /// blob-store endpoint.
    pub cover_image: Option<String>,
}

/// Partial update body: absent fields stay untouched. An `id` key in the
/// body is ignored by construction (there is no such field to bind to).
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookingRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub price: Option<f64>,
    pub location: Option<String>,
    pub cover_image: Option<String>,
}

/// Collects per-field violations; `finish` turns a non-empty list into the
/// 400 validation response.
#[derive(Default)]
pub struct FieldChecks {
    errors: Vec<FieldError>,
}

impl FieldChecks {
    pub fn fail(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    pub fn check_model(&mut self, field: &str, res: Result<(), models::errors::ModelError>) {
        if let Err(e) = res {
            self.fail(field, e.to_string());
        }
    }

    pub fn finish(self) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(self.errors))
        }
    }
}

const ISO8601_START: &str =
    "Start date is required and should be in ISO8601 format (e.g., YYYY-MM-DDTHH:mm:ssZ)";
const ISO8601_END: &str =
    "End date is required and should be in ISO8601 format (e.g., YYYY-MM-DDTHH:mm:ssZ)";

fn parse_date(value: &str) -> Option<DateTimeWithTimeZone> {
    chrono::DateTime::parse_from_rfc3339(value).ok()
}

pub fn validate_register(req: RegisterRequest) -> Result<RegisterInput, ApiError> {
    let mut checks = FieldChecks::default();

    let username = req.username.unwrap_or_default();
    checks.check_model("username", models::user::validate_username(&username));

    let email = req.email.unwrap_or_default();
    checks.check_model("email", models::user::validate_email(&email));

    let password = req.password.unwrap_or_default();
    for rule in password_rule_failures(&password) {
        checks.fail("password", rule);
    }

    checks.finish()?;
    Ok(RegisterInput { username: username.trim().to_string(), email, password })
}

pub fn validate_login(req: LoginRequest) -> Result<LoginInput, ApiError> {
    let mut checks = FieldChecks::default();
    let username = req.username.unwrap_or_default();
    if username.trim().is_empty() {
        checks.fail("username", "Username is required");
    }
    let password = req.password.unwrap_or_default();
    if password.is_empty() {
        checks.fail("password", "Password is required");
    }
    checks.finish()?;
    Ok(LoginInput { username: username.trim().to_string(), password })
}

pub fn validate_create_booking(req: CreateBookingRequest) -> Result<NewBooking, ApiError> {
    let mut checks = FieldChecks::default();

    let title = req.title.unwrap_or_default();
    checks.check_model("title", models::booking::validate_title(&title));

    if let Some(d) = &req.description {
        checks.check_model("description", models::booking::validate_description(d));
    }

    let start_date = match req.start_date.as_deref().and_then(parse_date) {
        Some(d) => Some(d),
        None => {
            checks.fail("startDate", ISO8601_START);
            None
        }
    };
    let end_date = match req.end_date.as_deref().and_then(parse_date) {
        Some(d) => Some(d),
        None => {
            checks.fail("endDate", ISO8601_END);
            None
        }
    };

    let price = req.price.unwrap_or(f64::NAN);
    checks.check_model("price", models::booking::validate_price(price));

    let location = req.location.unwrap_or_default();
    checks.check_model("location", models::booking::validate_location(&location));

    checks.finish()?;
    // finish() returned above when either date failed to parse
    let start_date = start_date.ok_or_else(|| ApiError::BadRequest(ISO8601_START.into()))?;
    let end_date = end_date.ok_or_else(|| ApiError::BadRequest(ISO8601_END.into()))?;
    Ok(NewBooking {
        title,
        description: req.description,
        start_date,
        end_date,
        price,
        location,
        cover_image: req.cover_image,
    })
}

/// Same rule table as create, applied only to fields that are present.
pub fn validate_update_booking(req: UpdateBookingRequest) -> Result<BookingPatch, ApiError> {
    let mut checks = FieldChecks::default();

    if let Some(t) = &req.title {
        checks.check_model("title", models::booking::validate_title(t));
    }
    if let Some(d) = &req.description {
        checks.check_model("description", models::booking::validate_description(d));
    }

    let start_date = match req.start_date.as_deref() {
        Some(raw) => match parse_date(raw) {
            Some(d) => Some(d),
            None => {
                checks.fail("startDate", ISO8601_START);
                None
            }
        },
        None => None,
    };
    let end_date = match req.end_date.as_deref() {
        Some(raw) => match parse_date(raw) {
            Some(d) => Some(d),
            None => {
                checks.fail("endDate", ISO8601_END);
                None
            }
        },
        None => None,
    };

    if let Some(p) = req.price {
        checks.check_model("price", models::booking::validate_price(p));
    }
    if let Some(l) = &req.location {
        checks.check_model("location", models::booking::validate_location(l));
    }

    checks.finish()?;
    Ok(BookingPatch {
        title: req.title,
        description: req.description,
        start_date,
        end_date,
        price: req.price,
        location: req.location,
        cover_image: req.cover_image,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_errors(err: ApiError) -> Vec<FieldError> {
        match err {
            ApiError::Validation(errors) => errors,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn register_reports_every_failed_password_rule() {
        let err = validate_register(RegisterRequest {
            username: Some("alice".into()),
            email: Some("a@x.com".into()),
            password: Some("".into()),
        })
        .unwrap_err();
        let errors = field_errors(err);
        assert_eq!(errors.len(), 5);
        assert!(errors.iter().all(|e| e.field == "password"));
    }

    #[test]
    fn register_reports_missing_fields_per_field() {
        let err = validate_register(RegisterRequest { username: None, email: None, password: None })
            .unwrap_err();
        let errors = field_errors(err);
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"username"));
        assert!(fields.contains(&"email"));
        assert!(fields.contains(&"password"));
    }

    #[test]
    fn register_accepts_valid_input() {
        let input = validate_register(RegisterRequest {
            username: Some("alice".into()),
            email: Some("a@x.com".into()),
            password: Some("Abcd12#!".into()),
        })
        .unwrap();
        assert_eq!(input.username, "alice");
    }

    #[test]
    fn create_booking_requires_dates_in_iso8601() {
        let err = validate_create_booking(CreateBookingRequest {
            title: Some("Concert".into()),
            description: None,
            start_date: Some("tomorrow".into()),
            end_date: None,
            price: Some(50.0),
            location: Some("Hall".into()),
            cover_image: None,
        })
        .unwrap_err();
        let errors = field_errors(err);
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["startDate", "endDate"]);
    }

    #[test]
    fn create_booking_valid_payload_parses() {
        let fields = validate_create_booking(CreateBookingRequest {
            title: Some("Concert".into()),
            description: Some("front row".into()),
            start_date: Some("2025-01-01T00:00:00Z".into()),
            end_date: Some("2025-01-01T03:00:00Z".into()),
            price: Some(50.0),
            location: Some("Hall".into()),
            cover_image: None,
        })
        .unwrap();
        assert_eq!(fields.title, "Concert");
        assert_eq!(fields.price, 50.0);
        assert!(fields.end_date > fields.start_date);
    }

    #[test]
    fn update_booking_allows_sparse_bodies() {
        let patch = validate_update_booking(UpdateBookingRequest {
            title: None,
            description: None,
            start_date: None,
            end_date: None,
            price: Some(75.5),
            location: None,
            cover_image: None,
        })
        .unwrap();
        assert_eq!(patch.price, Some(75.5));
        assert!(patch.title.is_none());
        assert!(patch.start_date.is_none());
    }

    #[test]
    fn update_booking_still_validates_present_fields() {
        let err = validate_update_booking(UpdateBookingRequest {
            title: Some("".into()),
            description: None,
            start_date: None,
            end_date: None,
            price: Some(-5.0),
            location: None,
            cover_image: None,
        })
        .unwrap_err();
        let errors = field_errors(err);
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["title", "price"]);
    }
}
