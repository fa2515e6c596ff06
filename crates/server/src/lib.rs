pub mod auth;
pub mod bookings;
pub mod errors;
pub mod openapi;
pub mod rate_limit;
pub mod routes;
pub mod startup;
pub mod validation;

pub use startup::run;
