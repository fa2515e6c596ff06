//! Booking module: ownership-scoped CRUD behind a repository trait.
//!
//! Mutations never check ownership with a separate read; the repository
//! runs a single conditional statement and reports rows affected.

pub mod errors;
pub mod repo;
pub mod repository;
pub mod service;

pub use service::BookingService;
