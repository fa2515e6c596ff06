use std::sync::Arc;

use models::booking::{BookingPatch, Model as Booking, NewBooking};
use tracing::{info, instrument};
use uuid::Uuid;

use super::errors::BookingError;
use super::repository::BookingRepository;

/// Application service encapsulating booking business rules.
/// Ownership is enforced by the repository's conditional mutations;
/// this layer turns "zero rows affected" into `NotFound`.
pub struct BookingService<R: BookingRepository> {
    repo: Arc<R>,
}

impl<R: BookingRepository> BookingService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    #[instrument(skip(self, fields), fields(caller = %caller))]
    pub async fn create(&self, caller: Uuid, fields: NewBooking) -> Result<Booking, BookingError> {
        let booking = self.repo.create(caller, fields).await?;
        info!(booking_id = %booking.id, owner_id = %booking.owner_id, "booking_created");
        Ok(booking)
    }

    /// Public listing; no auth required.
    pub async fn list_all(&self) -> Result<Vec<Booking>, BookingError> {
        self.repo.list_all().await
    }

    pub async fn list_owned(&self, caller: Uuid) -> Result<Vec<Booking>, BookingError> {
        self.repo.list_by_owner(caller).await
    }

    /// Partial update: only fields present in the patch are written, always
    /// re-validated. Returns the updated record; `NotFound` when the id does
    /// not exist or belongs to someone else.
    #[instrument(skip(self, patch), fields(caller = %caller, booking_id = %id))]
    pub async fn update(
        &self,
        caller: Uuid,
        id: Uuid,
        patch: &BookingPatch,
    ) -> Result<Booking, BookingError> {
        let affected = self.repo.update_owned(id, caller, patch).await?;
        if affected == 0 {
            return Err(BookingError::NotFound);
        }
        self.repo.find_by_id(id).await?.ok_or(BookingError::NotFound)
    }

    /// Hard delete, ownership-scoped.
    #[instrument(skip(self), fields(caller = %caller, booking_id = %id))]
    pub async fn delete(&self, caller: Uuid, id: Uuid) -> Result<(), BookingError> {
        let affected = self.repo.delete_owned(id, caller).await?;
        if affected == 0 {
            return Err(BookingError::NotFound);
        }
        info!(booking_id = %id, "booking_deleted");
        Ok(())
    }

    /// Attach an already-uploaded image URL to the caller's booking.
    #[instrument(skip(self, image_ref), fields(caller = %caller, booking_id = %id))]
    pub async fn attach_image(
        &self,
        caller: Uuid,
        id: Uuid,
        image_ref: &str,
    ) -> Result<Booking, BookingError> {
        if image_ref.trim().is_empty() {
            return Err(BookingError::Validation("image reference required".into()));
        }
        let affected = self.repo.set_cover_image_owned(id, caller, image_ref).await?;
        if affected == 0 {
            return Err(BookingError::NotFound);
        }
        self.repo.find_by_id(id).await?.ok_or(BookingError::NotFound)
    }
}
