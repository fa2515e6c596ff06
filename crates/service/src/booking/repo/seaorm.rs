use models::booking::{BookingPatch, Model as Booking, NewBooking};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::booking::errors::BookingError;
use crate::booking::repository::BookingRepository;

/// SeaORM-backed repository implementation.
pub struct SeaOrmBookingRepository {
    pub db: DatabaseConnection,
}

#[async_trait::async_trait]
impl BookingRepository for SeaOrmBookingRepository {
    async fn create(&self, owner_id: Uuid, fields: NewBooking) -> Result<Booking, BookingError> {
        Ok(models::booking::create(&self.db, owner_id, fields).await?)
    }

    async fn list_all(&self) -> Result<Vec<Booking>, BookingError> {
        Ok(models::booking::list_all(&self.db).await?)
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Booking>, BookingError> {
        Ok(models::booking::list_by_owner(&self.db, owner_id).await?)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>, BookingError> {
        Ok(models::booking::find_by_id(&self.db, id).await?)
    }

    async fn update_owned(
        &self,
        id: Uuid,
        owner_id: Uuid,
        patch: &BookingPatch,
    ) -> Result<u64, BookingError> {
        Ok(models::booking::update_owned(&self.db, id, owner_id, patch).await?)
    }

    async fn delete_owned(&self, id: Uuid, owner_id: Uuid) -> Result<u64, BookingError> {
        Ok(models::booking::delete_owned(&self.db, id, owner_id).await?)
    }

    async fn set_cover_image_owned(
        &self,
        id: Uuid,
        owner_id: Uuid,
        url: &str,
    ) -> Result<u64, BookingError> {
        Ok(models::booking::set_cover_image_owned(&self.db, id, owner_id, url).await?)
    }
}
