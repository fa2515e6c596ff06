use async_trait::async_trait;
use models::booking::{BookingPatch, Model as Booking, NewBooking};
use uuid::Uuid;

use super::errors::BookingError;

/// Repository abstraction for booking persistence.
///
/// `update_owned`, `delete_owned`, and `set_cover_image_owned` must execute
/// as one conditional statement filtered on `(id, owner_id)` and return the
/// rows affected; zero rows is the only ownership signal exposed.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn create(&self, owner_id: Uuid, fields: NewBooking) -> Result<Booking, BookingError>;
    async fn list_all(&self) -> Result<Vec<Booking>, BookingError>;
    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Booking>, BookingError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>, BookingError>;

    async fn update_owned(
        &self,
        id: Uuid,
        owner_id: Uuid,
        patch: &BookingPatch,
    ) -> Result<u64, BookingError>;
    async fn delete_owned(&self, id: Uuid, owner_id: Uuid) -> Result<u64, BookingError>;
    async fn set_cover_image_owned(
        &self,
        id: Uuid,
        owner_id: Uuid,
        url: &str,
    ) -> Result<u64, BookingError>;
}

/// In-memory mock repository for tests; reproduces the conditional-mutation
/// contract (rows affected, last-writer-wins) over a Vec.
pub mod mock {
    use super::*;
    use chrono::Utc;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockBookingRepository {
        bookings: Mutex<Vec<Booking>>,
    }

    fn apply_patch(b: &mut Booking, patch: &BookingPatch) {
        if let Some(t) = &patch.title {
            b.title = t.trim().to_string();
        }
        if let Some(d) = &patch.description {
            b.description = Some(d.clone());
        }
        if let Some(s) = patch.start_date {
            b.start_date = s;
        }
        if let Some(e) = patch.end_date {
            b.end_date = e;
        }
        if let Some(p) = patch.price {
            b.price = p;
        }
        if let Some(l) = &patch.location {
            b.location = l.trim().to_string();
        }
        if let Some(c) = &patch.cover_image {
            b.cover_image = Some(c.clone());
        }
        b.updated_at = Utc::now().into();
    }

    #[async_trait]
    impl BookingRepository for MockBookingRepository {
        async fn create(
            &self,
            owner_id: Uuid,
            fields: NewBooking,
        ) -> Result<Booking, BookingError> {
            models::booking::validate_title(&fields.title)?;
            if let Some(d) = &fields.description {
                models::booking::validate_description(d)?;
            }
            models::booking::validate_location(&fields.location)?;
            models::booking::validate_price(fields.price)?;

            let now = Utc::now().into();
            let booking = Booking {
                id: Uuid::new_v4(),
                owner_id,
                title: fields.title.trim().to_string(),
                description: fields.description,
                start_date: fields.start_date,
                end_date: fields.end_date,
                price: fields.price,
                location: fields.location.trim().to_string(),
                cover_image: fields.cover_image,
                created_at: now,
                updated_at: now,
            };
            self.bookings.lock().unwrap().push(booking.clone());
            Ok(booking)
        }

        async fn list_all(&self) -> Result<Vec<Booking>, BookingError> {
            Ok(self.bookings.lock().unwrap().clone())
        }

        async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Booking>, BookingError> {
            Ok(self
                .bookings
                .lock()
                .unwrap()
                .iter()
                .filter(|b| b.owner_id == owner_id)
                .cloned()
                .collect())
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>, BookingError> {
            Ok(self.bookings.lock().unwrap().iter().find(|b| b.id == id).cloned())
        }

        async fn update_owned(
            &self,
            id: Uuid,
            owner_id: Uuid,
            patch: &BookingPatch,
        ) -> Result<u64, BookingError> {
            // Same validation the real store runs before touching a row
            if let Some(t) = &patch.title {
                models::booking::validate_title(t)?;
            }
            if let Some(d) = &patch.description {
                models::booking::validate_description(d)?;
            }
            if let Some(l) = &patch.location {
                models::booking::validate_location(l)?;
            }
            if let Some(p) = patch.price {
                models::booking::validate_price(p)?;
            }
            let mut bookings = self.bookings.lock().unwrap();
            match bookings.iter_mut().find(|b| b.id == id && b.owner_id == owner_id) {
                Some(b) => {
                    apply_patch(b, patch);
                    Ok(1)
                }
                None => Ok(0),
            }
        }

        async fn delete_owned(&self, id: Uuid, owner_id: Uuid) -> Result<u64, BookingError> {
            let mut bookings = self.bookings.lock().unwrap();
            let before = bookings.len();
            bookings.retain(|b| !(b.id == id && b.owner_id == owner_id));
            Ok((before - bookings.len()) as u64)
        }

        async fn set_cover_image_owned(
            &self,
            id: Uuid,
            owner_id: Uuid,
            url: &str,
        ) -> Result<u64, BookingError> {
            let mut bookings = self.bookings.lock().unwrap();
            match bookings.iter_mut().find(|b| b.id == id && b.owner_id == owner_id) {
                Some(b) => {
                    b.cover_image = Some(url.to_string());
                    b.updated_at = Utc::now().into();
                    Ok(1)
                }
                None => Ok(0),
            }
        }
    }
}
