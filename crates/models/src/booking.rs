use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{entity::prelude::*, DatabaseConnection, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors;
use crate::user;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "booking")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub start_date: DateTimeWithTimeZone,
    pub end_date: DateTimeWithTimeZone,
    pub price: f64,
    pub location: String,
    pub cover_image: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Owner,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Owner => Entity::belongs_to(user::Entity)
                .from(Column::OwnerId)
                .to(user::Column::Id)
                .into(),
        }
    }
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Field values for a new booking; validation runs in `create`.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub title: String,
    pub description: Option<String>,
    pub start_date: DateTimeWithTimeZone,
    pub end_date: DateTimeWithTimeZone,
    pub price: f64,
    pub location: String,
    pub cover_image: Option<String>,
}

/// Partial update: only fields present are written. The booking id and
/// owner are never part of the patch.
#[derive(Debug, Clone, Default)]
pub struct BookingPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<DateTimeWithTimeZone>,
    pub end_date: Option<DateTimeWithTimeZone>,
    pub price: Option<f64>,
    pub location: Option<String>,
    pub cover_image: Option<String>,
}

// Bounds count characters, not bytes; multibyte text within the limit
// must pass.
pub fn validate_title(title: &str) -> Result<(), errors::ModelError> {
    let t = title.trim();
    if t.is_empty() || t.chars().count() > 255 {
        return Err(errors::ModelError::Validation("Title is required (1-255 chars)".into()));
    }
    Ok(())
}

pub fn validate_description(description: &str) -> Result<(), errors::ModelError> {
    if description.chars().count() > 1000 {
        return Err(errors::ModelError::Validation("Description too long (max 1000 chars)".into()));
    }
    Ok(())
}

pub fn validate_location(location: &str) -> Result<(), errors::ModelError> {
    let l = location.trim();
    if l.is_empty() || l.chars().count() > 255 {
        return Err(errors::ModelError::Validation("Location is required (1-255 chars)".into()));
    }
    Ok(())
}

pub fn validate_price(price: f64) -> Result<(), errors::ModelError> {
    if !price.is_finite() || price < 0.0 {
        return Err(errors::ModelError::Validation(
            "Price is required and should be a non-negative number".into(),
        ));
    }
    Ok(())
}

fn validate_patch(patch: &BookingPatch) -> Result<(), errors::ModelError> {
    if let Some(t) = &patch.title {
        validate_title(t)?;
    }
    if let Some(d) = &patch.description {
        validate_description(d)?;
    }
    if let Some(l) = &patch.location {
        validate_location(l)?;
    }
    if let Some(p) = patch.price {
        validate_price(p)?;
    }
    Ok(())
}

pub async fn create(
    db: &DatabaseConnection,
    owner_id: Uuid,
    fields: NewBooking,
) -> Result<Model, errors::ModelError> {
    validate_title(&fields.title)?;
    if let Some(d) = &fields.description {
        validate_description(d)?;
    }
    validate_location(&fields.location)?;
    validate_price(fields.price)?;

    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        owner_id: Set(owner_id),
        title: Set(fields.title.trim().to_string()),
        description: Set(fields.description),
        start_date: Set(fields.start_date),
        end_date: Set(fields.end_date),
        price: Set(fields.price),
        location: Set(fields.location.trim().to_string()),
        cover_image: Set(fields.cover_image),
        created_at: Set(now),
        updated_at: Set(now),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

/// Deterministic store order: insertion order reconstructed from
/// created_at with id as tiebreaker.
pub async fn list_all(db: &DatabaseConnection) -> Result<Vec<Model>, errors::ModelError> {
    Entity::find()
        .order_by_asc(Column::CreatedAt)
        .order_by_asc(Column::Id)
        .all(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn list_by_owner(
    db: &DatabaseConnection,
    owner_id: Uuid,
) -> Result<Vec<Model>, errors::ModelError> {
    Entity::find()
        .filter(Column::OwnerId.eq(owner_id))
        .order_by_asc(Column::CreatedAt)
        .order_by_asc(Column::Id)
        .all(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn find_by_id(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<Option<Model>, errors::ModelError> {
    Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

/// Ownership-scoped partial update as a single conditional UPDATE.
/// Returns the number of rows affected; 0 covers both "no such booking"
/// and "not the caller's booking".
pub async fn update_owned(
    db: &DatabaseConnection,
    id: Uuid,
    owner_id: Uuid,
    patch: &BookingPatch,
) -> Result<u64, errors::ModelError> {
    validate_patch(patch)?;

    let mut stmt = Entity::update_many()
        .filter(Column::Id.eq(id))
        .filter(Column::OwnerId.eq(owner_id))
        .col_expr(Column::UpdatedAt, Expr::value(DateTimeWithTimeZone::from(Utc::now())));
    if let Some(t) = &patch.title {
        stmt = stmt.col_expr(Column::Title, Expr::value(t.trim().to_string()));
    }
    if let Some(d) = &patch.description {
        stmt = stmt.col_expr(Column::Description, Expr::value(d.clone()));
    }
    if let Some(s) = patch.start_date {
        stmt = stmt.col_expr(Column::StartDate, Expr::value(s));
    }
    if let Some(e) = patch.end_date {
        stmt = stmt.col_expr(Column::EndDate, Expr::value(e));
    }
    if let Some(p) = patch.price {
        stmt = stmt.col_expr(Column::Price, Expr::value(p));
    }
    if let Some(l) = &patch.location {
        stmt = stmt.col_expr(Column::Location, Expr::value(l.trim().to_string()));
    }
    if let Some(c) = &patch.cover_image {
        stmt = stmt.col_expr(Column::CoverImage, Expr::value(c.clone()));
    }

    let res = stmt.exec(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))?;
    Ok(res.rows_affected)
}

/// Ownership-scoped hard delete; 0 rows means missing or not owned.
pub async fn delete_owned(
    db: &DatabaseConnection,
    id: Uuid,
    owner_id: Uuid,
) -> Result<u64, errors::ModelError> {
    let res = Entity::delete_many()
        .filter(Column::Id.eq(id))
        .filter(Column::OwnerId.eq(owner_id))
        .exec(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))?;
    Ok(res.rows_affected)
}

pub async fn set_cover_image_owned(
    db: &DatabaseConnection,
    id: Uuid,
    owner_id: Uuid,
    url: &str,
) -> Result<u64, errors::ModelError> {
    let res = Entity::update_many()
        .filter(Column::Id.eq(id))
        .filter(Column::OwnerId.eq(owner_id))
        .col_expr(Column::CoverImage, Expr::value(url.to_string()))
        .col_expr(Column::UpdatedAt, Expr::value(DateTimeWithTimeZone::from(Utc::now())))
        .exec(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))?;
    Ok(res.rows_affected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_and_location_bounds() {
        assert!(validate_title("Concert").is_ok());
        assert!(validate_title("   ").is_err());
        assert!(validate_title(&"x".repeat(256)).is_err());
        assert!(validate_location("Hall").is_ok());
        assert!(validate_location("").is_err());
    }

    #[test]
    fn price_must_be_non_negative_and_finite() {
        assert!(validate_price(0.0).is_ok());
        assert!(validate_price(50.0).is_ok());
        assert!(validate_price(-0.01).is_err());
        assert!(validate_price(f64::NAN).is_err());
        assert!(validate_price(f64::INFINITY).is_err());
    }

    #[test]
    fn description_cap() {
        assert!(validate_description(&"d".repeat(1000)).is_ok());
        assert!(validate_description(&"d".repeat(1001)).is_err());
    }

    #[test]
    fn bounds_count_characters_not_bytes() {
        // 255 two-byte characters exceed 255 bytes but not 255 chars
        let title = "é".repeat(255);
        assert!(title.len() > 255);
        assert!(validate_title(&title).is_ok());
        assert!(validate_title(&"é".repeat(256)).is_err());

        assert!(validate_location(&"ü".repeat(255)).is_ok());
        assert!(validate_description(&"北".repeat(1000)).is_ok());
        assert!(validate_description(&"北".repeat(1001)).is_err());
    }
}
