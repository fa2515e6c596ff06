//! Create `booking` table with FK to `user` (owner).
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Booking::Table)
                    .if_not_exists()
                    .col(uuid(Booking::Id).primary_key())
                    .col(uuid(Booking::OwnerId).not_null())
                    .col(string_len(Booking::Title, 255).not_null())
                    .col(ColumnDef::new(Booking::Description).text().null())
                    .col(timestamp_with_time_zone(Booking::StartDate).not_null())
                    .col(timestamp_with_time_zone(Booking::EndDate).not_null())
                    .col(double(Booking::Price).not_null())
                    .col(string_len(Booking::Location, 255).not_null())
                    .col(ColumnDef::new(Booking::CoverImage).string_len(1024).null())
                    .col(timestamp_with_time_zone(Booking::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Booking::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_owner")
                            .from(Booking::Table, Booking::OwnerId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Booking::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Booking {
    Table,
    Id,
    OwnerId,
    Title,
    Description,
    StartDate,
    EndDate,
    Price,
    Location,
    CoverImage,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum User { Table, Id }
