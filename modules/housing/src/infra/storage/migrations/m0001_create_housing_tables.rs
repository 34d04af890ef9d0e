use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Listings {
    Table,
    Id,
    LandlordId,
    Title,
    Description,
    Street,
    City,
    State,
    ZipCode,
    Country,
    MonthlyPrice,
    Amenities,
    Images,
    AvailableFrom,
    AvailableTo,
    Status,
    OwnerEmail,
    OwnerPhone,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Bookings {
    Table,
    Id,
    ListingId,
    StudentId,
    StartDate,
    EndDate,
    TotalPrice,
    Status,
    PaymentStatus,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Favorites {
    Table,
    Id,
    UserId,
    ListingId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Profiles {
    Table,
    UserId,
    Bio,
    PhoneNumber,
    Address,
    EmergencyContact,
    Preferences,
    ProfilePicture,
    CreatedAt,
    UpdatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Listings::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Listings::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Listings::LandlordId).uuid().not_null())
                    .col(ColumnDef::new(Listings::Title).string().not_null())
                    .col(ColumnDef::new(Listings::Description).text().not_null())
                    .col(ColumnDef::new(Listings::Street).string().not_null())
                    .col(ColumnDef::new(Listings::City).string().not_null())
                    .col(ColumnDef::new(Listings::State).string().not_null())
                    .col(ColumnDef::new(Listings::ZipCode).string().not_null())
                    .col(ColumnDef::new(Listings::Country).string().not_null())
                    .col(ColumnDef::new(Listings::MonthlyPrice).big_integer().not_null())
                    .col(ColumnDef::new(Listings::Amenities).json().not_null())
                    .col(ColumnDef::new(Listings::Images).json().not_null())
                    .col(ColumnDef::new(Listings::AvailableFrom).date().not_null())
                    .col(ColumnDef::new(Listings::AvailableTo).date().not_null())
                    .col(ColumnDef::new(Listings::Status).string().not_null())
                    .col(ColumnDef::new(Listings::OwnerEmail).string().null())
                    .col(ColumnDef::new(Listings::OwnerPhone).string().null())
                    .col(
                        ColumnDef::new(Listings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Listings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_listings_landlord")
                    .table(Listings::Table)
                    .col(Listings::LandlordId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Bookings::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Bookings::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Bookings::ListingId).uuid().not_null())
                    .col(ColumnDef::new(Bookings::StudentId).uuid().not_null())
                    .col(ColumnDef::new(Bookings::StartDate).date().not_null())
                    .col(ColumnDef::new(Bookings::EndDate).date().not_null())
                    .col(ColumnDef::new(Bookings::TotalPrice).big_integer().not_null())
                    .col(ColumnDef::new(Bookings::Status).string().not_null())
                    .col(ColumnDef::new(Bookings::PaymentStatus).string().not_null())
                    .col(
                        ColumnDef::new(Bookings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Bookings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bookings_listing")
                            .from(Bookings::Table, Bookings::ListingId)
                            .to(Listings::Table, Listings::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_bookings_listing_status")
                    .table(Bookings::Table)
                    .col(Bookings::ListingId)
                    .col(Bookings::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_bookings_student")
                    .table(Bookings::Table)
                    .col(Bookings::StudentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Favorites::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Favorites::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Favorites::UserId).uuid().not_null())
                    .col(ColumnDef::new(Favorites::ListingId).uuid().not_null())
                    .col(
                        ColumnDef::new(Favorites::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_favorites_listing")
                            .from(Favorites::Table, Favorites::ListingId)
                            .to(Listings::Table, Listings::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ux_favorites_user_listing")
                    .table(Favorites::Table)
                    .col(Favorites::UserId)
                    .col(Favorites::ListingId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Profiles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Profiles::UserId)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Profiles::Bio).text().not_null())
                    .col(ColumnDef::new(Profiles::PhoneNumber).string().not_null())
                    .col(ColumnDef::new(Profiles::Address).string().not_null())
                    .col(ColumnDef::new(Profiles::EmergencyContact).json().not_null())
                    .col(ColumnDef::new(Profiles::Preferences).json().not_null())
                    .col(ColumnDef::new(Profiles::ProfilePicture).string().null())
                    .col(
                        ColumnDef::new(Profiles::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Profiles::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Profiles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Favorites::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Bookings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Listings::Table).to_owned())
            .await
    }
}
