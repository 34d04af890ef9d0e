//! SeaORM-backed implementation of the housing repository ports.
//!
//! Generic over the connection so tests and the server can hand in any
//! `DatabaseConnection`; multi-statement writes open their own transaction.

use anyhow::Context;
use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::OnConflict, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, SqlErr,
    TransactionTrait,
};
use uuid::Uuid;

use crate::contract::model::{
    Booking, BookingStatus, Favorite, Listing, ListingFilter, PaymentStatus, Profile,
};
use crate::domain::repo::{
    BookingsRepository, FavoritesRepository, ListingsRepository, ProfilesRepository,
};
use crate::infra::storage::entity::{booking, favorite, listing, profile};
use crate::infra::storage::mapper;

const ACTIVE_STATUSES: [BookingStatus; 2] = [BookingStatus::Pending, BookingStatus::Confirmed];

/// Holds a connection object; its lifetime/ownership is up to the caller.
pub struct SeaOrmHousingRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmHousingRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

fn bookings_from_rows(rows: Vec<booking::Model>) -> anyhow::Result<Vec<Booking>> {
    rows.into_iter().map(mapper::booking_from_row).collect()
}

fn listings_from_rows(rows: Vec<listing::Model>) -> anyhow::Result<Vec<Listing>> {
    rows.into_iter().map(mapper::listing_from_row).collect()
}

#[async_trait::async_trait]
impl<C> ListingsRepository for SeaOrmHousingRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync + 'static,
{
    async fn find_listing(&self, id: Uuid) -> anyhow::Result<Option<Listing>> {
        let found = listing::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find_listing failed")?;
        found.map(mapper::listing_from_row).transpose()
    }

    async fn find_listings_by_ids(&self, ids: &[Uuid]) -> anyhow::Result<Vec<Listing>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = listing::Entity::find()
            .filter(listing::Column::Id.is_in(ids.iter().copied()))
            .all(&self.conn)
            .await
            .context("find_listings_by_ids failed")?;
        listings_from_rows(rows)
    }

    async fn list_listings(&self, filter: &ListingFilter) -> anyhow::Result<Vec<Listing>> {
        let mut query = listing::Entity::find();
        if let Some(landlord_id) = filter.landlord_id {
            query = query.filter(listing::Column::LandlordId.eq(landlord_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(listing::Column::Status.eq(status.as_str()));
        }
        let rows = query
            .order_by_desc(listing::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("list_listings failed")?;
        listings_from_rows(rows)
    }

    async fn insert_listing(&self, l: Listing) -> anyhow::Result<()> {
        let _ = mapper::listing_to_active(l)
            .insert(&self.conn)
            .await
            .context("insert_listing failed")?;
        Ok(())
    }

    async fn update_listing(&self, l: Listing) -> anyhow::Result<()> {
        let _ = mapper::listing_to_active(l)
            .update(&self.conn)
            .await
            .context("update_listing failed")?;
        Ok(())
    }

    async fn delete_listing(&self, id: Uuid) -> anyhow::Result<bool> {
        let txn = self.conn.begin().await.context("begin failed")?;

        favorite::Entity::delete_many()
            .filter(favorite::Column::ListingId.eq(id))
            .exec(&txn)
            .await
            .context("delete favorites of listing failed")?;
        let res = listing::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .context("delete_listing failed")?;

        txn.commit().await.context("commit failed")?;
        Ok(res.rows_affected > 0)
    }
}

#[async_trait::async_trait]
impl<C> BookingsRepository for SeaOrmHousingRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync + 'static,
{
    async fn find_booking(&self, id: Uuid) -> anyhow::Result<Option<Booking>> {
        let found = booking::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find_booking failed")?;
        found.map(mapper::booking_from_row).transpose()
    }

    async fn active_bookings_for_listing(&self, listing_id: Uuid) -> anyhow::Result<Vec<Booking>> {
        let rows = booking::Entity::find()
            .filter(booking::Column::ListingId.eq(listing_id))
            .filter(booking::Column::Status.is_in(ACTIVE_STATUSES.iter().map(|s| s.as_str())))
            .order_by_asc(booking::Column::StartDate)
            .all(&self.conn)
            .await
            .context("active_bookings_for_listing failed")?;
        bookings_from_rows(rows)
    }

    async fn count_bookings_for_listing(&self, listing_id: Uuid) -> anyhow::Result<u64> {
        booking::Entity::find()
            .filter(booking::Column::ListingId.eq(listing_id))
            .count(&self.conn)
            .await
            .context("count_bookings_for_listing failed")
    }

    async fn bookings_for_student(&self, student_id: Uuid) -> anyhow::Result<Vec<Booking>> {
        let rows = booking::Entity::find()
            .filter(booking::Column::StudentId.eq(student_id))
            .order_by_desc(booking::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("bookings_for_student failed")?;
        bookings_from_rows(rows)
    }

    async fn bookings_for_landlord(&self, landlord_id: Uuid) -> anyhow::Result<Vec<Booking>> {
        let rows = booking::Entity::find()
            .join(
                sea_orm::JoinType::InnerJoin,
                booking::Relation::Listing.def(),
            )
            .filter(listing::Column::LandlordId.eq(landlord_id))
            .order_by_desc(booking::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("bookings_for_landlord failed")?;
        bookings_from_rows(rows)
    }

    async fn insert_booking(&self, b: Booking) -> anyhow::Result<()> {
        let _ = mapper::booking_to_active(b)
            .insert(&self.conn)
            .await
            .context("insert_booking failed")?;
        Ok(())
    }

    async fn update_booking_status(
        &self,
        id: Uuid,
        status: BookingStatus,
        payment_status: PaymentStatus,
        updated_at: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        let m = booking::ActiveModel {
            id: Set(id),
            status: Set(status.as_str().to_string()),
            payment_status: Set(payment_status.as_str().to_string()),
            updated_at: Set(updated_at),
            ..Default::default()
        };
        let _ = m
            .update(&self.conn)
            .await
            .context("update_booking_status failed")?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl<C> FavoritesRepository for SeaOrmHousingRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync + 'static,
{
    async fn find_favorite(
        &self,
        user_id: Uuid,
        listing_id: Uuid,
    ) -> anyhow::Result<Option<Favorite>> {
        let found = favorite::Entity::find()
            .filter(favorite::Column::UserId.eq(user_id))
            .filter(favorite::Column::ListingId.eq(listing_id))
            .one(&self.conn)
            .await
            .context("find_favorite failed")?;
        Ok(found.map(Into::into))
    }

    async fn insert_favorite(&self, f: Favorite) -> anyhow::Result<bool> {
        match mapper::favorite_to_active(f).insert(&self.conn).await {
            Ok(_) => Ok(true),
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Ok(false)
            }
            Err(e) => Err(anyhow::Error::new(e).context("insert_favorite failed")),
        }
    }

    async fn delete_favorite(&self, user_id: Uuid, listing_id: Uuid) -> anyhow::Result<bool> {
        let res = favorite::Entity::delete_many()
            .filter(favorite::Column::UserId.eq(user_id))
            .filter(favorite::Column::ListingId.eq(listing_id))
            .exec(&self.conn)
            .await
            .context("delete_favorite failed")?;
        Ok(res.rows_affected > 0)
    }

    async fn favorites_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Favorite>> {
        let rows = favorite::Entity::find()
            .filter(favorite::Column::UserId.eq(user_id))
            .order_by_desc(favorite::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("favorites_for_user failed")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[async_trait::async_trait]
impl<C> ProfilesRepository for SeaOrmHousingRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync + 'static,
{
    async fn find_profile(&self, user_id: Uuid) -> anyhow::Result<Option<Profile>> {
        let found = profile::Entity::find_by_id(user_id)
            .one(&self.conn)
            .await
            .context("find_profile failed")?;
        found.map(mapper::profile_from_row).transpose()
    }

    async fn upsert_profile(&self, p: Profile) -> anyhow::Result<()> {
        let m = mapper::profile_to_active(p)?;
        profile::Entity::insert(m)
            .on_conflict(
                OnConflict::column(profile::Column::UserId)
                    .update_columns([
                        profile::Column::Bio,
                        profile::Column::PhoneNumber,
                        profile::Column::Address,
                        profile::Column::EmergencyContact,
                        profile::Column::Preferences,
                        profile::Column::ProfilePicture,
                        profile::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec(&self.conn)
            .await
            .context("upsert_profile failed")?;
        Ok(())
    }
}
