//! Tests to verify that the service layer emits expected tracing spans

use std::sync::{Arc, Mutex};

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use tracing_test::traced_test;
use uuid::Uuid;

use housing::contract::model::{
    Actor, Address, Booking, BookingStatus, Favorite, Listing, ListingFilter, ListingStatus,
    NewBooking, PaymentStatus, Profile,
};
use housing::domain::error::DomainError;
use housing::domain::repo::{
    BookingsRepository, FavoritesRepository, ListingsRepository, ProfilesRepository,
};
use housing::domain::service::{Service, ServiceConfig};

const LISTING_ID: &str = "550e8400-e29b-41d4-a716-446655440000";

// Mock repository for testing
struct MockHousingRepository {
    listing: Listing,
    bookings: Mutex<Vec<Booking>>,
    fail_writes: bool,
}

impl MockHousingRepository {
    fn new() -> Self {
        let now = Utc::now();
        Self {
            listing: Listing {
                id: Uuid::parse_str(LISTING_ID).unwrap(),
                landlord_id: Uuid::new_v4(),
                title: "Test listing".to_string(),
                description: String::new(),
                address: Address::default(),
                monthly_price: 500,
                amenities: vec![],
                images: vec![],
                available_from: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                available_to: NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
                status: ListingStatus::Available,
                owner_email: None,
                owner_phone: None,
                created_at: now,
                updated_at: now,
            },
            bookings: Mutex::new(Vec::new()),
            fail_writes: false,
        }
    }

    fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::new()
        }
    }
}

#[async_trait::async_trait]
impl ListingsRepository for MockHousingRepository {
    async fn find_listing(&self, id: Uuid) -> Result<Option<Listing>> {
        Ok((id == self.listing.id).then(|| self.listing.clone()))
    }

    async fn find_listings_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Listing>> {
        Ok(if ids.contains(&self.listing.id) {
            vec![self.listing.clone()]
        } else {
            vec![]
        })
    }

    async fn list_listings(&self, _filter: &ListingFilter) -> Result<Vec<Listing>> {
        Ok(vec![self.listing.clone()])
    }

    async fn insert_listing(&self, _listing: Listing) -> Result<()> {
        Ok(())
    }

    async fn update_listing(&self, _listing: Listing) -> Result<()> {
        Ok(())
    }

    async fn delete_listing(&self, _id: Uuid) -> Result<bool> {
        Ok(true)
    }
}

#[async_trait::async_trait]
impl BookingsRepository for MockHousingRepository {
    async fn find_booking(&self, id: Uuid) -> Result<Option<Booking>> {
        Ok(self
            .bookings
            .lock()
            .unwrap()
            .iter()
            .find(|b| b.id == id)
            .cloned())
    }

    async fn active_bookings_for_listing(&self, listing_id: Uuid) -> Result<Vec<Booking>> {
        Ok(self
            .bookings
            .lock()
            .unwrap()
            .iter()
            .filter(|b| b.listing_id == listing_id && b.status.is_active())
            .cloned()
            .collect())
    }

    async fn count_bookings_for_listing(&self, listing_id: Uuid) -> Result<u64> {
        Ok(self
            .bookings
            .lock()
            .unwrap()
            .iter()
            .filter(|b| b.listing_id == listing_id)
            .count() as u64)
    }

    async fn bookings_for_student(&self, _student_id: Uuid) -> Result<Vec<Booking>> {
        Ok(vec![])
    }

    async fn bookings_for_landlord(&self, _landlord_id: Uuid) -> Result<Vec<Booking>> {
        Ok(vec![])
    }

    async fn insert_booking(&self, booking: Booking) -> Result<()> {
        if self.fail_writes {
            anyhow::bail!("database is locked");
        }
        self.bookings.lock().unwrap().push(booking);
        Ok(())
    }

    async fn update_booking_status(
        &self,
        _id: Uuid,
        _status: BookingStatus,
        _payment_status: PaymentStatus,
        _updated_at: DateTime<Utc>,
    ) -> Result<()> {
        Ok(())
    }
}

#[async_trait::async_trait]
impl FavoritesRepository for MockHousingRepository {
    async fn find_favorite(&self, _user_id: Uuid, _listing_id: Uuid) -> Result<Option<Favorite>> {
        Ok(None)
    }

    async fn insert_favorite(&self, _favorite: Favorite) -> Result<bool> {
        Ok(true)
    }

    async fn delete_favorite(&self, _user_id: Uuid, _listing_id: Uuid) -> Result<bool> {
        Ok(false)
    }

    async fn favorites_for_user(&self, _user_id: Uuid) -> Result<Vec<Favorite>> {
        Ok(vec![])
    }
}

#[async_trait::async_trait]
impl ProfilesRepository for MockHousingRepository {
    async fn find_profile(&self, _user_id: Uuid) -> Result<Option<Profile>> {
        Ok(None)
    }

    async fn upsert_profile(&self, _profile: Profile) -> Result<()> {
        Ok(())
    }
}

fn booking_request() -> NewBooking {
    NewBooking {
        listing_id: Uuid::parse_str(LISTING_ID).unwrap(),
        start_date: NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2025, 2, 28).unwrap(),
        total_price: 500,
    }
}

#[traced_test]
#[tokio::test]
async fn get_listing_emits_spans() {
    let service = Service::new(Arc::new(MockHousingRepository::new()), ServiceConfig::default());

    let result = service.get_listing(Uuid::parse_str(LISTING_ID).unwrap()).await;

    assert!(result.is_ok());
    assert!(logs_contain("housing.service.get_listing"));
    assert!(logs_contain("Getting listing by id"));
}

#[traced_test]
#[tokio::test]
async fn create_booking_logs_the_new_id() {
    let service = Service::new(Arc::new(MockHousingRepository::new()), ServiceConfig::default());
    let student = Actor::student(Uuid::new_v4());

    let created = service
        .create_booking(&student, booking_request())
        .await
        .unwrap();

    assert!(logs_contain("housing.service.create_booking"));
    assert!(logs_contain(&format!("Created booking with id={}", created.booking.id)));
}

#[traced_test]
#[tokio::test]
async fn conflicts_are_logged_with_the_overlapping_ids() {
    let service = Service::new(Arc::new(MockHousingRepository::new()), ServiceConfig::default());

    service
        .create_booking(&Actor::student(Uuid::new_v4()), booking_request())
        .await
        .unwrap();
    let err = service
        .create_booking(&Actor::student(Uuid::new_v4()), booking_request())
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::BookingConflict { .. }));
    assert!(logs_contain("Requested dates overlap active bookings"));
}

#[traced_test]
#[tokio::test]
async fn storage_failures_become_database_errors() {
    let service = Service::new(Arc::new(MockHousingRepository::failing()), ServiceConfig::default());

    let err = service
        .create_booking(&Actor::student(Uuid::new_v4()), booking_request())
        .await
        .unwrap_err();

    match err {
        DomainError::Database { message } => assert!(message.contains("database is locked")),
        other => panic!("expected database error, got {other:?}"),
    }
    assert!(logs_contain("housing.service.create_booking"));
}
