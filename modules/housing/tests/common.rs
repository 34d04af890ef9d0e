#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use uuid::Uuid;

use housing::contract::model::{Actor, Address, Booking, Listing, NewBooking, NewListing};
use housing::domain::service::{Service, ServiceConfig};
use housing::infra::storage::{migrations::Migrator, SeaOrmHousingRepository};

/// Fresh in-memory SQLite database with the housing schema applied.
pub async fn create_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to test database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

pub struct TestEnv {
    pub db: DatabaseConnection,
    pub repo: Arc<SeaOrmHousingRepository<DatabaseConnection>>,
    pub service: Arc<Service>,
}

pub async fn create_test_env() -> TestEnv {
    let db = create_test_db().await;
    let repo = Arc::new(SeaOrmHousingRepository::new(db.clone()));
    let service = Arc::new(Service::new(repo.clone(), ServiceConfig::default()));
    TestEnv { db, repo, service }
}

pub fn d(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, month, day).unwrap()
}

pub fn landlord() -> Actor {
    Actor::landlord(Uuid::new_v4())
}

pub fn student() -> Actor {
    Actor::student(Uuid::new_v4())
}

pub fn new_listing(title: &str, monthly_price: i64) -> NewListing {
    NewListing {
        title: title.to_string(),
        description: "Furnished room, bills included".to_string(),
        address: Address {
            street: "12 College Road".to_string(),
            city: "Bristol".to_string(),
            state: String::new(),
            zip_code: "BS8 1TH".to_string(),
            country: "UK".to_string(),
        },
        monthly_price,
        amenities: vec!["wifi".to_string(), "laundry".to_string()],
        images: vec![],
        available_from: d(1, 1),
        available_to: d(12, 31),
        owner_email: Some("owner@example.com".to_string()),
        owner_phone: None,
    }
}

pub async fn seed_listing(service: &Service, owner: &Actor) -> Listing {
    service
        .create_listing(owner, new_listing("Room near campus", 650))
        .await
        .expect("listing created")
}

pub async fn book(
    service: &Service,
    who: &Actor,
    listing_id: Uuid,
    start: NaiveDate,
    end: NaiveDate,
) -> Booking {
    service
        .create_booking(
            who,
            NewBooking {
                listing_id,
                start_date: start,
                end_date: end,
                total_price: 650,
            },
        )
        .await
        .expect("booking created")
        .booking
}
