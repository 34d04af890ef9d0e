//! Booking creation and lifecycle on a real SQLite database.
//!
//! Every test starts from an empty in-memory database with migrations applied;
//! the service talks to it through the SeaORM repository.

mod common;

use chrono::Utc;
use housing::contract::model::{BookingStatus, NewBooking, PaymentStatus};
use housing::domain::error::DomainError;
use housing::domain::repo::BookingsRepository;
use uuid::Uuid;

use common::{book, create_test_env, d, landlord, seed_listing, student};

#[tokio::test]
async fn overlapping_request_is_rejected_with_conflicting_ids() {
    let env = create_test_env().await;
    let owner = landlord();
    let listing = seed_listing(&env.service, &owner).await;

    let first = book(&env.service, &student(), listing.id, d(1, 1), d(1, 10)).await;
    env.service
        .set_booking_status(&owner, first.id, "confirmed")
        .await
        .unwrap();

    let err = env
        .service
        .create_booking(
            &student(),
            NewBooking {
                listing_id: listing.id,
                start_date: d(1, 5),
                end_date: d(1, 15),
                total_price: 650,
            },
        )
        .await
        .unwrap_err();

    match err {
        DomainError::BookingConflict {
            listing_id,
            conflicting,
        } => {
            assert_eq!(listing_id, listing.id);
            assert_eq!(conflicting, vec![first.id]);
        }
        other => panic!("expected conflict, got {other:?}"),
    }
}

#[tokio::test]
async fn adjacent_request_is_created_pending() {
    let env = create_test_env().await;
    let owner = landlord();
    let listing = seed_listing(&env.service, &owner).await;

    let first = book(&env.service, &student(), listing.id, d(1, 1), d(1, 10)).await;
    env.service
        .set_booking_status(&owner, first.id, "confirmed")
        .await
        .unwrap();

    let second = book(&env.service, &student(), listing.id, d(1, 11), d(1, 20)).await;
    assert_eq!(second.status, BookingStatus::Pending);
    assert_eq!(second.payment_status, PaymentStatus::Pending);

    let stored = env.repo.find_booking(second.id).await.unwrap().unwrap();
    assert_eq!(stored.student_id, second.student_id);
    assert_eq!((stored.start_date, stored.end_date), (d(1, 11), d(1, 20)));
    assert_eq!(stored.status, BookingStatus::Pending);
}

#[tokio::test]
async fn touching_dates_conflict() {
    let env = create_test_env().await;
    let listing = seed_listing(&env.service, &landlord()).await;

    book(&env.service, &student(), listing.id, d(1, 1), d(1, 10)).await;

    let err = env
        .service
        .create_booking(
            &student(),
            NewBooking {
                listing_id: listing.id,
                start_date: d(1, 10),
                end_date: d(1, 12),
                total_price: 100,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::BookingConflict { .. }));
}

#[tokio::test]
async fn cancelled_bookings_free_their_dates() {
    let env = create_test_env().await;
    let listing = seed_listing(&env.service, &landlord()).await;
    let alice = student();

    let first = book(&env.service, &alice, listing.id, d(3, 1), d(3, 31)).await;
    let cancelled = env
        .service
        .set_booking_status(&alice, first.id, "cancelled")
        .await
        .unwrap();
    assert_eq!(cancelled.booking.status, BookingStatus::Cancelled);

    let again = book(&env.service, &student(), listing.id, d(3, 15), d(4, 15)).await;
    assert_eq!(again.status, BookingStatus::Pending);
}

#[tokio::test]
async fn student_cancel_then_landlord_reconfirm() {
    let env = create_test_env().await;
    let owner = landlord();
    let listing = seed_listing(&env.service, &owner).await;
    let alice = student();

    let b = book(&env.service, &alice, listing.id, d(2, 1), d(2, 28)).await;
    env.service
        .set_booking_status(&alice, b.id, "cancelled")
        .await
        .unwrap();

    let revived = env
        .service
        .set_booking_status(&owner, b.id, "confirmed")
        .await
        .unwrap();
    assert_eq!(revived.booking.status, BookingStatus::Confirmed);
    assert!(revived.booking.updated_at >= b.updated_at);
}

#[tokio::test]
async fn reactivation_is_blocked_by_a_newer_overlapping_booking() {
    let env = create_test_env().await;
    let owner = landlord();
    let listing = seed_listing(&env.service, &owner).await;
    let alice = student();

    let old = book(&env.service, &alice, listing.id, d(2, 1), d(2, 28)).await;
    env.service
        .set_booking_status(&alice, old.id, "cancelled")
        .await
        .unwrap();
    let newer = book(&env.service, &student(), listing.id, d(2, 20), d(3, 10)).await;

    let err = env
        .service
        .set_booking_status(&owner, old.id, "pending")
        .await
        .unwrap_err();
    match err {
        DomainError::BookingConflict { conflicting, .. } => {
            assert_eq!(conflicting, vec![newer.id]);
        }
        other => panic!("expected conflict, got {other:?}"),
    }

    let stored = env.repo.find_booking(old.id).await.unwrap().unwrap();
    assert_eq!(stored.status, BookingStatus::Cancelled);
}

#[tokio::test]
async fn landlord_cannot_touch_another_landlords_booking() {
    let env = create_test_env().await;
    let owner_b = landlord();
    let listing = seed_listing(&env.service, &owner_b).await;
    let b = book(&env.service, &student(), listing.id, d(5, 1), d(5, 31)).await;

    let err = env
        .service
        .set_booking_status(&landlord(), b.id, "confirmed")
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden { .. }), "{err:?}");

    let stored = env.repo.find_booking(b.id).await.unwrap().unwrap();
    assert_eq!(stored.status, BookingStatus::Pending);
}

#[tokio::test]
async fn students_can_only_cancel_their_own_pending_bookings() {
    let env = create_test_env().await;
    let owner = landlord();
    let listing = seed_listing(&env.service, &owner).await;
    let alice = student();
    let b = book(&env.service, &alice, listing.id, d(6, 1), d(6, 30)).await;

    // Someone else's booking
    let err = env
        .service
        .set_booking_status(&student(), b.id, "cancelled")
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden { .. }));

    // Students cannot confirm
    let err = env
        .service
        .set_booking_status(&alice, b.id, "confirmed")
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden { .. }));

    // Confirmed bookings are out of the student's hands
    env.service
        .set_booking_status(&owner, b.id, "confirmed")
        .await
        .unwrap();
    let err = env
        .service
        .set_booking_status(&alice, b.id, "cancelled")
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden { .. }));
}

#[tokio::test]
async fn cancelling_a_paid_confirmed_booking_refunds_it() {
    let env = create_test_env().await;
    let owner = landlord();
    let listing = seed_listing(&env.service, &owner).await;
    let b = book(&env.service, &student(), listing.id, d(7, 1), d(7, 31)).await;

    // Payment capture happens outside the marketplace; record it directly
    env.repo
        .update_booking_status(b.id, BookingStatus::Confirmed, PaymentStatus::Paid, Utc::now())
        .await
        .unwrap();

    let cancelled = env
        .service
        .set_booking_status(&owner, b.id, "cancelled")
        .await
        .unwrap();
    assert_eq!(cancelled.booking.status, BookingStatus::Cancelled);
    assert_eq!(cancelled.booking.payment_status, PaymentStatus::Refunded);

    let stored = env.repo.find_booking(b.id).await.unwrap().unwrap();
    assert_eq!(stored.payment_status, PaymentStatus::Refunded);
}

#[tokio::test]
async fn completed_bookings_are_terminal() {
    let env = create_test_env().await;
    let owner = landlord();
    let listing = seed_listing(&env.service, &owner).await;
    let b = book(&env.service, &student(), listing.id, d(8, 1), d(8, 31)).await;
    env.repo
        .update_booking_status(b.id, BookingStatus::Completed, PaymentStatus::Paid, Utc::now())
        .await
        .unwrap();

    for requested in ["pending", "confirmed", "cancelled"] {
        let err = env
            .service
            .set_booking_status(&owner, b.id, requested)
            .await
            .unwrap_err();
        assert!(
            matches!(err, DomainError::InvalidTransition { .. }),
            "{requested}: {err:?}"
        );
    }
}

#[tokio::test]
async fn unknown_status_is_an_invalid_transition() {
    let env = create_test_env().await;
    let owner = landlord();
    let listing = seed_listing(&env.service, &owner).await;
    let b = book(&env.service, &student(), listing.id, d(9, 1), d(9, 30)).await;

    for requested in ["approved", "completed", ""] {
        let err = env
            .service
            .set_booking_status(&owner, b.id, requested)
            .await
            .unwrap_err();
        assert!(
            matches!(err, DomainError::InvalidTransition { .. }),
            "{requested}: {err:?}"
        );
    }
}

#[tokio::test]
async fn booking_input_is_validated() {
    let env = create_test_env().await;
    let owner = landlord();
    let listing = seed_listing(&env.service, &owner).await;

    let reversed = NewBooking {
        listing_id: listing.id,
        start_date: d(4, 10),
        end_date: d(4, 1),
        total_price: 650,
    };
    let err = env
        .service
        .create_booking(&student(), reversed)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "end_date"));

    let free = NewBooking {
        listing_id: listing.id,
        start_date: d(4, 1),
        end_date: d(4, 10),
        total_price: 0,
    };
    let err = env.service.create_booking(&student(), free).await.unwrap_err();
    assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "total_price"));

    let missing = NewBooking {
        listing_id: Uuid::new_v4(),
        start_date: d(4, 1),
        end_date: d(4, 10),
        total_price: 650,
    };
    let err = env
        .service
        .create_booking(&student(), missing)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::ListingNotFound { .. }));

    let by_landlord = NewBooking {
        listing_id: listing.id,
        start_date: d(4, 1),
        end_date: d(4, 10),
        total_price: 650,
    };
    let err = env
        .service
        .create_booking(&owner, by_landlord)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden { .. }));
}

#[tokio::test]
async fn concurrent_overlapping_requests_admit_exactly_one() {
    let env = create_test_env().await;
    let listing = seed_listing(&env.service, &landlord()).await;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let service = env.service.clone();
        let listing_id = listing.id;
        handles.push(tokio::spawn(async move {
            service
                .create_booking(
                    &student(),
                    NewBooking {
                        listing_id,
                        start_date: d(10, 1),
                        end_date: d(10, 31),
                        total_price: 650,
                    },
                )
                .await
        }));
    }

    let mut created = 0;
    let mut conflicts = 0;
    for h in handles {
        match h.await.unwrap() {
            Ok(_) => created += 1,
            Err(DomainError::BookingConflict { .. }) => conflicts += 1,
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }
    assert_eq!(created, 1);
    assert_eq!(conflicts, 7);

    let active = env
        .repo
        .active_bookings_for_listing(listing.id)
        .await
        .unwrap();
    assert_eq!(active.len(), 1);
}

#[tokio::test]
async fn bookings_are_listed_per_role_with_listings() {
    let env = create_test_env().await;
    let owner = landlord();
    let other_owner = landlord();
    let listing = seed_listing(&env.service, &owner).await;
    let other_listing = seed_listing(&env.service, &other_owner).await;
    let alice = student();

    let b1 = book(&env.service, &alice, listing.id, d(1, 1), d(1, 31)).await;
    let b2 = book(&env.service, &alice, other_listing.id, d(2, 1), d(2, 28)).await;
    book(&env.service, &student(), listing.id, d(3, 1), d(3, 31)).await;

    let mine = env.service.list_bookings(&alice).await.unwrap();
    let ids: Vec<Uuid> = mine.iter().map(|b| b.booking.id).collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&b1.id) && ids.contains(&b2.id));
    assert!(mine.iter().all(|b| b.listing.id == b.booking.listing_id));

    let owners = env.service.list_bookings(&owner).await.unwrap();
    assert_eq!(owners.len(), 2);
    assert!(owners.iter().all(|b| b.listing.landlord_id == owner.user_id));

    // Visibility of a single booking
    assert!(env.service.get_booking(&alice, b1.id).await.is_ok());
    assert!(env.service.get_booking(&owner, b1.id).await.is_ok());
    let err = env.service.get_booking(&other_owner, b1.id).await.unwrap_err();
    assert!(matches!(err, DomainError::Forbidden { .. }));
    let err = env
        .service
        .get_booking(&alice, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::BookingNotFound { .. }));
}

#[tokio::test]
async fn availability_check_reflects_active_bookings() {
    let env = create_test_env().await;
    let owner = landlord();
    let listing = seed_listing(&env.service, &owner).await;
    let alice = student();
    let b = book(&env.service, &alice, listing.id, d(1, 1), d(1, 10)).await;

    assert!(env
        .service
        .has_conflict(listing.id, d(1, 10), d(1, 12))
        .await
        .unwrap());
    assert!(!env
        .service
        .has_conflict(listing.id, d(1, 11), d(1, 12))
        .await
        .unwrap());

    env.service
        .set_booking_status(&alice, b.id, "cancelled")
        .await
        .unwrap();
    assert!(!env
        .service
        .has_conflict(listing.id, d(1, 1), d(1, 10))
        .await
        .unwrap());

    let err = env
        .service
        .has_conflict(Uuid::new_v4(), d(1, 1), d(1, 2))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::ListingNotFound { .. }));
}
