use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Role of an authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Student,
    Landlord,
}

/// Authenticated caller handed to the service by the auth layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: Role,
}

impl Actor {
    pub fn student(user_id: Uuid) -> Self {
        Self {
            user_id,
            role: Role::Student,
        }
    }

    pub fn landlord(user_id: Uuid) -> Self {
        Self {
            user_id,
            role: Role::Landlord,
        }
    }

    pub fn is_student(&self) -> bool {
        self.role == Role::Student
    }

    pub fn is_landlord(&self) -> bool {
        self.role == Role::Landlord
    }
}

/// Error for string values outside an enum's vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} '{}'", self.kind, self.value)
    }
}

impl std::error::Error for UnknownVariant {}

/// Lowercase string vocabulary shared by storage, REST and config.
macro_rules! string_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(UnknownVariant {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

string_enum!(Role, "role", {
    Student => "student",
    Landlord => "landlord",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListingStatus {
    Available,
    Booked,
    Unavailable,
}

string_enum!(ListingStatus, "listing status", {
    Available => "available",
    Booked => "booked",
    Unavailable => "unavailable",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

string_enum!(BookingStatus, "booking status", {
    Pending => "pending",
    Confirmed => "confirmed",
    Cancelled => "cancelled",
    Completed => "completed",
});

impl BookingStatus {
    /// Active bookings hold their dates on the listing.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentStatus {
    Pending,
    Paid,
    Refunded,
}

string_enum!(PaymentStatus, "payment status", {
    Pending => "pending",
    Paid => "paid",
    Refunded => "refunded",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RoomType {
    Single,
    Double,
    Shared,
    #[default]
    Any,
}

string_enum!(RoomType, "room type", {
    Single => "single",
    Double => "double",
    Shared => "shared",
    Any => "any",
});

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

/// Rentable property owned by a landlord.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    pub id: Uuid,
    pub landlord_id: Uuid,
    pub title: String,
    pub description: String,
    pub address: Address,
    /// Whole currency units.
    pub monthly_price: i64,
    pub amenities: Vec<String>,
    pub images: Vec<String>,
    pub available_from: NaiveDate,
    pub available_to: NaiveDate,
    pub status: ListingStatus,
    pub owner_email: Option<String>,
    pub owner_phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewListing {
    pub title: String,
    pub description: String,
    pub address: Address,
    pub monthly_price: i64,
    pub amenities: Vec<String>,
    pub images: Vec<String>,
    pub available_from: NaiveDate,
    pub available_to: NaiveDate,
    pub owner_email: Option<String>,
    pub owner_phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListingPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub address: Option<Address>,
    pub monthly_price: Option<i64>,
    pub amenities: Option<Vec<String>>,
    pub images: Option<Vec<String>>,
    pub available_from: Option<NaiveDate>,
    pub available_to: Option<NaiveDate>,
    pub status: Option<ListingStatus>,
    pub owner_email: Option<String>,
    pub owner_phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListingFilter {
    pub landlord_id: Option<Uuid>,
    pub status: Option<ListingStatus>,
}

/// A student's request to occupy a listing for `[start_date, end_date]` (both inclusive).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub student_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_price: i64,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBooking {
    pub listing_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_price: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingWithListing {
    pub booking: Booking,
    pub listing: Listing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Favorite {
    pub id: Uuid,
    pub user_id: Uuid,
    pub listing_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavoriteWithListing {
    pub favorite: Favorite,
    pub listing: Listing,
}

/// Outcome of a favorite toggle: `added` is the state after the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FavoriteToggle {
    pub listing_id: Uuid,
    pub added: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EmergencyContact {
    pub name: String,
    pub relationship: String,
    pub phone_number: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Preferences {
    pub room_type: RoomType,
    pub price_min: Option<i64>,
    pub price_max: Option<i64>,
    pub amenities: Vec<String>,
    pub locations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub user_id: Uuid,
    pub bio: String,
    pub phone_number: String,
    pub address: String,
    pub emergency_contact: EmergencyContact,
    pub preferences: Preferences,
    pub profile_picture: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Blank profile used on first access.
    pub fn empty(user_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            bio: String::new(),
            phone_number: String::new(),
            address: String::new(),
            emergency_contact: EmergencyContact::default(),
            preferences: Preferences::default(),
            profile_picture: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EmergencyContactPatch {
    pub name: Option<String>,
    pub relationship: Option<String>,
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PreferencesPatch {
    pub room_type: Option<RoomType>,
    pub price_min: Option<i64>,
    pub price_max: Option<i64>,
    pub amenities: Option<Vec<String>>,
    pub locations: Option<Vec<String>>,
}

/// Partial profile update; nested sections merge field by field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProfilePatch {
    pub bio: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub emergency_contact: Option<EmergencyContactPatch>,
    pub preferences: Option<PreferencesPatch>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_parse_their_own_text() {
        for s in [
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::Cancelled,
            BookingStatus::Completed,
        ] {
            assert_eq!(s.as_str().parse::<BookingStatus>().unwrap(), s);
        }
        assert_eq!("booked".parse::<ListingStatus>().unwrap(), ListingStatus::Booked);
        assert_eq!("refunded".parse::<PaymentStatus>().unwrap(), PaymentStatus::Refunded);
        assert_eq!("shared".parse::<RoomType>().unwrap(), RoomType::Shared);
    }

    #[test]
    fn unknown_status_is_rejected() {
        let err = "approved".parse::<BookingStatus>().unwrap_err();
        assert_eq!(err.kind, "booking status");
        assert_eq!(err.to_string(), "unknown booking status 'approved'");
        assert!("Pending".parse::<BookingStatus>().is_err());
    }

    #[test]
    fn only_pending_and_confirmed_are_active() {
        assert!(BookingStatus::Pending.is_active());
        assert!(BookingStatus::Confirmed.is_active());
        assert!(!BookingStatus::Cancelled.is_active());
        assert!(!BookingStatus::Completed.is_active());
    }
}
