use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::contract::model::{
    Address, BookingWithListing, EmergencyContact, EmergencyContactPatch, FavoriteToggle,
    FavoriteWithListing, Listing, ListingFilter, ListingPatch, ListingStatus, NewBooking,
    NewListing, Preferences, PreferencesPatch, Profile, ProfilePatch, RoomType,
};

// --- listings ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatusDto {
    Available,
    Booked,
    Unavailable,
}

impl From<ListingStatus> for ListingStatusDto {
    fn from(s: ListingStatus) -> Self {
        match s {
            ListingStatus::Available => Self::Available,
            ListingStatus::Booked => Self::Booked,
            ListingStatus::Unavailable => Self::Unavailable,
        }
    }
}

impl From<ListingStatusDto> for ListingStatus {
    fn from(s: ListingStatusDto) -> Self {
        match s {
            ListingStatusDto::Available => Self::Available,
            ListingStatusDto::Booked => Self::Booked,
            ListingStatusDto::Unavailable => Self::Unavailable,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct AddressDto {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

/// REST DTO for listing representation
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListingDto {
    pub id: Uuid,
    pub landlord_id: Uuid,
    pub title: String,
    pub description: String,
    pub address: AddressDto,
    pub monthly_price: i64,
    pub amenities: Vec<String>,
    pub images: Vec<String>,
    pub available_from: NaiveDate,
    pub available_to: NaiveDate,
    pub status: ListingStatusDto,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateListingReq {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub address: AddressDto,
    pub monthly_price: i64,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub available_from: NaiveDate,
    pub available_to: NaiveDate,
    pub owner_email: Option<String>,
    pub owner_phone: Option<String>,
}

/// Partial listing update; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateListingReq {
    pub title: Option<String>,
    pub description: Option<String>,
    pub address: Option<AddressDto>,
    pub monthly_price: Option<i64>,
    pub amenities: Option<Vec<String>>,
    pub images: Option<Vec<String>>,
    pub available_from: Option<NaiveDate>,
    pub available_to: Option<NaiveDate>,
    pub status: Option<ListingStatusDto>,
    pub owner_email: Option<String>,
    pub owner_phone: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListListingsQuery {
    /// Only listings of this landlord.
    pub landlord_id: Option<Uuid>,
    pub status: Option<ListingStatusDto>,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AvailabilityQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AvailabilityDto {
    pub listing_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// False when the range overlaps a pending or confirmed booking.
    pub available: bool,
}

impl From<Address> for AddressDto {
    fn from(a: Address) -> Self {
        Self {
            street: a.street,
            city: a.city,
            state: a.state,
            zip_code: a.zip_code,
            country: a.country,
        }
    }
}

impl From<AddressDto> for Address {
    fn from(a: AddressDto) -> Self {
        Self {
            street: a.street,
            city: a.city,
            state: a.state,
            zip_code: a.zip_code,
            country: a.country,
        }
    }
}

impl From<Listing> for ListingDto {
    fn from(l: Listing) -> Self {
        Self {
            id: l.id,
            landlord_id: l.landlord_id,
            title: l.title,
            description: l.description,
            address: l.address.into(),
            monthly_price: l.monthly_price,
            amenities: l.amenities,
            images: l.images,
            available_from: l.available_from,
            available_to: l.available_to,
            status: l.status.into(),
            owner_email: l.owner_email,
            owner_phone: l.owner_phone,
            created_at: l.created_at,
            updated_at: l.updated_at,
        }
    }
}

impl From<CreateListingReq> for NewListing {
    fn from(req: CreateListingReq) -> Self {
        Self {
            title: req.title,
            description: req.description,
            address: req.address.into(),
            monthly_price: req.monthly_price,
            amenities: req.amenities,
            images: req.images,
            available_from: req.available_from,
            available_to: req.available_to,
            owner_email: req.owner_email,
            owner_phone: req.owner_phone,
        }
    }
}

impl From<UpdateListingReq> for ListingPatch {
    fn from(req: UpdateListingReq) -> Self {
        Self {
            title: req.title,
            description: req.description,
            address: req.address.map(Into::into),
            monthly_price: req.monthly_price,
            amenities: req.amenities,
            images: req.images,
            available_from: req.available_from,
            available_to: req.available_to,
            status: req.status.map(Into::into),
            owner_email: req.owner_email,
            owner_phone: req.owner_phone,
        }
    }
}

impl From<ListListingsQuery> for ListingFilter {
    fn from(q: ListListingsQuery) -> Self {
        Self {
            landlord_id: q.landlord_id,
            status: q.status.map(Into::into),
        }
    }
}

// --- bookings ---

/// Booking with its listing populated
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookingDto {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub student_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_price: i64,
    /// pending | confirmed | cancelled | completed
    pub status: String,
    /// pending | paid | refunded
    pub payment_status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub listing: ListingDto,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateBookingReq {
    pub listing_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_price: i64,
}

/// Requested status is kept as text; values outside the lifecycle are rejected by the service.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateBookingStatusReq {
    pub status: String,
}

impl From<BookingWithListing> for BookingDto {
    fn from(bl: BookingWithListing) -> Self {
        let b = bl.booking;
        Self {
            id: b.id,
            listing_id: b.listing_id,
            student_id: b.student_id,
            start_date: b.start_date,
            end_date: b.end_date,
            total_price: b.total_price,
            status: b.status.as_str().to_string(),
            payment_status: b.payment_status.as_str().to_string(),
            created_at: b.created_at,
            updated_at: b.updated_at,
            listing: bl.listing.into(),
        }
    }
}

impl From<CreateBookingReq> for NewBooking {
    fn from(req: CreateBookingReq) -> Self {
        Self {
            listing_id: req.listing_id,
            start_date: req.start_date,
            end_date: req.end_date,
            total_price: req.total_price,
        }
    }
}

// --- favorites ---

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FavoriteDto {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub listing: ListingDto,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FavoriteToggleDto {
    pub listing_id: Uuid,
    /// State after the toggle.
    pub added: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FavoriteCheckDto {
    pub listing_id: Uuid,
    pub is_favorite: bool,
}

impl From<FavoriteWithListing> for FavoriteDto {
    fn from(fl: FavoriteWithListing) -> Self {
        Self {
            id: fl.favorite.id,
            listing_id: fl.favorite.listing_id,
            created_at: fl.favorite.created_at,
            listing: fl.listing.into(),
        }
    }
}

impl From<FavoriteToggle> for FavoriteToggleDto {
    fn from(t: FavoriteToggle) -> Self {
        Self {
            listing_id: t.listing_id,
            added: t.added,
        }
    }
}

// --- profiles ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RoomTypeDto {
    Single,
    Double,
    Shared,
    Any,
}

impl From<RoomType> for RoomTypeDto {
    fn from(r: RoomType) -> Self {
        match r {
            RoomType::Single => Self::Single,
            RoomType::Double => Self::Double,
            RoomType::Shared => Self::Shared,
            RoomType::Any => Self::Any,
        }
    }
}

impl From<RoomTypeDto> for RoomType {
    fn from(r: RoomTypeDto) -> Self {
        match r {
            RoomTypeDto::Single => Self::Single,
            RoomTypeDto::Double => Self::Double,
            RoomTypeDto::Shared => Self::Shared,
            RoomTypeDto::Any => Self::Any,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EmergencyContactDto {
    pub name: String,
    pub relationship: String,
    pub phone_number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PreferencesDto {
    pub room_type: RoomTypeDto,
    pub price_min: Option<i64>,
    pub price_max: Option<i64>,
    pub amenities: Vec<String>,
    pub locations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProfileDto {
    pub user_id: Uuid,
    pub bio: String,
    pub phone_number: String,
    pub address: String,
    pub emergency_contact: EmergencyContactDto,
    pub preferences: PreferencesDto,
    pub profile_picture: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct EmergencyContactPatchDto {
    pub name: Option<String>,
    pub relationship: Option<String>,
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct PreferencesPatchDto {
    pub room_type: Option<RoomTypeDto>,
    pub price_min: Option<i64>,
    pub price_max: Option<i64>,
    pub amenities: Option<Vec<String>>,
    pub locations: Option<Vec<String>>,
}

/// Partial profile update; nested objects merge field by field.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateProfileReq {
    pub bio: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub emergency_contact: Option<EmergencyContactPatchDto>,
    pub preferences: Option<PreferencesPatchDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProfilePictureReq {
    pub url: String,
}

impl From<EmergencyContact> for EmergencyContactDto {
    fn from(c: EmergencyContact) -> Self {
        Self {
            name: c.name,
            relationship: c.relationship,
            phone_number: c.phone_number,
        }
    }
}

impl From<Preferences> for PreferencesDto {
    fn from(p: Preferences) -> Self {
        Self {
            room_type: p.room_type.into(),
            price_min: p.price_min,
            price_max: p.price_max,
            amenities: p.amenities,
            locations: p.locations,
        }
    }
}

impl From<Profile> for ProfileDto {
    fn from(p: Profile) -> Self {
        Self {
            user_id: p.user_id,
            bio: p.bio,
            phone_number: p.phone_number,
            address: p.address,
            emergency_contact: p.emergency_contact.into(),
            preferences: p.preferences.into(),
            profile_picture: p.profile_picture,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

impl From<UpdateProfileReq> for ProfilePatch {
    fn from(req: UpdateProfileReq) -> Self {
        Self {
            bio: req.bio,
            phone_number: req.phone_number,
            address: req.address,
            emergency_contact: req.emergency_contact.map(|c| EmergencyContactPatch {
                name: c.name,
                relationship: c.relationship,
                phone_number: c.phone_number,
            }),
            preferences: req.preferences.map(|p| PreferencesPatch {
                room_type: p.room_type.map(Into::into),
                price_min: p.price_min,
                price_max: p.price_max,
                amenities: p.amenities,
                locations: p.locations,
            }),
        }
    }
}
