//! Conversions between SeaORM rows and contract models.
//!
//! Status columns hold the lowercase vocabulary of the contract enums; list and
//! nested-profile columns hold JSON.

use anyhow::{Context, Result};
use sea_orm::{prelude::Json, Set};
use serde::{Deserialize, Serialize};

use crate::contract::model::{
    Address, Booking, EmergencyContact, Favorite, Listing, Preferences, Profile, RoomType,
};
use crate::infra::storage::entity::{booking, favorite, listing, profile};

fn strings_to_json(values: &[String]) -> Json {
    Json::from(values.to_vec())
}

fn json_to_strings(value: Json, column: &str) -> Result<Vec<String>> {
    serde_json::from_value(value).with_context(|| format!("column '{column}' is not a string array"))
}

pub fn listing_from_row(row: listing::Model) -> Result<Listing> {
    Ok(Listing {
        id: row.id,
        landlord_id: row.landlord_id,
        title: row.title,
        description: row.description,
        address: Address {
            street: row.street,
            city: row.city,
            state: row.state,
            zip_code: row.zip_code,
            country: row.country,
        },
        monthly_price: row.monthly_price,
        amenities: json_to_strings(row.amenities, "amenities")?,
        images: json_to_strings(row.images, "images")?,
        available_from: row.available_from,
        available_to: row.available_to,
        status: row.status.parse()?,
        owner_email: row.owner_email,
        owner_phone: row.owner_phone,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

pub fn listing_to_active(l: Listing) -> listing::ActiveModel {
    listing::ActiveModel {
        id: Set(l.id),
        landlord_id: Set(l.landlord_id),
        title: Set(l.title),
        description: Set(l.description),
        street: Set(l.address.street),
        city: Set(l.address.city),
        state: Set(l.address.state),
        zip_code: Set(l.address.zip_code),
        country: Set(l.address.country),
        monthly_price: Set(l.monthly_price),
        amenities: Set(strings_to_json(&l.amenities)),
        images: Set(strings_to_json(&l.images)),
        available_from: Set(l.available_from),
        available_to: Set(l.available_to),
        status: Set(l.status.as_str().to_string()),
        owner_email: Set(l.owner_email),
        owner_phone: Set(l.owner_phone),
        created_at: Set(l.created_at),
        updated_at: Set(l.updated_at),
    }
}

pub fn booking_from_row(row: booking::Model) -> Result<Booking> {
    Ok(Booking {
        id: row.id,
        listing_id: row.listing_id,
        student_id: row.student_id,
        start_date: row.start_date,
        end_date: row.end_date,
        total_price: row.total_price,
        status: row.status.parse()?,
        payment_status: row.payment_status.parse()?,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

pub fn booking_to_active(b: Booking) -> booking::ActiveModel {
    booking::ActiveModel {
        id: Set(b.id),
        listing_id: Set(b.listing_id),
        student_id: Set(b.student_id),
        start_date: Set(b.start_date),
        end_date: Set(b.end_date),
        total_price: Set(b.total_price),
        status: Set(b.status.as_str().to_string()),
        payment_status: Set(b.payment_status.as_str().to_string()),
        created_at: Set(b.created_at),
        updated_at: Set(b.updated_at),
    }
}

impl From<favorite::Model> for Favorite {
    fn from(row: favorite::Model) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            listing_id: row.listing_id,
            created_at: row.created_at,
        }
    }
}

pub fn favorite_to_active(f: Favorite) -> favorite::ActiveModel {
    favorite::ActiveModel {
        id: Set(f.id),
        user_id: Set(f.user_id),
        listing_id: Set(f.listing_id),
        created_at: Set(f.created_at),
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct StoredEmergencyContact {
    name: String,
    relationship: String,
    phone_number: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct StoredPreferences {
    room_type: Option<String>,
    price_min: Option<i64>,
    price_max: Option<i64>,
    amenities: Vec<String>,
    locations: Vec<String>,
}

pub fn profile_from_row(row: profile::Model) -> Result<Profile> {
    let contact: StoredEmergencyContact = serde_json::from_value(row.emergency_contact)
        .context("column 'emergency_contact' has an unexpected shape")?;
    let prefs: StoredPreferences = serde_json::from_value(row.preferences)
        .context("column 'preferences' has an unexpected shape")?;
    let room_type = match prefs.room_type.as_deref() {
        Some(s) => s.parse()?,
        None => RoomType::default(),
    };

    Ok(Profile {
        user_id: row.user_id,
        bio: row.bio,
        phone_number: row.phone_number,
        address: row.address,
        emergency_contact: EmergencyContact {
            name: contact.name,
            relationship: contact.relationship,
            phone_number: contact.phone_number,
        },
        preferences: Preferences {
            room_type,
            price_min: prefs.price_min,
            price_max: prefs.price_max,
            amenities: prefs.amenities,
            locations: prefs.locations,
        },
        profile_picture: row.profile_picture,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

pub fn profile_to_active(p: Profile) -> Result<profile::ActiveModel> {
    let contact = serde_json::to_value(StoredEmergencyContact {
        name: p.emergency_contact.name,
        relationship: p.emergency_contact.relationship,
        phone_number: p.emergency_contact.phone_number,
    })?;
    let prefs = serde_json::to_value(StoredPreferences {
        room_type: Some(p.preferences.room_type.as_str().to_string()),
        price_min: p.preferences.price_min,
        price_max: p.preferences.price_max,
        amenities: p.preferences.amenities,
        locations: p.preferences.locations,
    })?;

    Ok(profile::ActiveModel {
        user_id: Set(p.user_id),
        bio: Set(p.bio),
        phone_number: Set(p.phone_number),
        address: Set(p.address),
        emergency_contact: Set(contact),
        preferences: Set(prefs),
        profile_picture: Set(p.profile_picture),
        created_at: Set(p.created_at),
        updated_at: Set(p.updated_at),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn profile_json_columns_tolerate_missing_keys() {
        let now = Utc::now();
        let row = profile::Model {
            user_id: Uuid::new_v4(),
            bio: String::new(),
            phone_number: String::new(),
            address: String::new(),
            emergency_contact: serde_json::json!({ "name": "Ana" }),
            preferences: serde_json::json!({ "room_type": "double", "locations": ["Porto"] }),
            profile_picture: None,
            created_at: now,
            updated_at: now,
        };
        let p = profile_from_row(row).unwrap();
        assert_eq!(p.emergency_contact.name, "Ana");
        assert_eq!(p.emergency_contact.relationship, "");
        assert_eq!(p.preferences.room_type, RoomType::Double);
        assert_eq!(p.preferences.locations, vec!["Porto".to_string()]);
        assert!(p.preferences.price_min.is_none());
    }

    #[test]
    fn unknown_booking_status_in_storage_is_an_error() {
        let now = Utc::now();
        let row = booking::Model {
            id: Uuid::new_v4(),
            listing_id: Uuid::new_v4(),
            student_id: Uuid::new_v4(),
            start_date: now.date_naive(),
            end_date: now.date_naive(),
            total_price: 10,
            status: "approved".into(),
            payment_status: "pending".into(),
            created_at: now,
            updated_at: now,
        };
        assert!(booking_from_row(row).is_err());
    }
}
