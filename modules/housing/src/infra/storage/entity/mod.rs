pub mod booking;
pub mod favorite;
pub mod listing;
pub mod profile;
