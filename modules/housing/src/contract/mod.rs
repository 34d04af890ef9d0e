pub mod client;
pub mod error;
pub mod model;

pub use client::HousingApi;
pub use error::HousingError;
pub use model::*;
