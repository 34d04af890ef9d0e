pub mod conflict;
pub mod error;
pub mod lifecycle;
pub mod locks;
pub mod repo;
pub mod service;
