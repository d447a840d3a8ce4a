//! Looks up movie crew members stored in DynamoDB.

pub mod config;
pub mod crew;
pub mod error;
pub mod handler;
pub mod params;
pub mod query;
pub mod store;
