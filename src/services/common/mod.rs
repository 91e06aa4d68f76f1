//! Utilities shared by the services

/// Observable values
pub mod property;

pub use property::Property;
