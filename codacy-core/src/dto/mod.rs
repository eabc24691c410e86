//! Data Transfer Objects
//!
//! Wire shapes of the external APIs. These are deserialized from responses
//! and converted into domain types at the client boundary.

pub mod analysis;
