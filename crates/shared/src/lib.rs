//! Field schema and wire types shared by the prediction clients.

pub mod domain;
pub mod error;
pub mod protocol;
