//! Shared wire types for the algebra gateway.

mod api;
mod connection;
mod outcome;

pub use api::*;
pub use connection::*;
pub use outcome::*;
