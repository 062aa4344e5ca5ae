//! Domain models for Ad Manager entities

mod network;
mod user;

pub use network::NetworkCode;
pub use user::{User, UserPage};
