//! User listing
//!
//! Pages through `UserService.getUsersByStatement` and accumulates every
//! user of a network in server order.

mod handler;

pub use handler::{UserHandler, UserService};
