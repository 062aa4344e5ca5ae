//! Ad Manager API integration
//!
//! This module provides:
//! - Access token providers (static token, OAuth2 refresh-token grant)
//! - A SOAP client that performs service operations
//! - A PQL statement builder carrying the pagination cursor

mod auth;
mod client;
pub mod soap;
mod statement;

pub use auth::{AccessTokenProvider, RefreshTokenAuth, StaticToken};
pub use client::{AdManagerClient, AdManagerService, ApiError};
pub use statement::{BindValue, Statement, StatementBuilder, StatementValue};

/// Operation parameters serialized into the SOAP body
pub mod wire {
    use serde::Serialize;

    use super::Statement;

    /// Request body for `*ByStatement` listing operations
    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ByStatementRequest<'a> {
        pub filter_statement: &'a Statement,
    }
}
