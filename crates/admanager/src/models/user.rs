//! User model representing an Ad Manager user

use serde::{Deserialize, Serialize};

/// A user of an Ad Manager network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Ad Manager user ID
    pub id: i64,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Login email address
    #[serde(default)]
    pub email: String,
    /// Name of the role assigned to the user
    #[serde(default)]
    pub role_name: String,
    /// Whether the user can currently sign in
    pub is_active: bool,
}

impl User {
    pub fn new(
        id: i64,
        name: impl Into<String>,
        email: impl Into<String>,
        role_name: impl Into<String>,
        is_active: bool,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
            role_name: role_name.into(),
            is_active,
        }
    }
}

/// One page of users returned by `UserService.getUsersByStatement`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPage {
    /// Total number of users matching the statement (all pages)
    #[serde(default)]
    pub total_result_set_size: i64,
    /// Offset of the first user in this page
    #[serde(default)]
    pub start_index: i64,
    /// Users in this page; absent when the page is past the end
    #[serde(default)]
    pub results: Option<Vec<User>>,
}
