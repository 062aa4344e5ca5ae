//! Output table for a user list

use crate::models::User;

/// Column headers of an exported user list
pub const HEADER: [&str; 5] = ["ID", "Name", "Email", "Role", "Active"];

/// Rows written to the sheet: the header followed by one row per user
///
/// Every row has exactly `HEADER.len()` cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserTable {
    rows: Vec<Vec<String>>,
}

impl UserTable {
    pub fn from_users(users: &[User]) -> Self {
        let mut rows: Vec<Vec<String>> = Vec::with_capacity(users.len() + 1);
        rows.push(HEADER.iter().map(|h| h.to_string()).collect());
        rows.extend(users.iter().map(Self::user_row));
        Self { rows }
    }

    fn user_row(user: &User) -> Vec<String> {
        vec![
            user.id.to_string(),
            user.name.clone(),
            user.email.clone(),
            user.role_name.clone(),
            user.is_active.to_string(),
        ]
    }

    /// All rows including the header
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of user rows
    pub fn data_len(&self) -> usize {
        self.rows.len() - 1
    }

    pub fn into_rows(self) -> Vec<Vec<String>> {
        self.rows
    }
}
