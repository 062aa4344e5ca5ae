//! Network code identifying an Ad Manager network

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ad Manager network code (e.g. "12345678")
///
/// Kept as a string: it is only ever echoed into headers and sheet names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NetworkCode(pub String);

impl NetworkCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NetworkCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for NetworkCode {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for NetworkCode {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
