//! Named zero-argument entry points

use anyhow::{Context, Result};
use std::collections::BTreeMap;

/// A registered entry point
pub type Trigger<'a> = Box<dyn Fn() -> Result<()> + 'a>;

#[derive(Debug, thiserror::Error)]
pub enum TriggerError {
    #[error("No trigger named \"{name}\" is registered (available: {})", available.join(", "))]
    Unknown { name: String, available: Vec<String> },
}

/// Maps trigger names (as used by menu items) to callbacks
#[derive(Default)]
pub struct TriggerRegistry<'a> {
    triggers: BTreeMap<String, Trigger<'a>>,
}

impl<'a> TriggerRegistry<'a> {
    pub fn new() -> Self {
        Self {
            triggers: BTreeMap::new(),
        }
    }

    /// Register a callback, replacing any previous one with the same name
    pub fn register<F>(&mut self, name: &str, trigger: F)
    where
        F: Fn() -> Result<()> + 'a,
    {
        self.triggers.insert(name.to_string(), Box::new(trigger));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.triggers.contains_key(name)
    }

    /// Registered names in sorted order
    pub fn names(&self) -> Vec<&str> {
        self.triggers.keys().map(String::as_str).collect()
    }

    /// Run the trigger registered under `name`
    pub fn invoke(&self, name: &str) -> Result<()> {
        let trigger = self
            .triggers
            .get(name)
            .ok_or_else(|| TriggerError::Unknown {
                name: name.to_string(),
                available: self.triggers.keys().cloned().collect(),
            })?;
        trigger().with_context(|| format!("Trigger {} failed", name))
    }
}
