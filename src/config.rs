use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const DEFAULT_TOP_STATES: usize = 10;

/// Tunables shared by the session and the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct DashboardConfig {
    /// Rows per page in the customer table
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// How many states the revenue ranking keeps
    #[serde(default = "default_top_states")]
    pub top_states: usize,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_top_states() -> usize {
    DEFAULT_TOP_STATES
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            top_states: DEFAULT_TOP_STATES,
        }
    }
}

impl DashboardConfig {
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(Error::Configuration(
                "page size must be at least 1".to_string(),
            ));
        }
        if self.top_states == 0 {
            return Err(Error::Configuration(
                "top states must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
