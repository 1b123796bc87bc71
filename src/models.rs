use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ChurnStatus {
    Yes,
    No,
}

impl ChurnStatus {
    /// Only an exact `Yes` counts as churned.
    pub fn parse(value: &str) -> Self {
        if value == "Yes" {
            ChurnStatus::Yes
        } else {
            ChurnStatus::No
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChurnStatus::Yes => "Yes",
            ChurnStatus::No => "No",
        }
    }
}

impl fmt::Display for ChurnStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One customer row. Categorical fields are empty when the source had no value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerRecord {
    pub customer_id: String,
    pub full_name: String,
    pub state: String,
    pub device: String,
    pub subscription_plan: String,
    pub total_revenue: f64,
    pub satisfaction_rate: f64,
    pub churn_status: ChurnStatus,
    pub churn_reason: Option<String>,
}

impl CustomerRecord {
    pub fn is_churned(&self) -> bool {
        self.churn_status == ChurnStatus::Yes
    }
}

/// A categorical dropdown value: either no restriction or one exact value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selector {
    #[default]
    All,
    Only(String),
}

impl Selector {
    /// Case-sensitive equality; an empty field never matches a concrete value.
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Selector::All => true,
            Selector::Only(wanted) => !value.is_empty() && value == wanted,
        }
    }
}

impl From<&str> for Selector {
    fn from(value: &str) -> Self {
        if value == "All" {
            Selector::All
        } else {
            Selector::Only(value.to_string())
        }
    }
}

impl From<Option<String>> for Selector {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(value) => Selector::from(value.as_str()),
            None => Selector::All,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub state: Selector,
    pub device: Selector,
    pub plan: Selector,
    /// Free-text search for the customer table
    pub query: String,
}

impl FilterState {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn is_unrestricted(&self) -> bool {
        self.state == Selector::All && self.device == Selector::All && self.plan == Selector::All
    }
}

/// A labelled value in a grouped series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket<T> {
    pub label: String,
    pub value: T,
}

impl<T> Bucket<T> {
    pub fn new(label: impl Into<String>, value: T) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metrics {
    pub total_customers: usize,
    pub total_revenue: f64,
    /// Percent, two decimals
    pub churn_rate: f64,
    pub avg_satisfaction: f64,
    pub arpu: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateResult {
    pub metrics: Metrics,
    pub churn_distribution: Vec<Bucket<usize>>,
    pub satisfaction_by_device: Vec<Bucket<f64>>,
    pub revenue_by_state: Vec<Bucket<f64>>,
    pub churn_reasons: Vec<Bucket<usize>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageView<T> {
    pub items: Vec<T>,
    pub current_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub has_prev: bool,
    pub has_next: bool,
}

impl<T> PageView<T> {
    pub fn label(&self) -> String {
        format!("Page {} of {}", self.current_page, self.total_pages)
    }
}

/// Distinct values offered by the dashboard dropdowns
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub states: Vec<String>,
    pub devices: Vec<String>,
    pub plans: Vec<String>,
}
