use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::models::{ChurnStatus, CustomerRecord, FilterOptions};

/// Immutable dataset loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<CustomerRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Number(f64),
    Text(String),
    Other(serde::de::IgnoredAny),
}

#[derive(Debug, Deserialize)]
struct RawCustomerRow {
    #[serde(rename = "Customer ID", default)]
    customer_id: Option<String>,
    #[serde(rename = "Full Name", default)]
    full_name: Option<String>,
    #[serde(rename = "State", default)]
    state: Option<String>,
    #[serde(rename = "MTN Device", alias = "Device", default)]
    device: Option<String>,
    #[serde(rename = "Subscription Plan", default)]
    subscription_plan: Option<String>,
    #[serde(rename = "Total Revenue", default)]
    total_revenue: Option<RawNumber>,
    #[serde(rename = "Satisfaction Rate", default)]
    satisfaction_rate: Option<RawNumber>,
    #[serde(rename = "Customer Churn Status", default)]
    churn_status: Option<String>,
    #[serde(rename = "Reasons for Churn", default)]
    churn_reason: Option<String>,
}

impl RawCustomerRow {
    fn into_record(self, row: usize) -> Result<CustomerRecord> {
        let customer_id = self
            .customer_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .ok_or(Error::MissingCustomerId { row })?;

        let status_text = self.churn_status.unwrap_or_default();
        let churn_status = ChurnStatus::parse(status_text.trim());
        if churn_status == ChurnStatus::No && status_text.trim() != "No" {
            warn!(row, status = %status_text, "unrecognised churn status, counting as No");
        }

        let churn_reason = self
            .churn_reason
            .map(|reason| reason.trim().to_string())
            .filter(|reason| !reason.is_empty());

        Ok(CustomerRecord {
            total_revenue: coerce_amount(self.total_revenue, row, "Total Revenue"),
            satisfaction_rate: coerce_amount(self.satisfaction_rate, row, "Satisfaction Rate"),
            customer_id,
            full_name: self.full_name.unwrap_or_default(),
            state: self.state.unwrap_or_default(),
            device: self.device.unwrap_or_default(),
            subscription_plan: self.subscription_plan.unwrap_or_default(),
            churn_status,
            churn_reason,
        })
    }
}

/// Turns a raw cell into a non-negative amount. Plain numeric text parses
/// as-is; otherwise currency symbols and thousands separators are stripped.
/// Negative or unusable values become 0.
pub fn parse_amount(text: &str) -> f64 {
    let trimmed = text.trim();
    if let Ok(value) = trimmed.parse::<f64>() {
        return sanitize(value);
    }

    let negative = trimmed
        .chars()
        .take_while(|c| !c.is_ascii_digit())
        .any(|c| c == '-');
    if negative {
        return 0.0;
    }

    let cleaned: String = trimmed
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    cleaned.parse::<f64>().map(sanitize).unwrap_or(0.0)
}

fn sanitize(value: f64) -> f64 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        0.0
    }
}

fn coerce_amount(raw: Option<RawNumber>, row: usize, column: &str) -> f64 {
    match raw {
        None => 0.0,
        Some(RawNumber::Number(value)) => {
            let value_out = sanitize(value);
            if value_out != value {
                debug!(row, column, value, "coerced out-of-range amount to 0");
            }
            value_out
        }
        Some(RawNumber::Text(text)) => {
            let value = parse_amount(&text);
            if value == 0.0 && !text.trim().is_empty() {
                debug!(row, column, text = %text, "coerced non-numeric amount to 0");
            }
            value
        }
        Some(RawNumber::Other(cell)) => {
            debug!(row, column, cell = ?cell, "coerced non-numeric cell to 0");
            0.0
        }
    }
}

fn convert_rows(rows: Vec<RawCustomerRow>) -> Result<Vec<CustomerRecord>> {
    rows.into_iter()
        .enumerate()
        .map(|(index, row)| row.into_record(index + 1))
        .collect()
}

impl RecordStore {
    pub fn from_records(records: Vec<CustomerRecord>) -> Self {
        Self { records }
    }

    /// Loads a `.csv`, `.json`, or dashboard `.js` dataset file.
    pub fn load(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();

        let store = match extension.as_str() {
            "csv" => Self::from_csv_reader(std::fs::File::open(path)?)?,
            "json" => Self::from_json_str(&std::fs::read_to_string(path)?)?,
            "js" => Self::from_js_str(&std::fs::read_to_string(path)?)?,
            other => {
                return Err(Error::UnsupportedFormat(format!(
                    "{} (extension '{}')",
                    path.display(),
                    other
                )))
            }
        };

        info!(
            records = store.len(),
            path = %path.display(),
            "loaded customer dataset"
        );
        Ok(store)
    }

    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let mut rows = Vec::new();
        for result in reader.deserialize::<RawCustomerRow>() {
            rows.push(result?);
        }

        Ok(Self::from_records(convert_rows(rows)?))
    }

    /// Accepts a bare array of rows or an object carrying `raw_data`.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        let rows_value = match value {
            serde_json::Value::Array(rows) => serde_json::Value::Array(rows),
            serde_json::Value::Object(mut object) => object.remove("raw_data").ok_or_else(|| {
                Error::UnsupportedFormat("JSON object has no raw_data array".to_string())
            })?,
            _ => {
                return Err(Error::UnsupportedFormat(
                    "expected a JSON array or object".to_string(),
                ))
            }
        };

        let rows: Vec<RawCustomerRow> = serde_json::from_value(rows_value)?;
        Ok(Self::from_records(convert_rows(rows)?))
    }

    /// Reads the `const dashboardData = {...};` script the dashboard ships with.
    pub fn from_js_str(text: &str) -> Result<Self> {
        let start = text.find('{');
        let end = text.rfind('}');
        match (start, end) {
            (Some(start), Some(end)) if start < end => Self::from_json_str(&text[start..=end]),
            _ => Err(Error::UnsupportedFormat(
                "script does not contain a JSON object".to_string(),
            )),
        }
    }

    pub fn records(&self) -> &[CustomerRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn filter_options(&self) -> FilterOptions {
        FilterOptions {
            states: distinct(self.records.iter().map(|record| record.state.as_str())),
            devices: distinct(self.records.iter().map(|record| record.device.as_str())),
            plans: distinct(
                self.records
                    .iter()
                    .map(|record| record.subscription_plan.as_str()),
            ),
        }
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
