use std::fmt::Write;
use std::io;

use chrono::NaiveDate;

use crate::aggregate::{aggregate, revenue_by_state_all, satisfaction_percent, share_percentages};
use crate::error::Result;
use crate::models::{AggregateResult, Bucket, CustomerRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportKind {
    Executive,
    Churn,
    Revenue,
}

impl ReportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Executive => "executive",
            ReportKind::Churn => "churn",
            ReportKind::Revenue => "revenue",
        }
    }

    pub fn default_file_name(&self) -> String {
        format!("{}_report.csv", self.as_str())
    }
}

/// Header row first, then one row per metric or group.
pub type ExportRows = Vec<Vec<String>>;

pub fn export_rows(records: &[CustomerRecord], kind: ReportKind) -> ExportRows {
    match kind {
        ReportKind::Executive => {
            let total_revenue: f64 = records.iter().map(|record| record.total_revenue).sum();
            vec![
                row(["Metric", "Value"]),
                vec!["Total Customers".to_string(), records.len().to_string()],
                vec!["Total Revenue".to_string(), total_revenue.to_string()],
            ]
        }
        ReportKind::Churn => {
            let mut rows = vec![row(["Reason", "Count"])];
            rows.extend(
                aggregate(records)
                    .churn_reasons
                    .into_iter()
                    .map(|bucket| vec![bucket.label, bucket.value.to_string()]),
            );
            rows
        }
        ReportKind::Revenue => {
            let mut rows = vec![row(["State", "Total Revenue"])];
            rows.extend(
                revenue_by_state_all(records)
                    .into_iter()
                    .map(|bucket| vec![bucket.label, bucket.value.to_string()]),
            );
            rows
        }
    }
}

fn row<const N: usize>(cells: [&str; N]) -> Vec<String> {
    cells.iter().map(|cell| cell.to_string()).collect()
}

/// Writes rows as CRLF-terminated CSV.
pub fn write_csv<W: io::Write>(rows: &ExportRows, writer: W) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .flexible(true)
        .from_writer(writer);
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Whole-unit naira amount with thousands separators, e.g. `₦1,234,568`.
pub fn format_naira(amount: f64) -> String {
    let rounded = amount.round().max(0.0) as u64;
    let digits = rounded.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("₦{grouped}")
}

fn shares_of<T>(series: &[Bucket<T>], value: impl Fn(&T) -> f64) -> Vec<f64> {
    let values: Vec<f64> = series.iter().map(|bucket| value(&bucket.value)).collect();
    share_percentages(&values)
}

pub fn build_report(scope: Option<&str>, generated_on: NaiveDate, result: &AggregateResult) -> String {
    let mut output = String::new();
    let scope_label = scope.unwrap_or("all customers");
    let metrics = &result.metrics;

    let _ = writeln!(output, "# Customer Churn Report");
    let _ = writeln!(output, "Generated for {} on {}", scope_label, generated_on);
    let _ = writeln!(output);
    let _ = writeln!(output, "## Key Metrics");
    let _ = writeln!(output, "- Total customers: {}", metrics.total_customers);
    let _ = writeln!(output, "- Total revenue: {}", format_naira(metrics.total_revenue));
    let _ = writeln!(output, "- Churn rate: {:.2}%", metrics.churn_rate);
    let _ = writeln!(output, "- Average satisfaction: {:.2}/5", metrics.avg_satisfaction);
    let _ = writeln!(output, "- ARPU: {}", format_naira(metrics.arpu));

    let _ = writeln!(output);
    let _ = writeln!(output, "## Top States by Revenue");
    if result.revenue_by_state.is_empty() {
        let _ = writeln!(output, "No revenue recorded for this selection.");
    } else {
        let shares = shares_of(&result.revenue_by_state, |revenue| *revenue);
        for (bucket, share) in result.revenue_by_state.iter().zip(shares) {
            let _ = writeln!(
                output,
                "- {}: {} ({:.1}%)",
                bucket.label,
                format_naira(bucket.value),
                share
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Satisfaction by Device");
    if result.satisfaction_by_device.is_empty() {
        let _ = writeln!(output, "No devices recorded for this selection.");
    } else {
        for bucket in result.satisfaction_by_device.iter() {
            let _ = writeln!(
                output,
                "- {}: {:.2}/5 ({:.0}%)",
                bucket.label,
                bucket.value,
                satisfaction_percent(bucket.value)
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Churn Reasons");
    if result.churn_reasons.is_empty() {
        let _ = writeln!(output, "No churn reasons recorded for this selection.");
    } else {
        let shares = shares_of(&result.churn_reasons, |count| *count as f64);
        for (bucket, share) in result.churn_reasons.iter().zip(shares) {
            let _ = writeln!(
                output,
                "- {}: {} customers ({:.1}%)",
                bucket.label, bucket.value, share
            );
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChurnStatus;

    fn customer(id: &str, state: &str, revenue: f64, reason: Option<&str>) -> CustomerRecord {
        CustomerRecord {
            customer_id: id.to_string(),
            full_name: format!("Customer {id}"),
            state: state.to_string(),
            device: "4G Router".to_string(),
            subscription_plan: "Basic".to_string(),
            total_revenue: revenue,
            satisfaction_rate: 4.0,
            churn_status: if reason.is_some() {
                ChurnStatus::Yes
            } else {
                ChurnStatus::No
            },
            churn_reason: reason.filter(|r| !r.is_empty()).map(str::to_string),
        }
    }

    fn sample() -> Vec<CustomerRecord> {
        vec![
            customer("C1", "Lagos", 100.0, None),
            customer("C2", "Abuja", 250.5, Some("Relocation")),
            customer("C3", "Lagos", 50.0, Some("")),
            customer("C4", "Kano", 300.0, Some("Relocation")),
            customer("C5", "Oyo", 10.0, Some("Poor Network")),
        ]
    }

    #[test]
    fn executive_rows_cover_whole_dataset() {
        let rows = export_rows(&sample(), ReportKind::Executive);
        assert_eq!(
            rows,
            vec![
                vec!["Metric", "Value"],
                vec!["Total Customers", "5"],
                vec!["Total Revenue", "710.5"],
            ]
        );
    }

    #[test]
    fn churn_rows_group_reasons_without_blanks() {
        let rows = export_rows(&sample(), ReportKind::Churn);
        assert_eq!(
            rows,
            vec![
                vec!["Reason", "Count"],
                vec!["Relocation", "2"],
                vec!["Poor Network", "1"],
            ]
        );
    }

    #[test]
    fn revenue_rows_list_every_state_in_first_seen_order() {
        let rows = export_rows(&sample(), ReportKind::Revenue);
        assert_eq!(
            rows,
            vec![
                vec!["State", "Total Revenue"],
                vec!["Lagos", "150"],
                vec!["Abuja", "250.5"],
                vec!["Kano", "300"],
                vec!["Oyo", "10"],
            ]
        );
    }

    #[test]
    fn csv_uses_crlf_and_quotes_commas() {
        let rows = vec![
            vec!["State".to_string(), "Total Revenue".to_string()],
            vec!["Abuja, FCT".to_string(), "12".to_string()],
        ];
        let mut buffer = Vec::new();
        write_csv(&rows, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text, "State,Total Revenue\r\n\"Abuja, FCT\",12\r\n");
    }

    #[test]
    fn naira_formatting_groups_thousands() {
        assert_eq!(format_naira(0.0), "₦0");
        assert_eq!(format_naira(999.4), "₦999");
        assert_eq!(format_naira(1234.5), "₦1,235");
        assert_eq!(format_naira(1_234_567.0), "₦1,234,567");
    }

    #[test]
    fn default_file_names_follow_kind() {
        assert_eq!(ReportKind::Churn.default_file_name(), "churn_report.csv");
    }

    #[test]
    fn report_includes_all_sections() {
        let result = aggregate(&sample());
        let date = NaiveDate::from_ymd_opt(2026, 2, 2).unwrap();
        let report = build_report(Some("Lagos"), date, &result);

        assert!(report.contains("Generated for Lagos on 2026-02-02"));
        assert!(report.contains("- Total customers: 5"));
        assert!(report.contains("- Churn rate: 80.00%"));
        assert!(report.contains("- Kano: ₦300 (42.2%)"));
        assert!(report.contains("- 4G Router: 4.00/5 (80%)"));
        assert!(report.contains("- Relocation: 2 customers (66.7%)"));
    }

    #[test]
    fn report_handles_empty_selection() {
        let empty: Vec<CustomerRecord> = Vec::new();
        let result = aggregate(&empty);
        let date = NaiveDate::from_ymd_opt(2026, 2, 2).unwrap();
        let report = build_report(None, date, &result);

        assert!(report.contains("Generated for all customers"));
        assert!(report.contains("No revenue recorded for this selection."));
        assert!(report.contains("No churn reasons recorded for this selection."));
    }
}
