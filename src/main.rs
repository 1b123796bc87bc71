use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use customer_churn_insights::config::{DEFAULT_PAGE_SIZE, DEFAULT_TOP_STATES};
use customer_churn_insights::report::{format_naira, ExportRows};
use customer_churn_insights::{
    build_report, export_rows, write_csv, DashboardConfig, DashboardSession, FilterState,
    RecordStore, ReportKind, Selector,
};

#[derive(Parser)]
#[command(name = "churn-insights")]
#[command(about = "Churn, revenue and satisfaction insights over a customer dataset", long_about = None)]
struct Cli {
    /// Dataset file (.csv, .json, or the dashboard's data.js); falls back to CHURN_DATASET
    #[arg(long, global = true)]
    data: Option<PathBuf>,
    #[arg(long, global = true, default_value_t = DEFAULT_PAGE_SIZE)]
    page_size: usize,
    #[arg(long, global = true, default_value_t = DEFAULT_TOP_STATES)]
    top_states: usize,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct FilterArgs {
    #[arg(long, default_value = "All")]
    state: String,
    #[arg(long, default_value = "All")]
    device: String,
    #[arg(long, default_value = "All")]
    plan: String,
}

impl FilterArgs {
    fn to_filter_state(&self) -> FilterState {
        FilterState {
            state: Selector::from(self.state.as_str()),
            device: Selector::from(self.device.as_str()),
            plan: Selector::from(self.plan.as_str()),
            query: String::new(),
        }
    }

    fn scope_label(&self) -> Option<String> {
        let parts: Vec<&str> = [&self.state, &self.device, &self.plan]
            .into_iter()
            .map(String::as_str)
            .filter(|value| *value != "All")
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" / "))
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List the values available to each filter
    Filters,
    /// Show metrics and grouped series for a filter selection
    Summary {
        #[command(flatten)]
        filters: FilterArgs,
        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Page through customers, optionally searching by name or id
    Customers {
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Write a CSV export of the whole dataset
    Export {
        #[arg(value_enum)]
        kind: ReportKind,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Generate a markdown report
    Report {
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

fn write_export(out: &Path, rows: &ExportRows) -> anyhow::Result<()> {
    let file = std::fs::File::create(out)
        .with_context(|| format!("failed to create {}", out.display()))?;
    write_csv(rows, file).with_context(|| format!("failed to write {}", out.display()))
}

fn write_report(out: &Path, report: &str) -> anyhow::Result<()> {
    std::fs::write(out, report).with_context(|| format!("failed to write {}", out.display()))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("customer_churn_insights=info")),
        )
        .init();

    let cli = Cli::parse();
    let data_path = match cli.data {
        Some(path) => path,
        None => std::env::var("CHURN_DATASET")
            .map(PathBuf::from)
            .context("pass --data or set CHURN_DATASET to the customer dataset file")?,
    };

    let config = DashboardConfig {
        page_size: cli.page_size,
        top_states: cli.top_states,
    };
    config.validate().context("invalid dashboard configuration")?;

    let store = RecordStore::load(&data_path)
        .with_context(|| format!("failed to load dataset from {}", data_path.display()))?;
    let mut session = DashboardSession::new(&store, config);

    match cli.command {
        Commands::Filters => {
            let options = store.filter_options();
            println!("States: {}", options.states.join(", "));
            println!("Devices: {}", options.devices.join(", "));
            println!("Plans: {}", options.plans.join(", "));
        }
        Commands::Summary { filters, json } => {
            session.apply_filters(filters.to_filter_state());
            let result = session.dashboard();

            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&result).context("failed to serialise summary")?
                );
                return Ok(());
            }

            let metrics = &result.metrics;
            println!("Total revenue: {}", format_naira(metrics.total_revenue));
            println!("Total customers: {}", metrics.total_customers);
            println!("Churn rate: {:.2}%", metrics.churn_rate);
            println!("Avg satisfaction: {:.2}/5", metrics.avg_satisfaction);
            println!("ARPU: {}", format_naira(metrics.arpu));

            println!("Churn distribution:");
            for bucket in &result.churn_distribution {
                println!("- {}: {}", bucket.label, bucket.value);
            }
            println!("Satisfaction by device:");
            for bucket in &result.satisfaction_by_device {
                println!("- {}: {:.2}", bucket.label, bucket.value);
            }
            println!("Top states by revenue:");
            for bucket in &result.revenue_by_state {
                println!("- {}: {}", bucket.label, format_naira(bucket.value));
            }
            println!("Churn reasons:");
            for bucket in &result.churn_reasons {
                println!("- {}: {}", bucket.label, bucket.value);
            }
        }
        Commands::Customers { search, page } => {
            session.set_query(search);
            session.go_to_page(page);
            let view = session.customers();

            if view.items.is_empty() {
                println!("No customers on this page.");
            }
            for customer in &view.items {
                println!(
                    "{} | {} | {} | {} | {} | {}",
                    customer.customer_id,
                    customer.full_name,
                    customer.state,
                    customer.subscription_plan,
                    format_naira(customer.total_revenue),
                    customer.churn_status
                );
            }
            println!(
                "{} ({} customers){}{}",
                view.label(),
                view.total_items,
                if view.has_prev { ", prev available" } else { "" },
                if view.has_next { ", next available" } else { "" }
            );
        }
        Commands::Export { kind, out } => {
            let out = out.unwrap_or_else(|| PathBuf::from(kind.default_file_name()));
            let rows = export_rows(store.records(), kind);
            write_export(&out, &rows)?;
            println!(
                "Wrote {} rows to {}.",
                rows.len().saturating_sub(1),
                out.display()
            );
        }
        Commands::Report { filters, out } => {
            session.apply_filters(filters.to_filter_state());
            let result = session.dashboard();
            let scope = filters.scope_label();
            let report = build_report(scope.as_deref(), Utc::now().date_naive(), &result);
            write_report(&out, &report)?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
