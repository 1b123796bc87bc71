use std::collections::HashMap;

use tracing::debug;

use crate::config::DEFAULT_TOP_STATES;
use crate::models::{AggregateResult, Bucket, CustomerRecord, Metrics};

/// Groups values by label, keeping labels in first-seen order.
struct OrderedGroups<V> {
    index: HashMap<String, usize>,
    buckets: Vec<Bucket<V>>,
}

impl<V: Default> OrderedGroups<V> {
    fn new() -> Self {
        Self {
            index: HashMap::new(),
            buckets: Vec::new(),
        }
    }

    fn entry(&mut self, label: &str) -> &mut V {
        let slot = match self.index.get(label) {
            Some(&slot) => slot,
            None => {
                let slot = self.buckets.len();
                self.index.insert(label.to_string(), slot);
                self.buckets.push(Bucket::new(label, V::default()));
                slot
            }
        };
        &mut self.buckets[slot].value
    }

    fn into_buckets(self) -> Vec<Bucket<V>> {
        self.buckets
    }
}

pub fn aggregate<'a, I>(records: I) -> AggregateResult
where
    I: IntoIterator<Item = &'a CustomerRecord>,
{
    aggregate_with_limit(records, DEFAULT_TOP_STATES)
}

/// Single pass over `records`; `top_states` bounds the revenue ranking.
pub fn aggregate_with_limit<'a, I>(records: I, top_states: usize) -> AggregateResult
where
    I: IntoIterator<Item = &'a CustomerRecord>,
{
    let mut total_customers = 0usize;
    let mut total_revenue = 0.0f64;
    let mut satisfaction_sum = 0.0f64;
    let mut churned = 0usize;

    let mut churn_distribution: OrderedGroups<usize> = OrderedGroups::new();
    let mut device_satisfaction: OrderedGroups<(f64, usize)> = OrderedGroups::new();
    let mut state_revenue: OrderedGroups<f64> = OrderedGroups::new();
    let mut churn_reasons = ReasonCounter::new();

    for record in records {
        total_customers += 1;
        total_revenue += record.total_revenue;
        satisfaction_sum += record.satisfaction_rate;
        if record.is_churned() {
            churned += 1;
        }

        *churn_distribution.entry(record.churn_status.as_str()) += 1;

        let device = device_satisfaction.entry(&record.device);
        device.0 += record.satisfaction_rate;
        device.1 += 1;

        *state_revenue.entry(&record.state) += record.total_revenue;

        churn_reasons.observe(record);
    }

    let metrics = Metrics {
        total_customers,
        total_revenue,
        churn_rate: round2(ratio(churned as f64 * 100.0, total_customers)),
        avg_satisfaction: round2(ratio(satisfaction_sum, total_customers)),
        arpu: round2(ratio(total_revenue, total_customers)),
    };

    let satisfaction_by_device = device_satisfaction
        .into_buckets()
        .into_iter()
        .map(|bucket| {
            let (sum, count) = bucket.value;
            Bucket::new(bucket.label, ratio(sum, count))
        })
        .collect();

    debug!(
        customers = total_customers,
        churned, "aggregated customer subset"
    );

    AggregateResult {
        metrics,
        churn_distribution: churn_distribution.into_buckets(),
        satisfaction_by_device,
        revenue_by_state: rank_top(state_revenue.into_buckets(), top_states),
        churn_reasons: churn_reasons.finish(),
    }
}

/// Counts churn reasons of churned customers; blank reasons are skipped.
struct ReasonCounter {
    groups: OrderedGroups<usize>,
}

impl ReasonCounter {
    fn new() -> Self {
        Self {
            groups: OrderedGroups::new(),
        }
    }

    fn observe(&mut self, record: &CustomerRecord) {
        if !record.is_churned() {
            return;
        }
        match record.churn_reason.as_deref() {
            Some(reason) if !reason.is_empty() => *self.groups.entry(reason) += 1,
            _ => {}
        }
    }

    fn finish(self) -> Vec<Bucket<usize>> {
        self.groups.into_buckets()
    }
}

/// Summed revenue per state in first-seen order, with no truncation.
pub fn revenue_by_state_all<'a, I>(records: I) -> Vec<Bucket<f64>>
where
    I: IntoIterator<Item = &'a CustomerRecord>,
{
    let mut groups: OrderedGroups<f64> = OrderedGroups::new();
    for record in records {
        *groups.entry(&record.state) += record.total_revenue;
    }
    groups.into_buckets()
}

/// Stable descending sort by value, truncated to `limit`.
fn rank_top(mut buckets: Vec<Bucket<f64>>, limit: usize) -> Vec<Bucket<f64>> {
    buckets.sort_by(|a, b| {
        b.value
            .partial_cmp(&a.value)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    buckets.truncate(limit);
    buckets
}

fn ratio(numerator: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        numerator / count as f64
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Each value's share of the series total, in percent.
pub fn share_percentages(values: &[f64]) -> Vec<f64> {
    let total: f64 = values.iter().sum();
    values
        .iter()
        .map(|value| if total == 0.0 { 0.0 } else { value * 100.0 / total })
        .collect()
}

/// A 0-5 satisfaction score as a percentage of the maximum.
pub fn satisfaction_percent(score: f64) -> f64 {
    score / 5.0 * 100.0
}
