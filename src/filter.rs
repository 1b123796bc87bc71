use tracing::debug;

use crate::models::{CustomerRecord, FilterState};

/// Keeps records matching every categorical selector, in input order.
///
/// The free-text query in `state` is not applied here; the customer table
/// searches the full dataset through [`search`] instead.
pub fn filter<'a>(records: &'a [CustomerRecord], state: &FilterState) -> Vec<&'a CustomerRecord> {
    let kept: Vec<&CustomerRecord> = records
        .iter()
        .filter(|record| matches_filters(record, state))
        .collect();
    debug!(input = records.len(), kept = kept.len(), "applied categorical filters");
    kept
}

pub fn matches_filters(record: &CustomerRecord, state: &FilterState) -> bool {
    state.state.matches(&record.state)
        && state.device.matches(&record.device)
        && state.plan.matches(&record.subscription_plan)
}

/// Case-insensitive substring match on full name or customer id.
pub fn search<'a>(records: &'a [CustomerRecord], query: &str) -> Vec<&'a CustomerRecord> {
    let needle = query.to_lowercase();
    records
        .iter()
        .filter(|record| matches_query(record, &needle))
        .collect()
}

/// `needle` must already be lowercased.
fn matches_query(record: &CustomerRecord, needle: &str) -> bool {
    needle.is_empty()
        || record.full_name.to_lowercase().contains(needle)
        || record.customer_id.to_lowercase().contains(needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChurnStatus, Selector};

    fn record(id: &str, name: &str, state: &str, device: &str, plan: &str) -> CustomerRecord {
        CustomerRecord {
            customer_id: id.to_string(),
            full_name: name.to_string(),
            state: state.to_string(),
            device: device.to_string(),
            subscription_plan: plan.to_string(),
            total_revenue: 100.0,
            satisfaction_rate: 3.0,
            churn_status: ChurnStatus::No,
            churn_reason: None,
        }
    }

    fn sample() -> Vec<CustomerRecord> {
        vec![
            record("CUST0001", "Ngozi Berry", "Lagos", "4G Router", "Basic"),
            record("CUST0002", "Zainab Baker", "Abuja", "Mobile SIM Card", "Basic"),
            record("CUST0003", "Saidu Evans", "Lagos", "Mobile SIM Card", "Premium"),
            record("CUST0004", "Chinedu Okafor", "", "4G Router", "Basic"),
            record("CUST0005", "Amaka Obi", "Lagos", "4G Router", "Basic"),
        ]
    }

    fn ids(records: &[&CustomerRecord]) -> Vec<String> {
        records.iter().map(|r| r.customer_id.clone()).collect()
    }

    #[test]
    fn all_selectors_keep_everything() {
        let data = sample();
        let kept = filter(&data, &FilterState::all());
        assert_eq!(kept.len(), data.len());
    }

    #[test]
    fn selectors_combine_conjunctively_and_keep_order() {
        let data = sample();
        let state = FilterState {
            state: Selector::from("Lagos"),
            device: Selector::from("4G Router"),
            ..FilterState::default()
        };
        assert_eq!(ids(&filter(&data, &state)), vec!["CUST0001", "CUST0005"]);
    }

    #[test]
    fn plan_filter_is_case_sensitive() {
        let data = sample();
        let state = FilterState {
            plan: Selector::from("premium"),
            ..FilterState::default()
        };
        assert!(filter(&data, &state).is_empty());
    }

    #[test]
    fn blank_field_never_matches_a_concrete_value() {
        let data = sample();
        let state = FilterState {
            state: Selector::Only(String::new()),
            ..FilterState::default()
        };
        assert!(filter(&data, &state).is_empty());
    }

    #[test]
    fn filter_ignores_query() {
        let data = sample();
        let state = FilterState {
            query: "nobody".to_string(),
            ..FilterState::default()
        };
        assert_eq!(filter(&data, &state).len(), data.len());
    }

    #[test]
    fn search_matches_name_or_id_case_insensitively() {
        let data = sample();
        assert_eq!(ids(&search(&data, "BAKER")), vec!["CUST0002"]);
        assert_eq!(ids(&search(&data, "cust0003")), vec!["CUST0003"]);
        assert_eq!(search(&data, "cust").len(), 5);
    }

    #[test]
    fn empty_query_returns_everything_and_misses_return_nothing() {
        let data = sample();
        assert_eq!(search(&data, "").len(), data.len());
        assert!(search(&data, "zzz-not-there").is_empty());
    }
}
