//! Resource URL derivation from the active filters.
//!
//! Every filter-aware endpoint accepts the same four query parameters:
//!
//! | filter      | parameter    | sent when               |
//! |-------------|--------------|-------------------------|
//! | date range  | `date_range` | always                  |
//! | brokers[0]  | `broker`     | a broker is selected    |
//! | product     | `product`    | product is not `all`    |
//! | state       | `state`      | state is not `all`      |
//!
//! Parameters are emitted in that fixed order and form-urlencoded.

use brokerlens_types::{ALL, DateRange, FilterState};
use url::form_urlencoded;

/// Ordered query parameters for the given filters
pub fn query_params(filters: &FilterState) -> Vec<(&'static str, String)> {
    let mut params = vec![("date_range", filters.date_range.as_token().to_string())];

    // Only the first broker is representable in the query
    if let Some(broker) = filters.broker() {
        params.push(("broker", broker.to_string()));
    }
    if filters.product != ALL {
        params.push(("product", filters.product.clone()));
    }
    if filters.state != ALL {
        params.push(("state", filters.state.clone()));
    }
    params
}

/// Encoded query string (without the leading `?`)
pub fn query_string(filters: &FilterState) -> String {
    encode(&query_params(filters))
}

/// Full resource URL: `base?query`, or `base` alone when there is nothing to send
pub fn resource_url(base: &str, filters: &FilterState) -> String {
    join(base, &query_string(filters))
}

/// URL for the auxiliary option lookups, which always span all time
pub fn lookup_url(path: &str) -> String {
    join(path, &encode(&[("date_range", DateRange::AllTime.as_token().to_string())]))
}

fn encode(params: &[(&str, String)]) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (name, value) in params {
        serializer.append_pair(name, value);
    }
    serializer.finish()
}

fn join(base: &str, query: &str) -> String {
    if query.is_empty() {
        base.to_string()
    } else {
        format!("{base}?{query}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brokerlens_types::FilterValue;

    #[test]
    fn test_default_filters_send_only_date_range() {
        let filters = FilterState::default();
        assert_eq!(query_string(&filters), "date_range=last_6_months");
        assert_eq!(
            resource_url("/api/kpis", &filters),
            "/api/kpis?date_range=last_6_months"
        );
    }

    #[test]
    fn test_broker_performance_example() {
        let filters = FilterState {
            date_range: DateRange::Last30Days,
            brokers: vec!["Acme".to_string()],
            product: "all".to_string(),
            state: "all".to_string(),
        };
        assert_eq!(
            resource_url("/api/brokers/performance", &filters),
            "/api/brokers/performance?date_range=last_30_days&broker=Acme"
        );
    }

    #[test]
    fn test_parameters_present_iff_non_default_in_stable_order() {
        let mut filters = FilterState::default();
        filters.apply(FilterValue::State("New York".into()));
        filters.apply(FilterValue::Product("General Liability".into()));
        assert_eq!(
            query_string(&filters),
            "date_range=last_6_months&product=General+Liability&state=New+York"
        );

        filters.apply(FilterValue::broker("Smith & Sons"));
        let names: Vec<_> = query_params(&filters).into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["date_range", "broker", "product", "state"]);
        assert_eq!(
            query_string(&filters),
            "date_range=last_6_months&broker=Smith+%26+Sons&product=General+Liability&state=New+York"
        );
    }

    #[test]
    fn test_only_first_broker_is_sent() {
        let filters = FilterState {
            brokers: vec!["Acme".into(), "Zenith".into()],
            ..FilterState::default()
        };
        assert_eq!(query_string(&filters), "date_range=last_6_months&broker=Acme");
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let filters = FilterState {
            date_range: DateRange::AllTime,
            brokers: vec!["Acme".into()],
            product: "Auto".into(),
            state: "Texas".into(),
        };
        assert_eq!(query_string(&filters), query_string(&filters.clone()));
    }

    #[test]
    fn test_lookup_url_uses_all_time() {
        assert_eq!(
            lookup_url("/api/filters/states"),
            "/api/filters/states?date_range=all_time"
        );
    }
}
