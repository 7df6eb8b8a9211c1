use brokerlens_types::Record;
use serde_json::Value;

use super::column::plain_text;
use crate::format::to_number;

const UNKNOWN_CATEGORY: &str = "Unknown";

fn category_name(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => UNKNOWN_CATEGORY.to_string(),
        Some(value) => plain_text(value),
    }
}

/// Distinct values of `key` in first-seen order
pub fn categories(rows: &[Record], key: &str) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for row in rows {
        let name = category_name(row.get(key));
        if !seen.contains(&name) {
            seen.push(name);
        }
    }
    seen
}

/// Reshape long rows (`period, category, value`) into one wide record per
/// period with one numeric field per category, for multi-series charts.
///
/// Periods keep first-seen order, every category appears on every record
/// (0 when absent) and duplicate period/category pairs are summed. Rows
/// without a period are skipped.
pub fn pivot(rows: &[Record], row_key: &str, category_key: &str, value_key: &str) -> Vec<Record> {
    let series = categories(rows, category_key);
    let mut wide: Vec<(Value, Record)> = Vec::new();

    for row in rows {
        let Some(period) = row.get(row_key).filter(|v| !v.is_null()) else {
            continue;
        };

        let index = match wide.iter().position(|(p, _)| p == period) {
            Some(index) => index,
            None => {
                let mut record = Record::new();
                record.insert(row_key.to_string(), period.clone());
                for name in &series {
                    record.insert(name.clone(), Value::from(0.0));
                }
                wide.push((period.clone(), record));
                wide.len() - 1
            }
        };

        let category = category_name(row.get(category_key));
        let amount = row.get(value_key).map(to_number).unwrap_or(0.0);
        let record = &mut wide[index].1;
        let total = record.get(&category).map(to_number).unwrap_or(0.0) + amount;
        record.insert(category, Value::from(total));
    }

    wide.into_iter().map(|(_, record)| record).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows(values: Value) -> Vec<Record> {
        serde_json::from_value(values).unwrap()
    }

    #[test]
    fn test_pivot_by_month_and_product() {
        let data = rows(json!([
            {"month": "2026-01", "product": "Auto", "premium": "100.5"},
            {"month": "2026-01", "product": "Home", "premium": "50"},
            {"month": "2026-02", "product": "Auto", "premium": "80"},
            {"month": "2026-02", "product": "Auto", "premium": "20"},
        ]));

        let wide = pivot(&data, "month", "product", "premium");
        assert_eq!(wide.len(), 2);
        assert_eq!(
            Value::Object(wide[0].clone()),
            json!({"month": "2026-01", "Auto": 100.5, "Home": 50.0})
        );
        assert_eq!(
            Value::Object(wide[1].clone()),
            json!({"month": "2026-02", "Auto": 100.0, "Home": 0.0})
        );
    }

    #[test]
    fn test_categories_first_seen_with_unknown_for_null() {
        let data = rows(json!([
            {"product": "Home"},
            {"product": null},
            {"product": "Auto"},
            {"product": "Home"},
        ]));
        assert_eq!(categories(&data, "product"), ["Home", "Unknown", "Auto"]);
    }

    #[test]
    fn test_rows_without_period_are_skipped() {
        let data = rows(json!([
            {"product": "Auto", "premium": "5"},
            {"month": "2026-03", "product": "Auto", "premium": "7"},
        ]));
        let wide = pivot(&data, "month", "product", "premium");
        assert_eq!(wide.len(), 1);
        assert_eq!(wide[0]["Auto"], json!(7.0));
    }
}
