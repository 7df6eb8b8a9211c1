//! Plain-text rendering of fetched payloads for the shell.

use brokerlens_core::format::parse_number;
use brokerlens_core::table::{Align, Column, Formatter, RenderedTable, TableView};
use brokerlens_core::Record;
use serde_json::Value;

/// Rows contained in a payload.
///
/// Accepts an array of records, an object holding such an array (the first
/// array-of-objects field wins) or a single record.
pub fn records(payload: &Value) -> Vec<Record> {
    fn objects(items: &[Value]) -> Vec<Record> {
        items.iter().filter_map(|v| v.as_object().cloned()).collect()
    }

    match payload {
        Value::Array(items) => objects(items),
        Value::Object(fields) => fields
            .values()
            .find_map(|v| match v {
                Value::Array(items) if items.iter().any(Value::is_object) => Some(objects(items)),
                _ => None,
            })
            .unwrap_or_else(|| vec![fields.clone()]),
        _ => Vec::new(),
    }
}

fn is_numeric_column(rows: &[Record], key: &str) -> bool {
    let mut seen = false;
    for value in rows.iter().filter_map(|row| row.get(key)) {
        match value {
            Value::Null => {}
            Value::Number(_) => seen = true,
            Value::String(s) if parse_number(s).is_some() => seen = true,
            _ => return false,
        }
    }
    seen
}

fn numeric_formatter(key: &str) -> Formatter {
    let key = key.to_lowercase();
    let has = |words: &[&str]| words.iter().any(|w| key.contains(w));

    if has(&["premium", "revenue", "amount", "commission", "value", "cost"]) {
        Formatter::currency()
    } else if has(&["rate", "ratio", "pct", "percent", "share"]) {
        Formatter::percent(1)
    } else if has(&["count", "policies", "policy", "total", "num"]) {
        Formatter::count()
    } else {
        Formatter::number(2)
    }
}

/// "broker_name" -> "Broker Name"
fn label_for(key: &str) -> String {
    key.split(['_', '-'])
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Columns for an ad-hoc payload, in first-seen field order
pub fn infer_columns(rows: &[Record]) -> Vec<Column> {
    let mut keys: Vec<&String> = Vec::new();
    for row in rows {
        for key in row.keys() {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
    }

    keys.into_iter()
        .map(|key| {
            let column = Column::new(key.clone(), label_for(key));
            if is_numeric_column(rows, key) {
                column.numeric(numeric_formatter(key))
            } else {
                column
            }
        })
        .collect()
}

/// Find a column by key or label, case-insensitively
pub fn find_column<'a>(columns: &'a [Column], name: &str) -> Option<&'a Column> {
    columns.iter().find(|c| {
        c.key.eq_ignore_ascii_case(name) || c.label.eq_ignore_ascii_case(name)
    })
}

fn pad(text: &str, width: usize, align: Align) -> String {
    match align {
        Align::Left => format!("{text:<width$}"),
        Align::Center => format!("{text:^width$}"),
        Align::Right => format!("{text:>width$}"),
    }
}

/// Render a table page as aligned text lines
pub fn table_lines(table: &RenderedTable) -> Vec<String> {
    let headers: Vec<String> = table
        .headers
        .iter()
        .map(|h| match h.sorted {
            Some(direction) => format!("{} {}", h.label, direction.indicator()),
            None => h.label.clone(),
        })
        .collect();

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            table
                .rows
                .iter()
                .filter_map(|row| row.get(i))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .zip(&table.headers)
            .map(|((cell, width), header)| pad(cell, *width, header.align))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let total_width = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
    let mut lines = vec![line(headers.as_slice()), "-".repeat(total_width)];

    match &table.placeholder {
        Some(placeholder) => lines.push(pad(placeholder, total_width, Align::Center)),
        None => lines.extend(table.rows.iter().map(|row| line(row.as_slice()))),
    }

    lines.push(format!(
        "Page {} of {}  (rows {}-{} of {})",
        table.page_index + 1,
        table.page_count,
        table.first_row,
        table.last_row,
        table.total_rows
    ));
    lines
}

/// Render `rows` through `view` and print them
pub fn print_table(view: &TableView, rows: &[Record]) {
    let columns = infer_columns(rows);
    for line in table_lines(&view.render(&columns, rows)) {
        println!("{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_records_from_wrapped_and_bare_payloads() {
        let bare = json!([{"broker": "Acme"}, 3, {"broker": "Zenith"}]);
        assert_eq!(records(&bare).len(), 2);

        let nested = json!({"period": "2026", "brokers": [{"broker": "Acme"}]});
        assert_eq!(records(&nested)[0]["broker"], json!("Acme"));

        let single = json!({"total_premium": "100"});
        assert_eq!(records(&single).len(), 1);

        assert!(records(&json!("text")).is_empty());
    }

    #[test]
    fn test_infer_columns_picks_formatters() {
        let rows = records(&json!([
            {"broker_name": "Acme", "total_premium": "1234.6", "loss_ratio": 61.27, "policy_count": 12},
            {"broker_name": "Zenith", "total_premium": null, "loss_ratio": "40", "policy_count": 3},
        ]));
        let columns = infer_columns(&rows);

        let broker = find_column(&columns, "broker name").unwrap();
        assert_eq!(broker.align, Align::Left);
        assert_eq!(broker.render(rows[0].get("broker_name")), "Acme");

        let premium = find_column(&columns, "total_premium").unwrap();
        assert_eq!(premium.align, Align::Right);
        assert_eq!(premium.render(rows[0].get("total_premium")), "$1,235");

        let ratio = find_column(&columns, "loss_ratio").unwrap();
        assert_eq!(ratio.render(rows[0].get("loss_ratio")), "61.3%");

        let count = find_column(&columns, "Policy Count").unwrap();
        assert_eq!(count.render(rows[0].get("policy_count")), "12");
    }

    #[test]
    fn test_table_lines_show_placeholder_and_pager() {
        let view = TableView::default();
        let columns = vec![Column::new("broker", "Broker")];
        let lines = table_lines(&view.render(&columns, &[]));

        assert_eq!(lines[0], "Broker");
        assert!(lines[2].contains("No data available"));
        assert_eq!(lines[3], "Page 1 of 1  (rows 0-0 of 0)");
    }

    #[test]
    fn test_label_for_snake_case() {
        assert_eq!(label_for("broker_name"), "Broker Name");
        assert_eq!(label_for("state"), "State");
    }
}
