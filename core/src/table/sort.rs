use std::cmp::Ordering;

use brokerlens_types::Record;
use serde_json::Value;

use super::column::plain_text;
use crate::format::parse_number;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn indicator(self) -> &'static str {
        match self {
            SortDirection::Asc => "▲",
            SortDirection::Desc => "▼",
        }
    }
}

/// A present cell, classified once so every pair compares the same way
enum Cell {
    Number(f64),
    Text(String),
}

impl Cell {
    fn classify(value: &Value) -> Self {
        let number = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => parse_number(s),
            _ => None,
        };
        match number {
            Some(n) => Cell::Number(n),
            None => Cell::Text(plain_text(value)),
        }
    }

    fn compare(&self, other: &Cell) -> Ordering {
        match (self, other) {
            (Cell::Number(x), Cell::Number(y)) => x.total_cmp(y),
            (Cell::Text(x), Cell::Text(y)) => x
                .to_lowercase()
                .cmp(&y.to_lowercase())
                .then_with(|| x.cmp(y)),
            (Cell::Number(_), Cell::Text(_)) => Ordering::Less,
            (Cell::Text(_), Cell::Number(_)) => Ordering::Greater,
        }
    }
}

/// Order two cells of one column.
///
/// Absent and null cells go last in both directions. Numeric cells (numbers
/// or numeric strings, as the backend sends them) come before text cells in
/// both directions; the direction only reverses the order within each group.
/// Numbers compare by value, text case-insensitively first.
pub fn compare_cells(a: Option<&Value>, b: Option<&Value>, direction: SortDirection) -> Ordering {
    let a = a.filter(|v| !v.is_null()).map(Cell::classify);
    let b = b.filter(|v| !v.is_null()).map(Cell::classify);

    let (a, b) = match (a, b) {
        (None, None) => return Ordering::Equal,
        (None, Some(_)) => return Ordering::Greater,
        (Some(_), None) => return Ordering::Less,
        (Some(a), Some(b)) => (a, b),
    };

    let same_group = matches!(
        (&a, &b),
        (Cell::Number(_), Cell::Number(_)) | (Cell::Text(_), Cell::Text(_))
    );
    let ordering = a.compare(&b);

    match direction {
        SortDirection::Desc if same_group => ordering.reverse(),
        _ => ordering,
    }
}

/// Stable sort of row references; the source rows are left untouched
pub fn sort_rows<'a>(rows: &'a [Record], key: &str, direction: SortDirection) -> Vec<&'a Record> {
    let mut sorted: Vec<&Record> = rows.iter().collect();
    sorted.sort_by(|a, b| compare_cells(a.get(key), b.get(key), direction));
    sorted
}
