//! Client-side table engine
//!
//! Presents already-aggregated rows as a sorted, paged view. View state is
//! local to one table; the source rows are never reordered or mutated.

mod column;
mod pivot;
mod sort;

use brokerlens_types::Record;

pub use column::{Align, Column, Formatter};
pub use pivot::{categories, pivot};
pub use sort::{SortDirection, compare_cells, sort_rows};

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const EMPTY_PLACEHOLDER: &str = "No data available";

/// Sort and page position of one table instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableView {
    sort_key: Option<String>,
    sort_direction: SortDirection,
    page_index: usize,
    page_size: usize,
}

impl Default for TableView {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl TableView {
    pub fn new(page_size: usize) -> Self {
        Self {
            sort_key: None,
            sort_direction: SortDirection::Asc,
            page_index: 0,
            page_size: page_size.max(1),
        }
    }

    pub fn sort_key(&self) -> Option<&str> {
        self.sort_key.as_deref()
    }

    pub fn sort_direction(&self) -> SortDirection {
        self.sort_direction
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Requested page, before clamping against a row count
    pub fn page_index(&self) -> usize {
        self.page_index
    }

    /// Header click: flip the active column, or sort a new one ascending.
    /// Returns false (and changes nothing) for non-sortable columns.
    pub fn toggle_sort(&mut self, column: &Column) -> bool {
        if !column.sortable {
            return false;
        }
        if self.sort_key.as_deref() == Some(column.key.as_str()) {
            self.sort_direction = self.sort_direction.flipped();
        } else {
            self.sort_key = Some(column.key.clone());
            self.sort_direction = SortDirection::Asc;
        }
        self.page_index = 0;
        true
    }

    /// Called when the underlying row set is re-queried (filter change)
    pub fn reset_page(&mut self) {
        self.page_index = 0;
    }

    pub fn set_page(&mut self, index: usize) {
        self.page_index = index;
    }

    pub fn page_count(&self, total_rows: usize) -> usize {
        total_rows.div_ceil(self.page_size).max(1)
    }

    /// Page index clamped into `0..page_count`
    pub fn clamped_page(&self, total_rows: usize) -> usize {
        self.page_index.min(self.page_count(total_rows) - 1)
    }

    /// Advance one page; no-op on the last page
    pub fn next_page(&mut self, total_rows: usize) -> bool {
        let current = self.clamped_page(total_rows);
        if current + 1 < self.page_count(total_rows) {
            self.page_index = current + 1;
            true
        } else {
            self.page_index = current;
            false
        }
    }

    /// Go back one page; no-op on the first page
    pub fn prev_page(&mut self, total_rows: usize) -> bool {
        let current = self.clamped_page(total_rows);
        self.page_index = current.saturating_sub(1);
        current > 0
    }

    /// Rows in display order (sorted when a sort key is active)
    pub fn ordered<'a>(&self, rows: &'a [Record]) -> Vec<&'a Record> {
        match &self.sort_key {
            Some(key) => sort_rows(rows, key, self.sort_direction),
            None => rows.iter().collect(),
        }
    }

    /// Current page of rows, in display order
    pub fn page<'a>(&self, rows: &'a [Record]) -> Vec<&'a Record> {
        let start = self.clamped_page(rows.len()) * self.page_size;
        self.ordered(rows)
            .into_iter()
            .skip(start)
            .take(self.page_size)
            .collect()
    }

    pub fn render(&self, columns: &[Column], rows: &[Record]) -> RenderedTable {
        let total_rows = rows.len();
        let page_index = self.clamped_page(total_rows);
        let page_count = self.page_count(total_rows);

        let headers = columns
            .iter()
            .map(|column| HeaderCell {
                label: column.label.clone(),
                align: column.align,
                sortable: column.sortable,
                sorted: (self.sort_key.as_deref() == Some(column.key.as_str()))
                    .then_some(self.sort_direction),
            })
            .collect();

        let body: Vec<Vec<String>> = self
            .page(rows)
            .into_iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|column| column.render(row.get(&column.key)))
                    .collect()
            })
            .collect();

        let first_row = if total_rows == 0 {
            0
        } else {
            page_index * self.page_size + 1
        };

        RenderedTable {
            headers,
            placeholder: body.is_empty().then(|| EMPTY_PLACEHOLDER.to_string()),
            rows: body,
            page_index,
            page_count,
            has_prev: page_index > 0,
            has_next: page_index + 1 < page_count,
            first_row,
            last_row: (page_index * self.page_size + self.page_size).min(total_rows),
            total_rows,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCell {
    pub label: String,
    pub align: Align,
    pub sortable: bool,
    pub sorted: Option<SortDirection>,
}

/// Display-ready page of a table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTable {
    pub headers: Vec<HeaderCell>,
    pub rows: Vec<Vec<String>>,
    /// Set instead of rows when there is nothing to show (one row spanning all columns)
    pub placeholder: Option<String>,
    pub page_index: usize,
    pub page_count: usize,
    pub has_prev: bool,
    pub has_next: bool,
    /// 1-based row numbers shown on this page ("11-20 of 25")
    pub first_row: usize,
    pub last_row: usize,
    pub total_rows: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn numbered(n: usize) -> Vec<Record> {
        (0..n)
            .map(|i| {
                let mut row = Record::new();
                row.insert("n".into(), json!(i));
                row
            })
            .collect()
    }

    fn columns() -> Vec<Column> {
        vec![
            Column::new("broker", "Broker"),
            Column::new("premium", "Premium").numeric(Formatter::currency()),
            Column::new("notes", "Notes").sortable(false),
        ]
    }

    #[test]
    fn test_toggle_sort_flips_then_switches_columns() {
        let cols = columns();
        let mut view = TableView::default();
        view.set_page(3);

        assert!(view.toggle_sort(&cols[1]));
        assert_eq!(view.sort_key(), Some("premium"));
        assert_eq!(view.sort_direction(), SortDirection::Asc);
        assert_eq!(view.page_index(), 0);

        view.set_page(2);
        view.toggle_sort(&cols[1]);
        assert_eq!(view.sort_direction(), SortDirection::Desc);
        assert_eq!(view.page_index(), 0);

        view.toggle_sort(&cols[0]);
        assert_eq!(view.sort_key(), Some("broker"));
        assert_eq!(view.sort_direction(), SortDirection::Asc);
    }

    #[test]
    fn test_non_sortable_column_is_ignored() {
        let cols = columns();
        let mut view = TableView::default();
        view.set_page(1);
        assert!(!view.toggle_sort(&cols[2]));
        assert_eq!(view.sort_key(), None);
        assert_eq!(view.page_index(), 1);
    }

    #[test]
    fn test_page_index_clamps_to_last_page() {
        let rows = numbered(25);
        let mut view = TableView::new(10);
        view.set_page(5);

        assert_eq!(view.page_count(rows.len()), 3);
        assert_eq!(view.clamped_page(rows.len()), 2);

        let page = view.page(&rows);
        assert_eq!(page.len(), 5);
        assert_eq!(page[0].get("n"), Some(&json!(20)));

        let rendered = view.render(&[Column::new("n", "N")], &rows);
        assert_eq!(rendered.page_index, 2);
        assert!(rendered.has_prev);
        assert!(!rendered.has_next);
        assert_eq!((rendered.first_row, rendered.last_row), (21, 25));
    }

    #[test]
    fn test_shrinking_row_set_keeps_valid_page() {
        let mut view = TableView::new(10);
        view.set_page(2);
        assert_eq!(view.clamped_page(25), 2);
        assert_eq!(view.clamped_page(8), 0);
        assert_eq!(view.clamped_page(0), 0);
    }

    #[test]
    fn test_navigation_stops_at_ends() {
        let mut view = TableView::new(10);
        assert!(!view.prev_page(25));
        assert!(view.next_page(25));
        assert!(view.next_page(25));
        assert!(!view.next_page(25));
        assert_eq!(view.page_index(), 2);
        assert!(view.prev_page(25));
        assert_eq!(view.page_index(), 1);
    }

    #[test]
    fn test_empty_rows_render_placeholder() {
        let view = TableView::default();
        let rendered = view.render(&columns(), &[]);
        assert!(rendered.rows.is_empty());
        assert_eq!(rendered.placeholder.as_deref(), Some(EMPTY_PLACEHOLDER));
        assert_eq!(rendered.page_count, 1);
        assert!(!rendered.has_prev && !rendered.has_next);
        assert_eq!((rendered.first_row, rendered.last_row), (0, 0));
    }

    #[test]
    fn test_render_formats_cells_and_marks_sorted_header() {
        let cols = columns();
        let rows: Vec<Record> = serde_json::from_value(json!([
            {"broker": "Zenith", "premium": "2500"},
            {"broker": "Acme", "premium": null, "notes": "new"},
        ]))
        .unwrap();

        let mut view = TableView::default();
        view.toggle_sort(&cols[0]);
        let rendered = view.render(&cols, &rows);

        assert_eq!(rendered.headers[0].sorted, Some(SortDirection::Asc));
        assert_eq!(rendered.headers[1].sorted, None);
        assert_eq!(rendered.rows[0], ["Acme", "", "new"]);
        assert_eq!(rendered.rows[1], ["Zenith", "$2,500", ""]);
        assert_eq!(rendered.placeholder, None);

        // Source order untouched
        assert_eq!(rows[0].get("broker"), Some(&Value::from("Zenith")));
    }

    #[test]
    fn test_unsorted_view_keeps_input_order() {
        let rows = numbered(3);
        let view = TableView::default();
        let ordered: Vec<_> = view.ordered(&rows).iter().map(|r| r["n"].clone()).collect();
        assert_eq!(ordered, [json!(0), json!(1), json!(2)]);
    }
}
