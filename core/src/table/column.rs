use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::format::{
    format_count, format_currency, format_currency_compact, format_number, format_percent,
    to_number,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Pure presentation function applied to a present, non-null cell value
#[derive(Clone)]
pub struct Formatter(Arc<dyn Fn(&Value) -> String + Send + Sync>);

impl Formatter {
    pub fn new(f: impl Fn(&Value) -> String + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn currency() -> Self {
        Self::new(|v| format_currency(to_number(v)))
    }

    pub fn currency_compact() -> Self {
        Self::new(|v| format_currency_compact(to_number(v)))
    }

    pub fn percent(decimals: usize) -> Self {
        Self::new(move |v| format_percent(to_number(v), decimals))
    }

    pub fn count() -> Self {
        Self::new(|v| format_count(to_number(v)))
    }

    pub fn number(decimals: usize) -> Self {
        Self::new(move |v| format_number(to_number(v), decimals))
    }

    pub fn apply(&self, value: &Value) -> String {
        (self.0)(value)
    }
}

impl fmt::Debug for Formatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Formatter(..)")
    }
}

/// One table column: which row field it shows and how.
#[derive(Debug, Clone)]
pub struct Column {
    pub key: String,
    pub label: String,
    pub align: Align,
    pub sortable: bool,
    pub formatter: Option<Formatter>,
}

impl Column {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            align: Align::Left,
            sortable: true,
            formatter: None,
        }
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    /// Attach a formatter; numeric formatters also right-align the column
    pub fn formatter(mut self, formatter: Formatter) -> Self {
        self.formatter = Some(formatter);
        self
    }

    pub fn numeric(self, formatter: Formatter) -> Self {
        self.align(Align::Right).formatter(formatter)
    }

    /// Display text for a cell; absent and null values render empty
    pub fn render(&self, value: Option<&Value>) -> String {
        match value {
            None | Some(Value::Null) => String::new(),
            Some(value) => match &self.formatter {
                Some(formatter) => formatter.apply(value),
                None => plain_text(value),
            },
        }
    }
}

pub(crate) fn plain_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
