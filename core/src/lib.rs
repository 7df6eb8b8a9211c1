pub mod context;
pub mod fetch;
pub mod format;
pub mod lookups;
pub mod query;
pub mod table;

// Re-exports for convenience
pub use brokerlens_types::{
    ALL, AppConfig, DateRange, FilterKey, FilterState, FilterValue, Record,
};
pub use context::{AppConfigExt, DashboardContext, FilterStore};
pub use fetch::{
    FetchError, FetchHandle, FetchState, FilteredFetcher, HttpTransport, ResourceFetcher,
    Transport,
};
pub use lookups::{FilterOptions, load_filter_options};
pub use query::{query_string, resource_url};
pub use table::{Align, Column, Formatter, RenderedTable, SortDirection, TableView};
