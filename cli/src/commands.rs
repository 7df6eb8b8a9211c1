use std::io::Write;
use std::str::FromStr;
use std::time::Duration;

use brokerlens_core::context::{AppConfigExt, FilterError};
use brokerlens_core::lookups::load_filter_options;
use brokerlens_core::query::resource_url;
use brokerlens_core::{ALL, DateRange, FetchState, FilterKey, FilteredFetcher, FilterValue, TableView};
use serde_json::Value;

use crate::context::{CliContext, OpenResource};
use crate::render;

/// Upper bound on how long a command waits for a request to settle
const SETTLE_TIMEOUT: Duration = Duration::from_secs(15);

// ─────────────────────────────────────────────────────────────────────────────
// Filters
// ─────────────────────────────────────────────────────────────────────────────

pub async fn show_filters(ctx: &CliContext) -> Result<(), String> {
    let filters = ctx.filters()?.get_filters();

    for key in FilterKey::all() {
        let value = match key {
            FilterKey::DateRange => {
                format!("{} ({})", filters.date_range.label(), filters.date_range)
            }
            FilterKey::Brokers => filters.broker().unwrap_or(ALL).to_string(),
            FilterKey::Product => filters.product.clone(),
            FilterKey::State => filters.state.clone(),
        };
        let marker = if filters.is_active(*key) { "*" } else { " " };
        println!("{marker} {:<12} {value}", key.label());
    }
    println!("Active filters: {}", filters.active_count());
    Ok(())
}

pub async fn set_date_range(token: &str, ctx: &CliContext) -> Result<(), String> {
    let range = parse_date_range(token)?;
    apply_filter(FilterValue::DateRange(range), ctx).await
}

fn parse_date_range(token: &str) -> Result<DateRange, String> {
    DateRange::from_str(token).map_err(|e| FilterError::from(e).to_string())
}

pub async fn set_broker(name: &str, ctx: &CliContext) -> Result<(), String> {
    let options = ctx.options.read().await;
    if name != ALL && options.brokers.len() > 1 && !options.has_broker(name) {
        return Err(FilterError::UnknownOption {
            dimension: "broker",
            value: name.to_string(),
        }
        .to_string());
    }
    drop(options);
    apply_filter(FilterValue::broker(name), ctx).await
}

pub async fn set_product(product: &str, ctx: &CliContext) -> Result<(), String> {
    apply_filter(FilterValue::Product(product.to_string()), ctx).await
}

pub async fn set_state(state: &str, ctx: &CliContext) -> Result<(), String> {
    let options = ctx.options.read().await;
    if state != ALL && options.states.len() > 1 && !options.has_state(state) {
        return Err(FilterError::UnknownOption {
            dimension: "state",
            value: state.to_string(),
        }
        .to_string());
    }
    drop(options);
    apply_filter(FilterValue::State(state.to_string()), ctx).await
}

pub async fn reset_filters(ctx: &CliContext) -> Result<(), String> {
    ctx.filters()?.reset_filters();
    tracing::info!("filters reset");
    after_filter_change(ctx).await
}

async fn apply_filter(value: FilterValue, ctx: &CliContext) -> Result<(), String> {
    tracing::info!(filter = ?value.key(), ?value, "filter updated");
    ctx.filters()?.update_filter(value);
    after_filter_change(ctx).await
}

/// An opened table restarts at page one and shows the re-queried rows
async fn after_filter_change(ctx: &CliContext) -> Result<(), String> {
    let store = ctx.filters()?;
    let mut open = ctx.open.lock().await;
    let Some(resource) = open.as_mut() else {
        return show_filters(ctx).await;
    };

    resource.view.reset_page();
    let expected = resource_url(resource.fetcher.base(), &store.get_filters());
    let state = wait_settled(&resource.fetcher, &expected).await;
    print_resource(resource, &state);
    Ok(())
}

pub async fn load_options(ctx: &CliContext) -> Result<(), String> {
    let (states_path, brokers_path) = {
        let config = ctx.config.read().await;
        (config.states_path.clone(), config.brokers_path.clone())
    };
    let transport = ctx.transport().await;
    let options = load_filter_options(&transport, &states_path, &brokers_path).await;

    println!("States:  {}", options.states.join(", "));
    println!("Brokers: {}", options.brokers.join(", "));
    *ctx.options.write().await = options;
    Ok(())
}

pub async fn show_url(path: Option<&str>, ctx: &CliContext) -> Result<(), String> {
    let base = match path {
        Some(path) => path.to_string(),
        None => ctx.config.read().await.default_page.clone(),
    };
    let url = resource_url(&base, &ctx.filters()?.get_filters());
    println!("{}", ctx.transport().await.absolute(&url));
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Opened resource
// ─────────────────────────────────────────────────────────────────────────────

pub async fn open_resource(
    path: Option<&str>,
    refresh_secs: Option<u64>,
    ctx: &CliContext,
) -> Result<(), String> {
    let store = ctx.filters()?;
    let (base, page_size) = {
        let config = ctx.config.read().await;
        let base = path.map_or_else(|| config.default_page.clone(), str::to_string);
        (base, config.page_size)
    };
    let refresh = match refresh_secs {
        Some(secs) => Some(Duration::from_secs(secs)),
        None => ctx.refresh_interval().await,
    };

    let mut open = ctx.open.lock().await;
    // Replacing the previous resource drops (and tears down) its fetcher
    if let Some(previous) = open.take() {
        tracing::debug!(resource = %previous.fetcher.base(), "closing previous resource");
        previous.fetcher.unmount();
    }

    let fetcher = FilteredFetcher::<Value>::mount(&store, ctx.transport().await, base, refresh);
    tracing::info!(resource = %fetcher.resource(), ?refresh, "opened resource");

    let expected = fetcher.resource();
    let state = wait_settled(&fetcher, &expected).await;
    let resource = open.insert(OpenResource {
        fetcher,
        view: TableView::new(page_size),
    });
    print_resource(resource, &state);
    Ok(())
}

pub async fn show_resource(ctx: &CliContext) -> Result<(), String> {
    let open = ctx.open.lock().await;
    let resource = open.as_ref().ok_or(NOTHING_OPEN)?;
    print_resource(resource, &resource.state());
    Ok(())
}

pub async fn refresh_resource(ctx: &CliContext) -> Result<(), String> {
    let open = ctx.open.lock().await;
    let resource = open.as_ref().ok_or(NOTHING_OPEN)?;
    resource.fetcher.refetch();
    let state = wait_settled(&resource.fetcher, &resource.fetcher.resource()).await;
    print_resource(resource, &state);
    Ok(())
}

pub async fn sort_by(column: &str, ctx: &CliContext) -> Result<(), String> {
    let mut open = ctx.open.lock().await;
    let resource = open.as_mut().ok_or(NOTHING_OPEN)?;
    let state = resource.state();
    let rows = state.data.as_ref().map(render::records).unwrap_or_default();

    let columns = render::infer_columns(&rows);
    let target = render::find_column(&columns, column)
        .ok_or_else(|| format!("error: no column named '{column}'"))?;
    if !resource.view.toggle_sort(target) {
        return Err(format!("error: column '{}' is not sortable", target.label));
    }
    print_resource(resource, &state);
    Ok(())
}

pub async fn go_to_page(number: usize, ctx: &CliContext) -> Result<(), String> {
    let mut open = ctx.open.lock().await;
    let resource = open.as_mut().ok_or(NOTHING_OPEN)?;
    // Pages are numbered from 1 in the shell
    resource.view.set_page(number.saturating_sub(1));
    let state = resource.state();
    print_resource(resource, &state);
    Ok(())
}

pub async fn next_page(ctx: &CliContext) -> Result<(), String> {
    step_page(ctx, true).await
}

pub async fn prev_page(ctx: &CliContext) -> Result<(), String> {
    step_page(ctx, false).await
}

async fn step_page(ctx: &CliContext, forward: bool) -> Result<(), String> {
    let mut open = ctx.open.lock().await;
    let resource = open.as_mut().ok_or(NOTHING_OPEN)?;
    let state = resource.state();
    let total = state.data.as_ref().map_or(0, |data| render::records(data).len());

    let moved = if forward {
        resource.view.next_page(total)
    } else {
        resource.view.prev_page(total)
    };
    if !moved {
        println!("Already on the {} page", if forward { "last" } else { "first" });
    }
    print_resource(resource, &state);
    Ok(())
}

pub async fn close_resource(ctx: &CliContext) -> Result<(), String> {
    let resource = ctx.open.lock().await.take().ok_or(NOTHING_OPEN)?;
    tracing::info!(resource = %resource.fetcher.base(), "closed resource");
    resource.fetcher.unmount();
    println!("Closed");
    Ok(())
}

const NOTHING_OPEN: &str = "error: no resource open (use `open <path>`)";

/// Wait until the fetcher has settled on the request for `expected`
async fn wait_settled(fetcher: &FilteredFetcher<Value>, expected: &str) -> FetchState<Value> {
    let mut rx = fetcher.subscribe();
    let settled = tokio::time::timeout(SETTLE_TIMEOUT, async {
        rx.wait_for(|state| state.is_settled_for(expected)).await.is_ok()
    })
    .await;

    if settled.is_err() {
        tracing::warn!(%expected, "request still pending after timeout");
    }
    fetcher.state()
}

fn print_resource(resource: &OpenResource, state: &FetchState<Value>) {
    println!("GET {}", state.resource);

    if state.loading {
        println!("(loading...)");
    }
    if let Some(error) = &state.error {
        println!("error: {error}");
    }
    if let Some(updated) = state.last_updated {
        println!("updated {}", updated.with_timezone(&chrono::Local).format("%H:%M:%S"));
    }

    let rows = state.data.as_ref().map(render::records).unwrap_or_default();
    render::print_table(&resource.view, &rows);
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

pub async fn show_settings(ctx: &CliContext) -> Result<(), String> {
    let config = ctx.config.read().await;
    println!("api_base_url          = {}", config.api_base_url);
    println!("refresh_interval_secs = {}", config.refresh_interval_secs);
    println!("page_size             = {}", config.page_size);
    println!("states_path           = {}", config.states_path);
    println!("brokers_path          = {}", config.brokers_path);
    println!("default_page          = {}", config.default_page);
    Ok(())
}

pub async fn set_api_url(url: &str, ctx: &CliContext) -> Result<(), String> {
    let mut config = ctx.config.write().await;
    config.set_api_base_url(url).map_err(|e| e.to_string())?;
    config.save().map_err(|e| e.to_string())?;
    ctx.replace_transport(&config.api_base_url).await?;

    tracing::info!(api_base_url = %config.api_base_url, "API base URL updated");
    println!("API base URL set to {}", config.api_base_url);
    if ctx.open.lock().await.is_some() {
        println!("The open resource keeps its old host until it is reopened");
    }
    Ok(())
}

pub fn exit() -> Result<(), String> {
    write!(std::io::stdout(), "quitting...").map_err(|e| e.to_string())?;
    std::io::stdout().flush().map_err(|e| e.to_string())
}
