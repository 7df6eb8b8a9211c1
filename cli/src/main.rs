use brokerlens_cli::CliContext;
use brokerlens_cli::commands;
use brokerlens_cli::logging;
use brokerlens_cli::readline;
use clap::{Parser, Subcommand};
use std::io::Write;

#[tokio::main]
async fn main() -> Result<(), String> {
    let _log_guard = logging::init();
    let ctx = CliContext::new()?;

    // Populate the state/broker choices up front; failures keep `all` only
    commands::load_options(&ctx).await?;

    loop {
        let line = readline()?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match respond(line, &ctx).await {
            Ok(quit) => {
                if quit {
                    break;
                }
            }
            Err(err) => {
                writeln!(std::io::stdout(), "{err}").map_err(|e| e.to_string())?;
                std::io::stdout().flush().map_err(|e| e.to_string())?;
            }
        }
    }

    Ok(())
}

#[derive(Parser)]
#[command(version, about = "brokerlens dashboard shell")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the active filters
    Filters,
    /// Set the date range (last_30_days, last_3_months, last_6_months, last_12_months, all_time)
    SetDate { range: String },
    /// Select one broker; `all` clears the selection
    SetBroker { name: String },
    SetProduct { product: String },
    SetState { state: String },
    /// Restore every filter to its default
    Reset,
    /// Reload the state and broker choices
    Options,
    /// Print the request URL for a resource under the current filters
    Url { path: Option<String> },
    /// Fetch a resource and keep following filter changes
    Open {
        path: Option<String>,
        /// Auto-refresh interval in seconds (0 disables)
        #[arg(short, long)]
        refresh: Option<u64>,
    },
    Show,
    Refresh,
    /// Sort by a column; repeat to flip the direction
    Sort { column: String },
    Page { number: usize },
    Next,
    Prev,
    Close,
    Config,
    SetApi { url: String },
    Exit,
}

async fn respond(line: &str, ctx: &CliContext) -> Result<bool, String> {
    let mut args = shlex::split(line).ok_or("error: Invalid quoting")?;
    args.insert(0, "brokerlens".to_string());
    let cli = Cli::try_parse_from(args).map_err(|e| e.to_string())?;

    match &cli.command {
        Some(Commands::Filters) => commands::show_filters(ctx).await?,
        Some(Commands::SetDate { range }) => commands::set_date_range(range, ctx).await?,
        Some(Commands::SetBroker { name }) => commands::set_broker(name, ctx).await?,
        Some(Commands::SetProduct { product }) => commands::set_product(product, ctx).await?,
        Some(Commands::SetState { state }) => commands::set_state(state, ctx).await?,
        Some(Commands::Reset) => commands::reset_filters(ctx).await?,
        Some(Commands::Options) => commands::load_options(ctx).await?,
        Some(Commands::Url { path }) => commands::show_url(path.as_deref(), ctx).await?,
        Some(Commands::Open { path, refresh }) => {
            commands::open_resource(path.as_deref(), *refresh, ctx).await?
        }
        Some(Commands::Show) => commands::show_resource(ctx).await?,
        Some(Commands::Refresh) => commands::refresh_resource(ctx).await?,
        Some(Commands::Sort { column }) => commands::sort_by(column, ctx).await?,
        Some(Commands::Page { number }) => commands::go_to_page(*number, ctx).await?,
        Some(Commands::Next) => commands::next_page(ctx).await?,
        Some(Commands::Prev) => commands::prev_page(ctx).await?,
        Some(Commands::Close) => commands::close_resource(ctx).await?,
        Some(Commands::Config) => commands::show_settings(ctx).await?,
        Some(Commands::SetApi { url }) => commands::set_api_url(url, ctx).await?,
        Some(Commands::Exit) => {
            commands::exit()?;
            return Ok(true);
        }
        None => {}
    }
    Ok(false)
}
