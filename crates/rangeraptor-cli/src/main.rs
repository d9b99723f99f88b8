use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use rangeraptor_cli::output::{print_footer, print_response, OutputFormat};
use rangeraptor_lib::{
    load_network, route, Profile, RequestFile, ResponseSummary, TransitDataProvider,
    TransitNetwork,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Range-Raptor transit journey planner")]
struct Cli {
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    /// Do not print the elapsed-time footer.
    #[arg(long, global = true)]
    no_footer: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search journeys described by a request file.
    Route {
        /// Network JSON file.
        #[arg(long)]
        network: PathBuf,
        /// Request JSON file.
        #[arg(long)]
        request: PathBuf,
        /// Override the request's profile.
        #[arg(long, value_enum)]
        profile: Option<ProfileArg>,
        /// Override the maximum number of transfers.
        #[arg(long)]
        max_transfers: Option<usize>,
        /// Override the departure window, in seconds.
        #[arg(long)]
        search_window: Option<i32>,
        /// Stop the search after this many milliseconds.
        #[arg(long)]
        timeout_ms: Option<u64>,
        /// Keep the transfers found by the search as they are.
        #[arg(long)]
        no_optimize_transfers: bool,
    },
    /// Print statistics of a network, or the routes serving one stop.
    Inspect {
        /// Network JSON file.
        #[arg(long)]
        network: PathBuf,
        /// Stop id to describe.
        #[arg(long)]
        stop: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ProfileArg {
    Standard,
    MinTravelDuration,
    MultiCriteria,
}

impl From<ProfileArg> for Profile {
    fn from(value: ProfileArg) -> Self {
        match value {
            ProfileArg::Standard => Profile::Standard,
            ProfileArg::MinTravelDuration => Profile::MinTravelDuration,
            ProfileArg::MultiCriteria => Profile::MultiCriteria,
        }
    }
}

/// Request overrides given on the command line.
struct RouteOverrides {
    profile: Option<ProfileArg>,
    max_transfers: Option<usize>,
    search_window: Option<i32>,
    timeout_ms: Option<u64>,
    no_optimize_transfers: bool,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let started = Instant::now();

    match cli.command {
        Command::Route {
            network,
            request,
            profile,
            max_transfers,
            search_window,
            timeout_ms,
            no_optimize_transfers,
        } => {
            let overrides = RouteOverrides {
                profile,
                max_transfers,
                search_window,
                timeout_ms,
                no_optimize_transfers,
            };
            handle_route(&network, &request, overrides, cli.format)?;
        }
        Command::Inspect { network, stop } => handle_inspect(&network, stop.as_deref())?,
    }

    if cli.format != OutputFormat::Json && !cli.no_footer {
        print_footer(started.elapsed());
    }
    Ok(())
}

fn open_network(path: &Path) -> Result<TransitNetwork> {
    load_network(path).with_context(|| format!("failed to load network from {}", path.display()))
}

fn handle_route(
    network_path: &Path,
    request_path: &Path,
    overrides: RouteOverrides,
    format: OutputFormat,
) -> Result<()> {
    let network = open_network(network_path)?;
    let mut request = RequestFile::from_path(request_path)
        .with_context(|| format!("failed to read request from {}", request_path.display()))?
        .into_request(&network)
        .context("failed to resolve request against the network")?;

    if let Some(profile) = overrides.profile {
        request.profile = profile.into();
    }
    if let Some(max_transfers) = overrides.max_transfers {
        request.search.max_number_of_transfers = max_transfers;
    }
    if let Some(search_window) = overrides.search_window {
        request.search.search_window = search_window;
    }
    if let Some(timeout_ms) = overrides.timeout_ms {
        request.timeout = Some(std::time::Duration::from_millis(timeout_ms));
    }
    if overrides.no_optimize_transfers {
        request.multi_criteria.optimize_transfers = false;
    }
    debug!(profile = %request.profile, "request resolved");

    let response = route(&network, &request).context("search failed")?;
    let summary = ResponseSummary::from_response(&network, &response);
    print_response(&summary, format).context("failed to write output")?;
    Ok(())
}

fn handle_inspect(network_path: &Path, stop: Option<&str>) -> Result<()> {
    let network = open_network(network_path)?;
    let Some(stop_id) = stop else {
        println!("stops: {}", network.num_stops());
        println!("patterns: {}", network.num_patterns());
        println!("trips: {}", network.num_trips());
        println!("transfers: {}", network.num_transfers());
        return Ok(());
    };

    let index = network.stop_index(stop_id)?;
    println!("{} ({})", network.stop_name(index), stop_id);
    for &pattern in network.patterns_for_stop(index) {
        let pattern = network.pattern(pattern);
        println!(
            " - {} [{}] {} trips",
            pattern.route,
            pattern.route.agency,
            pattern.trips.len()
        );
    }
    for transfer in network.transfers_from(index) {
        println!(
            " ~ walk {}s to {}",
            transfer.duration,
            network.stop_name(transfer.to_stop)
        );
    }
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
