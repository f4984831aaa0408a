//! # celestial-map CLI entry point
//!
//! Drives a map session against the configured endpoints.

use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use celestial_map::{
    Action, BuildInfo, CelestialConfig, CelestialMap, ExportAction, Geocoder, HttpClient,
    HttpGeocoder, HttpMapGenerator, InputMode, Platform, SessionHandle, UiState, init_tracing,
    resolve_first,
};

/// Render star maps for a place and a date.
#[derive(Parser, Debug)]
#[command(name = "celestial-map", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List location suggestions for an address.
    Search {
        /// Free-text address, e.g. "Avenida Paulista, São Paulo"
        query: String,
        /// Print only the best match; fails when nothing matches
        #[arg(long)]
        first: bool,
    },
    /// Look up the place name for a coordinate pair.
    Reverse {
        #[arg(allow_hyphen_values = true)]
        latitude: f64,
        #[arg(allow_hyphen_values = true)]
        longitude: f64,
    },
    /// Render a map and export it.
    Render(RenderArgs),
    /// Print version, commit and build time.
    Version,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Address to resolve; the first suggestion is used
    #[arg(long, conflicts_with_all = ["latitude", "longitude"])]
    address: Option<String>,
    #[arg(long = "lat", allow_hyphen_values = true, requires = "longitude")]
    latitude: Option<String>,
    #[arg(long = "lon", allow_hyphen_values = true, requires = "latitude")]
    longitude: Option<String>,
    /// Calendar date (YYYY-MM-DD); defaults to today
    #[arg(long)]
    date: Option<String>,
    /// Title printed on the map
    #[arg(long)]
    title: Option<String>,
    /// Directory the exported image is written to
    #[arg(long, default_value = ".")]
    out: PathBuf,
    /// User agent used to pick between share and download
    #[arg(long)]
    user_agent: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CelestialConfig::from_env();
    init_tracing(&config.logging).map_err(|e| anyhow::anyhow!(e))?;

    let cli = Cli::parse();
    let client = HttpClient::new(config.http.clone(), None)?;
    let geocoder = HttpGeocoder::new(
        client.clone(),
        config.endpoints.geocode_url.clone(),
        config.endpoints.geocode_provider,
        config.endpoints.geocode_limit,
    );
    info!(provider = ?geocoder.provider(), url = %config.endpoints.geocode_url, "Geocoder configured");

    match cli.command {
        Commands::Search { query, first: true } => {
            let best = resolve_first(&geocoder, &query).await?;
            println!("{} ({:.4}, {:.4})", best.display_name, best.latitude, best.longitude);
        }
        Commands::Search { query, first: false } => {
            let suggestions = geocoder.search(&query).await?;
            if suggestions.is_empty() {
                println!("No locations found for '{query}'");
            }
            for (index, s) in suggestions.iter().enumerate() {
                println!("{index}: {} ({:.4}, {:.4})", s.display_name, s.latitude, s.longitude);
            }
        }
        Commands::Reverse {
            latitude,
            longitude,
        } => {
            println!("{}", geocoder.reverse(latitude, longitude).await?);
        }
        Commands::Render(args) => render(config, client, geocoder, args).await?,
        Commands::Version => {
            let info = BuildInfo::current();
            println!(
                "celestial-map {} (commit {}, built {})",
                info.version, info.commit, info.build_time
            );
        }
    }

    Ok(())
}

async fn render(
    config: CelestialConfig,
    client: HttpClient,
    geocoder: HttpGeocoder,
    args: RenderArgs,
) -> anyhow::Result<()> {
    let generator = HttpMapGenerator::new(
        client.clone(),
        config.endpoints.sky_map_url.clone(),
        config.endpoints.response_contract,
    );
    info!(contract = ?generator.contract(), url = %config.endpoints.sky_map_url, "Map generator configured");
    let map = CelestialMap::new(config.resolver.clone());
    let mut session = SessionHandle::spawn(map, geocoder, generator, config.session.clone());

    if let Some(address) = &args.address {
        session.dispatch(Action::TypeQuery(address.clone()))?;
        let snapshot = session
            .wait_for(|s| s.query == *address && !s.lookup_pending)
            .await?;
        if snapshot.suggestions.is_empty() {
            bail!("Location not found for '{address}'. Try including the city or state.");
        }
        session.dispatch(Action::SelectSuggestion(0))?;
        info!(place = %snapshot.suggestions[0].display_name, "Using first suggestion");
    } else if let (Some(latitude), Some(longitude)) = (&args.latitude, &args.longitude) {
        session.dispatch(Action::SetMode(InputMode::ManualCoordinates))?;
        session.dispatch(Action::SetLatitude(latitude.clone()))?;
        session.dispatch(Action::SetLongitude(longitude.clone()))?;
    }
    if let Some(date) = args.date {
        session.dispatch(Action::SetDate(date))?;
    }
    if let Some(title) = args.title {
        session.dispatch(Action::SetTitle(title))?;
    }

    session.dispatch(Action::Submit)?;
    let snapshot = session
        .wait_for(|s| matches!(s.state, UiState::Ready | UiState::Error))
        .await?;
    if snapshot.state == UiState::Error {
        let message = snapshot.error.unwrap_or_default();
        session.close().await;
        bail!(message);
    }

    let platform = Platform::detect(args.user_agent.as_deref());
    let export = session.export(platform).await?;
    let path = export
        .file()
        .save_to(&args.out, &client)
        .await
        .context("failed to write the exported map")?;
    match export {
        ExportAction::Share(_) => println!("Ready to share: {}", path.display()),
        ExportAction::Download(_) => println!("Downloaded: {}", path.display()),
    }

    session.close().await;
    Ok(())
}
