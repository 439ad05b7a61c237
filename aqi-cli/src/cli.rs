use anyhow::{Context, anyhow};
use aqi_core::{
    Config, Coordinates, Dashboard, FetchGateway, LocationContext, LocationService, ProviderId,
    location::{FixedPosition, GeolocationCapability, IpGeolocation},
};
use clap::{Args, Parser, Subcommand};
use inquire::Password;
use serde_json::to_string_pretty;
use tracing::debug;

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "aqi", version, about = "Air quality dashboard CLI")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the API token of a provider.
    Configure {
        /// Provider short name: "waqi", "mapbox" or "openweather".
        provider: String,
    },

    /// Show the cities with the dirtiest and the cleanest air.
    Table {
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Show the current reading and recent pollution history.
    Chart {
        #[command(flatten)]
        location: LocationArgs,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Show table and chart together.
    Dashboard {
        #[command(flatten)]
        location: LocationArgs,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Args)]
pub struct LocationArgs {
    /// Latitude of your position.
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    lat: Option<f64>,

    /// Longitude of your position.
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    lon: Option<f64>,

    /// Estimate your position from your IP address.
    #[arg(long, conflicts_with_all = ["lat", "lon"])]
    locate: bool,
}

impl LocationArgs {
    fn capability(
        &self,
        gateway: &FetchGateway,
        config: &Config,
    ) -> Option<Box<dyn GeolocationCapability>> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Some(Box::new(FixedPosition(Coordinates::new(lat, lon)))),
            _ if self.locate => Some(Box::new(IpGeolocation::new(
                gateway.clone(),
                config.endpoints.ip_geolocation.clone(),
            ))),
            _ => None,
        }
    }
}

/// Configuration and clients shared by the data commands.
struct App {
    config: Config,
    gateway: FetchGateway,
    dashboard: Dashboard,
}

impl App {
    fn load() -> anyhow::Result<Self> {
        let config = Config::load()?;
        debug!(timeout = ?config.timeout(), reference = %config.reference_city.name, "config loaded");
        let gateway = FetchGateway::with_reqwest(config.timeout());
        let dashboard = Dashboard::from_config(gateway.clone(), &config)
            .context("invalid endpoint in configuration")?;
        Ok(Self {
            config,
            gateway,
            dashboard,
        })
    }

    async fn location(&self, args: &LocationArgs) -> LocationContext {
        let ctx = LocationContext::new();
        LocationService::new(args.capability(&self.gateway, &self.config))
            .resolve_user_location(&ctx)
            .await;
        ctx
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { provider } => configure(&provider)?,
            Command::Table { json } => {
                let app = App::load()?;
                let table = app.dashboard.table().build_table_data().await;
                if json {
                    println!("{}", to_string_pretty(&table)?);
                } else {
                    print!("{}", render::table(&table));
                }
            }
            Command::Chart { location, json } => {
                let app = App::load()?;
                let ctx = app.location(&location).await;
                let chart = app.dashboard.history().build_chart_data(&ctx).await;
                if json {
                    println!("{}", to_string_pretty(&chart)?);
                } else {
                    print!("{}", render::chart(&chart));
                }
            }
            Command::Dashboard { location, json } => {
                let app = App::load()?;
                let ctx = app.location(&location).await;
                let data = app.dashboard.load(&ctx).await;
                if json {
                    println!("{}", to_string_pretty(&data)?);
                } else {
                    print!("{}", render::table(&data.table));
                    println!();
                    print!("{}", render::chart(&data.chart));
                }
            }
        }

        Ok(())
    }
}

fn configure(provider: &str) -> anyhow::Result<()> {
    let id = ProviderId::try_from(provider)?;
    let mut config = Config::load()?;

    let token = Password::new(&format!("{id} token:"))
        .without_confirmation()
        .prompt()
        .context("Failed to read token")?;

    let token = token.trim().to_string();
    if token.is_empty() {
        return Err(anyhow!("Token for '{id}' must not be empty"));
    }

    config.upsert_provider_token(id, token);
    config.save()?;

    println!(
        "Saved {id} token to {}",
        Config::config_file_path()?.display()
    );
    Ok(())
}
