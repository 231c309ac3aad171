use std::sync::Arc;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use platform_obs::{ObsConfig, init_tracing};
use platform_store::HrStore;
use tracing::info;

use server::auth::{self, AuthConfig};
use server::config::AppConfig;
use server::http::{self, AppState, ServeConfig};

#[derive(Parser, Debug)]
#[command(name = "hr-server", version, about = "HR management suite backend")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP API server.
    Serve(ServeCommand),
    /// Load demo fixtures into a fresh store and report the counts.
    Seed,
}

#[derive(Args, Debug)]
struct ServeCommand {
    #[arg(long, default_value = "0.0.0.0")]
    host: std::net::IpAddr,
    #[arg(long, default_value_t = 8080)]
    port: u16,
    #[arg(long, help = "Load demo fixtures at startup")]
    seed_demo: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing(ObsConfig::default())?;
    let cli = Cli::parse();
    match cli.command {
        Command::Serve(cmd) => run_server(cmd).await,
        Command::Seed => run_seed(),
    }
}

async fn run_server(cmd: ServeCommand) -> Result<()> {
    let config = Arc::new(AppConfig::load()?);
    let store = Arc::new(HrStore::new());
    auth::bootstrap_admin(&store, &config)?;
    if cmd.seed_demo || config.seed_demo {
        let seeded = store.seed_demo();
        info!(
            employees = seeded.employees.len(),
            schedules = seeded.schedules.len(),
            reference_types = seeded.reference_types.len(),
            "demo fixtures loaded"
        );
    }
    let auth = Arc::new(AuthConfig {
        jwt_secret: config.jwt_secret.clone(),
        session_ttl_minutes: config.session_ttl_minutes,
    });
    let state = AppState {
        store,
        auth,
        config: config.clone(),
    };
    http::serve(ServeConfig::new(cmd.host, cmd.port), state).await
}

fn run_seed() -> Result<()> {
    let store = HrStore::new();
    let seeded = store.seed_demo();
    info!(
        persons = seeded.persons.len(),
        employees = seeded.employees.len(),
        schedules = seeded.schedules.len(),
        punches = seeded.punches.len(),
        permissions = seeded.permissions.len(),
        vacations = seeded.vacations.len(),
        "demo fixtures loaded; the store is in-memory, so they vanish with the process"
    );
    Ok(())
}
