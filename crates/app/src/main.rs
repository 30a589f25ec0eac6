//! Gatehouse - command line session client
//!
//! # Usage
//!
//! ```bash
//! gatehouse login admin s3cret
//! gatehouse status
//! gatehouse navigate /system/users
//! gatehouse get /orders?page=2
//! gatehouse logout
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use gatehouse::{AppConfig, Gatehouse};
use gatehouse_domain::{NavigationOutcome, RequestConfig, Route};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser, Debug)]
#[command(name = "gatehouse", version, about = "Session client for the admin and mall APIs")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "gatehouse.toml")]
    config_file: String,

    /// Log filter, overrides the configured level
    #[arg(short, long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and store the session
    Login {
        /// Login name
        username: String,
        /// Password
        password: String,
    },
    /// Clear the stored session
    Logout,
    /// Show token status and the signed-in user
    Status,
    /// Run a route through the guard
    Navigate {
        /// Route path, e.g. `/system/users?tab=2`
        path: String,
    },
    /// GET an API path with the session credential
    Get {
        /// Path relative to the API base URL, or an absolute URL
        url: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config_file)?;

    let default_filter = cli.log_level.as_deref().unwrap_or(&config.log_level);
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!(config_file = %cli.config_file, mode = %config.session.token_mode, "Configuration loaded");

    let app = Gatehouse::from_config(&config)?;
    if let Err(e) = app.restore().await {
        tracing::warn!(error = %e, "Stored session unreadable, continuing signed out");
    }

    run(&app, cli.command).await
}

async fn run(app: &Gatehouse, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Login { username, password } => {
            let user = app
                .login(&username, &password)
                .await
                .context("Login failed")?;
            let name = user
                .as_ref()
                .map_or(username.as_str(), |user| user.display_name());
            println!("Signed in as {name}");
            println!("{}", app.status().display_message());
        }
        Command::Logout => {
            app.logout().await.context("Logout failed")?;
            println!("Signed out");
        }
        Command::Status => {
            println!("{}", app.status().display_message());
            if let Some(user) = app.user() {
                println!("User: {} ({})", user.display_name(), user.user_id);
                if !user.roles.is_empty() {
                    println!("Roles: {}", user.roles.join(", "));
                }
            }
        }
        Command::Navigate { path } => {
            let route = Route::parse(&path).context("Invalid route")?;
            match app.navigate(route).await {
                NavigationOutcome::Allowed(route) => println!("allowed {route}"),
                NavigationOutcome::Redirected { from, to } => {
                    println!("redirected {from} -> {to}");
                }
            }
        }
        Command::Get { url } => {
            let request = if url.starts_with('/') {
                let route = Route::parse(&url).context("Invalid path")?;
                route
                    .query
                    .into_iter()
                    .fold(RequestConfig::get(route.path), |request, (key, value)| {
                        request.with_param(key, value)
                    })
            } else {
                RequestConfig::get(url)
            };
            let value = app.execute(request).await?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }
    Ok(())
}
