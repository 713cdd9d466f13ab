//! `shhava` — CLI for the Shhava backend API.
//!
//! Drives the session lifecycle (login, status, logout) and the
//! authenticated feed endpoints from the terminal, persisting credentials
//! in the platform config directory like the app itself would.

use clap::{Args, Parser, Subcommand};

use shhava_client::callback::parse_callback;
use shhava_client::net::types::NewSerendipityMoment;
use shhava_client::store::FileStore;
use shhava_client::{
    ApiError, CallbackError, ClientConfig, ConfigError, SessionError, SessionManager, StoreError,
};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("not logged in; run `shhava login --code <CODE>` first")]
    NotLoggedIn,
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Callback(#[from] CallbackError),
    #[error("failed to render output: {0}")]
    Render(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "shhava", about = "Shhava API session and feed CLI")]
struct Cli {
    #[arg(long, env = "SHHAVA_API_BASE_URL", default_value = "http://127.0.0.1:3000")]
    base_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Exchange an OAuth authorization code for a session.
    Login(LoginArgs),
    /// Show the session state after startup validation.
    Status,
    /// End the session (best-effort server notify, always clears locally).
    Logout,
    /// Serendipity moments feed.
    Moments(MomentsCommand),
    /// Fate flashback story cards.
    Flashbacks(FlashbacksCommand),
}

#[derive(Args, Debug)]
struct LoginArgs {
    /// Authorization code, or the full redirect URL to extract it from.
    #[arg(long)]
    code: String,
}

#[derive(Args, Debug)]
struct MomentsCommand {
    #[command(subcommand)]
    command: MomentsSubcommand,
}

#[derive(Subcommand, Debug)]
enum MomentsSubcommand {
    /// List recorded moments.
    List,
    /// Record a new moment.
    Create(CreateMomentArgs),
}

#[derive(Args, Debug)]
struct CreateMomentArgs {
    #[arg(long)]
    location_name: String,
    #[arg(long)]
    latitude: f64,
    #[arg(long)]
    longitude: f64,
    #[arg(long)]
    description: String,
    #[arg(long, default_value = "contemplative")]
    emotional_state: String,
}

#[derive(Args, Debug)]
struct FlashbacksCommand {
    #[command(subcommand)]
    command: FlashbacksSubcommand,
}

#[derive(Subcommand, Debug)]
enum FlashbacksSubcommand {
    /// List flashback story cards.
    List,
    /// Mark a flashback as viewed.
    View { id: String },
    /// Mark a flashback as shared.
    Share { id: String },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = ClientConfig::new(cli.base_url)?;
    let store = FileStore::open_default()?;
    let manager = SessionManager::new(&config, Box::new(store))?;
    manager.initialize().await?;

    match cli.command {
        Command::Login(args) => {
            // Accept either the bare code or the whole callback URL pasted
            // from the browser.
            let code = if args.code.contains("://") {
                parse_callback(&args.code)?
            } else {
                args.code
            };
            manager.login(&code).await?;
            match manager.current_user() {
                Some(user) => println!("signed in as {} <{}>", user.name, user.email),
                None => println!("signed in"),
            }
        }
        Command::Status => {
            let snapshot = manager.snapshot();
            match (&snapshot.user, snapshot.is_authenticated()) {
                (Some(user), true) => println!("signed in as {} <{}>", user.name, user.email),
                _ => println!("not signed in"),
            }
        }
        Command::Logout => {
            manager.logout().await;
            println!("signed out");
        }
        Command::Moments(moments) => {
            let token = manager.token().ok_or(CliError::NotLoggedIn)?;
            match moments.command {
                MomentsSubcommand::List => {
                    let moments = manager.api().list_moments(&token).await?;
                    println!("{}", serde_json::to_string_pretty(&moments)?);
                }
                MomentsSubcommand::Create(args) => {
                    let moment = NewSerendipityMoment {
                        location_name: args.location_name,
                        latitude: args.latitude,
                        longitude: args.longitude,
                        moment_description: args.description,
                        emotional_state: args.emotional_state,
                    };
                    manager.api().create_moment(&token, &moment).await?;
                    println!("moment recorded");
                }
            }
        }
        Command::Flashbacks(flashbacks) => {
            let token = manager.token().ok_or(CliError::NotLoggedIn)?;
            match flashbacks.command {
                FlashbacksSubcommand::List => {
                    let flashbacks = manager.api().list_flashbacks(&token).await?;
                    println!("{}", serde_json::to_string_pretty(&flashbacks)?);
                }
                FlashbacksSubcommand::View { id } => {
                    manager.api().mark_flashback_viewed(&token, &id).await?;
                    println!("flashback {id} marked viewed");
                }
                FlashbacksSubcommand::Share { id } => {
                    manager.api().share_flashback(&token, &id).await?;
                    println!("flashback {id} marked shared");
                }
            }
        }
    }
    Ok(())
}
