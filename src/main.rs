use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use idea_shaper::{api, config::Config, db};

#[derive(Parser)]
#[command(name = "idea-shaper")]
#[command(about = "Shape a raw product idea into a structured brief")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Port for HTTP API
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },
    /// Check whether a local server is answering
    Status {
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "idea_shaper=debug,tower_http=debug".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn serve(host: &str, port: u16) -> anyhow::Result<()> {
    let config = Config::from_env();

    let db = match &config.db_path {
        Some(path) => db::Database::open(path.clone())?,
        None => db::Database::open_default()?,
    };
    db.migrate()?;

    let state = api::AppState::new(db, config.generator(), config.image_generator());
    let app = api::create_router(state, api::SecurityConfig::from_env());

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port)).await?;
    tracing::info!("Idea Shaper listening on http://{}:{}", host, port);

    axum::serve(listener, app).await?;
    Ok(())
}

async fn status(port: u16) -> anyhow::Result<()> {
    let url = format!("http://127.0.0.1:{}/api/v1/health", port);
    match reqwest::get(&url).await {
        Ok(response) if response.status().is_success() => {
            println!("Idea Shaper is running on port {}", port);
        }
        Ok(response) => {
            println!("Server on port {} answered with {}", port, response.status());
        }
        Err(_) => {
            println!("Idea Shaper is not running on port {}", port);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Some(Commands::Serve { port, host }) => serve(&host, port).await,
        Some(Commands::Status { port }) => status(port).await,
        None => serve("127.0.0.1", 3000).await,
    }
}
