use library_api::config::Config;
use library_api::database::{DefaultAuthorRepository, DefaultBookRepository, establish_pool};
use library_api::http::{AppState, HttpServer, HttpServerConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::from_env()?;

    let pool = establish_pool(config.database_url()).await?;
    let state = AppState::new(
        DefaultAuthorRepository::new(pool.clone()),
        DefaultBookRepository::new(pool),
    );
    let server_config = HttpServerConfig::new(config.server_port());
    let http_server = HttpServer::new(state, server_config).await?;
    http_server.run().await
}
