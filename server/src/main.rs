use tokio::net::TcpListener;
use todo_server::ServerConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env()?;
    let addr = config.socket_addr();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(
        %addr,
        environment = %config.environment,
        seed = config.seed,
        "todo server listening"
    );
    todo_server::run(listener, config).await?;
    tracing::info!("server stopped");
    Ok(())
}
