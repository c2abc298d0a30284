use rpc_gateway::config::GatewayConfig;
use rpc_gateway::handlers::{self, stats::ConnectionCounter};
use rpc_gateway::server::Gateway;
use tracing::{info, warn};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rpc_gateway=info,tower_http=info".into()),
        )
        .init();

    let config = match GatewayConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("rpc-gateway: configuration error: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run(config).await {
        eprintln!("rpc-gateway: fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(config: GatewayConfig) -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = tokio::fs::create_dir_all(&config.files_root).await {
        warn!(
            "Cannot create files root {}: {e}",
            config.files_root.display()
        );
    }

    let connections = ConnectionCounter::new();
    let registry = handlers::demo_registry(&config, connections.clone())?;

    if config.allowed_origins.is_empty() {
        info!("No CORS origins allowed; cross-origin browsers will be refused");
    }

    let gateway = Gateway::new(config, registry).on_connect(move |peer| connections.record(peer));
    let listener = gateway.bind().await?;

    gateway
        .serve_with_shutdown(listener, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Cannot listen for shutdown signal: {e}");
                std::future::pending::<()>().await;
            }
            info!("Shutdown signal received");
        })
        .await?;

    Ok(())
}
