use gambit::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // The one configuration knob: the listen address.
    let addr = std::env::var("GAMBIT_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8080".to_string());

    let server = GambitServerBuilder::new()
        .bind(&addr)
        .build(StandardChess)
        .await?;

    server.run().await?;
    Ok(())
}
