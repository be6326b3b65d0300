use anyhow::Result;

use portal::{App, AppConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;

    // Logging is initialized in App::run() with buffer support
    App::new(config).run().await?;

    Ok(())
}
