//! Server command implementation

use anyhow::Result;
use niti_core::WisdomAdvisor;
use niti_server::ServerConfig;

pub async fn cmd_serve(advisor: WisdomAdvisor, host: &str, port: u16) -> Result<()> {
    let config = ServerConfig::from_env();

    println!("🚀 Starting Niti web server...");
    println!("   Listening: http://{}:{}", host, port);
    println!(
        "   Principles: {}",
        advisor.knowledge().principles().len()
    );
    if config.allowed_origins.is_empty() {
        println!("   CORS: same-origin only (set NITI_ALLOWED_ORIGINS to allow others)");
    } else {
        println!(
            "   CORS: {} (NITI_ALLOWED_ORIGINS)",
            config.allowed_origins.join(", ")
        );
    }
    println!();
    println!("   Press Ctrl+C to stop");

    niti_server::serve_with_config(advisor, host, port, config).await?;

    Ok(())
}
