use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    storydeck_cli::run_cli().await
}
