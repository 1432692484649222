#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dov_bridge::server::run().await
}
