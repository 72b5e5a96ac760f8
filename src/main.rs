#[tokio::main]
async fn main() -> anyhow::Result<()> {
    mehfil_app::run().await
}
