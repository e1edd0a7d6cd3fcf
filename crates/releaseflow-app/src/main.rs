#[tokio::main]
async fn main() -> anyhow::Result<()> {
    releaseflow_app::run().await
}
