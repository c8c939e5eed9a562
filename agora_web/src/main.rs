use agora_core::AgoraCore;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; real deployments set the environment directly
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "agora_web=info,agora_core=info,tower_http=info".into()),
        )
        .init();

    let core = AgoraCore::start().await?;
    agora_web::serve(core).await
}
