use mock_server::Credentials;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let defaults = Credentials::default();
    let credentials = Credentials {
        client_id: std::env::var("MOCK_CLIENT_ID").unwrap_or(defaults.client_id),
        secret_key: std::env::var("MOCK_SECRET_KEY").unwrap_or(defaults.secret_key),
    };

    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, client_id = %credentials.client_id, "mock yd4b server listening");
    mock_server::run(listener, credentials).await
}
