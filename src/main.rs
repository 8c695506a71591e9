use tracing_subscriber::{fmt, EnvFilter};

use trueplace::api::{start_server, Config, ServerError};

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let config = Config::load()?;
    start_server(config).await
}
