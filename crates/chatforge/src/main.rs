use chatforge::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), BotError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = BotConfig::load_or_default();
    let plugins = builtin_chain(config.agario.clone())?;

    match config.gateway_url.as_deref() {
        Some(url) => {
            tracing::info!(url, "connecting to gateway");
            let conn = WebSocketConnection::connect(url, config.token.as_deref()).await?;
            serve(conn, plugins, &config).await
        }
        None => {
            tracing::info!(users = ?config.console_users, "no gateway configured, using console");
            let conn = ConsoleConnection::stdio(&config.console_users, JsonCodec);
            serve(conn, plugins, &config).await
        }
    }
}

async fn serve<T: Connection>(
    conn: T,
    plugins: PluginChain<BuiltinPlugin>,
    config: &BotConfig,
) -> Result<(), BotError> {
    let mut bot = Bot::new(conn, JsonCodec, plugins, config);
    let result = bot.run().await;
    bot.shutdown().await;
    result
}
