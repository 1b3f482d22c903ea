use actix_web::middleware::Logger;
use actix_web::{App, HttpServer};
use anyhow::Context;
use cardex::app_config::APP_CONFIG;
use cardex::db::init_db;
use env_logger::Env;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let (bind, database_fallback) = {
        let config = APP_CONFIG.read().expect("Config lock poisoned");
        (
            format!("{}:{}", config.server.bind_address, config.server.port),
            config.database.url.clone(),
        )
    };

    let database_url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) if !database_fallback.is_empty() => database_fallback,
        Err(_) => anyhow::bail!("DATABASE_URL must be set (env var or config file)"),
    };

    init_db(database_url).await;

    log::info!("Starting support and moderation core on {}", bind);

    HttpServer::new(|| {
        App::new()
            .wrap(Logger::default())
            .configure(cardex::web::configure)
    })
    .bind(&bind)
    .with_context(|| format!("Failed to bind {}", bind))?
    .run()
    .await?;

    Ok(())
}
