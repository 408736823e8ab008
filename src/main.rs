use foley_comics::{
    logger::{self, LoggerConfig},
    Config,
};

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv_loaded = dotenv::dotenv().is_ok();

    logger::init_with_config(LoggerConfig::from_env())?;

    if dotenv_loaded {
        log::info!("✅ .env file loaded successfully");
    } else {
        log::warn!("⚠️  No .env file found, using system environment variables");
    }

    let config = Config::from_env();

    if let Err(e) = foley_comics::server::run(config).await {
        log::error!("❌ Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
