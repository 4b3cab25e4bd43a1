#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use business_days::{AppConfig, Tracker, http_api, logging, open_store};

    let config = AppConfig::from_env()?;
    logging::init_logging(&config.log_level, config.log_dir.as_deref())?;

    let store = open_store(config.db_path.as_deref())?;
    let state = http_api::AppState::new(Tracker::new(store))
        .with_minimum_business_days(config.minimum_business_days);

    println!(
        "business-days HTTP API listening on http://{}",
        config.http_addr
    );
    http_api::serve(config.http_addr, state).await?;
    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
