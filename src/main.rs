use eightball::config::Config;

#[tokio::main]
async fn main() -> eightball::error::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("eightball=info"))
        .init();
    log::info!("Starting eightball bot");

    if rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .is_err()
    {
        log::debug!("TLS crypto provider already installed");
    }

    let config = Config::from_args(std::env::args().skip(1))?;

    match eightball::run(config).await {
        Ok(()) => {
            log::info!("Bot shut down successfully");
            Ok(())
        }
        Err(e) => {
            log::error!("Bot failed to start: {e}");
            Err(e)
        }
    }
}
