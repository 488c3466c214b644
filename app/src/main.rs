use std::fs::File;

use pretty_env_logger::env_logger::fmt::{Target, TimestampPrecision};

mod api;
mod app;
mod config;
mod error;
mod focus;
mod player;
mod screen;
mod session;

use app::App;
use config::Config;
use error::AppError;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = Config::load()?;

    let log_file = File::create(&config.log_file).map_err(AppError::Log)?;
    pretty_env_logger::formatted_timed_builder()
        .format_timestamp(Some(TimestampPrecision::Seconds))
        .target(Target::Pipe(Box::from(log_file)))
        .filter(None, config.log_level()?)
        .init();

    log::info!("Starting live-tui");

    let app = App::new(config);
    app.run().await
}
