//! Rocket server assembly and configuration.

use std::path::PathBuf;

use rocket::config::LogLevel;
use rocket::data::{Limits, ToByteUnit};
use rocket::{routes, Build, Config, Rocket};

use crate::routes as handlers;

/// Default path the extracted workbook is written to.
pub const DEFAULT_OUTPUT_PATH: &str = "output.xlsx";

/// Runtime configuration handed to the request handlers.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Where the extracted workbook is saved. Overwritten on every
    /// successful extraction.
    pub output_path: PathBuf,

    /// Literal prefix a shape text must start with to count as an
    /// assessment.
    pub prefix: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            prefix: assess_core::DEFAULT_PREFIX.to_string(),
        }
    }
}

/// Build the rocket instance.
///
/// One worker: uploads are decoded, extracted, and written one at a time,
/// and the output file has last-writer-wins semantics. Rocket's own logger
/// stays off; `env_logger` handles logging.
pub fn rocket(config: ServerConfig) -> Rocket<Build> {
    // Uploads arrive base64-encoded inside a JSON body, so the limit has
    // to cover decks well past rocket's 1 MiB default.
    let rocket_config = Config {
        workers: 1,
        log_level: LogLevel::Off,
        limits: Limits::default().limit("json", 50.mebibytes()),
        ..Config::default()
    };

    rocket::custom(rocket_config)
        .manage(config)
        .mount("/", routes![handlers::index, handlers::extract])
}
