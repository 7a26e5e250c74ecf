//! Single-page web server for extracting assessments from .pptx uploads.

mod routes;
mod server;

use server::ServerConfig;

#[rocket::main]
async fn main() -> Result<(), rocket::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ServerConfig::default();
    log::info!(
        "writing extracted assessments to {}",
        config.output_path.display()
    );

    let _rocket = server::rocket(config).launch().await?;
    Ok(())
}
