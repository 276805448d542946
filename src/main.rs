mod ui;

use anyhow::{anyhow, Context};
use log::warn;

use gift_oracle::config;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let stored = config::load_config();
    if !config::config_path().exists() {
        if let Err(err) = config::save_config(&stored) {
            warn!("could not write default config: {err:#}");
        }
    }
    let config = stored.with_env_overrides();
    config
        .responses
        .validate()
        .context("response table in config is unusable")?;

    let options = eframe::NativeOptions::default();

    eframe::run_native(
        "Gift Oracle",
        options,
        Box::new(|_cc| Ok(Box::new(ui::app::GiftApp::new(config)))),
    )
    .map_err(|err| anyhow!("window failed: {err}"))
}
