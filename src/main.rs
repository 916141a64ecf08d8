mod command;
mod config;
mod kernel;
mod logger;

use std::process;

use config::{Config, CONFIG_FILE_PATH};
use kernel::Driver;

fn main() {
    let config = Config::load_or_default(CONFIG_FILE_PATH).unwrap_or_else(|err| {
        eprintln!("Failed to load {}: {}", CONFIG_FILE_PATH, err);
        process::exit(1);
    });

    // Validated when the config was parsed.
    let level = config.get_log_level().unwrap_or(log::LevelFilter::Info);
    if let Err(err) = logger::init(level) {
        eprintln!("Failed to install logger: {}", err);
    }

    let mut driver = Driver::new(&config.kernel);
    if let Err(err) = driver.start() {
        eprintln!("Shell terminated: {}", err);
        process::exit(1);
    }
}
