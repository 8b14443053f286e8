//! CLI smoke entry point.
//!
//! # Responsibility
//! - Load `FOODHUB_*` configuration and open (and migrate) the database.
//! - Keep output deterministic for quick local sanity checks.

use foodhub_core::db::migrations::current_user_version;
use foodhub_core::{core_version, open_db, FoodhubConfig};
use log::info;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("foodhub_cli error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), String> {
    let config = FoodhubConfig::from_env().map_err(|err| err.to_string())?;
    config.apply().map_err(|err| err.to_string())?;

    let conn = open_db(&config.db_path).map_err(|err| err.to_string())?;
    let schema_version = current_user_version(&conn).map_err(|err| err.to_string())?;
    info!(
        "event=cli_smoke module=cli status=ok schema_version={schema_version} id_scheme={}",
        config.id_scheme
    );

    println!("foodhub_core ping={}", foodhub_core::ping());
    println!("foodhub_core version={}", core_version());
    println!("db_path={}", config.db_path.display());
    println!("schema_version={schema_version}");
    println!("id_scheme={}", config.id_scheme);
    Ok(())
}
