use color_eyre::{Result, eyre::WrapErr};
use std::{
    fs::{self, OpenOptions},
    path::{Path, PathBuf},
};

const LOG_FILE: &str = "ethfolio.log";

/// Routes `log` output to a file in `data_dir`; the terminal belongs to the UI.
pub fn init(data_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(data_dir)
        .wrap_err_with(|| format!("failed to create data directory {}", data_dir.display()))?;
    let path = data_dir.join(LOG_FILE);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .wrap_err_with(|| format!("failed to open log file {}", path.display()))?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .format_timestamp_millis()
        .try_init()
        .wrap_err("failed to install logger")?;
    Ok(path)
}
