use color_eyre::{Result, eyre::WrapErr};
use fjall::{Config, Keyspace, PartitionCreateOptions, PersistMode};
use std::{
    fs,
    path::{Path, PathBuf},
};

mod repositories;

pub use repositories::SettingsRepository;

const KEYSPACE_DIR: &str = "keyspace";

pub struct Storage {
    root: PathBuf,
    keyspace: Keyspace,
    settings: SettingsRepository,
}

impl Storage {
    /// Opens the keyspace below `data_dir`, creating it on first use.
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self> {
        let root = data_dir.as_ref().join(KEYSPACE_DIR);
        fs::create_dir_all(&root)?;

        let keyspace = Config::new(&root)
            .open()
            .wrap_err_with(|| format!("failed to open keyspace at {}", root.display()))?;
        let settings = keyspace.open_partition("settings", PartitionCreateOptions::default())?;

        Ok(Self {
            root,
            settings: SettingsRepository::new(settings),
            keyspace,
        })
    }

    pub fn settings(&self) -> &SettingsRepository {
        &self.settings
    }

    pub fn persist(&self) -> Result<()> {
        self.keyspace
            .persist(PersistMode::Buffer)
            .wrap_err("failed to persist keyspace")
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn open_creates_keyspace_below_data_dir() -> Result<()> {
        let temp = tempdir()?;
        let storage = Storage::open(temp.path())?;

        assert_eq!(storage.root(), temp.path().join(KEYSPACE_DIR));
        assert!(storage.root().is_dir());
        assert!(storage.settings().last_path()?.is_none());
        Ok(())
    }
}
