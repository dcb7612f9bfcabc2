use color_eyre::{Result, eyre::WrapErr};
use fjall::PartitionHandle;

#[derive(Clone)]
pub struct SettingsRepository {
    handle: PartitionHandle,
}

impl SettingsRepository {
    const LAST_PATH_KEY: &'static str = "v1::router::last_path";

    pub(crate) fn new(handle: PartitionHandle) -> Self {
        Self { handle }
    }

    pub fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self
            .handle
            .get(key.as_bytes())
            .wrap_err("failed to read setting")?
            .map(|v| v.to_vec()))
    }

    pub fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        self.handle
            .insert(key.as_bytes(), value)
            .wrap_err("failed to write setting")
    }

    /// Route path that was open when the app last navigated.
    pub fn last_path(&self) -> Result<Option<String>> {
        self.get(Self::LAST_PATH_KEY)?
            .map(|bytes| String::from_utf8(bytes).wrap_err("stored path is not valid UTF-8"))
            .transpose()
    }

    pub fn set_last_path(&self, path: &str) -> Result<()> {
        self.put(Self::LAST_PATH_KEY, path.as_bytes())
    }
}
