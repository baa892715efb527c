use std::{
    fs, io,
    path::{Path, PathBuf},
};

use super::{ProfileStore, StoreError, StoredProfile, UserId};

/// Stores one pretty-printed `<user>.json` document per player.
#[derive(Clone, Debug)]
pub struct JsonFileProfileStore {
    root: PathBuf,
}

impl JsonFileProfileStore {
    /// Opens a store rooted at `root`, creating the directory when missing.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| io_error(&root, source))?;
        Ok(Self { root })
    }

    /// Directory holding the profile documents.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, user: &UserId) -> PathBuf {
        self.root.join(format!("{}.json", user.as_str()))
    }
}

impl ProfileStore for JsonFileProfileStore {
    fn load_profile(&self, user: &UserId) -> Result<Option<StoredProfile>, StoreError> {
        let path = self.path_for(user);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(io_error(&path, error)),
        };

        let stored = serde_json::from_str(&contents)?;
        tracing::debug!(user = %user, path = %path.display(), "loaded profile");
        Ok(Some(stored))
    }

    fn save_profile(&self, user: &UserId, profile: &StoredProfile) -> Result<(), StoreError> {
        let path = self.path_for(user);
        let staging = path.with_extension("json.tmp");
        let contents = serde_json::to_vec_pretty(profile)?;

        fs::write(&staging, contents).map_err(|source| io_error(&staging, source))?;
        if let Err(source) = fs::rename(&staging, &path) {
            if let Err(cleanup) = fs::remove_file(&staging) {
                tracing::warn!(
                    path = %staging.display(),
                    "failed to remove staged profile: {cleanup}"
                );
            }
            return Err(io_error(&path, source));
        }

        tracing::debug!(user = %user, path = %path.display(), "saved profile");
        Ok(())
    }
}

fn io_error(path: &Path, source: io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        source,
    }
}
