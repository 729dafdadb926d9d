// Durable delivery cursor
//
// One integer in a file: the highest notification id this client has
// fully processed. Read at every (re)connect, written only after a batch
// has been applied, survives restarts. The file is per profile, not per
// account, so a shared machine shares the cursor - a known limitation.

use std::fs;
use std::path::PathBuf;

use taskping_core::{NotifyError, Result};

/// File-backed cursor store
#[derive(Debug, Clone)]
pub struct CursorStore {
    path: PathBuf,
}

impl CursorStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default location under the user config dir
    pub fn default_path() -> Result<Self> {
        let dir = dirs::config_dir().ok_or_else(|| NotifyError::cursor("No config directory"))?;
        Ok(Self::new(dir.join("taskping").join("last_id")))
    }

    /// Load the persisted cursor. Absent or malformed files mean 0
    /// (start of queue).
    pub fn load(&self) -> i64 {
        match fs::read_to_string(&self.path) {
            Ok(contents) => contents.trim().parse().unwrap_or(0),
            Err(_) => 0,
        }
    }

    /// Persist a new cursor: write a temp file, then rename, so a crash
    /// mid-write never leaves a truncated cursor behind.
    pub fn save(&self, last_id: i64) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| NotifyError::cursor(e.to_string()))?;
        }

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, last_id.to_string()).map_err(|e| NotifyError::cursor(e.to_string()))?;
        fs::rename(&tmp, &self.path).map_err(|e| NotifyError::cursor(e.to_string()))?;
        Ok(())
    }
}
