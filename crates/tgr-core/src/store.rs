use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{domain::SessionToken, Result};

/// Plaintext session file, one per phone number: `<dir>/<phone>.session`.
///
/// The content is whatever the client adapter last produced; it is never parsed here.
#[derive(Clone, Debug)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(dir: impl AsRef<Path>, phone: &str) -> Self {
        Self {
            path: dir.as_ref().join(format!("{phone}.session")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn ensure_dir(&self) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    pub fn load(&self) -> Result<Option<SessionToken>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let txt = fs::read_to_string(&self.path)?;
        if txt.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(SessionToken(txt)))
    }

    pub fn save(&self, token: &SessionToken) -> Result<()> {
        fs::write(&self.path, &token.0)?;
        Ok(())
    }
}
