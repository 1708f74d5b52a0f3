use std::path::PathBuf;

use crate::{Error, Result};

/// Who the current pantry belongs to.
///
/// The owner id is constructor-injected everywhere it is needed instead of
/// living in some ambient global, so tests (and a hypothetical multi-account
/// future) can hold several sessions side by side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    owner_id: String,
}

impl Session {
    pub fn new(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
        }
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    /// Load the persisted session, if someone is logged in.
    pub fn load() -> Result<Option<Session>> {
        let path = Self::session_path()?;
        if !path.exists() {
            return Ok(None);
        }
        let owner_id = std::fs::read_to_string(&path)?;
        let owner_id = owner_id.trim();
        if owner_id.is_empty() {
            return Ok(None);
        }
        Ok(Some(Session::new(owner_id)))
    }

    /// Persist this session so later invocations pick it up.
    pub fn save(&self) -> Result<()> {
        let path = Self::session_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, &self.owner_id)?;
        Ok(())
    }

    /// Forget the persisted session (logout).
    pub fn clear() -> Result<()> {
        let path = Self::session_path()?;
        if path.exists() {
            std::fs::remove_file(&path)?;
        }
        Ok(())
    }

    fn session_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| Error::Config("Could not find config directory".into()))?
            .join("pantrypal");
        Ok(config_dir.join("session"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_id_round_trips() {
        let session = Session::new("ada@example.com");
        assert_eq!(session.owner_id(), "ada@example.com");
    }
}
