use serde::{ Deserialize, Serialize };
use thiserror::Error;

use std::fs;
use std::path::{ Path, PathBuf };

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("error accessing session file: {0}")]
    IO(#[from] std::io::Error),
    #[error("error serialising session: {0}")]
    Serialisation(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Session {
    #[serde(rename="_id")]
    pub id: String,
    pub username: String,
    pub token: String,
}

pub struct SessionStore {
    path: PathBuf,
}
impl SessionStore {
    pub fn new(path:&Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    pub fn load(&self) -> Result<Option<Session>, SessionError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let raw = fs::read_to_string(&self.path)?;
        // A session file that no longer parses reads as logged out.
        Ok(serde_json::from_str(&raw).ok())
    }

    pub fn save(&self, session:&Session) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let raw = serde_json::to_string(session)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }

    pub fn clear(&self) -> Result<(), SessionError> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_session() -> Session {
        Session {
            id: "64ff00aa12".to_string(),
            username: "admin".to_string(),
            token: "bearer-token".to_string(),
        }
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(&dir.path().join("session.json"));

        store.save(&sample_session()).unwrap();
        let loaded = store.load().unwrap().unwrap();

        assert_eq!(loaded.id, "64ff00aa12");
        assert_eq!(loaded.username, "admin");
        assert_eq!(loaded.token, "bearer-token");
    }

    #[test]
    fn missing_file_loads_as_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(&dir.path().join("session.json"));

        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn corrupt_file_loads_as_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = SessionStore::new(&path);
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn clear_removes_the_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(&dir.path().join("session.json"));

        store.save(&sample_session()).unwrap();
        store.clear().unwrap();

        assert!(store.load().unwrap().is_none());
        // Clearing an already-cleared store is not an error.
        store.clear().unwrap();
    }
}
