use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use uuid::Uuid;

use crate::error::QuizError;
use crate::gameplay::GameplaySession;

pub type SessionId = String;

/// Keeps each gameplay session as a JSON file named by its UUID, so a
/// session can be picked up again by a later process.
#[derive(Clone, Debug)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    pub fn open<P: Into<PathBuf>>(dir: P) -> Result<SessionStore, QuizError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|err| QuizError::io(&dir, err))?;
        Ok(SessionStore { dir })
    }

    fn path(&self, id: &str) -> Result<PathBuf, QuizError> {
        // Only well-formed ids may name a file in the store directory
        Uuid::parse_str(id).map_err(|_| QuizError::SessionNotFound(id.to_string()))?;
        Ok(self.dir.join(format!("{}.json", id)))
    }

    pub fn create(&self, session: &GameplaySession) -> Result<SessionId, QuizError> {
        let id = Uuid::new_v4().to_string();
        self.save(&id, session)?;
        info!(
            "Created session {} for {} game of {:?}",
            id,
            session.mode(),
            session.region_path()
        );
        Ok(id)
    }

    pub fn load(&self, id: &str) -> Result<GameplaySession, QuizError> {
        let path = self.path(id)?;
        let json = fs::read_to_string(&path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => QuizError::SessionNotFound(id.to_string()),
            _ => QuizError::io(&path, err),
        })?;
        serde_json::from_str(&json).map_err(|err| QuizError::json(&path, err))
    }

    pub fn save(&self, id: &str, session: &GameplaySession) -> Result<(), QuizError> {
        let path = self.path(id)?;
        let json = serde_json::to_string(session).map_err(|err| QuizError::json(&path, err))?;
        // Renamed over the old file once fully written
        let partial = path.with_extension("json.tmp");
        fs::write(&partial, json).map_err(|err| QuizError::io(&partial, err))?;
        fs::rename(&partial, &path).map_err(|err| QuizError::io(&path, err))?;
        debug!("Saved session {}", id);
        Ok(())
    }

    pub fn destroy(&self, id: &str) -> Result<(), QuizError> {
        let path = self.path(id)?;
        fs::remove_file(&path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => QuizError::SessionNotFound(id.to_string()),
            _ => QuizError::io(&path, err),
        })?;
        info!("Destroyed session {}", id);
        Ok(())
    }

    /// Loads the session, applies `f` and writes the result back.
    pub fn with_session<T, F>(&self, id: &str, f: F) -> Result<T, QuizError>
    where
        F: FnOnce(&mut GameplaySession) -> T,
    {
        let mut session = self.load(id)?;
        let result = f(&mut session);
        self.save(id, &session)?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{GameType, QuizMode};
    use crate::deck::build_deck;
    use crate::region::Subregion;

    fn session() -> GameplaySession {
        let subregions = vec![Subregion::named("Oslo"), Subregion::named("Bergen")];
        GameplaySession::new(
            "norway",
            GameType::Train,
            build_deck(&subregions, QuizMode::Name, "norway"),
        )
    }

    #[test]
    fn test_create_load_destroy() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::open(dir.path().join("sessions")).unwrap();
        let original = session();
        let id = store.create(&original).unwrap();
        assert_eq!(store.load(&id).unwrap(), original);

        store.destroy(&id).unwrap();
        match store.load(&id) {
            Err(QuizError::SessionNotFound(missing)) => assert_eq!(missing, id),
            other => panic!("expected SessionNotFound, got {:?}", other),
        }
        assert!(store.destroy(&id).is_err());
    }

    #[test]
    fn test_with_session_persists_changes() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::open(dir.path()).unwrap();
        let id = store.create(&session()).unwrap();

        let card_id = store.load(&id).unwrap().cards()[0].id.clone();
        let outcome = store.with_session(&id, |s| s.skip(&card_id)).unwrap();
        assert!(!outcome.victory);

        let reloaded = store.load(&id).unwrap();
        assert_eq!(reloaded.attempts(), 1);
        assert_eq!(reloaded.remaining(), 1);
    }

    #[test]
    fn test_save_replaces_whole_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::open(dir.path()).unwrap();
        let id = store.create(&session()).unwrap();

        let mut session = store.load(&id).unwrap();
        let card_id = session.cards()[0].id.clone();
        session.skip(&card_id);
        store.save(&id, &session).unwrap();
        assert_eq!(store.load(&id).unwrap(), session);

        // Only the session file is left behind
        let files: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(files, vec![format!("{}.json", id)]);
    }

    #[test]
    fn test_rejects_malformed_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::open(dir.path()).unwrap();
        match store.load("../../etc/passwd") {
            Err(QuizError::SessionNotFound(_)) => (),
            other => panic!("expected SessionNotFound, got {:?}", other),
        }
    }
}
