//! Per-session state: farmer profile and conversation history.
//!
//! Sessions live in process memory only; a restart clears them. History is
//! append-only within a session, capped at a configured number of entries
//! (oldest dropped), and cleared on explicit request.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{AdvisorError, Result};
use crate::language::Language;
use crate::models::ConversationTurn;

#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub id: Uuid,
    pub location: Option<String>,
    pub crop: Option<String>,
    pub soil_type: Option<String>,
    pub language: Language,
    pub history: Vec<ConversationTurn>,
    pub created_at: DateTime<Utc>,
}

/// Partial profile update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub location: Option<String>,
    pub crop: Option<String>,
    pub soil_type: Option<String>,
    pub language: Option<Language>,
}

pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, Session>>,
    max_history_entries: usize,
}

impl SessionStore {
    pub fn new(max_history_entries: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_history_entries,
        }
    }

    pub async fn create(&self, profile: ProfileUpdate) -> Session {
        let session = Session {
            id: Uuid::new_v4(),
            location: profile.location,
            crop: profile.crop,
            soil_type: profile.soil_type,
            language: profile.language.unwrap_or(Language::English),
            history: Vec::new(),
            created_at: Utc::now(),
        };

        self.sessions
            .write()
            .await
            .insert(session.id, session.clone());
        tracing::info!(session = %session.id, "session created");
        session
    }

    pub async fn get(&self, id: Uuid) -> Result<Session> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(AdvisorError::SessionNotFound(id))
    }

    pub async fn update_profile(&self, id: Uuid, profile: ProfileUpdate) -> Result<Session> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(&id)
            .ok_or(AdvisorError::SessionNotFound(id))?;

        if let Some(location) = profile.location {
            session.location = Some(location);
        }
        if let Some(crop) = profile.crop {
            session.crop = Some(crop);
        }
        if let Some(soil_type) = profile.soil_type {
            session.soil_type = Some(soil_type);
        }
        if let Some(language) = profile.language {
            session.language = language;
        }

        Ok(session.clone())
    }

    /// Append one completed user/assistant exchange.
    pub async fn append_exchange(
        &self,
        id: Uuid,
        user: ConversationTurn,
        assistant: ConversationTurn,
    ) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(&id)
            .ok_or(AdvisorError::SessionNotFound(id))?;

        session.history.push(user);
        session.history.push(assistant);

        let excess = session.history.len().saturating_sub(self.max_history_entries);
        if excess > 0 {
            session.history.drain(..excess);
        }

        Ok(())
    }

    pub async fn clear_history(&self, id: Uuid) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(&id)
            .ok_or(AdvisorError::SessionNotFound(id))?;
        session.history.clear();
        tracing::info!(session = %id, "conversation history cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn round_trip_appends_exactly_two_turns() {
        let store = SessionStore::new(20);
        let session = store.create(ProfileUpdate::default()).await;

        store
            .append_exchange(
                session.id,
                ConversationTurn::user("question"),
                ConversationTurn::assistant("answer"),
            )
            .await
            .unwrap();

        let session = store.get(session.id).await.unwrap();
        assert_eq!(session.history.len(), 2);
        assert_eq!(session.history[0].content, "question");
        assert_eq!(session.history[1].content, "answer");
    }

    #[tokio::test]
    async fn clear_history_empties_the_session() {
        let store = SessionStore::new(20);
        let session = store.create(ProfileUpdate::default()).await;

        store
            .append_exchange(
                session.id,
                ConversationTurn::user("q"),
                ConversationTurn::assistant("a"),
            )
            .await
            .unwrap();
        store.clear_history(session.id).await.unwrap();

        let session = store.get(session.id).await.unwrap();
        assert!(session.history.is_empty());
    }

    #[tokio::test]
    async fn history_cap_drops_oldest_entries() {
        let store = SessionStore::new(4);
        let session = store.create(ProfileUpdate::default()).await;

        for i in 0..4 {
            store
                .append_exchange(
                    session.id,
                    ConversationTurn::user(format!("q{i}")),
                    ConversationTurn::assistant(format!("a{i}")),
                )
                .await
                .unwrap();
        }

        let session = store.get(session.id).await.unwrap();
        assert_eq!(session.history.len(), 4);
        assert_eq!(session.history[0].content, "q2");
        assert_eq!(session.history[3].content, "a3");
    }

    #[tokio::test]
    async fn profile_update_is_partial() {
        let store = SessionStore::new(20);
        let session = store
            .create(ProfileUpdate {
                location: Some("Nashik, Maharashtra".into()),
                ..Default::default()
            })
            .await;

        let updated = store
            .update_profile(
                session.id,
                ProfileUpdate {
                    soil_type: Some("Black Soil".into()),
                    language: Some(Language::Marathi),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.location.as_deref(), Some("Nashik, Maharashtra"));
        assert_eq!(updated.soil_type.as_deref(), Some("Black Soil"));
        assert_eq!(updated.language, Language::Marathi);
    }

    #[tokio::test]
    async fn unknown_session_is_an_error() {
        let store = SessionStore::new(20);
        let missing = Uuid::new_v4();
        assert!(matches!(
            store.get(missing).await,
            Err(AdvisorError::SessionNotFound(_))
        ));
        assert!(store.clear_history(missing).await.is_err());
    }
}
