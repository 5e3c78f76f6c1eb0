//! SQLite storage for completed sessions.
//!
//! Rows are immutable snapshots of a finished wizard run plus a
//! server-assigned id and completion timestamp. Absent optional fields are
//! stored as NULL, never omitted; list fields are stored as JSON text, NULL
//! when empty.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::Emotion;
use crate::utilities::errors::DatabaseError;

/// A finished session about to be persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSession {
    pub user_id: String,
    pub custom_emotion: Option<String>,
    pub selected_emotion: Option<Emotion>,
    pub emotion_intensity: Option<u8>,
    pub body_sensation: Option<String>,
    pub automatic_thought: Option<String>,
    #[serde(default)]
    pub detected_distortions: Vec<String>,
    #[serde(default)]
    pub ai_questions: Vec<String>,
    pub balanced_thought: Option<String>,
    pub selected_action: Option<String>,
}

/// A persisted session row. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletedSession {
    pub id: Uuid,
    pub user_id: String,
    pub completed_at: DateTime<Utc>,
    pub custom_emotion: Option<String>,
    pub selected_emotion: Option<Emotion>,
    pub emotion_intensity: Option<u8>,
    pub body_sensation: Option<String>,
    pub automatic_thought: Option<String>,
    pub detected_distortions: Option<Vec<String>>,
    pub ai_questions: Option<Vec<String>>,
    pub balanced_thought: Option<String>,
    pub selected_action: Option<String>,
}

/// SQLite-backed session history store.
pub struct SessionStore {
    conn: Connection,
}

impl SessionStore {
    /// Open (or create) the store at `db_path`. Defaults to the
    /// `MINDMATE_DB` environment variable, then `./mindmate.db`.
    pub fn open(db_path: Option<PathBuf>) -> Result<Self, DatabaseError> {
        let db_path = db_path.unwrap_or_else(|| {
            std::env::var("MINDMATE_DB")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("mindmate.db"))
        });

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| DatabaseError::ConnectionError {
                    message: e.to_string(),
                })?;
            }
        }

        let conn = Connection::open(&db_path).map_err(|e| DatabaseError::ConnectionError {
            message: e.to_string(),
        })?;
        let store = Self { conn };
        store.initialize()?;
        Ok(store)
    }

    /// In-memory store for tests.
    pub fn in_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory().map_err(|e| DatabaseError::ConnectionError {
            message: e.to_string(),
        })?;
        let store = Self { conn };
        store.initialize()?;
        Ok(store)
    }

    fn initialize(&self) -> Result<(), DatabaseError> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS cbt_sessions (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                completed_at TEXT NOT NULL,
                custom_emotion TEXT,
                selected_emotion TEXT,
                emotion_intensity INTEGER,
                body_sensation TEXT,
                automatic_thought TEXT,
                detected_distortions TEXT,
                ai_questions TEXT,
                balanced_thought TEXT,
                selected_action TEXT
            )",
            [],
        )?;
        Ok(())
    }

    /// Insert one completed session, assigning its id and timestamp.
    pub fn insert(&self, row: &NewSession) -> Result<CompletedSession, DatabaseError> {
        let id = Uuid::new_v4();
        let completed_at = Utc::now();

        let distortions_json = list_to_json(&row.detected_distortions)?;
        let questions_json = list_to_json(&row.ai_questions)?;

        self.conn.execute(
            "INSERT INTO cbt_sessions (
                id, user_id, completed_at, custom_emotion, selected_emotion,
                emotion_intensity, body_sensation, automatic_thought,
                detected_distortions, ai_questions, balanced_thought, selected_action
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                id.to_string(),
                row.user_id,
                completed_at.to_rfc3339(),
                row.custom_emotion,
                row.selected_emotion.map(|e| e.id()),
                row.emotion_intensity,
                row.body_sensation,
                row.automatic_thought,
                distortions_json,
                questions_json,
                row.balanced_thought,
                row.selected_action,
            ],
        )?;

        Ok(CompletedSession {
            id,
            user_id: row.user_id.clone(),
            completed_at,
            custom_emotion: row.custom_emotion.clone(),
            selected_emotion: row.selected_emotion,
            emotion_intensity: row.emotion_intensity,
            body_sensation: row.body_sensation.clone(),
            automatic_thought: row.automatic_thought.clone(),
            detected_distortions: non_empty_list(&row.detected_distortions),
            ai_questions: non_empty_list(&row.ai_questions),
            balanced_thought: row.balanced_thought.clone(),
            selected_action: row.selected_action.clone(),
        })
    }

    /// All of one owner's sessions completed within `[start, end]`, newest
    /// first.
    pub fn select_range(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CompletedSession>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, completed_at, custom_emotion, selected_emotion,
                    emotion_intensity, body_sensation, automatic_thought,
                    detected_distortions, ai_questions, balanced_thought, selected_action
             FROM cbt_sessions
             WHERE user_id = ?1 AND completed_at >= ?2 AND completed_at <= ?3
             ORDER BY completed_at DESC",
        )?;

        let rows = stmt.query_map(
            params![user_id, start.to_rfc3339(), end.to_rfc3339()],
            decode_row,
        )?;

        let mut sessions = Vec::new();
        for row in rows {
            sessions.push(row??);
        }
        Ok(sessions)
    }
}

type DecodedRow = Result<CompletedSession, DatabaseError>;

fn decode_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DecodedRow> {
    let id: String = row.get(0)?;
    let user_id: String = row.get(1)?;
    let completed_at: String = row.get(2)?;
    let custom_emotion: Option<String> = row.get(3)?;
    let selected_emotion: Option<String> = row.get(4)?;
    let emotion_intensity: Option<u8> = row.get(5)?;
    let body_sensation: Option<String> = row.get(6)?;
    let automatic_thought: Option<String> = row.get(7)?;
    let detected_distortions: Option<String> = row.get(8)?;
    let ai_questions: Option<String> = row.get(9)?;
    let balanced_thought: Option<String> = row.get(10)?;
    let selected_action: Option<String> = row.get(11)?;

    Ok((|| {
        let id = Uuid::parse_str(&id).map_err(|e| DatabaseError::DecodeError {
            message: format!("bad session id: {}", e),
        })?;
        let completed_at = DateTime::parse_from_rfc3339(&completed_at)
            .map_err(|e| DatabaseError::DecodeError {
                message: format!("bad timestamp: {}", e),
            })?
            .with_timezone(&Utc);

        Ok(CompletedSession {
            id,
            user_id,
            completed_at,
            custom_emotion,
            selected_emotion: selected_emotion.and_then(|s| s.parse().ok()),
            emotion_intensity,
            body_sensation,
            automatic_thought,
            detected_distortions: json_to_list(detected_distortions.as_deref())?,
            ai_questions: json_to_list(ai_questions.as_deref())?,
            balanced_thought,
            selected_action,
        })
    })())
}

fn list_to_json(list: &[String]) -> Result<Option<String>, DatabaseError> {
    if list.is_empty() {
        return Ok(None);
    }
    serde_json::to_string(list)
        .map(Some)
        .map_err(|e| DatabaseError::QueryError { message: e.to_string() })
}

fn json_to_list(json: Option<&str>) -> Result<Option<Vec<String>>, DatabaseError> {
    match json {
        None => Ok(None),
        Some(text) => serde_json::from_str(text)
            .map(Some)
            .map_err(|e| DatabaseError::DecodeError { message: e.to_string() }),
    }
}

fn non_empty_list(list: &[String]) -> Option<Vec<String>> {
    if list.is_empty() {
        None
    } else {
        Some(list.to_vec())
    }
}
