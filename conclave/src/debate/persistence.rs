//! Session persistence: one pretty-printed JSON file per completed session.
//!
//! Files are named `{session_id}_{user_id}.json` and written once. Loading
//! re-validates the session invariants so a hand-edited or truncated file is
//! rejected instead of propagating bad totals into reports.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::state::DebateSession;
use crate::error::StorageError;

/// Integrity check result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityStatus {
    Valid,
    Corrupted { errors: Vec<String> },
}

impl IntegrityStatus {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// Check the invariants a persisted session must satisfy.
pub fn validate_session(session: &DebateSession) -> IntegrityStatus {
    let mut errors = Vec::new();

    if session.final_answer.is_some() != session.completed_at.is_some() {
        errors.push("final_answer and completed_at must be set together".to_string());
    }

    let mut last = 0;
    for round in &session.rounds {
        if round.round_number <= last {
            errors.push(format!(
                "round {} does not follow round {}",
                round.round_number, last
            ));
        }
        last = round.round_number;
    }

    let recomputed = session.computed_total_tokens();
    if session.is_complete() && session.total_tokens != recomputed {
        errors.push(format!(
            "total_tokens is {} but responses sum to {}",
            session.total_tokens, recomputed
        ));
    }

    if let Some(c) = session.final_confidence {
        if !(0.0..=100.0).contains(&c) {
            errors.push(format!("final_confidence {c} is outside 0-100"));
        }
    }

    if errors.is_empty() {
        IntegrityStatus::Valid
    } else {
        IntegrityStatus::Corrupted { errors }
    }
}

/// Replace anything outside `[A-Za-z0-9_-]` so a user id is safe in a file name.
pub fn sanitize_user_id(user_id: &str) -> String {
    let cleaned: String = user_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "anonymous".to_string()
    } else {
        cleaned
    }
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, session_id: &str, user_id: &str) -> PathBuf {
        self.dir
            .join(format!("{}_{}.json", session_id, sanitize_user_id(user_id)))
    }

    /// Write a completed session. Never overwrites an existing file.
    pub fn save(&self, session: &DebateSession) -> Result<PathBuf, StorageError> {
        if !session.is_complete() {
            return Err(StorageError::Incomplete(session.session_id.clone()));
        }

        std::fs::create_dir_all(&self.dir).map_err(|source| StorageError::Io {
            path: self.dir.display().to_string(),
            source,
        })?;

        let path = self.path_for(&session.session_id, &session.user_id);
        let json = serde_json::to_string_pretty(session)
            .map_err(|e| StorageError::Serialize(e.to_string()))?;

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|source| {
                if source.kind() == ErrorKind::AlreadyExists {
                    StorageError::AlreadyExists(path.display().to_string())
                } else {
                    StorageError::Io {
                        path: path.display().to_string(),
                        source,
                    }
                }
            })?;

        file.write_all(json.as_bytes())
            .and_then(|_| file.sync_all())
            .map_err(|source| StorageError::Io {
                path: path.display().to_string(),
                source,
            })?;

        info!(session = %session.session_id, path = %path.display(), "session saved");
        Ok(path)
    }

    pub fn load(&self, session_id: &str, user_id: &str) -> Result<DebateSession, StorageError> {
        self.load_path(&self.path_for(session_id, user_id))
    }

    /// Read and validate a session file.
    pub fn load_path(&self, path: &Path) -> Result<DebateSession, StorageError> {
        let shown = path.display().to_string();
        let raw = std::fs::read_to_string(path).map_err(|source| StorageError::Io {
            path: shown.clone(),
            source,
        })?;

        let session: DebateSession =
            serde_json::from_str(&raw).map_err(|e| StorageError::Integrity {
                path: shown.clone(),
                reason: e.to_string(),
            })?;

        match validate_session(&session) {
            IntegrityStatus::Valid => Ok(session),
            IntegrityStatus::Corrupted { errors } => Err(StorageError::Integrity {
                path: shown,
                reason: errors.join("; "),
            }),
        }
    }

    /// Completed sessions of one user, newest first.
    pub fn history(&self, user_id: &str, limit: usize) -> Result<Vec<DebateSession>, StorageError> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StorageError::Io {
                    path: self.dir.display().to_string(),
                    source,
                })
            }
        };

        let suffix = format!("_{}.json", sanitize_user_id(user_id));
        let mut sessions = Vec::new();

        for entry in entries.flatten() {
            let path = entry.path();
            let matches = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(&suffix));
            if !matches {
                continue;
            }

            match self.load_path(&path) {
                Ok(session) if session.user_id == user_id => sessions.push(session),
                Ok(_) => debug!(path = %path.display(), "file name matched another user"),
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable session"),
            }
        }

        sessions.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        sessions.truncate(limit);
        Ok(sessions)
    }
}
