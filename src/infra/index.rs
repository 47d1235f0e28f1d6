use crate::domain::{ClaudePaths, SESSIONS_INDEX_FILE, SessionsIndex};
use std::fs;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncIndexError {
    #[error("failed to read projects dir: {0}")]
    ReadProjects(#[source] io::Error),

    #[error("failed to encode manifest {path}: {source}")]
    Encode {
        path: String,
        source: serde_json::Error,
    },

    #[error("failed to write manifest {path}: {source}")]
    Write { path: String, source: io::Error },
}

/// Drop `uuid` from every project manifest that lists it. A corrupt or
/// unreadable manifest is skipped so it cannot block deletion of the
/// session's other files; manifests without the entry are left untouched.
/// The rewrite is a plain full-file overwrite, accepted as non-transactional
/// for this single-operator tool.
pub fn remove_from_indexes(paths: &ClaudePaths, uuid: &str) -> Result<(), SyncIndexError> {
    let entries = fs::read_dir(&paths.projects).map_err(SyncIndexError::ReadProjects)?;

    for entry in entries.flatten() {
        let project_dir = entry.path();
        if !project_dir.is_dir() {
            continue;
        }

        let index_path = project_dir.join(SESSIONS_INDEX_FILE);
        let Ok(raw) = fs::read_to_string(&index_path) else {
            continue;
        };
        let Ok(mut index) = serde_json::from_str::<SessionsIndex>(&raw) else {
            continue;
        };

        let before = index.entries.len();
        index.entries.retain(|entry| entry.session_id != uuid);
        if index.entries.len() == before {
            continue;
        }

        let text =
            serde_json::to_string_pretty(&index).map_err(|source| SyncIndexError::Encode {
                path: index_path.display().to_string(),
                source,
            })?;
        fs::write(&index_path, text).map_err(|source| SyncIndexError::Write {
            path: index_path.display().to_string(),
            source,
        })?;
    }

    Ok(())
}
