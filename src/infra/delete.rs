use crate::domain::ClaudePaths;
use crate::infra::{SyncIndexError, remove_from_indexes, resolve_related_paths};
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeleteSessionsError {
    #[error("failed to delete {path}: {source}")]
    Remove {
        path: String,
        source: io::Error,
        completed: usize,
    },

    #[error("failed to update index: {source}")]
    SyncIndex {
        source: SyncIndexError,
        completed: usize,
    },
}

impl DeleteSessionsError {
    /// Sessions fully deleted before the batch stopped.
    pub fn completed(&self) -> usize {
        match self {
            Self::Remove { completed, .. } | Self::SyncIndex { completed, .. } => *completed,
        }
    }
}

/// Delete each session's full related-file set and drop its manifest
/// entries. All-or-nothing per session, best-effort across the batch: the
/// first filesystem or index error stops everything, so a visible failure
/// is never silently skipped past.
pub fn delete_sessions(paths: &ClaudePaths, uuids: &[String]) -> Result<usize, DeleteSessionsError> {
    let mut completed = 0usize;

    for uuid in uuids {
        for path in resolve_related_paths(paths, uuid) {
            remove_path(&path).map_err(|source| DeleteSessionsError::Remove {
                path: path.display().to_string(),
                source,
                completed,
            })?;
        }

        remove_from_indexes(paths, uuid)
            .map_err(|source| DeleteSessionsError::SyncIndex { source, completed })?;

        completed += 1;
    }

    Ok(completed)
}

/// Recursive remove that treats an already-missing path as done. The
/// resolver checks existence before listing a path, but a directory can be
/// removed implicitly when its parent (the chat directory) went first.
fn remove_path(path: &Path) -> io::Result<()> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(error) => return Err(error),
    };

    let result = if metadata.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };

    match result {
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SESSIONS_INDEX_FILE, SessionsIndex};
    use tempfile::tempdir;

    fn seed_session(paths: &ClaudePaths, project: &str, uuid: &str) {
        let project_dir = paths.projects.join(project);
        fs::create_dir_all(&project_dir).expect("project dir");
        fs::write(
            project_dir.join(format!("{uuid}.jsonl")),
            [
                r#"{"type":"file-history-snapshot"}"#,
                r#"{"type":"user","message":{"content":"hi"}}"#,
                r#"{"agent_id":"helper"}"#,
            ]
            .join("\n"),
        )
        .expect("primary");
        fs::write(
            project_dir.join(SESSIONS_INDEX_FILE),
            format!(
                r#"{{"version":1,"entries":[{{"sessionId":"{uuid}"}},{{"sessionId":"keep"}}],"originalPath":""}}"#
            ),
        )
        .expect("manifest");
    }

    #[test]
    fn empty_batch_deletes_nothing() {
        let dir = tempdir().expect("tempdir");
        let paths = ClaudePaths::new(dir.path());
        fs::create_dir_all(&paths.projects).expect("projects");
        assert_eq!(delete_sessions(&paths, &[]).expect("delete"), 0);
    }

    #[test]
    fn deletes_related_files_and_manifest_entry() {
        let dir = tempdir().expect("tempdir");
        let paths = ClaudePaths::new(dir.path());
        seed_session(&paths, "proj-a", "abc123");
        fs::create_dir_all(
            paths
                .projects
                .join("proj-a")
                .join("abc123")
                .join("tool-results"),
        )
        .expect("chat dir");
        fs::create_dir_all(&paths.debug).expect("debug");
        fs::write(paths.debug.join("abc123.txt"), "log").expect("debug log");
        fs::create_dir_all(&paths.todos).expect("todos");
        fs::write(paths.todos.join("abc123.json"), "[]").expect("todo");
        let agent_dir = paths.agents.join("helper");
        fs::create_dir_all(&agent_dir).expect("agent");
        fs::write(agent_dir.join("memory-local.md"), "m").expect("memory");

        let count = delete_sessions(&paths, &["abc123".to_string()]).expect("delete");
        assert_eq!(count, 1);

        // Nothing related remains and the resolver now sees an empty set.
        assert!(resolve_related_paths(&paths, "abc123").is_empty());
        assert!(!paths.debug.join("abc123.txt").exists());
        assert!(!paths.todos.join("abc123.json").exists());
        assert!(!agent_dir.join("memory-local.md").exists());

        let manifest = paths.projects.join("proj-a").join(SESSIONS_INDEX_FILE);
        let index: SessionsIndex =
            serde_json::from_str(&fs::read_to_string(manifest).expect("read")).expect("parse");
        assert!(index.entries.iter().all(|e| e.session_id != "abc123"));
        assert!(index.entries.iter().any(|e| e.session_id == "keep"));
    }

    #[test]
    fn missing_optional_files_do_not_error() {
        let dir = tempdir().expect("tempdir");
        let paths = ClaudePaths::new(dir.path());
        seed_session(&paths, "proj-a", "abc123");
        // Todo present, debug log absent.
        fs::create_dir_all(&paths.todos).expect("todos");
        fs::write(paths.todos.join("abc123-agent.json"), "[]").expect("todo");

        let count = delete_sessions(&paths, &["abc123".to_string()]).expect("delete");
        assert_eq!(count, 1);
        assert!(!paths.todos.join("abc123-agent.json").exists());
    }

    #[test]
    fn batch_deletes_every_selected_session() {
        let dir = tempdir().expect("tempdir");
        let paths = ClaudePaths::new(dir.path());
        seed_session(&paths, "proj-a", "aaa");
        seed_session(&paths, "proj-b", "bbb");

        let uuids = vec!["aaa".to_string(), "bbb".to_string()];
        assert_eq!(delete_sessions(&paths, &uuids).expect("delete"), 2);
        assert!(!paths.projects.join("proj-a").join("aaa.jsonl").exists());
        assert!(!paths.projects.join("proj-b").join("bbb.jsonl").exists());
    }

    #[cfg(unix)]
    #[test]
    fn batch_stops_at_first_failure_and_reports_progress() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().expect("tempdir");
        let paths = ClaudePaths::new(dir.path());
        seed_session(&paths, "proj-a", "aaa");
        seed_session(&paths, "proj-b", "bbb");
        fs::create_dir_all(&paths.debug).expect("debug");
        fs::write(paths.debug.join("bbb.txt"), "log").expect("debug log");
        fs::write(paths.debug.join("canary.txt"), "").expect("canary");
        fs::set_permissions(&paths.debug, fs::Permissions::from_mode(0o555)).expect("lock");

        // Permission bits do not constrain a privileged process; nothing to
        // assert in that case.
        if fs::remove_file(paths.debug.join("canary.txt")).is_ok() {
            fs::set_permissions(&paths.debug, fs::Permissions::from_mode(0o755)).expect("unlock");
            return;
        }

        let uuids = vec!["aaa".to_string(), "bbb".to_string()];
        let error = delete_sessions(&paths, &uuids).expect_err("batch should stop");
        assert_eq!(error.completed(), 1);
        assert!(!paths.projects.join("proj-a").join("aaa.jsonl").exists());
        assert!(paths.debug.join("bbb.txt").exists());

        fs::set_permissions(&paths.debug, fs::Permissions::from_mode(0o755)).expect("unlock");
    }

    #[test]
    fn unknown_uuid_still_counts_as_completed() {
        // Resolving nothing and finding no manifest entries is a no-op, not
        // a failure; the batch continues.
        let dir = tempdir().expect("tempdir");
        let paths = ClaudePaths::new(dir.path());
        seed_session(&paths, "proj-a", "real");

        let uuids = vec!["ghost".to_string(), "real".to_string()];
        assert_eq!(delete_sessions(&paths, &uuids).expect("delete"), 2);
        assert!(!paths.projects.join("proj-a").join("real.jsonl").exists());
    }
}
