use crate::domain::{ChatSession, ClaudePaths, SESSION_FILE_EXT, file_stem_string, is_agent_file_stem};
use crate::infra::{count_records, extract_title, extract_version, format_mtime};
use std::fs;
use std::path::Path;

/// Scan every project directory for primary session files, newest first.
/// An unreadable projects root is the empty-list display state, not an error.
pub fn scan_sessions(paths: &ClaudePaths) -> Vec<ChatSession> {
    let mut sessions: Vec<ChatSession> = Vec::new();

    let Ok(entries) = fs::read_dir(&paths.projects) else {
        return sessions;
    };

    for entry in entries.flatten() {
        if !entry.file_type().is_ok_and(|file_type| file_type.is_dir()) {
            continue;
        }

        let project_name = entry.file_name().to_string_lossy().to_string();
        sessions.extend(scan_project_dir(&entry.path(), &project_name));
    }

    // Descending by the fixed-format timestamp string, which is
    // order-equivalent to chronological.
    sessions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    sessions
}

fn scan_project_dir(project_dir: &Path, project_name: &str) -> Vec<ChatSession> {
    let mut sessions: Vec<ChatSession> = Vec::new();

    let Ok(entries) = fs::read_dir(project_dir) else {
        return sessions;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if path.extension().and_then(|ext| ext.to_str()) != Some(SESSION_FILE_EXT) {
            continue;
        }

        let Some(uuid) = file_stem_string(&path) else {
            continue;
        };
        if is_agent_file_stem(&uuid) {
            continue;
        }

        sessions.push(ChatSession {
            title: extract_title(&path),
            timestamp: format_mtime(&path),
            version: extract_version(&path),
            line_count: count_records(&path),
            project: project_name.to_string(),
            uuid,
            path,
        });
    }

    sessions
}
