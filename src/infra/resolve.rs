use crate::domain::ClaudePaths;
use crate::infra::{extract_agent_ids, extract_slug};
use std::fs;
use std::path::PathBuf;

/// Local-scope memory is tied to exactly one session. Project- and
/// user-scope memory files may be shared and are never resolved.
const AGENT_LOCAL_MEMORY_FILE: &str = "memory-local.md";

/// Compute every path that belongs to a session. Read-only: the only file
/// content touched is the primary record, read for slug and agent ids.
/// Missing paths are skipped, never errors.
pub fn resolve_related_paths(paths: &ClaudePaths, uuid: &str) -> Vec<PathBuf> {
    let mut related: Vec<PathBuf> = Vec::new();
    let mut primary: Option<PathBuf> = None;

    if let Ok(entries) = fs::read_dir(&paths.projects) {
        for entry in entries.flatten() {
            let project_dir = entry.path();
            if !project_dir.is_dir() {
                continue;
            }

            let session_file = project_dir.join(format!("{uuid}.jsonl"));
            if !session_file.is_file() {
                continue;
            }

            // Chat directory holds subagent transcripts; tool-results lives
            // inside it but is listed explicitly as well.
            let chat_dir = project_dir.join(uuid);
            let tool_results = chat_dir.join("tool-results");

            related.push(session_file.clone());
            if primary.is_none() {
                primary = Some(session_file);
            }
            if chat_dir.exists() {
                related.push(chat_dir);
            }
            if tool_results.exists() {
                related.push(tool_results);
            }
        }
    }

    if let Some(primary) = &primary {
        if let Some(slug) = extract_slug(primary) {
            let plan_file = paths.plans.join(format!("{slug}.md"));
            if plan_file.exists() {
                related.push(plan_file);
            }
        }
    }

    let debug_file = paths.debug.join(format!("{uuid}.txt"));
    if debug_file.exists() {
        related.push(debug_file);
    }

    related.extend(todo_files(paths, uuid));

    let session_env_dir = paths.session_env.join(uuid);
    if session_env_dir.exists() {
        related.push(session_env_dir);
    }

    let file_history_dir = paths.file_history.join(uuid);
    if file_history_dir.exists() {
        related.push(file_history_dir);
    }

    if let Some(primary) = &primary {
        for agent_id in extract_agent_ids(primary) {
            let local_memory = paths.agents.join(&agent_id).join(AGENT_LOCAL_MEMORY_FILE);
            if local_memory.exists() {
                related.push(local_memory);
            }
        }
    }

    related
}

fn todo_files(paths: &ClaudePaths, uuid: &str) -> Vec<PathBuf> {
    let mut matches: Vec<PathBuf> = Vec::new();

    let Ok(entries) = fs::read_dir(&paths.todos) else {
        return matches;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        if name.starts_with(uuid) && name.ends_with(".json") {
            matches.push(path);
        }
    }

    matches.sort();
    matches
}
