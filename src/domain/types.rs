use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Session files produced for subagent transcripts share the projects tree
/// with primary sessions and are distinguished only by this name prefix.
pub const AGENT_FILE_PREFIX: &str = "agent-";

/// Extension of a primary session record file.
pub const SESSION_FILE_EXT: &str = "jsonl";

/// Per-project manifest file name.
pub const SESSIONS_INDEX_FILE: &str = "sessions-index.json";

/// Every subpath of the Claude tree this tool reads or mutates, computed once
/// from the resolved root and passed explicitly wherever it is needed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClaudePaths {
    pub root: PathBuf,
    pub projects: PathBuf,
    pub debug: PathBuf,
    pub todos: PathBuf,
    pub session_env: PathBuf,
    pub file_history: PathBuf,
    pub plans: PathBuf,
    pub agents: PathBuf,
}

impl ClaudePaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            projects: root.join("projects"),
            debug: root.join("debug"),
            todos: root.join("todos"),
            session_env: root.join("session-env"),
            file_history: root.join("file-history"),
            plans: root.join("plans"),
            agents: root.join("agents"),
            root,
        }
    }
}

/// One chat session, identified by the UUID-derived stem of its record file.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ChatSession {
    pub uuid: String,
    pub title: String,
    /// Fixed-format mtime rendering; lexicographic order matches chronological.
    pub timestamp: String,
    pub version: String,
    pub line_count: usize,
    pub project: String,
    pub path: PathBuf,
}

pub fn is_agent_file_stem(stem: &str) -> bool {
    stem.starts_with(AGENT_FILE_PREFIX)
}

pub fn file_stem_string(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|name| name.to_str())
        .map(|name| name.to_string())
}

/// Per-project `sessions-index.json`. Read permissively (absent fields default),
/// written back in full so a rewrite keeps the complete entry shape.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SessionsIndex {
    #[serde(default)]
    pub version: i64,

    #[serde(default)]
    pub entries: Vec<SessionIndexEntry>,

    #[serde(rename = "originalPath", default)]
    pub original_path: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SessionIndexEntry {
    #[serde(rename = "sessionId", default)]
    pub session_id: String,

    #[serde(rename = "fullPath", default)]
    pub full_path: String,

    #[serde(rename = "fileMtime", default)]
    pub file_mtime: i64,

    #[serde(rename = "firstPrompt", default)]
    pub first_prompt: String,

    #[serde(default)]
    pub summary: String,

    #[serde(rename = "messageCount", default)]
    pub message_count: i64,

    #[serde(default)]
    pub created: String,

    #[serde(default)]
    pub modified: String,

    #[serde(rename = "gitBranch", default)]
    pub git_branch: String,

    #[serde(rename = "projectPath", default)]
    pub project_path: String,

    #[serde(rename = "isSidechain", default)]
    pub is_sidechain: bool,
}
