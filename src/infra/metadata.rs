use crate::domain::{clean_system_tags, parse_agent_id, parse_record};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::OnceLock;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

/// Sentinel title for a session file that could not be opened.
pub const TITLE_READ_ERROR: &str = "[error]";

/// Sentinel title when no qualifying user message or summary exists.
pub const TITLE_MISSING: &str = "[No title]";

/// Sentinel timestamp for an unreadable file.
pub const TIMESTAMP_UNKNOWN: &str = "Unknown";

/// Titles are derived from the head of the file only; summaries and user
/// prompts past this record number are ignored.
const TITLE_SCAN_WINDOW: usize = 100;

const TIMESTAMP_FORMAT: &[FormatItem<'_>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

static LOCAL_OFFSET: OnceLock<UtcOffset> = OnceLock::new();

/// Local UTC offset, resolved once and reused. The lookup is only reliable
/// while the process is single-threaded, so the first call must happen
/// before any worker thread is spawned; every later call, from any thread,
/// sees the same value. UTC when the offset cannot be determined.
pub fn local_utc_offset() -> UtcOffset {
    *LOCAL_OFFSET.get_or_init(|| UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC))
}

/// First non-empty, tag-cleaned user message, falling back to the first
/// summary record, then to [`TITLE_MISSING`]. Never fails the caller.
pub fn extract_title(path: &Path) -> String {
    let Ok(file) = File::open(path) else {
        return TITLE_READ_ERROR.to_string();
    };

    let mut first_summary = String::new();

    // Record 1 is reserved for the producer's file-history snapshot.
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line_no = index + 1;
        let Ok(line) = line else {
            break;
        };
        if line_no == 1 {
            continue;
        }

        if let Some(record) = parse_record(&line) {
            if record.record_type == "summary"
                && !record.summary.is_empty()
                && first_summary.is_empty()
            {
                first_summary = record.summary;
            }

            if record.record_type == "user" && !record.is_meta {
                let content = clean_system_tags(&record.message.content);
                if !content.is_empty() {
                    return content;
                }
            }
        }

        if line_no > TITLE_SCAN_WINDOW {
            break;
        }
    }

    if !first_summary.is_empty() {
        return first_summary;
    }
    TITLE_MISSING.to_string()
}

/// Declared schema version from record 2, or empty on any error or a file
/// shorter than two records.
pub fn extract_version(path: &Path) -> String {
    let Ok(file) = File::open(path) else {
        return String::new();
    };

    let Some(Ok(line)) = BufReader::new(file).lines().nth(1) else {
        return String::new();
    };

    parse_record(&line)
        .map(|record| record.version)
        .unwrap_or_default()
}

/// Raw line count, no JSON validation. 0 on error.
pub fn count_records(path: &Path) -> usize {
    let Ok(file) = File::open(path) else {
        return 0;
    };

    BufReader::new(file)
        .lines()
        .take_while(|line| line.is_ok())
        .count()
}

/// First non-empty slug anywhere in the file. Unlike titles, slugs can be
/// written late in a session, so the scan is unbounded.
pub fn extract_slug(path: &Path) -> Option<String> {
    let file = File::open(path).ok()?;

    for line in BufReader::new(file).lines() {
        let Ok(line) = line else {
            break;
        };
        if let Some(record) = parse_record(&line) {
            if !record.slug.is_empty() {
                return Some(record.slug);
            }
        }
    }

    None
}

/// Distinct subagent ids referenced by the session, in first-seen order.
pub fn extract_agent_ids(path: &Path) -> Vec<String> {
    let Ok(file) = File::open(path) else {
        return Vec::new();
    };

    let mut ids: Vec<String> = Vec::new();
    for line in BufReader::new(file).lines() {
        let Ok(line) = line else {
            break;
        };
        if let Some(id) = parse_agent_id(&line) {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
    }

    ids
}

/// File mtime at second granularity, rendered so lexicographic order is
/// chronological. [`TIMESTAMP_UNKNOWN`] on stat error.
pub fn format_mtime(path: &Path) -> String {
    let modified = match std::fs::metadata(path).and_then(|meta| meta.modified()) {
        Ok(modified) => modified,
        Err(_) => return TIMESTAMP_UNKNOWN.to_string(),
    };

    let offset = local_utc_offset();
    OffsetDateTime::from(modified)
        .to_offset(offset)
        .format(&TIMESTAMP_FORMAT)
        .unwrap_or_else(|_| TIMESTAMP_UNKNOWN.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write_session(dir: &Path, name: &str, lines: &[&str]) -> std::path::PathBuf {
        let path = dir.join(name);
        fs::write(&path, lines.join("\n")).expect("write session");
        path
    }

    #[test]
    fn title_and_version_from_first_user_record() {
        let dir = tempdir().expect("tempdir");
        let path = write_session(
            dir.path(),
            "abc123.jsonl",
            &[
                r#"{"type":"file-history-snapshot","snapshot":{}}"#,
                r#"{"type":"user","version":"2.1.30","message":{"content":"Hello"}}"#,
            ],
        );

        assert_eq!(extract_title(&path), "Hello");
        assert_eq!(extract_version(&path), "2.1.30");
        assert_eq!(count_records(&path), 2);
    }

    #[test]
    fn record_one_is_never_a_title_even_if_user_typed() {
        let dir = tempdir().expect("tempdir");
        let path = write_session(
            dir.path(),
            "s.jsonl",
            &[
                r#"{"type":"user","message":{"content":"snapshot line"}}"#,
                r#"{"type":"user","message":{"content":"real prompt"}}"#,
            ],
        );

        assert_eq!(extract_title(&path), "real prompt");
    }

    #[test]
    fn meta_and_tag_only_messages_are_skipped() {
        let dir = tempdir().expect("tempdir");
        let path = write_session(
            dir.path(),
            "s.jsonl",
            &[
                r#"{"type":"file-history-snapshot"}"#,
                r#"{"type":"user","isMeta":true,"message":{"content":"meta chatter"}}"#,
                r#"{"type":"user","message":{"content":"<system-reminder>noise</system-reminder>"}}"#,
                r#"{"type":"user","message":{"content":"  actual   question  "}}"#,
            ],
        );

        assert_eq!(extract_title(&path), "actual question");
    }

    #[test]
    fn summary_is_the_fallback_title() {
        let dir = tempdir().expect("tempdir");
        let path = write_session(
            dir.path(),
            "s.jsonl",
            &[
                r#"{"type":"file-history-snapshot"}"#,
                r#"{"type":"summary","summary":"Refactor the scanner"}"#,
                r#"{"type":"assistant","message":{"content":"sure"}}"#,
            ],
        );

        assert_eq!(extract_title(&path), "Refactor the scanner");
    }

    #[test]
    fn no_qualifying_record_yields_sentinel() {
        let dir = tempdir().expect("tempdir");
        let path = write_session(
            dir.path(),
            "s.jsonl",
            &[
                r#"{"type":"file-history-snapshot"}"#,
                r#"{"type":"assistant","message":{"content":"hi"}}"#,
                "not json at all",
            ],
        );

        assert_eq!(extract_title(&path), TITLE_MISSING);
    }

    #[test]
    fn user_record_past_scan_window_is_ignored() {
        let dir = tempdir().expect("tempdir");
        let mut lines = vec![r#"{"type":"file-history-snapshot"}"#.to_string()];
        for _ in 0..110 {
            lines.push(r#"{"type":"assistant","message":{"content":"x"}}"#.to_string());
        }
        lines.push(r#"{"type":"user","message":{"content":"too late"}}"#.to_string());
        let refs: Vec<&str> = lines.iter().map(|s| s.as_str()).collect();
        let path = write_session(dir.path(), "s.jsonl", &refs);

        assert_eq!(extract_title(&path), TITLE_MISSING);
    }

    #[test]
    fn title_extraction_is_idempotent() {
        let dir = tempdir().expect("tempdir");
        let path = write_session(
            dir.path(),
            "s.jsonl",
            &[
                r#"{"type":"file-history-snapshot"}"#,
                r#"{"type":"user","message":{"content":"stable title"}}"#,
            ],
        );

        let first = extract_title(&path);
        assert_eq!(extract_title(&path), first);
    }

    #[test]
    fn missing_file_uses_error_sentinels() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("gone.jsonl");
        assert_eq!(extract_title(&path), TITLE_READ_ERROR);
        assert_eq!(extract_version(&path), "");
        assert_eq!(count_records(&path), 0);
        assert_eq!(format_mtime(&path), TIMESTAMP_UNKNOWN);
    }

    #[test]
    fn slug_scan_is_unbounded() {
        let dir = tempdir().expect("tempdir");
        let mut lines = vec![r#"{"type":"file-history-snapshot"}"#.to_string()];
        for _ in 0..150 {
            lines.push(r#"{"type":"assistant","message":{"content":"x"}}"#.to_string());
        }
        lines.push(r#"{"type":"user","slug":"late-slug","message":{"content":"y"}}"#.to_string());
        let refs: Vec<&str> = lines.iter().map(|s| s.as_str()).collect();
        let path = write_session(dir.path(), "s.jsonl", &refs);

        assert_eq!(extract_slug(&path), Some("late-slug".to_string()));
    }

    #[test]
    fn agent_ids_are_distinct_in_first_seen_order() {
        let dir = tempdir().expect("tempdir");
        let path = write_session(
            dir.path(),
            "s.jsonl",
            &[
                r#"{"agent_id":"b"}"#,
                r#"{"agent_id":"a"}"#,
                r#"{"agent_id":"b"}"#,
                r#"{"type":"user","message":{"content":"no agent"}}"#,
            ],
        );

        assert_eq!(extract_agent_ids(&path), vec!["b", "a"]);
    }

    #[test]
    fn mtime_rendering_is_identical_across_threads() {
        let dir = tempdir().expect("tempdir");
        let path = write_session(dir.path(), "s.jsonl", &["{}"]);

        let here = format_mtime(&path);
        let moved = path.clone();
        let there = std::thread::spawn(move || format_mtime(&moved))
            .join()
            .expect("join");
        assert_eq!(here, there);
    }

    #[test]
    fn mtime_renders_second_granularity() {
        let dir = tempdir().expect("tempdir");
        let path = write_session(dir.path(), "s.jsonl", &["{}"]);
        let rendered = format_mtime(&path);
        // "YYYY-MM-DD HH:MM:SS"
        assert_eq!(rendered.len(), 19);
        assert_eq!(rendered.as_bytes()[4], b'-');
        assert_eq!(rendered.as_bytes()[10], b' ');
    }
}
