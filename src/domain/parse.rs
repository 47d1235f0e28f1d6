use serde::Deserialize;

/// One line of a session record file. Content is free-form user text; lines
/// whose `message.content` is structured (an array of blocks) fail to decode
/// and are skipped by callers, which matches how the producer distinguishes
/// plain prompts from tool-result payloads.
#[derive(Debug, Default, Deserialize)]
pub struct SessionRecord {
    #[serde(rename = "type", default)]
    pub record_type: String,

    #[serde(default)]
    pub version: String,

    #[serde(default)]
    pub slug: String,

    #[serde(rename = "isMeta", default)]
    pub is_meta: bool,

    #[serde(default)]
    pub summary: String,

    #[serde(default)]
    pub message: MessageBody,
}

#[derive(Debug, Default, Deserialize)]
pub struct MessageBody {
    #[serde(default)]
    pub content: String,
}

/// Auxiliary line shape scanned independently for subagent discovery.
#[derive(Debug, Default, Deserialize)]
pub struct AgentIdRecord {
    #[serde(default)]
    pub agent_id: String,
}

pub fn parse_record(line: &str) -> Option<SessionRecord> {
    serde_json::from_str(line).ok()
}

pub fn parse_agent_id(line: &str) -> Option<String> {
    let record: AgentIdRecord = serde_json::from_str(line).ok()?;
    if record.agent_id.is_empty() {
        None
    } else {
        Some(record.agent_id)
    }
}

/// Machine-oriented tag pairs embedded in user message content. The span
/// between a pair (tags included) is never part of a human-readable title.
const SYSTEM_TAG_PAIRS: [(&str, &str); 6] = [
    ("<local-command-caveat>", "</local-command-caveat>"),
    ("<command-name>", "</command-name>"),
    ("<command-message>", "</command-message>"),
    ("<command-args>", "</command-args>"),
    ("<local-command-stdout>", "</local-command-stdout>"),
    ("<system-reminder>", "</system-reminder>"),
];

/// Strip every system tag pair from `content`, collapse whitespace, and
/// reject results that are empty or still begin with markup.
pub fn clean_system_tags(content: &str) -> String {
    let mut cleaned = content.to_string();
    for (open, close) in SYSTEM_TAG_PAIRS {
        cleaned = strip_tag_pair(&cleaned, open, close);
    }

    let cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    if cleaned.is_empty() || cleaned.starts_with('<') {
        return String::new();
    }
    cleaned
}

/// Single forward pass removing every `open`..`close` span, tags included.
/// An opening tag with no matching close discards through end of input.
/// The scan position only moves forward, so this always terminates.
fn strip_tag_pair(text: &str, open: &str, close: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    loop {
        let Some(start) = rest.find(open) else {
            out.push_str(rest);
            break;
        };
        out.push_str(&rest[..start]);

        let after_open = &rest[start + open.len()..];
        match after_open.find(close) {
            Some(end) => rest = &after_open[end + close.len()..],
            None => break,
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_balanced_tag_pair_and_span() {
        let input = "Fix the bug <system-reminder>do not mention this</system-reminder> in parser";
        assert_eq!(clean_system_tags(input), "Fix the bug in parser");
    }

    #[test]
    fn strips_repeated_pairs_of_same_tag() {
        let input = "<command-name>a</command-name>run<command-name>b</command-name> it";
        assert_eq!(clean_system_tags(input), "run it");
    }

    #[test]
    fn unterminated_open_tag_discards_to_end() {
        let input = "keep this <local-command-stdout>lost forever";
        assert_eq!(clean_system_tags(input), "keep this");
    }

    #[test]
    fn collapses_newlines_and_runs_of_spaces() {
        let input = "  hello\n\n  world\r\n again ";
        assert_eq!(clean_system_tags(input), "hello world again");
    }

    #[test]
    fn residual_markup_is_not_a_title() {
        assert_eq!(clean_system_tags("<ide-context>stuff</ide-context>"), "");
        assert_eq!(
            clean_system_tags("<system-reminder>only noise</system-reminder>"),
            ""
        );
    }

    #[test]
    fn cleaning_is_idempotent() {
        let input = "title <command-args>--flag</command-args>\ntext";
        let once = clean_system_tags(input);
        assert_eq!(clean_system_tags(&once), once);
    }

    #[test]
    fn parses_user_record_fields() {
        let line = r#"{"type":"user","version":"2.1.30","isMeta":false,"message":{"content":"Hello"}}"#;
        let record = parse_record(line).expect("record");
        assert_eq!(record.record_type, "user");
        assert_eq!(record.version, "2.1.30");
        assert_eq!(record.message.content, "Hello");
    }

    #[test]
    fn array_content_fails_to_decode() {
        let line = r#"{"type":"user","message":{"content":[{"type":"tool_result","content":"x"}]}}"#;
        assert!(parse_record(line).is_none());
    }

    #[test]
    fn agent_id_lines_parse_independently() {
        assert_eq!(
            parse_agent_id(r#"{"agent_id":"a1","other":true}"#),
            Some("a1".to_string())
        );
        assert_eq!(parse_agent_id(r#"{"type":"user"}"#), None);
        assert_eq!(parse_agent_id("not json"), None);
    }
}
