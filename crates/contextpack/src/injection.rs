//! Section formatters. Every block the assembler embeds is wrapped in
//! `=== NAME ===` / `=== END_NAME ===` delimiters so prompts stay
//! machine-inspectable in logs and tests.

use ap_domain::conversation::ConversationTurn;
use ap_domain::project::{MESSAGE_MARKER, STATE_MARKER, STATE_SECTIONS};
use ap_domain::retrieval::Source;

/// The current project state as JSON.
pub fn format_project_state(state_json: &str) -> String {
    format!(
        "\
=== CURRENT_PROJECT_STATE ===
{state_json}
=== END_CURRENT_PROJECT_STATE ===
"
    )
}

/// The reply contract: a message block followed by the full state block.
pub fn format_reply_contract(template: &str) -> String {
    let sections = bullet_list(STATE_SECTIONS.iter().copied());
    format!(
        "\
=== OUTPUT_FORMAT ===
Reply in exactly this format and nothing else:

{MESSAGE_MARKER}
<your reply to the user>

{STATE_MARKER}
<the complete updated project state as one JSON object>

The JSON object must contain every one of these sections:
{sections}
Use this template for its shape:
{template}
=== END_OUTPUT_FORMAT ===
"
    )
}

/// The JSON-only contract used when extracting a state from documents.
pub fn format_state_only_contract(template: &str) -> String {
    format!(
        "\
=== OUTPUT_FORMAT ===
Reply with a single JSON object and no other text, using this template:
{template}
=== END_OUTPUT_FORMAT ===
"
    )
}

/// Headings a proposal document must contain, in order.
pub fn format_document_sections(sections: &[String]) -> String {
    let list = bullet_list(sections.iter().map(String::as_str));
    format!(
        "\
=== REQUIRED_SECTIONS ===
Write the document in Markdown with these top-level sections, in order:
{list}=== END_REQUIRED_SECTIONS ===
"
    )
}

/// Grounding guidance plus its numbered sources.
pub fn format_grounding(instructions: &str, context: &str, sources: &[Source]) -> String {
    let mut out = format!(
        "\
=== KNOWLEDGE_BASE_GUIDANCE ===
{instructions}

{context}
=== END_KNOWLEDGE_BASE_GUIDANCE ===
"
    );
    if !sources.is_empty() {
        out.push_str("\n=== SOURCES ===\n");
        out.push_str(&format_source_list(sources));
        out.push_str("=== END_SOURCES ===\n");
    }
    out
}

/// `[n] Title - Section (url)` lines, numbered from 1 in slice order.
pub fn format_source_list(sources: &[Source]) -> String {
    let mut out = String::new();
    for (i, source) in sources.iter().enumerate() {
        out.push_str(&format_source_line(i + 1, source));
        out.push('\n');
    }
    out
}

pub fn format_source_line(number: usize, source: &Source) -> String {
    let title = if source.title.trim().is_empty() {
        source.url.as_str()
    } else {
        source.title.as_str()
    };
    let mut line = format!("[{number}] {title}");
    if !source.section.trim().is_empty() {
        line.push_str(" - ");
        line.push_str(&source.section);
    }
    if !source.url.is_empty() {
        line.push_str(&format!(" ({})", source.url));
    }
    line
}

/// Prior turns, oldest first, one `Role: content` line each.
pub fn format_transcript(turns: &[ConversationTurn]) -> String {
    let mut out = String::from("=== CONVERSATION ===\n");
    for turn in turns {
        out.push_str(turn.role.label());
        out.push_str(": ");
        out.push_str(turn.content.trim());
        out.push('\n');
    }
    out.push_str("=== END_CONVERSATION ===\n");
    out
}

/// One customer document.
pub fn format_document(label: &str, content: &str, truncated: bool) -> String {
    format!(
        "\
=== DOCUMENT {label} ===
TRUNCATED: {truncated}
--- BEGIN ---
{content}
--- END ---
"
    )
}

fn bullet_list<'a>(items: impl Iterator<Item = &'a str>) -> String {
    let mut out = String::new();
    for item in items {
        out.push_str("- ");
        out.push_str(item);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(url: &str, title: &str, section: &str) -> Source {
        Source {
            url: url.into(),
            title: title.into(),
            section: section.into(),
            ..Default::default()
        }
    }

    #[test]
    fn source_list_is_one_based() {
        let list = format_source_list(&[
            source("https://a", "Zones", "Reliability"),
            source("https://b", "Keys", ""),
        ]);
        let lines: Vec<&str> = list.lines().collect();
        assert_eq!(lines[0], "[1] Zones - Reliability (https://a)");
        assert_eq!(lines[1], "[2] Keys (https://b)");
    }

    #[test]
    fn untitled_source_falls_back_to_url() {
        assert_eq!(format_source_line(3, &source("https://c", "", "")), "[3] https://c (https://c)");
    }

    #[test]
    fn reply_contract_names_markers_and_sections() {
        let contract = format_reply_contract("{}");
        assert!(contract.contains("MESSAGE:"));
        assert!(contract.contains("PROJECT_STATE_JSON:"));
        for section in STATE_SECTIONS {
            assert!(contract.contains(&format!("- {section}\n")));
        }
    }

    #[test]
    fn grounding_without_sources_has_no_source_block() {
        let block = format_grounding("cite", "use zones", &[]);
        assert!(block.contains("use zones"));
        assert!(!block.contains("=== SOURCES ==="));
    }

    #[test]
    fn transcript_prefixes_roles() {
        let turns = vec![
            ConversationTurn::user("hi"),
            ConversationTurn::assistant("hello", Vec::new()),
        ];
        let text = format_transcript(&turns);
        assert!(text.contains("User: hi\nAssistant: hello\n"));
    }
}
