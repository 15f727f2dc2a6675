use ap_domain::text::clip;

/// A labelled block of text being accumulated for total-cap processing.
#[derive(Debug, Clone)]
pub struct Section {
    pub label: String,
    pub content: String,
    pub truncated_per_section: bool,
    pub truncated_total_cap: bool,
    pub included: bool,
}

impl Section {
    /// Normalize line endings and apply the per-section cap.
    pub fn capped(label: impl Into<String>, raw: &str, max_chars: usize) -> Self {
        let normalized = raw.replace("\r\n", "\n");
        let (content, truncated) = truncate_section(&normalized, max_chars);
        Self {
            label: label.into(),
            content,
            truncated_per_section: truncated,
            truncated_total_cap: false,
            included: true,
        }
    }
}

/// Appended to the section cut by [`apply_total_cap`].
pub const TOTAL_CAP_MARKER: &str = "\n\n[TRUNCATED_TOTAL_CAP]\n";

/// Per-section truncation.
///
/// If `content` exceeds `max_chars`, truncate to the first `max_chars` bytes
/// (at a valid UTF-8 boundary) and append `\n\n[TRUNCATED]\n`.
pub fn truncate_section(content: &str, max_chars: usize) -> (String, bool) {
    if content.len() <= max_chars {
        return (content.to_string(), false);
    }
    let mut result = clip(content, max_chars).to_string();
    result.push_str("\n\n[TRUNCATED]\n");
    (result, true)
}

/// Apply total cap across accumulated sections in order.
///
/// Sections that fit are kept whole; the first one that overflows is cut
/// and marked `[TRUNCATED_TOTAL_CAP]`; everything after it is excluded.
pub fn apply_total_cap(sections: &mut [Section], total_max_chars: usize) {
    let mut accumulated: usize = 0;

    for section in sections.iter_mut() {
        if !section.included {
            continue;
        }

        let section_len = section.content.len();

        if accumulated + section_len <= total_max_chars {
            accumulated += section_len;
        } else if accumulated < total_max_chars {
            let remaining = total_max_chars - accumulated;
            section.content = format!("{}{TOTAL_CAP_MARKER}", clip(&section.content, remaining));
            section.truncated_total_cap = true;
            accumulated = total_max_chars;
        } else {
            section.content.clear();
            section.included = false;
        }
    }
}
