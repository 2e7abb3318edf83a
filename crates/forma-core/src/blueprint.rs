//! Blueprint document model.
//!
//! A blueprint is the structured Markdown artifact synthesized once the
//! session reaches Builder mode. The gateway-produced body is kept verbatim;
//! this module only scans it for the fixed section layout and renders the
//! appended consistency section.

use serde::{Deserialize, Serialize};

/// The eleven fixed section titles, in required order.
pub const SECTION_TITLES: [&str; 11] = [
    "Business summary",
    "Customer and problem",
    "Value proposition and differentiation",
    "Product scope (MVP, included vs excluded)",
    "Go-to-market hypothesis",
    "Tech and build direction",
    "Operations and risks",
    "Revenue and pricing logic",
    "90-day execution plan",
    "Open items (WIP, mandatory)",
    "Reality checks & risks",
];

/// Header line of the appended consistency section.
pub const CONSISTENCY_SECTION_HEADER: &str = "## Consistency check (auto)";

/// Exact sentence used when the contradiction scan found nothing.
pub const NO_CONTRADICTIONS_SENTENCE: &str = "No internal contradictions detected.";

/// Sentence used when the contradiction scan could not run.
pub const CHECK_UNAVAILABLE_SENTENCE: &str =
    "Consistency check could not be completed for this revision.";

/// Outcome of the contradiction scan over one blueprint revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConsistencyReport {
    /// Concrete issues, ordered as received from the checker.
    Issues(Vec<String>),
    /// The scan ran and found nothing.
    Clean,
    /// The scan could not run; treated as the empty-issues case.
    Unavailable,
}

impl ConsistencyReport {
    /// Collapses an issue list into the matching report variant.
    pub fn from_issues(issues: Vec<String>) -> Self {
        if issues.is_empty() {
            Self::Clean
        } else {
            Self::Issues(issues)
        }
    }
}

/// The synthesized artifact: verbatim Markdown body plus an optional
/// consistency report appended after the fact.
///
/// Regenerated wholesale whenever Builder mode re-triggers synthesis; the
/// consistency report is attached to the new document, never merged into a
/// previous one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlueprintDocument {
    markdown: String,
    consistency: Option<ConsistencyReport>,
}

impl BlueprintDocument {
    /// Wraps gateway-produced Markdown. The body is accepted as-is even when
    /// sections are missing (fail soft); the consistency pass surfaces gaps.
    pub fn new(markdown: impl Into<String>) -> Self {
        Self {
            markdown: markdown.into(),
            consistency: None,
        }
    }

    /// The blueprint body, exactly as the gateway produced it.
    pub fn body(&self) -> &str {
        &self.markdown
    }

    pub fn consistency(&self) -> Option<&ConsistencyReport> {
        self.consistency.as_ref()
    }

    /// Attaches (or replaces) the consistency report for this revision.
    pub fn attach_consistency(&mut self, report: ConsistencyReport) {
        self.consistency = Some(report);
    }

    /// True when every fixed section heading appears exactly once, in the
    /// required order.
    pub fn is_complete(&self) -> bool {
        let occurrences = self.section_occurrences();
        occurrences.iter().all(|&(count, _)| count == 1)
            && occurrences.windows(2).all(|pair| pair[0].1 < pair[1].1)
    }

    /// Fixed section titles that never appear in the body.
    pub fn missing_sections(&self) -> Vec<&'static str> {
        self.section_occurrences()
            .iter()
            .zip(SECTION_TITLES)
            .filter(|((count, _), _)| *count == 0)
            .map(|(_, title)| title)
            .collect()
    }

    /// Full exported Markdown: the verbatim body plus the consistency
    /// section when a report is attached.
    pub fn to_markdown(&self) -> String {
        let mut out = self.markdown.clone();
        let Some(report) = &self.consistency else {
            return out;
        };

        out.push_str("\n\n");
        out.push_str(CONSISTENCY_SECTION_HEADER);
        out.push('\n');
        match report {
            ConsistencyReport::Issues(issues) => {
                for (i, issue) in issues.iter().enumerate() {
                    out.push_str(&format!("{}. {}\n", i + 1, issue));
                }
            }
            ConsistencyReport::Clean => {
                out.push_str(NO_CONTRADICTIONS_SENTENCE);
                out.push('\n');
            }
            ConsistencyReport::Unavailable => {
                out.push_str(CHECK_UNAVAILABLE_SENTENCE);
                out.push('\n');
            }
        }
        out
    }

    /// Per fixed title: occurrence count and first line index of occurrence.
    fn section_occurrences(&self) -> [(usize, usize); 11] {
        let mut occurrences = [(0usize, usize::MAX); 11];
        for (line_idx, line) in self.markdown.lines().enumerate() {
            let Some(heading) = heading_text(line) else {
                continue;
            };
            for (title_idx, title) in SECTION_TITLES.iter().enumerate() {
                if heading_matches(heading, title) {
                    let (count, first) = &mut occurrences[title_idx];
                    *count += 1;
                    if *first == usize::MAX {
                        *first = line_idx;
                    }
                }
            }
        }
        occurrences
    }
}

/// Extracts the text of a Markdown heading line, or None for body lines.
fn heading_text(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    if !trimmed.starts_with('#') {
        return None;
    }
    Some(trimmed.trim_start_matches('#').trim())
}

/// Compares a heading against a fixed title, tolerating `1.` / `1)` list
/// numbering and a trailing colon.
fn heading_matches(heading: &str, title: &str) -> bool {
    let stripped = strip_numbering(heading);
    let stripped = stripped.strip_suffix(':').unwrap_or(stripped).trim_end();
    stripped.eq_ignore_ascii_case(title)
}

/// Removes a leading `N.` or `N)` numbering marker. Titles that merely start
/// with digits (`90-day execution plan`) are left alone.
fn strip_numbering(text: &str) -> &str {
    let digits = text.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return text;
    }
    let rest = &text[digits..];
    match rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
        Some(stripped) => stripped.trim_start(),
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compliant_body() -> String {
        SECTION_TITLES
            .iter()
            .enumerate()
            .map(|(i, title)| {
                format!(
                    "## {}. {}\n\nAssumed: placeholder content for {}.\n",
                    i + 1,
                    title,
                    title
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_compliant_document_is_complete() {
        let doc = BlueprintDocument::new(compliant_body());
        assert!(doc.is_complete());
        assert!(doc.missing_sections().is_empty());
    }

    #[test]
    fn test_eleven_headers_once_each_in_order() {
        // Each fixed title appears exactly once in the rendered body, in the
        // required order.
        let doc = BlueprintDocument::new(compliant_body());
        let body = doc.body();

        let mut last_pos = 0;
        for title in SECTION_TITLES {
            let matches: Vec<_> = body.match_indices(title).collect();
            assert_eq!(matches.len(), 1, "title {title} should appear once");
            assert!(matches[0].0 >= last_pos, "title {title} out of order");
            last_pos = matches[0].0;
        }
    }

    #[test]
    fn test_missing_section_detected() {
        let body = compliant_body().replace("## 10. Open items (WIP, mandatory)", "## Extras");
        let doc = BlueprintDocument::new(body);
        assert!(!doc.is_complete());
        assert_eq!(doc.missing_sections(), vec!["Open items (WIP, mandatory)"]);
    }

    #[test]
    fn test_duplicate_section_detected() {
        let mut body = compliant_body();
        body.push_str("\n## Business summary\n\nDuplicate.\n");
        let doc = BlueprintDocument::new(body);
        assert!(!doc.is_complete());
        assert!(doc.missing_sections().is_empty());
    }

    #[test]
    fn test_out_of_order_sections_detected() {
        let body = compliant_body()
            .replace("## 1. Business summary", "## 1. Customer and problem")
            .replace("## 2. Customer and problem", "## 2. Business summary");
        let doc = BlueprintDocument::new(body);
        assert!(!doc.is_complete());
    }

    #[test]
    fn test_heading_variants_match() {
        assert!(heading_matches("9. 90-day execution plan", "90-day execution plan"));
        assert!(heading_matches("90-day execution plan:", "90-day execution plan"));
        assert!(heading_matches("business summary", "Business summary"));
        assert!(!heading_matches("Business summary and more", "Business summary"));
    }

    #[test]
    fn test_markdown_without_report_is_verbatim() {
        let body = "## 1. Business summary\n\nRaw body text.\n";
        let doc = BlueprintDocument::new(body);
        assert_eq!(doc.to_markdown(), body);
    }

    #[test]
    fn test_issue_list_is_numbered_in_received_order() {
        let mut doc = BlueprintDocument::new("body");
        doc.attach_consistency(ConsistencyReport::from_issues(vec![
            "Pricing claim contradicts stated target market".to_string(),
            "90-day plan assumes a team that is not in scope".to_string(),
        ]));

        let rendered = doc.to_markdown();
        assert!(rendered.contains(CONSISTENCY_SECTION_HEADER));
        assert!(rendered.contains("1. Pricing claim contradicts stated target market\n"));
        assert!(rendered.contains("2. 90-day plan assumes a team that is not in scope\n"));
    }

    #[test]
    fn test_clean_report_renders_exact_sentence() {
        let mut doc = BlueprintDocument::new("body");
        doc.attach_consistency(ConsistencyReport::from_issues(Vec::new()));

        let rendered = doc.to_markdown();
        assert_eq!(
            rendered,
            format!("body\n\n{CONSISTENCY_SECTION_HEADER}\n{NO_CONTRADICTIONS_SENTENCE}\n")
        );
    }

    #[test]
    fn test_unavailable_report_renders_notice() {
        let mut doc = BlueprintDocument::new("body");
        doc.attach_consistency(ConsistencyReport::Unavailable);
        assert!(doc.to_markdown().contains(CHECK_UNAVAILABLE_SENTENCE));
    }
}
