use regex::Regex;
use std::sync::LazyLock;

/// Returned when a report carries no recognisable paper link
pub const DEFAULT_PAPER_LINK: &str = "https://arxiv.org";

static PDF_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://arxiv\.org/pdf/[\w.]+")
        .unwrap_or_else(|_| Regex::new(r"$^").expect("fallback regex compiles"))
});

static ABS_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://arxiv\.org/abs/[\w.]+")
        .unwrap_or_else(|_| Regex::new(r"$^").expect("fallback regex compiles"))
});

/// Pick the paper link out of a free-text report.
///
/// The first PDF link wins; otherwise the first abstract-page link; otherwise
/// [`DEFAULT_PAPER_LINK`]. Sentence punctuation glued to the end of the URL is
/// not part of the link.
#[must_use]
pub fn extract_paper_link(text: &str) -> String {
    PDF_LINK_RE
        .find(text)
        .or_else(|| ABS_LINK_RE.find(text))
        .map(|m| m.as_str().trim_end_matches('.').to_string())
        .unwrap_or_else(|| DEFAULT_PAPER_LINK.to_string())
}
