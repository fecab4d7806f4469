//! Stream-URL extraction from fetched HTML pages.
//!
//! Embed pages bury their actual stream URLs in inline scripts, so
//! extraction is plain text pattern scanning rather than DOM parsing.

use slipstream_core::types::{CandidateStream, TransportKind, dedup_by_url};

/// Scans a page body for direct stream URLs.
///
/// HLS manifests are preferred over progressive files, so they come first
/// in the returned list. Duplicate URLs within the page are removed.
pub fn extract_streams(html: &str) -> Vec<CandidateStream> {
    let mut candidates = Vec::new();

    if let Ok(re) = regex::Regex::new(r#"https?://[^\s"'<>\\]+\.m3u8[^\s"'<>\\]*"#) {
        for found in re.find_iter(html) {
            candidates.push(
                CandidateStream::with_transport(found.as_str(), TransportKind::Hls)
                    .with_quality("auto")
                    .labeled("HLS Stream"),
            );
        }
    }

    if let Ok(re) = regex::Regex::new(r#"https?://[^\s"'<>\\]+\.mp4[^\s"'<>\\]*"#) {
        for found in re.find_iter(html) {
            candidates.push(
                CandidateStream::with_transport(found.as_str(), TransportKind::Progressive)
                    .with_quality("auto")
                    .labeled("MP4 Stream"),
            );
        }
    }

    dedup_by_url(candidates)
}

/// Whether the page carries an iframe, i.e. it is itself an embeddable
/// player surface.
pub fn has_iframe(html: &str) -> bool {
    if let Ok(re) = regex::Regex::new(r#"(?i)<iframe[^>]+src=["'][^"']+["']"#) {
        re.is_match(html)
    } else {
        false
    }
}

/// Lowercase hyphenated slug for title-addressed scrape sites.
pub fn title_slug(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_was_hyphen = true;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            slug.push('-');
            last_was_hyphen = true;
        }
    }
    slug.trim_end_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_hls_before_progressive() {
        let html = r#"
            <script>
                var file = "https://cdn.example.com/v/movie.mp4?token=1";
                var src = "https://cdn.example.com/v/master.m3u8";
            </script>
        "#;

        let streams = extract_streams(html);
        assert_eq!(streams.len(), 2);
        assert_eq!(streams[0].transport, TransportKind::Hls);
        assert_eq!(streams[0].url, "https://cdn.example.com/v/master.m3u8");
        assert_eq!(streams[1].transport, TransportKind::Progressive);
    }

    #[test]
    fn duplicate_urls_within_a_page_are_removed() {
        let html = r#"
            "https://cdn.example.com/a.m3u8"
            'https://cdn.example.com/a.m3u8'
        "#;
        assert_eq!(extract_streams(html).len(), 1);
    }

    #[test]
    fn page_without_streams_yields_nothing() {
        assert!(extract_streams("<html><body>nothing here</body></html>").is_empty());
    }

    #[test]
    fn detects_iframes_case_insensitively() {
        assert!(has_iframe(r#"<IFRAME src="https://embed.example/e/1">"#));
        assert!(!has_iframe("<div>no player</div>"));
    }

    #[test]
    fn slug_collapses_punctuation() {
        assert_eq!(title_slug("The Matrix"), "the-matrix");
        assert_eq!(title_slug("Spider-Man: No Way Home"), "spider-man-no-way-home");
        assert_eq!(title_slug("  WALL·E  "), "wall-e");
    }
}
