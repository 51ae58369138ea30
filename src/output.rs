//! CLI output formatting for each pipeline step.
//!
//! # Output Format
//!
//! ## Listing
//!
//! ```text
//! Files in /photo.heyitsalex.net (3)
//!     Sunset.jpg
//!     sunset-small.jpg
//!     notes.txt
//! ```
//!
//! ## Links
//!
//! ```text
//! Shared links (2, 1 created)
//!     Sunset.jpg → https://www.dropbox.com/s/abc/Sunset.jpg?dl=0
//!     sunset-small.jpg → https://www.dropbox.com/s/def/sunset-small.jpg?dl=0 (created)
//! ```
//!
//! ## Generate
//!
//! ```text
//! Rendered template for [Sunset] to [posts/sunset.md]
//!
//! Generated 1 post, 1 skipped
//! ```
//!
//! Skipped elements are reported on stderr, one line each:
//!
//! ```text
//! Skipping [Dawn] because of missing links: small: [https://...], large: []
//! ```
//!
//! # Architecture
//!
//! Each step has a `format_*` function (returns `Vec<String>` or `String`) for
//! testability and a `print_*` wrapper that does the writing. Format functions
//! are pure.

use crate::posts::{GenerateReport, SkippedElement};
use crate::types::{RemoteFile, ShareLink};
use std::path::Path;

fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `1 post`, `2 posts`.
fn count(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{n} {noun}")
    } else {
        format!("{n} {noun}s")
    }
}

// ============================================================================
// Listing
// ============================================================================

pub fn format_listing(folder: &str, files: &[RemoteFile]) -> Vec<String> {
    let mut lines = vec![format!("Files in {} ({})", folder, files.len())];
    for file in files {
        lines.push(format!("{}{}", indent(1), file.name));
    }
    lines
}

pub fn print_listing(folder: &str, files: &[RemoteFile]) {
    for line in format_listing(folder, files) {
        println!("{}", line);
    }
}

// ============================================================================
// Links
// ============================================================================

pub fn format_links(links: &[ShareLink]) -> Vec<String> {
    let created = links.iter().filter(|l| l.created).count();
    let mut lines = vec![format!("Shared links ({}, {} created)", links.len(), created)];
    for link in links {
        let marker = if link.created { " (created)" } else { "" };
        lines.push(format!("{}{} → {}{}", indent(1), link.name, link.url, marker));
    }
    lines
}

pub fn print_links(links: &[ShareLink]) {
    for line in format_links(links) {
        println!("{}", line);
    }
}

// ============================================================================
// Generate
// ============================================================================

/// The diagnostic for one element left out of the output.
pub fn format_skip(skip: &SkippedElement) -> String {
    format!(
        "Skipping [{}] because of missing links: small: [{}], large: [{}]",
        skip.title,
        skip.small_size_link.as_deref().unwrap_or_default(),
        skip.large_size_link.as_deref().unwrap_or_default(),
    )
}

/// Written posts followed by a summary line. Skips are formatted separately.
pub fn format_generate_report(report: &GenerateReport) -> Vec<String> {
    let mut lines: Vec<String> = report
        .written
        .iter()
        .map(|post| {
            format!(
                "Rendered template for [{}] to [{}]",
                post.title,
                post.path.display()
            )
        })
        .collect();

    if !lines.is_empty() {
        lines.push(String::new());
    }
    lines.push(format!(
        "Generated {}, {} skipped",
        count(report.written.len(), "post"),
        report.skipped.len()
    ));
    lines
}

/// Prints written posts to stdout and skip diagnostics to stderr.
pub fn print_generate_report(report: &GenerateReport) {
    for skip in &report.skipped {
        eprintln!("{}", format_skip(skip));
    }
    for line in format_generate_report(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Auth
// ============================================================================

pub fn format_token_stored(path: &Path, reused: bool) -> String {
    if reused {
        format!("Using cached token from {}", path.display())
    } else {
        format!("Token stored in {}", path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::posts::WrittenPost;
    use std::path::PathBuf;

    fn file(name: &str) -> RemoteFile {
        RemoteFile {
            name: name.to_string(),
            path_lower: format!("/p/{}", name.to_lowercase()),
        }
    }

    fn link(name: &str, created: bool) -> ShareLink {
        ShareLink {
            name: name.to_string(),
            url: format!("https://www.dropbox.com/s/x/{name}?dl=0"),
            created,
        }
    }

    // =========================================================================
    // Listing and links
    // =========================================================================

    #[test]
    fn listing_shows_folder_count_and_names() {
        let lines = format_listing("/photos", &[file("Sunset.jpg"), file("sunset-small.jpg")]);
        assert_eq!(
            lines,
            vec![
                "Files in /photos (2)",
                "    Sunset.jpg",
                "    sunset-small.jpg",
            ]
        );
    }

    #[test]
    fn empty_listing_is_header_only() {
        assert_eq!(format_listing("/photos", &[]), vec!["Files in /photos (0)"]);
    }

    #[test]
    fn links_mark_created() {
        let lines = format_links(&[link("a.jpg", false), link("b.jpg", true)]);
        assert_eq!(lines[0], "Shared links (2, 1 created)");
        assert_eq!(lines[1], "    a.jpg → https://www.dropbox.com/s/x/a.jpg?dl=0");
        assert_eq!(
            lines[2],
            "    b.jpg → https://www.dropbox.com/s/x/b.jpg?dl=0 (created)"
        );
    }

    // =========================================================================
    // Generate
    // =========================================================================

    #[test]
    fn skip_names_title_and_links() {
        let skip = SkippedElement {
            title: "Dawn".into(),
            small_size_link: Some("https://dl.dropboxusercontent.com/s/1/dawn-small.jpg".into()),
            large_size_link: None,
        };
        assert_eq!(
            format_skip(&skip),
            "Skipping [Dawn] because of missing links: small: \
             [https://dl.dropboxusercontent.com/s/1/dawn-small.jpg], large: []"
        );
    }

    #[test]
    fn report_lists_posts_then_summary() {
        let report = GenerateReport {
            written: vec![WrittenPost {
                title: "Sunset".into(),
                file_name: "sunset.md".into(),
                path: PathBuf::from("posts/sunset.md"),
            }],
            skipped: vec![SkippedElement {
                title: "Dawn".into(),
                small_size_link: None,
                large_size_link: Some("l".into()),
            }],
        };
        assert_eq!(
            format_generate_report(&report),
            vec![
                "Rendered template for [Sunset] to [posts/sunset.md]",
                "",
                "Generated 1 post, 1 skipped",
            ]
        );
    }

    #[test]
    fn empty_report_is_summary_only() {
        assert_eq!(
            format_generate_report(&GenerateReport::default()),
            vec!["Generated 0 posts, 0 skipped"]
        );
    }

    #[test]
    fn token_messages() {
        let path = Path::new("/home/a/.foglioToken");
        assert_eq!(
            format_token_stored(path, false),
            "Token stored in /home/a/.foglioToken"
        );
        assert_eq!(
            format_token_stored(path, true),
            "Using cached token from /home/a/.foglioToken"
        );
    }
}
