//! Post generation.
//!
//! Renders the post template once per complete portfolio element and writes
//! the result into the output directory:
//!
//! ```text
//! posts/
//! ├── sunset.md            # "Sunset"
//! └── old-town-square.md   # "Old Town Square"
//! ```
//!
//! The file name is the lower-cased title with spaces turned into dashes.
//! Existing files are overwritten. Elements missing either link are skipped
//! and reported; that is not an error. A render or write failure aborts the
//! whole run, leaving files written so far in place.

use crate::portfolio::PortfolioElement;
use crate::template::{PostFields, PostTemplate, TemplateError};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("Error rendering template for [{post}]: {source}")]
    Render {
        post: String,
        #[source]
        source: TemplateError,
    },
    #[error("Error writing rendered template to file [{}]: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A post written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenPost {
    pub title: String,
    pub file_name: String,
    pub path: PathBuf,
}

/// An element left out because one of its variants has no link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedElement {
    pub title: String,
    pub small_size_link: Option<String>,
    pub large_size_link: Option<String>,
}

#[derive(Debug, Default)]
pub struct GenerateReport {
    pub written: Vec<WrittenPost>,
    pub skipped: Vec<SkippedElement>,
}

/// Output file name for a title: `"Old Town"` → `"old-town.md"`.
pub fn post_file_name(title: &str) -> String {
    format!("{}.md", title.to_lowercase().replace(' ', "-"))
}

/// Render and write one post per complete element.
pub fn generate_posts(
    template: &PostTemplate,
    elements: &[PortfolioElement],
    output_dir: &Path,
) -> Result<GenerateReport, GenerateError> {
    fs::create_dir_all(output_dir).map_err(|source| GenerateError::Write {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let mut report = GenerateReport::default();

    for element in elements {
        let file_name = post_file_name(&element.title);

        let Some((small, large)) = element.links() else {
            report.skipped.push(SkippedElement {
                title: element.title.clone(),
                small_size_link: element.small_size_link.clone(),
                large_size_link: element.large_size_link.clone(),
            });
            continue;
        };

        let description = element.title.to_lowercase();
        let rendered = template
            .render(&PostFields {
                name: &element.title,
                small_size_link: small,
                large_size_link: large,
                description: &description,
            })
            .map_err(|source| GenerateError::Render {
                post: file_name.clone(),
                source,
            })?;

        let path = output_dir.join(&file_name);
        write_post(&path, &rendered).map_err(|source| GenerateError::Write {
            path: path.clone(),
            source,
        })?;

        report.written.push(WrittenPost {
            title: element.title.clone(),
            file_name,
            path,
        });
    }

    Ok(report)
}

/// Write (or overwrite) a post, world-readable and owner-writable.
fn write_post(path: &Path, contents: &str) -> std::io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o644);
    }
    let mut file = options.open(path)?;
    file.write_all(contents.as_bytes())
}
