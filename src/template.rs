//! Post templates.
//!
//! Templates are plain text with substitution fields wrapped in `[[` `]]`:
//!
//! ```text
//! ---
//! title: [[name]]
//! description: [[ description ]]
//! ---
//! [![photo]([[smallSizeLink]])]([[largeSizeLink]])
//! ```
//!
//! Square brackets keep the fields out of the way of front-matter and
//! site-generator syntax that already uses `{{ }}`. Fields are compiled into a
//! [Tera](https://keats.github.io/tera/) template: every `[[field]]` becomes a
//! Tera expression and every literal `{` is emitted as a string expression, so
//! literal text never reaches the Tera parser as syntax.
//!
//! A field must be an identifier. Fields foglio does not provide render as an
//! empty string. Output is not HTML-escaped.
//!
//! The mustache spellings of the same delimiters are accepted too:
//!
//! | Tag | Meaning |
//! |-----|---------|
//! | `[[field]]` | substitution |
//! | `[[& field]]`, `[[{field}]]` | substitution (unescaped form, same output) |
//! | `[[! anything ]]` | comment, renders nothing |
//!
//! Sections, partials and delimiter changes are not supported; they are
//! rejected as invalid field names.

use serde::Serialize;
use std::path::{Path, PathBuf};
use tera::{Context, Tera};
use thiserror::Error;

const OPEN: &str = "[[";
const CLOSE: &str = "]]";
const TEMPLATE_NAME: &str = "post.md";

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Error reading template file [{path}]: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Unclosed '[[' at byte {0}")]
    Unclosed(usize),
    #[error("Invalid field name [{0}]")]
    InvalidField(String),
    #[error("Template error: {0}")]
    Engine(#[from] tera::Error),
}

/// Values available to a post template.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostFields<'a> {
    pub name: &'a str,
    pub small_size_link: &'a str,
    pub large_size_link: &'a str,
    pub description: &'a str,
}

/// A compiled post template.
pub struct PostTemplate {
    tera: Tera,
}

impl PostTemplate {
    /// Compile template text.
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let compiled = compile(source)?;
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        tera.add_raw_template(TEMPLATE_NAME, &compiled)?;
        Ok(Self { tera })
    }

    /// Read and compile a template file.
    pub fn from_file(path: &Path) -> Result<Self, TemplateError> {
        let source = std::fs::read_to_string(path).map_err(|source| TemplateError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&source)
    }

    pub fn render(&self, fields: &PostFields<'_>) -> Result<String, TemplateError> {
        let context = Context::from_serialize(fields)?;
        Ok(self.tera.render(TEMPLATE_NAME, &context)?)
    }
}

/// Translate `[[field]]` syntax into Tera source.
fn compile(source: &str) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;
    let mut offset = 0;

    while let Some(start) = rest.find(OPEN) {
        push_literal(&mut out, &rest[..start]);

        let inner = &rest[start + OPEN.len()..];
        let end = inner
            .find(CLOSE)
            .ok_or(TemplateError::Unclosed(offset + start))?;
        if let Some(field) = tag_field(inner[..end].trim())? {
            out.push_str(&format!("{{{{ {field} | default(value=\"\") }}}}"));
        }

        let consumed = start + OPEN.len() + end + CLOSE.len();
        offset += consumed;
        rest = &rest[consumed..];
    }
    push_literal(&mut out, rest);
    Ok(out)
}

/// The field a tag substitutes, or `None` for a comment.
fn tag_field(tag: &str) -> Result<Option<&str>, TemplateError> {
    if tag.starts_with('!') {
        return Ok(None);
    }
    let field = if let Some(rest) = tag.strip_prefix('&') {
        rest.trim()
    } else if let Some(rest) = tag.strip_prefix('{').and_then(|t| t.strip_suffix('}')) {
        rest.trim()
    } else {
        tag
    };
    if !is_identifier(field) {
        return Err(TemplateError::InvalidField(tag.to_string()));
    }
    Ok(Some(field))
}

fn push_literal(out: &mut String, text: &str) {
    for c in text.chars() {
        if c == '{' {
            out.push_str(r#"{{ "{" }}"#);
        } else {
            out.push(c);
        }
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
