//! Maintains the `Co-authored-by` trailers of the commit message template.
//!
//! A template is handled as three sections:
//!
//! ```text
//! <body>                      anything the user wrote, subject placeholder included
//!
//! Co-authored-by: A <a@x.io>  trailer block, regenerated on every write
//! Co-authored-by: B <b@x.io>
//!
//! # footer                    trailing run of `#` comment lines
//! ```
//!
//! Trailer lines are recognised anywhere in the file and always dropped on
//! parse, so a hand-edited template converges to one block on the next write.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use tracing::debug;

use crate::authors::{Author, write_atomic};
use crate::error::{MobError, MobResult};

/// Git's trailer key for additional authors.
pub const TRAILER_KEY: &str = "Co-authored-by";

/// Renders the trailer line for one co-author.
pub fn trailer(author: &Author) -> String {
    format!("{TRAILER_KEY}: {author}")
}

/// Returns `true` if `line` is a co-author trailer (key matched case-insensitively).
pub fn is_trailer(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed
        .get(..TRAILER_KEY.len() + 1)
        .is_some_and(|head| head.eq_ignore_ascii_case(&format!("{TRAILER_KEY}:")))
}

/// A commit message template split into its sections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Template {
    body: Vec<String>,
    trailers: Vec<String>,
    footer: Vec<String>,
}

impl Template {
    /// Splits `text` into sections, discarding every existing trailer line.
    ///
    /// # Parameters
    ///
    /// * `text` — Current template contents. `\r\n` line endings are accepted
    ///   and rendered back as `\n`.
    ///
    /// # Examples
    ///
    /// ```
    /// use git_mob::message::Template;
    ///
    /// let t = Template::parse("Subject\n\nCo-authored-by: Old <old@x.com>\n# footer\n");
    /// assert!(t.trailers().is_empty());
    /// assert_eq!(t.render(), "Subject\n\n# footer\n");
    /// ```
    pub fn parse(text: &str) -> Self {
        let mut lines: Vec<String> = text
            .lines()
            .filter(|l| !is_trailer(l))
            .map(str::to_string)
            .collect();

        let footer_start = footer_start(&lines);
        let mut footer = lines.split_off(footer_start);
        trim_trailing_blank(&mut footer);

        let mut body = lines;
        trim_trailing_blank(&mut body);

        Self {
            body,
            trailers: Vec::new(),
            footer,
        }
    }

    /// Replaces the trailer block with one line per co-author, in order.
    pub fn set_co_authors(&mut self, co_authors: &[Author]) {
        self.trailers = co_authors.iter().map(trailer).collect();
    }

    /// The trailer block as rendered lines, `Co-authored-by: Name <email>`.
    ///
    /// # Returns
    ///
    /// * An empty slice right after [`parse`](Self::parse), since parsing
    ///   drops every existing trailer.
    /// * One line per co-author, in order, after
    ///   [`set_co_authors`](Self::set_co_authors).
    ///
    /// # Examples
    ///
    /// ```
    /// use git_mob::authors::Author;
    /// use git_mob::message::Template;
    ///
    /// let mut t = Template::parse("Subject\n");
    /// t.set_co_authors(&[Author::new("Jane Doe", "jane@x.com")]);
    /// assert_eq!(t.trailers(), ["Co-authored-by: Jane Doe <jane@x.com>"]);
    /// ```
    pub fn trailers(&self) -> &[String] {
        &self.trailers
    }

    /// Produces the file contents. Parsing the result and setting the same
    /// co-authors renders byte-identical output.
    pub fn render(&self) -> String {
        let mut out: Vec<&str> = self.body.iter().map(String::as_str).collect();

        if !self.trailers.is_empty() {
            if out.is_empty() {
                // Empty subject line for the editor to fill.
                out.push("");
            }
            out.push("");
            out.extend(self.trailers.iter().map(String::as_str));
        }

        if !self.footer.is_empty() {
            if !out.is_empty() {
                out.push("");
            }
            out.extend(self.footer.iter().map(String::as_str));
        }

        if out.is_empty() {
            return String::new();
        }
        let mut text = out.join("\n");
        text.push('\n');
        text
    }
}

/// Index of the first line of the trailing comment block, or `lines.len()`.
fn footer_start(lines: &[String]) -> usize {
    let mut start = lines.len();
    for (i, line) in lines.iter().enumerate().rev() {
        let trimmed = line.trim_start();
        if trimmed.starts_with('#') {
            start = i;
        } else if !trimmed.is_empty() {
            break;
        }
    }
    start
}

fn trim_trailing_blank(lines: &mut Vec<String>) {
    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }
}

/// Rewrites the template at `path` so its trailer block lists exactly
/// `co_authors`.
///
/// # Parameters
///
/// * `path` — The commit message template. An absent file is treated as
///   empty and created.
/// * `co_authors` — Authors to list, in order. An empty slice removes the
///   trailer block entirely.
///
/// # Returns
///
/// * `Ok(())` once the new contents have been renamed into place.
/// * `Err(MobError::Io)` if the file cannot be read or written.
///
/// # Examples
///
/// ```ignore
/// // Ignored because it writes to the file system.
/// use git_mob::authors::Author;
/// use git_mob::message::write_co_authors;
///
/// write_co_authors(Path::new(".git/.gitmessage"), &[Author::new("Jane Doe", "jane@x.com")])?;
/// ```
pub fn write_co_authors(path: &Path, co_authors: &[Author]) -> MobResult<()> {
    let existing = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
        Err(e) => return Err(MobError::io("read", path, e)),
    };

    let mut template = Template::parse(&existing);
    template.set_co_authors(co_authors);
    let rendered = template.render();

    debug!(
        path = %path.display(),
        trailers = co_authors.len(),
        changed = rendered != existing,
        "writing commit template"
    );
    write_atomic(path, &rendered)
}
