//! The co-author registry (`~/.git-coauthors`).
//!
//! ```json
//! {
//!   "author": { "name": "Jane Doe", "email": "jane@example.com" },
//!   "coauthors": {
//!     "ab": { "name": "Amy Brown", "email": "amy@example.com" }
//!   }
//! }
//! ```

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{MobError, MobResult};

/// A person who can be credited on a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    pub email: String,
}

impl Author {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

/// Returns `true` if `candidate` can be used as the name in a
/// `Name <email>` identity.
///
/// The name must be non-blank and free of control characters (line breaks
/// included) and angle brackets.
///
/// # Examples
///
/// ```
/// use git_mob::authors::validate_name;
///
/// assert!(validate_name("Jane Doe"));
/// assert!(!validate_name("Jane\nDoe"));
/// assert!(!validate_name(""));
/// ```
pub fn validate_name(candidate: &str) -> bool {
    !candidate.trim().is_empty()
        && !candidate
            .chars()
            .any(|c| c.is_control() || c == '<' || c == '>')
}

/// Formats as `Name <email>`, the form git uses for identities.
impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

/// Full contents of the authors file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthorsRegistry {
    /// The local git user. Informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
    /// Co-authors keyed by initials.
    #[serde(default)]
    pub coauthors: BTreeMap<String, Author>,
    /// Keys this crate does not know about, kept so rewrites do not drop them.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AuthorsRegistry {
    /// Adds or replaces the entry for `initials`, returning the previous one.
    pub fn upsert(&mut self, initials: impl Into<String>, author: Author) -> Option<Author> {
        self.coauthors.insert(initials.into(), author)
    }
}

/// Reads and rewrites the authors file as a whole.
#[derive(Debug, Clone)]
pub struct AuthorsStore {
    path: PathBuf,
}

impl AuthorsStore {
    /// Creates a store for the file at `path`. Nothing is read until
    /// [`read`](Self::read) is called.
    ///
    /// # Examples
    ///
    /// ```
    /// use git_mob::authors::AuthorsStore;
    ///
    /// let store = AuthorsStore::new("/home/jane/.git-coauthors");
    /// assert!(store.path().ends_with(".git-coauthors"));
    /// ```
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the authors file, used in messages such as
    /// "Jane Doe has been added to the .git-coauthors file".
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the registry.
    ///
    /// # Errors
    ///
    /// * [`MobError::NotFound`] if the file does not exist.
    /// * [`MobError::Parse`] if it is not a valid registry.
    /// * [`MobError::Io`] for any other read failure.
    pub fn read(&self) -> MobResult<AuthorsRegistry> {
        debug!(path = %self.path.display(), "reading authors file");
        let body = match fs::read_to_string(&self.path) {
            Ok(body) => body,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(MobError::NotFound {
                    path: self.path.clone(),
                });
            }
            Err(e) => return Err(MobError::io("read", &self.path, e)),
        };

        let registry: AuthorsRegistry =
            serde_json::from_str(&body).map_err(|source| MobError::Parse {
                path: self.path.clone(),
                source,
            })?;
        debug!(coauthors = registry.coauthors.len(), "authors file loaded");
        Ok(registry)
    }

    /// Like [`read`](Self::read), but an absent file yields an empty registry.
    pub fn read_or_default(&self) -> MobResult<AuthorsRegistry> {
        match self.read() {
            Err(MobError::NotFound { .. }) => {
                debug!(path = %self.path.display(), "authors file absent, starting empty");
                Ok(AuthorsRegistry::default())
            }
            other => other,
        }
    }

    /// Replaces the file with `registry` (temp file + rename).
    ///
    /// The JSON is pretty-printed with two-space indentation and a trailing
    /// newline. Missing parent directories are created.
    ///
    /// # Errors
    ///
    /// * [`MobError::Serialize`] if the registry cannot be encoded.
    /// * [`MobError::Io`] if the directory, temp file or rename fails.
    pub fn overwrite(&self, registry: &AuthorsRegistry) -> MobResult<()> {
        debug!(path = %self.path.display(), coauthors = registry.coauthors.len(), "writing authors file");
        let mut body =
            serde_json::to_string_pretty(registry).map_err(|source| MobError::Serialize {
                path: self.path.clone(),
                source,
            })?;
        body.push('\n');
        write_atomic(&self.path, &body)
    }
}

/// Writes `contents` next to `path` and renames it into place.
pub(crate) fn write_atomic(path: &Path, contents: &str) -> MobResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| MobError::io("create directory", parent, e))?;
    }

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    fs::write(&tmp_path, contents).map_err(|e| MobError::io("write", &tmp_path, e))?;
    fs::rename(&tmp_path, path).map_err(|e| MobError::io("replace", path, e))
}

/// Resolves `initials` against `registry`, keeping input order.
///
/// Repeated initials resolve once, at their first position. Any initials
/// missing from the registry fail the whole lookup, listing all of them.
///
/// # Examples
///
/// ```
/// use git_mob::authors::{Author, AuthorsRegistry, co_authors};
///
/// let mut registry = AuthorsRegistry::default();
/// registry.upsert("jd", Author::new("Jane Doe", "jane@x.com"));
///
/// assert_eq!(co_authors(&["jd", "jd"], &registry).unwrap().len(), 1);
/// assert!(co_authors(&["zz"], &registry).is_err());
/// ```
pub fn co_authors<S: AsRef<str>>(
    initials: &[S],
    registry: &AuthorsRegistry,
) -> MobResult<Vec<Author>> {
    let mut seen = HashSet::new();
    let mut found = Vec::with_capacity(initials.len());
    let mut missing = Vec::new();

    for key in initials.iter().map(AsRef::as_ref) {
        if !seen.insert(key) {
            continue;
        }
        match registry.coauthors.get(key) {
            Some(author) => found.push(author.clone()),
            None => missing.push(key.to_string()),
        }
    }

    if missing.is_empty() {
        Ok(found)
    } else {
        Err(MobError::UnknownInitials(missing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> AuthorsRegistry {
        let mut r = AuthorsRegistry {
            author: Some(Author::new("Me Myself", "me@example.com")),
            ..AuthorsRegistry::default()
        };
        r.upsert("ab", Author::new("Amy Brown", "amy@example.com"));
        r.upsert("cd", Author::new("Carl Day", "carl@example.com"));
        r
    }

    #[test]
    fn author_displays_as_git_identity() {
        let a = Author::new("Jane Doe", "jane@x.com");
        assert_eq!(a.to_string(), "Jane Doe <jane@x.com>");
    }

    #[test]
    fn validate_name_rejects_identity_breakers() {
        assert!(validate_name("Jane Doe"));
        assert!(validate_name("Zoë O'Brien-Smith"));
        assert!(!validate_name(""));
        assert!(!validate_name("   "));
        assert!(!validate_name("Jane\nDoe"));
        assert!(!validate_name("Jane\tDoe"));
        assert!(!validate_name("Jane <Doe>"));
        assert!(!validate_name("Jane\u{7}"));
    }

    #[test]
    fn co_authors_preserves_input_order() {
        let r = registry();
        let names: Vec<String> = co_authors(&["cd", "ab"], &r)
            .unwrap()
            .into_iter()
            .map(|a| a.name)
            .collect();
        assert_eq!(names, vec!["Carl Day", "Amy Brown"]);
    }

    #[test]
    fn co_authors_collapses_duplicates() {
        let r = registry();
        let found = co_authors(&["ab", "cd", "ab"], &r).unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].name, "Amy Brown");
    }

    #[test]
    fn co_authors_fails_on_unknown_initials() {
        let r = registry();
        let err = co_authors(&["ab", "zz", "yy"], &r).unwrap_err();
        match err {
            MobError::UnknownInitials(keys) => assert_eq!(keys, vec!["zz", "yy"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn read_missing_file_is_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = AuthorsStore::new(dir.path().join("nope.json"));
        assert!(matches!(store.read(), Err(MobError::NotFound { .. })));
        assert_eq!(store.read_or_default().unwrap(), AuthorsRegistry::default());
    }

    #[test]
    fn read_malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(".git-coauthors");
        fs::write(&path, "{ \"coauthors\": ").expect("write");
        let store = AuthorsStore::new(&path);
        assert!(matches!(store.read(), Err(MobError::Parse { .. })));
        assert!(matches!(store.read_or_default(), Err(MobError::Parse { .. })));
    }

    #[test]
    fn overwrite_then_read_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(".git-coauthors");
        fs::write(
            &path,
            r#"{
  "author": { "name": "Me Myself", "email": "me@example.com" },
  "coauthors": {
    "jd": { "name": "Jane Doe", "email": "jane@x.com" }
  },
  "team": "platform"
}"#,
        )
        .expect("write");

        let store = AuthorsStore::new(&path);
        let first = store.read().unwrap();
        store.overwrite(&first).unwrap();
        let second = store.read().unwrap();

        assert_eq!(first, second);
        assert_eq!(second.extra.get("team"), Some(&Value::from("platform")));
        assert!(!dir.path().join(".git-coauthors.tmp").exists());
    }

    #[test]
    fn overwrite_uses_two_space_json() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = AuthorsStore::new(dir.path().join("nested").join(".git-coauthors"));
        let mut r = AuthorsRegistry::default();
        r.upsert("jd", Author::new("Jane Doe", "jane@x.com"));
        store.overwrite(&r).unwrap();

        let body = fs::read_to_string(store.path()).expect("read back");
        assert!(body.starts_with("{\n  \"coauthors\": {\n    \"jd\": {"));
        assert!(body.ends_with("}\n"));
    }

    #[test]
    fn registry_without_coauthors_key_is_empty() {
        let r: AuthorsRegistry = serde_json::from_str("{}").unwrap();
        assert!(r.coauthors.is_empty());
        assert!(r.author.is_none());
    }
}
