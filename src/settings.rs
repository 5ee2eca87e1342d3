use std::env;
use std::path::{Path, PathBuf};

use crate::error::{MobError, MobResult};

/// Overrides the authors file location.
pub const COAUTHORS_PATH_VAR: &str = "GITMOB_COAUTHORS_PATH";
/// Overrides the commit message template location.
pub const MESSAGE_PATH_VAR: &str = "GITMOB_MESSAGE_PATH";
/// Tracing filter directive, e.g. `git_mob=debug`.
pub const LOG_VAR: &str = "GITMOB_LOG";

const AUTHORS_FILE_NAME: &str = ".git-coauthors";

/// Process-wide settings taken from the environment.
///
/// Building settings never fails. The authors file location is derived on
/// demand by [`authors_path`](Self::authors_path), so commands that never
/// touch the registry (`mob` without initials, `mob --print`, `solo`) work
/// without a home directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Value of `GITMOB_COAUTHORS_PATH`, if set.
    pub authors_override: Option<PathBuf>,
    pub message_override: Option<PathBuf>,
    pub home: Option<PathBuf>,
    pub log_filter: Option<String>,
}

impl Settings {
    /// Reads settings from the real process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads settings through `lookup`, treating empty values as unset.
    ///
    /// # Parameters
    ///
    /// * `lookup` — Returns the value of an environment variable, or `None`.
    ///
    /// # Examples
    ///
    /// ```
    /// use git_mob::settings::Settings;
    ///
    /// let s = Settings::from_lookup(|k| (k == "HOME").then(|| "/home/jane".to_string()));
    /// assert_eq!(s.authors_path().unwrap().to_str(), Some("/home/jane/.git-coauthors"));
    /// ```
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            authors_override: var(COAUTHORS_PATH_VAR).map(PathBuf::from),
            message_override: var(MESSAGE_PATH_VAR).map(PathBuf::from),
            home: var("HOME").or_else(|| var("USERPROFILE")).map(PathBuf::from),
            log_filter: var(LOG_VAR).or_else(|| var("RUST_LOG")),
        }
    }

    /// Location of the authors file.
    ///
    /// # Returns
    ///
    /// * `Ok(PathBuf)` from `GITMOB_COAUTHORS_PATH`, else `.git-coauthors`
    ///   in the home directory.
    /// * `Err(MobError::MissingHome)` if neither is available.
    pub fn authors_path(&self) -> MobResult<PathBuf> {
        if let Some(path) = &self.authors_override {
            return Ok(path.clone());
        }
        self.home
            .as_ref()
            .map(|h| h.join(AUTHORS_FILE_NAME))
            .ok_or(MobError::MissingHome {
                var: COAUTHORS_PATH_VAR,
            })
    }

    /// Expands a leading `~/` the way git does for `commit.template`.
    pub fn expand_home(&self, raw: &str) -> PathBuf {
        match (raw.strip_prefix("~/"), &self.home) {
            (Some(rest), Some(home)) => home.join(rest),
            _ => PathBuf::from(raw),
        }
    }
}

/// Template location used when neither the environment nor git names one.
pub fn default_message_path(git_dir: &Path) -> PathBuf {
    git_dir.join(".gitmessage")
}
