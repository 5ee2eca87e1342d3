//! The mob controller: who is committing right now.
//!
//! ```text
//! set_mob(initials)
//!   |  resolve via AuthorsStore        (fails before any mutation)
//!   v
//! ensure commit.template               (only if unset)
//!   v
//! remove-section git-mob  ->  add git-mob.co-author * N
//!   v                          (failure here = InconsistentMob)
//! rewrite template trailers
//!   v
//! MobState
//! ```

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::authors::{self, Author, AuthorsStore};
use crate::error::{MobError, MobResult};
use crate::git::{
    CO_AUTHOR_KEY, ConfigStore, MOB_SECTION, TEMPLATE_KEY, USER_EMAIL_KEY, USER_NAME_KEY,
};
use crate::message;
use crate::settings::{Settings, default_message_path};

/// Snapshot of the current identity and active co-authors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MobState {
    /// The git user as `Name <email>`, if either part is configured.
    pub author: Option<String>,
    /// Active co-authors as `Name <email>`, in the order they were added.
    pub co_authors: Vec<String>,
}

/// Picks the commit template path: explicit override, then the configured
/// `commit.template`, then `.gitmessage` inside `git_dir`.
///
/// # Parameters
///
/// * `settings` — Supplies `GITMOB_MESSAGE_PATH` and the home directory used
///   to expand a `~/` prefix.
/// * `config` — Queried for `commit.template`.
/// * `git_dir` — Absolute git directory of the current repository.
///
/// # Returns
///
/// * `Ok(PathBuf)` with the template location. The file need not exist.
/// * `Err(MobError::ExternalTool)` if git config cannot be read.
pub fn resolve_message_path<C: ConfigStore>(
    settings: &Settings,
    config: &C,
    git_dir: &Path,
) -> MobResult<PathBuf> {
    if let Some(path) = &settings.message_override {
        return Ok(path.clone());
    }
    match config.get(TEMPLATE_KEY)? {
        Some(raw) if !raw.is_empty() => Ok(settings.expand_home(&raw)),
        _ => Ok(default_message_path(git_dir)),
    }
}

/// Every registered co-author with its initials, sorted by initials.
///
/// # Errors
///
/// Fails with [`MobError::NotFound`] if the authors file does not exist,
/// or [`MobError::Parse`] if it is malformed.
pub fn registered(store: &AuthorsStore) -> MobResult<Vec<(String, Author)>> {
    Ok(store.read()?.coauthors.into_iter().collect())
}

/// Drives the active co-author set and the commit template together.
///
/// # Examples
///
/// ```ignore
/// // Ignored because it requires a Git repository and an authors file.
/// use git_mob::authors::AuthorsStore;
/// use git_mob::git::GitConfig;
/// use git_mob::mob::MobController;
///
/// let store = AuthorsStore::new("/home/me/.git-coauthors");
/// let mut mob = MobController::new(GitConfig, ".git/.gitmessage");
/// let state = mob.set_mob(&store, &["jd", "ab"])?;
/// assert_eq!(state.co_authors.len(), 2);
/// ```
pub struct MobController<C> {
    config: C,
    message_path: PathBuf,
}

impl<C: ConfigStore> MobController<C> {
    /// Creates a controller.
    ///
    /// # Parameters
    ///
    /// * `config` — Where the active co-authors and `commit.template` live,
    ///   normally [`GitConfig`](crate::git::GitConfig).
    /// * `message_path` — The commit template whose trailers are kept in
    ///   sync, usually from [`resolve_message_path`].
    pub fn new(config: C, message_path: impl Into<PathBuf>) -> Self {
        Self {
            config,
            message_path: message_path.into(),
        }
    }

    /// The underlying config store.
    pub fn config(&self) -> &C {
        &self.config
    }

    /// The commit template this controller rewrites.
    pub fn message_path(&self) -> &Path {
        &self.message_path
    }

    /// Makes `initials` the active mob.
    ///
    /// # Parameters
    ///
    /// * `store` — The authors file `initials` are resolved against.
    /// * `initials` — Co-author keys in the order their trailers should
    ///   appear. Repeats collapse to the first occurrence.
    ///
    /// # Returns
    ///
    /// The resulting [`MobState`], read back from the config store.
    ///
    /// # Errors
    ///
    /// Unknown initials or an unreadable authors file fail before git config
    /// or the template are touched. If the active set was cleared but could
    /// not be repopulated, returns [`MobError::InconsistentMob`].
    pub fn set_mob<S: AsRef<str>>(
        &mut self,
        store: &AuthorsStore,
        initials: &[S],
    ) -> MobResult<MobState> {
        let registry = store.read()?;
        let co_authors = authors::co_authors(initials, &registry)?;
        info!(count = co_authors.len(), "setting mob");
        self.apply(&co_authors)
    }

    /// Ends the mob: no active co-authors, no trailers.
    ///
    /// Does not read the authors file, so it works without one.
    pub fn clear(&mut self) -> MobResult<MobState> {
        info!("clearing mob");
        self.apply(&[])
    }

    /// Reads the current identity and active co-authors.
    ///
    /// `author` is `None` only when both `user.name` and `user.email` are
    /// unset.
    pub fn show(&self) -> MobResult<MobState> {
        let name = self.config.get(USER_NAME_KEY)?.unwrap_or_default();
        let email = self.config.get(USER_EMAIL_KEY)?.unwrap_or_default();
        let author = if name.is_empty() && email.is_empty() {
            None
        } else {
            Some(format!("{name} <{email}>"))
        };

        Ok(MobState {
            author,
            co_authors: self.config.get_all(CO_AUTHOR_KEY)?,
        })
    }

    /// Active co-authors rendered as trailer lines, for `mob --print`.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// for line in mob.trailers()? {
    ///     println!("{line}"); // Co-authored-by: Jane Doe <jane@x.com>
    /// }
    /// ```
    pub fn trailers(&self) -> MobResult<Vec<String>> {
        Ok(self
            .config
            .get_all(CO_AUTHOR_KEY)?
            .into_iter()
            .map(|c| format!("{}: {c}", message::TRAILER_KEY))
            .collect())
    }

    fn apply(&mut self, co_authors: &[Author]) -> MobResult<MobState> {
        self.ensure_commit_template()?;
        self.replace_active(co_authors)?;
        message::write_co_authors(&self.message_path, co_authors)?;
        self.show()
    }

    fn ensure_commit_template(&mut self) -> MobResult<()> {
        if self.config.get(TEMPLATE_KEY)?.is_some() {
            return Ok(());
        }
        let value = self.message_path.to_string_lossy();
        debug!(%value, "setting commit.template");
        self.config.set(TEMPLATE_KEY, &value)
    }

    /// Clear-then-repopulate. A failure after the clear leaves a partial set
    /// behind and is reported as [`MobError::InconsistentMob`].
    fn replace_active(&mut self, co_authors: &[Author]) -> MobResult<()> {
        self.config.remove_section(MOB_SECTION)?;
        for author in co_authors {
            self.config
                .add(CO_AUTHOR_KEY, &author.to_string())
                .map_err(|e| MobError::InconsistentMob {
                    source: Box::new(e),
                })?;
        }
        Ok(())
    }
}
