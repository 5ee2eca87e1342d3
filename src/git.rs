use std::path::PathBuf;
use std::process::{Command, Stdio};

use tracing::debug;

use crate::error::{MobError, MobResult};

/// Config section holding the active co-authors.
pub const MOB_SECTION: &str = "git-mob";
/// Multi-valued key listing the active co-authors as `Name <email>`.
pub const CO_AUTHOR_KEY: &str = "git-mob.co-author";
pub const TEMPLATE_KEY: &str = "commit.template";
pub const USER_NAME_KEY: &str = "user.name";
pub const USER_EMAIL_KEY: &str = "user.email";

/// Key-value store behind `git config`.
///
/// The mob controller only talks to git through this trait, which keeps
/// the external config store explicit and lets tests swap in a map.
pub trait ConfigStore {
    /// Single value of `key`, or `None` if unset.
    fn get(&self, key: &str) -> MobResult<Option<String>>;

    /// Every value of a multi-valued `key`, in insertion order.
    fn get_all(&self, key: &str) -> MobResult<Vec<String>>;

    /// Sets `key` to `value`, replacing a single existing value.
    fn set(&mut self, key: &str, value: &str) -> MobResult<()>;

    /// Appends `value` to a multi-valued `key`.
    fn add(&mut self, key: &str, value: &str) -> MobResult<()>;

    /// Removes `section` and every key in it. Absent sections are not an error.
    fn remove_section(&mut self, section: &str) -> MobResult<()>;
}

/// Builds a `git` command whose messages are not translated.
///
/// Only exit codes are interpreted, but untranslated stderr keeps error
/// messages and logs consistent across machines.
///
/// # Examples
///
/// ```ignore
/// let mut cmd = git_command();
/// cmd.arg("config").arg("--get").arg("user.name");
/// ```
fn git_command() -> Command {
    let mut cmd = Command::new("git");
    cmd.env("LC_ALL", "C").env("LANGUAGE", "");
    cmd
}

/// Describes a command for error messages, e.g. `git config --get user.name`.
fn describe(cmd: &Command) -> String {
    let mut parts = vec![cmd.get_program().to_string_lossy().into_owned()];
    parts.extend(cmd.get_args().map(|a| a.to_string_lossy().into_owned()));
    parts.join(" ")
}

/// Runs a command and returns its trimmed standard output on success.
///
/// # Parameters
///
/// * `cmd` — A fully configured [`std::process::Command`]; its stdout and
///   stderr are replaced with pipes.
///
/// # Returns
///
/// * `Ok(String)` containing trimmed `stdout` if the command succeeded.
/// * `Err(MobError::ExternalTool)` carrying the exit code and trimmed
///   `stderr` on a non-zero exit, or no code if the process failed to spawn.
///
/// # Examples
///
/// ```ignore
/// let mut cmd = git_command();
/// cmd.arg("rev-parse").arg("--absolute-git-dir");
/// match run_output(cmd) {
///     Ok(dir) => println!("git dir: {}", dir),
///     Err(err) => eprintln!("git error: {}", err),
/// }
/// ```
fn run_output(mut cmd: Command) -> MobResult<String> {
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());
    let command = describe(&cmd);
    debug!(%command, "running");

    let out = cmd.output().map_err(|e| MobError::ExternalTool {
        command: command.clone(),
        code: None,
        message: e.to_string(),
    })?;

    if out.status.success() {
        Ok(String::from_utf8_lossy(&out.stdout).trim().to_string())
    } else {
        let message = String::from_utf8_lossy(&out.stderr).trim().to_string();
        debug!(%command, code = ?out.status.code(), %message, "command failed");
        Err(MobError::ExternalTool {
            command,
            code: out.status.code(),
            message: if message.is_empty() {
                String::from("non-zero exit")
            } else {
                message
            },
        })
    }
}

/// `git config` exits with 1 when the requested key is not set.
fn unset_as_none(res: MobResult<String>) -> MobResult<Option<String>> {
    match res {
        Ok(s) => Ok(Some(s)),
        Err(e) if e.tool_exit_code() == Some(1) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Ensures `git` can be found on `PATH`.
///
/// # Returns
///
/// * `Ok(PathBuf)` with the resolved executable.
/// * `Err(MobError::ExternalTool)` if `git` is not installed or not on `PATH`.
pub fn ensure_available() -> MobResult<PathBuf> {
    which::which("git").map_err(|e| MobError::ExternalTool {
        command: String::from("git"),
        code: None,
        message: format!("not found in PATH ({e})"),
    })
}

/// Runs `git rev-parse <flag>` and returns its trimmed output.
///
/// # Parameters
///
/// * `flag` — The argument to pass to `git rev-parse`, e.g. `--absolute-git-dir`.
///
/// # Returns
///
/// * `Ok(String)` with the trimmed standard output.
/// * `Err(MobError::ExternalTool)` outside a repository or if git fails.
///
/// # Examples
///
/// ```ignore
/// // Ignored because it depends on being inside a Git repository.
/// use git_mob::git::rev_parse;
///
/// match rev_parse("--absolute-git-dir") {
///     Ok(dir) => println!("git dir: {}", dir),
///     Err(err) => eprintln!("git error: {}", err),
/// }
/// ```
pub fn rev_parse(flag: &str) -> MobResult<String> {
    let mut cmd = git_command();
    cmd.arg("rev-parse").arg(flag);
    run_output(cmd)
}

/// [`ConfigStore`] backed by the `git config` command line, using git's
/// normal scope rules (reads merge all scopes, writes go to the repository).
///
/// # Examples
///
/// ```ignore
/// // Ignored because it requires a Git repository.
/// use git_mob::git::{ConfigStore, GitConfig, CO_AUTHOR_KEY};
///
/// let config = GitConfig;
/// for co_author in config.get_all(CO_AUTHOR_KEY)? {
///     println!("{}", co_author);
/// }
/// ```
#[derive(Debug, Default)]
pub struct GitConfig;

impl GitConfig {
    fn command() -> Command {
        let mut cmd = git_command();
        cmd.arg("config");
        cmd
    }

    /// Returns `true` if any key of `section` is set.
    ///
    /// Runs `git config --get-regexp ^<section>\.`, which exits with 1 when
    /// nothing matches.
    fn has_section(&self, section: &str) -> MobResult<bool> {
        let mut cmd = Self::command();
        cmd.arg("--get-regexp").arg(section_pattern(section));
        Ok(unset_as_none(run_output(cmd))?.is_some())
    }
}

/// Regex matching every key of `section`, with dots in the name escaped.
fn section_pattern(section: &str) -> String {
    format!("^{}\\.", section.replace('.', "\\."))
}

impl ConfigStore for GitConfig {
    /// Runs `git config --get <key>`; exit status 1 maps to `Ok(None)`.
    fn get(&self, key: &str) -> MobResult<Option<String>> {
        let mut cmd = Self::command();
        cmd.arg("--get").arg(key);
        unset_as_none(run_output(cmd))
    }

    /// Runs `git config --get-all <key>`, one value per output line.
    fn get_all(&self, key: &str) -> MobResult<Vec<String>> {
        let mut cmd = Self::command();
        cmd.arg("--get-all").arg(key);
        let values = unset_as_none(run_output(cmd))?;
        Ok(values
            .map(|s| s.lines().map(str::to_string).collect())
            .unwrap_or_default())
    }

    /// Runs `git config <key> <value>` in the repository's local config.
    fn set(&mut self, key: &str, value: &str) -> MobResult<()> {
        let mut cmd = Self::command();
        cmd.arg(key).arg(value);
        run_output(cmd).map(drop)
    }

    /// Runs `git config --add <key> <value>`.
    fn add(&mut self, key: &str, value: &str) -> MobResult<()> {
        let mut cmd = Self::command();
        cmd.arg("--add").arg(key).arg(value);
        run_output(cmd).map(drop)
    }

    /// Runs `git config --remove-section <section>` if the section has keys.
    fn remove_section(&mut self, section: &str) -> MobResult<()> {
        if !self.has_section(section)? {
            debug!(section, "section already absent");
            return Ok(());
        }
        let mut cmd = Self::command();
        cmd.arg("--remove-section").arg(section);
        run_output(cmd).map(drop)
    }
}
