use std::path::PathBuf;

use clap::{ArgAction, Parser};
use tracing::{debug, info};

use crate::authors::{Author, AuthorsStore, validate_name};
use crate::email::validate_email;
use crate::error::{MobError, MobResult};
use crate::git::{self, ConfigStore, GitConfig, USER_EMAIL_KEY, USER_NAME_KEY};
use crate::logging;
use crate::mob::{self, MobController};
use crate::prompt::{self, DialoguerStringPrompter, StringPrompter};
use crate::report;
use crate::settings::Settings;

/// Invalid answers tolerated when prompting for a name or email.
const PROMPT_ATTEMPTS: usize = 3;

/// `mob [initials...]`
#[derive(Parser, Debug)]
#[command(
    name = "mob",
    version,
    disable_version_flag = true,
    about = "Credit co-authors on your next commits",
    after_help = "With no initials, prints the current author and active co-authors.\n\
                  Initials are looked up in ~/.git-coauthors (or $GITMOB_COAUTHORS_PATH)."
)]
pub struct MobArgs {
    #[arg(short = 'v', long, action = ArgAction::Version, help = "Print version")]
    version: Option<bool>,

    #[arg(short, long, conflicts_with_all = ["print", "initials"], help = "List every registered co-author")]
    pub list: bool,

    #[arg(short, long, conflicts_with = "initials", help = "Print Co-authored-by trailers for the active co-authors")]
    pub print: bool,

    #[arg(value_name = "INITIALS", help = "Initials of the co-authors to mob with")]
    pub initials: Vec<String>,
}

/// `solo`
#[derive(Parser, Debug)]
#[command(
    name = "solo",
    version,
    disable_version_flag = true,
    about = "Stop mobbing: clear the active co-authors and their trailers"
)]
pub struct SoloArgs {
    #[arg(short = 'v', long, action = ArgAction::Version, help = "Print version")]
    version: Option<bool>,
}

/// `add-author <initials> [name] [email]`
#[derive(Parser, Debug)]
#[command(
    name = "add-author",
    version,
    disable_version_flag = true,
    about = "Add or update a co-author in the authors file",
    after_help = "Missing name or email are prompted for when running in a terminal."
)]
pub struct AddAuthorArgs {
    #[arg(short = 'v', long, action = ArgAction::Version, help = "Print version")]
    version: Option<bool>,

    #[arg(help = "Short key used with `mob`, e.g. jd")]
    pub initials: String,

    #[arg(help = "Full name, e.g. \"Jane Doe\"")]
    pub name: Option<String>,

    #[arg(help = "Email address")]
    pub email: Option<String>,
}

/// Parses arguments, printing help, version or usage errors the clap way.
///
/// Returns `Err(exit_code)` when the process should stop right away.
fn parse<T: Parser>() -> Result<T, i32> {
    T::try_parse().map_err(|e| {
        let code = e.exit_code();
        let _ = e.print();
        code
    })
}

/// Loads settings and starts logging; shared by every entry point.
fn bootstrap() -> Settings {
    let settings = Settings::from_env();
    logging::init(settings.log_filter.as_deref());
    settings
}

/// Prints a failed `res` and maps it to the entry point's exit contract.
fn finish(res: MobResult<()>) -> Result<i32, ()> {
    match res {
        Ok(()) => Ok(0),
        Err(e) => {
            debug!(error = ?e, "command failed");
            report::print_error(&e.to_string());
            Err(())
        }
    }
}

/// Builds a controller over the real `git config`.
fn controller(settings: &Settings) -> MobResult<MobController<GitConfig>> {
    git::ensure_available()?;
    let config = GitConfig;

    let git_dir = match git::rev_parse("--absolute-git-dir") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            debug!(error = %e, "no git dir, falling back to .git");
            PathBuf::from(".git")
        }
    };
    let message_path = mob::resolve_message_path(settings, &config, &git_dir)?;
    debug!(path = %message_path.display(), "commit template");

    Ok(MobController::new(config, message_path))
}

/// Opens the authors file. Only commands that read or write it call this,
/// so a missing home directory does not affect the others.
fn authors_store(settings: &Settings) -> MobResult<AuthorsStore> {
    settings.authors_path().map(AuthorsStore::new)
}

fn run_mob(args: &MobArgs, settings: &Settings) -> MobResult<()> {
    if args.list {
        report::print_registry(&mob::registered(&authors_store(settings)?)?);
        return Ok(());
    }

    let mut mob = controller(settings)?;
    if args.print {
        report::print_plain(&mob.trailers()?);
    } else if args.initials.is_empty() {
        report::print_mob(&mob.show()?);
    } else {
        let store = authors_store(settings)?;
        report::print_mob(&mob.set_mob(&store, args.initials.as_slice())?);
    }
    Ok(())
}

/// Reads `user.name`/`user.email` as an [`Author`] when both are set.
fn git_user<C: ConfigStore>(config: &C) -> Option<Author> {
    let name = config.get(USER_NAME_KEY).ok().flatten()?;
    let email = config.get(USER_EMAIL_KEY).ok().flatten()?;
    Some(Author::new(name, email))
}

/// Adds or replaces one registry entry.
///
/// Missing fields are asked through `prompter`; without one they are an
/// error. Nothing is written unless both the name and the email validate.
/// `git_user` fills the registry's informational `author` when it has none
/// yet.
pub(crate) fn add_author<P: StringPrompter>(
    args: AddAuthorArgs,
    store: &AuthorsStore,
    git_user: Option<Author>,
    mut prompter: Option<&mut P>,
) -> MobResult<Author> {
    let initials = args.initials.trim().to_string();
    if initials.is_empty() {
        return Err(MobError::Prompt(String::from("initials must not be empty")));
    }

    let name = match args.name {
        Some(n) => n.trim().to_string(),
        None => match prompter.as_deref_mut() {
            Some(p) => prompt::ask_name(p, &initials, PROMPT_ATTEMPTS).map_err(MobError::Prompt)?,
            None => return Err(MobError::Prompt(String::from("missing co-author name"))),
        },
    };
    if !validate_name(&name) {
        return Err(MobError::InvalidName(name));
    }

    let email = match args.email {
        Some(e) => e.trim().to_string(),
        None => match prompter.as_deref_mut() {
            Some(p) => prompt::ask_email(p, &initials, PROMPT_ATTEMPTS).map_err(MobError::Prompt)?,
            None => return Err(MobError::Prompt(String::from("missing co-author email"))),
        },
    };

    if !validate_email(&email) {
        return Err(MobError::InvalidEmail(email));
    }

    let mut registry = store.read_or_default()?;
    if registry.author.is_none() {
        registry.author = git_user;
    }

    let author = Author::new(name, email);
    if let Some(previous) = registry.upsert(initials.clone(), author.clone()) {
        info!(%initials, %previous, "replacing co-author");
    }
    store.overwrite(&registry)?;
    Ok(author)
}

fn run_add_author(args: AddAuthorArgs, settings: &Settings) -> MobResult<()> {
    let store = authors_store(settings)?;
    let user = match git::ensure_available() {
        Ok(_) => git_user(&GitConfig),
        Err(_) => None,
    };

    let mut dialoguer = DialoguerStringPrompter;
    let prompter = console::user_attended().then_some(&mut dialoguer);

    let author = add_author(args, &store, user, prompter)?;
    let file = store
        .path()
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| store.path().display().to_string());
    report::print_success(&format!("{} has been added to the {} file", author.name, file));
    Ok(())
}

/// Entry point for the `mob` binary.
///
/// # Exit Codes
///
/// * `0` – Success, including `--help` and `--version`.
/// * `2` – Invalid arguments.
/// * Any other failure returns `Err(())` after printing the error.
pub fn mob_entry() -> Result<i32, ()> {
    let args: MobArgs = match parse() {
        Ok(a) => a,
        Err(code) => return Ok(code),
    };
    let settings = bootstrap();
    finish(run_mob(&args, &settings))
}

/// Entry point for the `solo` binary.
pub fn solo_entry() -> Result<i32, ()> {
    let _: SoloArgs = match parse() {
        Ok(a) => a,
        Err(code) => return Ok(code),
    };
    let settings = bootstrap();
    finish(controller(&settings).and_then(|mut mob| {
        report::print_mob(&mob.clear()?);
        Ok(())
    }))
}

/// Entry point for the `add-author` binary.
///
/// An invalid name or email aborts without touching the authors file and
/// exits non-zero.
pub fn add_author_entry() -> Result<i32, ()> {
    let args: AddAuthorArgs = match parse() {
        Ok(a) => a,
        Err(code) => return Ok(code),
    };
    let settings = bootstrap();
    finish(run_add_author(args, &settings))
}
