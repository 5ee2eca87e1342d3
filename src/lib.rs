//! # git-mob
//!
//! Credit everyone at the keyboard: keeps a registry of co-authors and
//! injects `Co-authored-by` trailers into the commit message template.
//!
//! ## Usage
//!
//! ```bash
//! # Register a co-author once
//! add-author jd "Jane Doe" jane@example.com
//!
//! # Mob with them; trailers appear in the next commit message
//! mob jd
//!
//! # Show who is mobbing, then stop
//! mob
//! solo
//! ```
//!
//! ## Modules
//!
//! - [`authors`] - Co-author registry file and initials lookup
//! - [`email`] - Email shape check
//! - [`message`] - Commit template trailer block
//! - [`git`] - `git config` access behind [`git::ConfigStore`]
//! - [`mob`] - Set, show and clear the active mob
//! - [`cli`] - Argument parsing and binary entry points
//! - [`prompt`] - Interactive input for `add-author`
//! - [`report`] - Console output
//! - [`settings`] - Environment-derived configuration
//! - [`logging`] - Diagnostic tracing setup
//! - [`error`] - Error type

pub mod authors;
pub mod cli;
pub mod email;
pub mod error;
pub mod git;
pub mod logging;
pub mod message;
pub mod mob;
pub mod prompt;
pub mod report;
pub mod settings;
