use console::{measure_text_width, style};

use crate::authors::Author;
use crate::mob::MobState;

/// Prints the current author followed by each active co-author.
///
/// The author line is bold and co-authors are dimmed; [`console`] strips the
/// styling when stdout is not a terminal, so the output stays scriptable.
pub fn print_mob(state: &MobState) {
    for line in mob_lines(state) {
        println!("{line}");
    }
}

/// Builds the lines shown by [`print_mob`], possibly containing ANSI codes.
fn mob_lines(state: &MobState) -> Vec<String> {
    let author = state
        .author
        .iter()
        .map(|a| style(a).bold().to_string());
    let co_authors = state.co_authors.iter().map(|c| style(c).dim().to_string());
    author.chain(co_authors).collect()
}

/// Prints `lines` unstyled, one per line.
pub fn print_plain(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}

/// Prints the registry as an aligned `initials  Name <email>` table.
pub fn print_registry(entries: &[(String, Author)]) {
    for line in registry_lines(entries) {
        println!("{line}");
    }
}

fn registry_lines(entries: &[(String, Author)]) -> Vec<String> {
    let width = entries
        .iter()
        .map(|(initials, _)| measure_text_width(initials))
        .max()
        .unwrap_or(0);

    entries
        .iter()
        .map(|(initials, author)| {
            let pad = width - measure_text_width(initials);
            format!(
                "{}{}  {}",
                style(initials).cyan().bold(),
                " ".repeat(pad),
                author
            )
        })
        .collect()
}

/// Prints a red, bold `Error: ...` line to stderr.
pub fn print_error(message: &str) {
    eprintln!("{}", style(format!("Error: {}", message)).for_stderr().red().bold());
}

/// Prints a green confirmation line.
pub fn print_success(message: &str) {
    println!("{}", style(message).green());
}
