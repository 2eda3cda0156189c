use console::style;
use std::fmt::Display;

/// Green bold: completed runs, confirmations
pub fn success<D: Display>(text: D) -> String {
    style(text).green().bold().to_string()
}

/// Red bold: aborted runs, fatal errors
pub fn failure<D: Display>(text: D) -> String {
    style(text).red().bold().to_string()
}

/// White bold: section headers, titles
pub fn header<D: Display>(text: D) -> String {
    style(text).white().bold().to_string()
}

/// Dim: script listings, secondary text
pub fn dim<D: Display>(text: D) -> String {
    style(text).dim().to_string()
}

/// Yellow: warnings, timeouts
pub fn warn<D: Display>(text: D) -> String {
    style(text).yellow().to_string()
}

/// Red: captured error output
pub fn error_text<D: Display>(text: D) -> String {
    style(text).red().to_string()
}

/// Green: paths, costs, counts
pub fn value<D: Display>(text: D) -> String {
    style(text).green().to_string()
}

/// Cyan bold: prompts, step markers
pub fn accent<D: Display>(text: D) -> String {
    style(text).cyan().bold().to_string()
}
