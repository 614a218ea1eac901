use colored::Colorize;
use reconcile::{ApplyResult, FieldChange};

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a dim/muted message
pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Print a header/title
pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.chars().count()).dimmed());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

/// Print field changes, one per line
pub fn changes(changes: &[FieldChange]) {
    for change in changes {
        println!("    {} {}", "~".yellow(), change);
    }
}

/// Print a reconciliation error with its category and advice.
///
/// Host diagnostics are only shown when `verbose` is set.
pub fn reconcile_error(err: &reconcile::Error, verbose: bool) {
    let category = err.category();
    error(&format!("{}: {}", category.description(), err));
    dim(category.advice());
    if verbose && let Some(diagnostics) = err.diagnostics() {
        dim(&format!("host output: {}", diagnostics.summary()));
    }
}

/// Short symbol and label for an apply result
pub fn result_label(result: &ApplyResult) -> String {
    match result {
        ApplyResult::NoChange => format!("{} unchanged", "·".dimmed()),
        ApplyResult::Created => format!("{} created", "+".green()),
        ApplyResult::Imported => format!("{} imported", "↓".cyan()),
        ApplyResult::Modified => format!("{} modified", "~".yellow()),
        ApplyResult::Removed => format!("{} removed", "-".red()),
        ApplyResult::Forgotten => format!("{} forgotten", "-".dimmed()),
        ApplyResult::Failed { error } => format!("{} failed: {}", "✗".red(), error),
    }
}
