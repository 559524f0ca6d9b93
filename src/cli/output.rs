use colored::Colorize;

/// Print a warning message to stderr with a yellow warning prefix.
pub fn warning(msg: &str) {
    eprintln!("{} {}", "⚠".yellow(), msg);
}

/// Print an error message to stderr with a red cross prefix.
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}
