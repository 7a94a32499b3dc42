//! Terminal output utilities

use console::style;

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", style("✓").green().bold(), msg);
}

/// Print a warning message
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("⚠").yellow().bold(), msg);
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", style("ℹ").blue().bold(), msg);
}

/// Print a header
pub fn header(msg: &str) {
    println!("\n{}", style(msg).bold().underlined());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", style(key).dim(), value);
}

/// Print an operator line produced by an extension engine
///
/// Section headings (lines ending in `:` without indentation) are bolded.
pub fn engine_line(text: &str) {
    for line in text.lines() {
        if !line.starts_with(' ') && line.ends_with(':') {
            println!("{}", style(line).bold());
        } else {
            println!("{}", line);
        }
    }
}
