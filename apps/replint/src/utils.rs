//! Small helpers shared by the binary and printers.

use owo_colors::OwoColorize;

/// Colors are off for JSON output and whenever `NO_COLOR` is set.
pub fn use_colors(output: &str) -> bool {
    output != "json" && std::env::var_os("NO_COLOR").is_none()
}

fn prefix(word: &str, paint: fn(&str) -> String) -> String {
    if use_colors("human") {
        paint(word)
    } else {
        word.to_string()
    }
}

pub fn error_prefix() -> String {
    prefix("error:", |w| w.red().bold().to_string())
}

pub fn warn_prefix() -> String {
    prefix("warning:", |w| w.yellow().bold().to_string())
}

pub fn note_prefix() -> String {
    prefix("note:", |w| w.cyan().bold().to_string())
}

pub fn info_prefix() -> String {
    prefix("info:", |w| w.blue().bold().to_string())
}

/// `1 lint` / `3 lints`.
pub fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{} {}", n, word)
    } else {
        format!("{} {}s", n, word)
    }
}
