//! CLI output plumbing: every command builds a typed output struct that
//! renders either as human text or JSON.

use serde_json::Value;

/// Common interface for command output structures.
pub trait CommandOutput {
    fn to_human(&self) -> String;
    fn to_json(&self) -> Value;
}

/// Print a command output in the requested mode.
pub fn output<T: CommandOutput>(out: &T, json_mode: bool) {
    if json_mode {
        println!(
            "{}",
            serde_json::to_string_pretty(&out.to_json()).unwrap_or_else(|_| "{}".to_string())
        );
    } else {
        println!("{}", out.to_human());
    }
}

/// Truncate a string for table display, appending "..." when cut.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}
