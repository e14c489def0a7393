//! Shell quoting and word splitting.

use crate::error::{Error, Result};

/// Escape a value for use inside single quotes.
/// Replaces `'` with `'\''` (end quote, escaped quote, start quote).
pub fn escape_single_quote_content(value: &str) -> String {
    value.replace('\'', "'\\''")
}

/// Quote a single argument for display as a shell command.
/// - Empty strings become `''`
/// - Strings with shell metacharacters are wrapped in single quotes
/// - Embedded single quotes are escaped
pub fn quote_arg(arg: &str) -> String {
    if arg.is_empty() {
        return "''".to_string();
    }

    const SHELL_META: &[char] = &[
        ' ', '\t', '\n', '\'', '"', '\\', '$', '`', '!', '*', '?', '[', ']', '(', ')', '{', '}',
        '<', '>', '|', '&', ';', '#', '~',
    ];

    if !arg.contains(SHELL_META) {
        return arg.to_string();
    }

    format!("'{}'", escape_single_quote_content(arg))
}

/// Quote and join multiple arguments.
pub fn quote_args(args: &[&str]) -> String {
    args.iter()
        .map(|a| quote_arg(a))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split a configured command line into argv using shell word rules.
///
/// `key` names the configuration entry the command came from.
pub fn split_command(key: &str, command: &str) -> Result<Vec<String>> {
    let words = shell_words::split(command).map_err(|e| {
        Error::config_invalid_value(key, Some(command.to_string()), e.to_string())
    })?;

    if words.is_empty() {
        return Err(Error::config_invalid_value(
            key,
            Some(command.to_string()),
            "command is empty",
        ));
    }

    Ok(words)
}
