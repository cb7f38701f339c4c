// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Argument-vector rendering and POSIX shell quoting.

use scalewerk_core::types::DriverSettings;

/// Flag token for a settings key: `-k` for one character, `--key` otherwise.
pub fn flag_for(key: &str) -> String {
    if key.chars().count() == 1 {
        format!("-{key}")
    } else {
        format!("--{key}")
    }
}

/// Render settings into flag/value tokens, in settings order.
///
/// Omitted entries (`None` or `false`) produce nothing; `true` produces the
/// bare flag; anything else produces the flag followed by the value.
pub fn render_options(settings: &DriverSettings) -> Vec<String> {
    let mut tokens = Vec::with_capacity(settings.len() * 2);
    for (key, value) in settings.iter() {
        let Some(value) = value else { continue };
        if value.is_omitted() {
            continue;
        }
        tokens.push(flag_for(key));
        if !value.is_bare_flag() {
            tokens.push(value.to_string());
        }
    }
    tokens
}

/// Characters that never need quoting in a POSIX shell word.
fn is_shell_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || "@%+=:,./_-".contains(c)
}

/// Quote one token so a POSIX shell reads it back verbatim.
pub fn shell_quote(token: &str) -> String {
    if token.is_empty() {
        return "''".to_owned();
    }
    if token.chars().all(is_shell_safe) {
        return token.to_owned();
    }
    format!("'{}'", token.replace('\'', r#"'"'"'"#))
}

/// Quote and space-join a whole argument vector.
pub fn shell_join<S: AsRef<str>>(argv: &[S]) -> String {
    argv.iter()
        .map(|t| shell_quote(t.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}
