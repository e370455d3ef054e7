// SPDX-License-Identifier: MIT OR Apache-2.0
//! Shell-level quoting for the two shell families we target.

/// Characters that make `cmd.exe` reinterpret an argument.
const CMD_SPECIAL: &[char] = &[
    ' ', '\t', '"', '&', '|', '<', '>', '^', '(', ')', '%', '!', ',', ';', '=',
];

/// Quote one argument for a POSIX `sh -c` command line.
pub fn posix_quote(arg: &str) -> String {
    shell_words::quote(arg).into_owned()
}

/// Quote one argument for a `cmd.exe /C` command line.
///
/// Plain words pass through; anything else is wrapped in double quotes with
/// embedded quotes doubled.
pub fn cmd_quote(arg: &str) -> String {
    if !arg.is_empty() && !arg.contains(CMD_SPECIAL) {
        return arg.to_string();
    }
    format!("\"{}\"", arg.replace('"', "\"\""))
}
