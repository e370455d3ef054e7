// SPDX-License-Identifier: MIT OR Apache-2.0
//! Resolved plans executed by a real POSIX shell: every argv element must
//! arrive intact.
#![cfg(unix)]

use gfv_core::{CommandSpec, PayloadTransport, RunStatus};
use gfv_runner::ProcessRunner;
use gfv_shell::ShellResolver;

const AWKWARD: &[&str] = &[
    "plain",
    "with space",
    "it's",
    "\"double\"",
    "$HOME",
    "`uname`",
    "semi;colon",
    "back\\slash",
    "*.go",
    "",
];

async fn echo_args(spec: CommandSpec, payload: Option<&str>) -> Vec<String> {
    let plan = ShellResolver::with_posix_shell("sh")
        .resolve_current(&spec, payload)
        .unwrap();
    let result = ProcessRunner::new().run(&plan, b"", None).await;
    assert_eq!(result.status, RunStatus::Success, "{result:?}");
    String::from_utf8(result.stdout)
        .unwrap()
        .split_terminator('\n')
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn shell_quoted_argv_arrives_verbatim() {
    let spec = CommandSpec::new("printf").arg("%s\\n").args(AWKWARD.iter().copied());
    assert_eq!(echo_args(spec, None).await, AWKWARD);
}

#[tokio::test]
async fn direct_argv_arrives_verbatim() {
    let spec = CommandSpec::new("printf")
        .arg("%s\n")
        .args(AWKWARD.iter().copied())
        .use_shell(false);
    assert_eq!(echo_args(spec, None).await, AWKWARD);
}

#[tokio::test]
async fn argument_payload_is_one_word() {
    let spec = CommandSpec::new("printf '%s\\n'").transport(PayloadTransport::Argument);
    let path = "/tmp/my project/it's main.go";
    assert_eq!(echo_args(spec, Some(path)).await, [path]);
}

#[tokio::test]
async fn single_element_template_is_interpreted_by_the_shell() {
    let spec = CommandSpec::new("printf '%s\\n' a b | tr a-z A-Z");
    assert_eq!(echo_args(spec, None).await, ["A", "B"]);
}
