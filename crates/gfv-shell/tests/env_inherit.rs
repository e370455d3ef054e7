// SPDX-License-Identifier: MIT OR Apache-2.0
//! A resolved plan carries every inherited variable, Unicode or not.
//!
//! Kept in its own test binary: it mutates the process environment.
#![cfg(unix)]

use gfv_core::{CommandSpec, RunStatus};
use gfv_runner::ProcessRunner;
use gfv_shell::ShellResolver;
use std::ffi::OsStr;
use std::os::unix::ffi::OsStrExt;

#[tokio::test]
async fn resolved_plan_inherits_non_unicode_variables() {
    // SAFETY: the only test in this binary; nothing else touches the environment.
    unsafe {
        std::env::set_var("GFV_INHERIT_BYTES", OsStr::from_bytes(b"caf\xe9"));
        std::env::set_var("GFV_INHERIT_PLAIN", "ok");
    }

    let spec = CommandSpec::new(
        r#"printf '%s|%s' "${GFV_INHERIT_PLAIN-unset}" "${GFV_INHERIT_BYTES-unset}""#,
    );
    let plan = ShellResolver::with_posix_shell("sh")
        .resolve_current(&spec, None)
        .unwrap();
    assert_eq!(
        plan.env.get(OsStr::new("GFV_INHERIT_BYTES")).map(|v| v.as_bytes()),
        Some(&b"caf\xe9"[..])
    );

    let result = ProcessRunner::new().run(&plan, b"", None).await;
    assert_eq!(result.status, RunStatus::Success, "{result:?}");
    assert_eq!(result.stdout, b"ok|caf\xe9");
}
