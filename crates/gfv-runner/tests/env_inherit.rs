// SPDX-License-Identifier: MIT OR Apache-2.0
//! The inherited environment reaches the child byte for byte.
//!
//! Kept in its own test binary: it mutates the process environment.
#![cfg(unix)]

use gfv_core::{InvocationPlan, RunStatus};
use gfv_runner::ProcessRunner;
use std::ffi::OsStr;
use std::os::unix::ffi::OsStrExt;

#[tokio::test]
async fn non_unicode_variable_reaches_child() {
    // SAFETY: the only test in this binary; nothing else touches the environment.
    unsafe {
        std::env::set_var("GFV_LATIN1_VALUE", OsStr::from_bytes(b"caf\xe9"));
        std::env::set_var("GFV_PLAIN_VALUE", "ok");
    }

    let plan = InvocationPlan::direct("/bin/sh")
        .with_args([
            "-c",
            r#"printf '%s|%s' "${GFV_PLAIN_VALUE-unset}" "${GFV_LATIN1_VALUE-unset}""#,
        ])
        .with_process_env();
    let result = ProcessRunner::new().run(&plan, b"", None).await;

    assert_eq!(result.status, RunStatus::Success);
    assert_eq!(result.stdout, b"ok|caf\xe9");
}
