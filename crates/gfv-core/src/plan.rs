// SPDX-License-Identifier: MIT OR Apache-2.0
//! Platform-resolved launch parameters.

use crate::GfvError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;

/// Windows process-creation flag that suppresses the console window.
pub const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Host operating system family, as far as shell semantics are concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    /// Windows: `cmd.exe /C`, hidden console.
    Windows,
    /// macOS: login shell so the user's profile is sourced.
    MacOs,
    /// Linux: plain non-login shell.
    Linux,
    /// BSDs, Solaris/illumos, Android: `/bin/sh`.
    OtherPosix,
}

impl Platform {
    /// Map an OS identifier to a platform.
    ///
    /// Accepts `std::env::consts::OS` values plus the `win32` and `darwin`
    /// spellings. Anything else is [`GfvError::PlatformUnsupported`].
    pub fn from_os(os: &str) -> Result<Self, GfvError> {
        match os.trim().to_ascii_lowercase().as_str() {
            "windows" | "win32" => Ok(Self::Windows),
            "macos" | "darwin" => Ok(Self::MacOs),
            "linux" => Ok(Self::Linux),
            "freebsd" | "openbsd" | "netbsd" | "dragonfly" | "solaris" | "illumos"
            | "android" => Ok(Self::OtherPosix),
            _ => Err(GfvError::PlatformUnsupported { os: os.to_string() }),
        }
    }

    /// Platform of the running binary.
    pub fn current() -> Result<Self, GfvError> {
        Self::from_os(std::env::consts::OS)
    }

    /// Returns `true` for every non-Windows platform.
    pub fn is_posix(self) -> bool {
        !matches!(self, Self::Windows)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Windows => "windows",
            Self::MacOs => "macos",
            Self::Linux => "linux",
            Self::OtherPosix => "posix",
        };
        f.write_str(s)
    }
}

/// Which shell layer wraps the command, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShellKind {
    /// `cmd.exe /C`.
    Cmd,
    /// POSIX shell started as a login shell (`-l -c`).
    Login,
    /// POSIX shell started without login semantics (`-c`).
    NonLogin,
}

/// Concrete, OS-specific parameters for launching one child process.
///
/// Built fresh for every invocation by the shell resolver and consumed by the
/// process runner. `env` is a complete copy, never a view of the live process
/// environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationPlan {
    /// Executable to launch.
    pub program: String,
    /// Arguments after the program.
    pub args: Vec<String>,
    /// Shell wrapper used, or `None` for a direct launch.
    pub shell: Option<ShellKind>,
    /// Windows process-creation flags; zero elsewhere.
    pub creation_flags: u32,
    /// Place the child in its own process group (POSIX).
    pub new_process_group: bool,
    /// Pass `args` to the OS without further quoting (Windows `cmd /C`).
    pub verbatim_args: bool,
    /// Working directory, or `None` for the caller's current directory.
    pub cwd: Option<PathBuf>,
    /// Complete environment for the child. Values need not be Unicode;
    /// serialized output shows them lossily.
    #[serde(with = "lossy_env")]
    pub env: BTreeMap<OsString, OsString>,
    /// Attach a pipe to standard input.
    pub pipe_stdin: bool,
}

impl InvocationPlan {
    /// Direct launch of `program` with empty environment and stdin piped.
    ///
    /// Mostly useful for tests and callers that bypass the resolver.
    pub fn direct(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            shell: None,
            creation_flags: 0,
            new_process_group: cfg!(unix),
            verbatim_args: false,
            cwd: None,
            env: BTreeMap::new(),
            pipe_stdin: true,
        }
    }

    /// Replace the argument list.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Copy the current process environment into the plan.
    pub fn with_process_env(mut self) -> Self {
        self.env = std::env::vars_os().collect();
        self
    }

    /// Short human-readable command line for logs.
    pub fn display_command(&self) -> String {
        let mut out = self.program.clone();
        for a in &self.args {
            out.push(' ');
            out.push_str(a);
        }
        out
    }
}

mod lossy_env {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::collections::BTreeMap;
    use std::ffi::OsString;

    pub(super) fn serialize<S: Serializer>(
        env: &BTreeMap<OsString, OsString>,
        ser: S,
    ) -> Result<S::Ok, S::Error> {
        ser.collect_map(
            env.iter()
                .map(|(k, v)| (k.to_string_lossy(), v.to_string_lossy())),
        )
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        de: D,
    ) -> Result<BTreeMap<OsString, OsString>, D::Error> {
        let map = BTreeMap::<String, String>::deserialize(de)?;
        Ok(map
            .into_iter()
            .map(|(k, v)| (OsString::from(k), OsString::from(v)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_os_accepts_std_values() {
        assert_eq!(Platform::from_os("windows").unwrap(), Platform::Windows);
        assert_eq!(Platform::from_os("macos").unwrap(), Platform::MacOs);
        assert_eq!(Platform::from_os("linux").unwrap(), Platform::Linux);
        assert_eq!(Platform::from_os("freebsd").unwrap(), Platform::OtherPosix);
    }

    #[test]
    fn from_os_accepts_legacy_aliases() {
        assert_eq!(Platform::from_os("win32").unwrap(), Platform::Windows);
        assert_eq!(Platform::from_os("Darwin").unwrap(), Platform::MacOs);
    }

    #[test]
    fn from_os_rejects_unknown() {
        let err = Platform::from_os("plan9").unwrap_err();
        assert!(matches!(err, GfvError::PlatformUnsupported { ref os } if os == "plan9"));
    }

    #[test]
    fn display_command_joins_args() {
        let plan = InvocationPlan::direct("sh").with_args(["-c", "true"]);
        assert_eq!(plan.display_command(), "sh -c true");
    }

    #[test]
    fn env_serializes_as_string_map() {
        let mut plan = InvocationPlan::direct("gofmt");
        plan.env.insert("GOFLAGS".into(), "-mod=mod".into());
        let v = serde_json::to_value(&plan).unwrap();
        assert_eq!(v["env"], serde_json::json!({ "GOFLAGS": "-mod=mod" }));
        let back: InvocationPlan = serde_json::from_value(v).unwrap();
        assert_eq!(back, plan);
    }

    #[cfg(unix)]
    #[test]
    fn non_unicode_env_value_serializes_lossily() {
        use std::os::unix::ffi::OsStringExt;
        let mut plan = InvocationPlan::direct("gofmt");
        plan.env
            .insert("LEGACY".into(), OsString::from_vec(b"caf\xe9".to_vec()));
        let v = serde_json::to_value(&plan).unwrap();
        assert_eq!(v["env"]["LEGACY"], "caf\u{fffd}");
    }

    #[test]
    fn current_platform_is_known_on_ci_targets() {
        if cfg!(any(target_os = "linux", target_os = "macos", windows)) {
            assert!(Platform::current().is_ok());
        }
    }
}
