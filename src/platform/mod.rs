//! Host platform detection
//!
//! Maps the host operating system and architecture to a `pkg` target and
//! classifies target strings for cross-packaging warnings.

use crate::constants::target;


/// Operating system family a packaging target is built for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetOs {
    Linux,
    Windows,
    MacOs,
    Unknown,
}

impl TargetOs {
    /// Classify the operating system family of a host OS name as reported by
    /// `std::env::consts::OS`
    pub fn from_host(os: &str) -> Self {
        match os {
            "linux" => TargetOs::Linux,
            "windows" => TargetOs::Windows,
            "macos" => TargetOs::MacOs,
            _ => TargetOs::Unknown,
        }
    }

    /// Classify the operating system a target string such as
    /// `node20-linux-x64` is built for
    pub fn from_target(pkg_target: &str) -> Self {
        if pkg_target.contains("linux") {
            TargetOs::Linux
        } else if pkg_target.contains("win") {
            TargetOs::Windows
        } else if pkg_target.contains("macos") {
            TargetOs::MacOs
        } else {
            TargetOs::Unknown
        }
    }
}

/// Map an OS name and machine architecture to a packaging target.
///
/// Unrecognized hosts fall back to the Linux x64 target.
pub fn detect_target(os: &str, arch: &str) -> &'static str {
    let os = os.to_ascii_lowercase();
    let arch = arch.to_ascii_lowercase();
    let is_arm64 = arch.contains("aarch64") || arch.contains("arm64");

    match os.as_str() {
        "linux" if is_arm64 => target::LINUX_ARM64,
        "linux" => target::LINUX_X64,
        "windows" => target::WIN_X64,
        "macos" | "darwin" if is_arm64 => target::MACOS_ARM64,
        "macos" | "darwin" => target::MACOS_X64,
        _ => target::LINUX_X64,
    }
}

/// Packaging target matching the running host
pub fn host_target() -> &'static str {
    detect_target(std::env::consts::OS, std::env::consts::ARCH)
}

/// Resolve a `--pkg-target` value, expanding `auto` to the host target
pub fn resolve_target(requested: &str) -> String {
    if requested.eq_ignore_ascii_case(target::AUTO) {
        host_target().to_string()
    } else {
        requested.to_string()
    }
}

/// Warning to show when packaging for a different OS than the host, if the
/// combination is one worth pointing out
pub fn cross_packaging_warning(host: TargetOs, pkg_target: &str) -> Option<&'static str> {
    match (host, TargetOs::from_target(pkg_target)) {
        (TargetOs::Windows, TargetOs::Linux) => Some(
            "Packaging Linux executables on Windows; make sure the deployment host runs Linux",
        ),
        (TargetOs::Linux, TargetOs::Windows) => Some("Packaging Windows executables on Linux"),
        _ => None,
    }
}
