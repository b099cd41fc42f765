/// Packaging target identifiers understood by `pkg`
pub mod target {
    /// Linux x86_64 target
    pub const LINUX_X64: &str = "node20-linux-x64";

    /// Linux ARM64 target
    pub const LINUX_ARM64: &str = "node20-linux-arm64";

    /// Windows x86_64 target
    pub const WIN_X64: &str = "node20-win-x64";

    /// macOS x86_64 target
    pub const MACOS_X64: &str = "node20-macos-x64";

    /// macOS Apple Silicon target
    pub const MACOS_ARM64: &str = "node20-macos-arm64";

    /// Target used when `--pkg-target` is not given.
    ///
    /// This is deliberately not the detected host target: builds default to
    /// Linux executables even on Windows or macOS hosts. Pass `auto` to use
    /// the host target instead.
    pub const DEFAULT: &str = LINUX_X64;

    /// Value of `--pkg-target` that selects the detected host target
    pub const AUTO: &str = "auto";
}

/// Deployment defaults
pub mod deploy {
    /// Deployment root used when neither the CLI nor the config names one
    pub const DEFAULT_TARGET_DIR: &str = "server-build";

    /// Infix between the artifact name and the backup timestamp
    pub const BACKUP_INFIX: &str = ".backup.";

    /// `strftime` layout of backup timestamps, e.g. `20240115_153045`
    pub const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

    /// Mode applied to deployed executables
    pub const EXECUTABLE_MODE: u32 = 0o755;
}

/// External tool defaults
pub mod tools {
    pub const PACKAGER: &str = "pkg";

    /// Shim name npm installs for global binaries on Windows
    pub const PACKAGER_WINDOWS_SHIM: &str = "pkg.cmd";

    pub const INSTALLER: &str = "npm";

    /// Service dependency manifest
    pub const MANIFEST: &str = "package.json";

    /// Directory the installer populates next to the manifest
    pub const DEPENDENCY_DIR: &str = "node_modules";
}

/// Prefix of the systemd units printed in follow-up instructions
pub const SYSTEMD_UNIT_PREFIX: &str = "ds-";

/// Name of the per-project configuration file
pub const CONFIG_FILE_NAME: &str = "srvpack.toml";
