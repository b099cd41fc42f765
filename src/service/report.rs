//! Console output: startup banner, summary and follow-up instructions
//!
//! These go to stdout. Progress and diagnostics go through `tracing` to
//! stderr.

use std::io::IsTerminal;
use std::path::Path;

use super::package::RunSummary;
use crate::constants::SYSTEMD_UNIT_PREFIX;
use crate::packager::size_mb;
use crate::registry::ServiceRegistry;

const RULE: &str = "============================================================";

/// Colored status markers
#[derive(Debug, Clone, Copy)]
pub struct Markers {
    color: bool,
}

impl Markers {
    /// Color when stdout is a terminal and `NO_COLOR` is unset
    pub fn detect() -> Self {
        Self {
            color: std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
        }
    }

    pub fn plain() -> Self {
        Self { color: false }
    }

    fn paint(&self, code: &str, symbol: &str) -> String {
        if self.color {
            format!("\x1b[{}m{}\x1b[0m", code, symbol)
        } else {
            symbol.to_string()
        }
    }

    pub fn success(&self) -> String {
        self.paint("92", "✓")
    }

    pub fn failure(&self) -> String {
        self.paint("91", "✗")
    }

    pub fn warning(&self) -> String {
        self.paint("93", "⚠")
    }
}

/// What the banner shows about a run
pub struct Banner<'a> {
    pub source_root: &'a Path,
    /// `None` when writing beside the sources
    pub output_dir: Option<&'a Path>,
    pub pkg_target: &'a str,
    pub host_target: &'a str,
    pub services: &'a [String],
}

pub fn render_banner(banner: &Banner<'_>) -> String {
    let output_dir = banner
        .output_dir
        .map(|dir| dir.display().to_string())
        .unwrap_or_else(|| "(source directories)".to_string());

    let lines = [
        RULE.to_string(),
        "srvpack - repackage and deploy services".to_string(),
        RULE.to_string(),
        format!("Host:         {} {}", std::env::consts::OS, std::env::consts::ARCH),
        format!("Source root:  {}", banner.source_root.display()),
        format!("Output dir:   {}", output_dir),
        format!(
            "pkg target:   {} (host: {})",
            banner.pkg_target, banner.host_target
        ),
        format!("Services:     {}", banner.services.join(", ")),
        RULE.to_string(),
    ];
    join_lines(&lines)
}

pub fn render_summary(summary: &RunSummary, markers: Markers) -> String {
    let mut lines = vec![RULE.to_string(), "Summary".to_string(), RULE.to_string()];

    let succeeded: Vec<_> = summary.succeeded().collect();
    if !succeeded.is_empty() {
        lines.push(format!(
            "{} Packaged {} service(s):",
            markers.success(),
            succeeded.len()
        ));
        for result in succeeded {
            let path = result
                .output_path
                .as_deref()
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            lines.push(format!(
                "  - {}: {} ({:.2} MB)",
                result.service_name,
                path,
                size_mb(result.size_bytes.unwrap_or_default())
            ));
        }
    }

    let failed: Vec<_> = summary.failed().collect();
    if !failed.is_empty() {
        lines.push(format!(
            "{} Failed to package {} service(s):",
            markers.failure(),
            failed.len()
        ));
        for result in failed {
            lines.push(format!("  - {}", result.service_name));
        }
    }

    if !summary.skipped.is_empty() {
        lines.push(format!(
            "{} Skipped unknown service(s): {}",
            markers.warning(),
            summary.skipped.join(", ")
        ));
    }

    lines.push(RULE.to_string());
    join_lines(&lines)
}

/// Operational reminders for services that landed in the target directory
pub fn render_next_steps(
    summary: &RunSummary,
    registry: &ServiceRegistry,
    target_dir: &Path,
) -> String {
    let specs: Vec<_> = summary
        .succeeded()
        .filter_map(|r| registry.get(&r.service_name))
        .collect();
    if specs.is_empty() {
        return String::new();
    }

    let mut lines = vec![
        "Next steps:".to_string(),
        "1. Upload the files to the server".to_string(),
        "2. Make them executable:".to_string(),
    ];
    for spec in &specs {
        let path = target_dir.join(&spec.target_subdir).join(&spec.output);
        lines.push(format!("   chmod +x {}", path.display()));
    }
    lines.push(String::new());
    lines.push("3. Restart the services:".to_string());
    for spec in &specs {
        lines.push(format!("   systemctl restart {}{}", SYSTEMD_UNIT_PREFIX, spec.name));
    }
    lines.push(String::new());
    lines.push("4. Check their status:".to_string());
    for spec in &specs {
        lines.push(format!("   systemctl status {}{}", SYSTEMD_UNIT_PREFIX, spec.name));
    }
    join_lines(&lines)
}

/// Registry listing for `--list`
pub fn render_registry(registry: &ServiceRegistry) -> String {
    let lines: Vec<_> = registry
        .iter()
        .map(|spec| {
            format!(
                "{:<12} {:<20} -> {}/{}  {}",
                spec.name,
                spec.source_dir.display(),
                spec.target_subdir.display(),
                spec.output,
                spec.description
            )
        })
        .collect();
    join_lines(&lines)
}

fn join_lines(lines: &[String]) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::PackageResult;
    use std::path::PathBuf;

    fn summary() -> RunSummary {
        RunSummary {
            results: vec![
                PackageResult::succeeded(
                    "docservice",
                    PathBuf::from("/srv/DocService/docservice"),
                    52_428_800,
                ),
                PackageResult::failed("converter"),
            ],
            skipped: vec!["ghost".to_string()],
        }
    }

    #[test]
    fn test_render_summary() {
        let out = render_summary(&summary(), Markers::plain());
        assert!(out.contains("✓ Packaged 1 service(s):"));
        assert!(out.contains("  - docservice: /srv/DocService/docservice (50.00 MB)"));
        assert!(out.contains("✗ Failed to package 1 service(s):"));
        assert!(out.contains("  - converter"));
        assert!(out.contains("⚠ Skipped unknown service(s): ghost"));
        assert!(!out.contains("\x1b["));
    }

    #[test]
    fn test_colored_markers() {
        let markers = Markers { color: true };
        assert_eq!(markers.success(), "\x1b[92m✓\x1b[0m");
        assert_eq!(markers.failure(), "\x1b[91m✗\x1b[0m");
    }

    #[test]
    fn test_render_next_steps() {
        let out = render_next_steps(
            &summary(),
            &ServiceRegistry::builtin(),
            Path::new("/srv"),
        );
        assert!(out.contains("chmod +x /srv/DocService/docservice"));
        assert!(out.contains("systemctl restart ds-docservice"));
        assert!(out.contains("systemctl status ds-docservice"));
        assert!(!out.contains("ds-converter"));
    }

    #[test]
    fn test_next_steps_empty_without_successes() {
        let summary = RunSummary {
            results: vec![PackageResult::failed("converter")],
            skipped: vec![],
        };
        let out = render_next_steps(&summary, &ServiceRegistry::builtin(), Path::new("/srv"));
        assert!(out.is_empty());
    }

    #[test]
    fn test_render_banner() {
        let services = vec!["docservice".to_string(), "converter".to_string()];
        let out = render_banner(&Banner {
            source_root: Path::new("/src"),
            output_dir: None,
            pkg_target: "node20-linux-x64",
            host_target: "node20-macos-arm64",
            services: &services,
        });
        assert!(out.contains("Output dir:   (source directories)"));
        assert!(out.contains("pkg target:   node20-linux-x64 (host: node20-macos-arm64)"));
        assert!(out.contains("Services:     docservice, converter"));
    }

    #[test]
    fn test_render_registry() {
        let out = render_registry(&ServiceRegistry::builtin());
        assert_eq!(out.lines().count(), 4);
        assert!(out.lines().next().unwrap().starts_with("docservice"));
    }
}
