//! Device and package introspection.

use crate::error::{IntegrityError, Result};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Reports raw environment signals for [`RuntimeSecurityManager`](crate::RuntimeSecurityManager).
///
/// Implementations answer questions; policy (which signals matter, what the
/// expected signature is) lives in the manager.
#[async_trait]
pub trait DeviceIntrospector: Send + Sync + fmt::Debug {
    /// Whether a debugger or tracer is attached right now.
    async fn is_debugger_attached(&self) -> Result<bool>;

    /// Whether the running build permits debugging.
    fn is_debuggable(&self) -> bool;

    /// Whether the process runs with superuser privileges.
    async fn is_rooted(&self) -> Result<bool>;

    /// Whether the process runs inside an emulator or virtual machine.
    async fn is_emulator(&self) -> Result<bool>;

    /// Whether an instrumentation or hooking framework is loaded.
    async fn is_instrumented(&self) -> Result<bool>;

    /// SHA-256 of the package signing certificate, hex encoded.
    ///
    /// `None` when the platform cannot produce one.
    async fn signature_sha256(&self) -> Result<Option<String>>;

    /// Identifier of the installing package or channel, if known.
    async fn installer(&self) -> Result<Option<String>>;
}

const INSTRUMENTATION_MARKERS: &[&str] = &[
    "frida-agent",
    "frida-gadget",
    "frida-server",
    "libfrida",
    "xposed",
    "substrate",
];

const VIRTUAL_MACHINE_VENDORS: &[&str] = &[
    "qemu",
    "kvm",
    "virtualbox",
    "innotek",
    "vmware",
    "bochs",
    "parallels",
    "xen",
];

/// Probe for Linux hosts, reading `/proc` and `/sys`.
///
/// The running executable's SHA-256 stands in for a package signature.
/// Installer provenance is not available and always reports `None`.
#[derive(Debug, Clone)]
pub struct HostIntrospector {
    proc_root: PathBuf,
    sys_root: PathBuf,
    executable: Option<PathBuf>,
}

impl HostIntrospector {
    /// Probe the current process.
    #[must_use]
    pub fn new() -> Self {
        Self {
            proc_root: PathBuf::from("/proc"),
            sys_root: PathBuf::from("/sys"),
            executable: std::env::current_exe().ok(),
        }
    }

    /// Probe alternative roots and executable. Used by tests.
    #[must_use]
    pub fn with_roots(
        proc_root: impl Into<PathBuf>,
        sys_root: impl Into<PathBuf>,
        executable: Option<PathBuf>,
    ) -> Self {
        Self {
            proc_root: proc_root.into(),
            sys_root: sys_root.into(),
            executable,
        }
    }

    async fn read_optional(path: &Path) -> Result<Option<String>> {
        match tokio::fs::read_to_string(path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn self_status(&self) -> Result<Option<String>> {
        Self::read_optional(&self.proc_root.join("self").join("status")).await
    }
}

impl Default for HostIntrospector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DeviceIntrospector for HostIntrospector {
    async fn is_debugger_attached(&self) -> Result<bool> {
        let Some(status) = self.self_status().await? else {
            return Ok(false);
        };
        let tracer = parse_status_field(&status, "TracerPid:").ok_or_else(|| {
            IntegrityError::Introspection("TracerPid missing from status".to_string())
        })?;
        Ok(tracer != 0)
    }

    fn is_debuggable(&self) -> bool {
        cfg!(debug_assertions)
    }

    async fn is_rooted(&self) -> Result<bool> {
        let Some(status) = self.self_status().await? else {
            return Ok(false);
        };
        // Uid: real effective saved filesystem
        let euid = status
            .lines()
            .find_map(|line| line.strip_prefix("Uid:"))
            .and_then(|ids| ids.split_whitespace().nth(1))
            .and_then(|id| id.parse::<u32>().ok())
            .ok_or_else(|| IntegrityError::Introspection("Uid missing from status".to_string()))?;
        Ok(euid == 0)
    }

    async fn is_emulator(&self) -> Result<bool> {
        let dmi = self.sys_root.join("class").join("dmi").join("id");
        for field in ["sys_vendor", "product_name"] {
            if let Some(value) = Self::read_optional(&dmi.join(field)).await? {
                if is_virtual_machine_vendor(&value) {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    async fn is_instrumented(&self) -> Result<bool> {
        let maps = Self::read_optional(&self.proc_root.join("self").join("maps")).await?;
        Ok(maps.is_some_and(|maps| maps_contain_instrumentation(&maps)))
    }

    async fn signature_sha256(&self) -> Result<Option<String>> {
        let Some(executable) = &self.executable else {
            return Ok(None);
        };
        let Some(bytes) = read_bytes_optional(executable).await? else {
            return Ok(None);
        };
        Ok(Some(hex::encode(Sha256::digest(&bytes))))
    }

    async fn installer(&self) -> Result<Option<String>> {
        Ok(None)
    }
}

async fn read_bytes_optional(path: &Path) -> Result<Option<Vec<u8>>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn parse_status_field(status: &str, field: &str) -> Option<u32> {
    status
        .lines()
        .find_map(|line| line.strip_prefix(field))
        .and_then(|value| value.trim().parse().ok())
}

fn maps_contain_instrumentation(maps: &str) -> bool {
    let lower = maps.to_ascii_lowercase();
    INSTRUMENTATION_MARKERS
        .iter()
        .any(|marker| lower.contains(marker))
}

fn is_virtual_machine_vendor(value: &str) -> bool {
    let lower = value.trim().to_ascii_lowercase();
    VIRTUAL_MACHINE_VENDORS
        .iter()
        .any(|vendor| lower.contains(vendor))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const STATUS_CLEAN: &str =
        "Name:\treleaseflow\nState:\tR (running)\nTracerPid:\t0\nUid:\t1000\t1000\t1000\t1000\n";
    const STATUS_TRACED_ROOT: &str =
        "Name:\treleaseflow\nTracerPid:\t4242\nUid:\t1000\t0\t0\t0\n";

    fn fake_host(
        status: &str,
        maps: &str,
        vendor: Option<&str>,
    ) -> (tempfile::TempDir, HostIntrospector) {
        let tmp = tempfile::TempDir::new().expect("create temp dir");
        let proc_self = tmp.path().join("proc").join("self");
        fs::create_dir_all(&proc_self).expect("mkdir proc");
        fs::write(proc_self.join("status"), status).expect("write status");
        fs::write(proc_self.join("maps"), maps).expect("write maps");

        if let Some(vendor) = vendor {
            let dmi = tmp.path().join("sys").join("class").join("dmi").join("id");
            fs::create_dir_all(&dmi).expect("mkdir dmi");
            fs::write(dmi.join("sys_vendor"), vendor).expect("write vendor");
        }

        let exe = tmp.path().join("releaseflow");
        fs::write(&exe, b"binary").expect("write exe");

        let host = HostIntrospector::with_roots(
            tmp.path().join("proc"),
            tmp.path().join("sys"),
            Some(exe),
        );
        (tmp, host)
    }

    #[test]
    fn test_parse_status_field() {
        assert_eq!(parse_status_field(STATUS_CLEAN, "TracerPid:"), Some(0));
        assert_eq!(parse_status_field(STATUS_TRACED_ROOT, "TracerPid:"), Some(4242));
        assert_eq!(parse_status_field("Name:\tx\n", "TracerPid:"), None);
    }

    #[test]
    fn test_markers() {
        assert!(maps_contain_instrumentation(
            "7f00-7f10 r-xp 0 00:00 0 /data/local/tmp/frida-agent-64.so"
        ));
        assert!(!maps_contain_instrumentation(
            "7f00-7f10 r-xp 0 00:00 0 /usr/lib/libc.so.6"
        ));
        assert!(is_virtual_machine_vendor("QEMU\n"));
        assert!(is_virtual_machine_vendor("innotek GmbH"));
        assert!(!is_virtual_machine_vendor("Framework"));
    }

    #[tokio::test]
    async fn test_clean_host() {
        let (_tmp, host) = fake_host(STATUS_CLEAN, "/usr/lib/libc.so.6\n", Some("LENOVO"));
        assert!(!host.is_debugger_attached().await.expect("debugger"));
        assert!(!host.is_rooted().await.expect("root"));
        assert!(!host.is_emulator().await.expect("emulator"));
        assert!(!host.is_instrumented().await.expect("hooking"));
        assert_eq!(host.installer().await.expect("installer"), None);
    }

    #[tokio::test]
    async fn test_compromised_host() {
        let (_tmp, host) = fake_host(
            STATUS_TRACED_ROOT,
            "/tmp/re.frida.server/frida-agent-64.so\n",
            Some("QEMU"),
        );
        assert!(host.is_debugger_attached().await.expect("debugger"));
        assert!(host.is_rooted().await.expect("root"));
        assert!(host.is_emulator().await.expect("emulator"));
        assert!(host.is_instrumented().await.expect("hooking"));
    }

    #[tokio::test]
    async fn test_signature_is_executable_digest() {
        let (_tmp, host) = fake_host(STATUS_CLEAN, "", None);
        let digest = host
            .signature_sha256()
            .await
            .expect("signature")
            .expect("digest present");
        assert_eq!(digest, hex::encode(Sha256::digest(b"binary")));
        assert_eq!(digest.len(), 64);
    }

    #[tokio::test]
    async fn test_missing_proc_reports_nothing() {
        let tmp = tempfile::TempDir::new().expect("create temp dir");
        let host =
            HostIntrospector::with_roots(tmp.path().join("proc"), tmp.path().join("sys"), None);
        assert!(!host.is_debugger_attached().await.expect("debugger"));
        assert!(!host.is_rooted().await.expect("root"));
        assert_eq!(host.signature_sha256().await.expect("signature"), None);
    }

    #[tokio::test]
    async fn test_malformed_status_is_error() {
        let (_tmp, host) = fake_host("Name:\tx\n", "", None);
        assert!(matches!(
            host.is_debugger_attached().await,
            Err(IntegrityError::Introspection(_))
        ));
    }
}
