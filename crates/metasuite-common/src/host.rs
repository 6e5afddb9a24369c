//! Identity of the host a suite is resolved on.
//!
//! [`HostInfo`] is captured once by the caller and handed to the resolver,
//! which exposes its fields as default interpolation context. The resolver
//! itself never reads process state.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// The five `uname` fields visible to configuration templates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HostInfo {
    /// Kernel name, e.g. `Linux`.
    pub kernel_name: String,
    /// Network host name.
    pub host_name: String,
    /// Kernel release, e.g. `6.1.0-13-amd64`.
    pub kernel_version: String,
    /// Kernel build / vendor string.
    pub vendor_string: String,
    /// Hardware architecture, e.g. `x86_64`.
    pub machine: String,
}

impl HostInfo {
    /// Reads the identity of the running host.
    ///
    /// # Errors
    ///
    /// Returns an error if the `uname` system call fails.
    #[cfg(unix)]
    pub fn capture() -> Result<Self> {
        let uts = nix::sys::utsname::uname().map_err(|errno| crate::error::MetasuiteError::Io {
            path: "uname".into(),
            source: std::io::Error::from(errno),
        })?;
        Ok(Self {
            kernel_name: uts.sysname().to_string_lossy().into_owned(),
            host_name: uts.nodename().to_string_lossy().into_owned(),
            kernel_version: uts.release().to_string_lossy().into_owned(),
            vendor_string: uts.version().to_string_lossy().into_owned(),
            machine: uts.machine().to_string_lossy().into_owned(),
        })
    }

    /// Reads what the standard library knows about the running host.
    ///
    /// # Errors
    ///
    /// Never fails on this platform; the signature matches the unix variant.
    #[cfg(not(unix))]
    pub fn capture() -> Result<Self> {
        Ok(Self {
            kernel_name: std::env::consts::OS.to_owned(),
            host_name: std::env::var("COMPUTERNAME").unwrap_or_default(),
            kernel_version: String::new(),
            vendor_string: String::new(),
            machine: std::env::consts::ARCH.to_owned(),
        })
    }

    /// Template keys paired with their values, in `uname` order.
    pub fn entries(&self) -> [(&'static str, &str); 5] {
        [
            ("kernelname", &self.kernel_name),
            ("hostname", &self.host_name),
            ("kernelversion", &self.kernel_version),
            ("vendorstring", &self.vendor_string),
            ("machine", &self.machine),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_use_template_keys() {
        let host = HostInfo {
            kernel_name: "Linux".into(),
            host_name: "builder".into(),
            kernel_version: "6.1.0".into(),
            vendor_string: "#1 SMP".into(),
            machine: "x86_64".into(),
        };
        let keys: Vec<&str> = host.entries().iter().map(|(k, _)| *k).collect();
        assert_eq!(
            keys,
            vec!["kernelname", "hostname", "kernelversion", "vendorstring", "machine"]
        );
        assert_eq!(host.entries()[4].1, "x86_64");
    }

    #[test]
    fn capture_reports_a_kernel_and_machine() {
        let host = HostInfo::capture().expect("uname should succeed");
        assert!(!host.kernel_name.is_empty());
        assert!(!host.machine.is_empty());
    }
}
