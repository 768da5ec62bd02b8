//! Platform detection for release asset selection

use once_cell::sync::OnceCell;

use crate::error::ProvisionError;

/// Archive container restic publishes for a platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// Single bzip2 stream holding the bare executable
    Bzip2,
    /// Zip container with the executable as one entry (Windows)
    Zip,
}

impl ArchiveFormat {
    /// File extension used in asset names, including the dot
    pub fn extension(&self) -> &'static str {
        match self {
            ArchiveFormat::Bzip2 => ".bz2",
            ArchiveFormat::Zip => ".zip",
        }
    }
}

/// Operating system and architecture in restic's release naming
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    pub os: &'static str,
    pub arch: &'static str,
}

/// Global cache for platform detection (initialized once, used everywhere)
static PLATFORM_CACHE: OnceCell<Platform> = OnceCell::new();

impl Platform {
    pub const fn new(os: &'static str, arch: &'static str) -> Self {
        Self { os, arch }
    }

    /// Detect current platform (cached after first call)
    pub fn detect() -> Result<Self, ProvisionError> {
        PLATFORM_CACHE
            .get_or_try_init(|| {
                Self::from_target(
                    std::env::consts::OS,
                    std::env::consts::ARCH,
                    cfg!(target_endian = "little"),
                )
            })
            .copied()
    }

    /// Map Rust's target names onto the Go-style names restic uses,
    /// assuming a little-endian target
    pub fn from_rust(os: &str, arch: &str) -> Result<Self, ProvisionError> {
        Self::from_target(os, arch, true)
    }

    /// Rust shares one `target_arch` between endiannesses where Go does not
    pub fn from_target(os: &str, arch: &str, little_endian: bool) -> Result<Self, ProvisionError> {
        let unsupported = || ProvisionError::UnsupportedPlatform {
            os: os.to_string(),
            arch: arch.to_string(),
        };

        let os = match os {
            "linux" => "linux",
            "macos" => "darwin",
            "windows" => "windows",
            "freebsd" => "freebsd",
            "openbsd" => "openbsd",
            "netbsd" => "netbsd",
            "solaris" => "solaris",
            _ => return Err(unsupported()),
        };
        let arch = match (arch, little_endian) {
            ("x86_64", _) => "amd64",
            ("x86", _) => "386",
            ("aarch64", _) => "arm64",
            ("arm", _) => "arm",
            // restic publishes no big-endian ppc64 build
            ("powerpc64", true) => "ppc64le",
            ("mips", true) => "mipsle",
            ("mips", false) => "mips",
            ("mips64", true) => "mips64le",
            ("mips64", false) => "mips64",
            ("s390x", _) => "s390x",
            ("riscv64", _) => "riscv64",
            _ => return Err(unsupported()),
        };
        Ok(Self { os, arch })
    }

    pub fn is_windows(&self) -> bool {
        self.os == "windows"
    }

    /// Windows lacks a native bzip2 tool, so restic ships zip there
    pub fn archive_format(&self) -> ArchiveFormat {
        if self.is_windows() {
            ArchiveFormat::Zip
        } else {
            ArchiveFormat::Bzip2
        }
    }

    /// Executable file name for `tool` on this platform
    pub fn executable_name(&self, tool: &str) -> String {
        if self.is_windows() {
            format!("{tool}.exe")
        } else {
            tool.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_rust_names_to_release_names() {
        assert_eq!(
            Platform::from_rust("macos", "aarch64").unwrap(),
            Platform::new("darwin", "arm64")
        );
        assert_eq!(
            Platform::from_rust("linux", "x86_64").unwrap(),
            Platform::new("linux", "amd64")
        );
        assert_eq!(
            Platform::from_rust("windows", "x86").unwrap(),
            Platform::new("windows", "386")
        );
    }

    #[test]
    fn endianness_selects_the_matching_build() {
        assert_eq!(Platform::from_target("linux", "mips", true).unwrap().arch, "mipsle");
        assert_eq!(Platform::from_target("linux", "mips", false).unwrap().arch, "mips");
        assert_eq!(Platform::from_target("linux", "mips64", true).unwrap().arch, "mips64le");
        assert_eq!(Platform::from_target("linux", "mips64", false).unwrap().arch, "mips64");
        assert_eq!(Platform::from_target("linux", "powerpc64", true).unwrap().arch, "ppc64le");
        assert!(matches!(
            Platform::from_target("linux", "powerpc64", false),
            Err(ProvisionError::UnsupportedPlatform { .. })
        ));
    }

    #[test]
    fn rejects_unknown_targets() {
        let err = Platform::from_rust("haiku", "x86_64").unwrap_err();
        assert!(matches!(err, ProvisionError::UnsupportedPlatform { .. }));
        assert!(Platform::from_rust("linux", "sparc64").is_err());
    }

    #[test]
    fn only_windows_uses_zip_and_exe() {
        let windows = Platform::new("windows", "amd64");
        assert_eq!(windows.archive_format(), ArchiveFormat::Zip);
        assert_eq!(windows.executable_name("restic"), "restic.exe");

        let linux = Platform::new("linux", "arm64");
        assert_eq!(linux.archive_format(), ArchiveFormat::Bzip2);
        assert_eq!(linux.executable_name("restic"), "restic");
        assert_eq!(linux.archive_format().extension(), ".bz2");
    }
}
