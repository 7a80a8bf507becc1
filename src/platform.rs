//! Platform.
//!
//! This module maps the host's operating system and architecture to the pinned java distribution.

use reqwest::Url;
use semver::Version;
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// The pinned release of the java distribution (build number as build metadata).
pub(crate) const JDK_VERSION: &str = "11.0.18+10";

/// The default base URL of the release downloads.
pub(crate) const DOWNLOAD_BASE: &str = "https://github.com/adoptium/temurin11-binaries/releases/download/";

// The prefix of all release artifacts.
#[doc(hidden)]
const ARTIFACT_PREFIX: &str = "OpenJDK11U-jdk";

// The flavour of the JVM contained in the release artifacts.
#[doc(hidden)]
const ARTIFACT_JVM: &str = "hotspot";

// The parsed pinned release.
#[doc(hidden)]
static PINNED_VERSION: LazyLock<Version> = LazyLock::new(|| Version::parse(JDK_VERSION).unwrap_or_else(|_| Version::new(11, 0, 18)));

// The supported matrix: (os family, architecture as reported by the host, distribution tag).
#[doc(hidden)]
const DISTRIBUTIONS: &[(OsFamily, &str, &str)] = &[
    (OsFamily::MacOs, "x86_64", "x64_mac"),
    (OsFamily::MacOs, "arm64", "aarch64_mac"),
    (OsFamily::Linux, "x86_64", "x64_linux"),
    (OsFamily::Linux, "aarch64", "aarch64_linux"),
    (OsFamily::Windows, "amd64", "x64_windows"),
    (OsFamily::Windows, "x86_64", "x64_windows"),
    (OsFamily::Windows, "x86", "x86-32_windows"),
    (OsFamily::Windows, "x86-32", "x86-32_windows"),
];

/// The error type for the platform detection.
#[derive(Debug, PartialEq, thiserror::Error)]
pub(crate) enum PlatformError {
    /// The operating system is not supported at all.
    #[error("Unsupported platform '{0}'.")]
    UnsupportedPlatform(String),
    /// The operating system is supported but not on the given architecture.
    #[error("Unsupported architecture '{arch}' on {os}.")]
    UnsupportedArchitecture { os: OsFamily, arch: String },
}

/// Enumeration of supported operating system families.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum OsFamily {
    /// macOS
    MacOs,
    /// Linux
    Linux,
    /// Windows
    Windows,
}

impl OsFamily {
    /// Whether the family uses a shell profile rather than the registry for its environment.
    pub(crate) fn is_unix_like(self) -> bool {
        !matches!(self, Self::Windows)
    }
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MacOs => "macOS",
            Self::Linux => "Linux",
            Self::Windows => "Windows",
        };
        write!(f, "{name}")
    }
}

impl TryFrom<&str> for OsFamily {
    type Error = PlatformError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "darwin" | "macos" => Ok(Self::MacOs),
            "linux" => Ok(Self::Linux),
            "windows" => Ok(Self::Windows),
            _ => Err(PlatformError::UnsupportedPlatform(value.to_string())),
        }
    }
}

/// The archive format a distribution is shipped in.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum ArchiveFormat {
    /// A gzip-compressed tar stream.
    TarGz,
    /// A zip container.
    Zip,
}

impl ArchiveFormat {
    /// Returns the file extension of the format.
    pub(crate) fn ext(self) -> &'static str {
        match self {
            Self::TarGz => "tar.gz",
            Self::Zip => "zip",
        }
    }
}

/// The operating system and architecture as reported by the host.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct HostPlatform {
    pub(crate) os: String,
    pub(crate) arch: String,
}

impl HostPlatform {
    /// Creates a new `HostPlatform` from the given reported names.
    pub(crate) fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self { os: os.into(), arch: arch.into() }
    }

    /// Returns the platform of the running host, named the way the host reports itself (uname-style).
    pub(crate) fn current() -> Self {
        let os = match env::consts::OS {
            "macos" => "Darwin",
            "linux" => "Linux",
            "windows" => "Windows",
            other => other,
        };
        let arch = match (env::consts::OS, env::consts::ARCH) {
            ("macos", "aarch64") => "arm64",
            ("windows", "x86_64") => "AMD64",
            (_, arch) => arch,
        };

        Self::new(os, arch)
    }

    /// Selects the distribution for this platform.
    pub(crate) fn detect(&self) -> Result<Distribution, PlatformError> {
        detect(&self.os, &self.arch)
    }
}

impl fmt::Display for HostPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}

/// Selects the distribution for the given reported operating system and architecture.
pub(crate) fn detect(os: &str, arch: &str) -> Result<Distribution, PlatformError> {
    let os = OsFamily::try_from(os)?;
    let arch_lc = arch.trim().to_lowercase();
    let Some((_, _, tag)) = DISTRIBUTIONS.iter().find(|(family, name, _)| *family == os && *name == arch_lc) else {
        return Err(PlatformError::UnsupportedArchitecture { os, arch: arch.to_string() });
    };

    Ok(Distribution {
        os,
        tag: *tag,
        version: PINNED_VERSION.clone(),
    })
}

/// The java distribution selected for a platform.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Distribution {
    pub(crate) os: OsFamily,
    pub(crate) tag: &'static str,
    pub(crate) version: Version,
}

impl Distribution {
    /// Returns the archive format the distribution is shipped in.
    pub(crate) fn format(&self) -> ArchiveFormat {
        match self.os {
            OsFamily::Windows => ArchiveFormat::Zip,
            OsFamily::MacOs | OsFamily::Linux => ArchiveFormat::TarGz,
        }
    }

    /// Returns the name of the release artifact, e.g. `OpenJDK11U-jdk_x64_linux_hotspot_11.0.18_10.tar.gz`.
    pub(crate) fn artifact(&self) -> String {
        let tag = self.tag;
        let version = self.version_with('_');
        let ext = self.format().ext();
        format!("{ARTIFACT_PREFIX}_{tag}_{ARTIFACT_JVM}_{version}.{ext}")
    }

    /// Returns the download URL of the release artifact below the given base URL.
    pub(crate) fn download_url(&self, base: &str) -> anyhow::Result<Url> {
        let base = if base.ends_with('/') { base.to_string() } else { format!("{base}/") };
        let release = format!("jdk-{}/", self.version_with_encoded_build());
        let url = Url::parse(&base)?.join(&release)?.join(&self.artifact())?;

        Ok(url)
    }

    /// Returns the file name of the archive on disc.
    pub(crate) fn archive_name(&self) -> String {
        format!("jdk.{}", self.format().ext())
    }

    /// Returns the name of the top-level directory within the archive.
    pub(crate) fn root_dir_name(&self) -> String {
        format!("jdk-{}", self.version_with('+'))
    }

    /// Returns the java home of the distribution once extracted into the given install directory.
    pub(crate) fn java_home(&self, install_dir: &Path) -> PathBuf {
        let root = install_dir.join(self.root_dir_name());
        match self.os {
            // macOS archives contain a bundle
            OsFamily::MacOs => root.join("Contents").join("Home"),
            OsFamily::Linux | OsFamily::Windows => root,
        }
    }

    /// Returns the name of the java executable.
    pub(crate) fn java_exe(&self) -> &'static str {
        match self.os {
            OsFamily::Windows => "java.exe",
            OsFamily::MacOs | OsFamily::Linux => "java",
        }
    }

    // Renders the version with the build number joined by the given separator.
    #[doc(hidden)]
    fn version_with(&self, sep: char) -> String {
        let Version { major, minor, patch, .. } = &self.version;
        if self.version.build.is_empty() {
            format!("{major}.{minor}.{patch}")
        } else {
            format!("{major}.{minor}.{patch}{sep}{}", self.version.build)
        }
    }

    // Renders the version the way it appears in the release tag of the URL.
    #[doc(hidden)]
    fn version_with_encoded_build(&self) -> String {
        self.version_with('+').replace('+', "%2B")
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "jdk {} [{}]", self.version, self.tag)
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use test_log::test;

    #[test]
    fn supported_matrix() {
        let matrix = [
            ("Darwin", "x86_64", "x64_mac", "tar.gz"),
            ("Darwin", "arm64", "aarch64_mac", "tar.gz"),
            ("Linux", "x86_64", "x64_linux", "tar.gz"),
            ("Linux", "aarch64", "aarch64_linux", "tar.gz"),
            ("Windows", "AMD64", "x64_windows", "zip"),
            ("Windows", "x86", "x86-32_windows", "zip"),
        ];
        for (os, arch, tag, ext) in matrix {
            let distribution = detect(os, arch).unwrap();
            assert_eq!(tag, distribution.tag);
            assert!(distribution.artifact().contains(tag));
            assert!(distribution.artifact().ends_with(ext));
            assert_eq!(format!("jdk.{ext}"), distribution.archive_name());
        }
    }

    #[test]
    fn unsupported_architecture() {
        let err = detect("Linux", "riscv64").unwrap_err();
        assert_eq!(
            PlatformError::UnsupportedArchitecture {
                os: OsFamily::Linux,
                arch: "riscv64".to_string()
            },
            err
        );
        assert!(err.to_string().starts_with("Unsupported architecture"));
    }

    #[test]
    fn architecture_of_other_os_is_unsupported() {
        assert!(detect("Darwin", "aarch64").is_err());
        assert!(detect("Linux", "arm64").is_err());
        assert!(detect("Windows", "aarch64").is_err());
    }

    #[test]
    fn unsupported_platform() {
        let err = detect("FreeBSD", "x86_64").unwrap_err();
        assert_eq!(PlatformError::UnsupportedPlatform("FreeBSD".to_string()), err);
    }

    #[test]
    fn darwin_arm64() {
        let distribution = HostPlatform::new("Darwin", "arm64").detect().unwrap();
        assert_eq!("aarch64_mac", distribution.tag);
        assert_eq!(JDK_VERSION, distribution.version.to_string());
        assert_eq!("OpenJDK11U-jdk_aarch64_mac_hotspot_11.0.18_10.tar.gz", distribution.artifact());
        let java_home = distribution.java_home(Path::new("/home/u/jdk"));
        assert_eq!(Path::new("/home/u/jdk/jdk-11.0.18+10/Contents/Home"), java_home);
    }

    #[test]
    fn download_url() {
        let distribution = detect("linux", "x86_64").unwrap();
        let url = distribution.download_url(DOWNLOAD_BASE).unwrap();
        assert_eq!(
            "https://github.com/adoptium/temurin11-binaries/releases/download/jdk-11.0.18%2B10/OpenJDK11U-jdk_x64_linux_hotspot_11.0.18_10.tar.gz",
            url.as_str()
        );
    }

    #[test]
    fn download_url_without_trailing_slash() {
        let distribution = detect("Windows", "AMD64").unwrap();
        let url = distribution.download_url("https://mirror.example.org/temurin").unwrap();
        assert_eq!("https://mirror.example.org/temurin/jdk-11.0.18%2B10/OpenJDK11U-jdk_x64_windows_hotspot_11.0.18_10.zip", url.as_str());
    }

    #[test]
    fn java_home_on_linux() {
        let distribution = detect("Linux", "aarch64").unwrap();
        assert_eq!(Path::new("/root/jdk/jdk-11.0.18+10"), distribution.java_home(Path::new("/root/jdk")));
        assert_eq!("java", distribution.java_exe());
    }

    #[test]
    fn current_host_is_named_like_uname() {
        let host = HostPlatform::current();
        assert_ne!("macos", host.os);
        if cfg!(target_os = "linux") {
            assert_eq!("Linux", host.os);
        }
    }
}
