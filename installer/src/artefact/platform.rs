//! Platform identifiers used to select a release file.
//!
//! The release index names operating systems and architectures with Go's
//! own identifiers (`darwin`, `amd64`, `armv6l`, ...). This module provides
//! validated enums for the request side, host detection, and the alias
//! table that rewrites a requested architecture before matching.

use super::error::{ArtefactError, Result};
use std::fmt;
use std::str::FromStr;

/// Architecture aliases applied before matching against the index.
///
/// The index publishes 32-bit ARM builds only as `armv6l`, so a request for
/// plain `arm` must be rewritten. Add rows here rather than special-casing
/// call sites.
const ARCH_ALIASES: &[(Arch, Arch)] = &[(Arch::Arm, Arch::Armv6l)];

macro_rules! identifier_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $label:literal {
            $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// Every accepted value, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Return the identifier as it appears in the release index.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl FromStr for $name {
            type Err = ArtefactError;

            fn from_str(value: &str) -> Result<Self> {
                match value {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(ArtefactError::UnsupportedPlatform {
                        kind: $label,
                        value: value.to_owned(),
                        expected: Self::ALL
                            .iter()
                            .map(|v| v.as_str())
                            .collect::<Vec<_>>()
                            .join(", "),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

identifier_enum! {
    /// Operating systems the release index publishes files for.
    Os, "operating system" {
        /// IBM AIX.
        Aix => "aix",
        /// Android.
        Android => "android",
        /// macOS.
        Darwin => "darwin",
        /// DragonFly BSD.
        Dragonfly => "dragonfly",
        /// FreeBSD.
        Freebsd => "freebsd",
        /// illumos.
        Illumos => "illumos",
        /// iOS.
        Ios => "ios",
        /// Linux.
        Linux => "linux",
        /// NetBSD.
        Netbsd => "netbsd",
        /// OpenBSD.
        Openbsd => "openbsd",
        /// Plan 9.
        Plan9 => "plan9",
        /// Solaris.
        Solaris => "solaris",
        /// Windows.
        Windows => "windows",
    }
}

identifier_enum! {
    /// CPU architectures the release index publishes files for.
    Arch, "architecture" {
        /// 32-bit x86.
        X86 => "386",
        /// 64-bit x86.
        Amd64 => "amd64",
        /// 32-bit ARM; rewritten to `armv6l` before matching.
        Arm => "arm",
        /// 32-bit ARMv6 with hard float.
        Armv6l => "armv6l",
        /// 64-bit ARM.
        Arm64 => "arm64",
        /// 64-bit LoongArch.
        Loong64 => "loong64",
        /// 32-bit MIPS, big-endian.
        Mips => "mips",
        /// 32-bit MIPS, little-endian.
        Mipsle => "mipsle",
        /// 64-bit MIPS, big-endian.
        Mips64 => "mips64",
        /// 64-bit MIPS, little-endian.
        Mips64le => "mips64le",
        /// 64-bit POWER, big-endian.
        Ppc64 => "ppc64",
        /// 64-bit POWER, little-endian.
        Ppc64le => "ppc64le",
        /// 64-bit RISC-V.
        Riscv64 => "riscv64",
        /// IBM Z.
        S390x => "s390x",
    }
}

identifier_enum! {
    /// Packaging form of a release file.
    #[derive(Default)]
    Kind, "kind" {
        /// A `.tar.gz` or `.zip` archive.
        #[default]
        Archive => "archive",
        /// A platform installer package (`.pkg`, `.msi`).
        Installer => "installer",
    }
}

impl Os {
    /// Map the running host's operating system to its index identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ArtefactError::UnsupportedPlatform`] when the host OS has no
    /// counterpart in the index.
    pub fn host() -> Result<Self> {
        Self::from_rust_os(std::env::consts::OS)
    }

    /// Map a Rust `target_os` name to its index identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ArtefactError::UnsupportedPlatform`] for unknown names.
    pub fn from_rust_os(os: &str) -> Result<Self> {
        match os {
            "macos" => Ok(Self::Darwin),
            other => other.parse(),
        }
    }
}

impl Arch {
    /// Map the running host's architecture to its index identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ArtefactError::UnsupportedPlatform`] when the host
    /// architecture has no counterpart in the index.
    pub fn host() -> Result<Self> {
        Self::from_rust_arch(std::env::consts::ARCH)
    }

    /// Map a Rust `target_arch` name to its index identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ArtefactError::UnsupportedPlatform`] for unknown names.
    pub fn from_rust_arch(arch: &str) -> Result<Self> {
        match arch {
            "x86" => Ok(Self::X86),
            "x86_64" => Ok(Self::Amd64),
            "aarch64" => Ok(Self::Arm64),
            "loongarch64" => Ok(Self::Loong64),
            "powerpc64" => Ok(Self::Ppc64),
            "s390x" => Ok(Self::S390x),
            "riscv64" => Ok(Self::Riscv64),
            other => other.parse(),
        }
    }

    /// Apply the alias table, returning the architecture to match against.
    ///
    /// # Examples
    ///
    /// ```
    /// use getgo::artefact::platform::Arch;
    ///
    /// assert_eq!(Arch::Arm.normalized(), Arch::Armv6l);
    /// assert_eq!(Arch::Amd64.normalized(), Arch::Amd64);
    /// ```
    #[must_use]
    pub fn normalized(self) -> Self {
        ARCH_ALIASES
            .iter()
            .find(|(from, _)| *from == self)
            .map_or(self, |(_, to)| *to)
    }
}
