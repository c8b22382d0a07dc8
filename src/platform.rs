//! Build platform detection.

/// RPM architecture of the build host, used to select content sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arch {
    X86_64,
    Aarch64,
    Ppc64le,
    S390x,
    Unknown(String),
}

impl Arch {
    pub fn current() -> Self {
        match std::env::consts::ARCH {
            "x86_64" => Arch::X86_64,
            "aarch64" => Arch::Aarch64,
            "powerpc64" => Arch::Ppc64le,
            "s390x" => Arch::S390x,
            other => Arch::Unknown(other.to_string()),
        }
    }

    /// The RPM architecture name, as used for content-set keys.
    pub fn as_str(&self) -> &str {
        match self {
            Arch::X86_64 => "x86_64",
            Arch::Aarch64 => "aarch64",
            Arch::Ppc64le => "ppc64le",
            Arch::S390x => "s390x",
            Arch::Unknown(value) => value.as_str(),
        }
    }
}
