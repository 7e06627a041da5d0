/// One entry of the asset format history.
struct FormatVersion {
    version: &'static str,
    // assets written before this version cannot be read by it
    breaking: bool,
}

// oldest first, the last entry is the current version
const FORMAT_HISTORY: &[FormatVersion] = &[
    // initial
    FormatVersion {
        version: "0.0",
        breaking: false,
    },
    // options.premultiplied_alpha, independent life values, fixed_seed
    FormatVersion {
        version: "0.1",
        breaking: false,
    },
];

/// How an asset's `confetti_version` relates to the current format version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionStatus {
    /// Written by the current format version.
    Current,
    /// Written by an older version that loads unchanged.
    Outdated {
        /// The version found in the asset.
        found: String,
        /// The current format version.
        current: &'static str,
    },
    /// Written by an older version separated from the current one by a breaking change.
    Incompatible {
        /// The version found in the asset.
        found: String,
        /// The current format version.
        current: &'static str,
    },
    /// Not a known version, possibly written by a newer release.
    Unknown,
}

impl VersionStatus {
    /// Whether an asset with this status can be used.
    pub fn is_loadable(&self) -> bool {
        matches!(self, Self::Current | Self::Outdated { .. })
    }
}

/// The format version new assets are written with.
pub fn current_format_version() -> &'static str {
    FORMAT_HISTORY
        .last()
        .map(|entry| entry.version)
        .unwrap_or_default()
}

/// Classifies `version` against the current format version.
pub fn validate_version(version: &str) -> VersionStatus {
    let Some(index) = FORMAT_HISTORY.iter().position(|v| v.version == version) else {
        return VersionStatus::Unknown;
    };
    let current = current_format_version();
    let newer = &FORMAT_HISTORY[index + 1..];
    if newer.is_empty() {
        VersionStatus::Current
    } else if newer.iter().any(|v| v.breaking) {
        VersionStatus::Incompatible {
            found: version.to_string(),
            current,
        }
    } else {
        VersionStatus::Outdated {
            found: version.to_string(),
            current,
        }
    }
}
