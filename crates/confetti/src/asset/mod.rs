pub(crate) mod serde_helpers;
/// The line-oriented emitter text format.
pub mod text_format;
/// Asset format version tracking and compatibility validation.
pub mod versioning;

use bevy::{
    asset::{AssetLoader, LoadContext, io::Reader},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::EmitterConfig;
use crate::effect::ParticleEffect;
use crate::error::ConfigError;
use text_format::FormatError;
use versioning::{VersionStatus, current_format_version};

/// Asset loader for [`ParticleEffectAsset`] files in RON format.
#[derive(Default, TypePath)]
pub struct ParticleEffectAssetLoader;

/// Asset loader for [`ParticleEffectAsset`] files in the emitter text format
/// (see [`text_format`]).
#[derive(Default, TypePath)]
pub struct ParticleTextAssetLoader;

/// Errors that can occur when loading a [`ParticleEffectAsset`].
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ParticleEffectAssetLoaderError {
    /// An I/O error occurred while reading the asset file.
    #[error("Could not load asset: {0}")]
    Io(#[from] std::io::Error),
    /// The asset file contained invalid RON syntax.
    #[error("Could not parse RON: {0}")]
    Ron(#[from] ron::error::SpannedError),
    /// A text format file was not valid UTF-8.
    #[error("Could not read text: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    /// A text format file was malformed.
    #[error("Could not parse emitter text: {0}")]
    Format(#[from] FormatError),
    /// An emitter's configuration is invalid.
    #[error("Invalid emitter configuration: {0}")]
    Config(#[from] ConfigError),
    /// The asset file has an unknown format version, likely from a newer confetti.
    #[error("Unknown confetti_version. You may need a newer version of confetti.")]
    UnknownVersion,
    /// The asset file has a version that requires breaking changes to upgrade.
    #[error(
        "Asset version \"{found}\" is incompatible with current version \"{current}\". Manual migration is required."
    )]
    IncompatibleVersion {
        /// The version found in the asset file.
        found: String,
        /// The current format version.
        current: String,
    },
}

impl AssetLoader for ParticleEffectAssetLoader {
    type Asset = ParticleEffectAsset;
    type Settings = ();
    type Error = ParticleEffectAssetLoaderError;

    async fn load(
        &self,
        reader: &mut dyn Reader,
        _settings: &(),
        load_context: &mut LoadContext<'_>,
    ) -> Result<Self::Asset, Self::Error> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes).await?;
        let mut asset = ron::de::from_bytes::<ParticleEffectAsset>(&bytes)?;

        match asset.try_upgrade_version() {
            VersionStatus::Current => {}
            VersionStatus::Outdated { found, current } => {
                let path = load_context.path();
                warn!(
                    "{path:?}: loaded asset with confetti_version \"{found}\", current is \"{current}\""
                );
            }
            VersionStatus::Incompatible { found, current } => {
                return Err(ParticleEffectAssetLoaderError::IncompatibleVersion {
                    found,
                    current: current.to_string(),
                });
            }
            VersionStatus::Unknown => {
                return Err(ParticleEffectAssetLoaderError::UnknownVersion);
            }
        }

        asset.prepare()?;
        Ok(asset)
    }

    fn extensions(&self) -> &[&str] {
        &["ron"]
    }
}

impl AssetLoader for ParticleTextAssetLoader {
    type Asset = ParticleEffectAsset;
    type Settings = ();
    type Error = ParticleEffectAssetLoaderError;

    async fn load(
        &self,
        reader: &mut dyn Reader,
        _settings: &(),
        _load_context: &mut LoadContext<'_>,
    ) -> Result<Self::Asset, Self::Error> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes).await?;
        let text = std::str::from_utf8(&bytes)?;
        let emitters = text_format::load_effect(text)?;
        // the text format has no effect name of its own
        let name = emitters
            .first()
            .map(|emitter| emitter.name.clone())
            .unwrap_or_default();

        let mut asset = ParticleEffectAsset::new(name, emitters);
        asset.prepare()?;
        Ok(asset)
    }

    fn extensions(&self) -> &[&str] {
        &["p"]
    }
}

/// A complete particle effect asset, loadable from RON or emitter text files.
///
/// Holds the configuration of every emitter in the effect. Load this asset and
/// reference it from a [`ParticleEffect2D`](crate::ParticleEffect2D) component
/// to simulate the effect, or build a [`ParticleEffect`] from it directly with
/// [`instantiate`](Self::instantiate).
#[derive(Asset, TypePath, Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParticleEffectAsset {
    confetti_version: String,
    /// Display name for this effect.
    pub name: String,
    /// The emitters that make up this effect, in draw order.
    pub emitters: Vec<EmitterConfig>,
}

impl ParticleEffectAsset {
    /// Creates a new effect asset with the current format version.
    pub fn new(name: impl Into<String>, emitters: Vec<EmitterConfig>) -> Self {
        Self {
            confetti_version: current_format_version().to_string(),
            name: name.into(),
            emitters,
        }
    }

    /// The format version this asset was written with.
    pub fn confetti_version(&self) -> &str {
        &self.confetti_version
    }

    /// Validates this asset's `confetti_version` against the current format version.
    ///
    /// If the version is outdated but compatible, it is automatically upgraded.
    /// Returns the original [`VersionStatus`] so the caller can react accordingly.
    pub fn try_upgrade_version(&mut self) -> VersionStatus {
        let status = versioning::validate_version(&self.confetti_version);
        if matches!(status, VersionStatus::Outdated { .. }) {
            self.confetti_version = current_format_version().to_string();
        }
        status
    }

    /// Flags required attributes of every emitter and validates them.
    pub fn prepare(&mut self) -> Result<(), ConfigError> {
        for emitter in &mut self.emitters {
            emitter.mark_required();
            emitter.validate()?;
        }
        Ok(())
    }

    /// Builds a fresh, unstarted effect from this asset.
    pub fn instantiate(&self) -> Result<ParticleEffect, ConfigError> {
        ParticleEffect::from_configs(self.emitters.iter().cloned())
    }

    /// Writes this asset as pretty RON.
    pub fn to_ron(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
    }
}
