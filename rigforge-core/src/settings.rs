//! Clap-free settings for the build pipeline.

use camino::Utf8PathBuf;
use rigforge_domain::SynthesisConfig;

/// Run mode controls exit-code semantics.
///
/// In `Strict` mode a build that is over budget, incompatible or missing a required
/// category is a policy block (exit 2). `Advisory` reports the same conditions in the
/// report verdict and exits 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RunMode {
    #[default]
    Advisory,
    Strict,
}

/// Settings for the build pipeline.
#[derive(Debug, Clone)]
pub struct BuildSettings {
    pub out_dir: Utf8PathBuf,

    /// Overrides the profile id carried by (or suggested for) the request.
    pub profile_id: Option<String>,

    pub synthesis: SynthesisConfig,

    pub mode: RunMode,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            out_dir: Utf8PathBuf::from("artifacts/rigforge"),
            profile_id: None,
            synthesis: SynthesisConfig::default(),
            mode: RunMode::default(),
        }
    }
}
