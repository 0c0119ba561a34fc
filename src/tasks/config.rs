/* ************************************************************************ **
** This file is part of rla, and is licensed under EITHER the MIT license   **
** or the Apache 2.0 license, at your option.                               **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
** ************************************************************************ */

//! Settings read from the `--config` YAML file.
//!
//! Every field has a default, so an empty file (or no file at all) is valid.
//!
//! ```yaml
//! threads: 4
//! orthonormalize:
//!   rank-rtol: 1e-12
//! factorization:
//!   kind: svd          # qr | svd | eigh
//! threshold: 1e-14     # zero tiny entries of every output
//! ```

use crate::FailResult;
use ::failure::{Error, ResultExt};
use ::serde::de;
use ::std::fs::File;
use ::std::ops::Deref;
use ::std::path::Path;

/// Root settings object.
///
/// This is what you should deserialize.
#[derive(Serialize)]
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedSettings(pub Settings);

/// Raw deserialized form of settings.
///
/// You shouldn't deserialize this type directly; deserialize `ValidatedSettings` instead,
/// so that the values are checked.
#[derive(Serialize, Deserialize)]
#[derive(Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Settings {
    /// Size of the rayon thread pool.  `None` leaves it up to rayon.
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threads: Option<usize>,

    #[serde(default)]
    pub orthonormalize: OrthonormalizeSettings,

    #[serde(default)]
    pub factorization: FactorizationSettings,

    /// If set, every entry of an output matrix with `|x| < threshold` is
    /// written as zero.
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
}

#[derive(Serialize, Deserialize)]
#[derive(Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct OrthonormalizeSettings {
    /// See `rla_linalg::Orthonormalize::rank_rtol`.
    #[serde(default = "default_rank_rtol")]
    pub rank_rtol: f64,
}

fn default_rank_rtol() -> f64 { ::rla_linalg::orth::DEFAULT_RANK_RTOL }

impl Default for OrthonormalizeSettings {
    fn default() -> Self
    { OrthonormalizeSettings { rank_rtol: default_rank_rtol() } }
}

#[derive(Serialize, Deserialize)]
#[derive(Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FactorizationSettings {
    #[serde(default)]
    pub kind: FactorizationKind,
}

#[derive(Serialize, Deserialize)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum FactorizationKind {
    /// Compact QR.  Writes `q.bin` and `r.bin`.
    Qr,
    /// Economy SVD.  Writes `u.bin`, `s.bin` and `vt.bin`.
    Svd,
    /// Symmetric eigendecomposition of the upper triangle.
    /// Writes `eigenvectors.bin` and `eigenvalues.bin`.
    Eigh,
}

impl Default for FactorizationKind {
    fn default() -> Self { FactorizationKind::Qr }
}

impl Settings {
    pub fn validate(self) -> Result<ValidatedSettings, Error> {
        if self.threads == Some(0) {
            bail!("threads: must be at least 1 (or omitted)");
        }

        let rtol = self.orthonormalize.rank_rtol;
        ensure!(
            rtol.is_finite() && rtol >= 0.0,
            "orthonormalize.rank-rtol: expected a non-negative number, got {}", rtol,
        );

        if let Some(threshold) = self.threshold {
            ensure!(
                threshold.is_finite() && threshold >= 0.0,
                "threshold: expected a non-negative number, got {}", threshold,
            );
        }

        Ok(ValidatedSettings(self))
    }
}

impl<'de> de::Deserialize<'de> for ValidatedSettings {
    fn deserialize<D: de::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let cereal: Settings = de::Deserialize::deserialize(deserializer)?;

        cereal.validate().map_err(de::Error::custom)
    }
}

impl Default for ValidatedSettings {
    fn default() -> Self { ValidatedSettings(Default::default()) }
}

impl Deref for ValidatedSettings {
    type Target = Settings;

    fn deref(&self) -> &Settings { &self.0 }
}

impl ValidatedSettings {
    pub fn from_yaml_str(s: &str) -> FailResult<Self> {
        // serde_yaml rejects an empty document, but an empty config is fine
        if s.trim().is_empty() {
            return Ok(Default::default());
        }
        Ok(::serde_yaml::from_str(s)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> FailResult<Self> {
        let path = path.as_ref();
        let text = {
            use ::std::io::Read;

            let mut text = String::new();
            File::open(path)
                .and_then(|mut f| f.read_to_string(&mut text))
                .with_context(|e| format!("{}: {}", path.display(), e))?;
            text
        };
        let settings = ValidatedSettings::from_yaml_str(&text)
            .with_context(|e| format!("in config file {}: {}", path.display(), e))?;
        debug!("settings: {:?}", settings.0);
        Ok(settings)
    }
}
