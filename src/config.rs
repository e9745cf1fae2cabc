//! Layered engine configuration.

use serde::{Deserialize, Serialize};

use crate::primitives::params::check_bit_lengths;
use crate::{generate_parameters, GroupParameters, ProtocolVariant, Result};

/// Default subgroup order bit length `N`.
pub const DEFAULT_SUBGROUP_BITS: usize = 256;

/// Default modulus bit length `L`.
pub const DEFAULT_MODULUS_BITS: usize = 2048;

/// Default TOML file, overridable through `DLOG_CONFIG_PATH`.
pub const DEFAULT_CONFIG_PATH: &str = "config/dlog.toml";

/// Engine configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Bit length `N` of the subgroup order.
    pub subgroup_bits: usize,
    /// Bit length `L` of the modulus.
    pub modulus_bits: usize,
    /// Schnorr variant used by default.
    pub variant: ProtocolVariant,
    /// Fixed group; when absent a fresh group of the configured size is
    /// generated on demand.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<GroupParameters>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            subgroup_bits: DEFAULT_SUBGROUP_BITS,
            modulus_bits: DEFAULT_MODULUS_BITS,
            variant: ProtocolVariant::Zkpok,
            group: None,
        }
    }
}

impl EngineConfig {
    /// Loads configuration from `.env` file, TOML file, and environment variables.
    ///
    /// Configuration priority (highest to lowest):
    /// 1. Environment variables with `DLOG_` prefix, nested keys split by `__`
    /// 2. TOML configuration file (if exists)
    /// 3. Built-in defaults
    ///
    /// A `.env` file in the current directory or any parent is loaded into
    /// the environment first; it never overrides variables that are already
    /// set.
    ///
    /// The TOML file path can be set via `DLOG_CONFIG_PATH`; it defaults to
    /// `./config/dlog.toml` and is skipped when missing.
    ///
    /// Big integers are hex strings. Prefix them with `0x` in the environment
    /// so they are not read as decimal numbers.
    ///
    /// # Environment Variable Examples
    /// ```bash
    /// DLOG_SUBGROUP_BITS=160
    /// DLOG_MODULUS_BITS=1024
    /// DLOG_VARIANT=ZKPOK
    /// DLOG_GROUP__P=0x17
    /// DLOG_GROUP__Q=0x0b
    /// DLOG_GROUP__G=0x04
    /// ```
    ///
    /// # Errors
    /// Returns an error if a source is malformed or a value has the wrong type.
    #[allow(clippy::result_large_err)]
    pub fn from_env() -> figment::error::Result<Self> {
        // Missing .env is not an error.
        let _ = dotenvy::dotenv();

        let config_path =
            std::env::var("DLOG_CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::figment(&config_path).extract()
    }

    fn figment(config_path: &str) -> figment::Figment {
        use figment::providers::{Env, Format, Serialized, Toml};
        use figment::Figment;

        Figment::from(Serialized::defaults(EngineConfig::default()))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("DLOG_").split("__"))
    }

    /// Checks the bit-length preconditions.
    ///
    /// A fixed group needs no check here: it is only ever built, or
    /// deserialized, through [`GroupParameters::new`].
    ///
    /// # Errors
    /// [`Error::InvalidParameters`](crate::Error::InvalidParameters) naming the
    /// first violated condition.
    pub fn validate(&self) -> Result<()> {
        check_bit_lengths(self.subgroup_bits, self.modulus_bits)
    }

    /// Returns the fixed group, or generates one of the configured size.
    pub fn group_parameters(&self) -> Result<GroupParameters> {
        self.validate()?;
        match &self.group {
            Some(group) => Ok(group.clone()),
            None => generate_parameters(self.subgroup_bits, self.modulus_bits),
        }
    }
}
