//! Aggregated fabric configuration, loadable from TOML/YAML/JSON with
//! `${VAR}`/`$VAR` environment-variable substitution.
//!
//! Mirrors `mofa-kernel::config`'s loader: detect format from extension,
//! substitute environment variables in the raw text, then deserialize into
//! a flat file-shaped struct before converting it into the typed,
//! non-`Deserialize` runtime option structs each layer actually takes
//! (`TokenConfig` carries raw key bytes and isn't meant to round-trip
//! through a config file verbatim).

use crate::error::{FabricError, FabricResult};
use a2a_registry::RegistryConfig;
use a2a_security::{ReplayConfig, SecurityConfig, SigningAlgorithm, TokenConfig};
use a2a_transport::TransportConfig;
use a2a_types::ValidationConfig;
use config::{Config as RawConfig, File, FileFormat};
use regex::Regex;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// The on-disk shape. Every field has a sensible default so a deployment
/// only needs to override what differs from it.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FabricFileConfig {
    pub transport: TransportFileConfig,
    pub registry: RegistryFileConfig,
    pub security: SecurityFileConfig,
    pub policy: PolicyFileConfig,
}

impl Default for FabricFileConfig {
    fn default() -> Self {
        Self {
            transport: TransportFileConfig::default(),
            registry: RegistryFileConfig::default(),
            security: SecurityFileConfig::default(),
            policy: PolicyFileConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TransportFileConfig {
    pub validate_on_publish: bool,
    pub validate_on_subscribe: bool,
    pub max_redeliveries: u32,
    pub default_max_pending: usize,
    pub max_payload_depth: usize,
}

impl Default for TransportFileConfig {
    fn default() -> Self {
        let defaults = TransportConfig::default();
        Self {
            validate_on_publish: defaults.validate_on_publish,
            validate_on_subscribe: defaults.validate_on_subscribe,
            max_redeliveries: defaults.max_redeliveries,
            default_max_pending: defaults.default_max_pending,
            max_payload_depth: defaults.validation.max_payload_depth,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RegistryFileConfig {
    pub default_lease_duration_secs: u64,
    pub sweep_interval_secs: u64,
    /// Connection URL for the optional `sql` backend; unused by the
    /// in-memory store.
    pub connection_url: String,
}

impl Default for RegistryFileConfig {
    fn default() -> Self {
        let defaults = RegistryConfig::default();
        Self {
            default_lease_duration_secs: defaults.default_lease_duration.as_secs(),
            sweep_interval_secs: defaults.sweep_interval.as_secs(),
            connection_url: String::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SecurityFileConfig {
    pub bearer_secret: String,
    pub capability_secret: String,
    pub signing_secret: String,
    pub signing_algorithm: String,
    pub issuer: Option<String>,
    pub audience: Option<String>,
    pub leeway_secs: u64,
    pub replay_max_future_skew_secs: u64,
    pub replay_max_past_age_secs: u64,
    pub idempotency_ttl_secs: u64,
}

impl Default for SecurityFileConfig {
    fn default() -> Self {
        Self {
            bearer_secret: String::new(),
            capability_secret: String::new(),
            signing_secret: String::new(),
            signing_algorithm: "hmac-sha256".to_string(),
            issuer: None,
            audience: None,
            leeway_secs: 0,
            replay_max_future_skew_secs: 5,
            replay_max_past_age_secs: 5,
            idempotency_ttl_secs: 300,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PolicyFileConfig {
    pub base_url: String,
    pub policy_path: String,
    pub timeout_ms: u64,
    pub disabled: bool,
}

impl Default for PolicyFileConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            policy_path: "a2a/wire_gates".to_string(),
            timeout_ms: 500,
            disabled: true,
        }
    }
}

/// The typed runtime configuration every layer actually takes at
/// construction. Built by converting a [`FabricFileConfig`], or assembled
/// directly by a caller that prefers explicit options structs.
pub struct FabricConfig {
    pub transport: TransportConfig,
    pub registry: RegistryConfig,
    pub security: SecurityConfig,
    pub policy: a2a_policy::PolicyConfig,
}

impl FabricConfig {
    /// Load from a TOML/YAML/JSON file, substituting `${VAR}`/`$VAR`
    /// environment references in the raw text before parsing.
    pub fn from_file(path: impl AsRef<Path>) -> FabricResult<Self> {
        let path = path.as_ref();
        let format = detect_format(path)?;
        let content = std::fs::read_to_string(path)
            .map_err(|e| FabricError::Config(format!("reading {}: {e}", path.display())))?;
        let substituted = substitute_env_vars(&content);
        Self::from_str(&substituted, format)
    }

    fn from_str(content: &str, format: FileFormat) -> FabricResult<Self> {
        let raw = RawConfig::builder()
            .add_source(File::from_str(content, format))
            .build()
            .map_err(|e| FabricError::Config(e.to_string()))?;
        let file_config: FabricFileConfig = raw
            .try_deserialize()
            .map_err(|e| FabricError::Config(e.to_string()))?;
        Self::from_file_config(file_config)
    }

    pub fn from_file_config(file: FabricFileConfig) -> FabricResult<Self> {
        let transport = TransportConfig {
            validate_on_publish: file.transport.validate_on_publish,
            validate_on_subscribe: file.transport.validate_on_subscribe,
            max_redeliveries: file.transport.max_redeliveries,
            default_max_pending: file.transport.default_max_pending,
            validation: ValidationConfig { max_payload_depth: file.transport.max_payload_depth },
        };

        let registry = RegistryConfig {
            default_lease_duration: Duration::from_secs(file.registry.default_lease_duration_secs),
            sweep_interval: Duration::from_secs(file.registry.sweep_interval_secs),
        };

        let signing_algorithm = match file.security.signing_algorithm.as_str() {
            "hmac-sha256" => SigningAlgorithm::HmacSha256,
            "hmac-sha512" => SigningAlgorithm::HmacSha512,
            other => return Err(FabricError::Config(format!("unknown signing algorithm: {other}"))),
        };

        let mut bearer = TokenConfig::hs256(file.security.bearer_secret.clone().into_bytes());
        if let Some(issuer) = &file.security.issuer {
            bearer = bearer.with_issuer(issuer.clone());
        }
        if let Some(audience) = &file.security.audience {
            bearer = bearer.with_audience(audience.clone());
        }
        bearer = bearer.with_leeway(file.security.leeway_secs);

        let capability = TokenConfig::hs256(file.security.capability_secret.clone().into_bytes())
            .with_leeway(file.security.leeway_secs);

        let security = SecurityConfig::new(bearer, capability, file.security.signing_secret.clone().into_bytes())
            .with_signing_algorithm(signing_algorithm)
            .with_replay(
                ReplayConfig::default()
                    .with_max_future_skew(Duration::from_secs(file.security.replay_max_future_skew_secs))
                    .with_max_past_age(Duration::from_secs(file.security.replay_max_past_age_secs)),
            )
            .with_idempotency_ttl(Duration::from_secs(file.security.idempotency_ttl_secs));

        let policy = if file.policy.disabled {
            a2a_policy::PolicyConfig::disabled()
        } else {
            a2a_policy::PolicyConfig::new(file.policy.base_url.clone(), file.policy.policy_path.clone())
                .with_timeout(Duration::from_millis(file.policy.timeout_ms))
        };

        Ok(Self { transport, registry, security, policy })
    }
}

fn detect_format(path: &Path) -> FabricResult<FileFormat> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .ok_or_else(|| FabricError::Config("config file has no extension".to_string()))?;
    match ext.to_lowercase().as_str() {
        "toml" => Ok(FileFormat::Toml),
        "yaml" | "yml" => Ok(FileFormat::Yaml),
        "json" => Ok(FileFormat::Json),
        other => Err(FabricError::Config(format!("unsupported config format: {other}"))),
    }
}

/// Substitute `${VAR}` and `$VAR` references with values from the process
/// environment, leaving unresolved references untouched.
fn substitute_env_vars(content: &str) -> String {
    let mut result = content.to_string();

    let braced = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("static regex is valid");
    result = braced
        .replace_all(&result, |caps: &regex::Captures| {
            std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
        })
        .to_string();

    let bare = Regex::new(r"\$([A-Za-z_][A-Za-z0-9_]*)\b").expect("static regex is valid");
    result = bare
        .replace_all(&result, |caps: &regex::Captures| {
            std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
        })
        .to_string();

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_round_trip_through_file_config() {
        let config = FabricConfig::from_file_config(FabricFileConfig::default()).unwrap();
        assert!(config.policy.disabled);
        assert_eq!(config.transport.max_redeliveries, 5);
    }

    #[test]
    fn env_var_substitution_fills_in_secrets() {
        std::env::set_var("A2A_TEST_BEARER_SECRET", "sekrit");
        let toml = r#"
            [security]
            bearer_secret = "${A2A_TEST_BEARER_SECRET}"
            capability_secret = "cap"
            signing_secret = "sign"
        "#;
        let substituted = substitute_env_vars(toml);
        assert!(substituted.contains("sekrit"));
    }

    #[test]
    fn from_file_loads_toml_with_overrides() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
            [transport]
            max_redeliveries = 9

            [policy]
            disabled = true
            "#
        )
        .unwrap();

        let config = FabricConfig::from_file(file.path()).unwrap();
        assert_eq!(config.transport.max_redeliveries, 9);
        assert!(config.policy.disabled);
    }

    #[test]
    fn unknown_signing_algorithm_is_rejected() {
        let mut file = FabricFileConfig::default();
        file.security.signing_algorithm = "md5".to_string();
        let err = FabricConfig::from_file_config(file).unwrap_err();
        assert_eq!(err.code(), "E_CONFIG_INVALID");
    }
}
