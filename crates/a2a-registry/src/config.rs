//! Construction-time registry options. Explicit options struct, no
//! implicit globals, per spec §6's "Environment" contract.

use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct RegistryConfig {
    /// Applied to `register`/`heartbeat` calls that don't specify their own
    /// `lease_duration`.
    pub default_lease_duration: Duration,
    /// Default cadence for the lease-expiry sweeper in `a2a-health`.
    pub sweep_interval: Duration,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            default_lease_duration: Duration::from_secs(60),
            sweep_interval: Duration::from_secs(10),
        }
    }
}
