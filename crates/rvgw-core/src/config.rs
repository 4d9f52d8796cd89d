//! Plain, already-validated configuration shapes. Parsing these from
//! environment variables, a TOML file, or a database is an external
//! collaborator's job; this crate only defines the shapes so it is usable
//! standalone in tests and demos.
use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanNetworkConfig {
    pub network_id: String,
    pub interface_name: String,
    pub protocol: String,
    pub isolation_enabled: bool,
}

/// The physical CAN layer: bus type, bitrate, and the interface-name
/// mapping a `NetworkRegistry` is seeded from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanConfig {
    pub bustype: String,
    pub bitrate: u32,
    pub interface_mappings: HashMap<String, String>,
}

impl Default for CanConfig {
    fn default() -> Self {
        Self {
            bustype: "socketcan".to_string(),
            bitrate: 250_000,
            interface_mappings: HashMap::new(),
        }
    }
}

/// Toggles for the multi-network manager's cross-cutting behavior: health
/// monitoring, fault isolation, and routing messages between networks of
/// different protocol families.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiNetworkConfig {
    pub enabled: bool,
    pub enable_health_monitoring: bool,
    pub enable_fault_isolation: bool,
    pub enable_cross_network_routing: bool,
    pub health_check_interval: Duration,
}

impl Default for MultiNetworkConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            enable_health_monitoring: true,
            enable_fault_isolation: true,
            enable_cross_network_routing: true,
            health_check_interval: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RvcConfig {
    pub enabled: bool,
}

impl Default for RvcConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct J1939Config {
    pub enabled: bool,
    pub enable_rvc_bridge: bool,
    /// Layer the Cummins engine/aftertreatment PGNs on top of the SAE table.
    pub enable_cummins_extensions: bool,
    /// Layer the Allison transmission PGNs on top of the SAE table.
    pub enable_allison_extensions: bool,
    /// Layer the chassis body-builder PGNs on top of the SAE table.
    pub enable_chassis_extensions: bool,
    pub enable_address_validation: bool,
}

impl Default for J1939Config {
    fn default() -> Self {
        Self {
            enabled: true,
            enable_rvc_bridge: true,
            enable_cummins_extensions: false,
            enable_allison_extensions: false,
            enable_chassis_extensions: false,
            enable_address_validation: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FireflyConfig {
    pub enabled: bool,
    pub multiplex_buffer_expiry: Duration,
    pub enable_multiplexing: bool,
    /// Components a brake/suspension/steering-adjacent feature must treat
    /// as safety-interlocked when this deployment carries Firefly chassis
    /// accessories (slides, leveling) alongside a Spartan K2 chassis.
    pub safety_interlock_components: Vec<String>,
    /// Interlocks that must all clear before any of the above components
    /// accept a command.
    pub required_interlocks: Vec<String>,
}

impl Default for FireflyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            multiplex_buffer_expiry: Duration::from_secs(5),
            enable_multiplexing: true,
            safety_interlock_components: vec!["slides.main".to_string()],
            required_interlocks: vec!["parking_brake".to_string(), "engine_off".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpartanK2Config {
    pub enabled: bool,
    pub enable_safety_interlocks: bool,
    pub enable_advanced_diagnostics: bool,
}

impl Default for SpartanK2Config {
    fn default() -> Self {
        Self {
            enabled: true,
            enable_safety_interlocks: true,
            enable_advanced_diagnostics: false,
        }
    }
}

/// Shapes for the notification, authentication, and persistence
/// subsystems the core never talks to directly, but whose configuration
/// the composition root needs a place to carry. Left intentionally thin:
/// the core has no behavior gated on these values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationConfig {
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersistenceConfig {
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureToggleConfig {
    pub entity_manager: bool,
    pub observer_hub: bool,
}

impl Default for FeatureToggleConfig {
    fn default() -> Self {
        Self {
            entity_manager: true,
            observer_hub: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub can: CanConfig,
    pub multi_network: MultiNetworkConfig,
    pub networks: Vec<CanNetworkConfig>,
    pub rvc: RvcConfig,
    pub j1939: J1939Config,
    pub firefly: FireflyConfig,
    pub spartan_k2: SpartanK2Config,
    pub notifications: NotificationConfig,
    pub auth: AuthConfig,
    pub persistence: PersistenceConfig,
    pub features: FeatureToggleConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            can: CanConfig::default(),
            multi_network: MultiNetworkConfig::default(),
            networks: Vec::new(),
            rvc: RvcConfig::default(),
            j1939: J1939Config::default(),
            firefly: FireflyConfig::default(),
            spartan_k2: SpartanK2Config::default(),
            notifications: NotificationConfig::default(),
            auth: AuthConfig::default(),
            persistence: PersistenceConfig::default(),
            features: FeatureToggleConfig::default(),
        }
    }
}
