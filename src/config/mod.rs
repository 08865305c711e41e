//! Configuration loading and management
//!
//! Labels, badge colors, icons and formats live here so the status layer has
//! one table to read from. Every section has defaults, so a YAML file only
//! needs the keys it overrides.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// Display tuple for one status value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeConfig {
    /// Localized label (e.g., "Pending")
    pub label: String,

    /// CSS class of the badge
    pub color: String,

    /// Icon name; booking badges have none
    #[serde(default)]
    pub icon: Option<String>,
}

impl BadgeConfig {
    fn new(label: &str, color: &str, icon: Option<&str>) -> Self {
        Self {
            label: label.to_string(),
            color: color.to_string(),
            icon: icon.map(str::to_string),
        }
    }
}

/// Badges for appointment categories
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppointmentLabels {
    pub pending: BadgeConfig,
    pub in_progress: BadgeConfig,
    pub cancelled: BadgeConfig,
}

impl Default for AppointmentLabels {
    fn default() -> Self {
        Self {
            pending: BadgeConfig::new("Pending", "badge-warning", Some("clock")),
            in_progress: BadgeConfig::new("In progress", "badge-info", Some("loader")),
            cancelled: BadgeConfig::new("Cancelled", "badge-danger", Some("x-circle")),
        }
    }
}

/// Badges for room booking states
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingLabels {
    pub not_checked_in: BadgeConfig,
    pub checked_in: BadgeConfig,
    pub checked_out: BadgeConfig,
}

impl Default for BookingLabels {
    fn default() -> Self {
        Self {
            not_checked_in: BadgeConfig::new("Not checked in", "badge-secondary", None),
            checked_in: BadgeConfig::new("Checked in", "badge-primary", None),
            checked_out: BadgeConfig::new("Checked out", "badge-success", None),
        }
    }
}

/// Relative time templates; `{n}` is replaced by the count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelativeTimeLabels {
    pub just_now: String,
    pub hours_ago: String,
    pub days_ago: String,
}

impl Default for RelativeTimeLabels {
    fn default() -> Self {
        Self {
            just_now: "just now".to_string(),
            hours_ago: "{n} hours ago".to_string(),
            days_ago: "{n} days ago".to_string(),
        }
    }
}

/// Everything the status layer renders
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    pub appointments: AppointmentLabels,
    pub bookings: BookingLabels,
    pub relative_time: RelativeTimeLabels,
}

/// Log output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is not set
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl LoggingConfig {
    /// Install a global fmt subscriber.
    ///
    /// `RUST_LOG` wins over the configured filter. Fails if a subscriber is
    /// already installed.
    pub fn init(&self) -> Result<()> {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.filter))?;

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))
    }
}

/// Complete configuration for a screen aggregator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    /// Text shown for any field whose reference could not be resolved
    pub placeholder: String,

    /// chrono format for absolute schedule labels
    pub date_format: String,

    /// Capacity of the event bus between lifecycle and screens
    pub event_capacity: usize,

    pub labels: LabelConfig,

    pub logging: LoggingConfig,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            placeholder: "unknown".to_string(),
            date_format: "%d/%m/%Y %H:%M".to_string(),
            event_capacity: 256,
            labels: LabelConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AggregatorConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// The built-in configuration (English labels)
    pub fn default_config() -> Self {
        Self::default()
    }
}
