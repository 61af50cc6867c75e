use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::calibration::UnlockPolicy;
use crate::channel::ChannelBoundary;

/// Runtime settings, persisted inside a [`ConfigFile`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Substring matched against MIDI port names to find the controller.
    pub controller_device: String,
    /// Substring matched against MIDI output names to find the instrument.
    pub instrument_device: String,
    pub unlock_policy: UnlockPolicy,
    pub channel_boundary: ChannelBoundary,
    /// Quiet period before pad LEDs are repainted after a burst of messages.
    pub led_refresh_delay_ms: u64,
    /// Directory that receives saved patch files.
    pub patch_directory: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            controller_device: "BeatStep".to_string(),
            instrument_device: "in_from_ccpatch".to_string(),
            unlock_policy: UnlockPolicy::default(),
            channel_boundary: ChannelBoundary::default(),
            led_refresh_delay_ms: 250,
            patch_directory: PathBuf::from("."),
        }
    }
}

/// Configuration manager for ccpatch settings.
/// Stored as `ccpatch.json` in the working directory unless a path is given.
pub struct ConfigManager {
    config_path: PathBuf,
    settings: Settings,
}

/// Available configuration options with validation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSchema {
    pub midi: MidiConfigSchema,
    pub calibration: CalibrationConfigSchema,
    pub patch: PatchConfigSchema,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MidiConfigSchema {
    pub controller_device: ConfigOption<String>,
    pub instrument_device: ConfigOption<String>,
    pub led_refresh_delay_ms: ConfigOption<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationConfigSchema {
    pub unlock_policy: ConfigOption<UnlockPolicy>,
    pub channel_boundary: ConfigOption<ChannelBoundary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchConfigSchema {
    pub patch_directory: ConfigOption<PathBuf>,
}

/// Configuration option with validation and available choices
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigOption<T> {
    pub default: T,
    pub valid_range: Option<(T, T)>,
    pub valid_choices: Option<Vec<T>>,
    pub description: String,
    pub requires_restart: bool,
}

/// Persisted configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    pub settings: Settings,
    pub created_at: String,
    pub modified_at: String,
}

impl ConfigManager {
    pub fn new(config_path: Option<PathBuf>) -> Self {
        Self {
            config_path: config_path.unwrap_or_else(|| PathBuf::from("ccpatch.json")),
            settings: Settings::default(),
        }
    }

    /// Load settings from the configuration file, writing a default file
    /// first if none exists.
    pub fn load(&mut self) -> Result<Settings, ConfigError> {
        if !self.config_path.exists() {
            self.save()?;
            return Ok(self.settings.clone());
        }

        let content = fs::read_to_string(&self.config_path)
            .map_err(|e| ConfigError::ReadError(e.to_string()))?;

        let config_file: ConfigFile =
            serde_json::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        if config_file.version != env!("CARGO_PKG_VERSION") {
            log::warn!(
                "Config file version {} doesn't match application version {}; missing settings use defaults",
                config_file.version,
                env!("CARGO_PKG_VERSION")
            );
        }

        Self::validate_settings(&config_file.settings).map_err(ConfigError::ValidationError)?;

        self.settings = config_file.settings;
        Ok(self.settings.clone())
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        if let Some(parent) = self.config_path.parent() {
            if parent != Path::new("") && parent != Path::new(".") {
                fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError(e.to_string()))?;
            }
        }

        let now = chrono::Utc::now().to_rfc3339();
        let config_file = ConfigFile {
            version: env!("CARGO_PKG_VERSION").to_string(),
            settings: self.settings.clone(),
            created_at: now.clone(),
            modified_at: now,
        };

        let content = serde_json::to_string_pretty(&config_file)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        fs::write(&self.config_path, content)
            .map_err(|e| ConfigError::WriteError(e.to_string()))?;

        Ok(())
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn schema() -> ConfigSchema {
        let defaults = Settings::default();
        ConfigSchema {
            midi: MidiConfigSchema {
                controller_device: ConfigOption {
                    default: defaults.controller_device,
                    valid_range: None,
                    valid_choices: None,
                    description: "Substring of the controller's MIDI port name".to_string(),
                    requires_restart: true,
                },
                instrument_device: ConfigOption {
                    default: defaults.instrument_device,
                    valid_range: None,
                    valid_choices: None,
                    description: "Substring of the instrument's MIDI output name".to_string(),
                    requires_restart: true,
                },
                led_refresh_delay_ms: ConfigOption {
                    default: defaults.led_refresh_delay_ms,
                    valid_range: Some((0, 5000)),
                    valid_choices: None,
                    description: "Delay before pad LEDs are repainted, in milliseconds"
                        .to_string(),
                    requires_restart: false,
                },
            },
            calibration: CalibrationConfigSchema {
                unlock_policy: ConfigOption {
                    default: defaults.unlock_policy,
                    valid_range: None,
                    valid_choices: Some(vec![UnlockPolicy::Automatic, UnlockPolicy::Manual]),
                    description: "Whether calibrated encoders release on their own".to_string(),
                    requires_restart: false,
                },
                channel_boundary: ConfigOption {
                    default: defaults.channel_boundary,
                    valid_range: None,
                    valid_choices: Some(vec![ChannelBoundary::Clamp, ChannelBoundary::Wrap]),
                    description: "Channel stepping behavior at channels 1 and 16".to_string(),
                    requires_restart: false,
                },
            },
            patch: PatchConfigSchema {
                patch_directory: ConfigOption {
                    default: defaults.patch_directory,
                    valid_range: None,
                    valid_choices: None,
                    description: "Directory where saved patches are written".to_string(),
                    requires_restart: false,
                },
            },
        }
    }

    pub fn validate_settings(settings: &Settings) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        let schema = Self::schema();

        if settings.controller_device.trim().is_empty() {
            errors.push("controller_device must not be empty".to_string());
        }

        if settings.instrument_device.trim().is_empty() {
            errors.push("instrument_device must not be empty".to_string());
        }

        if let Some((min, max)) = schema.midi.led_refresh_delay_ms.valid_range {
            if settings.led_refresh_delay_ms < min || settings.led_refresh_delay_ms > max {
                errors.push(format!(
                    "led_refresh_delay_ms must be between {} and {}",
                    min, max
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Configuration error types
#[derive(Debug)]
pub enum ConfigError {
    ReadError(String),
    WriteError(String),
    ParseError(String),
    SerializeError(String),
    ValidationError(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(msg) => write!(f, "Failed to read config file: {}", msg),
            ConfigError::WriteError(msg) => write!(f, "Failed to write config file: {}", msg),
            ConfigError::ParseError(msg) => write!(f, "Failed to parse config file: {}", msg),
            ConfigError::SerializeError(msg) => write!(f, "Failed to serialize config: {}", msg),
            ConfigError::ValidationError(errors) => {
                write!(f, "Config validation errors: {}", errors.join(", "))
            }
        }
    }
}

impl std::error::Error for ConfigError {}
