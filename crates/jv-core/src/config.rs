use serde::Deserialize;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use jv_rig::{AngleUnit, LengthUnit};
use thiserror::Error;

use crate::format::NumberFormat;
use crate::layout::RigLayout;
use crate::sampler::SweepOptions;
use crate::sink::{LineFormat, SinkKind};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub format: FormatConfig,
    pub sweep: SweepConfig,
    pub units: UnitsConfig,
    pub log: LogConfig,
    pub rig: RigLayout,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct FormatConfig {
    /// Number of decimals written to the table.
    pub decimal_places: u32,
    /// Decimal separator. A `,` switches the field delimiter to `;`.
    pub decimal_separator: char,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            decimal_places: 2,
            decimal_separator: '.',
        }
    }
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct SweepConfig {
    /// Step size in the actuator's native length unit.
    pub increment: f64,
    /// Let the live view catch up after every move.
    pub update_view: bool,
    /// Pause after every move when `update_view` is on.
    pub step_pause_ms: u64,
    /// Move the actuator back to where it started once the sweep is done.
    pub restore_actuator: bool,
    /// Answer used when the movement prompt is left empty.
    pub default_movement: String,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            increment: 0.5,
            update_view: true,
            step_pause_ms: 500,
            restore_actuator: true,
            default_movement: "10".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct UnitsConfig {
    pub native_length: LengthUnit,
    /// Unit the requested movement is typed in.
    pub input_length: LengthUnit,
    /// Unit sensor angles are written in.
    pub angle: AngleUnit,
}

impl Default for UnitsConfig {
    fn default() -> Self {
        Self {
            native_length: LengthUnit::Centimeter,
            input_length: LengthUnit::Millimeter,
            angle: AngleUnit::Degree,
        }
    }
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    pub sink: SinkKind,
    /// Log file for the file sink. Defaults to ~/.local/share/jointval/jointval.log.
    pub path: Option<String>,
    pub format: LineFormat,
    /// Flush the palette after every line.
    pub force_update: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            sink: SinkKind::Palette,
            path: None,
            format: LineFormat::Plain,
            force_update: true,
        }
    }
}

impl LogConfig {
    /// Resolve the log file path, using the configured path or the XDG default.
    pub fn resolve_path(&self) -> PathBuf {
        if let Some(ref custom) = self.path {
            return PathBuf::from(custom);
        }

        let base = std::env::var("XDG_DATA_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".local").join("share")
            });
        base.join("jointval").join("jointval.log")
    }
}

impl Config {
    /// Load from an explicit path. Missing or malformed files are errors.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load_or_default() -> Self {
        let (config, problem) = Self::load_with_fallback(&config_path());
        if let Some(e) = problem {
            tracing::warn!("{e}; using defaults");
        }
        config
    }

    /// Load `path`, falling back to defaults on any failure.
    ///
    /// A missing file is the normal case and yields no error; anything else
    /// that prevented loading is returned alongside the defaults.
    fn load_with_fallback(path: &Path) -> (Self, Option<ConfigError>) {
        match Self::load(path) {
            Ok(config) => (config, None),
            Err(ConfigError::Read { ref source, .. })
                if source.kind() == io::ErrorKind::NotFound =>
            {
                (Config::default(), None)
            }
            Err(e) => (Config::default(), Some(e)),
        }
    }

    pub fn number_format(&self) -> NumberFormat {
        NumberFormat::new(self.format.decimal_places, self.format.decimal_separator)
    }

    pub fn sweep_options(&self) -> SweepOptions {
        SweepOptions {
            format: self.number_format(),
            angle_unit: self.units.angle,
            update_view: self.sweep.update_view,
            step_pause: Duration::from_millis(self.sweep.step_pause_ms),
            restore_actuator: self.sweep.restore_actuator,
        }
    }

    /// First header field, e.g. `[cm/degree]`.
    pub fn unit_annotation(&self) -> String {
        format!("[{}/{}]", self.units.native_length, self.units.angle)
    }
}

fn config_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("jointval").join("config.toml")
}
