use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

#[derive(Debug, Fail, PartialEq)]
pub enum ConfigError {
    #[fail(display = "{} must look like WIDTHxHEIGHT with non-zero sides, got {:?}", var, value)]
    InvalidWindowSize { var: &'static str, value: String },
    #[fail(display = "{} must be a sample count, got {:?}", var, value)]
    InvalidSampleCount { var: &'static str, value: String },
    #[fail(display = "{} must be a finite number of degrees per second, got {:?}", var, value)]
    InvalidRotationSpeed { var: &'static str, value: String },
    #[fail(display = "{} is not valid unicode", var)]
    NotUnicode { var: String },
}

const VAR_PREFIX: &str = "CUBE_";

pub const WINDOW_SIZE_VAR: &str = "CUBE_WINDOW_SIZE";
pub const MSAA_VAR: &str = "CUBE_MSAA";
pub const ROTATION_SPEED_VAR: &str = "CUBE_ROTATION_SPEED";
pub const ASSETS_DIR_VAR: &str = "CUBE_ASSETS_DIR";
pub const LOG_VAR: &str = "CUBE_LOG";

#[derive(Debug, Clone, PartialEq)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub gl_version: (u8, u8),
    pub color_bits: u8,
    pub depth_bits: u8,
    pub multisample_samples: u8,
}

impl Default for WindowConfig {
    fn default() -> Self {
        WindowConfig {
            title: "Spinning Cube".into(),
            width: 800,
            height: 600,
            gl_version: (3, 1),
            color_bits: 8,
            depth_bits: 16,
            multisample_samples: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub window: WindowConfig,
    pub clear_color: [f32; 4],
    pub degrees_per_second: f32,
    /// Overrides the asset directory next to the executable.
    pub assets_dir: Option<PathBuf>,
    /// `env_logger` filter used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            window: WindowConfig::default(),
            clear_color: [0.0, 0.0, 0.5, 1.0],
            degrees_per_second: 20.0,
            assets_dir: None,
            log_filter: "info".into(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Config, ConfigError> {
        Config::from_vars(env::vars_os())
    }

    /// Applies `CUBE_*` overrides on top of the defaults. Unrelated variables are ignored,
    /// even when they are not valid unicode.
    pub fn from_vars<I>(vars: I) -> Result<Config, ConfigError>
        where I: IntoIterator<Item = (OsString, OsString)>
    {
        let mut config = Config::default();

        for (key, value) in vars {
            let key = match key.into_string() {
                Ok(key) => key,
                Err(_) => continue,
            };
            if !key.starts_with(VAR_PREFIX) {
                continue;
            }
            let value = value.into_string()
                .map_err(|_| ConfigError::NotUnicode { var: key.clone() })?;

            match key.as_str() {
                WINDOW_SIZE_VAR => {
                    let (width, height) = parse_window_size(&value)
                        .ok_or_else(|| ConfigError::InvalidWindowSize { var: WINDOW_SIZE_VAR, value: value.clone() })?;
                    config.window.width = width;
                    config.window.height = height;
                }
                MSAA_VAR => {
                    config.window.multisample_samples = value.trim().parse()
                        .map_err(|_| ConfigError::InvalidSampleCount { var: MSAA_VAR, value: value.clone() })?;
                }
                ROTATION_SPEED_VAR => {
                    config.degrees_per_second = value.trim().parse::<f32>().ok()
                        .filter(|speed| speed.is_finite())
                        .ok_or_else(|| ConfigError::InvalidRotationSpeed { var: ROTATION_SPEED_VAR, value: value.clone() })?;
                }
                ASSETS_DIR_VAR => {
                    if !value.is_empty() {
                        config.assets_dir = Some(PathBuf::from(value));
                    }
                }
                LOG_VAR => {
                    config.log_filter = value;
                }
                _ => {}
            }
        }

        Ok(config)
    }
}

fn parse_window_size(value: &str) -> Option<(u32, u32)> {
    let mut parts = value.trim().splitn(2, |c| c == 'x' || c == 'X');
    let width: u32 = parts.next()?.trim().parse().ok()?;
    let height: u32 = parts.next()?.trim().parse().ok()?;

    if width == 0 || height == 0 {
        return None;
    }
    Some((width, height))
}
