use crate::error::ConfigError;
use fs_err as fs;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Encoding {
    #[serde(rename = "ascii")]
    Ascii,
    #[default]
    #[serde(rename = "utf-8")]
    Utf8,
    #[serde(rename = "utf-16")]
    Utf16,
    #[serde(rename = "utf-32")]
    Utf32,
}

impl Encoding {
    pub const ACCEPTED: [Encoding; 4] = [
        Encoding::Ascii,
        Encoding::Utf8,
        Encoding::Utf16,
        Encoding::Utf32,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Encoding::Ascii => "ascii",
            Encoding::Utf8 => "utf-8",
            Encoding::Utf16 => "utf-16",
            Encoding::Utf32 => "utf-32",
        }
    }

    /// Encode `text` for a file written by a tool. UTF-16/32 are little
    /// endian with a byte order mark.
    pub fn encode(self, text: &str) -> anyhow::Result<Vec<u8>> {
        Ok(match self {
            Encoding::Ascii => {
                if let Some(c) = text.chars().find(|c| !c.is_ascii()) {
                    anyhow::bail!("character {c:?} can't be written with the ascii encoding");
                }
                text.as_bytes().to_vec()
            }
            Encoding::Utf8 => text.as_bytes().to_vec(),
            Encoding::Utf16 => {
                let mut out = vec![0xFF, 0xFE];
                for unit in text.encode_utf16() {
                    out.extend_from_slice(&unit.to_le_bytes());
                }
                out
            }
            Encoding::Utf32 => {
                let mut out = vec![0xFF, 0xFE, 0x00, 0x00];
                for c in text.chars() {
                    out.extend_from_slice(&(c as u32).to_le_bytes());
                }
                out
            }
        })
    }
}

impl FromStr for Encoding {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Encoding::ACCEPTED
            .into_iter()
            .find(|e| e.as_str() == lowered)
            .ok_or_else(|| ConfigError::InvalidEncoding(s.to_string()))
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Property {
    Encoding,
    Splash,
    Colors,
}

impl Property {
    pub const ALL: [Property; 3] = [Property::Encoding, Property::Splash, Property::Colors];

    pub fn key(self) -> &'static str {
        match self {
            Property::Encoding => "encoding",
            Property::Splash => "splash",
            Property::Colors => "colors",
        }
    }
}

impl FromStr for Property {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "encoding" | "encode" => Ok(Property::Encoding),
            "splash" => Ok(Property::Splash),
            "colors" | "color" => Ok(Property::Colors),
            _ => Err(ConfigError::UnknownProperty(s.to_string())),
        }
    }
}

/// On-disk shape; every key is required.
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    colors: bool,
    encoding: Encoding,
    splash: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    path: PathBuf,
    encoding: Encoding,
    splash: bool,
    colors: bool,
}

impl Config {
    /// Built-in defaults bound to `path`, nothing written yet.
    pub fn defaults(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            encoding: Encoding::default(),
            splash: true,
            colors: true,
        }
    }

    /// Read the store. A missing file is recreated from the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let data = match fs::read_to_string(path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let cfg = Config::defaults(path);
                cfg.save()?;
                log::info!("created default config at {}", path.display());
                return Ok(cfg);
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let file: ConfigFile = serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            encoding: file.encoding,
            splash: file.splash,
            colors: file.colors,
        })
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let file = ConfigFile {
            colors: self.colors,
            encoding: self.encoding,
            splash: self.splash,
        };
        let save_err = |reason: String| ConfigError::Save {
            path: self.path.clone(),
            reason,
        };
        let json = serde_json::to_string_pretty(&file).map_err(|e| save_err(e.to_string()))?;
        fs::write(&self.path, json + "\n").map_err(|e| save_err(e.to_string()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn splash(&self) -> bool {
        self.splash
    }

    pub fn colors(&self) -> bool {
        self.colors
    }

    pub fn get(&self, property: Property) -> String {
        match property {
            Property::Encoding => self.encoding.to_string(),
            Property::Splash => self.splash.to_string(),
            Property::Colors => self.colors.to_string(),
        }
    }

    /// Validate, apply and persist one property. Nothing changes when the
    /// value is rejected or the file can't be written.
    pub fn set(&mut self, property: Property, value: &str) -> Result<(), ConfigError> {
        let previous = self.clone();
        match property {
            Property::Encoding => self.encoding = value.parse()?,
            Property::Splash => self.splash = parse_flag(property, value)?,
            Property::Colors => self.colors = parse_flag(property, value)?,
        }
        if let Err(e) = self.save() {
            *self = previous;
            return Err(e);
        }
        log::debug!("config {} set to {}", property.key(), self.get(property));
        Ok(())
    }
}

fn parse_flag(property: Property, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            property: property.key(),
            value: value.to_string(),
        }),
    }
}
