// src/config/options.rs
//! Runtime settings.
//!
//! Resolution order per field: `config.json` → environment → built-in default.
//! The CLI applies its own flags on top of the resolved `Settings`.
//!
//! ```json
//! {
//!   "uvr":    { "xml_filename": "Neu.xml", "ip": "192.168.177.5", "user": "user", "password": "…" },
//!   "device": { "name": "UVR_TADesigner" },
//!   "loop":   { "interval_seconds": 60, "cycles": 0, "workers": 1 }
//! }
//! ```
//! Other sections (e.g. `mqtt`) belong to the publishing side and are ignored.

use std::{fs, io, path::{Path, PathBuf}, time::Duration};

use serde::Deserialize;

use crate::error::SettingsError;
use super::consts::*;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceOptions {
    pub xml_filename: PathBuf,
    pub ip: String,
    pub user: String,
    pub password: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PollOptions {
    pub interval: Duration,
    /// Number of cycles to run; 0 runs until interrupted.
    pub cycles: u64,
    pub workers: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub device: DeviceOptions,
    pub device_name: String,
    pub poll: PollOptions,
    pub debug: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            device: DeviceOptions {
                xml_filename: PathBuf::from(DEFAULT_XML),
                ip: s!(DEFAULT_IP),
                user: s!(DEFAULT_USER),
                password: s!(),
            },
            device_name: s!(DEFAULT_DEVICE_NAME),
            poll: PollOptions {
                interval: Duration::from_secs(DEFAULT_INTERVAL_SECS),
                cycles: DEFAULT_CYCLES,
                workers: DEFAULT_WORKERS,
            },
            debug: false,
        }
    }
}

/* ---------- config.json shape ---------- */

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SettingsFile {
    uvr: UvrSection,
    device: DeviceSection,
    #[serde(rename = "loop")]
    poll: LoopSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UvrSection {
    xml_filename: Option<String>,
    ip: Option<String>,
    user: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DeviceSection {
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LoopSection {
    interval_seconds: Option<u64>,
    cycles: Option<u64>,
    workers: Option<usize>,
}

impl SettingsFile {
    /// Read `path`; a missing file yields an empty (all-default) file.
    pub fn read(path: &Path) -> Result<Self, SettingsError> {
        let text = match fs::read_to_string(path) {
            Ok(t) => t,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("no settings file at {}, using environment/defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => return Err(SettingsError::Io { path: path.to_path_buf(), source }),
        };
        Self::parse(&text, path)
    }

    pub fn parse(text: &str, path: &Path) -> Result<Self, SettingsError> {
        serde_json::from_str(text).map_err(|source| SettingsError::Json { path: path.to_path_buf(), source })
    }
}

/* ---------- resolution ---------- */

pub fn env_flag(value: Option<String>) -> bool {
    value.is_some_and(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
}

fn env_number<T: std::str::FromStr>(
    name: &'static str,
    env: &impl Fn(&str) -> Option<String>,
) -> Result<Option<T>, SettingsError> {
    match env(name) {
        None => Ok(None),
        Some(v) => v
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| SettingsError::Env { name, value: v }),
    }
}

impl Settings {
    /// Load `path` and the process environment.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let file = SettingsFile::read(path)?;
        Self::resolve(file, |name| std::env::var(name).ok())
    }

    /// Merge a parsed settings file with an environment lookup.
    pub fn resolve(file: SettingsFile, env: impl Fn(&str) -> Option<String>) -> Result<Self, SettingsError> {
        let d = Settings::default();
        let pick = |from_file: Option<String>, var: &str, default: String| {
            from_file.or_else(|| env(var)).unwrap_or(default)
        };

        let device = DeviceOptions {
            xml_filename: PathBuf::from(pick(
                file.uvr.xml_filename,
                "UVR_XML",
                d.device.xml_filename.to_string_lossy().into_owned(),
            )),
            ip: pick(file.uvr.ip, "UVR_IP", d.device.ip),
            user: pick(file.uvr.user, "UVR_USER", d.device.user),
            password: pick(file.uvr.password, "UVR_PASSWORD", d.device.password),
        };
        let device_name = pick(file.device.name, "DEVICE_NAME", d.device_name);

        let interval = match file.poll.interval_seconds {
            Some(v) => Some(v),
            None => env_number::<u64>("UVR_INTERVAL", &env)?,
        };
        let cycles = match file.poll.cycles {
            Some(v) => Some(v),
            None => env_number::<u64>("UVR_CYCLES", &env)?,
        };
        let poll = PollOptions {
            interval: interval.map(Duration::from_secs).unwrap_or(d.poll.interval),
            cycles: cycles.unwrap_or(d.poll.cycles),
            workers: file.poll.workers.unwrap_or(d.poll.workers).max(1),
        };

        Ok(Settings { device, device_name, poll, debug: env_flag(env("UVR_DEBUG")) })
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.device.ip.trim().is_empty() {
            return Err(SettingsError::Missing("device ip"));
        }
        if self.device_name.trim().is_empty() {
            return Err(SettingsError::Missing("device name"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (s!(*k), s!(*v))).collect();
        move |k: &str| map.get(k).cloned()
    }

    fn file(json: &str) -> SettingsFile {
        SettingsFile::parse(json, Path::new("config.json")).unwrap()
    }

    #[test]
    fn defaults_when_nothing_given() {
        let s = Settings::resolve(SettingsFile::default(), env_of(&[])).unwrap();
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn file_beats_environment() {
        let f = file(r#"{"uvr": {"ip": "10.0.0.7", "user": "admin"}, "mqtt": {"broker": "x"}}"#);
        let s = Settings::resolve(f, env_of(&[("UVR_IP", "10.0.0.9"), ("UVR_PASSWORD", "pw")])).unwrap();
        assert_eq!(s.device.ip, "10.0.0.7");
        assert_eq!(s.device.user, "admin");
        assert_eq!(s.device.password, "pw");
    }

    #[test]
    fn loop_section_and_env_numbers() {
        let f = file(r#"{"loop": {"interval_seconds": 15, "workers": 0}}"#);
        let s = Settings::resolve(f, env_of(&[("UVR_CYCLES", "2"), ("UVR_DEBUG", "Yes")])).unwrap();
        assert_eq!(s.poll.interval, Duration::from_secs(15));
        assert_eq!(s.poll.cycles, 2);
        assert_eq!(s.poll.workers, 1);
        assert!(s.debug);
    }

    #[test]
    fn bad_env_number_is_reported() {
        let err = Settings::resolve(SettingsFile::default(), env_of(&[("UVR_CYCLES", "many")])).unwrap_err();
        assert!(matches!(err, SettingsError::Env { name: "UVR_CYCLES", .. }));
    }

    #[test]
    fn empty_ip_is_rejected() {
        let f = file(r#"{"uvr": {"ip": " "}}"#);
        let s = Settings::resolve(f, env_of(&[])).unwrap();
        assert!(matches!(s.validate(), Err(SettingsError::Missing("device ip"))));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(SettingsFile::parse("{uvr:", Path::new("config.json")).is_err());
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let p = std::env::temp_dir().join("uvr_scrape_no_such_config.json");
        let _ = fs::remove_file(&p);
        assert!(SettingsFile::read(&p).is_ok());
    }
}
