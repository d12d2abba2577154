//! Configuration loading and parsing for the sync engine.
//!
//! Parses `strand.toml` (or an override path provided by the host),
//! extracting the serialization placeholder character and notification
//! behavior. Unknown fields are ignored (TOML deserialization tolerance)
//! so hosts can evolve their config files without immediate warnings, and
//! any read or parse failure falls back to defaults; a broken config file
//! must never keep the editor from starting.

use anyhow::Result;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::warn;

#[derive(Debug, Deserialize, Clone)]
pub struct BufferConfig {
    /// Character used for gap and sentinel filler in the serialized
    /// buffer. Must be a single character and not a line terminator.
    #[serde(default = "BufferConfig::default_placeholder")]
    pub placeholder: String,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            placeholder: Self::default_placeholder(),
        }
    }
}

impl BufferConfig {
    fn default_placeholder() -> String {
        " ".to_string()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct NotifyConfig {
    /// De-duplicate native selection notifications by comparing computed
    /// structured positions before reporting. Disabling forwards every
    /// native notification verbatim (diagnostic use).
    #[serde(default = "NotifyConfig::default_coalesce")]
    pub coalesce_positions: bool,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            coalesce_positions: Self::default_coalesce(),
        }
    }
}

impl NotifyConfig {
    const fn default_coalesce() -> bool {
        true
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub buffer: BufferConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>, // original file string (optional)
    pub file: ConfigFile,    // parsed (or default) data
}

impl Config {
    /// Effective placeholder character. Invalid settings (multi-character
    /// strings, empty strings, line terminators) fall back to a space so
    /// the projector always has a usable filler.
    pub fn placeholder(&self) -> char {
        let raw = &self.file.buffer.placeholder;
        let mut chars = raw.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c != '\n' && c != '\r' => c,
            _ => {
                warn!(
                    target: "config",
                    configured_len = raw.chars().count(),
                    "placeholder_invalid_using_default"
                );
                ' '
            }
        }
    }

    pub fn coalesce_positions(&self) -> bool {
        self.file.notify.coalesce_positions
    }
}

/// Best-effort config path following platform conventions (XDG / AppData
/// Roaming): a local `strand.toml` wins over the platform config dir.
pub fn discover() -> PathBuf {
    let local = PathBuf::from("strand.toml");
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("strand").join("strand.toml");
    }
    PathBuf::from("strand.toml")
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    if let Ok(content) = fs::read_to_string(&path) {
        match toml::from_str::<ConfigFile>(&content) {
            Ok(file) => Ok(Config {
                raw: Some(content),
                file,
            }),
            Err(e) => {
                warn!(target: "config", path = %path.display(), error = %e, "config_parse_failed_using_defaults");
                Ok(Config::default())
            }
        }
    } else {
        Ok(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex, MutexGuard};
    use tracing::Level;
    use tracing::subscriber::with_default;
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone)]
    struct BufferWriter {
        inner: Arc<Mutex<Vec<u8>>>,
    }

    impl BufferWriter {
        fn new() -> (Self, Arc<Mutex<Vec<u8>>>) {
            let buf = Arc::new(Mutex::new(Vec::new()));
            (Self { inner: buf.clone() }, buf)
        }
    }

    struct LockedWriter<'a> {
        guard: MutexGuard<'a, Vec<u8>>,
    }

    impl<'a> Write for LockedWriter<'a> {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.guard.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for BufferWriter {
        type Writer = LockedWriter<'a>;

        fn make_writer(&'a self) -> Self::Writer {
            LockedWriter {
                guard: self.inner.lock().expect("log buffer poisoned"),
            }
        }
    }

    #[test]
    fn default_config_when_missing_file() {
        let cfg = load_from(Some(PathBuf::from("__nonexistent_hopefully__.toml"))).unwrap();
        assert_eq!(cfg.placeholder(), ' ');
        assert!(cfg.coalesce_positions());
    }

    #[test]
    fn parses_placeholder_and_notify_settings() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            tmp.path(),
            "[buffer]\nplaceholder = \".\"\n[notify]\ncoalesce_positions = false\n",
        )
        .unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.placeholder(), '.');
        assert!(!cfg.coalesce_positions());
    }

    #[test]
    fn parse_error_falls_back_to_defaults() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "[buffer\nplaceholder = ").unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.placeholder(), ' ');
        assert!(cfg.raw.is_none());
    }

    #[test]
    fn invalid_placeholder_warns_with_config_target() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "[buffer]\nplaceholder = \"--\"\n").unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();

        let (writer, buffer) = BufferWriter::new();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(Level::WARN)
            .with_target(true)
            .with_ansi(false)
            .without_time()
            .with_writer(writer)
            .finish();

        let effective = with_default(subscriber, || cfg.placeholder());

        assert_eq!(effective, ' ');
        let log_output = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
        assert!(log_output.contains("WARN config:"));
        assert!(log_output.contains("placeholder_invalid_using_default"));
    }

    #[test]
    fn terminator_placeholder_is_refused() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "[buffer]\nplaceholder = \"\\n\"\n").unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.placeholder(), ' ');
    }
}
