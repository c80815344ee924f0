use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Viewer configuration, loadable from a TOML file.
///
/// All fields default to their standard values. CLI flags override config
/// file values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Simulation server address.
    pub host: String,
    pub port: u16,
    /// Handshake timeout in seconds.
    pub timeout_secs: u64,
    pub width: u32,
    pub height: u32,
    pub antialiasing: bool,
    /// Monospace TTF to render panel text with. `None` falls back to the
    /// system font search.
    pub font: Option<String>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 2000,
            timeout_secs: 2,
            width: 1280,
            height: 720,
            antialiasing: true,
            font: None,
        }
    }
}

impl ViewerConfig {
    /// Load config from a TOML file.
    #[cfg(feature = "bin")]
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        use anyhow::Context;
        let contents = std::fs::read_to_string(path).context("Failed to read config file")?;
        let config: Self = toml::from_str(&contents).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Set the window size from a `WIDTHxHEIGHT` string.
    pub fn set_resolution(&mut self, res: &str) -> Result<(), Error> {
        let (width, height) = parse_resolution(res)?;
        self.width = width;
        self.height = height;
        Ok(())
    }

    /// Apply CLI flag overrides.
    #[cfg(feature = "bin")]
    pub fn apply_cli_overrides(&mut self, matches: &clap::ArgMatches) -> anyhow::Result<()> {
        use anyhow::Context;
        if let Some(host) = matches.value_of("HOST") {
            self.host = host.to_string();
        }
        if let Some(port) = matches.value_of("PORT") {
            self.port = port.parse().context("invalid port")?;
        }
        if let Some(res) = matches.value_of("RES") {
            self.set_resolution(res)?;
        }
        if let Some(antialiasing) = matches.value_of("ANTIALIASING") {
            self.antialiasing = antialiasing.eq_ignore_ascii_case("true");
        }
        if let Some(font) = matches.value_of("FONT") {
            self.font = Some(font.to_string());
        }
        Ok(())
    }
}

fn parse_resolution(res: &str) -> Result<(u32, u32), Error> {
    let Some((width, height)) = res.split_once('x') else {
        return Err(Error::BadResolution(res.to_string()));
    };
    let width: u32 = width.parse().map_err(|_| Error::BadResolution(res.to_string()))?;
    let height: u32 = height.parse().map_err(|_| Error::BadResolution(res.to_string()))?;
    if width == 0 || height == 0 {
        return Err(Error::BadResolution(res.to_string()));
    }
    Ok((width, height))
}
