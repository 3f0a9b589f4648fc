//! Render configuration.
//!
//! Layers, lowest precedence first: built-in defaults, an optional YAML file
//! (with `${VAR}` / `${VAR:-default}` substitution), then [`ConfigOverrides`]
//! collected from environment variables and CLI flags.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use geo_common::{PRESSURE, TEMPERATURE};
use ingestion::{CoastlineConfig, GfsConfig};
use renderer::gradient::hex_to_color;
use renderer::{ColorScale, InterpolationMethod, OverlayStyle};
use serde::{Deserialize, Serialize};
use symmetry::{MatchConfig, ToleranceMode, DEFAULT_TOLERANCE};
use tracing::debug;

/// One rendered variable and its color scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerConfig {
    pub variable: String,
    #[serde(default)]
    pub scale: ColorScale,
}

/// Coastline stroke settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoastlineStyleConfig {
    pub enabled: bool,
    /// `#rrggbb` or `#rrggbbaa`.
    pub color: String,
    /// Stroke width in pixels.
    pub width: f32,
}

impl Default for CoastlineStyleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            color: "#000000".to_string(),
            width: 0.8,
        }
    }
}

/// Top-level render configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Raster width in pixels.
    pub width: usize,
    /// Raster height in pixels.
    pub height: usize,
    pub tolerance: f64,
    pub tolerance_mode: ToleranceMode,
    /// Variables that must all agree for an antipodal match.
    pub match_variables: Vec<String>,
    /// Variables rendered to rasters, in payload order.
    pub layers: Vec<LayerConfig>,
    pub interpolation: InterpolationMethod,
    pub coastline_style: CoastlineStyleConfig,
    pub gfs: GfsConfig,
    pub coastlines: CoastlineConfig,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            // 10 x 5 inches at 150 dpi
            width: 1500,
            height: 750,
            tolerance: DEFAULT_TOLERANCE,
            tolerance_mode: ToleranceMode::RelativeToA,
            match_variables: vec![TEMPERATURE.to_string(), PRESSURE.to_string()],
            layers: vec![
                LayerConfig {
                    variable: TEMPERATURE.to_string(),
                    scale: ColorScale::Diverging,
                },
                LayerConfig {
                    variable: PRESSURE.to_string(),
                    scale: ColorScale::Sequential,
                },
            ],
            interpolation: InterpolationMethod::Bilinear,
            coastline_style: CoastlineStyleConfig::default(),
            gfs: GfsConfig::default(),
            coastlines: CoastlineConfig::default(),
        }
    }
}

impl RenderConfig {
    /// Defaults, then the YAML file at `path` if given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_yaml_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read render config from {:?}", path.as_ref()))?;
        let config = Self::from_yaml_str(&content)
            .with_context(|| format!("Failed to parse render config from {:?}", path.as_ref()))?;
        debug!(path = ?path.as_ref(), "Loaded render config");
        Ok(config)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let expanded = expand_env_vars(content)?;
        let config: RenderConfig = serde_yaml::from_str(&expanded)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.width > 0 && self.height > 0,
            "Raster dimensions must be positive, got {}x{}",
            self.width,
            self.height
        );
        anyhow::ensure!(
            self.tolerance.is_finite() && self.tolerance > 0.0,
            "Tolerance must be positive, got {}",
            self.tolerance
        );
        anyhow::ensure!(!self.match_variables.is_empty(), "No match variables configured");
        anyhow::ensure!(!self.layers.is_empty(), "No layers configured");
        anyhow::ensure!(
            self.layers.iter().all(|l| !l.variable.is_empty()),
            "Layer variable names cannot be empty"
        );
        anyhow::ensure!(
            self.coastline_style.width.is_finite() && self.coastline_style.width > 0.0,
            "Coastline width must be positive, got {}",
            self.coastline_style.width
        );
        self.overlay_style()?;
        self.gfs.validate()?;
        Ok(())
    }

    pub fn match_config(&self) -> MatchConfig {
        MatchConfig::default()
            .with_tolerance(self.tolerance)
            .with_mode(self.tolerance_mode)
            .with_variables(self.match_variables.iter().cloned())
    }

    pub fn overlay_style(&self) -> Result<OverlayStyle> {
        let color = hex_to_color(&self.coastline_style.color).with_context(|| {
            format!("Invalid coastline color '{}'", self.coastline_style.color)
        })?;
        Ok(OverlayStyle {
            color,
            width: self.coastline_style.width,
        })
    }

    pub fn apply(&mut self, overrides: &ConfigOverrides) {
        if let Some(width) = overrides.width {
            self.width = width;
        }
        if let Some(height) = overrides.height {
            self.height = height;
        }
        if let Some(tolerance) = overrides.tolerance {
            self.tolerance = tolerance;
        }
        if let Some(mode) = overrides.tolerance_mode {
            self.tolerance_mode = mode;
        }
        if let Some(method) = overrides.interpolation {
            self.interpolation = method;
        }
        if let Some(hours) = overrides.lookback_hours {
            self.gfs.lookback_hours = hours;
        }
        if let Some(url) = &overrides.gfs_base_url {
            self.gfs.base_url = url.clone();
        }
        if let Some(url) = &overrides.proxy_url {
            self.gfs.proxy_url = Some(url.clone());
        }
        if let Some(url) = &overrides.coastline_url {
            self.coastlines.url = url.clone();
        }
        if overrides.no_coastlines {
            self.coastline_style.enabled = false;
        }
    }
}

/// Values taken from the environment or command line.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub width: Option<usize>,
    pub height: Option<usize>,
    pub tolerance: Option<f64>,
    pub tolerance_mode: Option<ToleranceMode>,
    pub interpolation: Option<InterpolationMethod>,
    pub lookback_hours: Option<u32>,
    pub gfs_base_url: Option<String>,
    pub proxy_url: Option<String>,
    pub coastline_url: Option<String>,
    pub no_coastlines: bool,
}

/// Replace `${VAR}` and `${VAR:-default}` with environment values.
pub fn expand_env_vars(content: &str) -> Result<String> {
    let mut result = String::with_capacity(content.len());
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && chars.peek() == Some(&'{') {
            chars.next();
            let mut expr = String::new();
            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(c) => expr.push(c),
                    None => anyhow::bail!("Unclosed variable substitution: ${{{}", expr),
                }
            }
            result.push_str(&resolve_var_expr(&expr)?);
        } else {
            result.push(ch);
        }
    }

    Ok(result)
}

fn resolve_var_expr(expr: &str) -> Result<String> {
    if let Some((name, default)) = expr.split_once(":-") {
        match std::env::var(name.trim()) {
            Ok(val) if !val.is_empty() => Ok(val),
            _ => Ok(default.to_string()),
        }
    } else {
        std::env::var(expr.trim()).with_context(|| format!("Environment variable {} not set", expr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = RenderConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!((config.width, config.height), (1500, 750));
        assert_eq!(config.layers.len(), 2);
    }

    #[test]
    fn test_partial_yaml() {
        let config = RenderConfig::from_yaml_str(
            "width: 720\nheight: 360\ntolerance_mode: symmetric\ngfs:\n  lookback_hours: 24\n",
        )
        .unwrap();
        assert_eq!(config.width, 720);
        assert_eq!(config.tolerance_mode, ToleranceMode::Symmetric);
        assert_eq!(config.gfs.lookback_hours, 24);
        assert_eq!(config.gfs.temperature_var, "tmp2m");
        assert_eq!(config.tolerance, DEFAULT_TOLERANCE);
    }

    #[test]
    fn test_layers_from_yaml() {
        let config = RenderConfig::from_yaml_str(
            "layers:\n  - variable: pressure\n    scale: diverging\n  - variable: temperature\n",
        )
        .unwrap();
        assert_eq!(config.layers[0].scale, ColorScale::Diverging);
        assert_eq!(config.layers[1].scale, ColorScale::Sequential);
    }

    #[test]
    fn test_env_default_substitution() {
        let yaml = "width: ${ANTIPODE_TEST_UNSET_WIDTH:-640}\n";
        let config = RenderConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.width, 640);
    }

    #[test]
    fn test_unclosed_substitution() {
        assert!(expand_env_vars("width: ${WIDTH").is_err());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = RenderConfig::default();
        config.width = 0;
        assert!(config.validate().is_err());

        let mut config = RenderConfig::default();
        config.tolerance = -1.0;
        assert!(config.validate().is_err());

        let mut config = RenderConfig::default();
        config.coastline_style.color = "black".to_string();
        assert!(config.validate().is_err());

        let mut config = RenderConfig::default();
        config.layers.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overrides_win() {
        let mut config = RenderConfig::default();
        config.apply(&ConfigOverrides {
            width: Some(360),
            tolerance_mode: Some(ToleranceMode::Absolute),
            proxy_url: Some("https://proxy.test/?".to_string()),
            no_coastlines: true,
            ..Default::default()
        });
        assert_eq!(config.width, 360);
        assert_eq!(config.height, 750);
        assert_eq!(config.tolerance_mode, ToleranceMode::Absolute);
        assert_eq!(config.gfs.proxy_url.as_deref(), Some("https://proxy.test/?"));
        assert!(!config.coastline_style.enabled);
    }

    #[test]
    fn test_match_config() {
        let config = RenderConfig {
            tolerance: 0.01,
            match_variables: vec![TEMPERATURE.to_string()],
            ..Default::default()
        };
        let mc = config.match_config();
        assert_eq!(mc.tolerance, 0.01);
        assert_eq!(mc.variables, vec![TEMPERATURE.to_string()]);
    }
}
