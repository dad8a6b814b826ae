use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::color::ColorScale;
use crate::data::model::CategoricalField;

/// Optional settings file read from the working directory.
pub const CONFIG_FILE: &str = "trade-dashboard.json";
/// Overrides `data_path`.
pub const DATA_ENV: &str = "TRADE_DASHBOARD_DATA";
/// Overrides `preset`.
pub const PRESET_ENV: &str = "TRADE_DASHBOARD_PRESET";

const DEFAULT_DATA_PATH: &str = "Imports_Exports_Dataset.csv";

// ---------------------------------------------------------------------------
// Presets
// ---------------------------------------------------------------------------

/// Presentation defaults. Both presets drive the same charts; they differ
/// only in which fields are offered and which colours are used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Field lists and colours of the original dashboard.
    #[default]
    Classic,
    /// Illustrative alternative with made-up field lists and colours; not
    /// taken from any existing dashboard variant.
    Vivid,
}

impl Preset {
    pub const ALL: [Preset; 2] = [Preset::Classic, Preset::Vivid];

    pub fn label(self) -> &'static str {
        match self {
            Preset::Classic => "Classic",
            Preset::Vivid => "Vivid",
        }
    }

    /// Fields offered (and pre-selected) for pie charts.
    pub fn pie_fields(self) -> &'static [CategoricalField] {
        use CategoricalField::{Category, ImportExport, PaymentTerms, ShippingMethod};
        match self {
            Preset::Classic => &[ShippingMethod, ImportExport, PaymentTerms, Category],
            Preset::Vivid => &[ImportExport, ShippingMethod, PaymentTerms],
        }
    }

    /// Fields offered (and pre-selected) for bar charts.
    pub fn bar_fields(self) -> &'static [CategoricalField] {
        use CategoricalField::{Category, ImportExport, PaymentTerms, ShippingMethod};
        match self {
            Preset::Classic => &[ShippingMethod, ImportExport, PaymentTerms],
            Preset::Vivid => &[Category, ShippingMethod, ImportExport, PaymentTerms],
        }
    }

    pub fn heatmap_scale(self) -> ColorScale {
        match self {
            Preset::Classic => ColorScale::Viridis,
            Preset::Vivid => ColorScale::Plasma,
        }
    }

    /// (saturation, lightness) of the categorical palette.
    pub fn palette_tone(self) -> (f32, f32) {
        match self {
            Preset::Classic => (0.75, 0.55),
            Preset::Vivid => (0.95, 0.60),
        }
    }
}

impl FromStr for Preset {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "classic" => Ok(Preset::Classic),
            "vivid" => Ok(Preset::Vivid),
            other => bail!("unknown preset '{other}', expected 'classic' or 'vivid'"),
        }
    }
}

// ---------------------------------------------------------------------------
// Dashboard configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Trade records file opened at startup.
    pub data_path: PathBuf,
    pub preset: Preset,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            preset: Preset::default(),
        }
    }
}

impl DashboardConfig {
    /// Read [`CONFIG_FILE`] from the working directory (if present) and apply
    /// environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::from_file(Path::new(CONFIG_FILE))?;
        config.apply_overrides(
            std::env::var(DATA_ENV).ok(),
            std::env::var(PRESET_ENV).ok(),
        )?;
        Ok(config)
    }

    /// A missing file yields the defaults; a malformed one is an error.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
    }

    fn apply_overrides(&mut self, data: Option<String>, preset: Option<String>) -> Result<()> {
        if let Some(data) = data.filter(|d| !d.trim().is_empty()) {
            self.data_path = PathBuf::from(data);
        }
        if let Some(preset) = preset {
            self.preset = preset
                .parse()
                .with_context(|| format!("invalid {PRESET_ENV}"))?;
        }
        Ok(())
    }
}
