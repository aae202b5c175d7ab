use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{MasonryError, Result};

fn yes() -> bool { true }

/// Spacing between columns and between stacked items.
///
/// A single number applies to both axes; a pair is `[horizontal, vertical]`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(untagged)]
pub enum Gap {
    Uniform(f64),
    Axes([f64; 2]),
}

impl Default for Gap {
    fn default() -> Self { Gap::Uniform(0.0) }
}

impl Gap {
    pub fn horizontal(&self) -> f64 {
        match *self {
            Gap::Uniform(gap) => gap,
            Gap::Axes([horizontal, _]) => horizontal,
        }
    }

    pub fn vertical(&self) -> f64 {
        match *self {
            Gap::Uniform(gap) => gap,
            Gap::Axes([_, vertical]) => vertical,
        }
    }
}

impl From<f64> for Gap {
    fn from(gap: f64) -> Self { Gap::Uniform(gap) }
}

impl From<[f64; 2]> for Gap {
    fn from(axes: [f64; 2]) -> Self { Gap::Axes(axes) }
}

/// Construction-time layout settings. Immutable once a session is built.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MasonrySettings {
    pub column_width: f64,
    #[serde(default)]
    pub gap: Gap,
    /// Run a full layout as soon as the session is constructed.
    #[serde(default = "yes")]
    pub auto_exec: bool,
    /// Restore the page scroll offset after every `exec`.
    #[serde(default = "yes")]
    pub fix_scroll_offset: bool,
}

impl MasonrySettings {
    pub fn new(column_width: f64) -> Self {
        Self {
            column_width,
            gap: Gap::default(),
            auto_exec: true,
            fix_scroll_offset: true,
        }
    }

    pub fn from_toml_str(source: &str) -> Result<Self> {
        let settings: MasonrySettings = toml::from_str(source)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path).map_err(|source| MasonryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.column_width.is_finite() || self.column_width <= 0.0 {
            return Err(MasonryError::InvalidSettings(format!(
                "column_width must be a positive number, got {}",
                self.column_width
            )));
        }
        for (axis, gap) in [
            ("horizontal", self.gap.horizontal()),
            ("vertical", self.gap.vertical()),
        ] {
            if !gap.is_finite() || gap < 0.0 {
                return Err(MasonryError::InvalidSettings(format!(
                    "{axis} gap must be a non-negative number, got {gap}"
                )));
            }
        }
        Ok(())
    }
}

/// How the layout container is located.
#[derive(Debug, Clone, PartialEq)]
pub enum Target<N> {
    ByLookup(String),
    ByHandle(N),
}

/// How the initial set of items is located.
#[derive(Debug, Clone, PartialEq)]
pub enum Items<N> {
    ByLookup(String),
    ByHandle(Vec<N>),
}

#[derive(Debug, Clone)]
pub struct MasonryOptions<N> {
    pub container: Target<N>,
    pub items: Items<N>,
    pub settings: MasonrySettings,
}

impl<N> MasonryOptions<N> {
    pub fn new(container: Target<N>, items: Items<N>, column_width: f64) -> Self {
        Self {
            container,
            items,
            settings: MasonrySettings::new(column_width),
        }
    }

    pub fn with_settings(container: Target<N>, items: Items<N>, settings: MasonrySettings) -> Self {
        Self { container, items, settings }
    }

    pub fn gap(mut self, gap: impl Into<Gap>) -> Self {
        self.settings.gap = gap.into();
        self
    }

    pub fn auto_exec(mut self, auto_exec: bool) -> Self {
        self.settings.auto_exec = auto_exec;
        self
    }

    pub fn fix_scroll_offset(mut self, fix_scroll_offset: bool) -> Self {
        self.settings.fix_scroll_offset = fix_scroll_offset;
        self
    }
}
