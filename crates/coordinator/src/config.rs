use std::{fs, path::Path};

use serde::Deserialize;
use shared::domain::{ViewId, Year};
use tracing::warn;

use crate::selection::EmptyBrushPolicy;

pub const SETTINGS_FILE: &str = "linkview.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CoordinatorSettings {
    pub brush_views: Vec<String>,
    pub initial_year: Option<i32>,
    pub empty_brush_policy: EmptyBrushPolicy,
}

impl Default for CoordinatorSettings {
    fn default() -> Self {
        Self {
            brush_views: ["scatter", "parallel", "radviz", "line_chart"]
                .into_iter()
                .map(String::from)
                .collect(),
            initial_year: None,
            empty_brush_policy: EmptyBrushPolicy::Ignore,
        }
    }
}

impl CoordinatorSettings {
    pub fn brush_view_ids(&self) -> impl Iterator<Item = ViewId> + '_ {
        self.brush_views
            .iter()
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .map(ViewId::new)
    }

    pub fn initial_year(&self) -> Option<Year> {
        self.initial_year.map(Year)
    }
}

pub fn load_settings() -> CoordinatorSettings {
    load_settings_from(Path::new(SETTINGS_FILE))
}

/// Reads `path` if it exists, then applies `APP__*` environment overrides.
/// Unreadable or invalid values are logged and replaced by defaults.
pub fn load_settings_from(path: &Path) -> CoordinatorSettings {
    let mut settings = match fs::read_to_string(path) {
        Ok(raw) => toml::from_str::<CoordinatorSettings>(&raw).unwrap_or_else(|error| {
            warn!(path = %path.display(), %error, "ignoring invalid settings file");
            CoordinatorSettings::default()
        }),
        Err(_) => CoordinatorSettings::default(),
    };

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    settings
}

fn apply_env_overrides(settings: &mut CoordinatorSettings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("APP__BRUSH_VIEWS") {
        settings.brush_views = v
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(String::from)
            .collect();
    }

    if let Some(v) = lookup("APP__INITIAL_YEAR") {
        match v.trim().parse::<i32>() {
            Ok(year) => settings.initial_year = Some(year),
            Err(_) => warn!(value = %v, "ignoring invalid APP__INITIAL_YEAR"),
        }
    }

    if let Some(v) = lookup("APP__EMPTY_BRUSH_POLICY") {
        match v.parse::<EmptyBrushPolicy>() {
            Ok(policy) => settings.empty_brush_policy = policy,
            Err(error) => warn!(%error, "ignoring invalid APP__EMPTY_BRUSH_POLICY"),
        }
    }
}
