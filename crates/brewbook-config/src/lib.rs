use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BrewbookConfig {
    /// "metric" or "imperial"
    pub units: Option<String>,
    /// "srm" or "ebc"
    pub color_scale: Option<String>,
    pub decimal_comma: Option<bool>,
    /// Default brewhouse efficiency for recipes that do not declare one.
    pub efficiency: Option<f64>,
    pub import: Option<ImportCfg>,
    pub export: Option<ExportCfg>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImportCfg {
    /// "skip" | "overwrite" | "copy" | "cancel"
    pub on_conflict: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportCfg {
    pub out_dir: Option<String>,
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("{0}")]
    Other(String),
}

/// Load config, merging `brewbook.toml` in the CWD over
/// `<config_dir>/brewbook/brewbook.toml`. Missing or unparseable files
/// are treated as empty.
pub fn load_config() -> Result<BrewbookConfig, ConfigError> {
    let mut merged = BrewbookConfig::default();
    if let Ok(cwd) = std::env::current_dir() {
        merged = merge(merged, read_file(&cwd.join("brewbook.toml")));
    }
    if let Some(base) = dirs::config_dir() {
        merged = merge(merged, read_file(&base.join("brewbook").join("brewbook.toml")));
    }
    Ok(merged)
}

fn read_file(path: &std::path::Path) -> BrewbookConfig {
    std::fs::read_to_string(path)
        .ok()
        .and_then(|s| toml::from_str(&s).ok())
        .unwrap_or_default()
}

/// First-seen values win, so the CWD file takes precedence over the user
/// config dir.
fn merge(a: BrewbookConfig, b: BrewbookConfig) -> BrewbookConfig {
    BrewbookConfig {
        units: a.units.or(b.units),
        color_scale: a.color_scale.or(b.color_scale),
        decimal_comma: a.decimal_comma.or(b.decimal_comma),
        efficiency: a.efficiency.or(b.efficiency),
        import: match (a.import, b.import) {
            (Some(x), Some(y)) => Some(ImportCfg {
                on_conflict: x.on_conflict.or(y.on_conflict),
            }),
            (x, y) => x.or(y),
        },
        export: match (a.export, b.export) {
            (Some(x), Some(y)) => Some(ExportCfg {
                out_dir: x.out_dir.or(y.out_dir),
            }),
            (x, y) => x.or(y),
        },
    }
}
