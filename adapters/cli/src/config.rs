use std::{fs, path::Path};

use anyhow::{Context, Result};
use grid_sim_core::SimConfig;

/// Values given on the command line that replace file or default settings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct ConfigOverrides {
    pub(crate) columns: Option<u32>,
    pub(crate) rows: Option<u32>,
    pub(crate) cell_size: Option<u32>,
    pub(crate) step_interval_ms: Option<u64>,
    pub(crate) wall_count: Option<u32>,
    pub(crate) frame_rate: Option<u32>,
    pub(crate) seed: Option<u64>,
}

impl ConfigOverrides {
    fn apply(self, config: &mut SimConfig) {
        if let Some(columns) = self.columns {
            config.columns = columns;
        }
        if let Some(rows) = self.rows {
            config.rows = rows;
        }
        if let Some(cell_size) = self.cell_size {
            config.cell_size = cell_size;
        }
        if let Some(step_interval_ms) = self.step_interval_ms {
            config.step_interval_ms = step_interval_ms;
        }
        if let Some(wall_count) = self.wall_count {
            config.wall_count = wall_count;
        }
        if let Some(frame_rate) = self.frame_rate {
            config.frame_rate = frame_rate;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
    }
}

/// Resolves the effective configuration: defaults, then the optional file,
/// then command-line overrides. The result is validated.
pub(crate) fn load_config(path: Option<&Path>, overrides: ConfigOverrides) -> Result<SimConfig> {
    let mut config = match path {
        Some(path) => read_config_file(path)?,
        None => SimConfig::default(),
    };
    overrides.apply(&mut config);
    config
        .validate()
        .context("invalid simulation configuration")?;
    Ok(config)
}

fn read_config_file(path: &Path) -> Result<SimConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    parse_config(&text).with_context(|| format!("failed to parse config file {}", path.display()))
}

fn parse_config(text: &str) -> Result<SimConfig> {
    Ok(toml::from_str(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_sim_core::{ConfigError, EntityColor, MovableConfig};

    #[test]
    fn empty_file_yields_defaults() {
        assert_eq!(parse_config("").expect("empty toml"), SimConfig::default());
    }

    #[test]
    fn file_values_replace_defaults() {
        let config = parse_config(
            r#"
            columns = 12
            rows = 8
            wall_count = 5
            seed = 7

            [[movables]]
            column = 1
            row = 2
            color = { red = 10, green = 20, blue = 30 }
            "#,
        )
        .expect("valid toml");

        assert_eq!(config.columns, 12);
        assert_eq!(config.rows, 8);
        assert_eq!(config.wall_count, 5);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.cell_size, SimConfig::default().cell_size);
        assert_eq!(
            config.movables,
            vec![MovableConfig {
                column: 1,
                row: 2,
                color: EntityColor::from_rgb(10, 20, 30),
            }]
        );
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(parse_config("colums = 3").is_err());
    }

    #[test]
    fn overrides_take_precedence() {
        let overrides = ConfigOverrides {
            columns: Some(25),
            wall_count: Some(3),
            seed: Some(99),
            ..ConfigOverrides::default()
        };
        let config = load_config(None, overrides).expect("valid overrides");

        assert_eq!(config.columns, 25);
        assert_eq!(config.rows, SimConfig::default().rows);
        assert_eq!(config.wall_count, 3);
        assert_eq!(config.seed, Some(99));
    }

    #[test]
    fn invalid_result_is_reported_with_cause() {
        let overrides = ConfigOverrides {
            columns: Some(2),
            rows: Some(2),
            wall_count: Some(10),
            ..ConfigOverrides::default()
        };
        let error = load_config(None, overrides).expect_err("default movables lie outside a 2x2 grid");

        assert!(matches!(
            error.downcast_ref::<ConfigError>(),
            Some(ConfigError::MovableOutOfBounds { .. })
        ));
    }

    #[test]
    fn missing_file_names_the_path() {
        let error = load_config(
            Some(Path::new("/definitely/not/here.toml")),
            ConfigOverrides::default(),
        )
        .expect_err("missing file");

        assert!(format!("{error:#}").contains("/definitely/not/here.toml"));
    }
}
