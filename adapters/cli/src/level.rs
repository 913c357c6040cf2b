//! Level loading from TOML files.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use waypoint_defence_core::{Level, LevelConfig};

/// Reads, parses and validates the level stored at `path`.
pub fn load_level(path: &Path) -> Result<Level> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read level file {}", path.display()))?;
    parse_level(&text).with_context(|| format!("invalid level file {}", path.display()))
}

/// Parses and validates a level from TOML text.
pub fn parse_level(text: &str) -> Result<Level> {
    let config: LevelConfig = toml::from_str(text).context("failed to parse level TOML")?;
    config.validate().context("level configuration rejected")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_level_is_valid() {
        let level = parse_level(include_str!("../levels/default.toml")).expect("level loads");
        assert!(level.map.path.len() >= 2);
        assert!(!level.waves.is_empty());
    }

    #[test]
    fn validation_errors_carry_context() {
        let error = parse_level("[game]\ninitial_gold = 1\n").expect_err("incomplete level");
        assert!(format!("{error:#}").contains("failed to parse level TOML"));
    }

    #[test]
    fn missing_files_are_reported() {
        let error = load_level(Path::new("does/not/exist.toml")).expect_err("missing file");
        assert!(error.to_string().contains("does/not/exist.toml"));
    }
}
