//! Level and rule files read and written by the command-line adapter.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use burrow_core::{EntityRecord, RuleConfig};

/// Reads a JSON array of entity records.
pub(crate) fn load_records(path: &Path) -> Result<Vec<EntityRecord>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read level {}", path.display()))?;
    parse_records(&text).with_context(|| format!("failed to parse level {}", path.display()))
}

/// Writes the records as pretty-printed JSON.
pub(crate) fn save_records(path: &Path, records: &[EntityRecord]) -> Result<()> {
    let text = serde_json::to_string_pretty(records).context("failed to encode records")?;
    fs::write(path, text).with_context(|| format!("failed to write level {}", path.display()))
}

/// Reads the rule configuration, falling back to defaults when no file is given.
pub(crate) fn load_config(path: Option<&Path>) -> Result<RuleConfig> {
    let Some(path) = path else {
        return Ok(RuleConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read rules {}", path.display()))?;
    parse_config(&text).with_context(|| format!("failed to parse rules {}", path.display()))
}

fn parse_records(text: &str) -> Result<Vec<EntityRecord>> {
    Ok(serde_json::from_str(text)?)
}

fn parse_config(text: &str) -> Result<RuleConfig> {
    Ok(toml::from_str(text)?)
}

#[cfg(test)]
mod tests {
    use super::{parse_config, parse_records};
    use burrow_core::{Coord, Direction, EntityKind, RuleConfig};

    #[test]
    fn records_fill_in_defaults() {
        let records = parse_records(
            r#"[
                {"kind": "Rock", "coord": {"x": 1, "y": 2}},
                {"kind": "Player", "coord": {"x": 0, "y": 0}, "facing": 2,
                 "group": [{"x": 0, "y": 0}]}
            ]"#,
        )
        .expect("records parse");

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].kind, EntityKind::Rock);
        assert_eq!(records[0].coord, Coord::new(1, 2));
        assert_eq!(records[0].variant, -1);
        assert!(!records[0].destroyed);
        assert_eq!(records[1].facing, 2);
        assert_eq!(records[1].group.as_deref(), Some(&[Coord::new(0, 0)][..]));
    }

    #[test]
    fn unknown_kinds_are_rejected() {
        assert!(parse_records(r#"[{"kind": "Dragon", "coord": {"x": 0, "y": 0}}]"#).is_err());
    }

    #[test]
    fn partial_rules_keep_the_remaining_defaults() {
        let config = parse_config("gravity = \"Up\"\nlength_cap = 6\n").expect("rules parse");

        assert_eq!(config.gravity, Direction::Up);
        assert_eq!(config.length_cap, 6);
        assert_eq!(config.base_length, RuleConfig::default().base_length);
        assert!(config.block_moves_displace_player);
    }

    #[test]
    fn empty_rules_are_the_defaults() {
        assert_eq!(parse_config("").expect("rules parse"), RuleConfig::default());
    }
}
