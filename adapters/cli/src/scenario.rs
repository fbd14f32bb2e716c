//! TOML scenario files describing a game's opening position.

use std::{
    fs,
    path::{Path, PathBuf},
};

use accountant_core::{DataPoint, DataPointId, Enemy, EnemyId, Point, TurnSnapshot};
use anyhow::{ensure, Context, Result};
use serde::Deserialize;

/// Opening position loaded from disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Scenario {
    /// Display name; the file stem unless the file sets one.
    pub(crate) name: String,
    /// Entities at the start of the first turn.
    pub(crate) snapshot: TurnSnapshot,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScenarioFile {
    name: Option<String>,
    defender: Point,
    #[serde(default)]
    data_points: Vec<DataPointEntry>,
    #[serde(default)]
    enemies: Vec<EnemyEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DataPointEntry {
    id: DataPointId,
    x: i32,
    y: i32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EnemyEntry {
    id: EnemyId,
    x: i32,
    y: i32,
    life: i32,
}

impl Scenario {
    /// Reads and validates a scenario file.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;
        let fallback = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::parse(&text, &fallback)
            .with_context(|| format!("invalid scenario {}", path.display()))
    }

    /// Parses scenario text, naming it `fallback` unless the text sets a name.
    pub(crate) fn parse(text: &str, fallback: &str) -> Result<Self> {
        let file: ScenarioFile = toml::from_str(text)?;

        ensure!(
            file.defender.in_arena(),
            "defender starts outside the arena at {}",
            file.defender
        );
        for entry in &file.data_points {
            ensure!(
                Point::new(entry.x, entry.y).in_arena(),
                "data point {} lies outside the arena",
                entry.id
            );
        }
        for entry in &file.enemies {
            ensure!(entry.life > 0, "enemy {} starts without life", entry.id);
        }

        Ok(Self {
            name: file.name.unwrap_or_else(|| fallback.to_owned()),
            snapshot: TurnSnapshot {
                defender: file.defender,
                data_points: file
                    .data_points
                    .iter()
                    .map(|entry| DataPoint::new(entry.id, Point::new(entry.x, entry.y)))
                    .collect(),
                enemies: file
                    .enemies
                    .iter()
                    .map(|entry| Enemy::new(entry.id, Point::new(entry.x, entry.y), entry.life))
                    .collect(),
            },
        })
    }
}

/// Lists the `*.toml` files directly inside `dir`, sorted by path.
pub(crate) fn list(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)
        .with_context(|| format!("failed to list scenarios in {}", dir.display()))?
    {
        let path = entry
            .with_context(|| format!("failed to list scenarios in {}", dir.display()))?
            .path();
        if path.is_file() && path.extension().map_or(false, |ext| ext == "toml") {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    const OPENING: &str = r#"
        name = "opening"
        defender = { x = 1100, y = 1200 }

        [[data_points]]
        id = 0
        x = 5000
        y = 5000

        [[enemies]]
        id = 3
        x = 10500
        y = 8000
        life = 10
    "#;

    #[test]
    fn parses_entities_in_file_order() {
        let scenario = Scenario::parse(OPENING, "fallback").expect("valid scenario");

        assert_eq!(scenario.name, "opening");
        assert_eq!(scenario.snapshot.defender, Point::new(1_100, 1_200));
        assert_eq!(
            scenario.snapshot.data_points,
            vec![DataPoint::new(DataPointId::new(0), Point::new(5_000, 5_000))]
        );
        assert_eq!(
            scenario.snapshot.enemies,
            vec![Enemy::new(EnemyId::new(3), Point::new(10_500, 8_000), 10)]
        );
    }

    #[test]
    fn falls_back_to_provided_name() {
        let text = OPENING.replace("name = \"opening\"", "");
        let scenario = Scenario::parse(&text, "corner").expect("valid scenario");
        assert_eq!(scenario.name, "corner");
    }

    #[test]
    fn rejects_positions_outside_the_arena() {
        let text = OPENING.replace("x = 1100", "x = 16000");
        let error = Scenario::parse(&text, "bad").expect_err("defender is outside");
        assert!(error.to_string().contains("outside the arena"));
    }

    #[test]
    fn rejects_unknown_keys() {
        let text = format!("{OPENING}\nturns = 3\n");
        assert!(Scenario::parse(&text, "bad").is_err());
    }
}
