//! Execution inputs: comma-separated command-line lists and JSON fixtures.

use std::collections::BTreeMap;

use hrm_common::{Value, ValueError};
use hrm_vm::Tiles;
use serde::Deserialize;

/// Parse `1,2,A` into inbox values. An empty string is an empty inbox.
pub fn parse_inbox(text: &str) -> Result<Vec<Value>, ValueError> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    text.split(',').map(str::parse).collect()
}

/// Parse `0,,B` into floor tiles starting at address 0. An empty entry
/// leaves that tile empty.
pub fn parse_tiles(text: &str) -> Result<Tiles, ValueError> {
    text.split(',')
        .enumerate()
        .map(|(address, item)| {
            let value = if item.trim().is_empty() {
                None
            } else {
                Some(item.parse::<Value>()?)
            };
            Ok::<_, ValueError>((address, value))
        })
        .collect()
}

/// Initial floor as written in a fixture: a list indexed from 0, or an
/// object keyed by address.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawFloor")]
pub enum Floor {
    List(Vec<Option<Value>>),
    Map(BTreeMap<usize, Option<Value>>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawFloor {
    List(Vec<Option<Value>>),
    Map(BTreeMap<String, Option<Value>>),
}

impl TryFrom<RawFloor> for Floor {
    type Error = String;

    fn try_from(raw: RawFloor) -> Result<Self, Self::Error> {
        match raw {
            RawFloor::List(values) => Ok(Floor::List(values)),
            RawFloor::Map(map) => map
                .into_iter()
                .map(|(key, value)| {
                    key.trim()
                        .parse::<usize>()
                        .map(|address| (address, value))
                        .map_err(|_| format!("invalid tile address '{key}'"))
                })
                .collect::<Result<_, _>>()
                .map(Floor::Map),
        }
    }
}

impl Default for Floor {
    fn default() -> Self {
        Floor::List(Vec::new())
    }
}

impl Floor {
    pub fn to_tiles(&self) -> Tiles {
        match self {
            Floor::List(values) => values.iter().copied().enumerate().collect(),
            Floor::Map(map) => map.clone(),
        }
    }
}

/// Game level files nest the floor as `"floor": {"tiles": ...}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
struct LevelFloor {
    #[serde(default)]
    tiles: Floor,
}

/// One inbox with the outbox it must produce.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Example {
    pub inbox: Vec<Value>,
    pub outbox: Vec<Value>,
}

/// A set of examples sharing one initial floor.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    tiles: Option<Floor>,
    #[serde(default)]
    floor: Option<LevelFloor>,
    pub examples: Vec<Example>,
}

impl Fixture {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Initial tiles for every example. A top-level `tiles` wins over a
    /// level-style `floor.tiles`.
    pub fn tiles(&self) -> Tiles {
        match (&self.tiles, &self.floor) {
            (Some(floor), _) => floor.to_tiles(),
            (None, Some(level)) => level.tiles.to_tiles(),
            (None, None) => Tiles::new(),
        }
    }
}
