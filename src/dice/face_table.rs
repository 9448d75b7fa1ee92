//! Per-color face catalog, loaded from JSON and validated up front.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use thiserror::Error;

use super::types::{DieColor, Face, Symbol, SymbolFamily};
use crate::core::constants::FACES_PER_DIE;

/// Face table load/validation failures. Any of these makes the table unusable.
#[derive(Debug, Error)]
pub enum FaceTableError {
    #[error("failed to read face table: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed face table: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unknown die color '{0}'")]
    UnknownColor(String),

    #[error("unknown symbol '{symbol}' on a {color} face")]
    UnknownSymbol { color: DieColor, symbol: String },

    #[error("die color {0} is missing from the face table")]
    MissingColor(DieColor),

    #[error("die color {color} has {found} faces, expected {expected}")]
    WrongFaceCount {
        color: DieColor,
        found: usize,
        expected: usize,
    },
}

pub type Faces = [Face; FACES_PER_DIE];

/// Maps each die color to its eight faces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaceTable {
    faces: BTreeMap<DieColor, Faces>,
}

impl FaceTable {
    /// Parses a complete table: every canonical color must be present with
    /// exactly eight faces.
    pub fn from_json(json: &str) -> Result<Self, FaceTableError> {
        let raw: BTreeMap<String, Vec<Vec<String>>> = serde_json::from_str(json)?;
        let mut entries = Vec::with_capacity(raw.len());

        for (key, faces) in raw {
            let color: DieColor = key
                .parse()
                .map_err(|_| FaceTableError::UnknownColor(key.clone()))?;
            let mut parsed = Vec::with_capacity(faces.len());
            for tokens in faces {
                let mut symbols = Vec::with_capacity(tokens.len());
                for token in tokens {
                    let symbol: Symbol = token
                        .parse()
                        .map_err(|_| FaceTableError::UnknownSymbol { color, symbol: token })?;
                    symbols.push(symbol);
                }
                parsed.push(Face::new(&symbols));
            }
            entries.push((color, parsed));
        }

        let table = Self::partial(entries)?;
        for color in DieColor::ALL {
            if !table.contains(color) {
                return Err(FaceTableError::MissingColor(color));
            }
        }
        Ok(table)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, FaceTableError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Builds a reduced table holding only the given colors. Face counts are
    /// still checked; missing colors are allowed and simply never roll.
    pub fn partial<I>(entries: I) -> Result<Self, FaceTableError>
    where
        I: IntoIterator<Item = (DieColor, Vec<Face>)>,
    {
        let mut faces = BTreeMap::new();
        for (color, list) in entries {
            let found = list.len();
            let array: Faces = list.try_into().map_err(|_| FaceTableError::WrongFaceCount {
                color,
                found,
                expected: FACES_PER_DIE,
            })?;
            faces.insert(color, array);
        }
        Ok(Self { faces })
    }

    /// Built-in six-color table. `data/faces.json` holds the same faces as
    /// an editable starting point for `--faces`.
    pub fn standard() -> Self {
        use Symbol::*;
        let spec: [(DieColor, [&[Symbol]; FACES_PER_DIE]); 6] = [
            (
                DieColor::Red,
                [&[Hit, Hit], &[Hit, Special], &[Hit], &[Hit], &[HollowHit, Hit], &[Special], &[HollowHit], &[]],
            ),
            (
                DieColor::Orange,
                [&[Hit, Special], &[Hit], &[Hit], &[HollowHit], &[HollowHit], &[Special], &[HollowSpecial], &[]],
            ),
            (
                DieColor::Yellow,
                [
                    &[Hit],
                    &[HollowHit],
                    &[Special],
                    &[Special, HollowSpecial],
                    &[HollowSpecial],
                    &[HollowHit, HollowSpecial],
                    &[],
                    &[],
                ],
            ),
            (
                DieColor::Green,
                [&[Block], &[HollowBlock], &[Block], &[Special], &[HollowSpecial], &[HollowBlock], &[], &[]],
            ),
            (
                DieColor::Blue,
                [&[Block, Block], &[Block], &[Block], &[HollowBlock], &[Block, Special], &[Special], &[HollowBlock], &[]],
            ),
            (
                DieColor::Black,
                [
                    &[Block, Block],
                    &[Block, HollowBlock],
                    &[Block],
                    &[Block],
                    &[Block, Special],
                    &[HollowBlock],
                    &[Special],
                    &[],
                ],
            ),
        ];

        let faces = spec
            .iter()
            .map(|(color, faces)| (*color, faces.map(Face::new)))
            .collect();
        Self { faces }
    }

    pub fn contains(&self, color: DieColor) -> bool {
        self.faces.contains_key(&color)
    }

    pub fn colors(&self) -> impl Iterator<Item = DieColor> + '_ {
        self.faces.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    pub fn faces(&self, color: DieColor) -> Option<&Faces> {
        self.faces.get(&color)
    }

    pub fn face(&self, color: DieColor, index: usize) -> Option<&Face> {
        self.faces.get(&color).and_then(|faces| faces.get(index))
    }

    /// Average count of `symbol` per face; 0 for colors not in the table.
    pub fn average(&self, color: DieColor, symbol: Symbol) -> f64 {
        self.average_weighted(color, &unit_weights(symbol))
    }

    /// Average weighted face value for a color under per-symbol weights.
    pub fn average_weighted(&self, color: DieColor, weights: &[f64; 6]) -> f64 {
        match self.faces.get(&color) {
            Some(faces) => {
                faces.iter().map(|f| f.counts().weighted(weights)).sum::<f64>()
                    / FACES_PER_DIE as f64
            }
            None => 0.0,
        }
    }

    /// Whether any face of this color shows a symbol of `family`.
    pub fn can_produce(&self, color: DieColor, family: SymbolFamily) -> bool {
        self.faces(color).is_some_and(|faces| {
            faces
                .iter()
                .any(|f| f.count(family.filled()) + f.count(family.hollow()) > 0)
        })
    }
}

impl Default for FaceTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Weight vector selecting a single symbol.
pub fn unit_weights(symbol: Symbol) -> [f64; 6] {
    let mut weights = [0.0; 6];
    if let Some(idx) = Symbol::ALL.iter().position(|&s| s == symbol) {
        weights[idx] = 1.0;
    }
    weights
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHIPPED: &str = include_str!("../../data/faces.json");

    #[test]
    fn test_shipped_file_matches_standard_table() {
        let loaded = FaceTable::from_json(SHIPPED).unwrap();
        assert_eq!(loaded, FaceTable::standard());
    }

    #[test]
    fn test_lowercase_keys_are_normalized() {
        let lowered = SHIPPED.replace("\"RED\"", "\"red\"").replace("\"BLUE\"", "\"Blue\"");
        let table = FaceTable::from_json(&lowered).unwrap();
        assert!(table.contains(DieColor::Red));
        assert!(table.contains(DieColor::Blue));
    }

    #[test]
    fn test_missing_color_is_rejected() {
        let mut raw: BTreeMap<String, serde_json::Value> = serde_json::from_str(SHIPPED).unwrap();
        raw.remove("BLACK");
        let json = serde_json::to_string(&raw).unwrap();
        match FaceTable::from_json(&json) {
            Err(FaceTableError::MissingColor(DieColor::Black)) => {}
            other => panic!("expected MissingColor(BLACK), got {:?}", other),
        }
    }

    #[test]
    fn test_wrong_face_count_is_rejected() {
        let mut raw: BTreeMap<String, Vec<Vec<String>>> = serde_json::from_str(SHIPPED).unwrap();
        raw.get_mut("GREEN").unwrap().pop();
        let json = serde_json::to_string(&raw).unwrap();
        match FaceTable::from_json(&json) {
            Err(FaceTableError::WrongFaceCount { color, found, .. }) => {
                assert_eq!(color, DieColor::Green);
                assert_eq!(found, 7);
            }
            other => panic!("expected WrongFaceCount, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_symbol_and_color() {
        let bad_symbol = SHIPPED.replacen("\"hit\"", "\"crit\"", 1);
        assert!(matches!(
            FaceTable::from_json(&bad_symbol),
            Err(FaceTableError::UnknownSymbol { .. })
        ));
        let bad_color = SHIPPED.replace("\"ORANGE\"", "\"PURPLE\"");
        assert!(matches!(
            FaceTable::from_json(&bad_color),
            Err(FaceTableError::UnknownColor(_))
        ));
    }

    #[test]
    fn test_partial_table_checks_face_count() {
        let ok = FaceTable::partial([(DieColor::Red, vec![Face::new(&[Symbol::Hit]); 8])]);
        assert!(ok.is_ok());
        let short = FaceTable::partial([(DieColor::Red, vec![Face::blank(); 6])]);
        assert!(short.is_err());
    }

    #[test]
    fn test_averages() {
        let table = FaceTable::standard();
        // RED: 2+1+1+1+1 hits over 8 faces
        assert!((table.average(DieColor::Red, Symbol::Hit) - 6.0 / 8.0).abs() < 1e-12);
        assert_eq!(table.average(DieColor::Red, Symbol::Block), 0.0);
        assert!(table.can_produce(DieColor::Blue, SymbolFamily::Block));
        assert!(!table.can_produce(DieColor::Blue, SymbolFamily::Hit));

        let reduced = FaceTable::partial([(DieColor::Red, vec![Face::blank(); 8])]).unwrap();
        assert_eq!(reduced.average(DieColor::Blue, Symbol::Block), 0.0);
    }
}
