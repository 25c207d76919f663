use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonSymbol {
    Int(i64),
    String(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolValue {
    Int(i64),
    String(String),
}

impl From<JsonSymbol> for SymbolValue {
    fn from(value: JsonSymbol) -> Self {
        match value {
            JsonSymbol::Int(i) => SymbolValue::Int(i),
            JsonSymbol::String(s) => SymbolValue::String(s),
        }
    }
}

#[derive(Debug, Error)]
pub enum SymbolError {
    #[error("symbol {0} is not defined")]
    Missing(String),
    #[error("symbol {0} is not an integer")]
    NotInt(String),
    #[error("symbol {0} is not a string")]
    NotString(String),
    #[error("symbol {name} = {value} does not fit a chunk number")]
    OutOfRange { name: String, value: i64 },
    #[error("reading symbol file: {0}")]
    Io(#[from] std::io::Error),
    #[error("parsing symbol file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Episode variables: chunk/sound numbers and strings keyed by their legacy
/// names (`PIC_MENUCARD`, `SOUND_GALAXYEXPLODE`, `ck5_str_fuseDestroyed`).
#[derive(Debug, Default, Clone)]
pub struct SymbolTable {
    values: BTreeMap<String, SymbolValue>,
}

impl SymbolTable {
    pub fn from_json_str(raw: &str) -> Result<Self, SymbolError> {
        let map: BTreeMap<String, JsonSymbol> = serde_json::from_str(raw)?;
        Ok(SymbolTable {
            values: map
                .into_iter()
                .map(|(name, value)| (name, SymbolValue::from(value)))
                .collect(),
        })
    }

    pub fn from_json_file(path: &Path) -> Result<Self, SymbolError> {
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn insert_int(&mut self, name: impl Into<String>, value: i64) {
        self.values.insert(name.into(), SymbolValue::Int(value));
    }

    pub fn insert_string(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values
            .insert(name.into(), SymbolValue::String(value.into()));
    }

    /// Merges `other` over `self`; later definitions win.
    pub fn extend(&mut self, other: SymbolTable) {
        self.values.extend(other.values);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn int(&self, name: &str) -> Result<i64, SymbolError> {
        match self.values.get(name) {
            Some(SymbolValue::Int(value)) => Ok(*value),
            Some(SymbolValue::String(_)) => Err(SymbolError::NotInt(name.to_string())),
            None => Err(SymbolError::Missing(name.to_string())),
        }
    }

    pub fn string(&self, name: &str) -> Result<&str, SymbolError> {
        match self.values.get(name) {
            Some(SymbolValue::String(value)) => Ok(value.as_str()),
            Some(SymbolValue::Int(_)) => Err(SymbolError::NotString(name.to_string())),
            None => Err(SymbolError::Missing(name.to_string())),
        }
    }

    /// Looks up a graphics or audio chunk number.
    pub fn chunk(&self, name: &str) -> Result<u16, SymbolError> {
        let value = self.int(name)?;
        u16::try_from(value).map_err(|_| SymbolError::OutOfRange {
            name: name.to_string(),
            value,
        })
    }
}
