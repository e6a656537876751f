//! Reader for the ledger server's sectioned config file.
//!
//! ```text
//! # comment
//! [database_path]
//! /var/lib/rippled/db
//!
//! [validation_quorum]
//! 3
//! ```
//!
//! A section with one line is a scalar, several lines a list, and a section
//! whose lines are all `key=value` pairs a map.

use crate::utils::{LedgerToolError, Result};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

lazy_static! {
    static ref SECTION: Regex = Regex::new(r"^\[\s*([^\]\s]+)\s*\]$").expect("section regex");
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValue {
    Scalar(String),
    List(Vec<String>),
    Map(BTreeMap<String, String>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RippledConfig {
    sections: BTreeMap<String, ConfigValue>,
}

impl RippledConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            LedgerToolError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let mut sections = BTreeMap::new();
        let mut current: Option<(String, Vec<String>)> = None;

        for (lineno, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some(caps) = SECTION.captures(line) {
                if let Some((name, lines)) = current.take() {
                    sections.insert(name, to_value(lines));
                }
                current = Some((caps[1].to_string(), Vec::new()));
                continue;
            }
            match current.as_mut() {
                Some((_, lines)) => lines.push(line.to_string()),
                None => {
                    return Err(LedgerToolError::Config(format!(
                        "line {}: '{}' is outside any [section]",
                        lineno + 1,
                        line
                    )))
                }
            }
        }
        if let Some((name, lines)) = current {
            sections.insert(name, to_value(lines));
        }
        Ok(Self { sections })
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.sections.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.sections.get(key)? {
            ConfigValue::Scalar(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn get_u64(&self, key: &str) -> Result<Option<u64>> {
        self.get_str(key)
            .map(|s| {
                s.parse().map_err(|_| {
                    LedgerToolError::Config(format!("[{}] is not a number: '{}'", key, s))
                })
            })
            .transpose()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

fn to_value(lines: Vec<String>) -> ConfigValue {
    if !lines.is_empty() && lines.iter().all(|l| l.contains('=')) {
        let map = lines
            .iter()
            .filter_map(|l| l.split_once('='))
            .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
            .collect();
        return ConfigValue::Map(map);
    }
    if lines.len() == 1 {
        return ConfigValue::Scalar(lines.into_iter().next().unwrap_or_default());
    }
    ConfigValue::List(lines)
}
