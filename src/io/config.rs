// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! STL writer configuration

use super::stl::{StlFormat, HEADER_SIZE};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Options controlling how a triangle soup is written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriteOptions {
    /// Output encoding
    pub format: StlFormat,
    /// Name written after `solid`/`endsolid` in ASCII output
    pub solid_name: String,
    /// Text placed at the start of the binary header (at most 80 bytes are
    /// kept, the remainder is zero-filled)
    pub header: Option<String>,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            format: StlFormat::Binary,
            solid_name: String::from("stlmesh"),
            header: None,
        }
    }
}

impl WriteOptions {
    pub fn new(format: StlFormat) -> Self {
        Self {
            format,
            ..Self::default()
        }
    }

    /// Load options from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let options: WriteOptions = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        Ok(options)
    }

    /// Save options as TOML
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }

    /// The 80-byte binary header
    pub fn header_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut header = [0u8; HEADER_SIZE];
        if let Some(text) = &self.header {
            let len = text.len().min(HEADER_SIZE);
            header[..len].copy_from_slice(&text.as_bytes()[..len]);
        }
        header
    }
}
