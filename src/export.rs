//! Network bundle export: structure and CPTs persisted as one unit.
//!
//! A consumer never loads tables without the structure they were built
//! for, and every load is validated before it reaches the sampler.
//!
//! ```text
//! build_cpts() → NetworkBundle → write_bundle() → JSON
//!   → read_bundle() → validated NetworkBundle → BayesNet
//! ```

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::*;
use crate::{Error, Result};

/// Bundle format written by this version.
pub const FORMAT_VERSION: u32 = 1;

/// Structure plus matching CPTs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkBundle {
    pub format_version: u32,
    pub structure: NetworkStructure,
    pub cpts: CptCollection,
}

impl NetworkBundle {
    /// Pair a structure with its tables, checking they fit together.
    pub fn new(structure: NetworkStructure, cpts: CptCollection) -> Result<Self> {
        cpts.validate_against(&structure)?;
        Ok(Self { format_version: FORMAT_VERSION, structure, cpts })
    }

    pub fn into_parts(self) -> (NetworkStructure, CptCollection) {
        (self.structure, self.cpts)
    }
}

/// Serialize a bundle as pretty-printed JSON.
pub fn write_bundle(bundle: &NetworkBundle, writer: &mut dyn Write) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, bundle)?;
    writeln!(writer)?;
    debug!(
        variables = bundle.structure.len(),
        tables = bundle.cpts.len(),
        "network bundle written"
    );
    Ok(())
}

/// Deserialize and validate a bundle.
pub fn read_bundle(reader: &mut dyn Read) -> Result<NetworkBundle> {
    let bundle: NetworkBundle = serde_json::from_reader(reader)?;
    if bundle.format_version != FORMAT_VERSION {
        return Err(Error::UnsupportedFormat(bundle.format_version));
    }
    bundle.cpts.validate_against(&bundle.structure)?;
    debug!(variables = bundle.structure.len(), "network bundle loaded");
    Ok(bundle)
}
