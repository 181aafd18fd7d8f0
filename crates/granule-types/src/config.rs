// ─────────────────────────────────────────────────────────────────────
// Granule AMR Core — Config
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Run configuration loaded from JSON.
//!
//! Scheme variants and optional capabilities are plain data resolved at
//! configuration time; nothing in the core is gated by conditional
//! compilation.

use crate::error::GranuleResult;
use crate::geometry::DomainGeometry;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level run configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub domain: DomainConfig,
    pub scheme: SolverScheme,
    pub fields: FieldLayout,
    #[serde(default)]
    pub capabilities: Capabilities,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainConfig {
    pub box_size: [f64; 3],
    pub periodic: [bool; 3],
    pub base_cells: [usize; 3],
    pub max_level: usize,
}

/// Solver scheme of the run. `Hybrid` runs fluid levels below a
/// per-level switch to the wave representation and enables the
/// level-wide wave flag mechanics during refinement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SolverScheme {
    Fluid,
    Wave,
    Hybrid,
}

/// Optional capabilities, orthogonal to the scheme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    #[serde(default)]
    pub particles: bool,
    #[serde(default)]
    pub gravity: bool,
}

/// Field component layout of every patch block.
///
/// Component 0 of the intrinsic sector is the density field; the
/// passive sector follows the intrinsic one. Sequence lengths derived
/// from this layout are validated at the API boundaries instead of
/// being baked in at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldLayout {
    pub n_intrinsic: usize,
    pub n_passive: usize,
}

impl FieldLayout {
    pub fn total(&self) -> usize {
        self.n_intrinsic + self.n_passive
    }

    /// Block component index of passive scalar `p`.
    pub fn passive_index(&self, p: usize) -> usize {
        self.n_intrinsic + p
    }
}

impl DomainConfig {
    pub fn geometry(&self) -> GranuleResult<DomainGeometry> {
        DomainGeometry::new(self.box_size, self.periodic, self.base_cells, self.max_level)
    }
}

impl SimulationConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> GranuleResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}
