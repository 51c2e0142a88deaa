//! Engine configuration: solver limits and calculation variant flags
//!
//! Defaults carry the canonical settings. A JSON file or environment variables
//! can override them:
//!   LEASING_MAX_ITERATIONS, LEASING_TOLERANCE, LEASING_IRR_METHOD,
//!   LEASING_IRR_GUESS, LEASING_VAT_RATE, LEASING_BALLOON_RESIDUAL,
//!   LEASING_IRR_ANNUALIZATION, LEASING_ALLOCATION_BASIS

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;
use std::str::FromStr;

use crate::error::{EngineError, Result};
use crate::investors::AllocationBasis;
use crate::leasing::{LeasingConfig, LeasingEngine};
use crate::solver::{IrrAnnualization, SolverConfig};

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub solver: SolverConfig,
    pub leasing: LeasingConfig,
    pub allocation_basis: AllocationBasis,
}

impl EngineConfig {
    /// Read a JSON config file; missing fields keep their defaults
    pub fn from_json_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(file)?)
    }

    /// Defaults overridden from the process environment
    pub fn from_env() -> Result<Self> {
        Self::default().with_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from any variable lookup
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = parse_var::<u32, _>(&lookup, "LEASING_MAX_ITERATIONS")? {
            self.solver.max_iterations = v;
        }
        if let Some(v) = parse_var::<f64, _>(&lookup, "LEASING_TOLERANCE")? {
            self.solver.tolerance = v;
        }
        if let Some(v) = parse_var::<f64, _>(&lookup, "LEASING_IRR_GUESS")? {
            self.solver.irr_guess = v;
        }
        if let Some(raw) = lookup("LEASING_IRR_METHOD") {
            self.solver.irr_method = raw.parse()?;
        }
        if let Some(v) = parse_var::<f64, _>(&lookup, "LEASING_VAT_RATE")? {
            self.leasing.vat_rate_pct = v;
            self.leasing.vat_on_asset_cost = v != 0.0;
        }
        if let Some(raw) = lookup("LEASING_BALLOON_RESIDUAL") {
            self.leasing.balloon_residual = parse_flag("LEASING_BALLOON_RESIDUAL", &raw)?;
        }
        if let Some(raw) = lookup("LEASING_IRR_ANNUALIZATION") {
            self.leasing.irr_annualization = match raw.trim().to_ascii_lowercase().as_str() {
                "effective" => IrrAnnualization::Effective,
                "nominal" => IrrAnnualization::Nominal,
                other => return Err(unknown("irr annualization", other)),
            };
        }
        if let Some(raw) = lookup("LEASING_ALLOCATION_BASIS") {
            self.allocation_basis = match raw.trim().to_ascii_lowercase().as_str() {
                "interest" => AllocationBasis::Interest,
                "payment" => AllocationBasis::Payment,
                other => return Err(unknown("allocation basis", other)),
            };
        }
        Ok(self)
    }

    /// Leasing engine built from this configuration
    pub fn leasing_engine(&self) -> LeasingEngine {
        LeasingEngine::new(self.leasing.clone(), self.solver.clone())
    }
}

fn unknown(kind: &str, value: &str) -> EngineError {
    EngineError::UnknownVariant {
        kind: kind.to_string(),
        value: value.to_string(),
    }
}

fn parse_var<T, F>(lookup: &F, name: &str) -> Result<Option<T>>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| EngineError::invalid(name, format!("cannot parse {:?}", raw))),
    }
}

fn parse_flag(name: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(EngineError::invalid(name, format!("expected a boolean, got {:?}", raw))),
    }
}
