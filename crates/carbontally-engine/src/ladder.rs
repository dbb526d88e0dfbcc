// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell

//! Threshold ladder: ordered upper bounds with payloads.
//!
//! One lookup routine serves both credit-award tiers and packaging
//! efficiency grades; only the ladder data and boundary mode differ.

use crate::error::{EngineError, Result};

/// How a value sitting exactly on an upper bound is classified
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    /// Value equal to a bound belongs to that rung (award tiers)
    Inclusive,
    /// Value equal to a bound belongs to the next rung (grade bands)
    Exclusive,
}

/// One rung: everything up to `upper_bound` maps to `payload`
#[derive(Debug, Clone)]
pub struct Rung<T> {
    pub upper_bound: f64,
    pub payload: T,
}

impl<T> Rung<T> {
    pub fn new(upper_bound: f64, payload: T) -> Self {
        Rung {
            upper_bound,
            payload,
        }
    }
}

/// Ordered ladder of rungs; total over finite non-negative values
///
/// The terminal rung's bound is infinite, so `lookup` always lands
/// somewhere. Malformed ladders are rejected at construction, never
/// at lookup time.
#[derive(Debug, Clone)]
pub struct Ladder<T> {
    boundary: Boundary,
    rungs: Vec<Rung<T>>,
}

impl<T> Ladder<T> {
    pub fn new(boundary: Boundary, rungs: Vec<Rung<T>>) -> Result<Self> {
        Self::check(&rungs)?;
        Ok(Ladder { boundary, rungs })
    }

    /// Construct from rungs known to be well-formed at compile time.
    /// Used for the engine's fixed band tables; catalog data goes
    /// through `new`.
    pub(crate) fn from_static(boundary: Boundary, rungs: Vec<Rung<T>>) -> Self {
        debug_assert!(Self::check(&rungs).is_ok());
        Ladder { boundary, rungs }
    }

    fn check(rungs: &[Rung<T>]) -> Result<()> {
        if rungs.is_empty() {
            return Err(EngineError::Catalog(
                "threshold ladder must have at least one rung".to_string(),
            ));
        }

        for pair in rungs.windows(2) {
            // The negated form also rejects NaN bounds
            if !(pair[1].upper_bound > pair[0].upper_bound) {
                return Err(EngineError::Catalog(format!(
                    "ladder bounds must be strictly increasing ({} then {})",
                    pair[0].upper_bound, pair[1].upper_bound
                )));
            }
        }

        let first = rungs[0].upper_bound;
        if !(first > 0.0) {
            return Err(EngineError::Catalog(format!(
                "ladder bounds must be positive, got {}",
                first
            )));
        }

        let last = rungs[rungs.len() - 1].upper_bound;
        if last != f64::INFINITY {
            return Err(EngineError::Catalog(format!(
                "ladder must end with an open-ended rung, last bound is {}",
                last
            )));
        }

        Ok(())
    }

    /// Payload of the first rung admitting `value`
    pub fn lookup(&self, value: f64) -> &T {
        for rung in &self.rungs {
            let admits = match self.boundary {
                Boundary::Inclusive => value <= rung.upper_bound,
                Boundary::Exclusive => value < rung.upper_bound,
            };
            if admits {
                return &rung.payload;
            }
        }
        // Unreachable for finite values: the terminal bound is infinite
        &self.rungs[self.rungs.len() - 1].payload
    }

    pub fn rungs(&self) -> &[Rung<T>] {
        &self.rungs
    }

    pub fn boundary(&self) -> Boundary {
        self.boundary
    }
}
