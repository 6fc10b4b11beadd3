//! Converter registry keyed by `(source, target)` format pair and tier.
//!
//! A registry is filled through `&mut` during start-up and then shared,
//! typically as `Arc<ConverterRegistry>`. Lookups take `&self` only, so every
//! registration happens before the first concurrent read.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::format::Format;

/// Tier of a registered converter. Higher tiers win best-available lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FunctionPriority {
    /// Portable scalar fallback.
    Generic,
    /// SIMD-accelerated.
    Vectorized,
}

impl FunctionPriority {
    /// All tiers, lowest first.
    pub const ALL: [FunctionPriority; 2] = [FunctionPriority::Generic, FunctionPriority::Vectorized];

    /// Host name of the tier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            FunctionPriority::Generic => "GENERIC",
            FunctionPriority::Vectorized => "VECTORIZED",
        }
    }
}

impl fmt::Display for FunctionPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FunctionPriority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "GENERIC" => Ok(FunctionPriority::Generic),
            "VECTORIZED" => Ok(FunctionPriority::Vectorized),
            other => Err(Error::InvalidArgument(format!("unknown priority: {other:?}"))),
        }
    }
}

/// How a converter treats its scalar argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarRule {
    /// The scalar has no effect (the S8 <-> S16 shifts).
    Ignored,
    /// Every real component is multiplied by the scalar.
    Multiply,
    /// Each complex sample is multiplied by `complex(scalar, 0)`.
    ComplexMultiply,
}

impl ScalarRule {
    /// Returns `true` when the converter's output depends on the scalar.
    #[must_use]
    pub const fn applies_scalar(self) -> bool {
        !matches!(self, ScalarRule::Ignored)
    }
}

type ConvertFn = dyn Fn(&[u8], &mut [u8], usize, f64) -> Result<()> + Send + Sync;

/// A registered conversion function.
///
/// Calling [`Converter::convert`] reads `count` elements from `src`, writes
/// `count` elements to `dst` and applies the scalar according to
/// [`Converter::scalar_rule`]. Cloning is cheap.
#[derive(Clone)]
pub struct Converter {
    func: Arc<ConvertFn>,
    scalar_rule: ScalarRule,
}

impl Converter {
    /// Wraps a conversion closure.
    pub fn new<F>(scalar_rule: ScalarRule, func: F) -> Self
    where
        F: Fn(&[u8], &mut [u8], usize, f64) -> Result<()> + Send + Sync + 'static,
    {
        Self {
            func: Arc::new(func),
            scalar_rule,
        }
    }

    /// Scalar handling declared at registration.
    #[must_use]
    pub fn scalar_rule(&self) -> ScalarRule {
        self.scalar_rule
    }

    /// Runs the conversion.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] when the buffers do not satisfy the
    /// conversion contract; nothing is written in that case.
    #[inline]
    pub fn convert(&self, src: &[u8], dst: &mut [u8], count: usize, scalar: f64) -> Result<()> {
        (self.func)(src, dst, count, scalar)
    }
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Converter")
            .field("scalar_rule", &self.scalar_rule)
            .finish_non_exhaustive()
    }
}

/// Tiered table of converters.
#[derive(Debug, Default, Clone)]
pub struct ConverterRegistry {
    entries: BTreeMap<(Format, Format), BTreeMap<FunctionPriority, Converter>>,
}

impl ConverterRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the generic tier and the vectorized catalog.
    ///
    /// # Errors
    ///
    /// Propagates a rejected registration (not expected for the built-in tables).
    pub fn with_defaults() -> Result<Self> {
        let mut registry = Self::new();
        crate::generic::register_generic(&mut registry)?;
        crate::catalog::register_vectorized(&mut registry)?;
        Ok(registry)
    }

    /// Registers `converter` under `(source, target, priority)`.
    ///
    /// A later registration for the same key and tier replaces the earlier one.
    ///
    /// # Errors
    ///
    /// [`Error::RegistrationRejected`] for a same-format pair whose converter
    /// ignores the scalar, since it would only copy.
    pub fn register(
        &mut self,
        source: Format,
        target: Format,
        priority: FunctionPriority,
        converter: Converter,
    ) -> Result<()> {
        if source == target && !converter.scalar_rule().applies_scalar() {
            return Err(Error::RegistrationRejected {
                from: source,
                to: target,
                reason: "a same-format converter must apply the scalar".to_string(),
            });
        }

        let replaced = self
            .entries
            .entry((source, target))
            .or_default()
            .insert(priority, converter)
            .is_some();
        debug!(%source, %target, %priority, replaced, "converter registered");
        Ok(())
    }

    /// Looks up the converter at exactly `priority`.
    ///
    /// # Errors
    ///
    /// [`Error::ConverterNotFound`] when no converter is registered at that tier.
    pub fn get_function(
        &self,
        source: Format,
        target: Format,
        priority: FunctionPriority,
    ) -> Result<Converter> {
        self.entries
            .get(&(source, target))
            .and_then(|tiers| tiers.get(&priority))
            .cloned()
            .ok_or(Error::ConverterNotFound {
                from: source,
                to: target,
                priority: Some(priority),
            })
    }

    /// Looks up the highest-tier converter for the pair.
    ///
    /// # Errors
    ///
    /// [`Error::ConverterNotFound`] when the pair has no converter at all.
    pub fn get_best_function(&self, source: Format, target: Format) -> Result<Converter> {
        self.entries
            .get(&(source, target))
            .and_then(|tiers| tiers.values().next_back())
            .cloned()
            .ok_or(Error::ConverterNotFound {
                from: source,
                to: target,
                priority: None,
            })
    }

    /// [`get_function`](Self::get_function) with host string identifiers.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownFormat`] for an unknown id, otherwise as `get_function`.
    pub fn get_function_by_id(
        &self,
        source: &str,
        target: &str,
        priority: FunctionPriority,
    ) -> Result<Converter> {
        self.get_function(source.parse()?, target.parse()?, priority)
    }

    /// Returns `true` when a converter exists at exactly `priority`.
    #[must_use]
    pub fn contains(&self, source: Format, target: Format, priority: FunctionPriority) -> bool {
        self.entries
            .get(&(source, target))
            .is_some_and(|tiers| tiers.contains_key(&priority))
    }

    /// Formats that have at least one outgoing converter.
    #[must_use]
    pub fn list_source_formats(&self) -> Vec<Format> {
        let mut formats: Vec<Format> = self.entries.keys().map(|&(source, _)| source).collect();
        formats.dedup();
        formats
    }

    /// Targets reachable from `source`.
    #[must_use]
    pub fn list_target_formats(&self, source: Format) -> Vec<Format> {
        self.entries
            .keys()
            .filter(|(s, _)| *s == source)
            .map(|&(_, target)| target)
            .collect()
    }

    /// Tiers registered for the pair, lowest first.
    #[must_use]
    pub fn list_priorities(&self, source: Format, target: Format) -> Vec<FunctionPriority> {
        self.entries
            .get(&(source, target))
            .map(|tiers| tiers.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Number of `(pair, tier)` entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }

    /// Returns `true` when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
