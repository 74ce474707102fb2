//! Meshpoint naming grammar
//!
//! The engine recognizes attachment points by name. Each category has a
//! pattern; a name is valid if any category matches it in full. Every
//! pattern also accepts a trailing `-N` duplication suffix, which the
//! authoring tool appends to keep same-named points distinct and which is
//! stripped by [`canonical_name`] before export.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::document::Meshpoint;
use crate::error::MeshError;

/// Builtin categories and their pattern bodies, in match order
pub const BUILTIN_RULES: &[(&str, &str)] = &[
    ("ability", r"ability(?:\.\d+)?"),
    ("child", r"child\.[A-Za-z0-9_]+(?:\.\d+)?"),
    ("weapon", r"weapon\.[A-Za-z0-9_]+(?:\.\d+)?"),
    ("hangar", r"hangar(?:\.\d+)?"),
    ("bomb", r"bomb(?:\.\d+)?"),
    ("exhaust", r"exhaust(?:\.\d+)?"),
    ("aura", r"aura"),
    ("center", r"center"),
    ("above", r"above"),
    ("turret_muzzle", r"turret_muzzle(?:\.\d+)?"),
    ("flair", r"flair\.[A-Za-z0-9_]+(?:\.\d+)?"),
    ("ship_build", r"ship_build"),
    ("extractor", r"extractor"),
];

/// One category of meshpoint names
#[derive(Debug, Clone)]
pub struct NamingRule {
    category: String,
    pattern: Regex,
}

impl NamingRule {
    /// Compile a rule from a pattern body
    ///
    /// The body is anchored at both ends and extended with an optional
    /// `-N` duplication suffix.
    pub fn new(category: impl Into<String>, body: &str) -> Result<Self, MeshError> {
        let category = category.into();
        match Regex::new(&format!(r"^(?:{body})(?:-\d+)?$")) {
            Ok(pattern) => Ok(Self { category, pattern }),
            Err(source) => Err(MeshError::InvalidNamingRule { category, source }),
        }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn matches(&self, name: &str) -> bool {
        self.pattern.is_match(name)
    }
}

/// Immutable, ordered table of naming rules
#[derive(Debug, Clone)]
pub struct NamingRules {
    rules: Vec<NamingRule>,
}

impl NamingRules {
    /// The builtin table, compiled once per process
    pub fn builtin() -> &'static NamingRules {
        static BUILTIN: OnceLock<NamingRules> = OnceLock::new();
        BUILTIN.get_or_init(|| {
            NamingRules::from_pairs(BUILTIN_RULES.iter().copied())
                .expect("builtin naming rules are valid patterns")
        })
    }

    /// Build a table from `(category, pattern body)` pairs
    pub fn from_pairs<C, P>(pairs: impl IntoIterator<Item = (C, P)>) -> Result<Self, MeshError>
    where
        C: Into<String>,
        P: AsRef<str>,
    {
        let rules = pairs
            .into_iter()
            .map(|(category, body)| NamingRule::new(category, body.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[NamingRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn matches(&self, name: &str) -> bool {
        self.category_of(name).is_some()
    }

    /// First category whose pattern matches the name
    pub fn category_of(&self, name: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|rule| rule.matches(name))
            .map(NamingRule::category)
    }

    /// Every name that no rule matches, in input order
    pub fn validate_names<'n>(&self, names: impl IntoIterator<Item = &'n str>) -> Vec<InvalidName> {
        names
            .into_iter()
            .enumerate()
            .filter(|(_, name)| !self.matches(name))
            .map(|(index, name)| InvalidName {
                index,
                name: name.to_string(),
            })
            .collect()
    }

    /// Every meshpoint whose name no rule matches
    pub fn validate_all(&self, meshpoints: &[Meshpoint]) -> Vec<InvalidName> {
        self.validate_names(meshpoints.iter().map(|mp| mp.name.as_str()))
    }

    /// Fail with every invalid name if any meshpoint is invalid
    pub fn ensure_valid(&self, meshpoints: &[Meshpoint]) -> Result<(), MeshError> {
        let invalid = self.validate_all(meshpoints);
        if invalid.is_empty() {
            Ok(())
        } else {
            Err(MeshError::InvalidMeshpointName(invalid))
        }
    }
}

/// Validate against the builtin table
pub fn validate_all(meshpoints: &[Meshpoint]) -> Vec<InvalidName> {
    NamingRules::builtin().validate_all(meshpoints)
}

/// A meshpoint name that matched no rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvalidName {
    /// Position among the validated names
    pub index: usize,
    pub name: String,
}

impl fmt::Display for InvalidName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}: '{}'", self.index, self.name)
    }
}

/// Strip a trailing `-N` duplication suffix
///
/// Only a suffix at the very end of the name is removed; hyphen-digit runs
/// elsewhere in the name are left alone.
pub fn canonical_name(name: &str) -> &str {
    match name.rsplit_once('-') {
        Some((base, digits))
            if !base.is_empty()
                && !digits.is_empty()
                && digits.bytes().all(|b| b.is_ascii_digit()) =>
        {
            base
        }
        _ => name,
    }
}
