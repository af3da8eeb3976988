// src/script/template.rs

//! Minimal `{{ name }}` placeholder templates.
//!
//! Generated PowerShell is full of `{`, `}` and `$`, so the only special
//! syntax is a double-brace placeholder. Every placeholder must be bound;
//! a missing value is an error rather than an empty substitution.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::errors::{DurableTaskError, Result};

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").expect("placeholder regex is valid")
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Template {
    source: &'static str,
}

impl Template {
    pub const fn new(source: &'static str) -> Self {
        Self { source }
    }

    /// Names of all placeholders, sorted and deduplicated.
    pub fn placeholders(&self) -> BTreeSet<&'static str> {
        placeholder_regex()
            .captures_iter(self.source)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
            .collect()
    }

    /// Substitute every placeholder with its bound value.
    ///
    /// Values are inserted verbatim; they are never re-scanned for
    /// placeholders.
    pub fn render(&self, vars: &[(&str, &str)]) -> Result<String> {
        if let Some(missing) = self
            .placeholders()
            .into_iter()
            .find(|name| !vars.iter().any(|(k, _)| k == name))
        {
            return Err(DurableTaskError::Template(missing.to_string()));
        }

        let rendered = placeholder_regex().replace_all(self.source, |caps: &Captures<'_>| {
            let name = &caps[1];
            vars.iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| (*v).to_string())
                .unwrap_or_default()
        });

        Ok(rendered.into_owned())
    }
}
