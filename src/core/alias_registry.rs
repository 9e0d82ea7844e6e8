/*
 * Per-interface mapping from human-friendly alias to section identifier. An alias
 * names at most one section; a section normally carries at most one alias, but
 * the registry itself only enforces the alias side of the mapping.
 */
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AliasError {
    DuplicateAlias { alias: String, identifier: String },
    UnknownAlias(String),
}

impl std::fmt::Display for AliasError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AliasError::DuplicateAlias { alias, identifier } => {
                write!(f, "Alias '{alias}' is already bound to '{identifier}'")
            }
            AliasError::UnknownAlias(alias) => write!(f, "Unknown alias: {alias}"),
        }
    }
}

impl std::error::Error for AliasError {}

pub type Result<T> = std::result::Result<T, AliasError>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasRegistry {
    bindings: BTreeMap<String, String>,
}

impl AliasRegistry {
    pub fn new() -> Self {
        AliasRegistry::default()
    }

    /// Binds `alias` to `identifier`. Rebinding an alias to the identifier it already names is a no-op.
    pub fn bind(&mut self, alias: &str, identifier: &str) -> Result<()> {
        if let Some(existing) = self.bindings.get(alias) {
            if existing == identifier {
                return Ok(());
            }
            return Err(AliasError::DuplicateAlias {
                alias: alias.to_string(),
                identifier: existing.clone(),
            });
        }
        log::trace!("AliasRegistry: Binding alias '{alias}' to '{identifier}'.");
        self.bindings
            .insert(alias.to_string(), identifier.to_string());
        Ok(())
    }

    pub fn resolve(&self, alias: &str) -> Result<&str> {
        self.bindings
            .get(alias)
            .map(String::as_str)
            .ok_or_else(|| AliasError::UnknownAlias(alias.to_string()))
    }

    pub fn is_bound(&self, alias: &str) -> bool {
        self.bindings.contains_key(alias)
    }

    /// First alias (in alias order) bound to `identifier`.
    pub fn alias_for(&self, identifier: &str) -> Option<&str> {
        self.bindings
            .iter()
            .find(|(_, bound)| bound.as_str() == identifier)
            .map(|(alias, _)| alias.as_str())
    }

    /// Drops every alias pointing at `identifier` except `keep`.
    pub fn release_identifier(&mut self, identifier: &str, keep: Option<&str>) {
        self.bindings
            .retain(|alias, bound| bound != identifier || Some(alias.as_str()) == keep);
    }

    pub(crate) fn retarget(&mut self, old: &str, new: &str) {
        for bound in self.bindings.values_mut() {
            if bound == old {
                *bound = new.to_string();
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.bindings
            .iter()
            .map(|(alias, identifier)| (alias.as_str(), identifier.as_str()))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
