/*
 * In-memory model of a metadata-augmented interface configuration. A file maps to
 * one `InterfaceConfig`, which owns its sections (keyed by identifier), the order
 * in which they appeared, the alias bindings, and the checksum read from the
 * file header. Each `Section` keeps its content as an ordered list of tagged
 * entries so that metadata, plain attributes and free-form comments come back
 * out in the order they went in.
 */
use super::alias_registry::AliasRegistry;
use std::collections::HashMap;
use std::fmt;

pub const NAME_ATTRIBUTE: &str = "Name";
pub const ALIAS_ATTRIBUTE: &str = "Alias";
pub const DISABLED_ATTRIBUTE: &str = "Disabled";

// Metadata attribute names every store recognizes, on top of any configured extras.
pub const DEFAULT_METADATA_ATTRIBUTES: [&str; 3] =
    [NAME_ATTRIBUTE, ALIAS_ATTRIBUTE, DISABLED_ATTRIBUTE];

pub const PRIVATE_KEY_ATTRIBUTE: &str = "PrivateKey";
pub const PUBLIC_KEY_ATTRIBUTE: &str = "PublicKey";

// Keys WireGuard allows to repeat; repeated lines are merged into one list value.
const LIST_VALUED_ATTRIBUTES: [&str; 3] = ["AllowedIPs", "Address", "DNS"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionType {
    Interface,
    Peer,
}

impl SectionType {
    /// Maps header text (without brackets) to a section type. Matching is exact.
    pub fn from_header(header: &str) -> Option<Self> {
        match header {
            "Interface" => Some(SectionType::Interface),
            "Peer" => Some(SectionType::Peer),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionType::Interface => "Interface",
            SectionType::Peer => "Peer",
        }
    }

    /// The plain attribute whose presence identifies a section of this type.
    pub fn identity_attribute(&self) -> &'static str {
        match self {
            SectionType::Interface => PRIVATE_KEY_ATTRIBUTE,
            SectionType::Peer => PUBLIC_KEY_ATTRIBUTE,
        }
    }
}

impl fmt::Display for SectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/*
 * Normalizes an attribute name: surrounding whitespace is removed and the first
 * character is uppercased. The remainder keeps its casing so names like
 * `AllowedIPs` and `PublicKey` survive unchanged.
 */
pub fn normalize_key(key: &str) -> String {
    let trimmed = key.trim();
    let mut chars = trimmed.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Interprets a boolean-like metadata value. Returns `None` for anything unrecognized.
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

pub fn flag_value(flag: bool) -> &'static str {
    if flag { "1" } else { "0" }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionEntry {
    Metadata { key: String, value: String },
    Plain { key: String, value: String },
    Comment(String),
}

impl SectionEntry {
    pub fn key(&self) -> Option<&str> {
        match self {
            SectionEntry::Metadata { key, .. } | SectionEntry::Plain { key, .. } => Some(key),
            SectionEntry::Comment(_) => None,
        }
    }

    pub fn value(&self) -> Option<&str> {
        match self {
            SectionEntry::Metadata { value, .. } | SectionEntry::Plain { value, .. } => {
                Some(value)
            }
            SectionEntry::Comment(_) => None,
        }
    }

    pub fn is_metadata(&self) -> bool {
        matches!(self, SectionEntry::Metadata { .. })
    }
}

/*
 * One `[Interface]` or `[Peer]` block. Attribute keys are unique per flavor
 * (metadata vs. plain) within a section; lookups ignore ASCII case. The
 * `disabled` flag is what the serializer consults and is kept in sync with the
 * `Disabled` metadata attribute whenever that attribute is written.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    identifier: String,
    section_type: SectionType,
    disabled: bool,
    entries: Vec<SectionEntry>,
}

impl Section {
    pub fn new(identifier: impl Into<String>, section_type: SectionType) -> Self {
        Section {
            identifier: identifier.into(),
            section_type,
            disabled: false,
            entries: Vec::new(),
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub(crate) fn set_identifier(&mut self, identifier: impl Into<String>) {
        self.identifier = identifier.into();
    }

    pub fn section_type(&self) -> SectionType {
        self.section_type
    }

    pub fn entries(&self) -> &[SectionEntry] {
        &self.entries
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// True when the section holds at least one metadata or plain attribute.
    pub fn has_attributes(&self) -> bool {
        self.entries
            .iter()
            .any(|entry| !matches!(entry, SectionEntry::Comment(_)))
    }

    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.find(true, key)
            .and_then(|index| self.entries[index].value())
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.find(false, key)
            .and_then(|index| self.entries[index].value())
    }

    /// Upserts a metadata attribute. Writing `Disabled` also updates the disabled flag.
    pub fn set_metadata(&mut self, key: &str, value: &str) {
        if key.eq_ignore_ascii_case(DISABLED_ATTRIBUTE) {
            self.disabled = parse_flag(value).unwrap_or(false);
        }
        self.upsert(true, key, value);
    }

    pub fn set_attribute(&mut self, key: &str, value: &str) {
        self.upsert(false, key, value);
    }

    pub fn push_comment(&mut self, text: impl Into<String>) {
        self.entries.push(SectionEntry::Comment(text.into()));
    }

    /// Sets the disabled flag and records it as the `Disabled` metadata attribute.
    pub fn set_disabled(&mut self, disabled: bool) {
        self.set_metadata(DISABLED_ATTRIBUTE, flag_value(disabled));
    }

    // Used by the parser when the header line carried the disabled marker and no
    // explicit `Disabled` attribute overrides it.
    pub(crate) fn mark_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    /*
     * Adds a plain attribute read from a file. A repeated list-valued key is merged
     * into the existing entry; any other repeated key keeps its first position and
     * takes the newer value. Returns true when an existing entry was touched.
     */
    pub(crate) fn merge_attribute(&mut self, key: &str, value: &str) -> bool {
        let Some(index) = self.find(false, key) else {
            self.entries.push(SectionEntry::Plain {
                key: normalize_key(key),
                value: value.to_string(),
            });
            return false;
        };
        if let SectionEntry::Plain {
            key: existing_key,
            value: existing,
        } = &mut self.entries[index]
        {
            if LIST_VALUED_ATTRIBUTES
                .iter()
                .any(|list_key| list_key.eq_ignore_ascii_case(existing_key))
            {
                if existing.is_empty() {
                    *existing = value.to_string();
                } else if !value.is_empty() {
                    existing.push_str(", ");
                    existing.push_str(value);
                }
            } else {
                log::warn!(
                    "Section: Attribute '{existing_key}' repeated in section '{}'; keeping the last value.",
                    self.identifier
                );
                *existing = value.to_string();
            }
        }
        true
    }

    fn find(&self, metadata: bool, key: &str) -> Option<usize> {
        let key = key.trim();
        self.entries.iter().position(|entry| {
            entry.is_metadata() == metadata
                && entry
                    .key()
                    .is_some_and(|existing| existing.eq_ignore_ascii_case(key))
        })
    }

    fn upsert(&mut self, metadata: bool, key: &str, value: &str) {
        if let Some(index) = self.find(metadata, key) {
            match &mut self.entries[index] {
                SectionEntry::Metadata { value: existing, .. }
                | SectionEntry::Plain { value: existing, .. } => *existing = value.to_string(),
                SectionEntry::Comment(_) => {}
            }
            return;
        }
        let key = normalize_key(key);
        let value = value.to_string();
        self.entries.push(if metadata {
            SectionEntry::Metadata { key, value }
        } else {
            SectionEntry::Plain { key, value }
        });
    }
}

/*
 * All sections of one interface file. `section_order` and `sections` are only
 * mutated together through the methods below, so every ordered identifier has
 * exactly one section and vice versa.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceConfig {
    name: String,
    section_order: Vec<String>,
    sections: HashMap<String, Section>,
    aliases: AliasRegistry,
    stored_checksum: Option<u32>,
}

impl InterfaceConfig {
    pub fn new(name: impl Into<String>) -> Self {
        InterfaceConfig {
            name: name.into(),
            section_order: Vec::new(),
            sections: HashMap::new(),
            aliases: AliasRegistry::new(),
            stored_checksum: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn section_order(&self) -> &[String] {
        &self.section_order
    }

    /// Sections in file order.
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.section_order
            .iter()
            .filter_map(|identifier| self.sections.get(identifier))
    }

    pub fn section(&self, identifier: &str) -> Option<&Section> {
        self.sections.get(identifier)
    }

    pub fn section_mut(&mut self, identifier: &str) -> Option<&mut Section> {
        self.sections.get_mut(identifier)
    }

    pub fn contains_section(&self, identifier: &str) -> bool {
        self.sections.contains_key(identifier)
    }

    /// Appends a section. Returns false (and leaves the config untouched) if its identifier is taken.
    #[must_use]
    pub fn insert_section(&mut self, section: Section) -> bool {
        if self.sections.contains_key(section.identifier()) {
            return false;
        }
        self.section_order.push(section.identifier().to_string());
        self.sections
            .insert(section.identifier().to_string(), section);
        true
    }

    /*
     * Moves a section to a new identifier, keeping its position in the order and
     * re-pointing any aliases bound to it. Returns false if `old` is unknown or
     * `new` is already taken by another section.
     */
    #[must_use]
    pub fn rename_section(&mut self, old: &str, new: &str) -> bool {
        if old == new {
            return self.sections.contains_key(old);
        }
        if self.sections.contains_key(new) {
            return false;
        }
        let Some(mut section) = self.sections.remove(old) else {
            return false;
        };
        section.set_identifier(new);
        self.sections.insert(new.to_string(), section);
        for identifier in self.section_order.iter_mut() {
            if identifier == old {
                *identifier = new.to_string();
            }
        }
        self.aliases.retarget(old, new);
        true
    }

    pub fn aliases(&self) -> &AliasRegistry {
        &self.aliases
    }

    pub fn aliases_mut(&mut self) -> &mut AliasRegistry {
        &mut self.aliases
    }

    /// Checksum found in the file header, `None` if the file had none.
    pub fn stored_checksum(&self) -> Option<u32> {
        self.stored_checksum
    }

    pub fn set_stored_checksum(&mut self, checksum: Option<u32>) {
        self.stored_checksum = checksum;
    }

    /// The `[Interface]` section, whose identifier is the interface name.
    pub fn interface_section(&self) -> Option<&Section> {
        self.sections
            .get(&self.name)
            .filter(|section| section.section_type() == SectionType::Interface)
    }

    pub fn private_key(&self) -> Option<&str> {
        self.interface_section()
            .and_then(|section| section.attribute(PRIVATE_KEY_ATTRIBUTE))
    }

    /// Structural equality ignoring the stored checksum.
    pub fn content_eq(&self, other: &InterfaceConfig) -> bool {
        self.name == other.name
            && self.section_order == other.section_order
            && self.sections == other.sections
            && self.aliases == other.aliases
    }
}
