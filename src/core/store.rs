/*
 * `MetaConfigStore` is the facade over everything in `core`: it loads every
 * interface file from the configuration directory into memory, answers queries,
 * applies metadata mutations (names, aliases, enable/disable), adds interfaces
 * and peers, and commits the model back to disk through the serializer.
 *
 * File access and the external `wg` tool are injected as `ConfigFileOperations`
 * and `KeyToolOperations`, so the store itself does no I/O of its own. Integrity
 * warnings (checksum drift, redundant toggles) are logged and kept in
 * `warnings()`; they never abort an operation. Validation failures return an
 * error before anything in the model is touched.
 */
use super::alias_registry::AliasError;
use super::checksum_utils::{ChecksumStatus, compute_checksum, verify_checksum};
use super::client_config::{ClientConfigParams, render_client_config};
use super::config::StoreSettings;
use super::file_system::{ConfigFileOperations, FileSystemError, interface_name_from_path};
use super::key_tool::{KeyToolError, KeyToolOperations};
use super::line_classifier::{MetaPrefixes, PrefixError};
use super::models::{
    ALIAS_ATTRIBUTE, DEFAULT_METADATA_ATTRIBUTES, DISABLED_ATTRIBUTE, InterfaceConfig,
    NAME_ATTRIBUTE, PRIVATE_KEY_ATTRIBUTE, PUBLIC_KEY_ATTRIBUTE, Section, SectionType,
    flag_value, normalize_key, parse_flag,
};
use super::path_utils;
use super::section_parser::{ParseError, parse_interface_config};
use super::serializer::render_interface_config;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const FALLBACK_CLIENT_ALLOWED_IPS: &str = "0.0.0.0/0";

#[derive(Debug)]
pub enum StoreError {
    Parse {
        interface: String,
        source: ParseError,
    },
    NoConfigFiles(PathBuf),
    InvalidPrefixes(PrefixError),
    InvalidInterface(String),
    InvalidIdentifier {
        interface: String,
        identifier: String,
    },
    InvalidAlias {
        interface: String,
        alias: String,
    },
    DuplicateInterface(String),
    DuplicateIdentifier {
        interface: String,
        identifier: String,
    },
    DuplicateAlias {
        interface: String,
        alias: String,
        identifier: String,
    },
    InvalidValue {
        attribute: String,
        value: String,
    },
    MissingPrivateKey(String),
    Io {
        path: PathBuf,
        source: FileSystemError,
    },
    KeyTool(KeyToolError),
}

impl From<PrefixError> for StoreError {
    fn from(err: PrefixError) -> Self {
        StoreError::InvalidPrefixes(err)
    }
}

impl From<KeyToolError> for StoreError {
    fn from(err: KeyToolError) -> Self {
        StoreError::KeyTool(err)
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Parse { interface, source } => {
                write!(f, "Failed to parse config for '{interface}': {source}")
            }
            StoreError::NoConfigFiles(dir) => write!(f, "No config files found in {dir:?}"),
            StoreError::InvalidPrefixes(e) => write!(f, "Invalid prefixes: {e}"),
            StoreError::InvalidInterface(interface) => write!(f, "Unknown interface: {interface}"),
            StoreError::InvalidIdentifier {
                interface,
                identifier,
            } => write!(f, "Unknown section '{identifier}' on interface '{interface}'"),
            StoreError::InvalidAlias { interface, alias } => {
                write!(f, "Unknown alias '{alias}' on interface '{interface}'")
            }
            StoreError::DuplicateInterface(interface) => {
                write!(f, "Interface '{interface}' already exists")
            }
            StoreError::DuplicateIdentifier {
                interface,
                identifier,
            } => write!(
                f,
                "Section '{identifier}' already exists on interface '{interface}'"
            ),
            StoreError::DuplicateAlias {
                interface,
                alias,
                identifier,
            } => write!(
                f,
                "Alias '{alias}' on interface '{interface}' is already bound to '{identifier}'"
            ),
            StoreError::InvalidValue { attribute, value } => {
                write!(f, "Invalid value '{value}' for attribute '{attribute}'")
            }
            StoreError::MissingPrivateKey(interface) => {
                write!(f, "Interface '{interface}' has no [Interface] PrivateKey")
            }
            StoreError::Io { path, source } => write!(f, "I/O error for {path:?}: {source}"),
            StoreError::KeyTool(e) => write!(f, "Key tool error: {e}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Parse { source, .. } => Some(source),
            StoreError::InvalidPrefixes(e) => Some(e),
            StoreError::Io { source, .. } => Some(source),
            StoreError::KeyTool(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Non-fatal conditions reported while loading or mutating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityWarning {
    ChecksumMismatch {
        interface: String,
        stored: u32,
        computed: u32,
    },
    AlreadyInState {
        interface: String,
        identifier: String,
        disabled: bool,
    },
}

impl std::fmt::Display for IntegrityWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntegrityWarning::ChecksumMismatch {
                interface,
                stored,
                computed,
            } => write!(
                f,
                "Config '{interface}' was modified externally (checksum {stored} != {computed})"
            ),
            IntegrityWarning::AlreadyInState {
                interface,
                identifier,
                disabled,
            } => write!(
                f,
                "Section '{identifier}' on '{interface}' is already {}",
                if *disabled { "disabled" } else { "enabled" }
            ),
        }
    }
}

/// Input for `MetaConfigStore::provision_peer`.
#[derive(Debug, Clone, Copy)]
pub struct PeerRequest<'a> {
    pub name: &'a str,
    pub address: &'a str,
    pub alias: Option<&'a str>,
    pub endpoint: Option<&'a str>,
    // Routes the client sends through the tunnel; defaults to the interface's Address.
    pub client_allowed_ips: Option<&'a str>,
}

/// Keys and client config for a peer created by `provision_peer`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerCredentials {
    pub private_key: String,
    pub public_key: String,
    pub client_config: String,
}

pub struct MetaConfigStore {
    config_dir: PathBuf,
    dry_run_suffix: String,
    prefixes: MetaPrefixes,
    metadata_attributes: Vec<String>,
    interfaces: BTreeMap<String, InterfaceConfig>,
    // File each interface was loaded from; interfaces added in memory have none yet.
    sources: BTreeMap<String, PathBuf>,
    dirty: bool,
    warnings: Vec<IntegrityWarning>,
    files: Arc<dyn ConfigFileOperations>,
    key_tool: Arc<dyn KeyToolOperations>,
}

impl MetaConfigStore {
    /*
     * Creates a store with no interfaces. Prefixes from `settings` are validated
     * here; extra metadata attribute names are normalized and merged with the
     * defaults.
     */
    pub fn empty(
        settings: &StoreSettings,
        files: Arc<dyn ConfigFileOperations>,
        key_tool: Arc<dyn KeyToolOperations>,
    ) -> Result<Self> {
        let prefixes = MetaPrefixes::new(&settings.metadata_prefix, &settings.disabled_prefix)?;
        let mut metadata_attributes: Vec<String> = DEFAULT_METADATA_ATTRIBUTES
            .iter()
            .map(|name| name.to_string())
            .collect();
        for extra in &settings.extra_metadata_attributes {
            let name = normalize_key(extra);
            if !name.is_empty()
                && !metadata_attributes
                    .iter()
                    .any(|known| known.eq_ignore_ascii_case(&name))
            {
                metadata_attributes.push(name);
            }
        }
        Ok(MetaConfigStore {
            config_dir: settings.config_dir.clone(),
            dry_run_suffix: settings.dry_run_suffix.clone(),
            prefixes,
            metadata_attributes,
            interfaces: BTreeMap::new(),
            sources: BTreeMap::new(),
            dirty: false,
            warnings: Vec::new(),
            files,
            key_tool,
        })
    }

    /*
     * Loads every file matching `settings.file_pattern` in `settings.config_dir`.
     * An empty directory is an error, as is any file that fails to parse; in that
     * case no store is returned at all.
     */
    pub fn load(
        settings: &StoreSettings,
        files: Arc<dyn ConfigFileOperations>,
        key_tool: Arc<dyn KeyToolOperations>,
    ) -> Result<Self> {
        let mut store = Self::empty(settings, files, key_tool)?;
        let paths = store
            .files
            .list_config_files(&settings.config_dir, &settings.file_pattern)
            .map_err(|source| StoreError::Io {
                path: settings.config_dir.clone(),
                source,
            })?;
        if paths.is_empty() {
            return Err(StoreError::NoConfigFiles(settings.config_dir.clone()));
        }
        for path in &paths {
            store.load_file(path)?;
        }
        log::debug!(
            "MetaConfigStore: Loaded {} interfaces from {:?}.",
            store.interfaces.len(),
            settings.config_dir
        );
        Ok(store)
    }

    fn load_file(&mut self, path: &Path) -> Result<()> {
        let interface = interface_name_from_path(path).ok_or_else(|| StoreError::Io {
            path: path.to_path_buf(),
            source: FileSystemError::InvalidPath(path.to_path_buf()),
        })?;
        let text = self
            .files
            .read_config(path)
            .map_err(|source| StoreError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        let config = parse_interface_config(&interface, &text, &self.prefixes).map_err(
            |source| StoreError::Parse {
                interface: interface.clone(),
                source,
            },
        )?;

        let computed = compute_checksum(&render_interface_config(&config, &self.prefixes, true));
        if let ChecksumStatus::Mismatch { stored, computed } =
            verify_checksum(&interface, config.stored_checksum(), computed)
        {
            self.warnings.push(IntegrityWarning::ChecksumMismatch {
                interface: interface.clone(),
                stored,
                computed,
            });
        }
        self.sources.insert(interface.clone(), path.to_path_buf());
        self.interfaces.insert(interface, config);
        Ok(())
    }

    pub fn prefixes(&self) -> &MetaPrefixes {
        &self.prefixes
    }

    /// Recognized metadata attribute names, defaults first.
    pub fn metadata_attributes(&self) -> &[String] {
        &self.metadata_attributes
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn warnings(&self) -> &[IntegrityWarning] {
        &self.warnings
    }

    pub fn get_interface_list(&self) -> Vec<String> {
        self.interfaces.keys().cloned().collect()
    }

    /// Section identifiers of `interface` in file order; empty for an unknown interface.
    pub fn get_section_list(&self, interface: &str) -> Vec<String> {
        self.interfaces
            .get(interface)
            .map(|config| config.section_order().to_vec())
            .unwrap_or_default()
    }

    pub fn get_section(&self, interface: &str, identifier: &str) -> Option<&Section> {
        self.interfaces
            .get(interface)
            .and_then(|config| config.section(identifier))
    }

    pub fn interface_config(&self, interface: &str) -> Option<&InterfaceConfig> {
        self.interfaces.get(interface)
    }

    pub fn translate_alias(&self, interface: &str, alias: &str) -> Result<String> {
        let config = self.config(interface)?;
        config
            .aliases()
            .resolve(alias)
            .map(str::to_string)
            .map_err(|_| StoreError::InvalidAlias {
                interface: interface.to_string(),
                alias: alias.to_string(),
            })
    }

    /// Renders one interface the way `commit` would write it.
    pub fn render_interface(&self, interface: &str, plain: bool) -> Result<String> {
        let config = self.config(interface)?;
        Ok(render_interface_config(config, &self.prefixes, plain))
    }

    /*
     * Sets an attribute on a section.
     *
     * Recognized metadata attributes are written into the model. Anything else is
     * forwarded to the key tool (`wg set`) unless `allow_non_meta` is true, in
     * which case it is written into the model as a plain attribute. Setting a
     * peer's `PublicKey` this way moves the section to the new identifier.
     */
    pub fn set(
        &mut self,
        interface: &str,
        identifier: &str,
        attribute: &str,
        value: &str,
        allow_non_meta: bool,
    ) -> Result<()> {
        let attribute = normalize_key(attribute);
        let section_type = self.section(interface, identifier)?.section_type();
        check_attribute_name(&attribute)?;
        check_value(&attribute, value)?;

        if let Some(metadata_name) = self.recognized_metadata(&attribute) {
            let metadata_name = metadata_name.to_string();
            return self.set_metadata(interface, identifier, &metadata_name, value);
        }

        if !allow_non_meta {
            log::debug!(
                "MetaConfigStore: Forwarding '{attribute}' for '{identifier}' on '{interface}' to the key tool."
            );
            self.key_tool
                .set_attribute(interface, section_type, identifier, &attribute, value)?;
            return Ok(());
        }
        self.set_plain(interface, identifier, section_type, &attribute, value)
    }

    pub fn set_by_alias(
        &mut self,
        interface: &str,
        alias: &str,
        attribute: &str,
        value: &str,
        allow_non_meta: bool,
    ) -> Result<()> {
        let identifier = self.translate_alias(interface, alias)?;
        self.set(interface, &identifier, attribute, value, allow_non_meta)
    }

    pub fn enable(&mut self, interface: &str, identifier: &str) -> Result<()> {
        self.set_disabled(interface, identifier, false)
    }

    pub fn disable(&mut self, interface: &str, identifier: &str) -> Result<()> {
        self.set_disabled(interface, identifier, true)
    }

    pub fn enable_by_alias(&mut self, interface: &str, alias: &str) -> Result<()> {
        let identifier = self.translate_alias(interface, alias)?;
        self.enable(interface, &identifier)
    }

    pub fn disable_by_alias(&mut self, interface: &str, alias: &str) -> Result<()> {
        let identifier = self.translate_alias(interface, alias)?;
        self.disable(interface, &identifier)
    }

    /// Adds a new interface with a minimal `[Interface]` section.
    pub fn add_interface(
        &mut self,
        name: &str,
        address: &str,
        listen_port: u16,
        private_key: &str,
    ) -> Result<()> {
        if self.interfaces.contains_key(name) {
            return Err(StoreError::DuplicateInterface(name.to_string()));
        }
        if name.is_empty()
            || name.contains(['/', '\\'])
            || name.chars().any(|c| c.is_whitespace() || c.is_control())
        {
            return Err(StoreError::InvalidValue {
                attribute: "interface name".to_string(),
                value: name.to_string(),
            });
        }
        check_value("Address", address)?;
        check_value(PRIVATE_KEY_ATTRIBUTE, private_key)?;

        let mut section = Section::new(name, SectionType::Interface);
        section.set_attribute("Address", address);
        section.set_attribute("ListenPort", &listen_port.to_string());
        section.set_attribute(PRIVATE_KEY_ATTRIBUTE, private_key);
        let mut config = InterfaceConfig::new(name);
        let inserted = config.insert_section(section);
        debug_assert!(inserted, "fresh interface config cannot hold a section yet");

        self.interfaces.insert(name.to_string(), config);
        self.dirty = true;
        log::debug!("MetaConfigStore: Added interface '{name}'.");
        Ok(())
    }

    /*
     * Adds a `[Peer]` section to `interface` and returns the interface's private
     * key, which the caller needs to derive the public key its new peer should
     * point at. Nothing is changed if any check fails.
     */
    pub fn add_peer(
        &mut self,
        interface: &str,
        name: &str,
        address: &str,
        public_key: &str,
        alias: Option<&str>,
        preshared_key: Option<&str>,
    ) -> Result<String> {
        let alias = alias.filter(|alias| !alias.is_empty());
        if public_key.trim().is_empty() {
            return Err(StoreError::InvalidValue {
                attribute: PUBLIC_KEY_ATTRIBUTE.to_string(),
                value: public_key.to_string(),
            });
        }
        check_value(NAME_ATTRIBUTE, name)?;
        check_value("AllowedIPs", address)?;
        check_value(PUBLIC_KEY_ATTRIBUTE, public_key)?;
        if let Some(alias) = alias {
            check_value(ALIAS_ATTRIBUTE, alias)?;
        }
        if let Some(preshared_key) = preshared_key {
            check_value("PresharedKey", preshared_key)?;
        }
        let config = self.config(interface)?;
        if config.contains_section(public_key) {
            return Err(StoreError::DuplicateIdentifier {
                interface: interface.to_string(),
                identifier: public_key.to_string(),
            });
        }
        if let Some(alias) = alias
            && let Ok(existing) = config.aliases().resolve(alias)
        {
            return Err(StoreError::DuplicateAlias {
                interface: interface.to_string(),
                alias: alias.to_string(),
                identifier: existing.to_string(),
            });
        }
        let private_key = config
            .private_key()
            .ok_or_else(|| StoreError::MissingPrivateKey(interface.to_string()))?
            .to_string();

        let mut section = Section::new(public_key, SectionType::Peer);
        section.set_metadata(NAME_ATTRIBUTE, name);
        section.set_attribute(PUBLIC_KEY_ATTRIBUTE, public_key);
        section.set_attribute("AllowedIPs", address);
        if let Some(alias) = alias {
            section.set_metadata(ALIAS_ATTRIBUTE, alias);
        }
        if let Some(preshared_key) = preshared_key {
            section.set_attribute("PresharedKey", preshared_key);
        }

        let config = self.config_mut(interface)?;
        if let Some(alias) = alias {
            bind_alias(config, interface, alias, public_key)?;
        }
        if !config.insert_section(section) {
            return Err(StoreError::DuplicateIdentifier {
                interface: interface.to_string(),
                identifier: public_key.to_string(),
            });
        }
        self.dirty = true;
        log::debug!("MetaConfigStore: Added peer '{name}' ({public_key}) to '{interface}'.");
        Ok(private_key)
    }

    /// Public key of `interface`, derived from its stored private key by the key tool.
    pub fn interface_public_key(&self, interface: &str) -> Result<String> {
        let private_key = self
            .config(interface)?
            .private_key()
            .ok_or_else(|| StoreError::MissingPrivateKey(interface.to_string()))?;
        Ok(self.key_tool.derive_public_key(private_key)?)
    }

    /*
     * Generates a keypair for a new peer, adds it to `interface`, and renders the
     * config the peer installs on its side. Key tool calls happen before the model
     * is touched, so a failing tool leaves the store unchanged.
     */
    pub fn provision_peer(
        &mut self,
        interface: &str,
        request: &PeerRequest<'_>,
    ) -> Result<PeerCredentials> {
        check_value(NAME_ATTRIBUTE, request.name)?;
        check_value("AllowedIPs", request.address)?;
        for (attribute, value) in [
            (ALIAS_ATTRIBUTE, request.alias),
            ("Endpoint", request.endpoint),
            ("AllowedIPs", request.client_allowed_ips),
        ] {
            if let Some(value) = value {
                check_value(attribute, value)?;
            }
        }
        let server_public_key = self.interface_public_key(interface)?;
        let keypair = self.key_tool.generate_keypair()?;
        let client_allowed_ips = match request.client_allowed_ips {
            Some(allowed_ips) => allowed_ips.to_string(),
            None => self
                .config(interface)?
                .interface_section()
                .and_then(|section| section.attribute("Address"))
                .unwrap_or(FALLBACK_CLIENT_ALLOWED_IPS)
                .to_string(),
        };

        self.add_peer(
            interface,
            request.name,
            request.address,
            &keypair.public_key,
            request.alias,
            None,
        )?;

        let client_config = render_client_config(&ClientConfigParams {
            private_key: &keypair.private_key,
            address: request.address,
            server_public_key: &server_public_key,
            allowed_ips: &client_allowed_ips,
            endpoint: request.endpoint,
            preshared_key: None,
        });
        Ok(PeerCredentials {
            private_key: keypair.private_key,
            public_key: keypair.public_key,
            client_config,
        })
    }

    /*
     * Writes every interface through the file collaborator. Each interface goes
     * back to the file it was loaded from; one added in memory goes to
     * `<config_dir>/<name>.conf`. With `overwrite` the live files are replaced,
     * the dirty flag is cleared and stored checksums are refreshed; otherwise each
     * file goes to `<live path><suffix>` and the model is left as it was.
     */
    pub fn commit(&mut self, overwrite: bool) -> Result<()> {
        for (name, config) in self.interfaces.iter_mut() {
            let text = render_interface_config(config, &self.prefixes, false);
            let live_path = self
                .sources
                .get(name)
                .cloned()
                .unwrap_or_else(|| path_utils::interface_config_path(&self.config_dir, name));
            let path = if overwrite {
                live_path
            } else {
                path_utils::dry_run_path(&live_path, &self.dry_run_suffix)
            };
            self.files
                .write_config(&path, &text)
                .map_err(|source| StoreError::Io {
                    path: path.clone(),
                    source,
                })?;
            if overwrite {
                let checksum =
                    compute_checksum(&render_interface_config(config, &self.prefixes, true));
                config.set_stored_checksum(Some(checksum));
                self.sources
                    .entry(name.clone())
                    .or_insert_with(|| path.clone());
            }
            log::debug!("MetaConfigStore: Committed '{name}' to {path:?}.");
        }
        if overwrite {
            self.dirty = false;
        }
        Ok(())
    }

    fn recognized_metadata(&self, attribute: &str) -> Option<&str> {
        self.metadata_attributes
            .iter()
            .find(|known| known.eq_ignore_ascii_case(attribute))
            .map(String::as_str)
    }

    fn config(&self, interface: &str) -> Result<&InterfaceConfig> {
        self.interfaces
            .get(interface)
            .ok_or_else(|| StoreError::InvalidInterface(interface.to_string()))
    }

    fn config_mut(&mut self, interface: &str) -> Result<&mut InterfaceConfig> {
        self.interfaces
            .get_mut(interface)
            .ok_or_else(|| StoreError::InvalidInterface(interface.to_string()))
    }

    fn section(&self, interface: &str, identifier: &str) -> Result<&Section> {
        self.config(interface)?
            .section(identifier)
            .ok_or_else(|| StoreError::InvalidIdentifier {
                interface: interface.to_string(),
                identifier: identifier.to_string(),
            })
    }

    fn set_metadata(
        &mut self,
        interface: &str,
        identifier: &str,
        key: &str,
        value: &str,
    ) -> Result<()> {
        let value = if key.eq_ignore_ascii_case(DISABLED_ATTRIBUTE) {
            let flag = parse_flag(value).ok_or_else(|| StoreError::InvalidValue {
                attribute: key.to_string(),
                value: value.to_string(),
            })?;
            flag_value(flag).to_string()
        } else {
            value.trim().to_string()
        };

        let config = self.config_mut(interface)?;
        if key.eq_ignore_ascii_case(ALIAS_ATTRIBUTE) {
            if value.is_empty() {
                config.aliases_mut().release_identifier(identifier, None);
            } else {
                bind_alias(config, interface, &value, identifier)?;
                config
                    .aliases_mut()
                    .release_identifier(identifier, Some(&value));
            }
        }
        let section = section_in(config, interface, identifier)?;
        section.set_metadata(key, &value);
        self.dirty = true;
        log::debug!("MetaConfigStore: Set {key} = '{value}' on '{identifier}' ({interface}).");
        Ok(())
    }

    fn set_plain(
        &mut self,
        interface: &str,
        identifier: &str,
        section_type: SectionType,
        attribute: &str,
        value: &str,
    ) -> Result<()> {
        let config = self.config_mut(interface)?;
        let renames_peer = section_type == SectionType::Peer
            && attribute.eq_ignore_ascii_case(PUBLIC_KEY_ATTRIBUTE)
            && value != identifier;
        if renames_peer && config.contains_section(value) {
            return Err(StoreError::DuplicateIdentifier {
                interface: interface.to_string(),
                identifier: value.to_string(),
            });
        }

        section_in(config, interface, identifier)?.set_attribute(attribute, value);
        if renames_peer {
            let renamed = config.rename_section(identifier, value);
            debug_assert!(renamed, "target identifier was checked to be free");
            log::debug!("MetaConfigStore: Peer '{identifier}' on '{interface}' is now '{value}'.");
        }
        self.dirty = true;
        Ok(())
    }

    fn set_disabled(&mut self, interface: &str, identifier: &str, disabled: bool) -> Result<()> {
        let config = self.config_mut(interface)?;
        let section = section_in(config, interface, identifier)?;
        if section.is_disabled() == disabled {
            let warning = IntegrityWarning::AlreadyInState {
                interface: interface.to_string(),
                identifier: identifier.to_string(),
                disabled,
            };
            log::warn!("MetaConfigStore: {warning}");
            self.warnings.push(warning);
            return Ok(());
        }
        section.set_disabled(disabled);
        self.dirty = true;
        log::debug!(
            "MetaConfigStore: {} '{identifier}' on '{interface}'.",
            if disabled { "Disabled" } else { "Enabled" }
        );
        Ok(())
    }
}

// Values are written as one physical line; control characters would split or corrupt it.
fn check_value(attribute: &str, value: &str) -> Result<()> {
    if value.chars().any(char::is_control) {
        return Err(StoreError::InvalidValue {
            attribute: attribute.to_string(),
            value: value.to_string(),
        });
    }
    Ok(())
}

fn check_attribute_name(attribute: &str) -> Result<()> {
    let valid = !attribute.is_empty()
        && !attribute.starts_with(['[', '#', ';'])
        && !attribute
            .chars()
            .any(|c| c == '=' || c.is_whitespace() || c.is_control());
    if !valid {
        return Err(StoreError::InvalidValue {
            attribute: "attribute name".to_string(),
            value: attribute.to_string(),
        });
    }
    Ok(())
}

fn section_in<'a>(
    config: &'a mut InterfaceConfig,
    interface: &str,
    identifier: &str,
) -> Result<&'a mut Section> {
    config
        .section_mut(identifier)
        .ok_or_else(|| StoreError::InvalidIdentifier {
            interface: interface.to_string(),
            identifier: identifier.to_string(),
        })
}

fn bind_alias(
    config: &mut InterfaceConfig,
    interface: &str,
    alias: &str,
    identifier: &str,
) -> Result<()> {
    config
        .aliases_mut()
        .bind(alias, identifier)
        .map_err(|e| match e {
            AliasError::DuplicateAlias { alias, identifier } => StoreError::DuplicateAlias {
                interface: interface.to_string(),
                alias,
                identifier,
            },
            AliasError::UnknownAlias(alias) => StoreError::InvalidAlias {
                interface: interface.to_string(),
                alias,
            },
        })
}
