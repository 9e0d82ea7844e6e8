/*
 * This module consolidates the platform-agnostic logic of the tool: the line
 * classifier, section parser, alias registry, checksum and serializer that make
 * up the parse/mutate/serialize engine, the `MetaConfigStore` facade on top of
 * them, and the collaborator abstractions (`ConfigFileOperations`,
 * `KeyToolOperations`, `SettingsManagerOperations`) it is wired to.
 */
pub mod alias_registry;
pub mod checksum_utils;
pub mod client_config;
pub mod config;
pub mod file_system;
pub mod key_tool;
pub mod line_classifier;
pub mod models;
pub mod path_utils;
pub mod section_parser;
pub mod serializer;
pub mod store;


// Re-export the data model
pub use models::{InterfaceConfig, Section, SectionEntry, SectionType};

pub use alias_registry::{AliasError, AliasRegistry};
pub use checksum_utils::{ChecksumStatus, compute_checksum, verify_checksum};
pub use line_classifier::{MetaPrefixes, PrefixError};
pub use section_parser::{ParseError, parse_interface_config};
pub use serializer::render_interface_config;

// Re-export collaborator abstractions and their production implementations
pub use config::{CoreSettingsManager, SettingsError, SettingsManagerOperations, StoreSettings};
pub use file_system::{ConfigFileOperations, CoreConfigFiles, FileSystemError};
pub use key_tool::{CoreWgKeyTool, KeyPair, KeyToolError, KeyToolOperations};

pub use store::{
    IntegrityWarning, MetaConfigStore, PeerCredentials, PeerRequest, StoreError,
};
