/*
 * Builds an `InterfaceConfig` from the text of one config file. Lines are
 * classified one at a time and fed to a small state machine that tracks the
 * currently open section, whether its identifying attribute has been seen, and
 * an alias waiting to be bound once the section's identifier is known.
 *
 * Comments before the first section header form the file header; the only thing
 * read from them is the stored checksum (`#<metadata prefix>Checksum = N`).
 */
use super::line_classifier::{LineKind, MetaPrefixes, classify_line, split_attribute};
use super::models::{
    ALIAS_ATTRIBUTE, DISABLED_ATTRIBUTE, InterfaceConfig, Section, SectionType, normalize_key,
    parse_flag,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    InvalidSection { line: usize, header: String },
    SectionWithoutIdentifier { line: usize, section_type: SectionType },
    EmptySection { line: usize, section_type: SectionType },
    AttributeWithoutSection { line: usize },
    MalformedAttribute { line: usize, text: String },
    DuplicateAlias { line: usize, alias: String },
    DuplicateIdentifier { line: usize, identifier: String },
    NoSections,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::InvalidSection { line, header } => {
                write!(f, "Line {line}: invalid section header '[{header}]'")
            }
            ParseError::SectionWithoutIdentifier { line, section_type } => write!(
                f,
                "Line {line}: [{section_type}] section has no {} attribute",
                section_type.identity_attribute()
            ),
            ParseError::EmptySection { line, section_type } => {
                write!(f, "Line {line}: [{section_type}] section has no attributes")
            }
            ParseError::AttributeWithoutSection { line } => {
                write!(f, "Line {line}: attribute outside of any section")
            }
            ParseError::MalformedAttribute { line, text } => {
                write!(f, "Line {line}: expected 'Key = Value', found '{text}'")
            }
            ParseError::DuplicateAlias { line, alias } => {
                write!(f, "Line {line}: alias '{alias}' is used by more than one section")
            }
            ParseError::DuplicateIdentifier { line, identifier } => write!(
                f,
                "Line {line}: section identifier '{identifier}' appears more than once"
            ),
            ParseError::NoSections => write!(f, "File contains no sections"),
        }
    }
}

impl std::error::Error for ParseError {}

pub type Result<T> = std::result::Result<T, ParseError>;

/*
 * Parses the full text of one interface file.
 *
 * Args:
 *   interface_name: Name derived from the file name; it becomes the identifier of
 *     the `[Interface]` section.
 *   text: File contents.
 *   prefixes: The metadata and disabled markers in use.
 *
 * Returns:
 *   The parsed config, with `stored_checksum` taken from the header (if any).
 */
pub fn parse_interface_config(
    interface_name: &str,
    text: &str,
    prefixes: &MetaPrefixes,
) -> Result<InterfaceConfig> {
    log::trace!("SectionParser: Parsing config for interface '{interface_name}'");
    let mut parser = SectionParser::new(interface_name, prefixes);
    for (index, line) in text.lines().enumerate() {
        parser.feed(index + 1, line)?;
    }
    let config = parser.finish()?;
    log::debug!(
        "SectionParser: Parsed {} sections for interface '{interface_name}'.",
        config.section_order().len()
    );
    Ok(config)
}

struct OpenSection {
    header_line: usize,
    header_disabled: bool,
    identifier: Option<String>,
    pending_alias: Option<String>,
    section: Section,
}

struct SectionParser<'a> {
    interface_name: &'a str,
    prefixes: &'a MetaPrefixes,
    checksum_marker: String,
    config: InterfaceConfig,
    current: Option<OpenSection>,
    last_line: usize,
}

impl<'a> SectionParser<'a> {
    fn new(interface_name: &'a str, prefixes: &'a MetaPrefixes) -> Self {
        SectionParser {
            interface_name,
            prefixes,
            checksum_marker: prefixes.checksum_marker(),
            config: InterfaceConfig::new(interface_name),
            current: None,
            last_line: 0,
        }
    }

    fn feed(&mut self, line_number: usize, line: &str) -> Result<()> {
        self.last_line = line_number;
        let classified = classify_line(line, self.prefixes);
        match classified.kind {
            LineKind::Empty => {}
            LineKind::SectionHeader => {
                self.close_current()?;
                let section_type = SectionType::from_header(classified.content).ok_or_else(|| {
                    ParseError::InvalidSection {
                        line: line_number,
                        header: classified.content.to_string(),
                    }
                })?;
                log::trace!(
                    "SectionParser: Line {line_number}: opening [{section_type}] (disabled: {})",
                    classified.disabled
                );
                self.current = Some(OpenSection {
                    header_line: line_number,
                    header_disabled: classified.disabled,
                    identifier: None,
                    pending_alias: None,
                    section: Section::new(String::new(), section_type),
                });
            }
            LineKind::Comment => {
                if let Some(open) = self.current.as_mut() {
                    open.section.push_comment(classified.content);
                } else {
                    self.read_header_comment(classified.content);
                }
            }
            LineKind::MetadataAttribute => {
                let open = self
                    .current
                    .as_mut()
                    .ok_or(ParseError::AttributeWithoutSection { line: line_number })?;
                let (key, value) = split_attribute(classified.content).ok_or_else(|| {
                    ParseError::MalformedAttribute {
                        line: line_number,
                        text: classified.content.to_string(),
                    }
                })?;
                let key = normalize_key(key);
                if key.eq_ignore_ascii_case(ALIAS_ATTRIBUTE) {
                    open.pending_alias = (!value.is_empty()).then(|| value.to_string());
                }
                open.section.set_metadata(&key, value);
            }
            LineKind::PlainAttribute => {
                let interface_name = self.interface_name;
                let open = self
                    .current
                    .as_mut()
                    .ok_or(ParseError::AttributeWithoutSection { line: line_number })?;
                let (key, value) = split_attribute(classified.content).ok_or_else(|| {
                    ParseError::MalformedAttribute {
                        line: line_number,
                        text: classified.content.to_string(),
                    }
                })?;
                let section_type = open.section.section_type();
                if key.eq_ignore_ascii_case(section_type.identity_attribute()) {
                    open.identifier = Some(match section_type {
                        SectionType::Interface => interface_name.to_string(),
                        SectionType::Peer => value.to_string(),
                    });
                }
                open.section.merge_attribute(key, value);
            }
        }
        Ok(())
    }

    fn read_header_comment(&mut self, comment: &str) {
        let Some(rest) = comment.strip_prefix(self.checksum_marker.as_str()) else {
            return;
        };
        let Some(value) = rest.trim_start().strip_prefix('=') else {
            return;
        };
        match value.trim().parse::<u32>() {
            Ok(checksum) => self.config.set_stored_checksum(Some(checksum)),
            Err(e) => log::warn!(
                "SectionParser: Ignoring unreadable checksum '{}' for '{}': {e}",
                value.trim(),
                self.interface_name
            ),
        }
    }

    fn close_current(&mut self) -> Result<()> {
        let Some(open) = self.current.take() else {
            return Ok(());
        };
        let OpenSection {
            header_line,
            header_disabled,
            identifier,
            pending_alias,
            mut section,
        } = open;
        let section_type = section.section_type();
        let identifier = identifier.ok_or(ParseError::SectionWithoutIdentifier {
            line: header_line,
            section_type,
        })?;
        if !section.has_attributes() {
            return Err(ParseError::EmptySection {
                line: header_line,
                section_type,
            });
        }
        if self.config.contains_section(&identifier) {
            return Err(ParseError::DuplicateIdentifier {
                line: header_line,
                identifier,
            });
        }

        section.set_identifier(identifier.clone());
        let disabled = match section.metadata(DISABLED_ATTRIBUTE) {
            Some(value) => parse_flag(value).unwrap_or(false),
            None => header_disabled,
        };
        section.mark_disabled(disabled);

        if let Some(alias) = pending_alias {
            self.config
                .aliases_mut()
                .bind(&alias, &identifier)
                .map_err(|_| ParseError::DuplicateAlias {
                    line: header_line,
                    alias,
                })?;
        }
        if !self.config.insert_section(section) {
            return Err(ParseError::DuplicateIdentifier {
                line: header_line,
                identifier,
            });
        }
        Ok(())
    }

    fn finish(mut self) -> Result<InterfaceConfig> {
        self.close_current()?;
        if self.config.section_order().is_empty() {
            log::debug!(
                "SectionParser: No sections found after {} lines for '{}'.",
                self.last_line,
                self.interface_name
            );
            return Err(ParseError::NoSections);
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::SectionEntry;

    const WG0: &str = "\
# Managed file
##+Checksum = 1234

[Interface]
#+Name = gateway
Address = 10.0.0.1/24
ListenPort = 51820
PrivateKey = PRIVKEY=

[Peer]
#+Name = alice
PublicKey = ALICEKEY=
#+Alias = laptop
AllowedIPs = 10.0.0.2/32
# roaming peer

#-[Peer]
#-#+Name = bob
#-PublicKey = BOBKEY=
#-AllowedIPs = 10.0.0.3/32
#-#+Disabled = 1
";

    fn parse(text: &str) -> Result<InterfaceConfig> {
        parse_interface_config("wg0", text, &MetaPrefixes::default())
    }

    #[test]
    fn test_parse_sections_in_file_order() {
        let config = parse(WG0).unwrap();
        assert_eq!(config.section_order(), ["wg0", "ALICEKEY=", "BOBKEY="]);
        assert_eq!(config.stored_checksum(), Some(1234));
    }

    #[test]
    fn test_interface_identifier_is_file_name_not_private_key() {
        let config = parse(WG0).unwrap();
        let interface = config.section("wg0").unwrap();
        assert_eq!(interface.section_type(), SectionType::Interface);
        assert_eq!(interface.attribute("PrivateKey"), Some("PRIVKEY="));
        assert_eq!(config.private_key(), Some("PRIVKEY="));
        assert!(config.section("PRIVKEY=").is_none());
    }

    #[test]
    fn test_peer_identifier_is_public_key_and_entries_keep_order() {
        let config = parse(WG0).unwrap();
        let alice = config.section("ALICEKEY=").unwrap();
        assert_eq!(alice.identifier(), "ALICEKEY=");
        assert_eq!(
            alice.entries(),
            [
                SectionEntry::Metadata {
                    key: "Name".into(),
                    value: "alice".into()
                },
                SectionEntry::Plain {
                    key: "PublicKey".into(),
                    value: "ALICEKEY=".into()
                },
                SectionEntry::Metadata {
                    key: "Alias".into(),
                    value: "laptop".into()
                },
                SectionEntry::Plain {
                    key: "AllowedIPs".into(),
                    value: "10.0.0.2/32".into()
                },
                SectionEntry::Comment("# roaming peer".into()),
            ]
        );
        assert_eq!(config.aliases().resolve("laptop").unwrap(), "ALICEKEY=");
    }

    #[test]
    fn test_disabled_section_is_stripped_and_flagged() {
        let config = parse(WG0).unwrap();
        let bob = config.section("BOBKEY=").unwrap();
        assert!(bob.is_disabled());
        assert_eq!(bob.metadata("Name"), Some("bob"));
        assert_eq!(bob.attribute("AllowedIPs"), Some("10.0.0.3/32"));
        assert!(!config.section("ALICEKEY=").unwrap().is_disabled());
    }

    #[test]
    fn test_disabled_header_without_attribute_marks_section() {
        let text = "[Interface]\nPrivateKey = P\n\n#-[Peer]\n#-PublicKey = K\n";
        let config = parse(text).unwrap();
        assert!(config.section("K").unwrap().is_disabled());
    }

    #[test]
    fn test_explicit_disabled_zero_wins_over_header_prefix() {
        let text = "#-[Peer]\n#-PublicKey = K\n#-#+Disabled = 0\n";
        let config = parse(text).unwrap();
        assert!(!config.section("K").unwrap().is_disabled());
    }

    #[test]
    fn test_missing_checksum_header() {
        let config = parse("[Peer]\nPublicKey = K\n").unwrap();
        assert_eq!(config.stored_checksum(), None);
    }

    #[test]
    fn test_invalid_section_header() {
        let result = parse("[Interface]\nPrivateKey = P\n[Server]\n");
        assert_eq!(
            result,
            Err(ParseError::InvalidSection {
                line: 3,
                header: "Server".into()
            })
        );
    }

    #[test]
    fn test_section_header_match_is_exact() {
        assert!(matches!(
            parse("[peer]\nPublicKey = K\n"),
            Err(ParseError::InvalidSection { .. })
        ));
    }

    #[test]
    fn test_section_without_identifier() {
        let result = parse("[Peer]\nAllowedIPs = 10.0.0.2/32\n\n[Peer]\nPublicKey = K\n");
        assert_eq!(
            result,
            Err(ParseError::SectionWithoutIdentifier {
                line: 1,
                section_type: SectionType::Peer
            })
        );
    }

    #[test]
    fn test_interface_section_without_private_key_at_end_of_input() {
        let result = parse("[Interface]\nListenPort = 51820\n");
        assert_eq!(
            result,
            Err(ParseError::SectionWithoutIdentifier {
                line: 1,
                section_type: SectionType::Interface
            })
        );
    }

    #[test]
    fn test_attribute_without_section() {
        assert_eq!(
            parse("ListenPort = 51820\n[Interface]\n"),
            Err(ParseError::AttributeWithoutSection { line: 1 })
        );
        assert_eq!(
            parse("#+Name = early\n"),
            Err(ParseError::AttributeWithoutSection { line: 1 })
        );
    }

    #[test]
    fn test_malformed_attribute() {
        assert_eq!(
            parse("[Peer]\nPublicKey\n"),
            Err(ParseError::MalformedAttribute {
                line: 2,
                text: "PublicKey".into()
            })
        );
    }

    #[test]
    fn test_duplicate_alias_is_fatal() {
        let text = "[Peer]\nPublicKey = A\n#+Alias = x\n\n[Peer]\nPublicKey = B\n#+Alias = x\n";
        assert_eq!(
            parse(text),
            Err(ParseError::DuplicateAlias {
                line: 5,
                alias: "x".into()
            })
        );
    }

    #[test]
    fn test_duplicate_identifier_is_fatal() {
        let text = "[Peer]\nPublicKey = A\n\n[Peer]\nPublicKey = A\n";
        assert_eq!(
            parse(text),
            Err(ParseError::DuplicateIdentifier {
                line: 4,
                identifier: "A".into()
            })
        );
    }

    #[test]
    fn test_empty_file_has_no_sections() {
        assert_eq!(parse("# just a header\n\n"), Err(ParseError::NoSections));
        assert_eq!(parse(""), Err(ParseError::NoSections));
    }

    #[test]
    fn test_repeated_allowed_ips_are_merged() {
        let text = "[Peer]\nPublicKey = K\nAllowedIPs = 10.0.0.2/32\nAllowedIPs = fd00::2/128\n";
        let config = parse(text).unwrap();
        let peer = config.section("K").unwrap();
        assert_eq!(peer.attribute("AllowedIPs"), Some("10.0.0.2/32, fd00::2/128"));
        assert_eq!(peer.entries().len(), 2);
    }

    #[test]
    fn test_unreadable_checksum_is_ignored() {
        let config = parse("##+Checksum = not-a-number\n[Peer]\nPublicKey = K\n").unwrap();
        assert_eq!(config.stored_checksum(), None);
    }
}
