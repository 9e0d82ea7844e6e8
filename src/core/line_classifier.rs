/*
 * Classifies single physical lines of a metadata-augmented config file. Two
 * configurable prefixes drive the decision: the metadata marker (comment lines
 * carrying `Key = Value` metadata) and the disabled marker (lines belonging to a
 * commented-out section). The disabled marker is peeled off first and reported
 * as a separate flag; the remainder is then classified on its own.
 */

pub const DEFAULT_METADATA_PREFIX: &str = "#+";
pub const DEFAULT_DISABLED_PREFIX: &str = "#-";

pub const CHECKSUM_ATTRIBUTE: &str = "Checksum";

// First line of the header written above the first section of a managed file.
pub const HEADER_NOTICE: &str = "# Managed by wg-meta.";

const COMMENT_CHARACTERS: [char; 2] = ['#', ';'];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrefixError {
    Empty(&'static str),
    MissingCommentCharacter(String),
    ContainsWhitespace(String),
    Ambiguous { metadata: String, disabled: String },
    ClashesWithHeader { metadata: String, disabled: String },
}

impl std::fmt::Display for PrefixError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrefixError::Empty(role) => write!(f, "The {role} prefix must not be empty"),
            PrefixError::MissingCommentCharacter(prefix) => {
                write!(f, "Prefix '{prefix}' must start with '#' or ';'")
            }
            PrefixError::ContainsWhitespace(prefix) => {
                write!(f, "Prefix '{prefix}' must not contain whitespace")
            }
            PrefixError::Ambiguous { metadata, disabled } => write!(
                f,
                "Metadata prefix '{metadata}' and disabled prefix '{disabled}' must differ and neither may start with the other"
            ),
            PrefixError::ClashesWithHeader { metadata, disabled } => write!(
                f,
                "Prefixes '{metadata}' and '{disabled}' would make the managed file header read as config lines"
            ),
        }
    }
}

impl std::error::Error for PrefixError {}

/*
 * A validated pair of prefixes. Both are non-empty, start with a comment
 * character, contain no whitespace, and neither is a prefix of the other (which
 * also guarantees they differ). The header lines written above the first section
 * must still classify as plain, non-disabled comments under the pair.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaPrefixes {
    metadata: String,
    disabled: String,
}

impl MetaPrefixes {
    pub fn new(metadata: &str, disabled: &str) -> Result<Self, PrefixError> {
        Self::validate_one("metadata", metadata)?;
        Self::validate_one("disabled", disabled)?;
        if metadata.starts_with(disabled) || disabled.starts_with(metadata) {
            return Err(PrefixError::Ambiguous {
                metadata: metadata.to_string(),
                disabled: disabled.to_string(),
            });
        }
        let prefixes = MetaPrefixes {
            metadata: metadata.to_string(),
            disabled: disabled.to_string(),
        };
        for line in [HEADER_NOTICE.to_string(), prefixes.checksum_marker()] {
            let classified = classify_line(&line, &prefixes);
            if classified.kind != LineKind::Comment || classified.disabled {
                return Err(PrefixError::ClashesWithHeader {
                    metadata: prefixes.metadata,
                    disabled: prefixes.disabled,
                });
            }
        }
        Ok(prefixes)
    }

    fn validate_one(role: &'static str, prefix: &str) -> Result<(), PrefixError> {
        if prefix.is_empty() {
            return Err(PrefixError::Empty(role));
        }
        if !prefix.starts_with(COMMENT_CHARACTERS) {
            return Err(PrefixError::MissingCommentCharacter(prefix.to_string()));
        }
        if prefix.chars().any(char::is_whitespace) {
            return Err(PrefixError::ContainsWhitespace(prefix.to_string()));
        }
        Ok(())
    }

    pub fn metadata(&self) -> &str {
        &self.metadata
    }

    pub fn disabled(&self) -> &str {
        &self.disabled
    }

    /// Start of the header line holding the stored checksum: `#<metadata>Checksum`.
    pub fn checksum_marker(&self) -> String {
        format!("#{}{CHECKSUM_ATTRIBUTE}", self.metadata)
    }
}

impl Default for MetaPrefixes {
    fn default() -> Self {
        MetaPrefixes {
            metadata: DEFAULT_METADATA_PREFIX.to_string(),
            disabled: DEFAULT_DISABLED_PREFIX.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Empty,
    Comment,
    MetadataAttribute,
    SectionHeader,
    PlainAttribute,
}

/*
 * Result of classifying one line. `content` is the part of the line the next
 * stage works with:
 * - `Comment`: the full comment text, including its leading `#`/`;`.
 * - `MetadataAttribute`: the text after the metadata prefix (`Key = Value`).
 * - `SectionHeader`: the header name with brackets removed.
 * - `PlainAttribute`: the trimmed line.
 * - `Empty`: an empty string.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifiedLine<'a> {
    pub kind: LineKind,
    pub disabled: bool,
    pub content: &'a str,
}

pub fn classify_line<'a>(line: &'a str, prefixes: &MetaPrefixes) -> ClassifiedLine<'a> {
    let mut text = line.trim();
    let mut disabled = false;
    while let Some(rest) = text.strip_prefix(prefixes.disabled()) {
        disabled = true;
        text = rest.trim_start();
    }

    let (kind, content) = if text.is_empty() {
        (LineKind::Empty, text)
    } else if let Some(rest) = text.strip_prefix('[') {
        let name = rest.strip_suffix(']').unwrap_or(rest).trim();
        (LineKind::SectionHeader, name)
    } else if let Some(rest) = text.strip_prefix(prefixes.metadata()) {
        (LineKind::MetadataAttribute, rest.trim_start())
    } else if text.starts_with(COMMENT_CHARACTERS) {
        (LineKind::Comment, text)
    } else {
        (LineKind::PlainAttribute, text)
    };

    ClassifiedLine {
        kind,
        disabled,
        content,
    }
}

/// Splits `Key = Value` on the first `=`, trimming both halves. Fails on a missing `=` or empty key.
pub fn split_attribute(content: &str) -> Option<(&str, &str)> {
    let (key, value) = content.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key, value.trim()))
}
