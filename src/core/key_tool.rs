/*
 * Bridge to the external interface-management tool (`wg`). The metadata layer
 * never does cryptography itself: keypairs are generated and public keys are
 * derived by the tool, and plain attributes the metadata layer does not own are
 * handed to `wg set` instead of being written into the model.
 *
 * `KeyToolOperations` abstracts these calls so the store can be exercised with a
 * recording mock; `CoreWgKeyTool` shells out to the real binary.
 */
use super::models::SectionType;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};

const DEFAULT_WG_BINARY: &str = "wg";

#[derive(Debug)]
pub enum KeyToolError {
    Io(io::Error),
    CommandFailed {
        command: String,
        status: Option<i32>,
        stderr: String,
    },
    InvalidOutput(std::string::FromUtf8Error),
    UnsupportedAttribute(String),
}

impl From<io::Error> for KeyToolError {
    fn from(err: io::Error) -> Self {
        KeyToolError::Io(err)
    }
}

impl From<std::string::FromUtf8Error> for KeyToolError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        KeyToolError::InvalidOutput(err)
    }
}

impl std::fmt::Display for KeyToolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyToolError::Io(e) => write!(f, "Failed to run key tool: {e}"),
            KeyToolError::CommandFailed {
                command,
                status,
                stderr,
            } => match status {
                Some(code) => write!(f, "'{command}' exited with status {code}: {stderr}"),
                None => write!(f, "'{command}' was terminated by a signal: {stderr}"),
            },
            KeyToolError::InvalidOutput(e) => write!(f, "Key tool produced invalid output: {e}"),
            KeyToolError::UnsupportedAttribute(attribute) => {
                write!(f, "Attribute '{attribute}' cannot be set through the key tool")
            }
        }
    }
}

impl std::error::Error for KeyToolError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            KeyToolError::Io(e) => Some(e),
            KeyToolError::InvalidOutput(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, KeyToolError>;

/// A freshly generated WireGuard keypair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPair {
    pub private_key: String,
    pub public_key: String,
}

pub trait KeyToolOperations: Send + Sync {
    fn derive_public_key(&self, private_key: &str) -> Result<String>;
    fn generate_keypair(&self) -> Result<KeyPair>;
    /*
     * Applies a non-metadata attribute to a live interface. `identifier` is the
     * section identifier; for a `Peer` section it is the peer's public key.
     */
    fn set_attribute(
        &self,
        interface: &str,
        section_type: SectionType,
        identifier: &str,
        attribute: &str,
        value: &str,
    ) -> Result<()>;
}

/*
 * Maps a config-file attribute name to the matching `wg set` option. Only
 * attributes `wg set` accepts as inline values are supported.
 */
pub fn wg_set_option(section_type: SectionType, attribute: &str) -> Option<&'static str> {
    let lowered = attribute.to_ascii_lowercase();
    match (section_type, lowered.as_str()) {
        (SectionType::Interface, "listenport") => Some("listen-port"),
        (SectionType::Interface, "fwmark") => Some("fwmark"),
        (SectionType::Peer, "allowedips") => Some("allowed-ips"),
        (SectionType::Peer, "endpoint") => Some("endpoint"),
        (SectionType::Peer, "persistentkeepalive") => Some("persistent-keepalive"),
        _ => None,
    }
}

pub struct CoreWgKeyTool {
    wg_binary: PathBuf,
}

impl CoreWgKeyTool {
    pub fn new() -> Self {
        Self::with_binary(DEFAULT_WG_BINARY)
    }

    pub fn with_binary(wg_binary: impl Into<PathBuf>) -> Self {
        CoreWgKeyTool {
            wg_binary: wg_binary.into(),
        }
    }

    fn run(&self, args: &[&str], stdin: Option<&str>) -> Result<String> {
        let command_text = format!("{} {}", self.wg_binary.display(), args.join(" "));
        log::debug!("CoreWgKeyTool: Running '{command_text}'");
        let mut child = Command::new(&self.wg_binary)
            .args(args)
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;
        let mut write_result = Ok(());
        if let Some(input) = stdin
            && let Some(mut pipe) = child.stdin.take()
        {
            write_result = pipe
                .write_all(input.as_bytes())
                .and_then(|()| pipe.write_all(b"\n"));
        }
        // The child is reaped even when feeding its stdin failed.
        let output = child.wait_with_output()?;
        if let Err(e) = write_result {
            log::error!("CoreWgKeyTool: Writing stdin of '{command_text}' failed: {e}");
            return Err(KeyToolError::Io(e));
        }
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            log::error!("CoreWgKeyTool: '{command_text}' failed: {stderr}");
            return Err(KeyToolError::CommandFailed {
                command: command_text,
                status: output.status.code(),
                stderr,
            });
        }
        Ok(String::from_utf8(output.stdout)?.trim().to_string())
    }
}

impl Default for CoreWgKeyTool {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyToolOperations for CoreWgKeyTool {
    fn derive_public_key(&self, private_key: &str) -> Result<String> {
        self.run(&["pubkey"], Some(private_key))
    }

    fn generate_keypair(&self) -> Result<KeyPair> {
        let private_key = self.run(&["genkey"], None)?;
        let public_key = self.derive_public_key(&private_key)?;
        Ok(KeyPair {
            private_key,
            public_key,
        })
    }

    fn set_attribute(
        &self,
        interface: &str,
        section_type: SectionType,
        identifier: &str,
        attribute: &str,
        value: &str,
    ) -> Result<()> {
        let option = wg_set_option(section_type, attribute)
            .ok_or_else(|| KeyToolError::UnsupportedAttribute(attribute.to_string()))?;
        let mut args = vec!["set", interface];
        if section_type == SectionType::Peer {
            args.extend(["peer", identifier]);
        }
        args.extend([option, value]);
        self.run(&args, None).map(|_| ())
    }
}
