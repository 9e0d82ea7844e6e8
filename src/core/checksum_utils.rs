/*
 * Provides the integrity checksum embedded in managed config files. The checksum
 * is computed over the canonical body (sections only, no header) and detects
 * edits made outside this tool. It is a drift indicator, not a security
 * boundary: a mismatch is reported as a warning and never blocks loading.
 */
use sha2::{Digest, Sha256};

/*
 * Calculates the checksum of a rendered config body.
 *
 * The SHA256 digest of the UTF-8 text is truncated to its first 4 bytes, which
 * are read as a big-endian unsigned integer.
 *
 * Args:
 *   body: The body text as produced by the serializer in plain mode.
 *
 * Returns:
 *   The 32-bit checksum.
 */
pub fn compute_checksum(body: &str) -> u32 {
    let digest = Sha256::digest(body.as_bytes());
    let checksum = u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]);
    log::trace!(
        "ChecksumUtils: Calculated checksum {checksum} over {} bytes",
        body.len()
    );
    checksum
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumStatus {
    Verified,
    // The file carried no checksum line, so it has never been written by this tool.
    Missing,
    Mismatch { stored: u32, computed: u32 },
}

/*
 * Compares a stored checksum with a freshly computed one. A mismatch is logged as
 * a warning ("config modified externally") and returned to the caller, which is
 * expected to carry on regardless.
 */
pub fn verify_checksum(interface: &str, stored: Option<u32>, computed: u32) -> ChecksumStatus {
    match stored {
        None => {
            log::debug!("ChecksumUtils: No stored checksum for '{interface}', skipping verification.");
            ChecksumStatus::Missing
        }
        Some(stored) if stored == computed => {
            log::trace!("ChecksumUtils: Checksum verified for '{interface}'.");
            ChecksumStatus::Verified
        }
        Some(stored) => {
            log::warn!(
                "ChecksumUtils: Config '{interface}' modified externally (stored checksum {stored}, computed {computed})."
            );
            ChecksumStatus::Mismatch { stored, computed }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_checksum_known_values() {
        // First 4 bytes of SHA256("Hello, wg-meta!") and SHA256("").
        assert_eq!(compute_checksum("Hello, wg-meta!"), 0xf836_af8f);
        assert_eq!(compute_checksum(""), 0xe3b0_c442);
    }

    #[test]
    fn test_compute_checksum_is_deterministic_and_content_sensitive() {
        let body = "[Interface]\nListenPort = 51820\n\n";
        assert_eq!(compute_checksum(body), compute_checksum(body));
        assert_ne!(
            compute_checksum(body),
            compute_checksum("[Interface]\nListenPort = 51821\n\n")
        );
    }

    #[test]
    fn test_verify_checksum_outcomes() {
        assert_eq!(verify_checksum("wg0", None, 7), ChecksumStatus::Missing);
        assert_eq!(verify_checksum("wg0", Some(7), 7), ChecksumStatus::Verified);
        assert_eq!(
            verify_checksum("wg0", Some(7), 8),
            ChecksumStatus::Mismatch {
                stored: 7,
                computed: 8
            }
        );
    }
}
