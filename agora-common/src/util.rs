//! Utility functions for Agora crates.

use sha2::{Digest, Sha256};

/// Truncate a string to at most `max_chars` characters, appending "..." if truncated.
///
/// This function safely handles multi-byte UTF-8 characters (emoji, CJK, accented characters)
/// by using character boundaries instead of byte indices.
pub fn truncate_with_ellipsis(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => {
            let truncated = &s[..idx];
            format!("{}...", truncated.trim_end())
        }
        None => s.to_string(),
    }
}

/// Round to a fixed number of decimal places.
///
/// Every number that ends up in a published report passes through here so
/// that serialized output does not depend on accumulated float noise.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    let rounded = (value * factor).round() / factor;
    // Normalize negative zero so "-0.0" never shows up in output.
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Hash content using SHA-256, returned as lowercase hex.
pub fn sha256_hex(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_with_ellipsis() {
        assert_eq!(truncate_with_ellipsis("short", 10), "short");
        assert_eq!(truncate_with_ellipsis("hello world", 5), "hello...");
        assert_eq!(truncate_with_ellipsis("héllo wörld", 7), "héllo w...");
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(-15.5668, 2), -15.57);
        assert_eq!(round_to(0.12346, 4), 0.1235);
        assert_eq!(round_to(-0.00001, 2).to_string(), "0");
    }

    #[test]
    fn test_sha256_hex() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
