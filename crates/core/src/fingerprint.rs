//! Stable per-URL resource keys.
//!
//! Keys are short, deterministic, and cheap to compute. They are not
//! collision resistant; the store overwrites by key, so a collision means
//! two URLs share a record, which the system tolerates.

/// Derive the storage key for a URL.
///
/// Folds the UTF-16 code units of the input into a wrapping signed 32-bit
/// accumulator with `h = (h << 5) - h + unit`, then renders the absolute
/// value in lowercase radix 36. Pure and total: the same input yields the
/// same key in every process, and no input fails.
pub fn fingerprint(url: &str) -> String {
    let mut h: i32 = 0;
    for unit in url.encode_utf16() {
        h = (h << 5).wrapping_sub(h).wrapping_add(i32::from(unit));
    }
    to_radix_36(h.unsigned_abs())
}

fn to_radix_36(mut n: u32) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    if n == 0 {
        return "0".to_string();
    }

    // 36^7 > u32::MAX, so seven digits always suffice.
    let mut buf = [0u8; 7];
    let mut i = buf.len();
    while n > 0 {
        i -= 1;
        buf[i] = DIGITS[(n % 36) as usize];
        n /= 36;
    }

    String::from_utf8_lossy(&buf[i..]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinism() {
        let urls = [
            "https://example.com/",
            "https://example.com/docs?page=2",
            "https://example.com/docs#section",
            "",
        ];
        for url in urls {
            assert_eq!(fingerprint(url), fingerprint(url));
        }
    }

    #[test]
    fn test_known_values() {
        assert_eq!(fingerprint(""), "0");
        assert_eq!(fingerprint("a"), "2p");
        assert_eq!(fingerprint("hello"), "1n1e4y");
        assert_eq!(fingerprint("https://a.example/"), "boy1of");
        assert_eq!(fingerprint("https://b.example/"), "exy0gw");
        assert_eq!(fingerprint("https://example.com/"), "upb7bz");
        assert_eq!(fingerprint("https://example.com/docs?page=2"), "6fznk7");
    }

    #[test]
    fn test_distribution_over_sample() {
        let urls = [
            "https://a.example/",
            "https://b.example/",
            "https://a.example/path",
            "https://a.example/path?q=1",
            "https://a.example/path?q=2",
            "https://docs.rs/serde",
            "https://docs.rs/serde_json",
            "http://a.example/",
        ];
        let keys: Vec<String> = urls.iter().map(|u| fingerprint(u)).collect();
        for (i, a) in keys.iter().enumerate() {
            for b in &keys[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_key_charset() {
        let key = fingerprint("https://example.com/some/long/path?with=query&more=params");
        assert!(!key.is_empty());
        assert!(key.len() <= 7);
        assert!(key.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_non_ascii_input() {
        // Hashed over UTF-16 code units, so multibyte input is well-defined.
        let key = fingerprint("https://example.com/ページ");
        assert_eq!(key, fingerprint("https://example.com/ページ"));
        assert_ne!(key, fingerprint("https://example.com/"));
    }
}
