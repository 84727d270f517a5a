use crate::index::types::{PathHash, PATH_HASH_SIZE};

/// Hash the last fragment of `path`.
///
/// Trailing delimiters are skipped, then bytes are folded in from the end
/// until the next delimiter (or the start of the string) is reached. Each
/// byte is lower-cased first, so the hash is case-insensitive. The
/// accumulator is a wrapping `u16` that cycles through xor, multiply and
/// subtract; the result is reduced to a bucket number.
#[inline]
pub fn hash_path(path: &str, delimiter: char) -> PathHash {
    hash_fragment_bytes(path.as_bytes(), delimiter_byte(delimiter))
}

/// Byte-level form of [`hash_path`]
pub fn hash_fragment_bytes(bytes: &[u8], delimiter: u8) -> PathHash {
    let mut end = bytes.len();
    while end > 0 && bytes[end - 1] == delimiter {
        end -= 1;
    }

    let mut key: u16 = 0;
    let mut op = 0u8;
    for &byte in bytes[..end].iter().rev() {
        if byte == delimiter {
            break;
        }
        let c = byte.to_ascii_lowercase() as u16;
        match op {
            0 => {
                key ^= c;
                op = 1;
            }
            1 => {
                key = key.wrapping_mul(c);
                op = 2;
            }
            _ => {
                key = key.wrapping_sub(c);
                op = 0;
            }
        }
    }

    key % PATH_HASH_SIZE as u16
}

/// Convert a delimiter to the byte used for splitting.
///
/// Panics if the delimiter is not ASCII; a multi-byte delimiter would
/// split UTF-8 sequences.
#[inline]
pub(crate) fn delimiter_byte(delimiter: char) -> u8 {
    assert!(delimiter.is_ascii(), "path delimiter must be ASCII, got {delimiter:?}");
    delimiter as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_case_insensitive() {
        assert_eq!(hash_path("Metal1", '/'), hash_path("metal1", '/'));
        assert_eq!(hash_path("DOORS", '/'), hash_path("doors", '/'));
    }

    #[test]
    fn test_hash_ignores_trailing_delimiters() {
        assert_eq!(hash_path("doors/", '/'), hash_path("doors", '/'));
        assert_eq!(hash_path("doors///", '/'), hash_path("doors", '/'));
    }

    #[test]
    fn test_hash_only_covers_last_fragment() {
        assert_eq!(hash_path("textures/doors", '/'), hash_path("doors", '/'));
        assert_eq!(hash_path("a/b/c/", '/'), hash_path("c", '/'));
    }

    #[test]
    fn test_hash_in_range() {
        for name in ["", "a", "texture", "a-very-long-fragment-name.with.dots", "ÄÖÜ"] {
            assert!((hash_path(name, '/') as usize) < PATH_HASH_SIZE);
        }
    }

    #[test]
    fn test_hash_known_values() {
        // "a": key ^= 'a'
        assert_eq!(hash_path("a", '/'), 97);
        // "ab": read from the end: key ^= 'b' (98), key *= 'a' (97) -> 9506 % 512
        assert_eq!(hash_path("ab", '/'), (98u16 * 97) % 512);
        // "abc": ^= 'c', *= 'b', -= 'a'
        let expected = (99u16.wrapping_mul(98)).wrapping_sub(97) % 512;
        assert_eq!(hash_path("abc", '/'), expected);
        assert_eq!(hash_path("", '/'), 0);
    }

    #[test]
    fn test_hash_respects_delimiter() {
        assert_eq!(hash_path("a.b.cat", '.'), hash_path("cat", '/'));
        assert_ne!(hash_path("a.b.cat", '/'), hash_path("cat", '/'));
    }

    #[test]
    #[should_panic]
    fn test_non_ascii_delimiter_panics() {
        hash_path("a§b", '§');
    }
}
