//! Generators for room slugs and capability keys.

use rand::Rng;

use super::{PlaybackKey, RoomName, Slug, StreamKey, ValueObjectError};

const SLUG_SUFFIX_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const SLUG_SUFFIX_LENGTH: usize = 12;

const KEY_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const KEY_LENGTH: usize = 36;

fn random_string(alphabet: &[u8], len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| alphabet[rng.random_range(0..alphabet.len())] as char)
        .collect()
}

/// Lowercase the name and join its ASCII alphanumeric runs with single dashes.
fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Slug generation
pub struct SlugFactory;

impl SlugFactory {
    /// `<slugified-name>-<12 random [a-z0-9]>`, or only the suffix when the
    /// name has no ASCII alphanumerics.
    pub fn from_name(name: &RoomName) -> Result<Slug, ValueObjectError> {
        let base = slugify(name.as_str());
        let suffix = random_string(SLUG_SUFFIX_ALPHABET, SLUG_SUFFIX_LENGTH);
        if base.is_empty() {
            Slug::new(suffix)
        } else {
            Slug::new(format!("{}-{}", base, suffix))
        }
    }
}

/// Capability key generation
pub struct RoomKeyFactory;

impl RoomKeyFactory {
    pub fn stream_key() -> Result<StreamKey, ValueObjectError> {
        StreamKey::new(random_string(KEY_ALPHABET, KEY_LENGTH))
    }

    pub fn playback_key() -> Result<PlaybackKey, ValueObjectError> {
        PlaybackKey::new(random_string(KEY_ALPHABET, KEY_LENGTH))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_collapses_separators() {
        // テスト項目: 記号や空白の連続は 1 つのハイフンにまとめられ、前後のハイフンは除去される
        // given (前提条件):
        let name = "  Jam -- Night!! 2024 ";

        // when (操作):
        let result = slugify(name);

        // then (期待する結果):
        assert_eq!(result, "jam-night-2024");
    }

    #[test]
    fn test_slug_from_name_appends_random_suffix() {
        // テスト項目: slug は名前ベース + 12 文字のランダムな接尾辞になる
        // given (前提条件):
        let name = RoomName::new("Jam Night".to_string()).unwrap();

        // when (操作):
        let slug = SlugFactory::from_name(&name).unwrap();

        // then (期待する結果):
        let (base, suffix) = slug.as_str().rsplit_once('-').unwrap();
        assert_eq!(base, "jam-night");
        assert_eq!(suffix.len(), 12);
        assert!(
            suffix
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
        );
    }

    #[test]
    fn test_slug_from_non_ascii_name_uses_suffix_only() {
        // テスト項目: ASCII 英数字を含まない名前でも slug が生成される
        // given (前提条件):
        let name = RoomName::new("映画の夜".to_string()).unwrap();

        // when (操作):
        let slug = SlugFactory::from_name(&name).unwrap();

        // then (期待する結果):
        assert_eq!(slug.as_str().len(), 12);
    }

    #[test]
    fn test_generated_keys_are_distinct() {
        // テスト項目: 生成されるキーは 36 文字の英数字で、毎回異なる
        // given (前提条件) / when (操作):
        let first = RoomKeyFactory::playback_key().unwrap();
        let second = RoomKeyFactory::playback_key().unwrap();
        let stream = RoomKeyFactory::stream_key().unwrap();

        // then (期待する結果):
        assert_eq!(first.as_str().len(), 36);
        assert_eq!(stream.as_str().len(), 36);
        assert!(first.as_str().bytes().all(|b| b.is_ascii_alphanumeric()));
        assert_ne!(first, second);
    }
}
