use crate::error::{CodecError, CodecResult};

/// Default token alphabet: ASCII letters and digits.
pub const DEFAULT_ALPHABET: &str =
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ1234567890";

/// Characters reserved for separating numbers inside a token.
const SEPARATORS: &str = "cfhistuCFHISTU";

/// Target ratio of alphabet characters to separators.
const SEPARATOR_RATIO: f64 = 3.5;

/// Target ratio of alphabet characters to guards.
const GUARD_RATIO: f64 = 12.0;

const MIN_ALPHABET_LENGTH: usize = 16;

/// Hashids-compatible reversible encoder for non-negative integers.
///
/// Construction splits the alphabet into three disjoint sets (alphabet,
/// separators, guards), each shuffled by the salt. Encoding and decoding
/// are pure functions of that state; the same salt, alphabet and minimum
/// length always produce the same tokens as other Hashids
/// implementations.
#[derive(Clone, Debug)]
pub struct Hashids {
    salt: Vec<char>,
    min_length: usize,
    alphabet: Vec<char>,
    separators: Vec<char>,
    guards: Vec<char>,
}

impl Hashids {
    /// Build an encoder over [`DEFAULT_ALPHABET`].
    pub fn new(salt: &str, min_length: usize) -> CodecResult<Self> {
        Self::with_alphabet(salt, min_length, DEFAULT_ALPHABET)
    }

    /// Build an encoder over a custom alphabet. Duplicate characters are
    /// dropped; at least 16 unique characters must remain.
    pub fn with_alphabet(salt: &str, min_length: usize, alphabet: &str) -> CodecResult<Self> {
        let mut unique: Vec<char> = Vec::with_capacity(alphabet.len());
        for c in alphabet.chars() {
            if !unique.contains(&c) {
                unique.push(c);
            }
        }
        if unique.contains(&' ') {
            return Err(CodecError::AlphabetHasSpace);
        }
        if unique.len() < MIN_ALPHABET_LENGTH {
            return Err(CodecError::AlphabetTooShort {
                min: MIN_ALPHABET_LENGTH,
                actual: unique.len(),
            });
        }

        let salt: Vec<char> = salt.chars().collect();
        let mut separators: Vec<char> = SEPARATORS.chars().filter(|c| unique.contains(c)).collect();
        let mut alphabet: Vec<char> = unique
            .into_iter()
            .filter(|c| !separators.contains(c))
            .collect();

        consistent_shuffle(&mut separators, &salt);

        let min_separators = ratio_ceil(alphabet.len(), SEPARATOR_RATIO);
        if separators.len() < min_separators {
            let missing = (min_separators - separators.len()).min(alphabet.len());
            separators.extend(alphabet.drain(..missing));
        }

        consistent_shuffle(&mut alphabet, &salt);

        let guard_count = ratio_ceil(alphabet.len(), GUARD_RATIO);
        let guards: Vec<char> = if alphabet.len() < 3 {
            let n = guard_count.min(separators.len());
            separators.drain(..n).collect()
        } else {
            alphabet.drain(..guard_count).collect()
        };

        Ok(Self {
            salt,
            min_length,
            alphabet,
            separators,
            guards,
        })
    }

    pub fn min_length(&self) -> usize {
        self.min_length
    }

    /// Encode a sequence of numbers. An empty slice encodes to `""`.
    pub fn encode(&self, numbers: &[u64]) -> String {
        if numbers.is_empty() {
            return String::new();
        }

        let mut alphabet = self.alphabet.clone();
        let values_hash: u64 = numbers
            .iter()
            .enumerate()
            .map(|(i, n)| n % (i as u64 + 100))
            .sum();
        let lottery = alphabet[(values_hash % alphabet.len() as u64) as usize];

        let mut encoded = vec![lottery];
        for (i, &number) in numbers.iter().enumerate() {
            let alphabet_salt = self.alphabet_salt(lottery, &alphabet);
            consistent_shuffle(&mut alphabet, &alphabet_salt);
            let last = hash(number, &alphabet);
            let separator_seed = number % (last[0] as u64 + i as u64);
            encoded.extend_from_slice(&last);
            encoded.push(self.separators[(separator_seed % self.separators.len() as u64) as usize]);
        }
        encoded.pop();

        if encoded.len() < self.min_length {
            self.pad(&mut encoded, alphabet, values_hash);
        }
        encoded.into_iter().collect()
    }

    /// Decode a token. Returns `None` if the token contains characters
    /// outside the alphabet, overflows, or is not exactly what
    /// [`encode`](Self::encode) would produce for the decoded numbers.
    pub fn decode(&self, token: &str) -> Option<Vec<u64>> {
        if token.is_empty() {
            return None;
        }
        let chars: Vec<char> = token.chars().collect();
        let parts = split(&chars, &self.guards);
        let core = if (2..=3).contains(&parts.len()) {
            parts[1]
        } else {
            parts[0]
        };
        let (&lottery, rest) = core.split_first()?;

        let mut alphabet = self.alphabet.clone();
        let mut numbers = Vec::new();
        for part in split(rest, &self.separators) {
            let alphabet_salt = self.alphabet_salt(lottery, &alphabet);
            consistent_shuffle(&mut alphabet, &alphabet_salt);
            numbers.push(unhash(part, &alphabet)?);
        }

        (self.encode(&numbers) == token).then_some(numbers)
    }

    /// Decode a token that must hold exactly one number.
    pub fn decode_one(&self, token: &str) -> Option<u64> {
        match self.decode(token)?.as_slice() {
            [n] => Some(*n),
            _ => None,
        }
    }

    /// `lottery + salt + alphabet`, truncated to the alphabet length.
    fn alphabet_salt(&self, lottery: char, alphabet: &[char]) -> Vec<char> {
        std::iter::once(lottery)
            .chain(self.salt.iter().copied())
            .chain(alphabet.iter().copied())
            .take(alphabet.len())
            .collect()
    }

    /// Wrap `encoded` in guards and alphabet halves until it reaches the
    /// minimum length.
    fn pad(&self, encoded: &mut Vec<char>, mut alphabet: Vec<char>, values_hash: u64) {
        let guard_len = self.guards.len() as u64;
        let guard_index = (values_hash + encoded[0] as u64) % guard_len;
        encoded.insert(0, self.guards[guard_index as usize]);

        if encoded.len() < self.min_length {
            let guard_index = (values_hash + encoded[2] as u64) % guard_len;
            encoded.push(self.guards[guard_index as usize]);
        }

        let split_at = alphabet.len() / 2;
        while encoded.len() < self.min_length {
            let salt = alphabet.clone();
            consistent_shuffle(&mut alphabet, &salt);

            let mut padded = Vec::with_capacity(alphabet.len() + encoded.len());
            padded.extend_from_slice(&alphabet[split_at..]);
            padded.extend_from_slice(encoded);
            padded.extend_from_slice(&alphabet[..split_at]);

            if padded.len() > self.min_length {
                let from = (padded.len() - self.min_length) / 2;
                padded = padded[from..from + self.min_length].to_vec();
            }
            *encoded = padded;
        }
    }
}

/// Salt-driven Fisher-Yates style permutation shared by all Hashids ports.
fn consistent_shuffle(chars: &mut [char], salt: &[char]) {
    if salt.is_empty() {
        return;
    }
    let mut index = 0usize;
    let mut sum = 0u64;
    for i in (1..chars.len()).rev() {
        let integer = salt[index] as u64;
        sum += integer;
        let j = ((integer + index as u64 + sum) % i as u64) as usize;
        chars.swap(i, j);
        index = (index + 1) % salt.len();
    }
}

fn hash(mut number: u64, alphabet: &[char]) -> Vec<char> {
    let base = alphabet.len() as u64;
    let mut out = Vec::new();
    loop {
        out.push(alphabet[(number % base) as usize]);
        number /= base;
        if number == 0 {
            break;
        }
    }
    out.reverse();
    out
}

fn unhash(part: &[char], alphabet: &[char]) -> Option<u64> {
    let base = alphabet.len() as u64;
    part.iter().try_fold(0u64, |acc, c| {
        let position = alphabet.iter().position(|a| a == c)? as u64;
        acc.checked_mul(base)?.checked_add(position)
    })
}

fn split<'a>(chars: &'a [char], splitters: &[char]) -> Vec<&'a [char]> {
    chars.split(|c| splitters.contains(c)).collect()
}

fn ratio_ceil(len: usize, ratio: f64) -> usize {
    (len as f64 / ratio).ceil() as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    // Reference vectors published with the Hashids algorithm.
    #[test]
    fn reference_vectors() {
        let h = Hashids::new("this is my salt", 0).unwrap();
        assert_eq!(h.encode(&[12345]), "NkK9");
        assert_eq!(h.encode(&[1, 2, 3]), "laHquq");
        assert_eq!(h.decode("NkK9"), Some(vec![12345]));
        assert_eq!(h.decode("laHquq"), Some(vec![1, 2, 3]));
    }

    #[test]
    fn reference_vector_with_min_length() {
        let h = Hashids::new("this is my salt", 8).unwrap();
        assert_eq!(h.encode(&[1]), "gB0NV05e");
        assert_eq!(h.decode_one("gB0NV05e"), Some(1));
    }

    #[test]
    fn unsalted() {
        let h = Hashids::new("", 0).unwrap();
        assert_eq!(h.encode(&[1]), "jR");
        assert_eq!(h.decode_one("jR"), Some(1));
    }

    #[test]
    fn partition_salts_with_min_length_six() {
        let public = Hashids::new("public", 6).unwrap();
        let secret = Hashids::new("secret", 6).unwrap();
        assert_eq!(public.encode(&[1]), "XwqEw6");
        assert_eq!(public.encode(&[2]), "6m7pwJ");
        assert_eq!(public.encode(&[3]), "dZ06mr");
        assert_eq!(secret.encode(&[1]), "gJd8J9");
        assert_eq!(secret.encode(&[2]), "eLMPln");
        assert_eq!(secret.encode(&[3]), "yN9EN5");
    }

    #[test]
    fn min_length_is_a_floor_not_a_cap() {
        let h = Hashids::new("public", 6).unwrap();
        assert_eq!(h.encode(&[123_456_789]), "qbeNv3");
        let big = h.encode(&[u64::MAX >> 1]);
        assert!(big.len() > 6);
        assert_eq!(h.decode_one(&big), Some(u64::MAX >> 1));
    }

    #[test]
    fn zero_is_encodable() {
        let h = Hashids::new("salt", 0).unwrap();
        let token = h.encode(&[0]);
        assert_eq!(h.decode_one(&token), Some(0));
    }

    #[test]
    fn empty_input() {
        let h = Hashids::new("salt", 6).unwrap();
        assert_eq!(h.encode(&[]), "");
        assert_eq!(h.decode(""), None);
    }

    #[test]
    fn rejects_foreign_characters() {
        let h = Hashids::new("public", 6).unwrap();
        assert_eq!(h.decode("Xwq-w6"), None);
        assert_eq!(h.decode("Xwq w6"), None);
        assert_eq!(h.decode("ÄÖÜäöü"), None);
    }

    #[test]
    fn rejects_tampered_tokens() {
        let h = Hashids::new("public", 6).unwrap();
        assert_eq!(h.decode_one("XwqEw6"), Some(1));
        assert_eq!(h.decode("XwqEw7"), None);
        assert_eq!(h.decode("wqEw6"), None);
        assert_eq!(h.decode("XwqEw6X"), None);
    }

    #[test]
    fn overflow_is_rejected_not_wrapped() {
        let h = Hashids::new("", 0).unwrap();
        // A long run of alphabet characters cannot fit in a u64.
        let long: String = std::iter::repeat('z').take(40).collect();
        assert_eq!(h.decode(&long), None);
    }

    #[test]
    fn decode_one_rejects_multiple_numbers() {
        let h = Hashids::new("this is my salt", 0).unwrap();
        assert_eq!(h.decode_one("laHquq"), None);
    }

    #[test]
    fn alphabet_validation() {
        assert_eq!(
            Hashids::with_alphabet("s", 0, "abcdef").unwrap_err(),
            CodecError::AlphabetTooShort { min: 16, actual: 6 }
        );
        assert_eq!(
            Hashids::with_alphabet("s", 0, "abcdefghijklmnop ").unwrap_err(),
            CodecError::AlphabetHasSpace
        );
        // Duplicates collapse before the length check.
        assert!(Hashids::with_alphabet("s", 0, "aaaaaaaaaaaaaaaaaaaa").is_err());
    }

    #[test]
    fn custom_alphabet_roundtrip() {
        let h = Hashids::with_alphabet("salt", 4, "0123456789abcdef").unwrap();
        for n in [0u64, 1, 15, 16, 255, 65_535, 1 << 40] {
            let token = h.encode(&[n]);
            assert!(token.len() >= 4);
            assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
            assert_eq!(h.decode_one(&token), Some(n));
        }
    }

    #[test]
    fn consecutive_ids_do_not_share_prefix() {
        let h = Hashids::new("public", 6).unwrap();
        let tokens: Vec<String> = (1..=20).map(|n| h.encode(&[n])).collect();
        let mut sorted = tokens.clone();
        sorted.sort();
        assert_ne!(tokens, sorted, "tokens should not sort in id order");
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let mut chars: Vec<char> = DEFAULT_ALPHABET.chars().collect();
        let salt: Vec<char> = "some salt".chars().collect();
        consistent_shuffle(&mut chars, &salt);
        let mut a = chars.clone();
        let mut b: Vec<char> = DEFAULT_ALPHABET.chars().collect();
        a.sort();
        b.sort();
        assert_eq!(a, b);
        assert_ne!(chars, DEFAULT_ALPHABET.chars().collect::<Vec<_>>());
    }
}
