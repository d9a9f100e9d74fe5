use crate::config::{
    CodecConfig, DEFAULT_SEPARATORS, GUARD_DIVISOR, MIN_ALPHABET_LENGTH, SEPARATOR_RATIO,
};
use crate::error::{CloakIdError, Result};
use crate::shuffle::shuffle;

/// A configured codec instance.
///
/// Construction validates the raw alphabet and partitions it into the
/// working alphabet, the separators (delimit per-number blocks), and the
/// guards (pad and bracket hashes shorter than the minimum length). The
/// partition is derived deterministically from the salt, so two codecs
/// built from the same configuration produce identical hashes.
///
/// A `Codec` is immutable once built and safe to share across threads;
/// every encode/decode call works on its own copy of the alphabet.
pub struct Codec {
    pub(crate) alphabet: Vec<char>,
    pub(crate) separators: Vec<char>,
    pub(crate) guards: Vec<char>,
    pub(crate) salt: Vec<char>,
    pub(crate) min_length: Option<usize>,
}

impl Codec {
    /// Builds a codec from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `AlphabetContainsSpace` if the alphabet contains a space
    /// character, or `AlphabetTooShort` if fewer than 16 unique
    /// characters remain after separator characters are removed and
    /// duplicates dropped.
    pub fn new(config: CodecConfig) -> Result<Self> {
        let salt: Vec<char> = config.salt.chars().collect();
        let raw_alphabet: Vec<char> = config.alphabet.chars().collect();

        // separators: the seed set filtered to the raw alphabet, then
        // salt-shuffled
        let mut separators: Vec<char> = DEFAULT_SEPARATORS
            .chars()
            .filter(|c| raw_alphabet.contains(c))
            .collect();
        shuffle(&mut separators, &salt);

        // single scan of the raw alphabet: reject spaces, drop separator
        // characters, keep the first occurrence of everything else
        let mut alphabet: Vec<char> = Vec::with_capacity(raw_alphabet.len());
        for (index, &c) in raw_alphabet.iter().enumerate() {
            if c == ' ' {
                return Err(CloakIdError::AlphabetContainsSpace { index });
            }
            if !separators.contains(&c) && !alphabet.contains(&c) {
                alphabet.push(c);
            }
        }
        if alphabet.len() < MIN_ALPHABET_LENGTH {
            return Err(CloakIdError::AlphabetTooShort {
                count: alphabet.len(),
            });
        }

        // keep at least one separator per 3.5 alphabet characters; the
        // quotient is truncated before the comparison, which is part of
        // the wire format
        if separators.is_empty()
            || (alphabet.len() / separators.len()) as f64 > SEPARATOR_RATIO
        {
            let min_separators = (alphabet.len() as f64 / SEPARATOR_RATIO).ceil() as usize;
            if min_separators > separators.len() {
                let missing = min_separators - separators.len();
                separators.extend_from_slice(&alphabet[..missing]);
                alphabet.drain(..missing);
            }
        }

        shuffle(&mut alphabet, &salt);

        // guards come off the separators when the raw alphabet is tiny,
        // off the shuffled alphabet otherwise
        let guard_count = (alphabet.len() as f64 / GUARD_DIVISOR).ceil() as usize;
        let guards: Vec<char> = if raw_alphabet.len() < 3 {
            separators.drain(..guard_count).collect()
        } else {
            alphabet.drain(..guard_count).collect()
        };

        Ok(Self {
            alphabet,
            separators,
            guards,
            salt,
            min_length: config.min_length,
        })
    }

    /// Codec with the given salt, the default alphabet, and no minimum
    /// length.
    ///
    /// # Errors
    ///
    /// See [`Codec::new`].
    pub fn with_salt(salt: impl Into<String>) -> Result<Self> {
        Self::new(CodecConfig::new(salt))
    }

    /// Codec with the given salt and minimum hash length over the
    /// default alphabet.
    ///
    /// # Errors
    ///
    /// See [`Codec::new`].
    pub fn with_salt_and_length(salt: impl Into<String>, min_length: usize) -> Result<Self> {
        Self::new(CodecConfig::new(salt).min_length(min_length))
    }

    /// Minimum hash length, if one was configured.
    pub fn min_length(&self) -> Option<usize> {
        self.min_length
    }
}

impl Default for Codec {
    /// Codec with no salt, the default alphabet, and no minimum length.
    fn default() -> Self {
        // the default alphabet always passes validation
        Self::new(CodecConfig::new("")).expect("default configuration is valid")
    }
}
