use crate::codec::Codec;
use crate::error::{CloakIdError, Result};
use crate::radix::from_digits;
use crate::shuffle::derive_alphabet;

impl Codec {
    /// Decodes a hash back into the numbers it was built from.
    ///
    /// The decodable region is bounded by guard characters when present;
    /// the recovered sequence is re-encoded and compared against the
    /// input, so corruption, truncation, and mismatched configuration
    /// all surface as errors instead of wrong values.
    ///
    /// # Errors
    ///
    /// Returns `InvalidHash` if the input does not round-trip back to
    /// itself.
    pub fn decode(&self, hash: &str) -> Result<Vec<i64>> {
        if hash.is_empty() {
            return Ok(Vec::new());
        }

        let chars: Vec<char> = hash.chars().collect();
        let mut guard_positions = chars
            .iter()
            .enumerate()
            .filter(|&(_, c)| self.guards.contains(c))
            .map(|(i, _)| i);
        let (start, end) = match guard_positions.next() {
            Some(first) => (first + 1, guard_positions.next().unwrap_or(chars.len())),
            None => (0, chars.len()),
        };

        let Some(&lottery) = chars.get(start) else {
            return Err(self.invalid(hash));
        };

        let mut alphabet = self.alphabet.clone();
        let mut numbers: Vec<i64> = Vec::new();
        let mut block: Vec<char> = Vec::new();
        for i in (start + 1)..end {
            let c = chars[i];
            if !self.separators.contains(&c) {
                block.push(c);
                if i < end - 1 {
                    continue;
                }
            }
            if !block.is_empty() {
                derive_alphabet(&mut alphabet, &self.salt, lottery);
                let value =
                    from_digits(&block, &alphabet).map_err(|_| self.invalid(hash))?;
                // a block that overflows past 63 bits can never have come
                // from encode
                let number = i64::try_from(value).map_err(|_| self.invalid(hash))?;
                numbers.push(number);
                block.clear();
            }
        }

        match self.encode(&numbers) {
            Ok(reencoded) if reencoded == hash => Ok(numbers),
            _ => Err(self.invalid(hash)),
        }
    }

    /// Decodes a hash that must contain exactly one number.
    ///
    /// # Errors
    ///
    /// Returns `InvalidHash` if the hash is invalid or holds more or
    /// fewer than one value.
    pub fn decode_one(&self, hash: &str) -> Result<i64> {
        let numbers = self.decode(hash)?;
        match numbers.as_slice() {
            [number] => Ok(*number),
            _ => Err(self.invalid(hash)),
        }
    }

    /// Decodes a hash produced by [`Codec::encode_hex`] back into its
    /// hexadecimal digits.
    ///
    /// # Errors
    ///
    /// Returns `InvalidHash` if the hash is invalid.
    pub fn decode_hex(&self, hash: &str) -> Result<String> {
        let numbers = self.decode(hash)?;
        let mut hex = String::new();
        for number in numbers {
            let group = format!("{number:x}");
            // drop the leading `1` marker digit
            hex.push_str(&group[1..]);
        }
        Ok(hex)
    }

    fn invalid(&self, hash: &str) -> CloakIdError {
        CloakIdError::InvalidHash {
            hash: hash.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CodecConfig;
    use proptest::prelude::*;

    #[test]
    fn test_decode_vector() {
        let codec = Codec::with_salt("my awesome salt").unwrap();
        assert_eq!(codec.decode("vXhbSk").unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_decode_empty() {
        let codec = Codec::default();
        assert_eq!(codec.decode("").unwrap(), Vec::<i64>::new());
    }

    #[test]
    fn test_round_trip() {
        let codec = Codec::with_salt("this is my salt").unwrap();
        for numbers in [
            vec![0],
            vec![12345],
            vec![683, 94108, 123, 5],
            vec![i64::MAX],
            vec![0, 0, 0],
        ] {
            let hash = codec.encode(&numbers).unwrap();
            assert_eq!(codec.decode(&hash).unwrap(), numbers);
        }
    }

    #[test]
    fn test_round_trip_with_min_length() {
        let codec = Codec::with_salt_and_length("my awesome salt", 8).unwrap();
        let hash = codec.encode(&[1, 2, 3]).unwrap();
        assert_eq!(hash, "6vXhbSkD");
        assert_eq!(codec.decode(&hash).unwrap(), vec![1, 2, 3]);

        let codec = Codec::with_salt_and_length("my awesome salt", 100).unwrap();
        let hash = codec.encode(&[1, 2, 3]).unwrap();
        assert_eq!(codec.decode(&hash).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_decode_hex_vector() {
        let codec = Codec::with_salt("my awesome salt").unwrap();
        assert_eq!(
            codec.decode_hex("R2qnd2vkOJTXm7XV7yq4").unwrap(),
            "507f1f77bcf86cd799439011"
        );
    }

    #[test]
    fn test_decode_hex_long_input() {
        let codec = Codec::with_salt("my awesome salt").unwrap();
        let hex = "deadbeefdeadbeefdeadbeef11";
        let hash = codec.encode_hex(hex).unwrap();
        assert_eq!(hash, "GEoJwkOLGMflgeya5ew5CmA");
        assert_eq!(codec.decode_hex(&hash).unwrap(), hex);
    }

    #[test]
    fn test_hex_leading_zeros_survive() {
        let codec = Codec::with_salt("my awesome salt").unwrap();
        let hex = "000fa85";
        let hash = codec.encode_hex(hex).unwrap();
        assert_eq!(codec.decode_hex(&hash).unwrap(), hex);
    }

    #[test]
    fn test_wrong_salt_rejected() {
        let encoder = Codec::with_salt("my awesome salt").unwrap();
        let decoder = Codec::with_salt("a completely different salt").unwrap();
        let hash = encoder.encode(&[10, 20, 30]).unwrap();
        assert!(matches!(
            decoder.decode(&hash),
            Err(CloakIdError::InvalidHash { .. })
        ));
    }

    #[test]
    fn test_tampering_never_goes_unnoticed() {
        // flipping any single character either fails outright or decodes
        // to a sequence that re-encodes to the tampered string
        let codec = Codec::with_salt("my awesome salt").unwrap();
        let hash = codec.encode(&[1, 2, 3]).unwrap();
        for i in 0..hash.len() {
            for replacement in ['a', 'Z', '9'] {
                let mut tampered: Vec<char> = hash.chars().collect();
                if tampered[i] == replacement {
                    continue;
                }
                tampered[i] = replacement;
                let tampered: String = tampered.into_iter().collect();
                match codec.decode(&tampered) {
                    Ok(numbers) => {
                        assert_eq!(codec.encode(&numbers).unwrap(), tampered);
                    }
                    Err(CloakIdError::InvalidHash { hash }) => {
                        assert_eq!(hash, tampered);
                    }
                    Err(other) => panic!("unexpected error: {other}"),
                }
            }
        }
    }

    #[test]
    fn test_truncated_hash_rejected() {
        let codec = Codec::with_salt("my awesome salt").unwrap();
        let hash = codec.encode(&[683, 94108, 123, 5]).unwrap();
        assert!(matches!(
            codec.decode(&hash[..hash.len() - 1]),
            Err(CloakIdError::InvalidHash { .. })
        ));
    }

    #[test]
    fn test_foreign_characters_rejected() {
        let codec = Codec::new(
            CodecConfig::new("key-user").alphabet("abcdefghijklmnopqrstuvwxyz1234567890"),
        )
        .unwrap();
        assert!(matches!(
            codec.decode("as-buy7-kk"),
            Err(CloakIdError::InvalidHash { .. })
        ));
    }

    #[test]
    fn test_guard_only_strings_rejected() {
        // guards for this salt are 6, Z, D, W
        let codec = Codec::with_salt("my awesome salt").unwrap();
        for bad in ["6", "Z6W", "xyz 123"] {
            assert!(
                matches!(codec.decode(bad), Err(CloakIdError::InvalidHash { .. })),
                "expected rejection of {bad:?}"
            );
        }
    }

    #[test]
    fn test_decode_one() {
        let codec = Codec::with_salt("this is my salt").unwrap();
        let hash = codec.encode_one(12345).unwrap();
        assert_eq!(codec.decode_one(&hash).unwrap(), 12345);

        let multi = codec.encode(&[1, 2]).unwrap();
        assert!(matches!(
            codec.decode_one(&multi),
            Err(CloakIdError::InvalidHash { .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_round_trip(
            numbers in proptest::collection::vec(0..=i64::MAX, 1..6),
        ) {
            let codec = Codec::with_salt("prop salt").unwrap();
            let hash = codec.encode(&numbers).unwrap();
            prop_assert_eq!(codec.decode(&hash).unwrap(), numbers);
        }

        #[test]
        fn prop_round_trip_with_min_length(
            numbers in proptest::collection::vec(0..=i64::MAX, 1..6),
            min_length in 1_usize..60,
        ) {
            let codec = Codec::with_salt_and_length("prop salt", min_length).unwrap();
            let hash = codec.encode(&numbers).unwrap();
            prop_assert!(hash.len() >= min_length);
            prop_assert_eq!(codec.decode(&hash).unwrap(), numbers);
        }

        #[test]
        fn prop_hex_round_trip(hex in "[0-9a-f]{1,40}") {
            let codec = Codec::with_salt("prop salt").unwrap();
            let hash = codec.encode_hex(&hex).unwrap();
            prop_assert_eq!(codec.decode_hex(&hash).unwrap(), hex);
        }
    }
}
