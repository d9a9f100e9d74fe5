use crate::codec::Codec;
use crate::config::LOTTERY_MOD;
use crate::error::{CloakIdError, Result};
use crate::radix::to_digits;
use crate::shuffle::{derive_alphabet, shuffle};

// hex input is split into groups this size; with the leading marker
// digit every group still fits comfortably in 63 bits
const HEX_GROUP_LEN: usize = 12;

impl Codec {
    /// Encodes a sequence of non-negative numbers into a hash string.
    ///
    /// An empty slice encodes to the empty string. Otherwise the result
    /// is never empty and, when a minimum length is configured, at least
    /// that long.
    ///
    /// # Errors
    ///
    /// Returns `NegativeNumber` if any element is negative; no partial
    /// output is produced.
    pub fn encode(&self, numbers: &[i64]) -> Result<String> {
        if numbers.is_empty() {
            return Ok(String::new());
        }

        let mut lottery_id: u64 = 0;
        for (i, &number) in numbers.iter().enumerate() {
            if number < 0 {
                return Err(CloakIdError::NegativeNumber { number });
            }
            lottery_id += number as u64 % (i as u64 + LOTTERY_MOD);
        }

        let mut alphabet = self.alphabet.clone();
        let lottery = alphabet[(lottery_id % alphabet.len() as u64) as usize];

        let mut output: Vec<char> = Vec::new();
        for (idx, &number) in numbers.iter().enumerate() {
            derive_alphabet(&mut alphabet, &self.salt, lottery);

            let block_start = output.len();
            output.extend(to_digits(number as u64, &alphabet));

            if idx == 0 {
                output.insert(0, lottery);
            }

            // for the first block the seed character is the lottery, not
            // the block's first digit: the protocol indexes the buffer
            // before accounting for the prepend
            if idx + 1 < numbers.len() {
                let seed = number as u64 % (output[block_start] as u64 + 1);
                let separator =
                    self.separators[(seed % self.separators.len() as u64) as usize];
                output.push(separator);
            }
        }

        if let Some(min_length) = self.min_length {
            self.pad(&mut output, &mut alphabet, lottery_id, lottery, min_length);
        }

        Ok(output.into_iter().collect())
    }

    /// Encodes a single number; equivalent to `encode(&[number])`.
    ///
    /// # Errors
    ///
    /// Returns `NegativeNumber` if `number` is negative.
    pub fn encode_one(&self, number: i64) -> Result<String> {
        self.encode(&[number])
    }

    /// Encodes a hexadecimal string, with or without a `0x`/`0X` prefix.
    ///
    /// The digits are split into groups of at most 12 nibbles and each
    /// group is encoded behind a leading `1` marker digit, so leading
    /// zeros survive the round trip.
    ///
    /// # Errors
    ///
    /// Returns `InvalidHexNumber` if the input contains a non-hex
    /// character.
    pub fn encode_hex(&self, hex: &str) -> Result<String> {
        let digits = hex
            .strip_prefix("0x")
            .or_else(|| hex.strip_prefix("0X"))
            .unwrap_or(hex);

        let mut numbers = Vec::with_capacity(digits.len().div_ceil(HEX_GROUP_LEN));
        for group in digits.as_bytes().chunks(HEX_GROUP_LEN) {
            let mut value: u64 = 1;
            for &b in group {
                let nibble = (b as char).to_digit(16).ok_or_else(|| {
                    CloakIdError::InvalidHexNumber {
                        hex: hex.to_string(),
                    }
                })?;
                value = value * 16 + u64::from(nibble);
            }
            numbers.push(value as i64);
        }
        self.encode(&numbers)
    }

    /// Brings `output` up to `min_length`: one guard in front, a second
    /// behind if needed, then whole or partial slices of the re-shuffled
    /// alphabet spliced around the hash so the payload stays contiguous
    /// in the middle.
    fn pad(
        &self,
        output: &mut Vec<char>,
        alphabet: &mut Vec<char>,
        lottery_id: u64,
        lottery: char,
        min_length: usize,
    ) {
        if min_length > output.len() {
            let guard_index =
                ((lottery_id + lottery as u64) % self.guards.len() as u64) as usize;
            output.insert(0, self.guards[guard_index]);

            if min_length > output.len() {
                let guard_index =
                    ((lottery_id + output[2] as u64) % self.guards.len() as u64) as usize;
                output.push(self.guards[guard_index]);
            }
        }

        while output.len() < min_length {
            // each round shuffles the working alphabet with a pristine
            // copy of itself as the salt
            let pristine = alphabet.clone();
            shuffle(alphabet, &pristine);

            let half = alphabet.len() / 2;
            let padding_left = min_length - output.len();
            let mut padded;
            if padding_left > alphabet.len() {
                // wrap the entire alphabet around the current output
                padded = Vec::with_capacity(output.len() + alphabet.len());
                padded.extend_from_slice(&alphabet[half..]);
                padded.append(output);
                padded.extend_from_slice(&alphabet[..half]);
            } else {
                // final round: split the alphabet at the midpoint plus
                // half the excess so exactly padding_left characters land
                // around the output
                let excess = alphabet.len() + output.len() - min_length;
                let front_start = half + excess / 2;
                let front_len = alphabet.len() - front_start;
                let back_len = padding_left - front_len;
                padded = Vec::with_capacity(min_length);
                padded.extend_from_slice(&alphabet[front_start..]);
                padded.append(output);
                padded.extend_from_slice(&alphabet[..back_len]);
            }
            *output = padded;
        }
    }
}
