#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CloakIdError {
    #[error("alphabet must not contain spaces: index {index}")]
    AlphabetContainsSpace { index: usize },

    #[error("alphabet must contain at least 16 unique characters: {count}")]
    AlphabetTooShort { count: usize },

    #[error("invalid number: {number}")]
    NegativeNumber { number: i64 },

    #[error("invalid character '{character}' in hash")]
    InvalidCharacter { character: char },

    #[error("invalid hash: {hash}")]
    InvalidHash { hash: String },

    #[error("invalid hex number: {hex}")]
    InvalidHexNumber { hex: String },
}

pub type Result<T> = std::result::Result<T, CloakIdError>;
