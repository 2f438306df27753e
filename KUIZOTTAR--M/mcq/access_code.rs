use rand::Rng;

/// Characters allowed in an access code.
pub const CODE_ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Default access code length.
pub const DEFAULT_CODE_LENGTH: usize = 10;

/// Random code of `length` characters drawn from `A-Z0-9`.
pub fn generate_access_code<R>(rng: &mut R, length: usize) -> String
where
    R: Rng + ?Sized,
{
    (0..length)
        .map(|_| char::from(CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())]))
        .collect()
}

/// True when `code` has `length` characters, all from the code alphabet.
#[must_use]
pub fn is_valid_access_code(code: &str, length: usize) -> bool {
    code.len() == length && code.bytes().all(|b| CODE_ALPHABET.contains(&b))
}
