//! Backup code generation.
//!
//! Codes are 8 characters drawn uniformly and independently from lowercase
//! ASCII letters and digits.

use rand::Rng;

pub const CODE_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
pub const CODE_LEN: usize = 8;

/// Draw a fresh code.
pub fn generate_code() -> String {
    generate_code_with(&mut rand::thread_rng())
}

pub fn generate_code_with<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..CODE_LEN)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

/// Whether `code` has the exact shape of a generated code.
pub fn is_valid_code(code: &str) -> bool {
    code.len() == CODE_LEN && code.bytes().all(|b| CODE_ALPHABET.contains(&b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generated_codes_are_well_formed() {
        for _ in 0..1000 {
            let code = generate_code();
            assert_eq!(code.len(), CODE_LEN);
            assert!(is_valid_code(&code), "bad code {code}");
        }
    }

    #[test]
    fn test_generation_covers_alphabet() {
        let mut seen = HashSet::new();
        for _ in 0..2000 {
            seen.extend(generate_code().bytes());
        }
        assert_eq!(seen.len(), CODE_ALPHABET.len());
    }

    #[test]
    fn test_is_valid_code_rejects() {
        assert!(is_valid_code("ab12cd34"));
        assert!(!is_valid_code("AB12CD34"));
        assert!(!is_valid_code("ab12cd3"));
        assert!(!is_valid_code("ab12cd345"));
        assert!(!is_valid_code("ab12-d34"));
        assert!(!is_valid_code(""));
    }
}
