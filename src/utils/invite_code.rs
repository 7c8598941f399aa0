//! Family invite code generation
//!
//! Codes are 8 symbols formatted `XXXX-XXXX`, drawn from a 32-symbol
//! alphabet that excludes the visually confusable I, O, 0 and 1 so they
//! survive being read aloud or copied by hand.

use rand::Rng;

/// 32 symbols, no I/O/0/1
const ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Generate a random invite code in `XXXX-XXXX` format.
///
/// Uniqueness against existing families is the caller's job (regenerate
/// on collision); this function only guarantees the format.
pub fn generate_invite_code() -> String {
    let mut rng = rand::thread_rng();
    let mut code = String::with_capacity(9);
    for i in 0..8 {
        if i == 4 {
            code.push('-');
        }
        let idx = rng.gen_range(0..ALPHABET.len());
        code.push(ALPHABET[idx] as char);
    }
    code
}

/// Validate the `XXXX-XXXX` format and alphabet.
pub fn is_valid_invite_code(code: &str) -> bool {
    let bytes = code.as_bytes();
    if bytes.len() != 9 || bytes[4] != b'-' {
        return false;
    }
    bytes
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != 4)
        .all(|(_, b)| ALPHABET.contains(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_codes_match_format() {
        for _ in 0..200 {
            let code = generate_invite_code();
            assert_eq!(code.len(), 9);
            assert!(is_valid_invite_code(&code), "bad code: {code}");
        }
    }

    #[test]
    fn alphabet_excludes_confusable_symbols() {
        for banned in ['I', 'O', '0', '1'] {
            assert!(!ALPHABET.contains(&(banned as u8)));
        }
        assert_eq!(ALPHABET.len(), 32);
    }

    #[test]
    fn format_validation_rejects_bad_codes() {
        assert!(is_valid_invite_code("ABCD-EFGH"));
        assert!(is_valid_invite_code("2345-WXYZ"));
        assert!(!is_valid_invite_code("ABCDEFGH"));
        assert!(!is_valid_invite_code("ABCD-EFG"));
        assert!(!is_valid_invite_code("ABCD-EFG0"));
        assert!(!is_valid_invite_code("abcd-efgh"));
        assert!(!is_valid_invite_code("ABCD_EFGH"));
    }
}
