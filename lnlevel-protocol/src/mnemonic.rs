//! Mnemonic abbreviation matching
//!
//! A mnemonic such as `MEASure` has a required short form (the leading
//! characters that are not lower-case, `MEAS`) and an optional long-form
//! tail (`ure`). Input tokens are compared case-insensitively and may stop
//! anywhere between the end of the short form and the end of the long form.

/// Length of the required (short-form) prefix of a mnemonic
///
/// Everything up to the first ASCII lower-case character is required, so
/// digits and markers like `*` in `*IDN` count towards the short form.
pub fn required_len(mnemonic: &str) -> usize {
    mnemonic
        .bytes()
        .take_while(|b| !b.is_ascii_lowercase())
        .count()
}

/// The short form of a mnemonic (`EMPty` -> `EMP`)
pub fn short_form(mnemonic: &str) -> &str {
    &mnemonic[..required_len(mnemonic)]
}

/// Check whether an input token selects a mnemonic
pub fn matches(mnemonic: &str, token: &str) -> bool {
    if token.is_empty() {
        return false;
    }

    let required = required_len(mnemonic);
    if token.len() < required || token.len() > mnemonic.len() {
        return false;
    }

    mnemonic.as_bytes()[..token.len()].eq_ignore_ascii_case(token.as_bytes())
}

/// Check whether two registered mnemonics name the same node
///
/// Used at registration time, where both sides are canonical spellings.
pub fn same_node(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}
