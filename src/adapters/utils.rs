//! Credential checks shared by the storage adapters.

/// Minimum WPA2 passphrase length.
pub(super) const MIN_WIFI_PASSWORD_LEN: usize = 8;

/// Space through tilde only: no control bytes, nothing above 0x7E.
pub(super) fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (b' '..=b'~').contains(&b))
}

/// An open network (empty) or a printable passphrase of at least
/// [`MIN_WIFI_PASSWORD_LEN`] characters.
pub(super) fn is_valid_wifi_password(s: &str) -> bool {
    s.is_empty() || (s.len() >= MIN_WIFI_PASSWORD_LEN && is_printable_ascii(s))
}
