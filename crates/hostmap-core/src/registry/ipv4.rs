//! Dotted-quad IPv4 validation
//!
//! The grammar is four groups of one to three ASCII digits separated by
//! single dots, each group numerically within `0..=255`. Leading zeros are
//! accepted (`"01.002.3.4"` is valid), so documents written by older
//! clients keep loading.

/// Number of groups in a dotted-quad address
const OCTETS: usize = 4;

/// Maximum digits per group
const MAX_OCTET_DIGITS: usize = 3;

/// Check whether `ip` is a dotted-quad IPv4 literal
pub fn is_valid_ipv4(ip: &str) -> bool {
    let mut groups = 0;

    for group in ip.split('.') {
        groups += 1;
        if groups > OCTETS || !is_valid_octet(group) {
            return false;
        }
    }

    groups == OCTETS
}

fn is_valid_octet(group: &str) -> bool {
    if group.is_empty() || group.len() > MAX_OCTET_DIGITS {
        return false;
    }
    if !group.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }

    // At most three ASCII digits, so the parse cannot overflow.
    group.parse::<u16>().is_ok_and(|value| value <= 255)
}
