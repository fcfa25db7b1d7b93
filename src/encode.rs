//! Reversed-label encoding of IPv4 addresses for DNSBL queries
//!
//! DNSBL zones are queried by prepending the address under test, with its
//! octets reversed, to the zone name: checking `1.2.3.4` against
//! `zen.example.org` means resolving `4.3.2.1.zen.example.org.`.
//!
//! Only IPv4 is supported. DNSBL zones index dotted-decimal addresses, so
//! the API takes [`Ipv4Addr`] and IPv6 input is unrepresentable here; the
//! CLI rejects it at the argument boundary.

use std::net::Ipv4Addr;

/// Reverse the octets of an IPv4 address.
///
/// `a.b.c.d` becomes `d.c.b.a`.
pub fn reverse_octets(address: Ipv4Addr) -> String {
    let [a, b, c, d] = address.octets();
    format!("{d}.{c}.{b}.{a}")
}

/// Compose the fully-qualified query name for one (address, zone) pair.
///
/// The result always carries a trailing dot: `4.3.2.1.zen.example.org.`.
/// A trailing dot already present on the zone is not doubled.
pub fn query_name(address: Ipv4Addr, zone: &str) -> String {
    format!(
        "{}.{}.",
        reverse_octets(address),
        zone.trim_end_matches('.')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reverse_octets() {
        let ip = Ipv4Addr::new(1, 2, 3, 4);
        assert_eq!(reverse_octets(ip), "4.3.2.1");
    }

    #[test]
    fn test_reverse_octets_symmetric_address() {
        let ip = Ipv4Addr::new(127, 0, 0, 127);
        assert_eq!(reverse_octets(ip), "127.0.0.127");
    }

    #[test]
    fn test_query_name_has_trailing_dot() {
        let ip = Ipv4Addr::new(1, 2, 3, 4);
        assert_eq!(query_name(ip, "zen.example.org"), "4.3.2.1.zen.example.org.");
    }

    #[test]
    fn test_query_name_does_not_double_trailing_dot() {
        let ip = Ipv4Addr::new(10, 0, 0, 1);
        assert_eq!(query_name(ip, "bl.example.net."), "1.0.0.10.bl.example.net.");
    }
}
