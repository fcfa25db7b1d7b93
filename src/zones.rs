//! Built-in DNS blacklist zones
//!
//! The check engine takes its zone list from configuration; this module
//! only supplies the default set. The entries are long-lived public
//! DNSBLs queried over plain DNS.

/// Well-known public DNSBL zones, in the order they are checked.
const BUILTIN_ZONES: &[&str] = &[
    "b.barracudacentral.org",
    "bl.spamcop.net",
    "dnsbl.dronebl.org",
    "dnsbl.sorbs.net",
    "ix.dnsbl.manitu.net",
    "psbl.surriel.com",
    "ubl.unsubscore.com",
    "zen.spamhaus.org",
];

/// The built-in blacklist zone list as owned strings.
pub fn builtin_zones() -> Vec<String> {
    BUILTIN_ZONES.iter().map(|zone| (*zone).to_string()).collect()
}
