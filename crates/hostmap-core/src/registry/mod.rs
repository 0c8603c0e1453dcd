//! In-memory domain to IPv4 registry
//!
//! The registry maps each domain to exactly one IPv4 address and each
//! address back to at most one domain. Domains are case-sensitive opaque
//! identifiers; addresses are kept exactly as entered.
//!
//! ## Usage
//!
//! ```rust
//! use hostmap_core::registry::{Registry, Removal};
//!
//! let mut registry = Registry::new();
//! registry.add("a.com", "1.2.3.4").unwrap();
//!
//! assert_eq!(registry.lookup_by_domain("a.com"), Some("1.2.3.4"));
//! assert_eq!(registry.lookup_by_ip("1.2.3.4"), Some("a.com"));
//!
//! assert!(matches!(registry.remove("1.2.3.4"), Removal::ByIp { .. }));
//! assert!(registry.is_empty());
//! ```

pub mod ipv4;

pub use ipv4::is_valid_ipv4;

use crate::error::{Error, Result};
use std::collections::BTreeMap;

/// Outcome of [`Registry::remove`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Removal {
    /// The key matched a domain
    ByDomain {
        /// Removed domain
        domain: String,
        /// Address it pointed to
        ip: String,
    },
    /// The key matched an address
    ByIp {
        /// Domain that pointed to the address
        domain: String,
        /// Removed address
        ip: String,
    },
    /// Nothing matched; the registry is unchanged
    NotFound,
}

impl Removal {
    /// Whether an entry was removed
    pub fn is_removed(&self) -> bool {
        !matches!(self, Removal::NotFound)
    }
}

/// Domain to IPv4 mapping
///
/// Entries are kept ordered by domain, so listing, the reverse lookup and
/// the encoded document all share one deterministic order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    entries: BTreeMap<String, String>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(domain, ip)` pairs in ascending domain order
    ///
    /// The iterator borrows the registry and can be recreated at will.
    pub fn list(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.entries
            .iter()
            .map(|(domain, ip)| (domain.as_str(), ip.as_str()))
    }

    /// Address mapped to `domain`, if any
    pub fn lookup_by_domain(&self, domain: &str) -> Option<&str> {
        self.entries.get(domain).map(String::as_str)
    }

    /// First domain (in domain order) mapped to `ip`, if any
    pub fn lookup_by_ip(&self, ip: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, value)| value.as_str() == ip)
            .map(|(domain, _)| domain.as_str())
    }

    /// Whether `domain` is not yet mapped
    pub fn is_unique_domain(&self, domain: &str) -> bool {
        !self.entries.contains_key(domain)
    }

    /// Whether no domain maps to `ip`
    pub fn is_unique_ip(&self, ip: &str) -> bool {
        self.entries.values().all(|value| value != ip)
    }

    /// Insert a new pair
    ///
    /// Checks run in a fixed order and the first failure is reported:
    /// duplicate domain, duplicate address, address syntax, empty domain.
    pub fn add(&mut self, domain: impl Into<String>, ip: impl Into<String>) -> Result<()> {
        let domain = domain.into();
        let ip = ip.into();

        if !self.is_unique_domain(&domain) {
            return Err(Error::DuplicateDomain(domain));
        }
        if !self.is_unique_ip(&ip) {
            return Err(Error::DuplicateIp(ip));
        }
        if !is_valid_ipv4(&ip) {
            return Err(Error::InvalidIpFormat(ip));
        }
        if domain.is_empty() {
            return Err(Error::EmptyDomain);
        }

        self.entries.insert(domain, ip);
        Ok(())
    }

    /// Remove the entry whose domain, or failing that whose address, equals `key`
    pub fn remove(&mut self, key: &str) -> Removal {
        if let Some(ip) = self.entries.remove(key) {
            return Removal::ByDomain {
                domain: key.to_string(),
                ip,
            };
        }

        let Some(domain) = self.lookup_by_ip(key).map(str::to_string) else {
            return Removal::NotFound;
        };
        self.entries.remove(&domain);

        Removal::ByIp {
            domain,
            ip: key.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Registry {
        let mut registry = Registry::new();
        registry.add("a.com", "1.2.3.4").unwrap();
        registry.add("b.com", "5.6.7.8").unwrap();
        registry
    }

    #[test]
    fn test_add_and_lookup() {
        let registry = sample();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.lookup_by_domain("a.com"), Some("1.2.3.4"));
        assert_eq!(registry.lookup_by_domain("c.com"), None);
        assert_eq!(registry.lookup_by_ip("5.6.7.8"), Some("b.com"));
        assert_eq!(registry.lookup_by_ip("9.9.9.9"), None);
    }

    #[test]
    fn test_domains_are_case_sensitive() {
        let mut registry = sample();

        registry.add("A.com", "9.9.9.9").unwrap();
        assert_eq!(registry.lookup_by_domain("A.com"), Some("9.9.9.9"));
        assert_eq!(registry.lookup_by_domain("a.com"), Some("1.2.3.4"));
    }

    #[test]
    fn test_list_is_sorted_by_domain() {
        let mut registry = Registry::new();
        registry.add("zeta.org", "10.0.0.3").unwrap();
        registry.add("alpha.org", "10.0.0.1").unwrap();
        registry.add("mid.org", "10.0.0.2").unwrap();

        let domains: Vec<&str> = registry.list().map(|(domain, _)| domain).collect();
        assert_eq!(domains, vec!["alpha.org", "mid.org", "zeta.org"]);

        // Restartable
        assert_eq!(registry.list().count(), 3);
    }

    #[test]
    fn test_add_check_order() {
        let mut registry = sample();

        // Duplicate domain wins over duplicate and invalid ip
        assert!(matches!(
            registry.add("a.com", "5.6.7.8"),
            Err(Error::DuplicateDomain(_))
        ));
        assert!(matches!(
            registry.add("a.com", "not-an-ip"),
            Err(Error::DuplicateDomain(_))
        ));

        // Duplicate ip wins over empty domain
        assert!(matches!(registry.add("", "5.6.7.8"), Err(Error::DuplicateIp(_))));

        // Invalid ip wins over empty domain
        assert!(matches!(
            registry.add("", "300.1.1.1"),
            Err(Error::InvalidIpFormat(_))
        ));

        assert!(matches!(registry.add("", "9.9.9.9"), Err(Error::EmptyDomain)));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_uniqueness_predicates() {
        let registry = sample();

        assert!(!registry.is_unique_domain("a.com"));
        assert!(registry.is_unique_domain("c.com"));
        assert!(!registry.is_unique_ip("1.2.3.4"));
        assert!(registry.is_unique_ip("1.2.3.5"));
    }

    #[test]
    fn test_remove_by_domain() {
        let mut registry = sample();

        let removal = registry.remove("a.com");
        assert_eq!(
            removal,
            Removal::ByDomain {
                domain: "a.com".to_string(),
                ip: "1.2.3.4".to_string(),
            }
        );
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.lookup_by_domain("a.com"), None);
    }

    #[test]
    fn test_remove_by_ip() {
        let mut registry = sample();

        let removal = registry.remove("5.6.7.8");
        assert_eq!(
            removal,
            Removal::ByIp {
                domain: "b.com".to_string(),
                ip: "5.6.7.8".to_string(),
            }
        );
        assert_eq!(registry.lookup_by_domain("b.com"), None);
    }

    #[test]
    fn test_remove_not_found() {
        let mut registry = sample();

        let removal = registry.remove("c.com");
        assert_eq!(removal, Removal::NotFound);
        assert!(!removal.is_removed());
        assert_eq!(registry, sample());
    }
}
