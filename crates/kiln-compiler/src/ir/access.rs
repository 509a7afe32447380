//! Authorization rules and the synthesized rule table.

use std::collections::BTreeMap;

use serde::Serialize;

/// An access-control rule attached to a procedure.
///
/// `parse` is the only way a configured string becomes a rule, and it is
/// secure by default: anything unrecognized resolves to `Deny`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Rule {
    /// Always permit.
    Allow,

    /// Always refuse.
    #[default]
    Deny,

    /// Permit only when a caller identity is present in the request context.
    Authenticated,
}

impl Rule {
    /// Parse a rule from a configured string value.
    ///
    /// Unrecognized values resolve to `Deny`. Never `Allow`.
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "allow" => Self::Allow,
            "deny" => Self::Deny,
            "authenticated" => Self::Authenticated,
            _ => Self::Deny,
        }
    }

    /// String representation used in emitted policy artifacts.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::Deny => "deny",
            Self::Authenticated => "authenticated",
        }
    }
}

/// The synthesized authorization rule table.
///
/// Keyed by entity key (lower-first entity name), then by the exact
/// procedure names the procedure synthesizer mints under the same
/// configuration. That 1:1 correspondence is the cross-artifact law the
/// consistency layer enforces.
///
/// BTreeMaps keep iteration order stable so repeated runs emit
/// byte-identical artifacts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RuleTable {
    pub entities: BTreeMap<String, BTreeMap<String, Rule>>,
}

impl RuleTable {
    /// Rules for one entity key, if present.
    pub fn entity(&self, key: &str) -> Option<&BTreeMap<String, Rule>> {
        self.entities.get(key)
    }

    /// Total number of rules across all entities.
    pub fn len(&self) -> usize {
        self.entities.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_values() {
        assert_eq!(Rule::parse("allow"), Rule::Allow);
        assert_eq!(Rule::parse("deny"), Rule::Deny);
        assert_eq!(Rule::parse("authenticated"), Rule::Authenticated);
        assert_eq!(Rule::parse("Authenticated"), Rule::Authenticated);
    }

    #[test]
    fn unrecognized_values_resolve_to_deny() {
        // The secure-by-default fallback is a hard requirement: bad config
        // must never widen access.
        assert_eq!(Rule::parse(""), Rule::Deny);
        assert_eq!(Rule::parse("yes"), Rule::Deny);
        assert_eq!(Rule::parse("public"), Rule::Deny);
        assert_eq!(Rule::parse("allow "), Rule::Deny);
    }
}
