//! Authorization rule-table synthesis.
//!
//! Derives the permission table from the exact procedure names the
//! procedure synthesizer produced - same casing rule, same prefixing
//! configuration. When a custom policy source is configured this stage is
//! bypassed entirely; the emission layer imports the external `permissions`
//! object instead.

use crate::config::GeneratorConfig;
use crate::ir::{AccessClass, RuleTable};

use super::naming;
use super::procedure::ProcedureSpec;

/// Synthesizes the rule table, or `None` when a custom policy source
/// bypasses generation.
pub fn synthesize(procedures: &[ProcedureSpec], config: &GeneratorConfig) -> Option<RuleTable> {
    if config.custom_policy.is_some() {
        return None;
    }

    let mut table = RuleTable::default();
    for proc in procedures {
        let rule = match proc.classification {
            AccessClass::Read => config.read_rule,
            AccessClass::Write => config.write_rule,
        };
        table
            .entities
            .entry(naming::entity_key(&proc.entity))
            .or_default()
            .insert(proc.name.clone(), rule);
    }
    Some(table)
}
