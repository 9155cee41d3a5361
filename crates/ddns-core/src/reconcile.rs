//! Desired-vs-observed reconciliation of an A record set
//!
//! Given the records the provider currently holds and the single A record we
//! want, compute the minimal set of deletions and the optional addition that
//! leave exactly one A record under the target name, pointing at the current
//! address.
//!
//! Only records that are both type A and named exactly like the target are
//! considered. Everything else in the zone is left untouched.

use std::fmt;
use std::net::Ipv4Addr;

use crate::traits::DnsRecord;

/// TTL (seconds) given to a newly added record unless configured otherwise
pub const DEFAULT_TTL: u32 = 1800;

/// The one A record a run converges to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredState {
    /// Record name relative to the domain ("@" for the apex)
    pub name: String,
    /// Current public address
    pub address: Ipv4Addr,
}

impl DesiredState {
    pub fn new(name: impl Into<String>, address: Ipv4Addr) -> Self {
        Self {
            name: name.into(),
            address,
        }
    }

    /// Whether an observed record is one of ours (same type and name)
    ///
    /// DNS names compare case-insensitively (RFC 4343).
    fn manages(&self, record: &DnsRecord) -> bool {
        record.is_a() && record.name.eq_ignore_ascii_case(&self.name)
    }

    /// Whether an observed record already points at the desired address
    fn is_satisfied_by(&self, record: &DnsRecord) -> bool {
        record
            .address
            .trim()
            .parse::<Ipv4Addr>()
            .is_ok_and(|addr| addr == self.address)
    }

    /// The record to upsert when none satisfies us
    pub fn to_record(&self, ttl: u32) -> DnsRecord {
        DnsRecord::a(self.name.clone(), self.address.to_string(), Some(ttl))
    }
}

/// Operations needed to close the gap between observed and desired state
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReconciliationPlan {
    /// Stale A records under the target name, in observed order
    pub to_delete: Vec<DnsRecord>,
    /// Record to add, if no observed record already matches
    pub to_add: Option<DnsRecord>,
    /// At least one observed A record already carries the desired address
    pub already_satisfied: bool,
}

impl ReconciliationPlan {
    /// True when nothing needs to be sent to the provider
    pub fn is_noop(&self) -> bool {
        self.to_delete.is_empty() && self.to_add.is_none()
    }

    /// Number of provider calls applying this plan takes
    pub fn mutation_count(&self) -> usize {
        self.to_delete.len() + usize::from(self.to_add.is_some())
    }
}

impl fmt::Display for ReconciliationPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_noop() {
            return f.write_str("no changes");
        }
        write!(f, "delete {} stale record(s)", self.to_delete.len())?;
        match &self.to_add {
            Some(record) => write!(f, ", add {}", record),
            None => f.write_str(", keep existing record"),
        }
    }
}

/// Compute the plan that converges `observed` to `desired`
///
/// The scan is exhaustive: every stale A record under the name is scheduled
/// for deletion, even after a matching one has been seen, so duplicates left
/// by earlier partial runs are purged. Matching duplicates are all kept and
/// never cause an addition.
pub fn reconcile(observed: &[DnsRecord], desired: &DesiredState, ttl: u32) -> ReconciliationPlan {
    let mut plan = ReconciliationPlan::default();

    for record in observed.iter().filter(|r| desired.manages(r)) {
        if desired.is_satisfied_by(record) {
            plan.already_satisfied = true;
        } else {
            plan.to_delete.push(record.clone());
        }
    }

    if !plan.already_satisfied {
        plan.to_add = Some(desired.to_record(ttl));
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::RecordType;

    fn a(name: &str, address: &str) -> DnsRecord {
        DnsRecord::a(name, address, Some(3600))
    }

    fn desired(name: &str, address: [u8; 4]) -> DesiredState {
        DesiredState::new(name, Ipv4Addr::from(address))
    }

    #[test]
    fn test_name_match_ignores_case() {
        let observed = vec![a("home", "1.1.1.1"), a("HOME", "2.2.2.2")];
        let plan = reconcile(&observed, &desired("Home", [2, 2, 2, 2]), DEFAULT_TTL);

        assert_eq!(plan.to_delete, vec![a("home", "1.1.1.1")]);
        assert!(plan.already_satisfied);
        assert_eq!(plan.to_add, None);
    }

    #[test]
    fn test_add_when_absent() {
        let plan = reconcile(&[], &desired("@", [5, 5, 5, 5]), DEFAULT_TTL);

        assert!(plan.to_delete.is_empty());
        assert!(!plan.already_satisfied);
        assert_eq!(plan.to_add, Some(DnsRecord::a("@", "5.5.5.5", Some(1800))));
    }

    #[test]
    fn test_noop_when_already_correct() {
        let observed = vec![a("@", "9.9.9.9")];
        let plan = reconcile(&observed, &desired("@", [9, 9, 9, 9]), DEFAULT_TTL);

        assert!(plan.is_noop());
        assert!(plan.already_satisfied);
        assert_eq!(plan.mutation_count(), 0);
        assert_eq!(plan.to_string(), "no changes");
    }

    #[test]
    fn test_convergence_under_duplicates() {
        let observed = vec![a("@", "1.1.1.1"), a("@", "2.2.2.2"), a("@", "3.3.3.3")];
        let plan = reconcile(&observed, &desired("@", [2, 2, 2, 2]), DEFAULT_TTL);

        assert_eq!(plan.to_delete, vec![a("@", "1.1.1.1"), a("@", "3.3.3.3")]);
        assert_eq!(plan.to_add, None);
        assert!(plan.already_satisfied);
    }

    #[test]
    fn test_stale_record_replaced() {
        let observed = vec![a("home", "10.0.0.1")];
        let plan = reconcile(&observed, &desired("home", [10, 0, 0, 2]), 600);

        assert_eq!(plan.to_delete, vec![a("home", "10.0.0.1")]);
        assert_eq!(plan.to_add, Some(DnsRecord::a("home", "10.0.0.2", Some(600))));
        assert_eq!(plan.mutation_count(), 2);
    }

    #[test]
    fn test_name_and_type_isolation() {
        let observed = vec![
            a("www", "1.2.3.4"),
            DnsRecord {
                record_type: RecordType::Other("AAAA".to_string()),
                name: "@".to_string(),
                address: "::1".to_string(),
                ttl: Some(300),
            },
            DnsRecord {
                record_type: RecordType::Other("TXT".to_string()),
                name: "@".to_string(),
                address: String::new(),
                ttl: None,
            },
        ];
        let plan = reconcile(&observed, &desired("@", [7, 7, 7, 7]), DEFAULT_TTL);

        assert!(plan.to_delete.is_empty());
        assert_eq!(plan.to_add, Some(DnsRecord::a("@", "7.7.7.7", Some(1800))));
    }

    #[test]
    fn test_duplicate_correct_entries_left_alone() {
        let observed = vec![a("@", "4.4.4.4"), a("@", "4.4.4.4")];
        let plan = reconcile(&observed, &desired("@", [4, 4, 4, 4]), DEFAULT_TTL);

        assert!(plan.is_noop());
        assert!(plan.already_satisfied);
    }

    #[test]
    fn test_address_compared_as_ip() {
        let observed = vec![a("@", " 8.8.4.4 "), a("@", "not-an-ip")];
        let plan = reconcile(&observed, &desired("@", [8, 8, 4, 4]), DEFAULT_TTL);

        assert!(plan.already_satisfied);
        assert_eq!(plan.to_delete, vec![a("@", "not-an-ip")]);
    }

    #[test]
    fn test_idempotent_and_converges_after_apply() {
        let observed = vec![a("@", "1.1.1.1"), a("www", "1.1.1.1")];
        let want = desired("@", [6, 6, 6, 6]);

        let first = reconcile(&observed, &want, DEFAULT_TTL);
        let second = reconcile(&observed, &want, DEFAULT_TTL);
        assert_eq!(first, second);

        // Apply the plan to the observed set
        let mut after: Vec<DnsRecord> = observed
            .into_iter()
            .filter(|r| !first.to_delete.contains(r))
            .collect();
        after.extend(first.to_add.clone());

        let next = reconcile(&after, &want, DEFAULT_TTL);
        assert!(next.already_satisfied);
        assert!(next.is_noop());
    }

    #[test]
    fn test_plan_display() {
        let plan = reconcile(&[a("@", "1.1.1.1")], &desired("@", [2, 2, 2, 2]), DEFAULT_TTL);
        assert_eq!(
            plan.to_string(),
            "delete 1 stale record(s), add A/@/2.2.2.2 (ttl 1800)"
        );
    }
}
