//! Client-side search and predicate filtering.
//!
//! Search is a case-insensitive substring match over a fixed set of fields
//! per entity. Filters are exact matches on one field each, and an item has
//! to pass all of them.

use std::borrow::Cow;
use std::collections::HashMap;

use super::query::FilterSet;
use crate::types::{Consent, Patient, Transaction};

/// An entity that can be shown in a list view
pub trait ListItem: Clone + Send + Sync + 'static {
    fn id(&self) -> &str;

    /// Value compared against a filter dimension, `None` if the entity has
    /// no such field
    fn field(&self, dimension: &str) -> Option<Cow<'_, str>>;

    /// Text the search term is matched against
    fn search_fields<'a>(&'a self, lookup: Option<&'a SupportLookup>) -> Vec<&'a str>;
}

/// Patients by internal id, used to show and search names next to entities
/// that only carry a patient reference
#[derive(Debug, Clone, Default)]
pub struct SupportLookup {
    patients: HashMap<String, Patient>,
}

impl SupportLookup {
    pub fn from_patients(patients: impl IntoIterator<Item = Patient>) -> Self {
        Self {
            patients: patients.into_iter().map(|p| (p.id.clone(), p)).collect(),
        }
    }

    pub fn patient(&self, id: &str) -> Option<&Patient> {
        self.patients.get(id)
    }

    /// Resolved name, empty when the id is unknown
    pub fn patient_name(&self, id: &str) -> &str {
        self.patients.get(id).map(|p| p.name.as_str()).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.patients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patients.is_empty()
    }
}

/// Apply the search term and every active filter, keeping input order
pub fn evaluate<T: ListItem>(
    items: &[T],
    search_term: &str,
    filters: &FilterSet,
    lookup: Option<&SupportLookup>,
) -> Vec<T> {
    let needle = search_term.to_lowercase();
    let predicates: Vec<(&str, &str)> = filters.active().collect();

    items
        .iter()
        .filter(|item| {
            predicates
                .iter()
                .all(|(dimension, value)| item.field(dimension).is_some_and(|f| f == *value))
        })
        .filter(|item| needle.is_empty() || matches_search(*item, &needle, lookup))
        .cloned()
        .collect()
}

/// `needle` must already be lowercase
fn matches_search<T: ListItem>(item: &T, needle: &str, lookup: Option<&SupportLookup>) -> bool {
    item.search_fields(lookup)
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
}

impl ListItem for Patient {
    fn id(&self) -> &str {
        &self.id
    }

    /// Patients are only narrowed by search
    fn field(&self, _dimension: &str) -> Option<Cow<'_, str>> {
        None
    }

    fn search_fields<'a>(&'a self, _lookup: Option<&'a SupportLookup>) -> Vec<&'a str> {
        let mut fields = vec![self.name.as_str(), self.patient_id.as_str()];
        fields.extend(self.email.as_deref());
        fields
    }
}

impl ListItem for Consent {
    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, dimension: &str) -> Option<Cow<'_, str>> {
        match dimension {
            "status" => Some(Cow::Owned(self.status.to_string())),
            _ => None,
        }
    }

    fn search_fields<'a>(&'a self, lookup: Option<&'a SupportLookup>) -> Vec<&'a str> {
        let name = lookup.map(|l| l.patient_name(&self.patient_id)).unwrap_or("");
        vec![self.patient_id.as_str(), name, self.purpose.as_str()]
    }
}

impl ListItem for Transaction {
    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, dimension: &str) -> Option<Cow<'_, str>> {
        match dimension {
            "type" => Some(Cow::Borrowed(&self.tx_type)),
            "status" => Some(Cow::Owned(self.status.to_string())),
            _ => None,
        }
    }

    fn search_fields<'a>(&'a self, _lookup: Option<&'a SupportLookup>) -> Vec<&'a str> {
        vec![
            self.id.as_str(),
            self.from.as_str(),
            self.to.as_str(),
            self.tx_type.as_str(),
            self.blockchain_tx_hash.as_str(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::list::query::ALL;
    use crate::types::ConsentStatus;

    fn consent(id: &str, patient_id: &str, purpose: &str, status: ConsentStatus) -> Consent {
        Consent {
            id: id.to_string(),
            patient_id: patient_id.to_string(),
            purpose: purpose.to_string(),
            status,
            ..Default::default()
        }
    }

    fn patient(id: &str, name: &str) -> Patient {
        Patient {
            id: id.to_string(),
            patient_id: format!("PAT-{id}"),
            name: name.to_string(),
            ..Default::default()
        }
    }

    fn sample() -> Vec<Consent> {
        vec![
            consent("c1", "p1", "Insurance Provider Access", ConsentStatus::Active),
            consent("c2", "p2", "Research Study Participation", ConsentStatus::Pending),
            consent("c3", "p1", "Medical Research", ConsentStatus::Revoked),
            consent("c4", "p3", "Data Sharing with Third Party", ConsentStatus::Active),
        ]
    }

    fn lookup() -> SupportLookup {
        SupportLookup::from_patients(vec![patient("p1", "John Smith"), patient("p2", "Ada Jones")])
    }

    fn ids(items: &[Consent]) -> Vec<&str> {
        items.iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn test_empty_search_passes_everything_in_order() {
        let items = sample();
        let result = evaluate(&items, "", &FilterSet::new(), None);
        assert_eq!(result, items);
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let items = sample();
        let result = evaluate(&items, "insurance", &FilterSet::new(), None);
        assert_eq!(ids(&result), vec!["c1"]);
    }

    #[test]
    fn test_search_matches_resolved_patient_name() {
        let items = sample();
        let lookup = lookup();
        let result = evaluate(&items, "JOHN", &FilterSet::new(), Some(&lookup));
        assert_eq!(ids(&result), vec!["c1", "c3"]);
    }

    #[test]
    fn test_unresolved_patient_matches_nothing_by_name() {
        let items = sample();
        let lookup = lookup();
        // p3 has no lookup entry, its consent is only reachable by id or purpose
        let result = evaluate(&items, "smith", &FilterSet::new(), Some(&lookup));
        assert_eq!(ids(&result), vec!["c1", "c3"]);
        let result = evaluate(&items, "p3", &FilterSet::new(), Some(&lookup));
        assert_eq!(ids(&result), vec!["c4"]);
    }

    #[test]
    fn test_filter_and_search_combine() {
        let items = sample();
        let lookup = lookup();
        let mut filters = FilterSet::new();
        filters.set("status", "active");

        let result = evaluate(&items, "john", &filters, Some(&lookup));
        assert_eq!(ids(&result), vec!["c1"]);
    }

    #[test]
    fn test_all_sentinel_disables_dimension() {
        let items = sample();
        let mut filters = FilterSet::new();
        filters.set("status", "revoked");
        filters.set("status", ALL);
        assert_eq!(evaluate(&items, "", &filters, None).len(), 4);
    }

    #[test]
    fn test_unknown_dimension_excludes_items() {
        let items = sample();
        let mut filters = FilterSet::new();
        filters.set("colour", "red");
        assert!(evaluate(&items, "", &filters, None).is_empty());
    }

    #[test]
    fn test_evaluate_is_repeatable_and_idempotent() {
        let items = sample();
        let lookup = lookup();
        let mut filters = FilterSet::new();
        filters.set("status", "active");

        let once = evaluate(&items, "a", &filters, Some(&lookup));
        let again = evaluate(&items, "a", &filters, Some(&lookup));
        assert_eq!(once, again);
        assert!(!once.is_empty());

        let twice = evaluate(&once, "a", &filters, Some(&lookup));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_transaction_fields() {
        let tx = Transaction {
            id: "t1".to_string(),
            tx_type: "consent_approval".to_string(),
            from: "0xAbC".to_string(),
            to: "0xdef".to_string(),
            blockchain_tx_hash: "0x99".to_string(),
            ..Default::default()
        };
        assert_eq!(tx.field("type").as_deref(), Some("consent_approval"));
        assert_eq!(tx.field("status").as_deref(), Some("pending"));
        let items = vec![tx];
        assert_eq!(evaluate(&items, "abc", &FilterSet::new(), None).len(), 1);
    }
}
