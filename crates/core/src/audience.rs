//! Audience selection over a client's contacts.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::types::DbId;

/// The subset of a contact needed to filter and select it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactSummary {
    pub id: DbId,
    pub name: Option<String>,
    pub phone: String,
    pub email: Option<String>,
}

/// Free-text contact filter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactFilter {
    pub search: Option<String>,
}

impl ContactFilter {
    /// Case-insensitive substring match on name, phone, or email. A blank
    /// search matches everything.
    pub fn matches(&self, contact: &ContactSummary) -> bool {
        let Some(needle) = self.needle() else {
            return true;
        };
        let hit = |field: Option<&str>| field.is_some_and(|v| v.to_lowercase().contains(&needle));
        hit(contact.name.as_deref())
            || hit(Some(contact.phone.as_str()))
            || hit(contact.email.as_deref())
    }

    /// The trimmed, lowercased search term, if any.
    pub fn needle(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }
}

/// Contacts that pass `filter`, in input order.
pub fn filter_contacts<'a>(
    contacts: &'a [ContactSummary],
    filter: &ContactFilter,
) -> Vec<&'a ContactSummary> {
    contacts.iter().filter(|c| filter.matches(c)).collect()
}

/// The set of contacts chosen as a campaign audience, without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudienceSelection {
    selected: BTreeSet<DbId>,
}

impl AudienceSelection {
    pub fn from_ids(ids: impl IntoIterator<Item = DbId>) -> Self {
        Self {
            selected: ids.into_iter().collect(),
        }
    }

    /// The "select all" checkbox: exactly the contacts that pass `filter`.
    pub fn select_all(contacts: &[ContactSummary], filter: &ContactFilter) -> Self {
        Self::from_ids(filter_contacts(contacts, filter).into_iter().map(|c| c.id))
    }

    pub fn audience_count(&self) -> usize {
        self.selected.len()
    }

    pub fn ids(&self) -> impl Iterator<Item = DbId> + '_ {
        self.selected.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(id: DbId, name: &str, phone: &str, email: Option<&str>) -> ContactSummary {
        ContactSummary {
            id,
            name: Some(name.to_string()),
            phone: phone.to_string(),
            email: email.map(str::to_string),
        }
    }

    fn sample() -> Vec<ContactSummary> {
        vec![
            contact(1, "Asha Rao", "+919800000001", Some("asha@example.com")),
            contact(2, "Ravi Kumar", "+919800000002", None),
            contact(3, "Meera Das", "+14155550100", Some("meera@corp.io")),
        ]
    }

    #[test]
    fn blank_search_matches_all() {
        let contacts = sample();
        let filter = ContactFilter {
            search: Some("   ".into()),
        };
        assert_eq!(filter_contacts(&contacts, &filter).len(), 3);
    }

    #[test]
    fn search_matches_name_phone_email_case_insensitively() {
        let contacts = sample();
        let by_name = ContactFilter {
            search: Some("RAVI".into()),
        };
        assert_eq!(filter_contacts(&contacts, &by_name)[0].id, 2);

        let by_phone = ContactFilter {
            search: Some("+1415".into()),
        };
        assert_eq!(filter_contacts(&contacts, &by_phone)[0].id, 3);

        let by_email = ContactFilter {
            search: Some("example.com".into()),
        };
        let ids: Vec<DbId> = filter_contacts(&contacts, &by_email)
            .iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec![1]);
    }

    #[test]
    fn select_all_selects_exactly_filtered() {
        let contacts = sample();
        let filter = ContactFilter {
            search: Some("+91".into()),
        };
        let filtered = filter_contacts(&contacts, &filter).len();

        let selection = AudienceSelection::select_all(&contacts, &filter);
        assert_eq!(selection.audience_count(), filtered);
        assert_eq!(selection.ids().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn select_all_with_no_match_is_empty() {
        let filter = ContactFilter {
            search: Some("nobody".into()),
        };
        assert_eq!(AudienceSelection::select_all(&sample(), &filter).audience_count(), 0);
    }

    #[test]
    fn explicit_ids_are_deduplicated() {
        let selection = AudienceSelection::from_ids([4, 2, 4]);
        assert_eq!(selection.audience_count(), 2);
        assert_eq!(selection.ids().collect::<Vec<_>>(), vec![2, 4]);
    }
}
