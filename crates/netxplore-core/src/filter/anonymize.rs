//! Pseudonym assignment.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::IdentityKind;

/// Mapping from real sender identities to `User_<k>` / `Phone_<k>`
/// pseudonyms for a single analysis.
///
/// Each prefix has its own counter starting at 1, advanced in the order
/// senders are first assigned. The map never outlives the request that
/// built it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnonymizationMap {
    pseudonyms: BTreeMap<String, String>,
    #[serde(skip)]
    next_user: usize,
    #[serde(skip)]
    next_phone: usize,
}

impl AnonymizationMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map by assigning `senders` in iteration order.
    pub fn from_senders<'a, I>(senders: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut map = Self::new();
        for sender in senders {
            map.assign(sender);
        }
        map
    }

    /// Pseudonym for `sender`, allocating the next one for its kind if the
    /// sender has not been seen yet.
    pub fn assign(&mut self, sender: &str) -> &str {
        let Self {
            pseudonyms,
            next_user,
            next_phone,
        } = self;
        pseudonyms
            .entry(sender.to_string())
            .or_insert_with(|| match IdentityKind::of(sender) {
                IdentityKind::Phone => {
                    *next_phone += 1;
                    format!("Phone_{next_phone}")
                }
                IdentityKind::Name => {
                    *next_user += 1;
                    format!("User_{next_user}")
                }
            })
    }

    /// Previously assigned pseudonym, if any.
    #[must_use]
    pub fn get(&self, sender: &str) -> Option<&str> {
        self.pseudonyms.get(sender).map(String::as_str)
    }

    /// Pseudonym for `sender`, or the sender itself when unmapped.
    #[must_use]
    pub fn display<'a>(&'a self, sender: &'a str) -> &'a str {
        self.get(sender).unwrap_or(sender)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pseudonyms.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pseudonyms.is_empty()
    }
}
