// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Import planning for shared contact snapshots.
//!
//! Duplicates are detected with [`ContactKey`]: case-insensitive name,
//! exact phone, exact email (missing = empty).

use crate::models::{Contact, ContactKey, SharedContact};
use std::collections::{HashMap, HashSet};

/// Result of comparing a snapshot against an address book.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportPlan {
    /// Contacts to append, in snapshot order
    pub to_add: Vec<SharedContact>,
    /// Snapshot entries matching an existing contact
    pub skipped: usize,
    /// Snapshot entries merged into an earlier entry with the same key
    pub collapsed: usize,
}

/// Collapse entries sharing a key.
///
/// The first occurrence keeps its position; the data of the last
/// occurrence wins.
pub fn collapse_duplicates(shared: Vec<SharedContact>) -> (Vec<SharedContact>, usize) {
    let mut positions: HashMap<ContactKey, usize> = HashMap::with_capacity(shared.len());
    let mut unique: Vec<SharedContact> = Vec::with_capacity(shared.len());
    let mut collapsed = 0;

    for contact in shared {
        match positions.get(&contact.key()) {
            Some(&idx) => {
                unique[idx] = contact;
                collapsed += 1;
            }
            None => {
                positions.insert(contact.key(), unique.len());
                unique.push(contact);
            }
        }
    }

    (unique, collapsed)
}

/// Decide which snapshot entries to add to `existing`.
pub fn plan_import(existing: &[Contact], shared: Vec<SharedContact>) -> ImportPlan {
    let existing_keys: HashSet<ContactKey> = existing.iter().map(Contact::key).collect();
    let (unique, collapsed) = collapse_duplicates(shared);

    let mut plan = ImportPlan {
        collapsed,
        ..Default::default()
    };

    for contact in unique {
        if existing_keys.contains(&contact.key()) {
            plan.skipped += 1;
        } else {
            plan.to_add.push(contact);
        }
    }

    plan
}
