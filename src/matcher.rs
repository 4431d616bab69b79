//! Three-way identity matching (§4.4): intersect base/ours/theirs entity
//! sequences by identity key and classify each key's disposition.

use std::collections::HashMap;

use crate::entity::{Entity, EntityList};

/// The three-way classification of a single identity key (§4.4, GLOSSARY).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Disposition {
    Unchanged,
    OursOnly,
    TheirsOnly,
    BothSame,
    Conflict,
    AddedOurs,
    AddedTheirs,
    DeletedOurs,
    DeletedTheirs,
    DeleteVsModify,
}

/// One identity key's matched entities and disposition across all three sides.
pub struct MatchedEntity<'a> {
    pub key: String,
    pub disposition: Disposition,
    pub base: Option<&'a Entity>,
    pub ours: Option<&'a Entity>,
    pub theirs: Option<&'a Entity>,
}

/// Build an identity-keyed map over an [`EntityList`], first-write-wins on a
/// duplicate key (§6 `BuildEntityMap`; §9 duplicate keys "should not" occur
/// per the identity-uniqueness invariant, but the diff-only summary map
/// prefers the first-seen entity if they do).
#[must_use]
pub fn build_entity_map(list: &EntityList) -> HashMap<String, &Entity> {
    let mut map = HashMap::with_capacity(list.entities.len());
    for entity in &list.entities {
        map.entry(entity.identity_key()).or_insert(entity);
    }
    map
}

/// Last-write-wins variant of [`build_entity_map`], used internally by the
/// matcher (§4.4 step 1: "last-write-wins for matching").
fn build_entity_map_last_write_wins(list: &EntityList) -> HashMap<String, &Entity> {
    let mut map = HashMap::with_capacity(list.entities.len());
    for entity in &list.entities {
        map.insert(entity.identity_key(), entity);
    }
    map
}

/// First-seen document-order identity keys (§6 `OrderedIdentityKeys`).
#[must_use]
pub fn ordered_identity_keys(list: &EntityList) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut keys = Vec::new();
    for entity in &list.entities {
        let key = entity.identity_key();
        if seen.insert(key.clone()) {
            keys.push(key);
        }
    }
    keys
}

/// Match base/ours/theirs entity lists by identity key (§6 `MatchEntities`).
#[must_use]
pub fn match_entities<'a>(
    base: &'a EntityList,
    ours: &'a EntityList,
    theirs: &'a EntityList,
) -> Vec<MatchedEntity<'a>> {
    let base_map = build_entity_map_last_write_wins(base);
    let ours_map = build_entity_map_last_write_wins(ours);
    let theirs_map = build_entity_map_last_write_wins(theirs);

    let mut seen = std::collections::HashSet::new();
    let mut keys = Vec::new();
    for list in [base, ours, theirs] {
        for entity in &list.entities {
            let key = entity.identity_key();
            if seen.insert(key.clone()) {
                keys.push(key);
            }
        }
    }

    keys.into_iter()
        .map(|key| {
            let b = base_map.get(&key).copied();
            let o = ours_map.get(&key).copied();
            let t = theirs_map.get(&key).copied();
            let disposition = classify(b, o, t);
            MatchedEntity {
                key,
                disposition,
                base: b,
                ours: o,
                theirs: t,
            }
        })
        .collect()
}

/// §4.4 step 3's presence-triple + hash-comparison disposition table.
fn classify(base: Option<&Entity>, ours: Option<&Entity>, theirs: Option<&Entity>) -> Disposition {
    match (base, ours, theirs) {
        (Some(b), Some(o), Some(t)) => {
            let ours_changed = o.body_hash != b.body_hash;
            let theirs_changed = t.body_hash != b.body_hash;
            match (ours_changed, theirs_changed) {
                (false, false) => Disposition::Unchanged,
                (true, false) => Disposition::OursOnly,
                (false, true) => Disposition::TheirsOnly,
                (true, true) => {
                    if o.body_hash == t.body_hash {
                        Disposition::BothSame
                    } else {
                        Disposition::Conflict
                    }
                }
            }
        }
        (Some(b), Some(o), None) => {
            if o.body_hash == b.body_hash {
                Disposition::DeletedTheirs
            } else {
                Disposition::DeleteVsModify
            }
        }
        (Some(b), None, Some(t)) => {
            if t.body_hash == b.body_hash {
                Disposition::DeletedOurs
            } else {
                Disposition::DeleteVsModify
            }
        }
        (Some(_), None, None) => Disposition::Unchanged,
        (None, Some(_), None) => Disposition::AddedOurs,
        (None, None, Some(_)) => Disposition::AddedTheirs,
        (None, Some(o), Some(t)) => {
            if o.body_hash == t.body_hash {
                Disposition::BothSame
            } else {
                Disposition::Conflict
            }
        }
        (None, None, None) => unreachable!("key only exists if present on at least one side"),
    }
}
