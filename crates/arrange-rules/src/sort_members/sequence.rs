//! Canonical member sequence
//!
//! Sorts each captured bucket by its key and concatenates the buckets in
//! [`MemberCategory`] order. Nested types are finished (sequenced and
//! rewritten) before they are sorted among themselves.

use arrange_core::Result;
use rowan::GreenNode;

use super::MemberCategory;
use super::capture::{CapturedMember, CapturedType};
use super::rewrite::PositionalRewriter;

/// One element of a canonical sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequencedMember {
    pub category: MemberCategory,
    pub key: String,
    /// The member subtree to place; already arranged for nested types
    pub green: GreenNode,
}

/// Members of one type in their new order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalSequence {
    pub type_name: String,
    pub members: Vec<SequencedMember>,
}

impl CanonicalSequence {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Sort keys in sequence order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(|m| m.key.as_str())
    }
}

/// Build the canonical sequence for one captured type
///
/// Buckets are sorted with a stable sort on the ordinal (byte-wise) order of
/// their keys, so overloads keep their declaration order.
pub fn canonical_sequence(captured: CapturedType) -> Result<CanonicalSequence> {
    let CapturedType {
        name,
        events,
        fields,
        properties,
        constructors,
        methods,
        enums,
        nested,
        ..
    } = captured;

    let mut members = Vec::new();
    let buckets = [
        (MemberCategory::Event, events),
        (MemberCategory::Field, fields),
        (MemberCategory::Property, properties),
        (MemberCategory::Constructor, constructors),
        (MemberCategory::Method, methods),
        (MemberCategory::Enum, enums),
    ];
    for (category, mut bucket) in buckets {
        sort_by_key(&mut bucket);
        members.extend(bucket.into_iter().map(|member| SequencedMember {
            category,
            green: member.node.green().into_owned(),
            key: member.key,
        }));
    }

    let mut finished = nested
        .into_iter()
        .map(finish_nested)
        .collect::<Result<Vec<_>>>()?;
    finished.sort_by(|a, b| a.key.cmp(&b.key));
    members.extend(finished);

    Ok(CanonicalSequence {
        type_name: name,
        members,
    })
}

/// `String` ordering is byte-wise, which is the ordinal comparison we want
fn sort_by_key(bucket: &mut [CapturedMember]) {
    bucket.sort_by(|a, b| a.key.cmp(&b.key));
}

/// Arrange a nested type completely, yielding it as a single element
fn finish_nested(captured: CapturedType) -> Result<SequencedMember> {
    let target = captured.target.clone();
    let key = captured.name.clone();
    let sequence = canonical_sequence(captured)?;
    let green = PositionalRewriter::new(sequence).rewrite(&target)?;
    Ok(SequencedMember {
        category: MemberCategory::NestedType,
        key,
        green,
    })
}
