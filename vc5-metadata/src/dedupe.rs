// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Duplicate-tuple removal: when requested, drop an earlier tuple whose tag reappears later
//! within the same (or an earlier) class instance of the same enclosing class tag.
//!
//! Streaming (`GPMF`) and layer (`LAYR`) tuples are exempt, since repeated instances of those
//! tags are meaningful samples, not redundant metadata.

use crate::tuple::Tuple;

const EXEMPT_TAGS: [[u8; 4]; 2] = [*b"GPMF", *b"LAYR"];

fn is_exempt(tag: [u8; 4]) -> bool {
    EXEMPT_TAGS.contains(&tag)
}

/// Removes duplicate tuples from a tree of top-level tuples, processing each tuple in reverse
/// order and discarding earlier tuples that share a tag with one encountered later in the same
/// container.
pub fn remove_duplicates(tuples: &mut Vec<Tuple>) {
    dedupe_siblings(tuples);
    for tuple in tuples.iter_mut() {
        if let Tuple::Container { children, .. } = tuple {
            remove_duplicates(children);
        }
    }
}

fn dedupe_siblings(tuples: &mut Vec<Tuple>) {
    let mut seen_from_end: Vec<[u8; 4]> = Vec::new();
    let mut keep = vec![true; tuples.len()];

    for (index, tuple) in tuples.iter().enumerate().rev() {
        let tag = tuple.tag();
        if is_exempt(tag) {
            continue;
        }
        if seen_from_end.contains(&tag) {
            keep[index] = false;
        } else {
            seen_from_end.push(tag);
        }
    }

    let mut index = 0;
    tuples.retain(|_| {
        let keep_this = keep[index];
        index += 1;
        keep_this
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuple::TupleHeader;

    fn leaf(tag: &[u8; 4], payload: Vec<u8>) -> Tuple {
        Tuple::Leaf {
            header: TupleHeader { tag: *tag, ty: b'0', element_size: 0, count: 0, total_size: payload.len() as u32 },
            payload,
        }
    }

    #[test]
    fn verify_later_duplicate_wins() {
        let mut tuples = vec![leaf(b"VEND", vec![1]), leaf(b"VEND", vec![2])];
        remove_duplicates(&mut tuples);
        assert_eq!(tuples.len(), 1);
        match &tuples[0] {
            Tuple::Leaf { payload, .. } => assert_eq!(payload, &vec![2]),
            _ => panic!("expected leaf"),
        }
    }

    #[test]
    fn verify_gpmf_is_exempt_from_deduplication() {
        let mut tuples = vec![leaf(b"GPMF", vec![1]), leaf(b"GPMF", vec![2])];
        remove_duplicates(&mut tuples);
        assert_eq!(tuples.len(), 2);
    }

    #[test]
    fn verify_layr_is_exempt_from_deduplication() {
        let mut tuples = vec![leaf(b"LAYR", vec![1]), leaf(b"LAYR", vec![2]), leaf(b"LAYR", vec![3])];
        remove_duplicates(&mut tuples);
        assert_eq!(tuples.len(), 3);
    }
}
