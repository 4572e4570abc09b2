//! Redaction engine
//!
//! Merges redaction candidates from several detectors, resolves overlaps
//! and rewrites the text with placeholders.
//!
//! ## Overlap policy
//!
//! Candidates are ordered by offset ascending, then length descending, and
//! walked with a cursor. A candidate starting before the cursor overlaps an
//! accepted span and is discarded entirely. The earlier span wins; on equal
//! offsets the longer one wins.
//!
//! ## Offsets
//!
//! Span offsets count characters. They are mapped to byte ranges through a
//! per-document index before any slicing, so multi-byte text is safe.

use crate::types::{DetectedEntity, Span};
use std::ops::Range;

/// Character index → byte index table for one document
struct CharIndex {
    bytes: Vec<usize>,
}

impl CharIndex {
    fn new(text: &str) -> Self {
        let mut bytes: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        bytes.push(text.len());
        Self { bytes }
    }

    /// Byte range of `length` characters starting at character `offset`
    fn byte_range(&self, offset: usize, length: usize) -> Option<Range<usize>> {
        let end = offset.checked_add(length)?;
        let start_byte = *self.bytes.get(offset)?;
        let end_byte = *self.bytes.get(end)?;
        Some(start_byte..end_byte)
    }
}

/// Indices of the candidates that survive overlap resolution.
///
/// `ranges` yields `(offset, length)` per candidate; the result is sorted
/// ascending by offset.
fn accepted_indices(ranges: impl Iterator<Item = (usize, usize)>) -> Vec<usize> {
    let mut order: Vec<(usize, usize, usize)> = ranges
        .enumerate()
        .map(|(i, (offset, length))| (i, offset, length))
        .collect();
    // Stable: identical ranges keep their input order
    order.sort_by(|a, b| a.1.cmp(&b.1).then(b.2.cmp(&a.2)));

    let mut cursor = 0;
    let mut accepted = Vec::with_capacity(order.len());
    for (i, offset, length) in order {
        if offset < cursor {
            tracing::debug!(offset, length, cursor, "Discarding overlapping span");
            continue;
        }
        accepted.push(i);
        cursor = offset.saturating_add(length);
    }
    accepted
}

/// Resolve overlaps across the medical and contact-PII candidates.
///
/// Returns the accepted spans of each group in their original relative
/// order. Losers are dropped from both the text rewrite and the report.
pub fn resolve_overlaps(medical: &[Span], contact: &[Span]) -> (Vec<Span>, Vec<Span>) {
    let candidates: Vec<&Span> = medical.iter().chain(contact.iter()).collect();
    let mut keep = vec![false; candidates.len()];
    for i in accepted_indices(candidates.iter().map(|s| (s.offset, s.length))) {
        keep[i] = true;
    }

    let (medical_keep, contact_keep) = keep.split_at(medical.len());
    let pick = |spans: &[Span], flags: &[bool]| -> Vec<Span> {
        spans
            .iter()
            .zip(flags)
            .filter(|(_, keep)| **keep)
            .map(|(s, _)| s.clone())
            .collect()
    };

    (pick(medical, medical_keep), pick(contact, contact_keep))
}

/// Rewrite `text`, replacing every accepted candidate with its category
/// placeholder (`[PERSON]`, `[DATE]`, `[EMAIL]`, ...).
///
/// Preserved spans are never passed here and never alter the text.
pub fn redact(text: &str, medical: &[Span], contact: &[Span]) -> String {
    // Spans without a placeholder must not win an overlap they cannot redact
    let replaceable = |spans: &[Span]| -> Vec<Span> {
        spans
            .iter()
            .filter(|s| s.category.placeholder().is_some())
            .cloned()
            .collect()
    };
    let (medical, contact) = resolve_overlaps(&replaceable(medical), &replaceable(contact));

    // Replace right to left so earlier byte ranges stay valid
    let mut accepted: Vec<&Span> = medical.iter().chain(contact.iter()).collect();
    accepted.sort_by(|a, b| b.offset.cmp(&a.offset));

    let index = CharIndex::new(text);
    let mut result = text.to_string();

    for span in accepted {
        let Some(placeholder) = span.category.placeholder() else {
            continue;
        };
        let Some(range) = index.byte_range(span.offset, span.length) else {
            tracing::warn!(
                offset = span.offset,
                length = span.length,
                "Span outside document bounds, left unredacted"
            );
            continue;
        };
        result.replace_range(range, placeholder);
    }

    result
}

/// Rewrite `text` with a `[{category}]` tag per entity, using the raw
/// detector label.
///
/// Used when categories are heterogeneous and not mapped through the fixed
/// placeholder table. Entities are walked left to right; any entity that
/// starts before the write cursor is skipped.
pub fn redact_tagged(text: &str, entities: &[DetectedEntity]) -> String {
    let index = CharIndex::new(text);
    let valid: Vec<(&DetectedEntity, Range<usize>)> = entities
        .iter()
        .filter(|e| e.length > 0)
        .filter_map(|e| index.byte_range(e.offset, e.length).map(|r| (e, r)))
        .collect();

    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;

    for i in accepted_indices(valid.iter().map(|(e, _)| (e.offset, e.length))) {
        let (entity, range) = &valid[i];
        out.push_str(&text[cursor..range.start]);
        out.push('[');
        out.push_str(&entity.category);
        out.push(']');
        cursor = range.end;
    }

    out.push_str(&text[cursor..]);
    out
}
