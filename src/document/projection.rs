//! Partitioning the text at field boundaries for rendering.

use std::ops::Range;

use super::{Document, Highlight, HighlightId};

/// A run of text between or under field boundaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Text outside any field
    Plain(Range<usize>),
    /// Text covered by a field
    Field {
        id: HighlightId,
        range: Range<usize>,
        editable: bool,
    },
}

impl Segment {
    /// The char range this segment covers.
    pub fn range(&self) -> Range<usize> {
        match self {
            Self::Plain(range) | Self::Field { range, .. } => range.clone(),
        }
    }

    /// The document text covered by this segment.
    pub fn text(&self, document: &Document) -> String {
        document.slice(self.range())
    }

    /// The field id, for field segments.
    pub const fn field_id(&self) -> Option<HighlightId> {
        match self {
            Self::Plain(_) => None,
            Self::Field { id, .. } => Some(*id),
        }
    }
}

/// Walk the text once, emitting a plain segment for each gap and a field
/// segment for each highlight, then a trailing plain segment.
///
/// `highlights` must be sorted by `start` and non-overlapping.
pub fn partition(len: usize, highlights: &[Highlight]) -> Vec<Segment> {
    debug_assert!(highlights.windows(2).all(|w| w[0].end <= w[1].start));

    let mut segments = Vec::with_capacity(highlights.len() * 2 + 1);
    let mut cursor = 0;
    for h in highlights {
        if h.start > cursor {
            segments.push(Segment::Plain(cursor..h.start));
        }
        segments.push(Segment::Field {
            id: h.id,
            range: h.range(),
            editable: h.editable,
        });
        cursor = h.end;
    }
    if cursor < len {
        segments.push(Segment::Plain(cursor..len));
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_without_fields_is_single_plain_span() {
        let doc = Document::new("just text");
        assert_eq!(doc.segments(), vec![Segment::Plain(0..9)]);
    }

    #[test]
    fn test_partition_empty_text_has_no_segments() {
        assert!(Document::empty().segments().is_empty());
    }

    #[test]
    fn test_partition_alternates_plain_and_field() {
        let mut doc = Document::new("Dear NAME, see you at PLACE.");
        let name = doc.select_range(5, 9).unwrap().id;
        let place = doc.select_range(22, 27).unwrap().id;

        let segments = doc.segments();
        assert_eq!(segments.len(), 5);
        assert_eq!(segments[0], Segment::Plain(0..5));
        assert_eq!(segments[1].field_id(), Some(name));
        assert_eq!(segments[3].field_id(), Some(place));
        assert_eq!(segments[4], Segment::Plain(27..28));

        let rebuilt: String = segments.iter().map(|s| s.text(&doc)).collect();
        assert_eq!(rebuilt, doc.text());
    }

    #[test]
    fn test_partition_adjacent_fields_have_no_gap() {
        let mut doc = Document::new("abcdef");
        doc.select_range(0, 3).unwrap();
        doc.select_range(3, 6).unwrap();
        let segments = doc.segments();
        assert_eq!(segments.len(), 2);
        assert!(segments.iter().all(|s| s.field_id().is_some()));
    }

    #[test]
    fn test_partition_reports_editable_flag() {
        let mut doc = Document::new("Hello world");
        let id = doc.select_range(0, 5).unwrap().id;
        doc.set_editable(id, true).unwrap();
        assert!(matches!(
            doc.segments()[0],
            Segment::Field { editable: true, .. }
        ));
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn segments_cover_text_exactly_once(
                text in "[a-z ]{1,80}",
                picks in proptest::collection::vec((0..80usize, 1..10usize), 0..12),
            ) {
                let mut doc = Document::new(&text);
                for (start, len) in picks {
                    let _ = doc.select_range(start, start + len);
                }
                let segments = doc.segments();
                let mut cursor = 0;
                for segment in &segments {
                    let range = segment.range();
                    prop_assert_eq!(range.start, cursor);
                    prop_assert!(range.start < range.end);
                    cursor = range.end;
                }
                prop_assert_eq!(cursor, doc.len_chars());
            }
        }
    }
}
