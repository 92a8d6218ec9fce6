//! Parent inference by indentation.

use std::collections::BTreeMap;

use super::consolidate::{consolidate, Fragment};
use crate::config::LayoutThresholds;
use crate::error::{Result, StructurerError};
use crate::types::{ContentUnit, LayoutLine, Paragraph, ParagraphKind};

/// Nesting rank used when indentation gives no answer.
fn rank(kind: ParagraphKind) -> u8 {
    match kind {
        ParagraphKind::Text => 0,
        ParagraphKind::Fraction => 1,
        ParagraphKind::SubItem => 2,
        ParagraphKind::NumberedItem => 3,
    }
}

/// Rebuilds the paragraph forest of a content unit from its layout.
pub struct ParagraphResolver<'a> {
    thresholds: &'a LayoutThresholds,
}

impl<'a> ParagraphResolver<'a> {
    #[must_use]
    pub fn new(thresholds: &'a LayoutThresholds) -> Self {
        Self { thresholds }
    }

    /// Resolve paragraphs from positioned lines.
    #[must_use]
    pub fn resolve(&self, lines: &[LayoutLine]) -> Vec<Paragraph> {
        let fragments = consolidate(lines, self.thresholds);
        let mut paragraphs: Vec<Paragraph> = Vec::with_capacity(fragments.len());
        // Most recent paragraph per indentation bucket
        let mut active: BTreeMap<i32, usize> = BTreeMap::new();
        let mut buckets: Vec<i32> = Vec::with_capacity(fragments.len());

        for (order, fragment) in fragments.iter().enumerate() {
            let bucket = self.thresholds.bucket(fragment.x);
            let kind = fragment
                .marker
                .as_ref()
                .map_or(ParagraphKind::Text, |m| m.kind);

            // A shallower fragment closes every deeper group
            active.retain(|b, _| *b <= bucket);

            let parent = match kind {
                ParagraphKind::Fraction => None,
                _ => active
                    .range(..bucket)
                    .next_back()
                    .map(|(_, order)| *order)
                    .or_else(|| same_level_parent(&paragraphs, &buckets, bucket, kind)),
            };

            paragraphs.push(to_paragraph(order, kind, fragment, parent));
            buckets.push(bucket);
            active.insert(bucket, order);
        }
        paragraphs
    }

    /// Resolve a unit's paragraphs from its body lines, or its body text when
    /// no positioned lines are available.
    pub fn resolve_unit(&self, unit: &mut ContentUnit) -> Result<()> {
        let paragraphs = if unit.body_lines.is_empty() {
            let lines: Vec<LayoutLine> = unit
                .body_text
                .lines()
                .filter(|t| !t.trim().is_empty())
                .enumerate()
                .map(|(i, t)| {
                    #[allow(clippy::cast_precision_loss)]
                    let y = i as f32;
                    LayoutLine::new(t, 0.0, y, unit.page)
                })
                .collect();
            self.resolve(&lines)
        } else {
            self.resolve(&unit.body_lines)
        };
        verify_forest(&unit.raw_number, &paragraphs)?;
        tracing::trace!(
            number = %unit.raw_number,
            paragraphs = paragraphs.len(),
            "Paragraphs resolved"
        );
        unit.paragraphs = paragraphs;
        Ok(())
    }
}

/// Nearest earlier marker paragraph at the same bucket with a lower rank.
///
/// Stops at the first paragraph at a shallower bucket.
fn same_level_parent(
    paragraphs: &[Paragraph],
    buckets: &[i32],
    bucket: i32,
    kind: ParagraphKind,
) -> Option<usize> {
    if rank(kind) < rank(ParagraphKind::SubItem) {
        return None;
    }
    for (paragraph, b) in paragraphs.iter().zip(buckets).rev() {
        if *b < bucket {
            return None;
        }
        if *b == bucket
            && paragraph.kind != ParagraphKind::Text
            && rank(paragraph.kind) < rank(kind)
        {
            return Some(paragraph.order);
        }
    }
    None
}

fn to_paragraph(
    order: usize,
    kind: ParagraphKind,
    fragment: &Fragment,
    parent: Option<usize>,
) -> Paragraph {
    Paragraph {
        order,
        kind,
        identifier: fragment.marker.as_ref().map(|m| m.identifier.clone()),
        content: fragment.content(),
        x_position: fragment.x,
        parent_paragraph_ref: parent,
    }
}

/// Check that every parent precedes its child.
///
/// With that property every parent chain is finite and acyclic.
pub fn verify_forest(unit: &str, paragraphs: &[Paragraph]) -> Result<()> {
    for paragraph in paragraphs {
        if let Some(parent) = paragraph.parent_paragraph_ref {
            if parent >= paragraph.order || parent >= paragraphs.len() {
                return Err(StructurerError::CyclicParagraph {
                    unit: unit.to_string(),
                    paragraph: paragraph.order,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numbering::NormalizedNumber;
    use crate::types::{Position, UnitKind};

    fn line(text: &str, x: f32, y: f32) -> LayoutLine {
        LayoutLine::new(text, x, y, 1)
    }

    fn resolve(lines: &[LayoutLine]) -> Vec<Paragraph> {
        let thresholds = LayoutThresholds::default();
        ParagraphResolver::new(&thresholds).resolve(lines)
    }

    #[test]
    fn test_sub_item_attaches_to_shallower_text() {
        let paragraphs = resolve(&[
            line("Los contribuyentes deberán:", 85.0, 100.0),
            line("Además, se observará lo siguiente:", 85.0, 112.0),
            line("a) Presentar la declaración.", 114.0, 124.0),
        ]);
        assert_eq!(paragraphs.len(), 3);
        assert_eq!(paragraphs[2].kind, ParagraphKind::SubItem);
        assert_eq!(paragraphs[2].identifier.as_deref(), Some("a"));
        assert_eq!(paragraphs[2].parent_paragraph_ref, Some(1));
        assert_eq!(paragraphs[1].x_position, 85.0);
    }

    #[test]
    fn test_fractions_have_no_parent() {
        let paragraphs = resolve(&[
            line("Son obligaciones:", 85.0, 100.0),
            line("I. Inscribirse.", 114.0, 112.0),
            line("a) En el registro.", 142.0, 124.0),
            line("II. Declarar.", 114.0, 136.0),
        ]);
        assert_eq!(paragraphs[1].parent_paragraph_ref, None);
        assert_eq!(paragraphs[2].parent_paragraph_ref, Some(1));
        assert_eq!(paragraphs[3].parent_paragraph_ref, None);
        assert_eq!(paragraphs[3].kind, ParagraphKind::Fraction);
    }

    #[test]
    fn test_shallower_fragment_invalidates_deeper_buckets() {
        let paragraphs = resolve(&[
            line("I. Primera.", 85.0, 100.0),
            line("a) Inciso.", 142.0, 112.0),
            line("Texto general.", 85.0, 124.0),
            line("1. Punto.", 114.0, 136.0),
        ]);
        // The numbered item must not see the stale sub-item at a deeper bucket
        assert_eq!(paragraphs[3].parent_paragraph_ref, Some(2));
    }

    #[test]
    fn test_same_bucket_falls_back_to_marker_rank() {
        let paragraphs = resolve(&[
            line("I. Primera fracción:", 85.0, 100.0),
            line("a) Primer inciso:", 85.0, 112.0),
            line("1. Primer número.", 85.0, 124.0),
            line("2. Segundo número.", 85.0, 136.0),
            line("b) Segundo inciso.", 85.0, 148.0),
        ]);
        assert_eq!(paragraphs[1].parent_paragraph_ref, Some(0));
        assert_eq!(paragraphs[2].parent_paragraph_ref, Some(1));
        assert_eq!(paragraphs[3].parent_paragraph_ref, Some(1));
        assert_eq!(paragraphs[4].parent_paragraph_ref, Some(0));
    }

    #[test]
    fn test_resolve_unit_from_plain_text() {
        let thresholds = LayoutThresholds::default();
        let mut unit = ContentUnit::new(
            UnitKind::Article,
            &NormalizedNumber::plain(3),
            false,
            Position::default(),
        );
        unit.body_text = "Son sujetos:\nI. Las personas físicas.\nII. Las morales.".to_string();
        ParagraphResolver::new(&thresholds).resolve_unit(&mut unit).unwrap();
        let kinds: Vec<ParagraphKind> = unit.paragraphs.iter().map(|p| p.kind).collect();
        assert_eq!(
            kinds,
            vec![ParagraphKind::Text, ParagraphKind::Fraction, ParagraphKind::Fraction]
        );
        assert_eq!(unit.paragraphs[1].content, "Las personas físicas.");
    }

    #[test]
    fn test_verify_forest_rejects_forward_reference() {
        let paragraphs = vec![
            Paragraph {
                order: 0,
                kind: ParagraphKind::Text,
                identifier: None,
                content: "a".to_string(),
                x_position: 85.0,
                parent_paragraph_ref: Some(1),
            },
            Paragraph {
                order: 1,
                kind: ParagraphKind::Text,
                identifier: None,
                content: "b".to_string(),
                x_position: 85.0,
                parent_paragraph_ref: None,
            },
        ];
        let err = verify_forest("7", &paragraphs).unwrap_err();
        assert!(matches!(err, StructurerError::CyclicParagraph { paragraph: 0, .. }));
    }
}
