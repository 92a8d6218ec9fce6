//! Single-pass division tree builder.

use std::collections::{BTreeMap, BTreeSet};

use super::context::TraversalContext;
use super::tree::DivisionTree;
use crate::doctype::{DivisionMatch, DocumentTypeSpec};
use crate::numbering::ordinal_value;
use crate::types::{Division, DivisionKind, LayoutLine, Position};

/// Display name of the implicit root created for divisions declared before any root.
pub const PRELIMINARY_DISPLAY_NAME: &str = "Preliminary title";

/// Display name of the synthetic chapter given to titles without chapters.
pub const SOLE_CHAPTER_DISPLAY_NAME: &str = "Sole chapter";

/// Result of scanning a line stream for divisions.
#[derive(Debug, Clone, Default)]
pub struct DivisionScan {
    pub tree: DivisionTree,

    /// Indices of lines consumed as division headers or names.
    pub consumed: BTreeSet<usize>,
}

/// Builds the division tree from prepared layout lines.
pub struct DivisionTreeBuilder<'a> {
    spec: &'a DocumentTypeSpec,
}

impl<'a> DivisionTreeBuilder<'a> {
    #[must_use]
    pub fn new(spec: &'a DocumentTypeSpec) -> Self {
        Self { spec }
    }

    /// Scan lines in order and build the tree.
    ///
    /// Never fails: lines that do not match a division pattern are skipped.
    #[must_use]
    pub fn build(&self, lines: &[LayoutLine]) -> DivisionScan {
        let mut context = TraversalContext::new();
        let mut divisions: Vec<Division> = Vec::new();
        let mut consumed = BTreeSet::new();

        let mut index = 0;
        while index < lines.len() {
            let line = &lines[index];
            let Some(header) = self.spec.match_division(&line.text) else {
                index += 1;
                continue;
            };
            consumed.insert(index);
            let position = Position::new(line.page, index);

            let mut name = header.name.clone();
            if name.is_none() {
                if let Some(next) = lines.get(index + 1) {
                    if self.is_name_candidate(&next.text) {
                        name = Some(next.text.clone());
                        consumed.insert(index + 1);
                        index += 1;
                    }
                }
            }

            let parent_ref = self.resolve_parent(header.kind, position, &mut context, &mut divisions);
            let order = divisions.len();
            tracing::debug!(
                kind = header.kind.as_str(),
                number = %header.number,
                name = ?name,
                parent = ?parent_ref,
                page = line.page,
                "Division declared"
            );
            divisions.push(new_division(header, name, order, parent_ref, position));
            context.enter(divisions[order].kind, order);
            index += 1;
        }

        if divisions.is_empty() && !lines.is_empty() {
            if let Some(root) = self.spec.root_kind() {
                tracing::debug!("No division headers found, creating implicit root");
                divisions.push(synthetic_division(
                    root,
                    PRELIMINARY_DISPLAY_NAME,
                    0,
                    None,
                    Position::new(lines[0].page, 0),
                ));
            }
        }

        self.add_sole_chapters(&mut divisions);
        let tree = DivisionTree::new(renumber(divisions));

        tracing::info!(
            divisions = tree.len(),
            synthetic = tree.divisions().iter().filter(|d| d.synthetic).count(),
            "Division tree built"
        );
        DivisionScan { tree, consumed }
    }

    /// Find the parent for a new division, creating an implicit root if needed.
    fn resolve_parent(
        &self,
        kind: DivisionKind,
        position: Position,
        context: &mut TraversalContext,
        divisions: &mut Vec<Division>,
    ) -> Option<usize> {
        let parent_kind = self.spec.parent_kind(kind)?;
        if let Some(parent) = context.last(parent_kind) {
            return Some(parent);
        }
        if let Some(ancestor) = context.nearest_above(kind) {
            return Some(ancestor);
        }

        let root = self.spec.root_kind()?;
        let order = divisions.len();
        tracing::debug!(
            kind = kind.as_str(),
            page = position.page,
            "Division declared before any {}, creating implicit one",
            root.as_str()
        );
        divisions.push(synthetic_division(
            root,
            PRELIMINARY_DISPLAY_NAME,
            order,
            None,
            position,
        ));
        context.enter(root, order);
        Some(order)
    }

    /// Whether a line following a header can serve as the division's name.
    fn is_name_candidate(&self, text: &str) -> bool {
        let text = text.trim();
        text.chars().count() >= self.spec.min_name_length
            && !self.spec.is_structural(text)
            && !self.spec.is_noise(text)
            && !self.spec.is_annotation(text)
            && !self.spec.is_transitional_heading(text)
    }

    /// Give every title without chapters a synthetic sole chapter.
    ///
    /// Sections declared directly under such a title move under the new chapter.
    fn add_sole_chapters(&self, divisions: &mut Vec<Division>) {
        if !self.spec.permits(DivisionKind::Title) || !self.spec.permits(DivisionKind::Chapter) {
            return;
        }

        let chapterless: Vec<usize> = divisions
            .iter()
            .filter(|d| d.kind == DivisionKind::Title)
            .filter(|title| {
                !divisions.iter().any(|d| {
                    d.kind == DivisionKind::Chapter && d.parent_ref == Some(title.declared_order)
                })
            })
            .map(|d| d.declared_order)
            .collect();

        for title in chapterless {
            let order = divisions.len();
            let position = divisions[title].position;
            for child in divisions.iter_mut() {
                if child.parent_ref == Some(title) && child.kind.depth() > DivisionKind::Chapter.depth() {
                    child.parent_ref = Some(order);
                }
            }
            tracing::debug!(title, "Adding sole chapter");
            divisions.push(synthetic_division(
                DivisionKind::Chapter,
                SOLE_CHAPTER_DISPLAY_NAME,
                order,
                Some(title),
                position,
            ));
        }
    }
}

fn new_division(
    header: DivisionMatch,
    name: Option<String>,
    order: usize,
    parent_ref: Option<usize>,
    position: Position,
) -> Division {
    Division {
        kind: header.kind,
        ordinal_value: ordinal_value(&header.number),
        number: header.number,
        display_name: header.display_name,
        name,
        declared_order: order,
        parent_ref,
        position,
        synthetic: false,
    }
}

fn synthetic_division(
    kind: DivisionKind,
    display_name: &str,
    order: usize,
    parent_ref: Option<usize>,
    position: Position,
) -> Division {
    Division {
        kind,
        number: "0".to_string(),
        ordinal_value: 0,
        display_name: display_name.to_string(),
        name: None,
        declared_order: order,
        parent_ref,
        position,
        synthetic: true,
    }
}

/// Sort divisions by (position, depth) and rewrite orders and parent refs.
fn renumber(divisions: Vec<Division>) -> Vec<Division> {
    let mut sorted = divisions;
    sorted.sort_by(|a, b| {
        a.position
            .cmp(&b.position)
            .then(a.kind.depth().cmp(&b.kind.depth()))
            .then(a.declared_order.cmp(&b.declared_order))
    });

    let remap: BTreeMap<usize, usize> = sorted
        .iter()
        .enumerate()
        .map(|(new, d)| (d.declared_order, new))
        .collect();

    for division in &mut sorted {
        division.declared_order = remap[&division.declared_order];
        division.parent_ref = division.parent_ref.and_then(|p| remap.get(&p).copied());
    }
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doctype::law_config;

    fn spec() -> DocumentTypeSpec {
        DocumentTypeSpec::compile(&law_config()).unwrap()
    }

    fn lines(texts: &[&str]) -> Vec<LayoutLine> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| LayoutLine::new(*t, 85.0, 100.0 + 14.0 * i as f32, 1))
            .collect()
    }

    #[test]
    fn test_builds_nested_tree_with_names() {
        let spec = spec();
        let scan = DivisionTreeBuilder::new(&spec).build(&lines(&[
            "TÍTULO PRIMERO",
            "DISPOSICIONES GENERALES",
            "CAPÍTULO I",
            "Del objeto",
            "Artículo 1o.- Esta Ley es de orden público.",
            "SECCIÓN PRIMERA De los sujetos",
            "Artículo 2o.- Son sujetos.",
        ]));
        let tree = scan.tree;
        assert_eq!(tree.len(), 3);

        let title = tree.get(0).unwrap();
        assert_eq!(title.kind, DivisionKind::Title);
        assert_eq!(title.name.as_deref(), Some("DISPOSICIONES GENERALES"));
        assert_eq!(title.ordinal_value, 1);

        let chapter = tree.get(1).unwrap();
        assert_eq!(chapter.parent_ref, Some(0));
        assert_eq!(chapter.name.as_deref(), Some("Del objeto"));

        let section = tree.get(2).unwrap();
        assert_eq!(section.parent_ref, Some(1));
        assert_eq!(section.name.as_deref(), Some("De los sujetos"));

        assert_eq!(scan.consumed, BTreeSet::from([0, 1, 2, 3, 5]));
    }

    #[test]
    fn test_name_lookahead_rejects_unit_headers_and_short_lines() {
        let spec = spec();
        let scan = DivisionTreeBuilder::new(&spec).build(&lines(&[
            "TÍTULO I",
            "CAPÍTULO I",
            "Art",
            "Artículo 1.- Texto.",
        ]));
        assert!(scan.tree.get(0).unwrap().name.is_none());
        assert!(scan.tree.get(1).unwrap().name.is_none());
        assert!(!scan.consumed.contains(&2));
    }

    #[test]
    fn test_new_shallower_division_clears_deeper_slots() {
        let spec = spec();
        let scan = DivisionTreeBuilder::new(&spec).build(&lines(&[
            "TÍTULO I",
            "CAPÍTULO I",
            "SECCIÓN I",
            "TÍTULO II",
            "SECCIÓN II",
        ]));
        let tree = scan.tree;
        // The second section must not attach to the first title's chapter
        let section = tree
            .divisions()
            .iter()
            .filter(|d| d.kind == DivisionKind::Section)
            .nth(1)
            .unwrap();
        let parent = tree.get(section.parent_ref.unwrap()).unwrap();
        assert_eq!(parent.kind, DivisionKind::Chapter);
        assert!(parent.synthetic);
        assert_eq!(tree.parent(parent.declared_order).unwrap().number, "II");
    }

    #[test]
    fn test_chapter_before_title_creates_preliminary_title() {
        let spec = spec();
        let scan = DivisionTreeBuilder::new(&spec).build(&lines(&[
            "CAPÍTULO I",
            "Artículo 1.- Texto.",
            "TÍTULO I",
            "CAPÍTULO II",
        ]));
        let tree = scan.tree;
        let root = tree.get(0).unwrap();
        assert_eq!(root.kind, DivisionKind::Title);
        assert!(root.synthetic);
        assert_eq!(root.display_name, PRELIMINARY_DISPLAY_NAME);
        assert_eq!(tree.get(1).unwrap().parent_ref, Some(0));
        assert_eq!(tree.get(1).unwrap().number, "I");
    }

    #[test]
    fn test_title_without_chapters_gets_sole_chapter() {
        let spec = spec();
        let scan = DivisionTreeBuilder::new(&spec).build(&lines(&[
            "TÍTULO I",
            "Artículo 1.- Texto.",
            "TÍTULO II",
            "CAPÍTULO I",
        ]));
        let tree = scan.tree;
        let kinds: Vec<(DivisionKind, bool)> =
            tree.divisions().iter().map(|d| (d.kind, d.synthetic)).collect();
        assert_eq!(
            kinds,
            vec![
                (DivisionKind::Title, false),
                (DivisionKind::Chapter, true),
                (DivisionKind::Title, false),
                (DivisionKind::Chapter, false),
            ]
        );
        assert_eq!(tree.get(1).unwrap().parent_ref, Some(0));
        assert_eq!(tree.get(3).unwrap().parent_ref, Some(2));
    }

    #[test]
    fn test_document_without_divisions_gets_implicit_root() {
        let spec = spec();
        let scan = DivisionTreeBuilder::new(&spec).build(&lines(&["Artículo 1.- Texto."]));
        assert_eq!(scan.tree.len(), 2);
        assert!(scan.tree.divisions().iter().all(|d| d.synthetic));
        assert!(scan.consumed.is_empty());
    }

    #[test]
    fn test_empty_input_builds_empty_tree() {
        let spec = spec();
        let scan = DivisionTreeBuilder::new(&spec).build(&[]);
        assert!(scan.tree.is_empty());
    }

    #[test]
    fn test_parents_precede_children() {
        let spec = spec();
        let scan = DivisionTreeBuilder::new(&spec).build(&lines(&[
            "SECCIÓN I",
            "TÍTULO I",
            "SECCIÓN II",
            "CAPÍTULO I",
            "SECCIÓN III",
        ]));
        for division in scan.tree.divisions() {
            if let Some(parent) = division.parent_ref {
                assert!(parent < division.declared_order);
            }
        }
    }
}
