//! Reform annotation extraction.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::doctype::DocumentTypeSpec;
use crate::types::{LayoutLine, ReformAnnotation};

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static DATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?P<day>\d{1,2})[-/](?P<month>\d{1,2})[-/](?P<year>\d{4})\b")
        .expect("valid regex")
});

/// Parse an annotation line, picking up its first date.
#[must_use]
pub fn parse_annotation(text: &str) -> ReformAnnotation {
    let date = DATE_PATTERN.captures(text).and_then(|caps| {
        let day = caps["day"].parse().ok()?;
        let month = caps["month"].parse().ok()?;
        let year = caps["year"].parse().ok()?;
        NaiveDate::from_ymd_opt(year, month, day)
    });
    ReformAnnotation {
        text: text.trim().to_string(),
        date,
    }
}

/// Pop annotation lines off the end of a body, returning them in document order.
pub fn split_trailing_annotations(
    spec: &DocumentTypeSpec,
    body: &mut Vec<LayoutLine>,
) -> Vec<ReformAnnotation> {
    let mut annotations = Vec::new();
    while let Some(last) = body.last() {
        if !spec.is_annotation(&last.text) {
            break;
        }
        annotations.push(parse_annotation(&last.text));
        body.pop();
    }
    annotations.reverse();
    annotations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doctype::law_config;

    #[test]
    fn test_parse_annotation_date() {
        let annotation = parse_annotation("Artículo reformado DOF 12-06-2015");
        assert_eq!(annotation.date, NaiveDate::from_ymd_opt(2015, 6, 12));

        let annotation = parse_annotation("Párrafo adicionado DOF 09/12/2019 ");
        assert_eq!(annotation.text, "Párrafo adicionado DOF 09/12/2019");
        assert_eq!(annotation.date, NaiveDate::from_ymd_opt(2019, 12, 9));
    }

    #[test]
    fn test_parse_annotation_invalid_date() {
        assert!(parse_annotation("Reformado DOF 31-02-2015").date.is_none());
    }

    #[test]
    fn test_split_trailing_annotations_keeps_order() {
        let spec = DocumentTypeSpec::compile(&law_config()).unwrap();
        let mut body = vec![
            LayoutLine::new("El contribuyente pagará.", 85.0, 100.0, 1),
            LayoutLine::new("Párrafo reformado DOF 01-01-2010", 85.0, 112.0, 1),
            LayoutLine::new("Artículo reformado DOF 12-06-2015", 85.0, 124.0, 1),
        ];
        let annotations = split_trailing_annotations(&spec, &mut body);
        assert_eq!(body.len(), 1);
        assert_eq!(annotations.len(), 2);
        assert!(annotations[0].text.starts_with("Párrafo"));
    }
}
