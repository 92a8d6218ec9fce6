//! Quality records: problems, resolutions and the per-unit state machine.

use serde::{Deserialize, Serialize};

use super::sources::SourceKind;

/// Non-fatal problem categories recorded on content units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProblemKind {
    /// Numbers within a division skip or go backwards.
    NumberingGap,
    /// Body does not end in terminal punctuation or a citation.
    TruncatedText,
    /// Body carries text that belongs to another unit.
    ContentOverflow,
    /// An opened fraction or sub-item group has no items.
    DanglingGroup,
    /// A cross-document citation names an unknown document code.
    UnknownCitation,
    /// Heading is page furniture rather than a real title.
    TitleCorruption,
    /// A missing number occurs in the corpus text.
    PossibleParseError,
    /// Errors remain after every correction attempt.
    UnresolvedQuality,
}

impl ProblemKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NumberingGap => "numbering_gap",
            Self::TruncatedText => "truncated_text",
            Self::ContentOverflow => "content_overflow",
            Self::DanglingGroup => "dangling_group",
            Self::UnknownCitation => "unknown_citation",
            Self::TitleCorruption => "title_corruption",
            Self::PossibleParseError => "possible_parse_error",
            Self::UnresolvedQuality => "unresolved_quality",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
        }
    }
}

/// A problem found on a content unit. Never mutates the unit itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    pub kind: ProblemKind,
    pub description: String,
    pub severity: Severity,
    /// Where in the unit the problem sits ("body", "heading", "paragraph 3").
    pub location: String,
}

impl Problem {
    #[must_use]
    pub fn error(kind: ProblemKind, location: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind,
            description: description.into(),
            severity: Severity::Error,
            location: location.into(),
        }
    }

    #[must_use]
    pub fn warning(kind: ProblemKind, location: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind,
            description: description.into(),
            severity: Severity::Warning,
            location: location.into(),
        }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Immutable record of one correction attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// Index of the problem in the unit's issue list.
    pub problem_ref: usize,
    pub success: bool,
    pub corrected_text: Option<String>,
    pub source_used: SourceKind,
    /// Name of the rule or step that produced this attempt.
    pub method: String,
}

/// Final quality status of a content unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityStatus {
    /// No issue was ever recorded.
    #[default]
    Ok,
    /// Issues were recorded but no error remains.
    Corrected,
    /// At least one error survived the second pass.
    Unresolved,
}

impl QualityStatus {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Corrected => "corrected",
            Self::Unresolved => "unresolved",
        }
    }
}

/// Validation state of a content unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationState {
    #[default]
    Unchecked,
    FirstPassOk,
    FirstPassFlagged,
    SecondPassAttempted,
    Resolved,
    Unresolved,
}

/// A problem together with every attempt to fix it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityIssue {
    pub problem: Problem,
    pub resolutions: Vec<Resolution>,
}

impl QualityIssue {
    /// Whether any attempt fixed the problem.
    #[must_use]
    pub fn resolved(&self) -> bool {
        self.resolutions.iter().any(|r| r.success)
    }

    /// Whether this is an error no attempt fixed.
    #[must_use]
    pub fn is_open_error(&self) -> bool {
        self.problem.is_error() && !self.resolved()
    }
}

/// Audit trail of one content unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityRecord {
    pub status: QualityStatus,
    pub state: ValidationState,
    pub issues: Vec<QualityIssue>,
}

impl QualityRecord {
    /// Record a problem and return its index for resolutions.
    pub fn add_problem(&mut self, problem: Problem) -> usize {
        self.issues.push(QualityIssue {
            problem,
            resolutions: Vec::new(),
        });
        self.issues.len() - 1
    }

    /// Attach a resolution to the problem it references.
    ///
    /// Resolutions pointing at unknown problems are ignored.
    pub fn add_resolution(&mut self, resolution: Resolution) {
        if let Some(issue) = self.issues.get_mut(resolution.problem_ref) {
            issue.resolutions.push(resolution);
        } else {
            tracing::trace!(problem = resolution.problem_ref, "Resolution for unknown problem");
        }
    }

    /// Indices of error problems that no attempt has fixed.
    #[must_use]
    pub fn open_errors(&self) -> Vec<usize> {
        self.issues
            .iter()
            .enumerate()
            .filter(|(_, issue)| issue.is_open_error())
            .map(|(i, _)| i)
            .collect()
    }

    #[must_use]
    pub fn has_problem(&self, kind: ProblemKind) -> bool {
        self.issues.iter().any(|i| i.problem.kind == kind)
    }

    /// Drop every issue of the given kind and return how many were dropped.
    ///
    /// Resolutions of the remaining issues are re-pointed at their new index.
    pub fn remove_issues(&mut self, kind: ProblemKind) -> usize {
        let before = self.issues.len();
        let mut remap = Vec::with_capacity(before);
        let mut kept = 0;
        for issue in &self.issues {
            if issue.problem.kind == kind {
                remap.push(None);
            } else {
                remap.push(Some(kept));
                kept += 1;
            }
        }
        self.issues.retain(|issue| issue.problem.kind != kind);
        for issue in &mut self.issues {
            for resolution in &mut issue.resolutions {
                if let Some(Some(index)) = remap.get(resolution.problem_ref) {
                    resolution.problem_ref = *index;
                }
            }
        }
        before - self.issues.len()
    }

    /// Derive the status from the recorded issues.
    ///
    /// Leaves the record unresolved when any error is still open.
    pub fn finalize(&mut self) {
        self.status = if self.issues.is_empty() {
            QualityStatus::Ok
        } else if self.issues.iter().any(QualityIssue::is_open_error) {
            QualityStatus::Unresolved
        } else {
            QualityStatus::Corrected
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_record_is_ok() {
        let record = QualityRecord::default();
        assert_eq!(record.status, QualityStatus::Ok);
        assert_eq!(record.state, ValidationState::Unchecked);
    }

    #[test]
    fn test_finalize_status() {
        let mut record = QualityRecord::default();
        record.add_problem(Problem::warning(ProblemKind::NumberingGap, "numbering", "gap"));
        record.finalize();
        assert_eq!(record.status, QualityStatus::Corrected);

        let idx = record.add_problem(Problem::error(ProblemKind::TruncatedText, "body", "cut"));
        record.finalize();
        assert_eq!(record.status, QualityStatus::Unresolved);
        assert_eq!(record.open_errors(), vec![idx]);

        record.add_resolution(Resolution {
            problem_ref: idx,
            success: true,
            corrected_text: Some("full.".to_string()),
            source_used: SourceKind::PlainText,
            method: "refetch".to_string(),
        });
        record.finalize();
        assert_eq!(record.status, QualityStatus::Corrected);
        assert!(record.open_errors().is_empty());
    }

    #[test]
    fn test_remove_issues_repoints_resolutions() {
        let mut record = QualityRecord::default();
        record.add_problem(Problem::warning(ProblemKind::NumberingGap, "numbering", "gap"));
        let idx = record.add_problem(Problem::error(ProblemKind::TruncatedText, "body", "cut"));
        record.add_resolution(Resolution {
            problem_ref: idx,
            success: true,
            corrected_text: None,
            source_used: SourceKind::AlternateLayout,
            method: "refetch".to_string(),
        });

        assert_eq!(record.remove_issues(ProblemKind::NumberingGap), 1);
        assert_eq!(record.remove_issues(ProblemKind::NumberingGap), 0);
        assert_eq!(record.issues.len(), 1);
        assert_eq!(record.issues[0].problem.kind, ProblemKind::TruncatedText);
        assert_eq!(record.issues[0].resolutions[0].problem_ref, 0);

        record.finalize();
        assert_eq!(record.status, QualityStatus::Corrected);
        assert!(record.remove_issues(ProblemKind::TruncatedText) == 1);
        record.finalize();
        assert_eq!(record.status, QualityStatus::Ok);
    }

    #[test]
    fn test_serialized_names() {
        assert_eq!(
            serde_json::to_string(&ProblemKind::ContentOverflow).unwrap(),
            "\"content_overflow\""
        );
        assert_eq!(serde_json::to_string(&Severity::Warning).unwrap(), "\"warning\"");
        assert_eq!(
            serde_json::to_string(&QualityStatus::Unresolved).unwrap(),
            "\"unresolved\""
        );
    }
}
