//! Core entity types for a3s-redact
//!
//! Categories serialize with the wire names used by the language service
//! (`MedicationName`, `USSocialSecurityNumber`, ...). Offsets and lengths
//! are counted in characters (Unicode scalar values), never bytes.

use serde::{Deserialize, Serialize};

/// Closed set of entity labels the pipeline understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityCategory {
    // Clinical terms, always preserved
    MedicationName,
    Dosage,
    Diagnosis,
    SymptomOrSign,
    TreatmentName,
    ExaminationName,
    BodyStructure,
    MedicationClass,
    Frequency,
    MedicationRoute,
    ConditionQualifier,

    // Identifying medical mentions
    Person,
    DateTime,

    // Contact PII
    Email,
    PhoneNumber,
    #[serde(rename = "USSocialSecurityNumber")]
    UsSocialSecurityNumber,
    #[serde(rename = "IPAddress")]
    IpAddress,
    #[serde(rename = "URL")]
    Url,
}

/// Which of the three disjoint report groups a category belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryGroup {
    Preserved,
    Medical,
    ContactPii,
}

impl EntityCategory {
    /// Every known category, in declaration order
    pub const ALL: [EntityCategory; 18] = [
        Self::MedicationName,
        Self::Dosage,
        Self::Diagnosis,
        Self::SymptomOrSign,
        Self::TreatmentName,
        Self::ExaminationName,
        Self::BodyStructure,
        Self::MedicationClass,
        Self::Frequency,
        Self::MedicationRoute,
        Self::ConditionQualifier,
        Self::Person,
        Self::DateTime,
        Self::Email,
        Self::PhoneNumber,
        Self::UsSocialSecurityNumber,
        Self::IpAddress,
        Self::Url,
    ];

    /// Parse a detector label. Unknown labels yield `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.label() == label)
    }

    /// Wire name of this category
    pub fn label(&self) -> &'static str {
        match self {
            Self::MedicationName => "MedicationName",
            Self::Dosage => "Dosage",
            Self::Diagnosis => "Diagnosis",
            Self::SymptomOrSign => "SymptomOrSign",
            Self::TreatmentName => "TreatmentName",
            Self::ExaminationName => "ExaminationName",
            Self::BodyStructure => "BodyStructure",
            Self::MedicationClass => "MedicationClass",
            Self::Frequency => "Frequency",
            Self::MedicationRoute => "MedicationRoute",
            Self::ConditionQualifier => "ConditionQualifier",
            Self::Person => "Person",
            Self::DateTime => "DateTime",
            Self::Email => "Email",
            Self::PhoneNumber => "PhoneNumber",
            Self::UsSocialSecurityNumber => "USSocialSecurityNumber",
            Self::IpAddress => "IPAddress",
            Self::Url => "URL",
        }
    }

    pub fn group(&self) -> CategoryGroup {
        match self {
            Self::MedicationName
            | Self::Dosage
            | Self::Diagnosis
            | Self::SymptomOrSign
            | Self::TreatmentName
            | Self::ExaminationName
            | Self::BodyStructure
            | Self::MedicationClass
            | Self::Frequency
            | Self::MedicationRoute
            | Self::ConditionQualifier => CategoryGroup::Preserved,
            Self::Person | Self::DateTime => CategoryGroup::Medical,
            Self::Email
            | Self::PhoneNumber
            | Self::UsSocialSecurityNumber
            | Self::IpAddress
            | Self::Url => CategoryGroup::ContactPii,
        }
    }

    /// Placeholder substituted for a redacted span of this category.
    ///
    /// Preserved categories have no placeholder and are never rewritten.
    pub fn placeholder(&self) -> Option<&'static str> {
        match self {
            Self::Person => Some("[PERSON]"),
            Self::DateTime => Some("[DATE]"),
            Self::Email => Some("[EMAIL]"),
            Self::PhoneNumber => Some("[PHONE]"),
            Self::UsSocialSecurityNumber => Some("[SSN]"),
            Self::IpAddress => Some("[IP]"),
            Self::Url => Some("[URL]"),
            _ => None,
        }
    }
}

impl std::fmt::Display for EntityCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A classified span of the original text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    /// The matched substring
    pub text: String,

    pub category: EntityCategory,

    /// Detector confidence in `[0.0, 1.0]`
    pub confidence: f64,

    /// Character offset into the original text
    pub offset: usize,

    /// Number of characters covered
    pub length: usize,
}

impl Span {
    /// Build a span from raw detector output with an already-parsed category
    pub fn from_entity(entity: &DetectedEntity, category: EntityCategory) -> Self {
        Self {
            text: entity.text.clone(),
            category,
            confidence: entity.confidence,
            offset: entity.offset,
            length: entity.length,
        }
    }

    /// Exclusive end offset
    pub fn end(&self) -> usize {
        self.offset + self.length
    }

    /// Whether the half-open ranges `[offset, end)` intersect
    pub fn overlaps(&self, other: &Span) -> bool {
        self.offset < other.end() && other.offset < self.end()
    }
}

/// Raw entity as returned by a detector, before classification
///
/// The category is free-form: detectors may return labels this crate does
/// not know about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedEntity {
    pub text: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    pub confidence: f64,
    pub offset: usize,
    pub length: usize,
}

impl DetectedEntity {
    pub fn new(
        text: impl Into<String>,
        category: impl Into<String>,
        confidence: f64,
        offset: usize,
        length: usize,
    ) -> Self {
        Self {
            text: text.into(),
            category: category.into(),
            subcategory: None,
            confidence,
            offset,
            length,
        }
    }

    /// Non-empty and within a text of `char_len` characters
    pub fn fits(&self, char_len: usize) -> bool {
        self.length > 0
            && self
                .offset
                .checked_add(self.length)
                .is_some_and(|end| end <= char_len)
    }
}

/// The three independent detection passes run per document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionPass {
    /// Healthcare entity recognition (preserved clinical terms)
    Healthcare,
    /// General named-entity recognition (persons, dates)
    General,
    /// Contact PII recognition
    Pii,
}

impl std::fmt::Display for DetectionPass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Healthcare => write!(f, "healthcare"),
            Self::General => write!(f, "general"),
            Self::Pii => write!(f, "pii"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_roundtrip_for_every_category() {
        for category in EntityCategory::ALL {
            assert_eq!(EntityCategory::from_label(category.label()), Some(category));
        }
    }

    #[test]
    fn test_unknown_label() {
        assert_eq!(EntityCategory::from_label("Organization"), None);
        assert_eq!(EntityCategory::from_label("person"), None);
    }

    #[test]
    fn test_serde_uses_wire_names() {
        let json = serde_json::to_string(&EntityCategory::UsSocialSecurityNumber).unwrap();
        assert_eq!(json, "\"USSocialSecurityNumber\"");
        let parsed: EntityCategory = serde_json::from_str("\"IPAddress\"").unwrap();
        assert_eq!(parsed, EntityCategory::IpAddress);
        let url: EntityCategory = serde_json::from_str("\"URL\"").unwrap();
        assert_eq!(url, EntityCategory::Url);
    }

    #[test]
    fn test_groups_are_disjoint() {
        let preserved = EntityCategory::ALL
            .iter()
            .filter(|c| c.group() == CategoryGroup::Preserved)
            .count();
        let medical = EntityCategory::ALL
            .iter()
            .filter(|c| c.group() == CategoryGroup::Medical)
            .count();
        let contact = EntityCategory::ALL
            .iter()
            .filter(|c| c.group() == CategoryGroup::ContactPii)
            .count();
        assert_eq!((preserved, medical, contact), (11, 2, 5));
    }

    #[test]
    fn test_only_redaction_candidates_have_placeholders() {
        for category in EntityCategory::ALL {
            let has_placeholder = category.placeholder().is_some();
            assert_eq!(has_placeholder, category.group() != CategoryGroup::Preserved);
        }
        assert_eq!(EntityCategory::DateTime.placeholder(), Some("[DATE]"));
        assert_eq!(
            EntityCategory::UsSocialSecurityNumber.placeholder(),
            Some("[SSN]")
        );
    }

    #[test]
    fn test_span_overlap() {
        let a = Span {
            text: "John Smith".into(),
            category: EntityCategory::Person,
            confidence: 0.9,
            offset: 0,
            length: 10,
        };
        let mut b = a.clone();
        b.offset = 9;
        assert!(a.overlaps(&b));
        b.offset = 10;
        assert!(!a.overlaps(&b));
        assert_eq!(a.end(), 10);
    }

    #[test]
    fn test_entity_fits() {
        let e = DetectedEntity::new("abc", "Person", 0.9, 2, 3);
        assert!(e.fits(5));
        assert!(!e.fits(4));
        assert!(!DetectedEntity::new("", "Person", 0.9, 0, 0).fits(10));
        assert!(!DetectedEntity::new("x", "Person", 0.9, usize::MAX, 1).fits(10));
    }

    #[test]
    fn test_detected_entity_skips_empty_subcategory() {
        let json = serde_json::to_value(DetectedEntity::new("a", "Email", 0.8, 0, 1)).unwrap();
        assert!(json.get("subcategory").is_none());
        assert_eq!(json["category"], "Email");
    }
}
