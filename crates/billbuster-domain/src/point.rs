//! Point module - the unit of output of the pipeline

use crate::Confidence;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a legislative point
///
/// The first eight variants are the categories the extraction service is
/// asked to choose from. [`PointType::Error`] is never requested; it marks
/// the synthetic point produced when a reply cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointType {
    /// Funding allocations or appropriations
    Funding,
    /// Changes to existing laws or regulations
    Change,
    /// New classifications, definitions, or legal categories
    Classification,
    /// Requirements imposed on people, businesses, or agencies
    Requirement,
    /// Permissions granted or restrictions imposed
    Permission,
    /// Deadlines, timelines, or effective dates
    Timeline,
    /// Penalties or enforcement mechanisms
    Penalty,
    /// Anything else worth recording
    Other,
    /// Synthetic marker for an unparseable extraction reply
    Error,
}

impl PointType {
    /// Every category the service may return, in prompt order
    pub const EXTRACTABLE: [PointType; 8] = [
        PointType::Funding,
        PointType::Change,
        PointType::Classification,
        PointType::Requirement,
        PointType::Permission,
        PointType::Timeline,
        PointType::Penalty,
        PointType::Other,
    ];

    /// Get the type name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            PointType::Funding => "funding",
            PointType::Change => "change",
            PointType::Classification => "classification",
            PointType::Requirement => "requirement",
            PointType::Permission => "permission",
            PointType::Timeline => "timeline",
            PointType::Penalty => "penalty",
            PointType::Other => "other",
            PointType::Error => "error",
        }
    }

    /// Parse a type name, ignoring case and surrounding whitespace
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "funding" => Some(PointType::Funding),
            "change" => Some(PointType::Change),
            "classification" => Some(PointType::Classification),
            "requirement" => Some(PointType::Requirement),
            "permission" => Some(PointType::Permission),
            "timeline" => Some(PointType::Timeline),
            "penalty" => Some(PointType::Penalty),
            "other" => Some(PointType::Other),
            "error" => Some(PointType::Error),
            _ => None,
        }
    }

    /// Whether this is the synthetic parse-failure marker
    pub fn is_error(&self) -> bool {
        matches!(self, PointType::Error)
    }
}

impl fmt::Display for PointType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PointType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid point type: {}", s))
    }
}

/// A single extracted, attributed legislative provision
///
/// Field names serialize in snake_case, matching the shape the extraction
/// service is asked to produce, so exported points can be read back with
/// the same schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Category of the provision
    pub point_type: PointType,

    /// Clear, concise description of the provision
    pub description: String,

    /// Entities affected by the provision, in the order the service listed them
    #[serde(default)]
    pub entities: Vec<String>,

    /// Section number or other reference (empty when unknown)
    #[serde(default)]
    pub reference: String,

    /// Direct quote supporting the point (empty when unknown)
    #[serde(default)]
    pub citation: String,

    /// Page where the point appears, when the source carries page markers
    #[serde(default)]
    pub page_number: Option<u32>,

    /// The service's confidence in the extraction
    pub confidence: Confidence,

    /// Path of the source document
    #[serde(default)]
    pub document_path: String,

    /// Index of the chunk the point was extracted from
    #[serde(default)]
    pub chunk_index: usize,

    /// File name of the source document
    #[serde(default)]
    pub document_name: String,
}

impl Point {
    /// Create a point with the given type, description and confidence
    ///
    /// All optional attribution is empty; document metadata is attached
    /// later with [`Point::with_document`].
    ///
    /// # Examples
    ///
    /// ```
    /// use billbuster_domain::{Confidence, Point, PointType};
    ///
    /// let point = Point::new(PointType::Funding, "Appropriates $2M for roads", Confidence::High);
    /// assert!(point.entities.is_empty());
    /// assert_eq!(point.page_number, None);
    /// ```
    pub fn new(point_type: PointType, description: impl Into<String>, confidence: Confidence) -> Self {
        Self {
            point_type,
            description: description.into(),
            entities: Vec::new(),
            reference: String::new(),
            citation: String::new(),
            page_number: None,
            confidence,
            document_path: String::new(),
            chunk_index: 0,
            document_name: String::new(),
        }
    }

    /// Create the synthetic point emitted for an unparseable reply
    pub fn error(description: impl Into<String>) -> Self {
        Self::new(PointType::Error, description, Confidence::Low)
    }

    /// Set the affected entities
    pub fn with_entities<I, S>(mut self, entities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entities = entities.into_iter().map(Into::into).collect();
        self
    }

    /// Set the section reference
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = reference.into();
        self
    }

    /// Set the supporting citation
    pub fn with_citation(mut self, citation: impl Into<String>) -> Self {
        self.citation = citation.into();
        self
    }

    /// Set the page number
    pub fn with_page_number(mut self, page_number: Option<u32>) -> Self {
        self.page_number = page_number;
        self
    }

    /// Set the chunk the point came from
    pub fn with_chunk_index(mut self, chunk_index: usize) -> Self {
        self.chunk_index = chunk_index;
        self
    }

    /// Attach source document metadata
    pub fn with_document(mut self, path: impl Into<String>, name: impl Into<String>) -> Self {
        self.document_path = path.into();
        self.document_name = name.into();
        self
    }

    /// Whether this is the synthetic parse-failure point
    pub fn is_error(&self) -> bool {
        self.point_type.is_error()
    }
}
