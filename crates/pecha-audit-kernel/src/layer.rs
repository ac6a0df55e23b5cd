//! Known annotation layer types.
//!
//! Every OPF layer file is named after the value of its layer type
//! (`layers/v001/Yigchung.yml`). The enumeration is closed: a file stem or a
//! declared `annotation_type` that is not listed here is "unenumerated" and
//! is audited without a schema.

/// One known annotation layer type.
///
/// The serde representation is the on-disk value (`"BookTitle"`), which is
/// also what layer files declare in their `annotation_type` field.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum LayerType {
    #[serde(rename = "index")]
    Index,
    BookTitle,
    SubTitle,
    BookNumber,
    PotiTitle,
    Author,
    Chapter,
    #[serde(rename = "Text")]
    Topic,
    #[serde(rename = "SubText")]
    SubTopic,
    Pagination,
    Citation,
    Correction,
    ErrorCandidate,
    Peydurma,
    Sabche,
    Tsawa,
    Yigchung,
    Archaic,
    Durchen,
    Footnote,
    Segment,
    #[serde(rename = "OCRConfidence")]
    OcrConfidence,
    Language,
    TranscriptionTimeSpan,
}

impl LayerType {
    /// All known layer types, in registry order.
    pub const ALL: [LayerType; 24] = [
        Self::Index,
        Self::BookTitle,
        Self::SubTitle,
        Self::BookNumber,
        Self::PotiTitle,
        Self::Author,
        Self::Chapter,
        Self::Topic,
        Self::SubTopic,
        Self::Pagination,
        Self::Citation,
        Self::Correction,
        Self::ErrorCandidate,
        Self::Peydurma,
        Self::Sabche,
        Self::Tsawa,
        Self::Yigchung,
        Self::Archaic,
        Self::Durchen,
        Self::Footnote,
        Self::Segment,
        Self::OcrConfidence,
        Self::Language,
        Self::TranscriptionTimeSpan,
    ];

    /// The on-disk value: file stem and declared `annotation_type`.
    pub fn value(self) -> &'static str {
        match self {
            Self::Index => "index",
            Self::BookTitle => "BookTitle",
            Self::SubTitle => "SubTitle",
            Self::BookNumber => "BookNumber",
            Self::PotiTitle => "PotiTitle",
            Self::Author => "Author",
            Self::Chapter => "Chapter",
            Self::Topic => "Text",
            Self::SubTopic => "SubText",
            Self::Pagination => "Pagination",
            Self::Citation => "Citation",
            Self::Correction => "Correction",
            Self::ErrorCandidate => "ErrorCandidate",
            Self::Peydurma => "Peydurma",
            Self::Sabche => "Sabche",
            Self::Tsawa => "Tsawa",
            Self::Yigchung => "Yigchung",
            Self::Archaic => "Archaic",
            Self::Durchen => "Durchen",
            Self::Footnote => "Footnote",
            Self::Segment => "Segment",
            Self::OcrConfidence => "OCRConfidence",
            Self::Language => "Language",
            Self::TranscriptionTimeSpan => "TranscriptionTimeSpan",
        }
    }

    /// The member name used in folder-structure reports (`book_title`).
    pub fn name(self) -> &'static str {
        match self {
            Self::Index => "index",
            Self::BookTitle => "book_title",
            Self::SubTitle => "sub_title",
            Self::BookNumber => "book_number",
            Self::PotiTitle => "poti_title",
            Self::Author => "author",
            Self::Chapter => "chapter",
            Self::Topic => "topic",
            Self::SubTopic => "sub_topic",
            Self::Pagination => "pagination",
            Self::Citation => "citation",
            Self::Correction => "correction",
            Self::ErrorCandidate => "error_candidate",
            Self::Peydurma => "peydurma",
            Self::Sabche => "sabche",
            Self::Tsawa => "tsawa",
            Self::Yigchung => "yigchung",
            Self::Archaic => "archaic",
            Self::Durchen => "durchen",
            Self::Footnote => "footnote",
            Self::Segment => "segment",
            Self::OcrConfidence => "ocr_confidence",
            Self::Language => "language",
            Self::TranscriptionTimeSpan => "transcription_time_span",
        }
    }

    /// Look up a layer type by its on-disk value. Case-sensitive.
    pub fn from_value(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|layer| layer.value() == value)
    }
}

impl std::fmt::Display for LayerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.value())
    }
}

impl std::str::FromStr for LayerType {
    type Err = String;

    /// Accepts either the on-disk value (`BookTitle`) or the member name
    /// (`book_title`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_value(s)
            .or_else(|| Self::ALL.into_iter().find(|layer| layer.name() == s))
            .ok_or_else(|| format!("unknown layer type: {s}"))
    }
}

/// Enumeration membership test on the on-disk value.
pub fn is_known_layer_type(name: &str) -> bool {
    LayerType::from_value(name).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn membership_is_case_sensitive() {
        assert!(is_known_layer_type("Pagination"));
        assert!(!is_known_layer_type("pagination"));
        assert!(!is_known_layer_type("Quotation"));
    }

    #[test]
    fn values_and_names_are_unique() {
        let values: std::collections::BTreeSet<_> =
            LayerType::ALL.iter().map(|l| l.value()).collect();
        let names: std::collections::BTreeSet<_> =
            LayerType::ALL.iter().map(|l| l.name()).collect();
        assert_eq!(values.len(), LayerType::ALL.len());
        assert_eq!(names.len(), LayerType::ALL.len());
    }

    #[test]
    fn parse_accepts_value_or_name() {
        assert_eq!("BookTitle".parse::<LayerType>().unwrap(), LayerType::BookTitle);
        assert_eq!("book_title".parse::<LayerType>().unwrap(), LayerType::BookTitle);
        assert_eq!("Text".parse::<LayerType>().unwrap(), LayerType::Topic);
        assert!("Quotation".parse::<LayerType>().is_err());
    }

    #[test]
    fn serde_uses_on_disk_value() {
        let rendered = serde_json::to_string(&LayerType::OcrConfidence).unwrap();
        assert_eq!(rendered, "\"OCRConfidence\"");
        let parsed: LayerType = serde_json::from_str("\"index\"").unwrap();
        assert_eq!(parsed, LayerType::Index);
    }
}
