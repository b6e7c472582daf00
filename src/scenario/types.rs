use std::fmt;

/// Marker words that open each section of a scenario outline.
///
/// The set is fixed. `ALL` lists them in canonical order, which is only used
/// as a tie breaker: sections are cut wherever the markers actually occur.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SectionLabel {
    Given,
    When,
    Then,
    Examples,
}

impl SectionLabel {
    pub const ALL: [SectionLabel; 4] = [
        SectionLabel::Given,
        SectionLabel::When,
        SectionLabel::Then,
        SectionLabel::Examples,
    ];

    /// Literal substring searched for in each scenario line.
    pub fn marker(self) -> &'static str {
        match self {
            SectionLabel::Given => "Given",
            SectionLabel::When => "When",
            SectionLabel::Then => "Then",
            SectionLabel::Examples => "Examples",
        }
    }
}

impl fmt::Display for SectionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.marker())
    }
}

/// One section cut out of a scenario block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub label: SectionLabel,
    /// First line of the section (index into the scenario's lines)
    pub start: usize,
    /// One past the last line of the section
    pub end: usize,
    /// Newline-joined content of `start..end`
    pub text: String,
}

/// Structured form of a single scenario outline, ready to be mapped onto
/// tracker fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCaseRecord {
    /// Scenario name, the natural key used to match existing test cases
    pub name: String,
    /// Text preceding the first scenario of the document
    pub feature_description: String,
    /// `Given` section
    pub pre_requisite: String,
    /// `When` section
    pub procedure: String,
    /// `Then` section
    pub expected: String,
    /// `Examples` section
    pub dataset: String,
}
