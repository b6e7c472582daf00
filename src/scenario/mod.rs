pub mod types;

pub use types::{Section, SectionLabel, TestCaseRecord};

use thiserror::Error;

/// Marker that opens every scenario in a specification file.
pub const SCENARIO_MARKER: &str = "Scenario Outline:";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SegmentError {
    #[error("Scenario \"{scenario}\" has no line containing \"{label}\"")]
    MissingSection {
        scenario: String,
        label: SectionLabel,
    },

    #[error("Scenario outline without a name")]
    EmptyName,
}

/// A specification file split at its scenario markers.
#[derive(Debug, Clone)]
pub struct SpecificationDocument {
    /// Text preceding the first scenario marker (trimmed)
    pub feature_description: String,
    /// Scenario blocks in document order
    pub blocks: Vec<ScenarioBlock>,
}

/// Raw text of one scenario outline, starting right after the marker.
#[derive(Debug, Clone)]
pub struct ScenarioBlock {
    text: String,
}

impl SpecificationDocument {
    /// Split a specification file at every `Scenario Outline:` marker.
    ///
    /// The first chunk becomes the feature description; every following chunk
    /// is a scenario block, in document order. Segmenting the blocks into
    /// sections is deferred to [`ScenarioBlock::to_record`] so a malformed
    /// scenario only fails when it is reached.
    pub fn parse(text: &str) -> SpecificationDocument {
        let mut chunks = text.split(SCENARIO_MARKER);
        let feature_description = chunks.next().unwrap_or_default().trim().to_string();
        let blocks = chunks
            .map(|chunk| ScenarioBlock {
                text: chunk.to_string(),
            })
            .collect();

        SpecificationDocument {
            feature_description,
            blocks,
        }
    }
}

impl ScenarioBlock {
    pub fn lines(&self) -> Vec<&str> {
        self.text.lines().collect()
    }

    /// The scenario name: the first line of the block, trimmed.
    pub fn name(&self) -> &str {
        self.text.lines().next().unwrap_or_default().trim()
    }

    /// Build the structured test case for this block.
    pub fn to_record(&self, feature_description: &str) -> Result<TestCaseRecord, SegmentError> {
        let name = self.name();
        if name.is_empty() {
            return Err(SegmentError::EmptyName);
        }

        let sections = segment_sections(name, &self.lines())?;
        let text_of = |label: SectionLabel| {
            sections
                .iter()
                .find(|s| s.label == label)
                .map(|s| s.text.clone())
                .unwrap_or_default()
        };

        Ok(TestCaseRecord {
            name: name.to_string(),
            feature_description: feature_description.to_string(),
            pre_requisite: text_of(SectionLabel::Given),
            procedure: text_of(SectionLabel::When),
            expected: text_of(SectionLabel::Then),
            dataset: text_of(SectionLabel::Examples),
        })
    }
}

/// Cut a scenario's lines into one section per label, by position.
///
/// For every label the indices of all lines containing its marker are
/// collected. Labels are ordered by comparing those index lists
/// lexicographically, so effectively by first occurrence; equal lists keep
/// canonical order. Each section starts at its label's first matching line and
/// ends right before the next label's first matching line, the last one
/// running to the end of the block.
///
/// A marker that occurs inside an earlier section's free text moves that
/// boundary. Returned sections are in position order.
pub fn segment_sections(scenario: &str, lines: &[&str]) -> Result<Vec<Section>, SegmentError> {
    let mut positions: Vec<(SectionLabel, Vec<usize>)> = Vec::with_capacity(SectionLabel::ALL.len());
    for label in SectionLabel::ALL {
        let indices: Vec<usize> = lines
            .iter()
            .enumerate()
            .filter(|(_, line)| line.contains(label.marker()))
            .map(|(i, _)| i)
            .collect();
        if indices.is_empty() {
            return Err(SegmentError::MissingSection {
                scenario: scenario.to_string(),
                label,
            });
        }
        positions.push((label, indices));
    }

    // Stable: labels with identical index lists stay in canonical order.
    positions.sort_by(|a, b| a.1.cmp(&b.1));

    let starts: Vec<usize> = positions.iter().map(|(_, indices)| indices[0]).collect();
    let sections = positions
        .iter()
        .enumerate()
        .map(|(i, (label, _))| {
            let start = starts[i];
            let end = starts.get(i + 1).copied().unwrap_or(lines.len());
            Section {
                label: *label,
                start,
                end,
                text: lines[start..end].join("\n"),
            }
        })
        .collect();

    Ok(sections)
}
