//! Domain types for presentations, slide inventories, and composition requests.
//!
//! The presentation snapshot mirrors the read shape of the Slides API so a
//! fetched payload deserializes directly. Every field defaults when absent.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A fully fetched presentation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Presentation {
    /// Remote identifier of the presentation.
    pub presentation_id: String,

    /// Display title.
    pub title: String,

    /// Slides in presentation order.
    pub slides: Vec<Page>,
}

impl Presentation {
    /// Create an empty presentation with the given id and title.
    pub fn new(presentation_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            presentation_id: presentation_id.into(),
            title: title.into(),
            slides: Vec::new(),
        }
    }

    /// Add a slide to the end of the presentation.
    pub fn add_slide(&mut self, slide: Page) {
        self.slides.push(slide);
    }

    /// Number of slides.
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Slide object ids in presentation order.
    pub fn slide_order(&self) -> Vec<String> {
        self.slides.iter().map(|s| s.object_id.clone()).collect()
    }

    /// Object id + index inventory, without marker data.
    pub fn inventory(&self) -> Vec<SlideDescriptor> {
        self.slides
            .iter()
            .enumerate()
            .map(|(index, slide)| {
                let mut descriptor = SlideDescriptor::new(index, slide.object_id.clone());
                descriptor.element_count = slide.page_elements.len();
                descriptor
            })
            .collect()
    }
}

/// A single slide (a "page" in the remote model).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Page {
    pub object_id: String,
    pub page_elements: Vec<PageElement>,
}

impl Page {
    /// Create an empty slide with the given object id.
    pub fn new(object_id: impl Into<String>) -> Self {
        Self {
            object_id: object_id.into(),
            page_elements: Vec::new(),
        }
    }

    /// Add a text shape holding `text` as a single run.
    pub fn with_text_shape(mut self, object_id: impl Into<String>, text: impl Into<String>) -> Self {
        self.page_elements.push(PageElement::text_shape(object_id, text));
        self
    }

    /// Add an arbitrary element.
    pub fn with_element(mut self, element: PageElement) -> Self {
        self.page_elements.push(element);
        self
    }
}

/// An element placed on a slide. At most one of the content kinds is set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageElement {
    pub object_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shape: Option<Shape>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<Table>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element_group: Option<Group>,
}

impl PageElement {
    /// A shape element with one text run.
    pub fn text_shape(object_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            object_id: object_id.into(),
            shape: Some(Shape {
                text: Some(TextContent::from_runs([text])),
            }),
            ..Default::default()
        }
    }

    /// A table element from rows of cell strings.
    pub fn table<R, C>(object_id: impl Into<String>, rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator<Item = String>,
    {
        let table_rows = rows
            .into_iter()
            .map(|cells| TableRow {
                table_cells: cells
                    .into_iter()
                    .map(|text| TableCell {
                        text: Some(TextContent::from_runs([text])),
                    })
                    .collect(),
            })
            .collect();

        Self {
            object_id: object_id.into(),
            table: Some(Table { table_rows }),
            ..Default::default()
        }
    }

    /// A group element wrapping child elements.
    pub fn group(object_id: impl Into<String>, children: Vec<PageElement>) -> Self {
        Self {
            object_id: object_id.into(),
            element_group: Some(Group { children }),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Shape {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<TextContent>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Table {
    pub table_rows: Vec<TableRow>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableRow {
    pub table_cells: Vec<TableCell>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableCell {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<TextContent>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Group {
    pub children: Vec<PageElement>,
}

/// Text held by a shape or a table cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextContent {
    pub text_elements: Vec<TextElement>,
}

impl TextContent {
    /// Build text content from plain runs.
    pub fn from_runs<I, S>(runs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            text_elements: runs
                .into_iter()
                .map(|content| TextElement {
                    text_run: Some(TextRun {
                        content: content.into(),
                    }),
                })
                .collect(),
        }
    }

    /// Iterate over the content of every text run.
    pub fn runs(&self) -> impl Iterator<Item = &str> {
        self.text_elements
            .iter()
            .filter_map(|e| e.text_run.as_ref())
            .map(|r| r.content.as_str())
    }
}

/// One text element. Paragraph markers and auto-text carry no run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextElement {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_run: Option<TextRun>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextRun {
    pub content: String,
}

/// Read-only summary of one slide's position, stable id, and markers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideDescriptor {
    /// Zero-based position in the containing presentation.
    pub index: usize,

    /// Remote-assigned stable identifier.
    pub object_id: String,

    /// `$` identifiers found on the slide. Empty for bare inventories.
    pub identifiers: BTreeSet<String>,

    /// Number of top-level elements on the slide.
    #[serde(default)]
    pub element_count: usize,
}

impl SlideDescriptor {
    /// Create a descriptor with no identifiers and no elements.
    pub fn new(index: usize, object_id: impl Into<String>) -> Self {
        Self {
            index,
            object_id: object_id.into(),
            identifiers: BTreeSet::new(),
            element_count: 0,
        }
    }
}

/// Input of a composition: which source slides to take, in which order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceRequest {
    /// Presentation to read from. Never mutated.
    pub source_presentation_id: String,

    /// Destination folder for the new presentation.
    #[serde(default)]
    pub target_container: Option<String>,

    /// Display name; derived from the source name when absent.
    #[serde(default)]
    pub new_name: Option<String>,

    /// Source slide indices in the desired order. Repeats are allowed.
    pub sequence: Vec<usize>,
}

impl SequenceRequest {
    /// Create a request for `sequence` over `source_presentation_id`.
    pub fn new(source_presentation_id: impl Into<String>, sequence: Vec<usize>) -> Self {
        Self {
            source_presentation_id: source_presentation_id.into(),
            target_container: None,
            new_name: None,
            sequence,
        }
    }

    /// Set the destination folder.
    pub fn with_target_container(mut self, container: impl Into<String>) -> Self {
        self.target_container = Some(container.into());
        self
    }

    /// Set the display name of the new presentation.
    pub fn with_new_name(mut self, name: impl Into<String>) -> Self {
        self.new_name = Some(name.into());
        self
    }
}

/// Identity of a successfully composed presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposedPresentation {
    pub presentation_id: String,
    pub url: String,
}
