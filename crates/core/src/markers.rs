//! Marker scanning over fetched presentations.
//!
//! Two marker families share one grammar: a sigil immediately followed by
//! one or more word characters. `$identifier` tokens name a slide's role,
//! `#component` tokens name the fields a slide exposes.

use crate::error::{Error, Result};
use crate::types::{Page, PageElement, Presentation, SlideDescriptor, TextContent};
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

/// Regex for `$identifier` markers.
static IDENTIFIER_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$\w+").unwrap());

/// Regex for `#component` markers.
static COMPONENT_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#\w+").unwrap());

/// Which marker family to scan for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerKind {
    /// `$`-prefixed slide-role identifier.
    Identifier,
    /// `#`-prefixed field placeholder.
    Component,
}

impl MarkerKind {
    fn regex(self) -> &'static Regex {
        match self {
            Self::Identifier => &IDENTIFIER_REGEX,
            Self::Component => &COMPONENT_REGEX,
        }
    }

    /// Find every marker of this kind in `text`, adding them to `found`.
    pub fn collect_from(self, text: &str, found: &mut BTreeSet<String>) {
        found.extend(self.regex().find_iter(text).map(|m| m.as_str().to_string()));
    }
}

/// Distinct markers of `kind` found anywhere on `slide`.
pub fn slide_markers(slide: &Page, kind: MarkerKind) -> BTreeSet<String> {
    let mut found = BTreeSet::new();
    for element in &slide.page_elements {
        collect_element(element, kind, &mut found);
    }
    found
}

fn collect_element(element: &PageElement, kind: MarkerKind, found: &mut BTreeSet<String>) {
    if let Some(text) = element.shape.as_ref().and_then(|s| s.text.as_ref()) {
        collect_text(text, kind, found);
    }

    if let Some(table) = &element.table {
        for cell in table.table_rows.iter().flat_map(|row| &row.table_cells) {
            if let Some(text) = &cell.text {
                collect_text(text, kind, found);
            }
        }
    }

    if let Some(group) = &element.element_group {
        for child in &group.children {
            collect_element(child, kind, found);
        }
    }
}

fn collect_text(text: &TextContent, kind: MarkerKind, found: &mut BTreeSet<String>) {
    for run in text.runs() {
        kind.collect_from(run, found);
    }
}

/// Scan every slide for markers of `kind`.
///
/// Slides without matches are absent from the map.
pub fn scan(presentation: &Presentation, kind: MarkerKind) -> BTreeMap<usize, BTreeSet<String>> {
    presentation
        .slides
        .iter()
        .enumerate()
        .filter_map(|(index, slide)| {
            let found = slide_markers(slide, kind);
            (!found.is_empty()).then_some((index, found))
        })
        .collect()
}

/// Slide index → `$identifier` tokens.
pub fn scan_identifiers(presentation: &Presentation) -> BTreeMap<usize, BTreeSet<String>> {
    scan(presentation, MarkerKind::Identifier)
}

/// `#component` tokens on the slide at `index`.
pub fn scan_components(presentation: &Presentation, index: usize) -> Result<BTreeSet<String>> {
    let slide = presentation.slides.get(index).ok_or(Error::OutOfRange {
        index,
        slide_count: presentation.slide_count(),
    })?;
    Ok(slide_markers(slide, MarkerKind::Component))
}

/// List every slide with its identifiers, in presentation order.
pub fn slide_descriptors(presentation: &Presentation) -> Vec<SlideDescriptor> {
    presentation
        .inventory()
        .into_iter()
        .zip(&presentation.slides)
        .map(|(mut descriptor, slide)| {
            descriptor.identifiers = slide_markers(slide, MarkerKind::Identifier);
            descriptor
        })
        .collect()
}

/// Normalize a user-supplied identifier: ensure the `$` sigil, lowercase it.
///
/// Returns `None` for blank input.
pub fn normalize_identifier(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "$" {
        return None;
    }
    let with_sigil = if trimmed.starts_with('$') {
        trimmed.to_string()
    } else {
        format!("${}", trimmed)
    };
    Some(with_sigil.to_lowercase())
}

/// Index of the first slide carrying all of `wanted`, compared case-insensitively.
///
/// Returns `None` when `wanted` holds no usable identifier or no slide matches.
pub fn find_slide_with_identifiers<S: AsRef<str>>(
    presentation: &Presentation,
    wanted: &[S],
) -> Option<usize> {
    let wanted: BTreeSet<String> = wanted
        .iter()
        .filter_map(|w| normalize_identifier(w.as_ref()))
        .collect();
    if wanted.is_empty() {
        return None;
    }

    scan_identifiers(presentation)
        .into_iter()
        .find(|(_, found)| {
            let lowered: BTreeSet<String> = found.iter().map(|f| f.to_lowercase()).collect();
            wanted.is_subset(&lowered)
        })
        .map(|(index, _)| index)
}
