//! In-memory presentation backend.
//!
//! Behaves like the remote service where the engine can observe it: copies
//! keep slide object ids, duplicated slides land right after their source,
//! and mutation batches are applied atomically.

use crate::adapter::{AdapterError, SlideMutation, SlidesAdapter};
use crate::types::{Page, PageElement, Presentation};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Default)]
struct State {
    presentations: BTreeMap<String, Presentation>,
    next_id: usize,
    fail_duplicate: Option<AdapterError>,
    fail_mutations: Option<AdapterError>,
}

/// Presentation store held in process memory.
#[derive(Debug, Default)]
pub struct MemorySlides {
    state: Mutex<State>,
    calls: AtomicUsize,
}

impl MemorySlides {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a presentation, keyed by its id.
    pub fn insert(&self, presentation: Presentation) {
        self.state
            .lock()
            .presentations
            .insert(presentation.presentation_id.clone(), presentation);
    }

    /// Snapshot of a stored presentation.
    pub fn get(&self, presentation_id: &str) -> Option<Presentation> {
        self.state.lock().presentations.get(presentation_id).cloned()
    }

    /// Number of stored presentations.
    pub fn presentation_count(&self) -> usize {
        self.state.lock().presentations.len()
    }

    /// Number of adapter calls served so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Make every later `duplicate_presentation` call fail with `error`.
    pub fn fail_duplicate_presentation(&self, error: AdapterError) {
        self.state.lock().fail_duplicate = Some(error);
    }

    /// Make every later `apply_slide_mutations` call fail with `error`.
    pub fn fail_mutations(&self, error: AdapterError) {
        self.state.lock().fail_mutations = Some(error);
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

/// Apply one mutation to a working copy of the slide list.
fn apply_mutation(slides: &mut Vec<Page>, mutation: &SlideMutation) -> Result<(), AdapterError> {
    match mutation {
        SlideMutation::DuplicateSlide {
            object_id,
            new_object_id,
        } => {
            if slides.iter().any(|s| &s.object_id == new_object_id) {
                return Err(AdapterError::rejected(format!(
                    "object id '{}' already in use",
                    new_object_id
                )));
            }
            let at = slide_position(slides, object_id)?;
            let copy = duplicate_page(&slides[at], new_object_id);
            slides.insert(at + 1, copy);
        }
        SlideMutation::DeleteSlide { object_id } => {
            let at = slide_position(slides, object_id)?;
            slides.remove(at);
        }
        SlideMutation::SetSlideOrder { object_ids } => {
            let unique: HashSet<&String> = object_ids.iter().collect();
            if object_ids.len() != slides.len() || unique.len() != slides.len() {
                return Err(AdapterError::rejected(
                    "slide order must list every slide exactly once",
                ));
            }
            let mut reordered = Vec::with_capacity(slides.len());
            for id in object_ids {
                let at = slide_position(slides, id)?;
                reordered.push(slides[at].clone());
            }
            *slides = reordered;
        }
    }
    Ok(())
}

fn slide_position(slides: &[Page], id: &str) -> Result<usize, AdapterError> {
    slides
        .iter()
        .position(|s| s.object_id == id)
        .ok_or_else(|| AdapterError::rejected(format!("no slide with object id '{}'", id)))
}

/// Copy a slide under a new id; child elements get derived ids too.
fn duplicate_page(page: &Page, new_object_id: &str) -> Page {
    fn rename(element: &PageElement, prefix: &str) -> PageElement {
        let mut copy = element.clone();
        copy.object_id = format!("{}_{}", prefix, element.object_id);
        if let Some(group) = copy.element_group.as_mut() {
            group.children = group.children.iter().map(|c| rename(c, prefix)).collect();
        }
        copy
    }

    Page {
        object_id: new_object_id.to_string(),
        page_elements: page
            .page_elements
            .iter()
            .map(|e| rename(e, new_object_id))
            .collect(),
    }
}

#[async_trait]
impl SlidesAdapter for MemorySlides {
    async fn fetch_presentation(&self, presentation_id: &str) -> Result<Presentation, AdapterError> {
        self.record_call();
        self.get(presentation_id)
            .ok_or_else(|| AdapterError::not_found(presentation_id))
    }

    async fn duplicate_presentation(
        &self,
        source_id: &str,
        _target_container: Option<&str>,
        name: Option<&str>,
    ) -> Result<String, AdapterError> {
        self.record_call();
        let mut state = self.state.lock();
        if let Some(error) = &state.fail_duplicate {
            return Err(error.clone());
        }

        let mut copy = state
            .presentations
            .get(source_id)
            .cloned()
            .ok_or_else(|| AdapterError::not_found(source_id))?;

        state.next_id += 1;
        copy.presentation_id = format!("memory-{}", state.next_id);
        copy.title = match name {
            Some(name) => name.to_string(),
            None => format!("Copy of {}", copy.title),
        };

        let id = copy.presentation_id.clone();
        state.presentations.insert(id.clone(), copy);
        Ok(id)
    }

    async fn apply_slide_mutations(
        &self,
        presentation_id: &str,
        mutations: &[SlideMutation],
    ) -> Result<(), AdapterError> {
        self.record_call();
        let mut state = self.state.lock();
        if let Some(error) = &state.fail_mutations {
            return Err(error.clone());
        }

        let presentation = state
            .presentations
            .get_mut(presentation_id)
            .ok_or_else(|| AdapterError::not_found(presentation_id))?;

        let mut working = presentation.slides.clone();
        for mutation in mutations {
            apply_mutation(&mut working, mutation)?;
        }
        presentation.slides = working;
        Ok(())
    }

    async fn delete_presentation(&self, presentation_id: &str) -> Result<(), AdapterError> {
        self.record_call();
        self.state
            .lock()
            .presentations
            .remove(presentation_id)
            .map(|_| ())
            .ok_or_else(|| AdapterError::not_found(presentation_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::AdapterErrorKind;

    fn deck() -> Presentation {
        let mut deck = Presentation::new("p", "Deck");
        for id in ["A", "B", "C"] {
            deck.add_slide(Page::new(id).with_text_shape(format!("{}1", id), id));
        }
        deck
    }

    fn store() -> MemorySlides {
        let store = MemorySlides::new();
        store.insert(deck());
        store
    }

    #[tokio::test]
    async fn test_duplicate_presentation_keeps_slide_ids() {
        let store = store();
        let copy = store.duplicate_presentation("p", None, None).await.unwrap();

        assert_eq!(store.fetch_slide_order(&copy).await.unwrap(), vec!["A", "B", "C"]);
        assert_eq!(store.get(&copy).unwrap().title, "Copy of Deck");
        assert_eq!(store.presentation_count(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_slide_lands_after_source() {
        let store = store();
        store
            .apply_slide_mutations(
                "p",
                &[SlideMutation::DuplicateSlide {
                    object_id: "A".into(),
                    new_object_id: "A2".into(),
                }],
            )
            .await
            .unwrap();

        let deck = store.get("p").unwrap();
        assert_eq!(deck.slide_order(), vec!["A", "A2", "B", "C"]);
        assert_eq!(deck.slides[1].page_elements[0].object_id, "A2_A1");
    }

    #[tokio::test]
    async fn test_batch_is_atomic() {
        let store = store();
        let err = store
            .apply_slide_mutations(
                "p",
                &[
                    SlideMutation::DeleteSlide { object_id: "A".into() },
                    SlideMutation::DeleteSlide { object_id: "missing".into() },
                ],
            )
            .await
            .unwrap_err();

        assert_eq!(err.kind, AdapterErrorKind::Rejected);
        assert_eq!(store.get("p").unwrap(), deck());
    }

    #[tokio::test]
    async fn test_set_slide_order_requires_permutation() {
        let store = store();
        let partial = SlideMutation::SetSlideOrder {
            object_ids: vec!["C".into(), "A".into()],
        };
        assert!(store.apply_slide_mutations("p", &[partial]).await.is_err());

        let repeated = SlideMutation::SetSlideOrder {
            object_ids: vec!["C".into(), "C".into(), "A".into()],
        };
        assert!(store.apply_slide_mutations("p", &[repeated]).await.is_err());

        let full = SlideMutation::SetSlideOrder {
            object_ids: vec!["C".into(), "A".into(), "B".into()],
        };
        store.apply_slide_mutations("p", &[full]).await.unwrap();
        assert_eq!(store.fetch_slide_order("p").await.unwrap(), vec!["C", "A", "B"]);
    }

    #[tokio::test]
    async fn test_missing_presentation() {
        let store = MemorySlides::new();
        let err = store.fetch_presentation("nope").await.unwrap_err();
        assert_eq!(err.kind, AdapterErrorKind::NotFound);
        assert!(store.delete_presentation("nope").await.is_err());
        assert_eq!(store.call_count(), 2);
    }
}
