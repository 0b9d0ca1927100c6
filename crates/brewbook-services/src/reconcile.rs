//! Queue-driven reconciliation of imported data into a dataset.
//!
//! The whole flow is a state machine over an ordered queue, processed
//! strictly one item at a time: every commit (including the library
//! growth linking causes) fully applies before the next item's duplicate
//! check runs. Duplicate recipes are skipped silently; duplicate library
//! ingredients pause the queue until the caller supplies a resolution.

use crate::link::link_recipe;
use brewbook_domain::{Dataset, LibraryIngredient, Recipe, ReconcileSummary};
use brewbook_parsers_xml::ImportResult;
use std::collections::VecDeque;
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub enum PendingItem {
    Recipe(Recipe),
    Library(LibraryIngredient),
}

/// The four explicit answers to a library-ingredient conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Discard the entire remaining queue. Items already committed stay
    /// committed.
    Cancel,
    /// Discard just this item and continue.
    Skip,
    /// Replace the existing entry's fields, keeping its id.
    Overwrite,
    /// Insert as a new entry under a disambiguated name with a fresh id.
    Copy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Idle,
    AwaitingDecision,
    Cancelled,
    Done,
}

/// A paused conflict: the incoming library item and the id of the entry
/// it collides with.
#[derive(Debug, Clone)]
pub struct Conflict {
    pub incoming: LibraryIngredient,
    pub existing_id: String,
}

#[derive(Debug, Clone)]
pub struct ReconcileState {
    pub dataset: Dataset,
    queue: VecDeque<PendingItem>,
    pub status: Status,
    pub conflict: Option<Conflict>,
    pub summary: ReconcileSummary,
}

impl ReconcileState {
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

#[derive(Debug, Clone)]
pub enum ReconcileAction {
    /// Start or resume draining the queue.
    Begin,
    /// Answer the currently exposed conflict.
    Decide(Resolution),
}

/// Order an import result for reconciliation: library declarations first,
/// then recipes, so recipe linking can reuse the just-imported entries.
pub fn pending_from_import(import: ImportResult) -> Vec<PendingItem> {
    let mut items: Vec<PendingItem> = import.library.into_iter().map(PendingItem::Library).collect();
    items.extend(import.recipes.into_iter().map(PendingItem::Recipe));
    items
}

/// Build the initial state and drain until the first pause (or the end).
pub fn begin(dataset: Dataset, items: Vec<PendingItem>) -> ReconcileState {
    let state = ReconcileState {
        dataset,
        queue: items.into(),
        status: Status::Idle,
        conflict: None,
        summary: ReconcileSummary::default(),
    };
    step(state, ReconcileAction::Begin)
}

/// Pure transition function. Invalid (state, action) pairs return the
/// state unchanged with a warning rather than failing.
pub fn step(mut state: ReconcileState, action: ReconcileAction) -> ReconcileState {
    match (state.status, action) {
        (Status::Idle, ReconcileAction::Begin) => drain(state),
        (Status::AwaitingDecision, ReconcileAction::Decide(resolution)) => {
            let conflict = match state.conflict.take() {
                Some(c) => c,
                None => {
                    warn!("awaiting decision with no conflict recorded");
                    return state;
                }
            };
            match resolution {
                Resolution::Cancel => {
                    debug!(remaining = state.queue.len(), "import cancelled");
                    state.queue.clear();
                    state.status = Status::Cancelled;
                    state
                }
                Resolution::Skip => {
                    state.summary.library_skipped += 1;
                    drain(state)
                }
                Resolution::Overwrite => {
                    overwrite_entry(&mut state.dataset.library, conflict);
                    state.summary.library_overwritten += 1;
                    drain(state)
                }
                Resolution::Copy => {
                    copy_entry(&mut state.dataset.library, conflict.incoming);
                    state.summary.library_copied += 1;
                    drain(state)
                }
            }
        }
        (status, action) => {
            warn!(?status, ?action, "ignoring action in this state");
            state
        }
    }
}

/// Process queue items until one needs a decision or the queue runs dry.
fn drain(mut state: ReconcileState) -> ReconcileState {
    while let Some(item) = state.queue.pop_front() {
        match item {
            PendingItem::Recipe(recipe) => commit_recipe(&mut state, recipe),
            PendingItem::Library(incoming) => {
                let existing = state
                    .dataset
                    .library
                    .iter()
                    .find(|l| l.kind == incoming.kind && l.name.eq_ignore_ascii_case(&incoming.name));
                if let Some(existing) = existing {
                    state.conflict = Some(Conflict {
                        existing_id: existing.id.clone(),
                        incoming,
                    });
                    state.status = Status::AwaitingDecision;
                    return state;
                }
                commit_library(&mut state, incoming);
            }
        }
    }
    state.status = Status::Done;
    state
}

fn commit_recipe(state: &mut ReconcileState, mut recipe: Recipe) {
    let duplicate = state
        .dataset
        .recipes
        .iter()
        .any(|r| r.name.eq_ignore_ascii_case(&recipe.name));
    if duplicate {
        // recipes never prompt: silently skip re-imports
        debug!(name = %recipe.name, "duplicate recipe skipped");
        state.summary.recipes_skipped += 1;
        return;
    }

    link_recipe(&mut recipe, &mut state.dataset.library);
    if recipe.id.is_empty() {
        recipe.id = Uuid::new_v4().to_string();
    }
    state.dataset.recipes.push(recipe);
    state.summary.recipes_added += 1;
}

fn commit_library(state: &mut ReconcileState, mut item: LibraryIngredient) {
    if item.id.is_empty() {
        item.id = Uuid::new_v4().to_string();
    }
    state.dataset.library.push(item);
    state.summary.library_added += 1;
}

fn overwrite_entry(library: &mut [LibraryIngredient], conflict: Conflict) {
    if let Some(existing) = library.iter_mut().find(|l| l.id == conflict.existing_id) {
        let incoming = conflict.incoming;
        existing.name = incoming.name;
        existing.color_srm = incoming.color_srm;
        existing.potential = incoming.potential;
        existing.alpha_percent = incoming.alpha_percent;
        existing.attenuation_percent = incoming.attenuation_percent;
        existing.notes = incoming.notes;
    }
}

fn copy_entry(library: &mut Vec<LibraryIngredient>, mut incoming: LibraryIngredient) {
    let base = incoming.name.clone();
    let mut n = 2;
    let mut candidate = format!("{base} ({n})");
    while library
        .iter()
        .any(|l| l.kind == incoming.kind && l.name.eq_ignore_ascii_case(&candidate))
    {
        n += 1;
        candidate = format!("{base} ({n})");
    }
    incoming.name = candidate;
    incoming.id = Uuid::new_v4().to_string();
    library.push(incoming);
}
