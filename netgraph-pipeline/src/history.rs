use crate::search::PendingFetch;
use netgraph_core::SearchState;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::debug;

/// Called with the now-current state whenever the history is traversed.
pub type PopStateHandler = Arc<dyn Fn(SearchState) -> PendingFetch + Send + Sync>;

#[derive(Debug, Default)]
struct Stack {
    entries: Vec<SearchState>,
    index: usize,
}

/// Stack of search states navigated with back/forward.
///
/// Pushing while positioned before the newest entry discards the entries
/// ahead of the cursor, the way browser history does.
#[derive(Default)]
pub struct NavigationHistory {
    stack: Mutex<Stack>,
    on_popstate: RwLock<Option<PopStateHandler>>,
}

/// Result of a back/forward step.
#[derive(Debug)]
#[must_use = "the traversal carries the fetch it started"]
pub struct Traversal {
    pub state: SearchState,
    pub fetch: Option<PendingFetch>,
}

impl NavigationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_state(&self, state: SearchState) {
        let mut stack = self.stack.lock().unwrap_or_else(PoisonError::into_inner);
        Self::push_locked(&mut stack, state);
    }

    fn push_locked(stack: &mut Stack, state: SearchState) {
        if !stack.entries.is_empty() {
            let keep = stack.index + 1;
            stack.entries.truncate(keep);
        }
        debug!("History push: {:?}", state.search_value);
        stack.entries.push(state);
        stack.index = stack.entries.len() - 1;
    }

    /// Push `state` unless it equals the current entry. The check and the
    /// push happen under one lock.
    pub fn push_if_changed(&self, state: SearchState) -> bool {
        let mut stack = self.stack.lock().unwrap_or_else(PoisonError::into_inner);
        if stack.entries.get(stack.index) == Some(&state) {
            return false;
        }
        Self::push_locked(&mut stack, state);
        true
    }

    /// State of the current entry.
    pub fn state(&self) -> Option<SearchState> {
        let stack = self.stack.lock().unwrap_or_else(PoisonError::into_inner);
        stack.entries.get(stack.index).cloned()
    }

    pub fn len(&self) -> usize {
        self.stack
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn entries(&self) -> Vec<SearchState> {
        self.stack
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .clone()
    }

    /// Install the traversal handler, replacing any previous one.
    pub fn set_popstate_handler(&self, handler: PopStateHandler) {
        *self
            .on_popstate
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(handler);
    }

    #[must_use]
    pub fn back(&self) -> Option<Traversal> {
        self.go(-1)
    }

    #[must_use]
    pub fn forward(&self) -> Option<Traversal> {
        self.go(1)
    }

    /// Move `delta` entries and fire the traversal handler.
    ///
    /// Returns `None` without moving when the target is out of range.
    #[must_use]
    pub fn go(&self, delta: isize) -> Option<Traversal> {
        if delta == 0 {
            return None;
        }

        let state = {
            let mut stack = self.stack.lock().unwrap_or_else(PoisonError::into_inner);
            let target = stack.index.checked_add_signed(delta)?;
            let state = stack.entries.get(target)?.clone();
            stack.index = target;
            state
        };
        debug!("History traversal ({:+}) to {:?}", delta, state.search_value);

        let handler = self
            .on_popstate
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let fetch = handler.map(|handler| handler(state.clone()));

        Some(Traversal { state, fetch })
    }
}
