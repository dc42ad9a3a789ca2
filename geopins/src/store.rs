//! Marker store, the single owner of the application state.
//!
//! Every mutation goes through a [`MarkerStore`] method. Each change is
//! published as a [`StoreEvent`] on a broadcast channel; views keep a receiver
//! and react when they drain it.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;
use ui_common::{Marker, NewMarker};

use crate::{
    backend::{Backend, StorageError},
    config::STORAGE_KEY_MARKERS,
};

const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct AppState {
    /// Insertion order
    pub markers: Vec<Marker>,
    pub selected_marker_id: Option<String>,
    pub is_adding_marker: bool,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    MarkersChanged(Vec<Marker>),
    SelectionChanged(Option<String>),
    AddingModeChanged(bool),
    LoadingChanged(bool),
    ErrorChanged(Option<String>),
}

pub struct MarkerStore {
    state: Mutex<AppState>,
    backend: Backend,
    events: broadcast::Sender<StoreEvent>,
}

impl MarkerStore {
    pub fn new(backend: Backend) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            state: Mutex::new(AppState::default()),
            backend,
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    fn lock(&self) -> MutexGuard<'_, AppState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Applies `mutation` and publishes the event it returns, if any.
    /// The lock is released before publishing.
    fn commit(&self, mutation: impl FnOnce(&mut AppState) -> Option<StoreEvent>) {
        let event = mutation(&mut self.lock());
        if let Some(event) = event {
            // No subscribers is not an error
            let _ = self.events.send(event);
        }
    }

    // Getters

    pub fn snapshot(&self) -> AppState {
        self.lock().clone()
    }

    pub fn all_markers(&self) -> Vec<Marker> {
        self.lock().markers.clone()
    }

    pub fn marker(&self, id: &str) -> Option<Marker> {
        self.lock().markers.iter().find(|m| m.id == id).cloned()
    }

    pub fn selected_marker_id(&self) -> Option<String> {
        self.lock().selected_marker_id.clone()
    }

    pub fn selected_marker(&self) -> Option<Marker> {
        let state = self.lock();
        let id = state.selected_marker_id.as_ref()?;
        state.markers.iter().find(|m| &m.id == id).cloned()
    }

    pub fn is_adding_marker(&self) -> bool {
        self.lock().is_adding_marker
    }

    pub fn loading(&self) -> bool {
        self.lock().loading
    }

    pub fn error(&self) -> Option<String> {
        self.lock().error.clone()
    }

    // Mutations

    fn set_markers(&self, markers: Vec<Marker>) {
        self.commit(|state| {
            state.markers = markers;
            Some(StoreEvent::MarkersChanged(state.markers.clone()))
        });
    }

    fn set_selected_marker(&self, id: Option<String>) {
        self.commit(|state| {
            if state.selected_marker_id == id {
                return None;
            }
            state.selected_marker_id = id;
            Some(StoreEvent::SelectionChanged(state.selected_marker_id.clone()))
        });
    }

    fn set_error(&self, error: Option<String>) {
        self.commit(|state| {
            if state.error == error {
                return None;
            }
            state.error = error;
            Some(StoreEvent::ErrorChanged(state.error.clone()))
        });
    }

    /// Raises or clears the shared loading indicator. Views hold it up for the
    /// duration of a whole lookup and add flow.
    pub fn set_loading(&self, loading: bool) {
        self.commit(|state| {
            if state.loading == loading {
                return None;
            }
            state.loading = loading;
            Some(StoreEvent::LoadingChanged(loading))
        });
    }

    // Actions

    /// Replaces the marker list with the persisted one, empty if nothing was
    /// stored yet. Failures are recorded in `error` and returned.
    pub async fn load_markers(&self) -> Result<(), StorageError> {
        self.set_loading(true);
        self.set_error(None);

        let result = self.backend.get_item::<Vec<Marker>>(STORAGE_KEY_MARKERS).await;
        let result = match result {
            Ok(markers) => {
                let markers = markers.unwrap_or_default();
                log::info!("Loaded {} markers", markers.len());
                self.set_markers(markers);
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to load markers: {e}");
                self.set_error(Some(e.to_string()));
                Err(e)
            }
        };

        self.set_loading(false);
        result
    }

    /// Persists the current marker list. Failures are recorded in `error` and
    /// returned.
    pub async fn save_markers(&self) -> Result<(), StorageError> {
        self.set_loading(true);
        self.set_error(None);

        let markers = self.all_markers();
        let result = self.backend.update_item(STORAGE_KEY_MARKERS, &markers).await;
        if let Err(ref e) = result {
            log::error!("Failed to save markers: {e}");
            self.set_error(Some(e.to_string()));
        }

        self.set_loading(false);
        result
    }

    /// Creates a marker with a fresh id and creation time, appends it, waits for
    /// it to be persisted and leaves adding mode.
    ///
    /// A failed save does not undo the append; it is reported through `error`.
    pub async fn add_marker(&self, new_marker: NewMarker) -> Marker {
        let marker = Marker::create(new_marker);
        log::debug!("Adding marker {} at ({}, {})", marker.id, marker.lat, marker.lng);

        self.commit(|state| {
            state.markers.push(marker.clone());
            Some(StoreEvent::MarkersChanged(state.markers.clone()))
        });

        // Already recorded in `error`
        let _ = self.save_markers().await;
        self.set_adding_mode(false);

        marker
    }

    /// Removes the marker with `id`, persists the list and clears the selection
    /// if it pointed at the removed marker. Unknown ids are a no-op apart from
    /// the save.
    pub async fn remove_marker(&self, id: &str) {
        self.commit(|state| {
            let before = state.markers.len();
            state.markers.retain(|m| m.id != id);
            if state.markers.len() == before {
                log::debug!("Marker {id} not found");
                return None;
            }
            Some(StoreEvent::MarkersChanged(state.markers.clone()))
        });

        // Already recorded in `error`
        let _ = self.save_markers().await;

        if self.selected_marker_id().as_deref() == Some(id) {
            self.set_selected_marker(None);
        }
    }

    /// Selects `id` without checking that such a marker exists.
    pub fn select_marker(&self, id: &str) {
        self.set_selected_marker(Some(id.to_string()));
    }

    pub fn clear_selection(&self) {
        self.set_selected_marker(None);
    }

    pub fn toggle_adding_mode(&self) {
        self.commit(|state| {
            state.is_adding_marker = !state.is_adding_marker;
            Some(StoreEvent::AddingModeChanged(state.is_adding_marker))
        });
    }

    pub fn set_adding_mode(&self, is_adding: bool) {
        self.commit(|state| {
            if state.is_adding_marker == is_adding {
                return None;
            }
            state.is_adding_marker = is_adding;
            Some(StoreEvent::AddingModeChanged(is_adding))
        });
    }
}
