use std::sync::Arc;

use geocoding_api::{GeocodingClient, Location};
use tokio::sync::broadcast::{self, error::TryRecvError};
use ui_common::{i18n::Locale, Marker, NewMarker};

use crate::{
    error::{user_message, AppError},
    store::{MarkerStore, StoreEvent},
};

/// Ephemeral search state, reset whenever adding mode is left.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SearchSession {
    pub query: String,
    pub results: Vec<Location>,
    pub searching: bool,
    pub error: Option<String>,
}

/// One line of the rendered marker list
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerRow {
    pub id: String,
    pub address: String,
    pub coordinates: String,
    pub selected: bool,
}

pub struct MarkerListView {
    store: Arc<MarkerStore>,
    geocoder: Arc<GeocodingClient>,
    events: broadcast::Receiver<StoreEvent>,
    locale: Locale,
    search: SearchSession,
}

impl MarkerListView {
    pub fn new(store: Arc<MarkerStore>, geocoder: Arc<GeocodingClient>, locale: Locale) -> Self {
        let events = store.subscribe();
        Self {
            store,
            geocoder,
            events,
            locale,
            search: SearchSession::default(),
        }
    }

    pub fn search(&self) -> &SearchSession {
        &self.search
    }

    pub fn is_adding_marker(&self) -> bool {
        self.store.is_adding_marker()
    }

    pub fn rows(&self) -> Vec<MarkerRow> {
        let state = self.store.snapshot();
        state
            .markers
            .iter()
            .map(|marker| MarkerRow {
                id: marker.id.clone(),
                address: marker.address.clone(),
                coordinates: marker.coordinates(),
                selected: state.selected_marker_id.as_deref() == Some(marker.id.as_str()),
            })
            .collect()
    }

    /// Reacts to everything the store published since the last call.
    pub fn process_events(&mut self) {
        loop {
            match self.events.try_recv() {
                Ok(StoreEvent::AddingModeChanged(false)) => self.reset_search(),
                Ok(_) => (),
                Err(TryRecvError::Lagged(n)) => {
                    log::warn!("Marker list missed {n} store events, resynchronizing");
                    if !self.store.is_adding_marker() {
                        self.reset_search();
                    }
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
    }

    fn reset_search(&mut self) {
        self.search.query.clear();
        self.search.results.clear();
        self.search.error = None;
    }

    fn handle_error(&mut self, error: AppError) {
        self.search.error = Some(user_message(self.locale, &error));
    }

    pub fn toggle_adding_mode(&mut self) {
        self.store.toggle_adding_mode();
        self.process_events();
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.search.query = query.into();
    }

    /// Looks up the current query. Blank queries are ignored.
    pub async fn perform_search(&mut self) {
        if self.search.query.trim().is_empty() {
            return;
        }

        self.search.searching = true;
        self.search.error = None;
        self.search.results.clear();

        match self.geocoder.search_location(&self.search.query).await {
            Ok(results) => self.search.results = results,
            Err(e) => self.handle_error(e.into()),
        }

        self.search.searching = false;
    }

    /// Turns the search result at `index` into a marker and selects it.
    ///
    /// Returns the new marker so the map can center on it.
    pub async fn select_search_result(&mut self, index: usize) -> Option<Marker> {
        let Some(result) = self.search.results.get(index).cloned() else {
            self.handle_error(AppError::Unexpected(format!("No search result at index {index}")));
            return None;
        };

        self.store.set_loading(true);

        let marker = self
            .store
            .add_marker(NewMarker {
                lat: result.lat,
                lng: result.lng,
                address: result.address,
            })
            .await;
        self.store.select_marker(&marker.id);
        self.reset_search();

        self.store.set_loading(false);
        self.process_events();

        if let Some(error) = self.store.error() {
            self.search.error = Some(error);
        }

        Some(marker)
    }

    /// Selects a listed marker. Returns it so the map can center on it.
    pub fn select_marker(&mut self, id: &str) -> Option<Marker> {
        let marker = self.store.marker(id)?;
        self.store.select_marker(&marker.id);
        Some(marker)
    }

    pub async fn remove_marker(&mut self, id: &str) {
        self.store.remove_marker(id).await;
        self.process_events();
    }
}
