use std::sync::Arc;

use geocoding_api::GeocodingClient;
use ui_common::{i18n::Locale, Marker};

use crate::{
    store::MarkerStore,
    views::{MapView, MapWidget, MarkerListView, Navigator},
};

/// The map page: marker list next to the map, both fed by one store.
///
/// Selection events coming out of the list are forwarded to the map.
pub struct App<W: MapWidget, N: Navigator> {
    store: Arc<MarkerStore>,
    pub list: MarkerListView,
    pub map: MapView<W, N>,
}

impl<W: MapWidget, N: Navigator> App<W, N> {
    pub fn mount(
        store: Arc<MarkerStore>,
        geocoder: Arc<GeocodingClient>,
        widget: W,
        navigator: N,
        route_marker_id: Option<String>,
        locale: Locale,
    ) -> Self {
        let list = MarkerListView::new(store.clone(), geocoder.clone(), locale);
        let map = MapView::mount(store.clone(), geocoder, widget, navigator, route_marker_id, locale);
        Self { store, list, map }
    }

    pub fn unmount(&mut self) {
        self.map.unmount();
    }

    pub fn store(&self) -> &MarkerStore {
        &self.store
    }

    pub fn process_events(&mut self) {
        self.list.process_events();
        self.map.process_events();
    }

    /// Search-to-add flow: adds the picked search result and centers the map
    /// on the new marker.
    pub async fn add_search_result(&mut self, index: usize) -> Option<Marker> {
        let marker = self.list.select_search_result(index).await;
        if let Some(ref marker) = marker {
            self.map.center_on_marker(marker, None);
        }
        self.process_events();
        marker
    }

    /// Searches `query` in adding mode and saves the result at `index`.
    ///
    /// Fails with the user facing message of the failed search or pick.
    pub async fn add_from_search(&mut self, query: &str, index: usize) -> Result<Marker, String> {
        self.map.set_adding_mode(true);
        self.list.set_query(query);
        self.list.perform_search().await;
        if let Some(ref e) = self.list.search().error {
            return Err(e.clone());
        }

        match self.add_search_result(index).await {
            Some(marker) => Ok(marker),
            None => Err(self
                .list
                .search()
                .error
                .clone()
                .unwrap_or_else(|| format!("No search result at index {index}"))),
        }
    }

    /// Selects a marker from the list and centers the map on it.
    pub fn select_listed_marker(&mut self, id: &str) -> Option<Marker> {
        let marker = self.list.select_marker(id);
        if let Some(ref marker) = marker {
            self.map.center_on_marker(marker, None);
        }
        self.process_events();
        marker
    }
}
