use std::sync::Arc;

use geocoding_api::GeocodingClient;
use tokio::sync::broadcast::{self, error::TryRecvError};
use ui_common::{i18n::Locale, Marker, NewMarker};

use super::{
    map_widget::{MapWidget, PinHandle},
    navigator::{marker_path, Navigator},
    pin_arena::PinArena,
};
use crate::{
    config::{MapConfig, MARKER_STYLE, MAP_CONFIG},
    error::{user_message, AppError},
    store::{MarkerStore, StoreEvent},
};

/// Map page: keeps one pin per marker on the widget, turns clicks into
/// markers while adding mode is on and follows `/map/<id>` deep links.
pub struct MapView<W: MapWidget, N: Navigator> {
    store: Arc<MarkerStore>,
    geocoder: Arc<GeocodingClient>,
    widget: W,
    navigator: N,
    events: broadcast::Receiver<StoreEvent>,
    config: &'static MapConfig,
    locale: Locale,
    pins: PinArena,
    route_marker_id: Option<String>,
    route_handled: bool,
    mounted: bool,
    loading: bool,
    error_message: Option<String>,
    error_visible: bool,
}

impl<W: MapWidget, N: Navigator> MapView<W, N> {
    /// Creates the widget and draws the markers the store already holds.
    /// `route_marker_id` is the marker id of the route the page was opened with.
    pub fn mount(
        store: Arc<MarkerStore>,
        geocoder: Arc<GeocodingClient>,
        mut widget: W,
        navigator: N,
        route_marker_id: Option<String>,
        locale: Locale,
    ) -> Self {
        let events = store.subscribe();
        widget.init(&MAP_CONFIG);

        let mut view = Self {
            loading: store.loading(),
            store,
            geocoder,
            widget,
            navigator,
            events,
            config: &MAP_CONFIG,
            locale,
            pins: PinArena::default(),
            route_marker_id,
            route_handled: false,
            mounted: true,
            error_message: None,
            error_visible: false,
        };

        view.resync();
        view.process_events();
        view
    }

    /// Destroys the widget and forgets every pin. Also runs on drop, a second
    /// call does nothing.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.mounted = false;
        self.widget.destroy();
        self.pins.clear();
        log::debug!("Map view unmounted");
    }

    pub fn widget(&self) -> &W {
        &self.widget
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    pub fn pins(&self) -> &PinArena {
        &self.pins
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn is_adding_marker(&self) -> bool {
        self.store.is_adding_marker()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn error_visible(&self) -> bool {
        self.error_visible
    }

    pub fn dismiss_error(&mut self) {
        self.error_visible = false;
    }

    fn handle_error(&mut self, error: AppError) {
        self.error_message = Some(user_message(self.locale, &error));
        self.error_visible = true;
    }

    /// Reacts to everything the store published since the last call.
    pub fn process_events(&mut self) {
        if !self.mounted {
            return;
        }
        loop {
            match self.events.try_recv() {
                Ok(StoreEvent::MarkersChanged(markers)) => {
                    self.sync_pins(&markers);
                    self.select_marker_from_route(&markers);
                }
                Ok(StoreEvent::SelectionChanged(id)) => self.update_highlight(id.as_deref()),
                Ok(StoreEvent::LoadingChanged(loading)) => self.loading = loading,
                Ok(StoreEvent::ErrorChanged(Some(error))) => {
                    self.error_message = Some(error);
                    self.error_visible = true;
                }
                Ok(StoreEvent::ErrorChanged(None)) | Ok(StoreEvent::AddingModeChanged(_)) => (),
                Err(TryRecvError::Lagged(n)) => {
                    log::warn!("Map view missed {n} store events, resynchronizing");
                    self.resync();
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
    }

    fn resync(&mut self) {
        let state = self.store.snapshot();
        self.loading = state.loading;
        self.sync_pins(&state.markers);
        self.select_marker_from_route(&state.markers);
        if let Some(id) = self.store.selected_marker_id() {
            self.update_highlight(Some(id.as_str()));
        }
    }

    /// Adds pins for new markers and removes pins of deleted ones, pins of
    /// markers still present are left untouched.
    fn sync_pins(&mut self, markers: &[Marker]) {
        let selected = self.store.selected_marker_id();

        for marker in markers {
            if self.pins.contains(&marker.id) {
                continue;
            }
            let pin = self.widget.add_pin(marker.lat, marker.lng);
            if let Some(ref selected) = selected {
                let style = MARKER_STYLE.for_selection(*selected == marker.id);
                self.widget.set_pin_style(pin, style);
            }
            self.pins.insert(&marker.id, pin);
        }

        let stale: Vec<String> = self
            .pins
            .iter()
            .filter(|(id, _)| !markers.iter().any(|m| m.id == *id))
            .map(|(id, _)| id.to_string())
            .collect();
        for id in stale {
            if let Some(pin) = self.pins.remove(&id) {
                self.widget.remove_pin(pin);
            }
        }
    }

    /// Follows the deep link once per mount, after markers are available and
    /// only when nothing is selected yet.
    fn select_marker_from_route(&mut self, markers: &[Marker]) {
        if self.route_handled || markers.is_empty() || self.store.selected_marker_id().is_some() {
            return;
        }
        let Some(id) = self.route_marker_id.clone() else {
            return;
        };

        self.route_handled = true;
        match markers.iter().find(|m| m.id == id).cloned() {
            Some(marker) => {
                self.store.select_marker(&marker.id);
                self.center_on_marker(&marker, Some(self.config.detail_zoom));
            }
            None => log::warn!("Deep-linked marker {id} does not exist"),
        }
    }

    fn update_highlight(&mut self, selected_id: Option<&str>) {
        for (id, pin) in self.pins.iter() {
            let style = MARKER_STYLE.for_selection(Some(id) == selected_id);
            self.widget.set_pin_style(pin, style);
        }
    }

    fn select_and_navigate_to_marker(&mut self, id: &str) {
        self.store.select_marker(id);
        self.navigator.push(marker_path(id));
    }

    /// Places a marker at the clicked point while adding mode is on, otherwise
    /// does nothing.
    pub async fn on_map_click(&mut self, lat: f64, lng: f64) -> Option<Marker> {
        if !self.store.is_adding_marker() {
            return None;
        }

        self.store.set_loading(true);

        let marker = match self.geocoder.reverse_geocode(lat, lng).await {
            Ok(address) => {
                let marker = self.store.add_marker(NewMarker { lat, lng, address }).await;
                self.select_and_navigate_to_marker(&marker.id);
                Some(marker)
            }
            Err(e) => {
                self.handle_error(e.into());
                None
            }
        };

        self.store.set_loading(false);
        self.process_events();
        marker
    }

    /// Selects the marker behind a clicked pin.
    pub fn on_pin_click(&mut self, pin: PinHandle) -> bool {
        let Some(id) = self.pins.marker_id(pin).map(str::to_string) else {
            log::warn!("Click on unknown pin {pin:?}");
            return false;
        };
        self.select_and_navigate_to_marker(&id);
        self.process_events();
        true
    }

    /// Moves the view onto `marker`, at the detail zoom when `zoom` is `None`.
    pub fn center_on_marker(&mut self, marker: &Marker, zoom: Option<f64>) {
        let zoom = zoom.unwrap_or(self.config.detail_zoom);
        self.widget.set_view(marker.lat, marker.lng, zoom);
        self.navigator.push(marker_path(&marker.id));
    }

    pub fn set_adding_mode(&mut self, is_adding: bool) {
        self.store.set_adding_mode(is_adding);
        self.process_events();
    }
}

impl<W: MapWidget, N: Navigator> Drop for MapView<W, N> {
    fn drop(&mut self) {
        self.unmount();
    }
}
