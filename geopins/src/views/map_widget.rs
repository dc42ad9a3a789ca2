use std::collections::HashMap;

use crate::config::MapConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PinHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinStyle {
    pub opacity: f32,
    pub z_index: i32,
}

/// The rendering side of a map: tiles, view and pins.
///
/// The map view owns exactly one widget between mount and unmount, dropping
/// the view destroys the widget.
pub trait MapWidget {
    fn init(&mut self, config: &MapConfig);
    fn set_view(&mut self, lat: f64, lng: f64, zoom: f64);
    fn add_pin(&mut self, lat: f64, lng: f64) -> PinHandle;
    fn remove_pin(&mut self, pin: PinHandle);
    fn set_pin_style(&mut self, pin: PinHandle, style: PinStyle);
    /// Releases the widget together with its pins
    fn destroy(&mut self);
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessPin {
    pub lat: f64,
    pub lng: f64,
    pub style: Option<PinStyle>,
}

/// A map widget without any output, it only records what it was asked to show.
#[derive(Debug, Default)]
pub struct HeadlessMap {
    initialized: bool,
    destroyed: bool,
    max_zoom: f64,
    tile_layer_url: String,
    tile_layer_attribution: String,
    view: Option<(f64, f64, f64)>,
    pins: HashMap<PinHandle, HeadlessPin>,
    next_pin: u64,
}

impl HeadlessMap {
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn tile_layer_url(&self) -> &str {
        &self.tile_layer_url
    }

    pub fn tile_layer_attribution(&self) -> &str {
        &self.tile_layer_attribution
    }

    /// (lat, lng, zoom)
    pub fn view(&self) -> Option<(f64, f64, f64)> {
        self.view
    }

    pub fn pin(&self, pin: PinHandle) -> Option<&HeadlessPin> {
        self.pins.get(&pin)
    }

    pub fn pin_count(&self) -> usize {
        self.pins.len()
    }
}

impl MapWidget for HeadlessMap {
    fn init(&mut self, config: &MapConfig) {
        self.initialized = true;
        self.destroyed = false;
        self.max_zoom = config.max_zoom;
        self.tile_layer_url = config.tile_layer_url.to_string();
        self.tile_layer_attribution = config.tile_layer_attribution.to_string();
        let (lat, lng) = config.default_center;
        self.set_view(lat, lng, config.default_zoom);
    }

    fn set_view(&mut self, lat: f64, lng: f64, zoom: f64) {
        self.view = Some((lat, lng, zoom.clamp(0.0, self.max_zoom)));
    }

    fn add_pin(&mut self, lat: f64, lng: f64) -> PinHandle {
        let handle = PinHandle(self.next_pin);
        self.next_pin += 1;
        self.pins.insert(handle, HeadlessPin { lat, lng, style: None });
        handle
    }

    fn remove_pin(&mut self, pin: PinHandle) {
        if self.pins.remove(&pin).is_none() {
            log::warn!("Removing unknown pin {pin:?}");
        }
    }

    fn set_pin_style(&mut self, pin: PinHandle, style: PinStyle) {
        match self.pins.get_mut(&pin) {
            Some(p) => p.style = Some(style),
            None => log::warn!("Styling unknown pin {pin:?}"),
        }
    }

    fn destroy(&mut self) {
        self.pins.clear();
        self.view = None;
        self.initialized = false;
        self.destroyed = true;
    }
}
