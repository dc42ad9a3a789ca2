use std::time::Duration;

use crate::views::map_widget::PinStyle;

pub struct MapConfig {
    /// (lat, lng)
    pub default_center: (f64, f64),
    pub default_zoom: f64,
    /// Zoom used when the view jumps to a single marker
    pub detail_zoom: f64,
    pub max_zoom: f64,
    pub tile_layer_url: &'static str,
    pub tile_layer_attribution: &'static str,
}

pub const MAP_CONFIG: MapConfig = MapConfig {
    default_center: (55.7558, 37.6173), // Moscow
    default_zoom: 10.0,
    detail_zoom: 15.0,
    max_zoom: 19.0,
    tile_layer_url: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png",
    tile_layer_attribution:
        "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors",
};

pub struct MarkerStyle {
    pub selected: PinStyle,
    pub unselected: PinStyle,
}

pub const MARKER_STYLE: MarkerStyle = MarkerStyle {
    selected: PinStyle {
        opacity: 1.0,
        z_index: 1000,
    },
    unselected: PinStyle {
        opacity: 0.6,
        z_index: 0,
    },
};

impl MarkerStyle {
    pub fn for_selection(&self, is_selected: bool) -> PinStyle {
        if is_selected {
            self.selected
        } else {
            self.unselected
        }
    }
}

pub struct BackendConfig {
    /// Storage area key holding the whole JSON document
    pub storage_key: &'static str,
    pub default_delay: Duration,
}

pub const BACKEND_CONFIG: BackendConfig = BackendConfig {
    storage_key: "markers_data",
    default_delay: Duration::from_millis(200),
};

/// Key of the marker list inside the persisted document
pub const STORAGE_KEY_MARKERS: &str = "markers";

pub const DEFAULT_DATA_DIR: &str = "./data";
