pub mod map_view;
pub mod map_widget;
pub mod marker_list;
pub mod navigator;
pub mod pin_arena;

pub use map_view::MapView;
pub use map_widget::{HeadlessMap, MapWidget, PinHandle, PinStyle};
pub use marker_list::{MarkerListView, MarkerRow, SearchSession};
pub use navigator::{marker_path, parse_marker_path, History, Navigator, MAP_ROUTE};
