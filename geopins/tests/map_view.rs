pub mod common;

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use geopins::{
    config::{MapConfig, MAP_CONFIG, MARKER_STYLE},
    views::{marker_path, parse_marker_path, HeadlessMap, History, MapView, MapWidget, PinHandle, PinStyle},
    App,
};
use ui_common::i18n::Locale;

use crate::common::{
    create_mock_geocoding_server, init_store, mock_reverse, mock_search, new_marker,
    red_square_search_body, RED_SQUARE_ADDRESS,
};

fn pin_style(view: &MapView<HeadlessMap, History>, marker_id: &str) -> Option<PinStyle> {
    let pin = view.pins().get(marker_id)?;
    view.widget().pin(pin)?.style
}

#[tokio::test]
async fn mount_initializes_widget_with_existing_markers() {
    let (_server, geocoder) = create_mock_geocoding_server().await;
    let (_storage, store) = init_store();
    let a = store.add_marker(new_marker(1.0, 2.0, "A")).await;

    let view = MapView::mount(store, geocoder, HeadlessMap::default(), History::default(), None, Locale::En);

    let widget = view.widget();
    assert!(widget.is_initialized());
    assert_eq!(widget.tile_layer_url(), MAP_CONFIG.tile_layer_url);
    assert_eq!(widget.tile_layer_attribution(), MAP_CONFIG.tile_layer_attribution);
    assert_eq!(widget.view(), Some((55.7558, 37.6173, MAP_CONFIG.default_zoom)));
    assert_eq!(widget.pin_count(), 1);
    assert!(view.pins().contains(&a.id));
    assert!(view.navigator().entries().is_empty());
}

#[tokio::test]
async fn click_outside_adding_mode_does_nothing() {
    let (mut server, geocoder) = create_mock_geocoding_server().await;
    let mock = server
        .mock("GET", "/reverse")
        .match_query(mockito::Matcher::Any)
        .expect(0)
        .create_async()
        .await;
    let (storage, store) = init_store();

    let mut view = MapView::mount(store.clone(), geocoder, HeadlessMap::default(), History::default(), None, Locale::En);
    assert_eq!(view.on_map_click(55.7558, 37.6173).await, None);

    mock.assert_async().await;
    assert!(store.all_markers().is_empty());
    assert!(storage.writes().is_empty());
    assert_eq!(view.widget().pin_count(), 0);
}

#[tokio::test]
async fn click_in_adding_mode_adds_selects_and_links_marker() {
    let (mut server, geocoder) = create_mock_geocoding_server().await;
    let body = serde_json::json!({"display_name": RED_SQUARE_ADDRESS}).to_string();
    let mock = mock_reverse(&mut server, 200, &body).await;
    let (_storage, store) = init_store();
    let other = store.add_marker(new_marker(59.9343, 30.3351, "Saint Petersburg")).await;

    let mut view = MapView::mount(store.clone(), geocoder, HeadlessMap::default(), History::default(), None, Locale::En);
    view.set_adding_mode(true);

    let marker = view.on_map_click(55.7558, 37.6173).await.unwrap();

    mock.assert_async().await;
    assert_eq!(marker.address, RED_SQUARE_ADDRESS);
    assert_eq!(store.selected_marker_id(), Some(marker.id.clone()));
    assert!(!view.is_adding_marker());
    assert!(!view.loading());
    assert_eq!(view.navigator().current(), Some(format!("/map/{}", marker.id).as_str()));

    assert_eq!(view.widget().pin_count(), 2);
    assert_eq!(pin_style(&view, &marker.id), Some(MARKER_STYLE.selected));
    assert_eq!(pin_style(&view, &other.id), Some(MARKER_STYLE.unselected));
}

#[tokio::test]
async fn failed_reverse_lookup_shows_translated_error() {
    let (mut server, geocoder) = create_mock_geocoding_server().await;
    let _mock = mock_reverse(&mut server, 200, r#"{"error": "Unable to geocode"}"#).await;
    let (storage, store) = init_store();

    let mut view = MapView::mount(store.clone(), geocoder, HeadlessMap::default(), History::default(), None, Locale::Ru);
    view.set_adding_mode(true);

    assert_eq!(view.on_map_click(0.0, 0.0).await, None);
    assert_eq!(view.error_message(), Some("Адрес не найден"));
    assert!(view.error_visible());
    assert!(view.is_adding_marker());
    assert!(!view.loading());
    assert!(storage.writes().is_empty());

    view.dismiss_error();
    assert!(!view.error_visible());
}

#[tokio::test]
async fn unreachable_geocoder_shows_translated_error() {
    let (mut server, geocoder) = create_mock_geocoding_server().await;
    let _mock = mock_reverse(&mut server, 502, "").await;
    let (_storage, store) = init_store();

    let mut view = MapView::mount(store.clone(), geocoder, HeadlessMap::default(), History::default(), None, Locale::Ru);
    view.set_adding_mode(true);

    assert_eq!(view.on_map_click(0.0, 0.0).await, None);
    assert_eq!(view.error_message(), Some("Не удалось получить адрес"));
    assert!(store.all_markers().is_empty());
}

#[tokio::test]
async fn pins_follow_marker_changes() {
    let (_server, geocoder) = create_mock_geocoding_server().await;
    let (_storage, store) = init_store();
    let a = store.add_marker(new_marker(1.0, 1.0, "A")).await;

    let mut view = MapView::mount(store.clone(), geocoder, HeadlessMap::default(), History::default(), None, Locale::En);
    let pin_a = view.pins().get(&a.id).unwrap();

    let b = store.add_marker(new_marker(2.0, 2.0, "B")).await;
    let c = store.add_marker(new_marker(3.0, 3.0, "C")).await;
    view.process_events();
    assert_eq!(view.widget().pin_count(), 3);
    // Existing pins are kept, not redrawn
    assert_eq!(view.pins().get(&a.id), Some(pin_a));

    store.remove_marker(&b.id).await;
    view.process_events();
    assert_eq!(view.widget().pin_count(), 2);
    assert!(!view.pins().contains(&b.id));
    assert_eq!(view.pins().get(&a.id), Some(pin_a));

    let pin_c = view.pins().get(&c.id).unwrap();
    let headless = view.widget().pin(pin_c).unwrap();
    assert_eq!((headless.lat, headless.lng), (3.0, 3.0));
}

#[tokio::test]
async fn selection_restyles_every_pin() {
    let (_server, geocoder) = create_mock_geocoding_server().await;
    let (_storage, store) = init_store();
    let a = store.add_marker(new_marker(1.0, 1.0, "A")).await;
    let b = store.add_marker(new_marker(2.0, 2.0, "B")).await;

    let mut view = MapView::mount(store.clone(), geocoder, HeadlessMap::default(), History::default(), None, Locale::En);
    assert_eq!(pin_style(&view, &a.id), None);

    store.select_marker(&a.id);
    view.process_events();
    assert_eq!(pin_style(&view, &a.id), Some(PinStyle { opacity: 1.0, z_index: 1000 }));
    assert_eq!(pin_style(&view, &b.id), Some(PinStyle { opacity: 0.6, z_index: 0 }));

    let pin_b = view.pins().get(&b.id).unwrap();
    assert!(view.on_pin_click(pin_b));
    assert_eq!(store.selected_marker_id(), Some(b.id.clone()));
    assert_eq!(view.navigator().current(), Some(format!("/map/{}", b.id).as_str()));
    assert_eq!(pin_style(&view, &a.id), Some(MARKER_STYLE.unselected));
    assert_eq!(pin_style(&view, &b.id), Some(MARKER_STYLE.selected));
    // Pin clicks never add markers
    assert_eq!(store.all_markers().len(), 2);
}

#[tokio::test]
async fn deep_link_selects_marker_once_markers_are_loaded() {
    let (_server, geocoder) = create_mock_geocoding_server().await;
    let (storage, store) = init_store();
    let a = store.add_marker(new_marker(1.0, 1.0, "A")).await;
    let b = store.add_marker(new_marker(48.8566, 2.3522, "Paris")).await;

    // Page opened on /map/<b>, before markers are loaded
    let route = parse_marker_path(&marker_path(&b.id));
    assert_eq!(route.as_deref(), Some(b.id.as_str()));
    let fresh = common::store_with(storage);
    let mut view = MapView::mount(fresh.clone(), geocoder, HeadlessMap::default(), History::default(), route, Locale::En);
    assert_eq!(fresh.selected_marker_id(), None);

    fresh.load_markers().await.unwrap();
    view.process_events();

    assert_eq!(fresh.selected_marker_id(), Some(b.id.clone()));
    assert_eq!(view.widget().view(), Some((48.8566, 2.3522, MAP_CONFIG.detail_zoom)));
    assert_eq!(view.navigator().entries(), &[format!("/map/{}", b.id)]);
    assert_eq!(pin_style(&view, &b.id), Some(MARKER_STYLE.selected));

    // Later marker updates do not follow the link again
    fresh.select_marker(&a.id);
    fresh.add_marker(new_marker(3.0, 3.0, "C")).await;
    view.process_events();
    assert_eq!(fresh.selected_marker_id(), Some(a.id.clone()));
    assert_eq!(view.navigator().entries().len(), 1);
}

#[tokio::test]
async fn deep_link_is_skipped_when_a_marker_is_selected() {
    let (_server, geocoder) = create_mock_geocoding_server().await;
    let (_storage, store) = init_store();
    let a = store.add_marker(new_marker(1.0, 1.0, "A")).await;
    let b = store.add_marker(new_marker(2.0, 2.0, "B")).await;
    store.select_marker(&a.id);

    let view = MapView::mount(
        store.clone(),
        geocoder,
        HeadlessMap::default(),
        History::default(),
        Some(b.id.clone()),
        Locale::En,
    );

    assert_eq!(store.selected_marker_id(), Some(a.id.clone()));
    assert!(view.navigator().entries().is_empty());
    assert_eq!(view.widget().view(), Some((55.7558, 37.6173, MAP_CONFIG.default_zoom)));
    assert_eq!(pin_style(&view, &a.id), Some(MARKER_STYLE.selected));
}

#[tokio::test]
async fn store_errors_reach_the_map() {
    let (_server, geocoder) = create_mock_geocoding_server().await;
    let storage = std::sync::Arc::new(geopins::backend::MemoryStorage::with_quota(8));
    let store = common::store_with(storage);

    let mut view = MapView::mount(store.clone(), geocoder, HeadlessMap::default(), History::default(), None, Locale::En);
    store.add_marker(new_marker(1.0, 1.0, "A")).await;
    view.process_events();

    assert_eq!(view.error_message(), Some("Failed to update item"));
    assert!(view.error_visible());
    assert_eq!(view.widget().pin_count(), 1);
}

#[tokio::test]
async fn unmount_releases_the_widget() {
    let (_server, geocoder) = create_mock_geocoding_server().await;
    let (_storage, store) = init_store();
    store.add_marker(new_marker(1.0, 1.0, "A")).await;

    let mut view = MapView::mount(store.clone(), geocoder.clone(), HeadlessMap::default(), History::default(), None, Locale::En);
    assert_eq!(view.widget().pin_count(), 1);

    view.unmount();
    assert!(view.widget().is_destroyed());
    assert_eq!(view.widget().pin_count(), 0);
    assert_eq!(view.widget().view(), None);
    assert!(view.pins().is_empty());

    // Unmounted views ignore store changes
    store.add_marker(new_marker(2.0, 2.0, "B")).await;
    view.process_events();
    assert_eq!(view.widget().pin_count(), 0);

    // Mounting again draws every marker
    let view = MapView::mount(store, geocoder, HeadlessMap::default(), History::default(), None, Locale::En);
    assert!(view.widget().is_initialized());
    assert_eq!(view.widget().pin_count(), 2);
}

/// Headless map reporting when it gets destroyed
struct TrackedMap {
    inner: HeadlessMap,
    destroyed: Arc<AtomicBool>,
}

impl MapWidget for TrackedMap {
    fn init(&mut self, config: &MapConfig) {
        self.inner.init(config);
    }

    fn set_view(&mut self, lat: f64, lng: f64, zoom: f64) {
        self.inner.set_view(lat, lng, zoom);
    }

    fn add_pin(&mut self, lat: f64, lng: f64) -> PinHandle {
        self.inner.add_pin(lat, lng)
    }

    fn remove_pin(&mut self, pin: PinHandle) {
        self.inner.remove_pin(pin);
    }

    fn set_pin_style(&mut self, pin: PinHandle, style: PinStyle) {
        self.inner.set_pin_style(pin, style);
    }

    fn destroy(&mut self) {
        assert!(!self.destroyed.swap(true, Ordering::SeqCst), "widget destroyed twice");
        self.inner.destroy();
    }
}

#[tokio::test]
async fn dropping_the_view_destroys_the_widget_once() {
    let (_server, geocoder) = create_mock_geocoding_server().await;
    let (_storage, store) = init_store();

    let destroyed = Arc::new(AtomicBool::new(false));
    let widget = TrackedMap {
        inner: HeadlessMap::default(),
        destroyed: destroyed.clone(),
    };
    let app = App::mount(store.clone(), geocoder.clone(), widget, History::default(), None, Locale::En);
    drop(app);
    assert!(destroyed.load(Ordering::SeqCst));

    let destroyed = Arc::new(AtomicBool::new(false));
    let widget = TrackedMap {
        inner: HeadlessMap::default(),
        destroyed: destroyed.clone(),
    };
    let mut view = MapView::mount(store, geocoder, widget, History::default(), None, Locale::En);
    view.unmount();
    assert!(destroyed.load(Ordering::SeqCst));
    // Dropping after an explicit unmount does not destroy again
    drop(view);
}

#[tokio::test]
async fn add_from_search_reports_a_pick_past_the_results() {
    let (mut server, geocoder) = create_mock_geocoding_server().await;
    let _mock = mock_search(&mut server, "Red Square", &red_square_search_body()).await;
    let (storage, store) = init_store();

    let mut app = App::mount(store.clone(), geocoder, HeadlessMap::default(), History::default(), None, Locale::En);
    let err = app.add_from_search("Red Square", 9).await.unwrap_err();

    assert_eq!(err, "No search result at index 9");
    assert!(store.all_markers().is_empty());
    assert!(storage.writes().is_empty());

    let marker = app.add_from_search("Red Square", 0).await.unwrap();
    assert_eq!(marker.address, RED_SQUARE_ADDRESS);
    assert_eq!(store.all_markers(), vec![marker]);
}

#[tokio::test]
async fn add_from_search_reports_a_failed_search() {
    let (mut server, geocoder) = create_mock_geocoding_server().await;
    let _mock = mock_search(&mut server, "Atlantis", "[]").await;
    let (_storage, store) = init_store();

    let mut app = App::mount(store.clone(), geocoder, HeadlessMap::default(), History::default(), None, Locale::Ru);
    assert_eq!(app.add_from_search("Atlantis", 0).await.unwrap_err(), "Место не найдено");
    assert!(store.all_markers().is_empty());
}

#[tokio::test]
async fn search_result_centers_the_map() {
    let (mut server, geocoder) = create_mock_geocoding_server().await;
    let _mock = mock_search(&mut server, "Red Square", &red_square_search_body()).await;
    let (_storage, store) = init_store();

    let mut app = App::mount(store.clone(), geocoder, HeadlessMap::default(), History::default(), None, Locale::En);
    app.list.toggle_adding_mode();
    app.list.set_query("Red Square");
    app.list.perform_search().await;

    let marker = app.add_search_result(1).await.unwrap();

    assert_eq!(marker.address, "Red Square, Moscow, Russia");
    assert_eq!(app.map.widget().view(), Some((marker.lat, marker.lng, MAP_CONFIG.detail_zoom)));
    assert_eq!(app.map.navigator().current(), Some(format!("/map/{}", marker.id).as_str()));
    assert_eq!(app.map.widget().pin_count(), 1);
    assert_eq!(pin_style(&app.map, &marker.id), Some(MARKER_STYLE.selected));
    assert!(!app.map.is_adding_marker());
    assert!(app.list.search().results.is_empty());

    let other = store.add_marker(new_marker(1.0, 1.0, "A")).await;
    assert_eq!(app.select_listed_marker(&other.id), Some(other.clone()));
    assert_eq!(app.map.widget().view(), Some((1.0, 1.0, MAP_CONFIG.detail_zoom)));
    assert_eq!(pin_style(&app.map, &marker.id), Some(MARKER_STYLE.unselected));

    app.unmount();
    assert!(app.map.widget().is_destroyed());
}
