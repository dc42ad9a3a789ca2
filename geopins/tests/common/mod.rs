#![allow(dead_code)]

use std::{sync::Arc, time::Duration};

use geocoding_api::GeocodingClient;
use geopins::{
    backend::{Backend, MemoryStorage},
    config::BACKEND_CONFIG,
    MarkerStore,
};
use mockito::Matcher;
use ui_common::{Marker, NewMarker};

pub const RED_SQUARE_ADDRESS: &str = "Red Square, Tverskoy District, Moscow, Russia";

pub fn init_store() -> (Arc<MemoryStorage>, Arc<MarkerStore>) {
    let storage = Arc::new(MemoryStorage::new());
    let store = store_with(storage.clone());
    (storage, store)
}

pub fn store_with(storage: Arc<MemoryStorage>) -> Arc<MarkerStore> {
    let backend = Backend::new(storage, BACKEND_CONFIG.storage_key, Duration::ZERO);
    Arc::new(MarkerStore::new(backend))
}

pub fn new_marker(lat: f64, lng: f64, address: &str) -> NewMarker {
    NewMarker {
        lat,
        lng,
        address: address.to_string(),
    }
}

/// Marker lists of every document written to storage, in write order
pub fn persisted_marker_lists(storage: &MemoryStorage) -> Vec<Vec<Marker>> {
    storage
        .writes()
        .into_iter()
        .map(|(key, value)| {
            assert_eq!(key, BACKEND_CONFIG.storage_key);
            let mut document: serde_json::Value = serde_json::from_str(&value).unwrap();
            serde_json::from_value(document["markers"].take()).unwrap()
        })
        .collect()
}

pub async fn create_mock_geocoding_server() -> (mockito::ServerGuard, Arc<GeocodingClient>) {
    let server = mockito::Server::new_async().await;
    let client = GeocodingClient::new(server.url()).unwrap();
    (server, Arc::new(client))
}

pub async fn mock_search(server: &mut mockito::ServerGuard, query: &str, body: &str) -> mockito::Mock {
    server
        .mock("GET", "/search")
        .match_query(Matcher::UrlEncoded("q".into(), query.into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await
}

pub async fn mock_reverse(server: &mut mockito::ServerGuard, status: usize, body: &str) -> mockito::Mock {
    server
        .mock("GET", "/reverse")
        .match_query(Matcher::Any)
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await
}

pub fn red_square_search_body() -> String {
    serde_json::json!([
        {"lat": "55.7539303", "lon": "37.620795", "display_name": RED_SQUARE_ADDRESS},
        {"lat": "55.7536283", "lon": "37.6213796", "display_name": "Red Square, Moscow, Russia"}
    ])
    .to_string()
}
