use geocoding_api::{GeocodingError, Translatable};
use ui_common::i18n::{self, Locale};

use crate::backend::StorageError;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Geocoding(#[from] GeocodingError),
    #[error("{0}")]
    Unexpected(String),
}

impl Translatable for AppError {
    fn translation_key(&self) -> Option<&'static str> {
        match self {
            AppError::Geocoding(e) => e.translation_key(),
            AppError::Storage(_) | AppError::Unexpected(_) => None,
        }
    }
}

/// User facing text for an error: translated when the error is tagged,
/// the plain message otherwise.
pub fn user_message<E: Translatable + std::fmt::Display>(locale: Locale, error: &E) -> String {
    match error.translation_key() {
        Some(key) => i18n::translate(locale, key),
        None => error.to_string(),
    }
}

#[test]
fn test_user_message() {
    let err = AppError::from(GeocodingError::LocationNotFound);
    assert_eq!(user_message(Locale::En, &err), "Location not found");
    assert_eq!(user_message(Locale::Ru, &err), "Место не найдено");

    let err = AppError::Unexpected("No search result at index 3".into());
    assert_eq!(user_message(Locale::Ru, &err), "No search result at index 3");
}
