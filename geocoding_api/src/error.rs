/// Errors that carry a stable message key, so a presentation layer can show
/// them in the user's language instead of the raw `Display` text.
pub trait Translatable {
    fn translation_key(&self) -> Option<&'static str>;
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeocodingError {
    #[error("Address not found")]
    AddressNotFound,
    #[error("Failed to get address")]
    FailedToGetAddress,
    #[error("Location not found")]
    LocationNotFound,
    #[error("Failed to find location")]
    FailedToFindLocation,
}

impl GeocodingError {
    pub fn code(&self) -> &'static str {
        match self {
            GeocodingError::AddressNotFound => "errors.addressNotFound",
            GeocodingError::FailedToGetAddress => "errors.failedToGetAddress",
            GeocodingError::LocationNotFound => "errors.locationNotFound",
            GeocodingError::FailedToFindLocation => "errors.failedToFindLocation",
        }
    }
}

impl Translatable for GeocodingError {
    fn translation_key(&self) -> Option<&'static str> {
        Some(self.code())
    }
}
