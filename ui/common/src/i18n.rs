//! Message catalog for translatable error codes.

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Locale {
    #[default]
    En,
    Ru,
}

impl Locale {
    pub fn from_tag(tag: &str) -> Self {
        match tag.split(['-', '_']).next().map(|s| s.to_ascii_lowercase()) {
            Some(lang) if lang == "ru" => Locale::Ru,
            _ => Locale::En,
        }
    }
}

const EN: &[(&str, &str)] = &[
    ("errors.addressNotFound", "Address not found"),
    ("errors.failedToGetAddress", "Failed to get address"),
    ("errors.locationNotFound", "Location not found"),
    ("errors.failedToFindLocation", "Failed to find location"),
];

const RU: &[(&str, &str)] = &[
    ("errors.addressNotFound", "Адрес не найден"),
    ("errors.failedToGetAddress", "Не удалось получить адрес"),
    ("errors.locationNotFound", "Место не найдено"),
    ("errors.failedToFindLocation", "Не удалось найти место"),
];

/// Looks up `key` in the catalog of `locale`.
/// Unknown keys are returned as is.
pub fn translate(locale: Locale, key: &str) -> String {
    let catalog = match locale {
        Locale::En => EN,
        Locale::Ru => RU,
    };

    match catalog.iter().find(|(k, _)| *k == key) {
        Some((_, message)) => message.to_string(),
        None => {
            log::debug!("No translation for `{key}` in {locale:?}");
            key.to_string()
        }
    }
}

#[test]
fn test_translate() {
    assert_eq!(translate(Locale::En, "errors.locationNotFound"), "Location not found");
    assert_eq!(translate(Locale::Ru, "errors.addressNotFound"), "Адрес не найден");
    assert_eq!(translate(Locale::En, "errors.nope"), "errors.nope");
}

#[test]
fn test_locale_from_tag() {
    assert_eq!(Locale::from_tag("ru-RU"), Locale::Ru);
    assert_eq!(Locale::from_tag("RU"), Locale::Ru);
    assert_eq!(Locale::from_tag("en_US"), Locale::En);
    assert_eq!(Locale::from_tag(""), Locale::En);
}
