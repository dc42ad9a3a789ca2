/// Route prefix of the map page, `/map/<marker id>` deep-links to a marker
pub const MAP_ROUTE: &str = "/map";

pub trait Navigator {
    fn push(&mut self, path: String);
}

pub fn marker_path(id: &str) -> String {
    format!("{MAP_ROUTE}/{id}")
}

/// Returns the marker id carried by a map route, `None` for `/map` itself or
/// any other route.
pub fn parse_marker_path(path: &str) -> Option<String> {
    let rest = path.strip_prefix(MAP_ROUTE)?;
    let id = rest.strip_prefix('/')?.trim_end_matches('/');
    if id.is_empty() || id.contains('/') {
        None
    } else {
        Some(id.to_string())
    }
}

/// Navigator keeping the visited paths in memory.
#[derive(Debug, Default, Clone)]
pub struct History {
    entries: Vec<String>,
}

impl History {
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn current(&self) -> Option<&str> {
        self.entries.last().map(String::as_str)
    }
}

impl Navigator for History {
    fn push(&mut self, path: String) {
        log::debug!("Navigating to {path}");
        self.entries.push(path);
    }
}

#[test]
fn test_marker_path() {
    assert_eq!(marker_path("42"), "/map/42");
    assert_eq!(parse_marker_path("/map/42"), Some("42".into()));
    assert_eq!(parse_marker_path("/map/42/"), Some("42".into()));
    assert_eq!(parse_marker_path("/map"), None);
    assert_eq!(parse_marker_path("/map/"), None);
    assert_eq!(parse_marker_path("/about"), None);
    assert_eq!(parse_marker_path("/mapping/42"), None);
}
