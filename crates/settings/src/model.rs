//! Persisted user settings
//!
//! The record written to device storage under the `"Settings"` schema. Keys
//! are camelCase. Keys the current build does not know are ignored on load and
//! keys missing from an older record fall back to their defaults.

use serde::{Deserialize, Serialize};

/// User-configurable application settings
///
/// # Example
///
/// ```rust
/// use settings::Settings;
///
/// let settings = Settings::default().with_start_map_type("BingAerial");
/// assert_eq!(settings.start_map_type, "BingAerial");
/// assert_eq!(settings.start_map_zoom_level, 14);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Category preselected in the search view (`*` = all)
    pub start_search_category: String,

    /// Initial search radius in kilometers
    pub start_search_distance: f64,

    /// Map provider id shown on start (see the map type catalog)
    pub start_map_type: String,

    /// Initial map zoom level
    pub start_map_zoom_level: u8,

    /// Number of search results requested
    pub start_result_amount: u32,

    /// View opened after launch
    pub start_view: String,

    /// Password guarding the admin pages (empty = none)
    pub admin_password: String,

    /// Bypass the local tile and result caches
    pub disable_caching: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            start_search_category: "*".to_string(),
            start_search_distance: 1.0,
            start_map_type: "OSM".to_string(),
            start_map_zoom_level: 14,
            start_result_amount: 30,
            start_view: "homeView".to_string(),
            admin_password: String::new(),
            disable_caching: false,
        }
    }
}

impl Settings {
    /// Create settings with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the start search category
    pub fn with_start_search_category(mut self, category: impl Into<String>) -> Self {
        self.start_search_category = category.into();
        self
    }

    /// Set the start search distance in kilometers
    pub fn with_start_search_distance(mut self, km: f64) -> Self {
        self.start_search_distance = km;
        self
    }

    /// Set the start map type
    pub fn with_start_map_type(mut self, map_type: impl Into<String>) -> Self {
        self.start_map_type = map_type.into();
        self
    }

    /// Set the start zoom level
    pub fn with_start_map_zoom_level(mut self, zoom: u8) -> Self {
        self.start_map_zoom_level = zoom;
        self
    }

    /// Set the number of search results
    pub fn with_start_result_amount(mut self, amount: u32) -> Self {
        self.start_result_amount = amount;
        self
    }

    /// Set the start view
    pub fn with_start_view(mut self, view: impl Into<String>) -> Self {
        self.start_view = view.into();
        self
    }

    /// Set the admin password
    pub fn with_admin_password(mut self, password: impl Into<String>) -> Self {
        self.admin_password = password.into();
        self
    }

    /// Enable or disable caching
    pub fn with_disable_caching(mut self, disabled: bool) -> Self {
        self.disable_caching = disabled;
        self
    }

    /// Whether an admin password has been set
    pub fn has_admin_password(&self) -> bool {
        !self.admin_password.is_empty()
    }
}
