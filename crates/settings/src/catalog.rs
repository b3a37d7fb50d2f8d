//! Selectable values for each setting
//!
//! Catalogs drive the selection controls of the settings screen. They are
//! fixed tables compiled into the binary, rebuilt on every load and never
//! written to storage.

use crate::model::Settings;

/// One selectable `(id, display name)` pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnumOption<T> {
    /// Value stored in the matching setting
    pub id: T,
    /// Label shown to the user
    pub name: &'static str,
}

impl<T> EnumOption<T> {
    const fn new(id: T, name: &'static str) -> Self {
        Self { id, name }
    }
}

// Start view that is valid without being offered in the view catalog
const HOME_VIEW: &str = "homeView";

const MAP_TYPES: [EnumOption<&str>; 6] = [
    EnumOption::new("OSM", "OpenStreetMap"),
    EnumOption::new("WMS:std0:norges_grunnkart", "Norges grunnkart"),
    EnumOption::new("WMS:std0:topo2", "Topologisk"),
    EnumOption::new("BingRoad", "Bing Road"),
    EnumOption::new("BingHybrid", "Bing Hybrid"),
    EnumOption::new("BingAerial", "Bing Aerial"),
];

// Ids 16-18 are not selectable: their labels map onto zoom level 15.
const ZOOM_LEVELS: [EnumOption<u8>; 12] = [
    EnumOption::new(7, "7 (country)"),
    EnumOption::new(8, "8"),
    EnumOption::new(9, "9"),
    EnumOption::new(10, "10"),
    EnumOption::new(11, "11"),
    EnumOption::new(12, "12"),
    EnumOption::new(13, "13 (city)"),
    EnumOption::new(14, "14"),
    EnumOption::new(15, "15"),
    EnumOption::new(15, "16"),
    EnumOption::new(15, "17"),
    EnumOption::new(15, "18 (street)"),
];

const SEARCH_DISTANCES: [EnumOption<f64>; 15] = [
    EnumOption::new(0.05, "50 meter"),
    EnumOption::new(0.1, "100 meter"),
    EnumOption::new(0.2, "200 meter"),
    EnumOption::new(0.3, "300 meter"),
    EnumOption::new(0.5, "500 meter"),
    EnumOption::new(0.75, "750 meter"),
    EnumOption::new(1.0, "1 km"),
    EnumOption::new(1.5, "1,5 km"),
    EnumOption::new(2.0, "2 km"),
    EnumOption::new(3.0, "3 km"),
    EnumOption::new(5.0, "5 km"),
    EnumOption::new(10.0, "1 mil"),
    EnumOption::new(20.0, "2 mil"),
    EnumOption::new(50.0, "5 mil"),
    EnumOption::new(100.0, "10 mil"),
];

const RESULT_AMOUNTS: [EnumOption<u32>; 5] = [
    EnumOption::new(10, "10"),
    EnumOption::new(25, "25"),
    EnumOption::new(50, "50"),
    EnumOption::new(75, "75"),
    EnumOption::new(100, "100"),
];

const VIEWS: [EnumOption<&str>; 2] = [
    EnumOption::new("mapView", "Map"),
    EnumOption::new("listView", "Search Result"),
];

/// All selection catalogs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalogs {
    /// Map providers
    pub map_types: Vec<EnumOption<&'static str>>,
    /// Zoom levels
    pub zoom_levels: Vec<EnumOption<u8>>,
    /// Search radii in kilometers
    pub search_distances: Vec<EnumOption<f64>>,
    /// Result counts
    pub result_amounts: Vec<EnumOption<u32>>,
    /// Start views
    pub views: Vec<EnumOption<&'static str>>,
}

impl Catalogs {
    /// Build the catalogs from the compiled-in tables
    pub fn build() -> Self {
        Self {
            map_types: MAP_TYPES.to_vec(),
            zoom_levels: ZOOM_LEVELS.to_vec(),
            search_distances: SEARCH_DISTANCES.to_vec(),
            result_amounts: RESULT_AMOUNTS.to_vec(),
            views: VIEWS.to_vec(),
        }
    }

    /// Whether no catalog has been populated yet
    pub fn is_empty(&self) -> bool {
        self.map_types.is_empty()
            && self.zoom_levels.is_empty()
            && self.search_distances.is_empty()
            && self.result_amounts.is_empty()
            && self.views.is_empty()
    }

    /// Display name of a map type id
    pub fn map_type_name(&self, id: &str) -> Option<&'static str> {
        self.map_types.iter().find(|o| o.id == id).map(|o| o.name)
    }

    /// Display name of a view id
    pub fn view_name(&self, id: &str) -> Option<&'static str> {
        self.views.iter().find(|o| o.id == id).map(|o| o.name)
    }

    /// Persisted names of the settings whose value is not offered by its catalog
    ///
    /// Advisory only: load and save accept any value. The search category has
    /// no catalog and is never reported.
    pub fn unlisted(&self, settings: &Settings) -> Vec<&'static str> {
        let mut unlisted = Vec::new();

        if !self.map_types.iter().any(|o| o.id == settings.start_map_type) {
            unlisted.push("startMapType");
        }
        if !self.zoom_levels.iter().any(|o| o.id == settings.start_map_zoom_level) {
            unlisted.push("startMapZoomLevel");
        }
        if !self
            .search_distances
            .iter()
            .any(|o| (o.id - settings.start_search_distance).abs() < f64::EPSILON)
        {
            unlisted.push("startSearchDistance");
        }
        if !self.result_amounts.iter().any(|o| o.id == settings.start_result_amount) {
            unlisted.push("startResultAmount");
        }
        if settings.start_view != HOME_VIEW && !self.views.iter().any(|o| o.id == settings.start_view)
        {
            unlisted.push("startView");
        }

        unlisted
    }
}
