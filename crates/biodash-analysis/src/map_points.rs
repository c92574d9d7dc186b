//! Map points for records with usable coordinates

use crate::taxonomy::StatusTaxonomy;
use biodash_common::Record;
use serde::Serialize;

/// Points emitted when no limit is given.
pub const DEFAULT_MAX_POINTS: usize = 5000;
pub const MIN_MAX_POINTS: usize = 100;
pub const MAX_MAX_POINTS: usize = 20_000;

/// Clamp a requested point limit; zero or absent means the default.
pub fn clamp_max_points(requested: Option<usize>) -> usize {
    match requested {
        None | Some(0) => DEFAULT_MAX_POINTS,
        Some(n) => n.clamp(MIN_MAX_POINTS, MAX_MAX_POINTS),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapPoint {
    pub lat: f64,
    pub lon: f64,
    pub name: String,
    pub scientific: String,
    pub class: String,
    pub date: String,
    pub provider: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Bounding box of the emitted points
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl Bounds {
    fn point(lat: f64, lon: f64) -> Self {
        Self {
            min_lat: lat,
            min_lon: lon,
            max_lat: lat,
            max_lon: lon,
        }
    }

    fn extend(&mut self, lat: f64, lon: f64) {
        self.min_lat = self.min_lat.min(lat);
        self.min_lon = self.min_lon.min(lon);
        self.max_lat = self.max_lat.max(lat);
        self.max_lon = self.max_lon.max(lon);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MapPoints {
    pub points: Vec<MapPoint>,
    pub bounds: Option<Bounds>,
    /// True when the limit stopped the scan early
    pub truncated: bool,
}

/// Points for the first `max_points` records with valid coordinates, in
/// record order. `max_points` is clamped with [`clamp_max_points`].
pub fn map_points(records: &[Record], taxonomy: Option<&StatusTaxonomy>, max_points: usize) -> MapPoints {
    let limit = clamp_max_points(Some(max_points));
    let mut out = MapPoints::default();

    for record in records {
        let Some((lat, lon)) = record.coordinates() else {
            continue;
        };
        if out.points.len() == limit {
            out.truncated = true;
            break;
        }

        match out.bounds.as_mut() {
            Some(bounds) => bounds.extend(lat, lon),
            None => out.bounds = Some(Bounds::point(lat, lon)),
        }

        out.points.push(MapPoint {
            lat,
            lon,
            name: record.species_display.clone(),
            scientific: record.scientific_name.clone(),
            class: record.class_label().to_string(),
            date: record.event_date_str.clone(),
            provider: record.provider.clone(),
            status: taxonomy.and_then(|t| t.status_for(record)).map(str::to_string),
        });
    }

    out
}
