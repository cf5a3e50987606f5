//! Geografische Koordinaten und Distanzberechnung.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Mittlerer Erdradius in Kilometern (für Haversine).
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Geografischer Punkt in Grad (WGS84).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Breitengrad in Grad (-90 … 90)
    pub lat: f64,
    /// Längengrad in Grad (-180 … 180)
    pub lon: f64,
}

impl GeoPoint {
    /// Erstellt einen neuen Punkt
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Prüft, ob beide Koordinaten endlich und im gültigen Wertebereich liegen.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

/// Rechteckiger Kartenausschnitt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    /// Süd-West-Ecke
    pub south_west: GeoPoint,
    /// Nord-Ost-Ecke
    pub north_east: GeoPoint,
}

/// Großkreis-Distanz zwischen zwei Punkten in Kilometern (Haversine).
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    // Rundungsfehler bei antipodalen Punkten abfangen
    let c = 2.0 * h.sqrt().min(1.0).asin();
    EARTH_RADIUS_KM * c
}

/// Planare Distanz zwischen zwei Screen-Punkten, skaliert mit Einheiten pro Pixel.
pub fn planar_distance(a: DVec2, b: DVec2, units_per_pixel: f64) -> f64 {
    a.distance(b) * units_per_pixel
}
