//! Messpunkte und abgeschlossene Distanzmessungen.

use super::element::ElementId;
use super::geo::{self, GeoPoint};
use glam::DVec2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Position eines Messpunkts: Screen-Koordinate oder geografische Koordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "space", rename_all = "camelCase")]
pub enum PointPosition {
    /// Screen-Pixel (planare Distanz × Einheiten pro Pixel)
    Screen {
        /// Pixel-Koordinate
        position: DVec2,
    },
    /// Breiten-/Längengrad (Großkreis-Distanz)
    Geo {
        /// Geografische Koordinate
        position: GeoPoint,
    },
}

impl PointPosition {
    /// Prüft Endlichkeit und Wertebereich der Koordinaten.
    pub fn is_valid(&self) -> bool {
        match self {
            PointPosition::Screen { position } => position.is_finite(),
            PointPosition::Geo { position } => position.is_valid(),
        }
    }
}

/// Ein gesetzter Messpunkt, optional an ein Element gebunden.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeasurementPoint {
    /// Position des Punkts
    pub position: PointPosition,
    /// Element unter dem Punkt (falls auf ein Element geklickt wurde)
    pub element: Option<ElementId>,
}

impl MeasurementPoint {
    /// Messpunkt in Screen-Koordinaten.
    pub fn screen(x: f64, y: f64) -> Self {
        Self {
            position: PointPosition::Screen {
                position: DVec2::new(x, y),
            },
            element: None,
        }
    }

    /// Messpunkt in geografischen Koordinaten.
    pub fn geo(lat: f64, lon: f64) -> Self {
        Self {
            position: PointPosition::Geo {
                position: GeoPoint::new(lat, lon),
            },
            element: None,
        }
    }

    /// Bindet den Punkt an ein Element.
    pub fn with_element(mut self, element: ElementId) -> Self {
        self.element = Some(element);
        self
    }
}

/// Einheit einer Distanz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MeasurementUnit {
    /// Meter
    #[default]
    Meters,
    /// Kilometer
    Kilometers,
    /// Unskalierte Pixel
    Pixels,
}

impl MeasurementUnit {
    /// Kurzsymbol für die Anzeige
    pub fn symbol(self) -> &'static str {
        match self {
            MeasurementUnit::Meters => "m",
            MeasurementUnit::Kilometers => "km",
            MeasurementUnit::Pixels => "px",
        }
    }
}

/// Eine abgeschlossene Zwei-Punkt-Messung.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Startpunkt
    pub source_point: PointPosition,
    /// Endpunkt
    pub target_point: PointPosition,
    /// Element am Startpunkt
    pub source_element: Option<ElementId>,
    /// Element am Endpunkt
    pub target_element: Option<ElementId>,
    /// Gemessene Distanz in `unit`
    pub distance: f64,
    /// Einheit der Distanz
    pub unit: MeasurementUnit,
}

impl Measurement {
    /// Berechnet die Messung aus zwei Punkten.
    ///
    /// Gibt `None` zurück, wenn die Punkte in unterschiedlichen Koordinatenräumen liegen.
    pub fn between(
        source: &MeasurementPoint,
        target: &MeasurementPoint,
        units_per_pixel: f64,
        screen_unit: MeasurementUnit,
    ) -> Option<Self> {
        let (distance, unit) = match (source.position, target.position) {
            (PointPosition::Screen { position: a }, PointPosition::Screen { position: b }) => {
                (geo::planar_distance(a, b, units_per_pixel), screen_unit)
            }
            (PointPosition::Geo { position: a }, PointPosition::Geo { position: b }) => {
                (geo::haversine_km(a, b), MeasurementUnit::Kilometers)
            }
            _ => return None,
        };

        Some(Self {
            source_point: source.position,
            target_point: target.position,
            source_element: source.element,
            target_element: target.element,
            distance,
            unit,
        })
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} {}", self.distance, self.unit.symbol())
    }
}
