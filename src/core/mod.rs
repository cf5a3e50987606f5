//! Core-Domänentypen: Layer, Netzelemente, Geokoordinaten und Messungen.
//!
//! Enthält reine Werttypen ohne Abhängigkeit zum Application-Layer.

pub mod element;
pub mod geo;
pub mod layer;
pub mod measurement;

pub use element::{
    Connection, ConnectionId, ElementId, ElementPreview, EntityRef, MapElement,
};
pub use geo::{haversine_km, planar_distance, GeoBounds, GeoPoint, EARTH_RADIUS_KM};
pub use layer::{CustomLayer, LayerCategory, LayerRef};
pub use measurement::{Measurement, MeasurementPoint, MeasurementUnit, PointPosition};
