//! Geographic primitives shared by the editing core and the host.
//!
//! - [`LatLng`]: a plain latitude/longitude value
//! - [`Coordinate`]: a `LatLng` with a stable identity, mutated in place
//! - [`CoordinateSequence`]: an ordered ring or path of coordinates
//! - [`predicates`]: screen-space hit tests used for picking

pub mod predicates;

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::constants::EARTH_RADIUS_METERS;

static NEXT_COORD_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_SEQUENCE_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Great-circle distance in meters (haversine).
    pub fn distance_to(&self, other: LatLng) -> f64 {
        let rad = std::f64::consts::PI / 180.0;
        let lat1 = self.lat * rad;
        let lat2 = other.lat * rad;
        let sin_d_lat = ((other.lat - self.lat) * rad / 2.0).sin();
        let sin_d_lng = ((other.lng - self.lng) * rad / 2.0).sin();
        let a = sin_d_lat * sin_d_lat + lat1.cos() * lat2.cos() * sin_d_lng * sin_d_lng;
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_METERS * c
    }
}

/// Stable identity of a [`Coordinate`]. Survives inserts and deletes around it,
/// which is what vertex handles key on instead of an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CoordId(u64);

impl CoordId {
    fn next() -> Self {
        Self(NEXT_COORD_ID.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SequenceId(u64);

impl SequenceId {
    fn next() -> Self {
        Self(NEXT_SEQUENCE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    id: CoordId,
    latlng: LatLng,
}

impl Coordinate {
    pub fn new(latlng: LatLng) -> Self {
        Self {
            id: CoordId::next(),
            latlng,
        }
    }

    pub fn id(&self) -> CoordId {
        self.id
    }

    pub fn latlng(&self) -> LatLng {
        self.latlng
    }

    /// Move the coordinate without changing its identity.
    pub fn update(&mut self, latlng: LatLng) {
        self.latlng = latlng;
    }

    /// A copy at the same position with a fresh identity.
    pub fn duplicate(&self) -> Self {
        Self::new(self.latlng)
    }
}

impl From<LatLng> for Coordinate {
    fn from(latlng: LatLng) -> Self {
        Self::new(latlng)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateSequence {
    id: SequenceId,
    coords: Vec<Coordinate>,
}

impl Default for CoordinateSequence {
    fn default() -> Self {
        Self::new()
    }
}

impl CoordinateSequence {
    pub fn new() -> Self {
        Self {
            id: SequenceId::next(),
            coords: Vec::new(),
        }
    }

    pub fn from_latlngs(latlngs: impl IntoIterator<Item = LatLng>) -> Self {
        Self {
            id: SequenceId::next(),
            coords: latlngs.into_iter().map(Coordinate::new).collect(),
        }
    }

    pub fn from_coords(coords: Vec<Coordinate>) -> Self {
        Self {
            id: SequenceId::next(),
            coords,
        }
    }

    pub fn id(&self) -> SequenceId {
        self.id
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// Current position of a coordinate, found by identity.
    pub fn index_of(&self, id: CoordId) -> Option<usize> {
        self.coords.iter().position(|c| c.id == id)
    }

    pub fn contains(&self, id: CoordId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn get(&self, index: usize) -> Option<&Coordinate> {
        self.coords.get(index)
    }

    pub fn coord(&self, id: CoordId) -> Option<&Coordinate> {
        self.coords.iter().find(|c| c.id == id)
    }

    pub fn coord_mut(&mut self, id: CoordId) -> Option<&mut Coordinate> {
        self.coords.iter_mut().find(|c| c.id == id)
    }

    pub fn first(&self) -> Option<&Coordinate> {
        self.coords.first()
    }

    pub fn last(&self) -> Option<&Coordinate> {
        self.coords.last()
    }

    pub fn push(&mut self, coord: Coordinate) {
        self.coords.push(coord);
    }

    pub fn push_front(&mut self, coord: Coordinate) {
        self.coords.insert(0, coord);
    }

    /// Insert at `index`, clamped to the end of the sequence.
    pub fn insert(&mut self, index: usize, coord: Coordinate) {
        let index = index.min(self.coords.len());
        self.coords.insert(index, coord);
    }

    /// Remove a coordinate by identity, returning its former index.
    pub fn remove(&mut self, id: CoordId) -> Option<(usize, Coordinate)> {
        let index = self.index_of(id)?;
        Some((index, self.coords.remove(index)))
    }

    /// Keep `[0..=index]` and return a copy of `[index..]` with fresh
    /// identities, so the split vertex exists in both halves.
    pub fn split_at_vertex(&mut self, index: usize) -> Vec<Coordinate> {
        let tail = self.coords[index..]
            .iter()
            .map(Coordinate::duplicate)
            .collect();
        self.coords.truncate(index + 1);
        tail
    }

    pub fn iter(&self) -> impl Iterator<Item = &Coordinate> {
        self.coords.iter()
    }

    pub fn ids(&self) -> Vec<CoordId> {
        self.coords.iter().map(|c| c.id).collect()
    }

    pub fn latlngs(&self) -> Vec<LatLng> {
        self.coords.iter().map(|c| c.latlng).collect()
    }
}
