//! Assigns positions to hotspots by geodesic proximity.

use crate::model::Hotspot;
use crate::spatial::Coordinate;

/// Outcome of attributing one position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribution {
    Unattributed,
    /// Index into the hotspot slice. `ambiguous` is set when more than one
    /// center was within radius.
    Hotspot { index: usize, ambiguous: bool },
}

impl Attribution {
    pub fn index(&self) -> Option<usize> {
        match self {
            Attribution::Unattributed => None,
            Attribution::Hotspot { index, .. } => Some(*index),
        }
    }

    pub fn is_ambiguous(&self) -> bool {
        matches!(self, Attribution::Hotspot { ambiguous: true, .. })
    }
}

/// Matches positions against one bucket's hotspots.
pub struct Attributor<'a> {
    hotspots: &'a [Hotspot],
    radius_m: f64,
}

impl<'a> Attributor<'a> {
    pub fn new(hotspots: &'a [Hotspot], radius_m: f64) -> Self {
        Self { hotspots, radius_m }
    }

    /// Nearest hotspot whose center is within the radius.
    ///
    /// Equal distances resolve to the lower label.
    pub fn attribute(&self, at: &Coordinate) -> Attribution {
        let mut best: Option<(usize, f64)> = None;
        let mut candidates = 0;

        for (index, distance) in self.within_radius(at) {
            candidates += 1;
            let closer = match best {
                None => true,
                Some((best_index, best_distance)) => {
                    distance < best_distance
                        || (distance == best_distance
                            && self.hotspots[index].label < self.hotspots[best_index].label)
                }
            };
            if closer {
                best = Some((index, distance));
            }
        }

        match best {
            None => Attribution::Unattributed,
            Some((index, _)) => Attribution::Hotspot {
                index,
                ambiguous: candidates > 1,
            },
        }
    }

    /// Every hotspot within the radius of `at`, with its distance in meters.
    pub fn within_radius<'b>(
        &'b self,
        at: &'b Coordinate,
    ) -> impl Iterator<Item = (usize, f64)> + 'b {
        self.hotspots
            .iter()
            .enumerate()
            .map(move |(index, hotspot)| (index, hotspot.center.distance_m(at)))
            .filter(move |(_, distance)| *distance <= self.radius_m)
    }
}
