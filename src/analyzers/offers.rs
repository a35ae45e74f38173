use crate::analyzers::attribution::Attributor;
use crate::model::{Hotspot, Offer};
use std::collections::{HashMap, HashSet};

/// Counts distinct offer ids whose pickup lies within `radius_m` of each
/// hotspot. An offer near several hotspots counts for each of them.
pub fn count_offers(hotspots: &[Hotspot], offers: &[Offer], radius_m: f64) -> HashMap<String, usize> {
    let attributor = Attributor::new(hotspots, radius_m);
    let mut seen: Vec<HashSet<&str>> = vec![HashSet::new(); hotspots.len()];

    for offer in offers.iter().filter(|o| !o.offer_id.is_empty()) {
        for (index, _) in attributor.within_radius(&offer.pickup) {
            seen[index].insert(&offer.offer_id);
        }
    }

    hotspots
        .iter()
        .zip(seen)
        .filter(|(_, ids)| !ids.is_empty())
        .map(|(hotspot, ids)| (hotspot.label.clone(), ids.len()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::Coordinate;
    use chrono::{TimeZone, Utc};

    fn offer(id: &str, at: Coordinate) -> Offer {
        Offer {
            offer_id: id.to_string(),
            pickup: at,
            timestamp: Utc.with_ymd_and_hms(2024, 5, 2, 1, 0, 0).unwrap(),
        }
    }

    fn center() -> Coordinate {
        Coordinate::new(34.05, -118.25)
    }

    #[test]
    fn test_duplicate_offer_ids_count_once() {
        let hotspots = vec![Hotspot::new("A", center(), 1.0)];
        let offers = vec![
            offer("job-1", center()),
            offer("job-1", center()),
            offer("job-2", center()),
        ];

        let counts = count_offers(&hotspots, &offers, 400.0);
        assert_eq!(counts.get("A"), Some(&2));
    }

    #[test]
    fn test_offers_outside_radius_are_ignored() {
        let hotspots = vec![Hotspot::new("A", center(), 1.0)];
        let offers = vec![offer("job-1", Coordinate::new(34.06, -118.25))];

        let counts = count_offers(&hotspots, &offers, 400.0);
        assert!(counts.get("A").is_none());
    }

    #[test]
    fn test_offer_counts_toward_each_nearby_hotspot() {
        let hotspots = vec![
            Hotspot::new("A", center(), 1.0),
            Hotspot::new("B", Coordinate::new(34.051, -118.25), 1.0),
        ];
        let offers = vec![offer("job-1", Coordinate::new(34.0505, -118.25))];

        let counts = count_offers(&hotspots, &offers, 400.0);
        assert_eq!(counts.get("A"), Some(&1));
        assert_eq!(counts.get("B"), Some(&1));
    }

    #[test]
    fn test_empty_offer_id_is_skipped() {
        let hotspots = vec![Hotspot::new("A", center(), 1.0)];
        let offers = vec![offer("", center())];

        assert!(count_offers(&hotspots, &offers, 400.0).is_empty());
    }
}
