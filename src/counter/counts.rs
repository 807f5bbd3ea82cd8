use std::collections::BTreeMap;

use serde::Serialize;

use crate::counter::line::Direction;
use crate::vehicle::VehicleClass;

/// One row of a count summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CountRow {
    pub direction: Direction,
    pub class: VehicleClass,
    pub count: u64,
}

/// Per-direction, per-class crossing tallies.
///
/// Serializes as `{"up": {"car": 1, ...}, "down": {...}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VehicleCounts {
    up: BTreeMap<VehicleClass, u64>,
    down: BTreeMap<VehicleClass, u64>,
}

impl VehicleCounts {
    /// Counts with an explicit zero entry for every listed class.
    pub fn with_classes(classes: &[VehicleClass]) -> Self {
        let zeros: BTreeMap<VehicleClass, u64> = classes.iter().map(|&c| (c, 0)).collect();
        Self {
            up: zeros.clone(),
            down: zeros,
        }
    }

    fn table(&self, direction: Direction) -> &BTreeMap<VehicleClass, u64> {
        match direction {
            Direction::Up => &self.up,
            Direction::Down => &self.down,
        }
    }

    pub fn increment(&mut self, direction: Direction, class: VehicleClass) {
        let table = match direction {
            Direction::Up => &mut self.up,
            Direction::Down => &mut self.down,
        };
        *table.entry(class).or_insert(0) += 1;
    }

    pub fn get(&self, direction: Direction, class: VehicleClass) -> u64 {
        self.table(direction).get(&class).copied().unwrap_or(0)
    }

    pub fn total_for(&self, direction: Direction) -> u64 {
        self.table(direction).values().sum()
    }

    pub fn total(&self) -> u64 {
        Direction::ALL.iter().map(|&d| self.total_for(d)).sum()
    }

    /// Zero every tally, keeping the known classes.
    pub fn reset(&mut self) {
        self.up.values_mut().chain(self.down.values_mut()).for_each(|c| *c = 0);
    }

    /// All tallies, up before down, classes in display order.
    pub fn iter(&self) -> impl Iterator<Item = CountRow> + '_ {
        Direction::ALL.into_iter().flat_map(move |direction| {
            self.table(direction).iter().map(move |(&class, &count)| CountRow {
                direction,
                class,
                count,
            })
        })
    }

    /// Summary lines such as `"car up: 3"`, in display order.
    pub fn summary(&self) -> Vec<String> {
        self.iter()
            .map(|row| format!("{} {}: {}", row.class, row.direction, row.count))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_increment_and_totals() {
        let mut counts = VehicleCounts::with_classes(&VehicleClass::ALL);
        counts.increment(Direction::Down, VehicleClass::Car);
        counts.increment(Direction::Down, VehicleClass::Car);
        counts.increment(Direction::Up, VehicleClass::Truck);

        assert_eq!(counts.get(Direction::Down, VehicleClass::Car), 2);
        assert_eq!(counts.get(Direction::Up, VehicleClass::Car), 0);
        assert_eq!(counts.total_for(Direction::Down), 2);
        assert_eq!(counts.total(), 3);

        counts.reset();
        assert_eq!(counts.total(), 0);
        assert_eq!(counts.iter().count(), 8);
    }

    #[test]
    fn test_summary_order() {
        let mut counts = VehicleCounts::with_classes(&[VehicleClass::Bus, VehicleClass::Car]);
        counts.increment(Direction::Up, VehicleClass::Bus);
        assert_eq!(
            counts.summary(),
            vec!["car up: 0", "bus up: 1", "car down: 0", "bus down: 0"]
        );
    }

    #[test]
    fn test_serialize() {
        let mut counts = VehicleCounts::with_classes(&[VehicleClass::Car]);
        counts.increment(Direction::Down, VehicleClass::Car);
        let json = serde_json::to_string(&counts).unwrap();
        assert_eq!(json, r#"{"up":{"car":0},"down":{"car":1}}"#);
    }
}
