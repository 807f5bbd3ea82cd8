//! Enumerated vehicle classes and their detector class ids.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DetectionError;

/// Vehicle classes that can be counted.
///
/// Discriminant order is the display order used by count summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleClass {
    Car,
    Motorcycle,
    Bus,
    Truck,
}

impl VehicleClass {
    /// Every class, in display order.
    pub const ALL: [VehicleClass; 4] = [
        VehicleClass::Car,
        VehicleClass::Motorcycle,
        VehicleClass::Bus,
        VehicleClass::Truck,
    ];

    /// Look up a class by its COCO detector id (2 car, 3 motorcycle, 5 bus, 7 truck).
    pub fn from_class_id(class_id: usize) -> Option<Self> {
        match class_id {
            2 => Some(Self::Car),
            3 => Some(Self::Motorcycle),
            5 => Some(Self::Bus),
            7 => Some(Self::Truck),
            _ => None,
        }
    }

    /// The COCO detector id of this class.
    pub fn class_id(self) -> usize {
        match self {
            Self::Car => 2,
            Self::Motorcycle => 3,
            Self::Bus => 5,
            Self::Truck => 7,
        }
    }

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Car => "car",
            Self::Motorcycle => "motorcycle",
            Self::Bus => "bus",
            Self::Truck => "truck",
        }
    }
}

impl fmt::Display for VehicleClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<usize> for VehicleClass {
    type Error = DetectionError;

    fn try_from(class_id: usize) -> Result<Self, Self::Error> {
        Self::from_class_id(class_id).ok_or(DetectionError::UnknownClass(class_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_id_lookup() {
        for class in VehicleClass::ALL {
            assert_eq!(VehicleClass::from_class_id(class.class_id()), Some(class));
        }
        assert_eq!(VehicleClass::from_class_id(0), None); // person
        assert_eq!(VehicleClass::from_class_id(6), None); // train
    }

    #[test]
    fn test_try_from_unknown() {
        assert_eq!(
            VehicleClass::try_from(1),
            Err(DetectionError::UnknownClass(1))
        );
    }

    #[test]
    fn test_names() {
        assert_eq!(VehicleClass::Motorcycle.to_string(), "motorcycle");
        assert_eq!(VehicleClass::Truck.name(), "truck");
    }
}
