//! The standard security properties.
//!
//! Requirement types form an open set; these are the three every model
//! starts from.

use crate::requirement::RequirementType;

/// Name of the secrecy property.
pub const SECRECY: &str = "secrecy";
/// Name of the integrity property.
pub const INTEGRITY: &str = "integrity";
/// Name of the availability property.
pub const AVAILABILITY: &str = "availability";

/// Only intended parties learn the data.
pub fn secrecy() -> RequirementType {
    RequirementType::new(SECRECY)
}

/// Nobody can alter the data undetected.
pub fn integrity() -> RequirementType {
    RequirementType::new(INTEGRITY)
}

/// The data reaches its consumer when needed.
pub fn availability() -> RequirementType {
    RequirementType::new(AVAILABILITY)
}

/// All three standard properties.
pub fn cia() -> [RequirementType; 3] {
    [secrecy(), integrity(), availability()]
}
