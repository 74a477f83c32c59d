use nalgebra::Vector3;

use crate::periodic_table::ElementType;

/// Conversion factor from Ångström, the unit molecules are described in, to bohr.
pub const ANGSTROM_TO_BOHR: f64 = 1.0 / 0.52917721092;

/// Represents an atom in a molecule. Positions are in Ångström.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Atom {
    pub(crate) position: Vector3<f64>,
    pub(crate) element_type: ElementType,
}

impl Atom {
    pub fn new(element_type: ElementType, position: Vector3<f64>) -> Self {
        Self {
            position,
            element_type,
        }
    }

    /// Returns the charge of this nucleus
    pub fn nuclear_charge(&self) -> i32 {
        self.element_type as i32
    }

    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    pub fn symbol(&self) -> &'static str {
        self.element_type.symbol()
    }

    pub fn position(&self) -> &Vector3<f64> {
        &self.position
    }

    /// The position in atomic units
    pub(crate) fn position_bohr(&self) -> Vector3<f64> {
        self.position * ANGSTROM_TO_BOHR
    }

    /// The same element at a different position.
    pub fn moved_to(&self, position: Vector3<f64>) -> Self {
        Self { position, ..*self }
    }
}
