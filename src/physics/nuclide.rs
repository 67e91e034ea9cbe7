//! Nuclide value type.

use serde::{Deserialize, Serialize};

use crate::data::nuclides;
use crate::error::{Error, Result};

/// Free proton mass in MeV.
pub const PROTON_MASS_MEV: f64 = 938.27;
/// Free neutron mass in MeV.
pub const NEUTRON_MASS_MEV: f64 = 939.57;

/// An isotope identified by (charge, nucleon count).
///
/// Immutable after construction. The rest mass is a plain sum of free
/// nucleon masses with no binding-energy correction; mass excess and
/// excited states come from the static table and fail for isotopes
/// outside its coverage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Nuclide {
    charge: u32,
    nucleons: u32,
}

impl Nuclide {
    pub fn new(charge: u32, nucleons: u32) -> Result<Self> {
        if charge == 0 {
            return Err(Error::Validation("nuclide charge must be positive".into()));
        }
        if nucleons < charge {
            return Err(Error::Validation(format!(
                "nucleon count {} is below charge {}",
                nucleons, charge
            )));
        }
        Ok(Self { charge, nucleons })
    }

    pub fn charge(&self) -> u32 {
        self.charge
    }

    pub fn nucleons(&self) -> u32 {
        self.nucleons
    }

    /// Rest mass in MeV from the linear free-nucleon formula.
    pub fn mass_mev(&self) -> f64 {
        self.charge as f64 * PROTON_MASS_MEV
            + (self.nucleons - self.charge) as f64 * NEUTRON_MASS_MEV
    }

    /// Tabulated mass excess in MeV.
    pub fn mass_excess(&self) -> Result<f64> {
        nuclides::mass_excess(self.charge, self.nucleons)
            .ok_or_else(|| Error::Configuration(format!("unknown nuclide {}", self)))
    }

    /// Tabulated excited-state energies (MeV, ascending, ground state
    /// first). Empty for isotopes with no tabulated states.
    pub fn excited_states(&self) -> Result<&'static [f64]> {
        nuclides::excited_states(self.charge, self.nucleons)
            .ok_or_else(|| Error::Configuration(format!("unknown nuclide {}", self)))
    }
}

impl std::fmt::Display for Nuclide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match nuclides::symbol_for_charge(self.charge) {
            Some(symbol) => write!(f, "{}{}", self.nucleons, symbol),
            None => write!(f, "A={} Z={}", self.nucleons, self.charge),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_construction_rejected() {
        assert!(Nuclide::new(0, 1).is_err());
        assert!(Nuclide::new(3, 2).is_err());
    }

    #[test]
    fn test_mass_formula() {
        let he4 = Nuclide::new(2, 4).unwrap();
        let expected = 2.0 * PROTON_MASS_MEV + 2.0 * NEUTRON_MASS_MEV;
        assert!((he4.mass_mev() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_mass_monotonic() {
        // Linear in both directions: one more neutron, or one more
        // proton at fixed neutron count, always increases the mass.
        for z in 1..=9u32 {
            for a in z..=(2 * z) {
                let m = Nuclide::new(z, a).unwrap().mass_mev();
                let more_neutrons = Nuclide::new(z, a + 1).unwrap().mass_mev();
                let more_protons = Nuclide::new(z + 1, a + 1).unwrap().mass_mev();
                assert!(more_neutrons > m);
                assert!(more_protons > m);
            }
        }
    }

    #[test]
    fn test_unknown_isotope_errors() {
        let exotic = Nuclide::new(12, 24).unwrap();
        assert!(matches!(exotic.mass_excess(), Err(Error::Configuration(_))));
        assert!(matches!(exotic.excited_states(), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_display_symbol() {
        assert_eq!(Nuclide::new(3, 7).unwrap().to_string(), "7Li");
        assert_eq!(Nuclide::new(1, 2).unwrap().to_string(), "2H");
    }
}
