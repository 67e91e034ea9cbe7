//! Two-body reaction kinematics.
//!
//! A `Reaction` is built once from beam, target and fragment nuclides plus
//! the beam energy; the residual nuclide follows from charge and nucleon
//! conservation. Fragment and residual kinetic energies share one pair of
//! r/s factors, evaluated with the roles of the two outgoing bodies
//! swapped. All energies are MeV, angles are lab angles in degrees.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::physics::nuclide::Nuclide;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Reaction {
    beam: Nuclide,
    target: Nuclide,
    fragment: Nuclide,
    residual: Nuclide,
    beam_energy: f64,
    ground_q: f64,
}

impl Reaction {
    pub fn new(beam: Nuclide, target: Nuclide, fragment: Nuclide, beam_energy: f64) -> Result<Self> {
        if beam_energy <= 0.0 {
            return Err(Error::Validation(format!(
                "beam energy must be positive, got {} MeV",
                beam_energy
            )));
        }

        let in_charge = beam.charge() + target.charge();
        let in_nucleons = beam.nucleons() + target.nucleons();
        if fragment.charge() > in_charge || fragment.nucleons() > in_nucleons {
            return Err(Error::Configuration(format!(
                "fragment {} exceeds the {} + {} entrance channel",
                fragment, beam, target
            )));
        }
        let residual = Nuclide::new(in_charge - fragment.charge(), in_nucleons - fragment.nucleons())
            .map_err(|_| {
                Error::Configuration(format!(
                    "no valid residual for {} + {} -> {} + ?",
                    beam, target, fragment
                ))
            })?;

        // Fail on unknown isotopes here, not at first kinematics call.
        let ground_q = (beam.mass_excess()? + target.mass_excess()?)
            - (fragment.mass_excess()? + residual.mass_excess()?);

        Ok(Self {
            beam,
            target,
            fragment,
            residual,
            beam_energy,
            ground_q,
        })
    }

    pub fn beam(&self) -> Nuclide {
        self.beam
    }

    pub fn target(&self) -> Nuclide {
        self.target
    }

    pub fn fragment(&self) -> Nuclide {
        self.fragment
    }

    /// The nuclide left over by charge/nucleon conservation.
    pub fn residual(&self) -> Nuclide {
        self.residual
    }

    pub fn beam_energy(&self) -> f64 {
        self.beam_energy
    }

    pub fn is_elastic(&self) -> bool {
        self.beam == self.fragment
    }

    /// Q-value for a residual excited state (MeV).
    pub fn q_value(&self, residual_state: f64) -> f64 {
        self.ground_q - residual_state
    }

    /// Fragment kinetic energy for a residual excited state at a lab
    /// angle. Fails when the combination is kinematically forbidden.
    pub fn fragment_energy(&self, residual_state: f64, fragment_angle_deg: f64) -> Result<f64> {
        self.branch_energy(
            self.fragment.mass_mev(),
            self.residual.mass_mev(),
            fragment_angle_deg.to_radians(),
            residual_state,
            fragment_angle_deg,
        )
    }

    /// Residual (recoil) kinetic energy for the same event, evaluated at
    /// the recoil angle implied by the fragment angle.
    pub fn residual_energy(&self, residual_state: f64, fragment_angle_deg: f64) -> Result<f64> {
        let recoil_rad = self
            .residual_angle(residual_state, fragment_angle_deg)?
            .to_radians();
        self.branch_energy(
            self.residual.mass_mev(),
            self.fragment.mass_mev(),
            recoil_rad,
            residual_state,
            fragment_angle_deg,
        )
    }

    /// Lab recoil angle of the residual in degrees.
    pub fn residual_angle(&self, residual_state: f64, fragment_angle_deg: f64) -> Result<f64> {
        let fragment_energy = self.fragment_energy(residual_state, fragment_angle_deg)?;
        let theta = fragment_angle_deg.to_radians();
        let energy_relation = (self.beam.mass_mev() * self.beam_energy
            / (self.fragment.mass_mev() * fragment_energy))
            .sqrt();

        let recoil =
            std::f64::consts::FRAC_PI_2 - ((energy_relation - theta.cos()) / theta.sin()).atan();
        Ok(recoil.to_degrees())
    }

    /// Kinetic energy of one outgoing body from the shared r/s factors:
    /// E = (r + sqrt(r^2 + s))^2, positive root only.
    fn branch_energy(
        &self,
        instance_mass: f64,
        partner_mass: f64,
        angle_rad: f64,
        residual_state: f64,
        angle_deg: f64,
    ) -> Result<f64> {
        let mass_sum = instance_mass + partner_mass;
        let r = (self.beam.mass_mev() * instance_mass * self.beam_energy).sqrt() * angle_rad.cos()
            / mass_sum;
        let s = (self.beam_energy * (partner_mass - self.beam.mass_mev())
            + partner_mass * self.q_value(residual_state))
            / mass_sum;

        let discriminant = r * r + s;
        if discriminant < 0.0 {
            return Err(Error::Forbidden {
                state_mev: residual_state,
                angle_deg,
            });
        }
        Ok((r + discriminant.sqrt()).powi(2))
    }
}

impl std::fmt::Display for Reaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}({},{}){} at {} MeV",
            self.target, self.beam, self.fragment, self.residual, self.beam_energy
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nuclide(z: u32, a: u32) -> Nuclide {
        Nuclide::new(z, a).unwrap()
    }

    // d + 7Li -> t + 6Li
    fn pickup() -> Reaction {
        Reaction::new(nuclide(1, 2), nuclide(3, 7), nuclide(1, 3), 14.5).unwrap()
    }

    #[test]
    fn test_residual_conservation() {
        let reaction = pickup();
        assert_eq!(reaction.residual(), nuclide(3, 6));
    }

    #[test]
    fn test_elastic_q_is_zero() {
        // d + 7Li -> d + 7Li: identical mass excesses on both sides.
        let elastic = Reaction::new(nuclide(1, 2), nuclide(3, 7), nuclide(1, 2), 14.5).unwrap();
        assert!(elastic.is_elastic());
        assert_eq!(elastic.residual(), nuclide(3, 7));
        assert!(elastic.q_value(0.0).abs() < 1e-12);
    }

    #[test]
    fn test_ground_state_q_value() {
        let reaction = pickup();
        let expected = (13.1357 + 14.9071) - (14.9498 + 14.0869);
        assert!((reaction.q_value(0.0) - expected).abs() < 1e-9);
        assert!((reaction.q_value(2.186) - (expected - 2.186)).abs() < 1e-9);
    }

    #[test]
    fn test_excited_state_lowers_fragment_energy() {
        let reaction = pickup();
        let ground = reaction.fragment_energy(0.0, 15.0).unwrap();
        let excited = reaction.fragment_energy(2.186, 15.0).unwrap();
        assert!(ground > excited);
        assert!(excited > 0.0);
    }

    #[test]
    fn test_forbidden_combination() {
        // Strongly endothermic at low beam energy and 90 degrees: the
        // discriminant goes negative.
        let reaction = Reaction::new(nuclide(1, 2), nuclide(3, 7), nuclide(1, 3), 1.0).unwrap();
        let result = reaction.fragment_energy(5.366, 90.0);
        assert!(matches!(result, Err(Error::Forbidden { .. })));
    }

    #[test]
    fn test_recoil_angle_in_range() {
        let reaction = pickup();
        let recoil = reaction.residual_angle(0.0, 15.0).unwrap();
        assert!(recoil > 0.0 && recoil < 180.0);
    }

    #[test]
    fn test_energy_balance_with_q() {
        // Outgoing kinetic energy exceeds the beam energy by the (positive
        // part of) Q; for this endothermic reaction it falls short.
        let reaction = pickup();
        let fragment = reaction.fragment_energy(0.0, 15.0).unwrap();
        let residual = reaction.residual_energy(0.0, 15.0).unwrap();
        let total = fragment + residual;
        let expected = reaction.beam_energy() + reaction.q_value(0.0);
        assert!((total - expected).abs() / expected < 0.05);
    }

    #[test]
    fn test_nonpositive_beam_energy_rejected() {
        let result = Reaction::new(nuclide(1, 2), nuclide(3, 7), nuclide(1, 3), 0.0);
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_impossible_fragment_rejected() {
        let result = Reaction::new(nuclide(1, 2), nuclide(3, 7), nuclide(6, 12), 14.5);
        assert!(matches!(result, Err(Error::Configuration(_))));
    }
}
