//! Static nuclide data: mass excesses, excited-state energies, and the
//! element-symbol table.
//!
//! Coverage is hydrogen through neon. Mass excesses are in MeV (AME
//! values); excited-state lists are ordered ascending and start at the
//! ground state (0.0). An isotope may be known to the mass table while
//! carrying no tabulated excited states: that is an empty list, not an
//! error, and kinematics over such a residual is limited to the ground
//! state.

/// Mass excess in MeV for (charge, nucleons), if tabulated.
pub fn mass_excess(charge: u32, nucleons: u32) -> Option<f64> {
    let value = match (charge, nucleons) {
        (1, 1) => 7.28900,
        (1, 2) => 13.1357,
        (1, 3) => 14.9498,
        (2, 3) => 14.9312,
        (2, 4) => 2.42490,
        (3, 6) => 14.0869,
        (3, 7) => 14.9071,
        (3, 8) => 20.9458,
        (4, 8) => 4.94170,
        (4, 9) => 11.3485,
        (4, 10) => 12.6075,
        (4, 11) => 20.1772,
        (5, 8) => 22.9216,
        (5, 10) => 12.0506,
        (5, 11) => 8.66770,
        (5, 12) => 13.3694,
        (6, 11) => 10.6494,
        (6, 12) => 0.00000,
        (6, 13) => 3.12500,
        (6, 14) => 3.01990,
        (7, 13) => 5.34550,
        (7, 14) => 2.86340,
        (7, 15) => 0.10140,
        (7, 16) => 5.68390,
        (8, 14) => 8.00780,
        (8, 15) => 2.85560,
        (8, 16) => -4.7370,
        (8, 17) => -0.8088,
        (8, 18) => -0.7828,
        (8, 19) => 3.3329,
        (9, 17) => 1.95170,
        (9, 18) => 0.87310,
        (9, 19) => -1.4874,
        (9, 20) => -0.0175,
        (9, 21) => -0.0476,
        (9, 22) => 2.7934,
        (10, 19) => 1.75210,
        (10, 20) => -0.7419,
        (10, 21) => -5.7318,
        (10, 22) => -8.0247,
        (10, 23) => -5.1540,
        _ => return None,
    };
    Some(value)
}

const GROUND_ONLY: &[f64] = &[0.0];
const HE_4: &[f64] = &[0.0, 23.64, 24.25, 25.95, 27.42];
const LI_6: &[f64] = &[0.0, 2.186, 3.563, 4.312, 5.366, 5.65];
const LI_7: &[f64] = &[0.0, 0.478, 4.63, 6.68, 7.46, 9.67];
const LI_8: &[f64] = &[0.0, 0.981, 2.255, 3.21, 5.4, 6.53];
const BE_8: &[f64] = &[0.0, 3.03, 11.35, 16.626, 16.922, 17.64];
const BE_9: &[f64] = &[0.0, 1.684, 2.429, 3.049, 4.704, 6.38, 11.282];
const BE_10: &[f64] = &[0.0, 3.368, 5.958, 6.179, 6.263, 7.371, 7.542];
const BE_11: &[f64] = &[0.0, 0.320, 1.783, 2.654, 3.400, 3.889, 3.955];
const B_8: &[f64] = &[0.0, 0.769, 2.320, 3.500, 10.619];
const B_10: &[f64] = &[0.0, 0.718, 1.74, 2.154, 3.587, 4.774, 5.11];
const B_11: &[f64] = &[0.0, 2.125, 4.445, 5.02, 6.742, 6.792, 7.286];
const B_12: &[f64] = &[0.0, 0.953, 1.674, 2.621, 2.723, 3.389, 3.76, 4.302];
const C_11: &[f64] = &[0.0, 2.0, 4.319, 4.804, 6.34, 6.478, 6.905];
const C_12: &[f64] = &[0.0, 4.444, 7.654, 9.641, 10.847, 11.836];
const C_13: &[f64] = &[0.0, 3.089, 3.684, 3.854, 6.864, 7.492, 7.547];
const C_14: &[f64] = &[0.0, 6.094, 6.589, 6.728, 6.903, 7.012, 7.341];
const NONE_TABULATED: &[f64] = &[];

/// Excited-state energies in MeV for (charge, nucleons), ascending,
/// ground state first. `None` means the isotope itself is unknown.
pub fn excited_states(charge: u32, nucleons: u32) -> Option<&'static [f64]> {
    let states = match (charge, nucleons) {
        (1, 1) | (1, 2) | (1, 3) | (2, 3) => GROUND_ONLY,
        (2, 4) => HE_4,
        (3, 6) => LI_6,
        (3, 7) => LI_7,
        (3, 8) => LI_8,
        (4, 8) => BE_8,
        (4, 9) => BE_9,
        (4, 10) => BE_10,
        (4, 11) => BE_11,
        (5, 8) => B_8,
        (5, 10) => B_10,
        (5, 11) => B_11,
        (5, 12) => B_12,
        (6, 11) => C_11,
        (6, 12) => C_12,
        (6, 13) => C_13,
        (6, 14) => C_14,
        (7, 13) | (7, 14) | (7, 15) | (7, 16) => NONE_TABULATED,
        (8, 14) | (8, 15) | (8, 16) | (8, 17) | (8, 18) | (8, 19) => NONE_TABULATED,
        (9, 17) | (9, 18) | (9, 19) | (9, 20) | (9, 21) | (9, 22) => NONE_TABULATED,
        (10, 19) | (10, 20) | (10, 21) | (10, 22) | (10, 23) => NONE_TABULATED,
        _ => return None,
    };
    Some(states)
}

/// Charge number for an element symbol (case-insensitive).
pub fn charge_for_symbol(symbol: &str) -> Option<u32> {
    let charge = match symbol.to_ascii_lowercase().as_str() {
        "h" => 1,
        "he" => 2,
        "li" => 3,
        "be" => 4,
        "b" => 5,
        "c" => 6,
        "n" => 7,
        "o" => 8,
        "f" => 9,
        "ne" => 10,
        _ => return None,
    };
    Some(charge)
}

/// Element symbol for a charge number, if within the tabulated range.
pub fn symbol_for_charge(charge: u32) -> Option<&'static str> {
    let symbol = match charge {
        1 => "H",
        2 => "He",
        3 => "Li",
        4 => "Be",
        5 => "B",
        6 => "C",
        7 => "N",
        8 => "O",
        9 => "F",
        10 => "Ne",
        _ => return None,
    };
    Some(symbol)
}
