//! Reaction-notation parsing.
//!
//! Two textual grammars are accepted:
//!
//! - physicist style `A(B,C)D`: target(beam, fragment)residual
//! - chemist style `A + B -> C + D`: target + beam -> residual + fragment
//!
//! Whitespace is insignificant. An isotope token is a nucleon-count digit
//! run (leading or trailing) plus an element symbol; `p`, `d`, `t` are
//! shorthands for the hydrogen isotopes. The residual named in the text
//! must match the one derived by conservation.

use crate::data::nuclides;
use crate::error::{Error, Result};
use crate::physics::nuclide::Nuclide;
use crate::physics::reaction::Reaction;

/// Which grammar a piece of notation is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notation {
    /// `A(B,C)D`
    Physicist,
    /// `A + B -> C + D`
    Chemist,
    Unrecognized,
}

/// Classify a reaction string without parsing it.
pub fn classify(input: &str) -> Notation {
    if input.contains('(') && input.contains(')') {
        Notation::Physicist
    } else if input.contains("->") {
        Notation::Chemist
    } else {
        Notation::Unrecognized
    }
}

/// Parse reaction notation into a [`Reaction`] with the given beam energy.
pub fn parse(input: &str, beam_energy_mev: f64) -> Result<Reaction> {
    let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();

    let [beam, target, fragment, residual] = match classify(&compact) {
        Notation::Physicist => split_physicist(&compact)?,
        Notation::Chemist => split_chemist(&compact)?,
        Notation::Unrecognized => {
            return Err(Error::Configuration(format!(
                "unrecognized reaction notation: {:?}",
                input
            )))
        }
    };

    let beam = nuclide_from_token(beam)?;
    let target = nuclide_from_token(target)?;
    let fragment = nuclide_from_token(fragment)?;
    let named_residual = nuclide_from_token(residual)?;

    let reaction = Reaction::new(beam, target, fragment, beam_energy_mev)?;
    if reaction.residual() != named_residual {
        return Err(Error::Configuration(format!(
            "residual {} does not balance {} + {} -> {} + ?",
            named_residual, beam, target, fragment
        )));
    }
    Ok(reaction)
}

/// `A(B,C)D` -> [beam, target, fragment, residual]
fn split_physicist(input: &str) -> Result<[&str; 4]> {
    let malformed = || Error::Configuration(format!("malformed reaction notation: {:?}", input));

    let (left, right) = input.split_once(',').ok_or_else(malformed)?;
    let (target, beam) = left.split_once('(').ok_or_else(malformed)?;
    let (fragment, residual) = right.split_once(')').ok_or_else(malformed)?;

    if [target, beam, fragment, residual].iter().any(|t| t.is_empty()) {
        return Err(malformed());
    }
    Ok([beam, target, fragment, residual])
}

/// `A + B -> C + D` -> [beam, target, fragment, residual]
fn split_chemist(input: &str) -> Result<[&str; 4]> {
    let malformed = || Error::Configuration(format!("malformed reaction notation: {:?}", input));

    let (left, right) = input.split_once("->").ok_or_else(malformed)?;
    let (target, beam) = left.split_once('+').ok_or_else(malformed)?;
    let (residual, fragment) = right.split_once('+').ok_or_else(malformed)?;

    if [target, beam, fragment, residual].iter().any(|t| t.is_empty()) {
        return Err(malformed());
    }
    Ok([beam, target, fragment, residual])
}

/// Resolve one isotope token, e.g. `7Li`, `Li7`, `d`.
fn nuclide_from_token(token: &str) -> Result<Nuclide> {
    match token.to_ascii_lowercase().as_str() {
        "p" => return Nuclide::new(1, 1),
        "d" => return Nuclide::new(1, 2),
        "t" => return Nuclide::new(1, 3),
        _ => {}
    }

    let digits: String = token.chars().filter(|c| c.is_ascii_digit()).collect();
    let symbol: String = token.chars().filter(|c| c.is_alphabetic()).collect();

    let nucleons: u32 = digits.parse().map_err(|_| {
        Error::Configuration(format!("isotope {:?} has no nucleon count", token))
    })?;
    let charge = nuclides::charge_for_symbol(&symbol)
        .ok_or_else(|| Error::Configuration(format!("unknown element symbol {:?}", symbol)))?;

    Nuclide::new(charge, nucleons)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(classify("Li7(d,t)Li6"), Notation::Physicist);
        assert_eq!(classify("Li7 + d -> Li6 + t"), Notation::Chemist);
        assert_eq!(classify("Li7 d t Li6"), Notation::Unrecognized);
    }

    #[test]
    fn test_parse_physicist() {
        let reaction = parse("Li7(d,t)Li6", 14.5).unwrap();
        assert_eq!(reaction.beam(), Nuclide::new(1, 2).unwrap());
        assert_eq!(reaction.target(), Nuclide::new(3, 7).unwrap());
        assert_eq!(reaction.fragment(), Nuclide::new(1, 3).unwrap());
        assert_eq!(reaction.residual(), Nuclide::new(3, 6).unwrap());
    }

    #[test]
    fn test_parse_chemist_matches_physicist() {
        let chemist = parse("Li7 + d -> Li6 + t", 14.5).unwrap();
        let physicist = parse("Li7(d,t)Li6", 14.5).unwrap();
        assert_eq!(chemist.beam(), physicist.beam());
        assert_eq!(chemist.fragment(), physicist.fragment());
        assert_eq!(chemist.residual(), physicist.residual());
    }

    #[test]
    fn test_leading_nucleon_count() {
        let reaction = parse("7Li(d,t)6Li", 14.5).unwrap();
        assert_eq!(reaction.target(), Nuclide::new(3, 7).unwrap());
        assert_eq!(reaction.residual(), Nuclide::new(3, 6).unwrap());
    }

    #[test]
    fn test_shorthand_nucleons() {
        let reaction = parse("B10(p,d)B9", 10.0);
        // 9B is not in the mass table, so this must fail as configuration.
        assert!(reaction.is_err());

        let reaction = parse("B11(p,d)B10", 10.0).unwrap();
        assert_eq!(reaction.beam(), Nuclide::new(1, 1).unwrap());
        assert_eq!(reaction.fragment(), Nuclide::new(1, 2).unwrap());
    }

    #[test]
    fn test_unknown_symbol_rejected() {
        let result = parse("Xx10(d,t)Li6", 14.5);
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_malformed_rejected() {
        for bad in ["Li7(d t)Li6", "Li7 + d - > Li6", "", "Li7(d,t"] {
            assert!(parse(bad, 14.5).is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn test_residual_mismatch_rejected() {
        let result = parse("Li7(d,t)Li7", 14.5);
        assert!(matches!(result, Err(Error::Configuration(_))));
    }
}
