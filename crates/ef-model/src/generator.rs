//! Seeded synthetic origin–destination data.

use crate::error::ModelResult;
use crate::flow::FlowMatrix;
use ef_core::CoreError;
use nalgebra::DMatrix;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Piauí municipalities used to label synthetic city sets.
const CITY_NAMES: [&str; 30] = [
    "Teresina",
    "Parnaíba",
    "Picos",
    "Piripiri",
    "Floriano",
    "Campo Maior",
    "Barras",
    "União",
    "Altos",
    "Esperantina",
    "José de Freitas",
    "Pedro II",
    "Oeiras",
    "São Raimundo Nonato",
    "Miguel Alves",
    "Luzilândia",
    "Batalha",
    "Corrente",
    "Bom Jesus",
    "Piracuruca",
    "Cocal",
    "Uruçuí",
    "São João do Piauí",
    "Jaicós",
    "Paulistana",
    "Guadalupe",
    "Castelo do Piauí",
    "Fronteiras",
    "Inhuma",
    "Valença do Piauí",
];

/// Parameters for synthetic flow generation.
#[derive(Debug, Clone)]
pub struct SyntheticSpec {
    /// Number of cities (problem size n; the solvers see n² unknowns).
    pub n_cities: usize,
    /// Inclusive range for integer flow draws.
    pub flow_range: (u32, u32),
    /// RNG seed; equal seeds reproduce the exact same matrix.
    pub seed: u64,
}

impl Default for SyntheticSpec {
    fn default() -> Self {
        Self {
            n_cities: 10,
            flow_range: (10, 500),
            seed: 42,
        }
    }
}

/// City labels for an n-city problem: real names first, then numbered
/// placeholders ("Cidade_31", ...) once the list is exhausted.
pub fn city_names(n: usize) -> Vec<String> {
    let mut names: Vec<String> = CITY_NAMES
        .iter()
        .take(n)
        .map(|s| s.to_string())
        .collect();
    for i in CITY_NAMES.len() + 1..=n {
        names.push(format!("Cidade_{}", i));
    }
    names
}

/// Draw a random flow matrix and its city labels.
///
/// Off-diagonal entries are integers from `flow_range`; the diagonal is
/// zero. Deterministic for a given spec.
pub fn synthetic_flows(spec: &SyntheticSpec) -> ModelResult<(Vec<String>, FlowMatrix)> {
    if spec.n_cities == 0 {
        return Err(CoreError::InvalidArg { what: "n_cities" }.into());
    }
    let (lo, hi) = spec.flow_range;
    if lo > hi {
        return Err(CoreError::InvalidArg { what: "flow_range" }.into());
    }

    let n = spec.n_cities;
    let mut rng = ChaCha8Rng::seed_from_u64(spec.seed);
    let mut flows = DMatrix::zeros(n, n);
    for i in 0..n {
        for j in 0..n {
            if i != j {
                flows[(i, j)] = rng.gen_range(lo..=hi) as f64;
            }
        }
    }

    Ok((city_names(n), FlowMatrix::new(flows)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_reproduces_matrix() {
        let spec = SyntheticSpec::default();
        let (_, a) = synthetic_flows(&spec).unwrap();
        let (_, b) = synthetic_flows(&spec).unwrap();
        assert_eq!(a.as_matrix(), b.as_matrix());
    }

    #[test]
    fn different_seeds_differ() {
        let a = synthetic_flows(&SyntheticSpec {
            seed: 1,
            ..Default::default()
        })
        .unwrap()
        .1;
        let b = synthetic_flows(&SyntheticSpec {
            seed: 2,
            ..Default::default()
        })
        .unwrap()
        .1;
        assert_ne!(a.as_matrix(), b.as_matrix());
    }

    #[test]
    fn zero_cities_is_rejected() {
        let spec = SyntheticSpec {
            n_cities: 0,
            ..Default::default()
        };
        assert!(synthetic_flows(&spec).is_err());
    }

    #[test]
    fn names_extend_past_known_cities() {
        let names = city_names(32);
        assert_eq!(names[0], "Teresina");
        assert_eq!(names[29], "Valença do Piauí");
        assert_eq!(names[30], "Cidade_31");
        assert_eq!(names[31], "Cidade_32");
    }

    #[test]
    fn small_name_request_truncates_list() {
        let names = city_names(3);
        assert_eq!(names, vec!["Teresina", "Parnaíba", "Picos"]);
    }
}
