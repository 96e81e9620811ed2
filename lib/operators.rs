//! Builders lifting single-exciton quantities to operators over a full
//! [`Manifold`].
//!
//! Double-exciton blocks follow the hard-core boson rule: for pair states
//! `|ij⟩` and `|kl⟩`,
//! ```text
//! ⟨ij|A|kl⟩ = δ_ik A_jl + δ_jl A_ik + δ_il A_jk + δ_jk A_il
//! ```
//! so diagonal elements are `A_ii + A_jj` and two pair states couple only
//! through the single-exciton element between their unshared sites.

use std::{ fmt, str::FromStr };
use itertools::Itertools;
use ndarray::{ self as nd, s };
use num_complex::Complex64 as C64;
use num_traits::Zero;
use crate::{
    error::ParseError,
    manifold::{ ExcitonBasis, ExcitonState, Manifold, Sector },
};

/* Block-diagonal operators ***************************************************/

/// Lift a single-exciton operator `A` (`n_sites × n_sites`) into the
/// double-exciton sector.
pub fn operator_1_to_2(A: &nd::Array2<C64>) -> nd::Array2<C64> {
    let pairs: Vec<(usize, usize)>
        = (0..A.nrows()).tuple_combinations().collect();
    let m = pairs.len();
    let mut A2: nd::Array2<C64> = nd::Array2::zeros((m, m));
    let iter
        = pairs.iter().enumerate()
        .cartesian_product(pairs.iter().enumerate());
    for ((p, &(i, j)), (q, &(k, l))) in iter {
        let mut elem = C64::zero();
        if i == k { elem += A[[j, l]]; }
        if j == l { elem += A[[i, k]]; }
        if i == l { elem += A[[j, k]]; }
        if j == k { elem += A[[i, l]]; }
        A2[[p, q]] = elem;
    }
    A2
}

/// Lift a single-exciton operator to a block-diagonal operator over all of
/// `manifold`.
///
/// The ground block is zero, the single block is `A` itself, and the double
/// block is [`operator_1_to_2`]`(A)`.
///
/// *Panics* if `A` is not square.
pub fn extend_operator(A: &nd::Array2<C64>, manifold: Manifold)
    -> nd::Array2<C64>
{
    if !A.is_square() {
        panic!("extend_operator: operator must be square");
    }
    let basis = ExcitonBasis::new(A.nrows(), manifold);
    let n = basis.len();
    let mut out: nd::Array2<C64> = nd::Array2::zeros((n, n));
    if let Some(r) = basis.sector_range(Sector::Single) {
        out.slice_mut(s![r.clone(), r]).assign(A);
    }
    if let Some(r) = basis.sector_range(Sector::Double) {
        out.slice_mut(s![r.clone(), r]).assign(&operator_1_to_2(A));
    }
    out
}

/// Diagonal operator counting the excitations on `site` in each basis state of
/// `manifold`.
///
/// *Panics* if `site` is out of range.
pub fn number_operator(n_sites: usize, site: usize, manifold: Manifold)
    -> nd::Array2<C64>
{
    if site >= n_sites {
        panic!("number_operator: site index {} out of range", site);
    }
    let diag: nd::Array1<C64>
        = ExcitonBasis::new(n_sites, manifold).iter()
        .map(|state| {
            if state.excites(site) { C64::from(1.0) } else { C64::zero() }
        })
        .collect();
    nd::Array2::from_diag(&diag)
}

/* Transition operators *******************************************************/

/// Selects raising and/or lowering parts of a transition operator.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Transitions {
    pub lowering: bool,
    pub raising: bool,
}

impl Transitions {
    /// `"-"`
    pub const LOWER: Self = Self { lowering: true, raising: false };
    /// `"+"`
    pub const RAISE: Self = Self { lowering: false, raising: true };
    /// `"-+"`; the resulting operator is Hermitian.
    pub const BOTH: Self = Self { lowering: true, raising: true };
}

impl Default for Transitions {
    fn default() -> Self { Self::BOTH }
}

impl FromStr for Transitions {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() { return Err(ParseError::EmptyTransitions); }
        let mut transitions = Self { lowering: false, raising: false };
        for tag in s.chars() {
            match tag {
                '-' => { transitions.lowering = true; },
                '+' => { transitions.raising = true; },
                _ => { return Err(ParseError::TransitionTag(tag)); },
            }
        }
        Ok(transitions)
    }
}

impl fmt::Display for Transitions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.lowering { write!(f, "-")?; }
        if self.raising { write!(f, "+")?; }
        Ok(())
    }
}

/// Build an operator connecting sectors that differ by exactly one
/// excitation, with per-site amplitudes `amps`.
///
/// The raising part has `⟨e_k|T|g⟩ = amps[k]` and `⟨f_ij|T|e_i⟩ = amps[j]`,
/// `⟨f_ij|T|e_j⟩ = amps[i]`; the lowering part is its conjugate transpose.
pub fn transition_operator(
    amps: &nd::Array1<C64>,
    manifold: Manifold,
    transitions: Transitions,
) -> nd::Array2<C64>
{
    let basis = ExcitonBasis::new(amps.len(), manifold);
    let n = basis.len();
    let mut raise: nd::Array2<C64> = nd::Array2::zeros((n, n));
    for (a, state) in basis.iter().enumerate() {
        match *state {
            ExcitonState::Ground => { },
            ExcitonState::Single(k) => {
                if let Some(g) = basis.index_of(&ExcitonState::Ground) {
                    raise[[a, g]] = amps[k];
                }
            },
            ExcitonState::Double(i, j) => {
                if let Some(ei) = basis.index_of(&ExcitonState::Single(i)) {
                    raise[[a, ei]] = amps[j];
                }
                if let Some(ej) = basis.index_of(&ExcitonState::Single(j)) {
                    raise[[a, ej]] = amps[i];
                }
            },
        }
    }
    let mut out: nd::Array2<C64> = nd::Array2::zeros((n, n));
    if transitions.lowering { out += &raise.t().mapv(|x| x.conj()); }
    if transitions.raising { out += &raise; }
    out
}

/* Polarizations **************************************************************/

/// Polarization axis onto which transition dipoles are projected.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Polarization {
    X,
    Y,
    Z,
    /// Arbitrary (not necessarily normalized) lab-frame vector.
    Vector([f64; 3]),
}

impl Polarization {
    /// Return the lab-frame vector for the polarization.
    pub fn vector(&self) -> [f64; 3] {
        match *self {
            Self::X => [1.0, 0.0, 0.0],
            Self::Y => [0.0, 1.0, 0.0],
            Self::Z => [0.0, 0.0, 1.0],
            Self::Vector(v) => v,
        }
    }

    /// Project a set of dipole vectors (`n × 3`) onto the polarization axis.
    ///
    /// *Panics* if `dipoles` does not have three columns.
    pub fn project(&self, dipoles: &nd::Array2<f64>) -> nd::Array1<C64> {
        if dipoles.ncols() != 3 {
            panic!("Polarization::project: dipoles must have three components");
        }
        let pol = nd::Array1::from(self.vector().to_vec());
        dipoles.dot(&pol).mapv(C64::from)
    }
}

impl Default for Polarization {
    fn default() -> Self { Self::X }
}

impl From<[f64; 3]> for Polarization {
    fn from(v: [f64; 3]) -> Self { Self::Vector(v) }
}

impl FromStr for Polarization {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "x" | "X" => Ok(Self::X),
            "y" | "Y" => Ok(Self::Y),
            "z" | "Z" => Ok(Self::Z),
            _ => Err(ParseError::Polarization(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(x: f64) -> C64 { C64::from(x) }

    fn real(A: &nd::Array2<C64>) -> nd::Array2<f64> { A.mapv(|a| a.re) }

    #[test]
    fn two_exciton_rule() {
        let A = nd::array![
            [c(1.0), c(0.1), c(0.2)],
            [c(0.1), c(2.0), c(0.3)],
            [c(0.2), c(0.3), c(4.0)],
        ];
        // pairs: (0, 1), (0, 2), (1, 2)
        let expected = nd::array![
            [3.0, 0.3, 0.2],
            [0.3, 5.0, 0.1],
            [0.2, 0.1, 6.0],
        ];
        assert_eq!(real(&operator_1_to_2(&A)), expected);
        assert_eq!(operator_1_to_2(&nd::array![[c(1.0)]]).shape(), &[0, 0]);
    }

    #[test]
    fn extended_blocks() {
        let A = nd::array![[c(1.0), c(0.5)], [c(0.5), c(3.0)]];
        let expected = nd::array![
            [0.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.5, 0.0],
            [0.0, 0.5, 3.0, 0.0],
            [0.0, 0.0, 0.0, 4.0],
        ];
        assert_eq!(real(&extend_operator(&A, Manifold::GEF)), expected);
        assert_eq!(
            real(&extend_operator(&A, Manifold::F)),
            nd::array![[4.0]],
        );
    }

    #[test]
    fn number_operators() {
        assert_eq!(
            real(&number_operator(2, 1, Manifold::GEF)),
            nd::Array2::from_diag(&nd::array![0.0, 0.0, 1.0, 1.0]),
        );
        assert_eq!(
            real(&number_operator(3, 0, Manifold::EF)),
            nd::Array2::from_diag(&nd::array![1.0, 0.0, 0.0, 1.0, 1.0, 0.0]),
        );
    }

    #[test]
    #[should_panic]
    fn number_operator_bad_site() {
        number_operator(2, 2, Manifold::GE);
    }

    #[test]
    fn transitions() {
        let amps = nd::array![c(1.0), c(2.0)];
        let both = transition_operator(&amps, Manifold::GEF, Transitions::BOTH);
        let expected = nd::array![
            [0.0, 1.0, 2.0, 0.0],
            [1.0, 0.0, 0.0, 2.0],
            [2.0, 0.0, 0.0, 1.0],
            [0.0, 2.0, 1.0, 0.0],
        ];
        assert_eq!(real(&both), expected);
        let raise = transition_operator(&amps, Manifold::GEF, Transitions::RAISE);
        let lower = transition_operator(&amps, Manifold::GEF, Transitions::LOWER);
        assert_eq!(raise.t(), lower);
        assert_eq!(&raise + &lower, both);
        let ef = transition_operator(&amps, Manifold::EF, Transitions::BOTH);
        assert_eq!(
            real(&ef),
            nd::array![[0.0, 0.0, 2.0], [0.0, 0.0, 1.0], [2.0, 1.0, 0.0]],
        );
    }

    #[test]
    fn parse_labels() {
        assert_eq!("-+".parse::<Transitions>(), Ok(Transitions::BOTH));
        assert_eq!("+".parse::<Transitions>(), Ok(Transitions::RAISE));
        assert_eq!(Transitions::BOTH.to_string(), "-+");
        assert_eq!(
            "-*".parse::<Transitions>(),
            Err(ParseError::TransitionTag('*')),
        );
        assert_eq!("y".parse::<Polarization>(), Ok(Polarization::Y));
        assert!("w".parse::<Polarization>().is_err());
    }

    #[test]
    fn projection() {
        let dipoles = nd::array![[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        assert_eq!(
            Polarization::X.project(&dipoles),
            nd::array![c(1.0), c(0.0)],
        );
        assert_eq!(
            Polarization::from([1.0, 1.0, 0.0]).project(&dipoles),
            nd::array![c(1.0), c(1.0)],
        );
    }
}
