//! Electronic and vibronic Hamiltonians.
//!
//! Both implement [`Hamiltonian`], so downstream propagators can be written
//! once against either.
//!
//! **Rotating frames are absolute.** [`Hamiltonian::in_rotating_frame`] sets
//! the frame frequency measured from the original, unrotated site energies; it
//! does not add to whatever frame the receiver was already in. Rotating a
//! Hamiltonian at `w1` and then at `w2` gives the frame `w2`, not `w1 + w2`.

use ndarray as nd;
use num_complex::Complex64 as C64;
use crate::{
    error::HamiltonianError,
    manifold::Manifold,
    nd_utils,
    operators::{ Polarization, Transitions },
};

pub mod electronic;
pub use electronic::{
    Disorder,
    DisorderFn,
    ElectronicEnsemble,
    ElectronicHamiltonian,
    ElectronicParams,
    DEFAULT_ENERGY_SPREAD_EXTRA,
};

pub mod vibronic;
pub use vibronic::{ VibronicEnsemble, VibronicHamiltonian };

/// Query surface shared by all Hamiltonians.
///
/// Every matrix is laid out in the order given by
/// [`ExcitonBasis`][crate::manifold::ExcitonBasis], possibly with additional
/// inner (faster-varying) degrees of freedom.
pub trait Hamiltonian: Sized {
    /// Iterator over disorder realizations.
    type Ensemble: Iterator<Item = Self>;

    /// Number of electronic sites.
    fn n_sites(&self) -> usize;

    /// Size of each sector of `manifold`, in block order.
    fn sector_sizes(&self, manifold: Manifold) -> Vec<usize>;

    /// Total number of basis states in `manifold`.
    fn n_states(&self, manifold: Manifold) -> usize {
        self.sector_sizes(manifold).iter().sum()
    }

    /// Build the Hamiltonian matrix over `manifold`.
    fn H(&self, manifold: Manifold) -> nd::Array2<C64>;

    /// Return the energy levels of [`Self::H`], ascending within each sector
    /// and concatenated sector by sector.
    fn E(&self, manifold: Manifold) -> nd::Array1<f64> {
        let sizes = self.sector_sizes(manifold);
        nd_utils::eigvalsh_blocks(&self.H(manifold), &sizes)
    }

    /// Return [`Self::E`] along with the matching eigenvectors as the columns
    /// of a block-diagonal matrix.
    fn eig(&self, manifold: Manifold) -> (nd::Array1<f64>, nd::Array2<C64>) {
        nd_utils::eigh_blocks(&self.H(manifold), &self.sector_sizes(manifold))
    }

    /// Mean single-exciton energy of the unperturbed system in the zero frame.
    ///
    /// Unaffected by rotating frames.
    fn mean_excitation_freq(&self) -> f64;

    /// Frequency resolution appropriate for Fourier transforms over the
    /// system's current spectral range.
    fn freq_step(&self) -> f64;

    /// Time step matching [`Self::freq_step`].
    fn time_step(&self) -> f64 { self.freq_step().recip() }

    /// Current rotating-frame frequency, measured from the zero frame.
    fn rotating_frame_frequency(&self) -> f64;

    /// Initial density matrix over `manifold`, supported on the ground sector.
    fn ground_state(&self, manifold: Manifold) -> nd::Array2<C64>;

    /// Operator counting the excitations on a single site.
    fn number_operator(&self, site: usize, manifold: Manifold)
        -> nd::Array2<C64>;

    /// Transition dipole operator projected onto `polarization`.
    fn dipole_operator(
        &self,
        manifold: Manifold,
        polarization: Polarization,
        transitions: Transitions,
    ) -> Result<nd::Array2<C64>, HamiltonianError>;

    /// Operators through which each site couples to its bath, one per site.
    fn system_bath_couplings(&self, manifold: Manifold)
        -> Result<Vec<nd::Array2<C64>>, HamiltonianError>;

    /// Return a copy of `self` in the rotating frame at `frequency`.
    ///
    /// The frame is absolute; see the [module-level docs][self].
    fn in_rotating_frame(&self, frequency: f64) -> Self;

    /// Return a copy of `self` in the rotating frame at
    /// [`Self::mean_excitation_freq`].
    fn in_mean_rotating_frame(&self) -> Self {
        self.in_rotating_frame(self.mean_excitation_freq())
    }

    /// Draw `n` disorder realizations of `self`.
    ///
    /// If `random_orientations` is `true`, each realization's dipoles are also
    /// given a uniformly random common rotation.
    fn sample_ensemble(&self, n: usize, random_orientations: bool)
        -> Self::Ensemble;
}

/// Compute `2 × (bandwidth + energy_spread_extra)` from a set of energy
/// levels.
pub(crate) fn freq_step_from(E: &nd::Array1<f64>, energy_spread_extra: f64)
    -> f64
{
    let e_max: f64 = E.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let e_min: f64 = E.iter().copied().fold(f64::INFINITY, f64::min);
    2.0 * ((e_max - e_min) + energy_spread_extra)
}
