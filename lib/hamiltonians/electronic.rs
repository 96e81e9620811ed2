//! Excitonic Hamiltonian over ground, single-, and double-excitation sectors.

use std::{ fmt, sync::Arc };
use log::{ debug, trace };
use ndarray as nd;
use num_complex::Complex64 as C64;
use rand::{ rngs::StdRng, SeedableRng };
use rand_distr::{ Distribution, StandardNormal };
use crate::{
    bath::Bath,
    error::HamiltonianError,
    hamiltonians::{ Hamiltonian, freq_step_from },
    manifold::{ ExcitonBasis, ExcitonState, Manifold },
    nd_utils::{ self, GAUSSIAN_SD_FWHM },
    operators::{ self, Polarization, Transitions },
};

/// Padding added to the spectral bandwidth in [`Hamiltonian::freq_step`]
/// unless set otherwise.
pub const DEFAULT_ENERGY_SPREAD_EXTRA: f64 = 100.0;

/* Disorder *******************************************************************/

/// Heap-allocated [`Fn`] trait object drawing an additive site-energy
/// perturbation (`n_sites × n_sites`) from a random number generator.
pub type DisorderFn = Arc<dyn Fn(&mut StdRng) -> nd::Array2<f64> + Send + Sync>;

/// Rule for drawing static site-energy disorder.
#[derive(Clone)]
pub enum Disorder {
    /// Independent Gaussian noise on each site energy with this full width at
    /// half maximum.
    Fwhm(f64),
    /// Arbitrary perturbation matrix.
    Function(DisorderFn),
}

impl fmt::Debug for Disorder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fwhm(fwhm) => write!(f, "Fwhm({:?})", fwhm),
            Self::Function(_) => write!(f, "Function(...)"),
        }
    }
}

impl From<f64> for Disorder {
    fn from(fwhm: f64) -> Self { Self::Fwhm(fwhm) }
}

impl Disorder {
    /// Create a new [`Self::Function`].
    pub fn from_fn<F>(f: F) -> Self
    where F: Fn(&mut StdRng) -> nd::Array2<f64> + Send + Sync + 'static
    {
        Self::Function(Arc::new(f))
    }

    /// Draw one perturbation for `n_sites` sites.
    ///
    /// *Panics* if a [`Self::Function`] returns a matrix of the wrong shape.
    pub fn sample(&self, n_sites: usize, rng: &mut StdRng) -> nd::Array2<f64> {
        match self {
            Self::Fwhm(fwhm) => {
                let sigma: f64 = fwhm * GAUSSIAN_SD_FWHM;
                let diag: nd::Array1<f64>
                    = (0..n_sites)
                    .map(|_| {
                        let z: f64 = StandardNormal.sample(rng);
                        sigma * z
                    })
                    .collect();
                nd::Array2::from_diag(&diag)
            },
            Self::Function(f) => {
                let perturbation = (**f)(rng);
                if perturbation.shape() != [n_sites; 2] {
                    panic!(
                        "Disorder::sample: perturbation must be {n} x {n}",
                        n = n_sites,
                    );
                }
                perturbation
            },
        }
    }
}

/* Parameters *****************************************************************/

/// Initialization data for [`ElectronicHamiltonian`].
#[derive(Clone, Debug)]
pub struct ElectronicParams {
    /// Site energies on the diagonal, electronic couplings off the diagonal.
    pub site_energies: nd::Array2<C64>,
    pub bath: Option<Arc<dyn Bath>>,
    /// Transition dipole vectors, one row per site.
    pub dipoles: Option<nd::Array2<f64>>,
    pub disorder: Option<Disorder>,
    pub energy_spread_extra: f64,
    pub random_seed: u64,
}

impl ElectronicParams {
    /// Create a new `ElectronicParams` with default settings for everything
    /// but the site energies.
    pub fn new(site_energies: nd::Array2<C64>) -> Self {
        Self {
            site_energies,
            bath: None,
            dipoles: None,
            disorder: None,
            energy_spread_extra: DEFAULT_ENERGY_SPREAD_EXTRA,
            random_seed: 0,
        }
    }
}

impl From<ElectronicParams> for ElectronicHamiltonian {
    fn from(params: ElectronicParams) -> Self {
        let ElectronicParams {
            site_energies,
            bath,
            dipoles,
            disorder,
            energy_spread_extra,
            random_seed,
        } = params;
        let mut H = Self::new(site_energies)
            .with_energy_spread_extra(energy_spread_extra)
            .with_random_seed(random_seed);
        H.bath = bath;
        if let Some(d) = dipoles { H = H.with_dipoles(d); }
        if let Some(d) = disorder { H = H.with_disorder(d); }
        H
    }
}

/* Hamiltonian ****************************************************************/

/// Excitonic Hamiltonian built from a matrix of site energies and couplings.
///
/// The ground state energy is fixed at zero. Realizations drawn by
/// [`Hamiltonian::sample_ensemble`] carry their disorder perturbation
/// separately from the unperturbed site energies, so that
/// [`Hamiltonian::freq_step`] and [`Hamiltonian::mean_excitation_freq`] are
/// shared across an ensemble and sampling commutes exactly with
/// [`Hamiltonian::in_rotating_frame`].
#[derive(Clone, Debug)]
pub struct ElectronicHamiltonian {
    site_energies: nd::Array2<C64>,
    perturbation: Option<nd::Array2<f64>>,
    bath: Option<Arc<dyn Bath>>,
    dipoles: Option<nd::Array2<f64>>,
    disorder: Option<Disorder>,
    energy_spread_extra: f64,
    random_seed: u64,
    rotating_frame_frequency: f64,
}

impl ElectronicHamiltonian {
    /// Create a new `ElectronicHamiltonian` in the zero frame.
    ///
    /// *Panics* if `site_energies` is empty or not square.
    pub fn new(site_energies: nd::Array2<C64>) -> Self {
        if site_energies.is_empty() || !site_energies.is_square() {
            panic!(
                "ElectronicHamiltonian::new: site energies must be a \
                non-empty square matrix"
            );
        }
        trace!(
            "new electronic Hamiltonian over {} sites",
            site_energies.nrows(),
        );
        Self {
            site_energies,
            perturbation: None,
            bath: None,
            dipoles: None,
            disorder: None,
            energy_spread_extra: DEFAULT_ENERGY_SPREAD_EXTRA,
            random_seed: 0,
            rotating_frame_frequency: 0.0,
        }
    }

    /// Like [`Self::new`], but for real site energies.
    pub fn from_real(site_energies: &nd::Array2<f64>) -> Self {
        Self::new(site_energies.mapv(C64::from))
    }

    /// Attach a bath.
    pub fn with_bath<B>(mut self, bath: B) -> Self
    where B: Bath + 'static
    {
        self.bath = Some(Arc::new(bath));
        self
    }

    /// Attach transition dipoles, one 3-vector per site.
    ///
    /// *Panics* if `dipoles` is not `n_sites × 3`.
    pub fn with_dipoles(mut self, dipoles: nd::Array2<f64>) -> Self {
        if dipoles.shape() != [self.n_sites(), 3] {
            panic!(
                "ElectronicHamiltonian::with_dipoles: expected {} x 3 dipoles",
                self.n_sites(),
            );
        }
        self.dipoles = Some(dipoles);
        self
    }

    /// Set the static disorder rule used by [`Hamiltonian::sample_ensemble`].
    pub fn with_disorder<D>(mut self, disorder: D) -> Self
    where D: Into<Disorder>
    {
        self.disorder = Some(disorder.into());
        self
    }

    /// Set the padding added to the spectral bandwidth in
    /// [`Hamiltonian::freq_step`].
    pub fn with_energy_spread_extra(mut self, energy_spread_extra: f64)
        -> Self
    {
        self.energy_spread_extra = energy_spread_extra;
        self
    }

    /// Set the seed for [`Hamiltonian::sample_ensemble`].
    pub fn with_random_seed(mut self, random_seed: u64) -> Self {
        self.random_seed = random_seed;
        self
    }

    /// Return the unperturbed site-energy matrix in the zero frame.
    pub fn site_energies(&self) -> &nd::Array2<C64> { &self.site_energies }

    /// Return the disorder perturbation of a sampled realization.
    pub fn perturbation(&self) -> Option<&nd::Array2<f64>> {
        self.perturbation.as_ref()
    }

    pub fn bath(&self) -> Option<&Arc<dyn Bath>> { self.bath.as_ref() }

    pub fn dipoles(&self) -> Option<&nd::Array2<f64>> { self.dipoles.as_ref() }

    pub fn disorder(&self) -> Option<&Disorder> { self.disorder.as_ref() }

    pub fn energy_spread_extra(&self) -> f64 { self.energy_spread_extra }

    pub fn random_seed(&self) -> u64 { self.random_seed }

    /// Return the single-exciton block of the Hamiltonian: site energies plus
    /// any disorder perturbation, shifted by the rotating-frame frequency.
    pub fn H_1exc(&self) -> nd::Array2<C64> {
        let mut H1: nd::Array2<C64> = self.site_energies.clone();
        if let Some(perturbation) = &self.perturbation {
            H1 += &perturbation.mapv(C64::from);
        }
        let w = self.rotating_frame_frequency;
        H1.diag_mut().mapv_inplace(|h| h - w);
        H1
    }

    /// Return `self` without any disorder perturbation.
    pub(crate) fn reference(&self) -> Self {
        Self { perturbation: None, ..self.clone() }
    }
}

impl Hamiltonian for ElectronicHamiltonian {
    type Ensemble = ElectronicEnsemble;

    fn n_sites(&self) -> usize { self.site_energies.nrows() }

    fn sector_sizes(&self, manifold: Manifold) -> Vec<usize> {
        manifold.sector_sizes(self.n_sites())
    }

    fn H(&self, manifold: Manifold) -> nd::Array2<C64> {
        operators::extend_operator(&self.H_1exc(), manifold)
    }

    fn mean_excitation_freq(&self) -> f64 {
        let E = nd_utils::eigvalsh(&self.site_energies);
        E.sum() / E.len() as f64
    }

    fn freq_step(&self) -> f64 {
        let E
            = if self.perturbation.is_some() {
                self.reference().E(Manifold::GEF)
            } else {
                self.E(Manifold::GEF)
            };
        freq_step_from(&E, self.energy_spread_extra)
    }

    fn rotating_frame_frequency(&self) -> f64 { self.rotating_frame_frequency }

    /// Pure projector onto the electronic ground state.
    ///
    /// *Panics* if `manifold` does not include the ground sector.
    fn ground_state(&self, manifold: Manifold) -> nd::Array2<C64> {
        let basis = ExcitonBasis::new(self.n_sites(), manifold);
        let Some(g) = basis.index_of(&ExcitonState::Ground) else {
            panic!(
                "ElectronicHamiltonian::ground_state: manifold '{}' has no \
                ground sector",
                manifold,
            );
        };
        let n = basis.len();
        let mut rho: nd::Array2<C64> = nd::Array2::zeros((n, n));
        rho[[g, g]] = C64::from(1.0);
        rho
    }

    fn number_operator(&self, site: usize, manifold: Manifold)
        -> nd::Array2<C64>
    {
        operators::number_operator(self.n_sites(), site, manifold)
    }

    fn dipole_operator(
        &self,
        manifold: Manifold,
        polarization: Polarization,
        transitions: Transitions,
    ) -> Result<nd::Array2<C64>, HamiltonianError>
    {
        let dipoles
            = self.dipoles.as_ref().ok_or(HamiltonianError::MissingDipoles)?;
        let amps = polarization.project(dipoles);
        Ok(operators::transition_operator(&amps, manifold, transitions))
    }

    /// Site number operators, available only when a bath is attached.
    fn system_bath_couplings(&self, manifold: Manifold)
        -> Result<Vec<nd::Array2<C64>>, HamiltonianError>
    {
        if self.bath.is_none() { return Err(HamiltonianError::MissingBath); }
        Ok(
            (0..self.n_sites())
                .map(|site| self.number_operator(site, manifold))
                .collect()
        )
    }

    fn in_rotating_frame(&self, frequency: f64) -> Self {
        Self { rotating_frame_frequency: frequency, ..self.clone() }
    }

    fn sample_ensemble(&self, n: usize, random_orientations: bool)
        -> Self::Ensemble
    {
        debug!(
            "sampling {} realizations over {} sites (seed {}, disorder {:?}, \
            random orientations: {})",
            n,
            self.n_sites(),
            self.random_seed,
            self.disorder,
            random_orientations,
        );
        ElectronicEnsemble {
            base: self.reference(),
            remaining: n,
            random_orientations,
            rng: StdRng::seed_from_u64(self.random_seed),
        }
    }
}

/* Ensembles ******************************************************************/

/// Finite, single-pass iterator over disorder realizations of an
/// [`ElectronicHamiltonian`].
///
/// Each step draws the site-energy perturbation first and then, if requested,
/// the dipole rotation, all from one generator seeded with the parent's
/// `random_seed`.
#[derive(Clone, Debug)]
pub struct ElectronicEnsemble {
    base: ElectronicHamiltonian,
    remaining: usize,
    random_orientations: bool,
    rng: StdRng,
}

impl Iterator for ElectronicEnsemble {
    type Item = ElectronicHamiltonian;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 { return None; }
        self.remaining -= 1;
        let n_sites = self.base.n_sites();
        let perturbation: Option<nd::Array2<f64>>
            = self.base.disorder.as_ref()
            .map(|disorder| disorder.sample(n_sites, &mut self.rng));
        let dipoles: Option<nd::Array2<f64>>
            = if self.random_orientations {
                let R = nd_utils::random_rotation(&mut self.rng);
                self.base.dipoles.as_ref().map(|d| d.dot(&R.t()))
            } else {
                self.base.dipoles.clone()
            };
        trace!("drew realization ({} remaining)", self.remaining);
        Some(
            ElectronicHamiltonian { perturbation, dipoles, ..self.base.clone() }
        )
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for ElectronicEnsemble { }
