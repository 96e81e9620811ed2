//! An [`ElectronicHamiltonian`] dressed with explicit harmonic vibrational
//! modes under linear (Holstein-type) electron-vibration coupling.
//!
//! The full basis is the Kronecker product of the electronic basis (outer)
//! with the truncated Fock bases of all modes (inner, last mode fastest):
//! ```text
//! H = H_el ⊗ 1 + 1 ⊗ Σ_m ω_m b_m†b_m + Σ_{s,m} g_sm N_s ⊗ (b_m + b_m†)
//! ```
//! where `N_s` counts the excitations on site `s`.

use itertools::Itertools;
use log::debug;
use ndarray::{ self as nd, linalg::kron };
use num_complex::Complex64 as C64;
use crate::{
    error::HamiltonianError,
    hamiltonians::{
        ElectronicEnsemble,
        ElectronicHamiltonian,
        Hamiltonian,
        freq_step_from,
    },
    manifold::{ ExcitonBasis, ExcitonState, Manifold },
    nd_utils,
    operators::{ Polarization, Transitions },
};

/// Electronic Hamiltonian coupled to a set of truncated harmonic modes.
#[derive(Clone, Debug)]
pub struct VibronicHamiltonian {
    electronic: ElectronicHamiltonian,
    n_vibrational_levels: Vec<usize>,
    vibrational_energies: Vec<f64>,
    couplings: nd::Array2<f64>,
}

impl VibronicHamiltonian {
    /// Create a new `VibronicHamiltonian`.
    ///
    /// `n_vibrational_levels` and `vibrational_energies` give the basis size
    /// and frequency of each mode; `couplings[[s, m]]` is the linear coupling
    /// strength between site `s` and mode `m`. One mode per site with a
    /// diagonal coupling matrix gives the usual local Holstein model.
    ///
    /// *Panics* if the mode descriptions have unequal lengths, any mode has
    /// zero levels, or `couplings` is not `n_sites × n_modes`.
    pub fn new(
        electronic: ElectronicHamiltonian,
        n_vibrational_levels: Vec<usize>,
        vibrational_energies: Vec<f64>,
        couplings: nd::Array2<f64>,
    ) -> Self
    {
        let n_modes = n_vibrational_levels.len();
        if vibrational_energies.len() != n_modes {
            panic!(
                "VibronicHamiltonian::new: expected one energy per vibrational \
                mode"
            );
        }
        if n_vibrational_levels.iter().any(|n| *n == 0) {
            panic!(
                "VibronicHamiltonian::new: vibrational modes must have at \
                least one level"
            );
        }
        if couplings.shape() != [electronic.n_sites(), n_modes] {
            panic!(
                "VibronicHamiltonian::new: expected {} x {} couplings",
                electronic.n_sites(),
                n_modes,
            );
        }
        debug!(
            "new vibronic Hamiltonian over {} sites and {} modes ({} \
            vibrational states)",
            electronic.n_sites(),
            n_modes,
            n_vibrational_levels.iter().product::<usize>(),
        );
        Self {
            electronic,
            n_vibrational_levels,
            vibrational_energies,
            couplings,
        }
    }

    /// Return a reference to the underlying electronic Hamiltonian.
    pub fn electronic(&self) -> &ElectronicHamiltonian { &self.electronic }

    pub fn n_vibrational_levels(&self) -> &[usize] {
        &self.n_vibrational_levels
    }

    pub fn vibrational_energies(&self) -> &[f64] {
        &self.vibrational_energies
    }

    pub fn couplings(&self) -> &nd::Array2<f64> { &self.couplings }

    /// Return the number of vibrational product states.
    pub fn n_vibrational_states(&self) -> usize {
        self.n_vibrational_levels.iter().product()
    }

    /// Return a copy of `self` around a different electronic Hamiltonian with
    /// the same number of sites.
    fn with_electronic(&self, electronic: ElectronicHamiltonian) -> Self {
        Self { electronic, ..self.clone() }
    }

    fn mode_operator(&self, op: nd::Array2<C64>, mode: usize)
        -> nd::Array2<C64>
    {
        nd_utils::embed(&op, mode, &self.n_vibrational_levels)
    }

    /// Compute the free vibrational Hamiltonian `Σ_m ω_m b_m†b_m` over the
    /// vibrational product space alone.
    pub fn H_vibrational(&self) -> nd::Array2<C64> {
        let n_vib = self.n_vibrational_states();
        self.n_vibrational_levels.iter()
            .zip(&self.vibrational_energies)
            .enumerate()
            .fold(
                nd::Array2::zeros((n_vib, n_vib)),
                |acc, (mode, (n, w))| {
                    acc + self.mode_operator(nd_utils::number(*n), mode) * *w
                },
            )
    }

    /// Compute the electron-vibration coupling `Σ_{s,m} g_sm N_s ⊗ (b_m +
    /// b_m†)` over `manifold`.
    pub fn H_electronic_vibrational(&self, manifold: Manifold)
        -> nd::Array2<C64>
    {
        let n = self.n_states(manifold);
        let displacements: Vec<nd::Array2<C64>>
            = self.n_vibrational_levels.iter().enumerate()
            .map(|(mode, levels)| {
                self.mode_operator(nd_utils::displacement(*levels), mode)
            })
            .collect();
        let numbers: Vec<nd::Array2<C64>>
            = (0..self.n_sites())
            .map(|site| self.electronic.number_operator(site, manifold))
            .collect();
        let mut H: nd::Array2<C64> = nd::Array2::zeros((n, n));
        let iter
            = numbers.iter().enumerate()
            .cartesian_product(displacements.iter().enumerate());
        for ((site, N), (mode, X)) in iter {
            let g = self.couplings[[site, mode]];
            if g == 0.0 { continue; }
            H += &(kron(N, X) * g);
        }
        H
    }

    /// Extend an electronic operator by the identity over all modes.
    fn extend_electronic(&self, op: &nd::Array2<C64>) -> nd::Array2<C64> {
        kron(op, &nd_utils::eye(self.n_vibrational_states()))
    }
}

impl Hamiltonian for VibronicHamiltonian {
    type Ensemble = VibronicEnsemble;

    fn n_sites(&self) -> usize { self.electronic.n_sites() }

    fn sector_sizes(&self, manifold: Manifold) -> Vec<usize> {
        let n_vib = self.n_vibrational_states();
        self.electronic.sector_sizes(manifold).into_iter()
            .map(|n_el| n_el * n_vib)
            .collect()
    }

    fn H(&self, manifold: Manifold) -> nd::Array2<C64> {
        let H_el = self.electronic.H(manifold);
        let n_el = H_el.nrows();
        self.extend_electronic(&H_el)
            + kron(&nd_utils::eye(n_el), &self.H_vibrational())
            + self.H_electronic_vibrational(manifold)
    }

    fn mean_excitation_freq(&self) -> f64 {
        self.electronic.mean_excitation_freq()
    }

    fn freq_step(&self) -> f64 {
        let reference = self.with_electronic(self.electronic.reference());
        freq_step_from(
            &reference.E(Manifold::GEF),
            self.electronic.energy_spread_extra(),
        )
    }

    fn rotating_frame_frequency(&self) -> f64 {
        self.electronic.rotating_frame_frequency()
    }

    /// Thermal state of the vibrational modes on the electronic ground state,
    /// at the bath temperature.
    ///
    /// Falls back to the lowest vibrational level if there is no bath or the
    /// bath is at zero temperature.
    ///
    /// *Panics* if `manifold` does not include the ground sector.
    fn ground_state(&self, manifold: Manifold) -> nd::Array2<C64> {
        let basis = ExcitonBasis::new(self.n_sites(), manifold);
        if basis.index_of(&ExcitonState::Ground).is_none() {
            panic!(
                "VibronicHamiltonian::ground_state: manifold '{}' has no \
                ground sector",
                manifold,
            );
        }
        let temperature: f64
            = self.electronic.bath()
            .map(|bath| bath.temperature())
            .unwrap_or(0.0);
        let rho_g: nd::Array2<C64>
            = if temperature > 0.0 {
                nd_utils::thermal_state(&self.H(Manifold::G), temperature)
            } else {
                let n_vib = self.n_vibrational_states();
                let mut rho: nd::Array2<C64>
                    = nd::Array2::zeros((n_vib, n_vib));
                rho[[0, 0]] = C64::from(1.0);
                rho
            };
        // the ground sector is always the first block
        nd_utils::pad(&rho_g, self.n_states(manifold))
    }

    fn number_operator(&self, site: usize, manifold: Manifold)
        -> nd::Array2<C64>
    {
        self.extend_electronic(&self.electronic.number_operator(site, manifold))
    }

    fn dipole_operator(
        &self,
        manifold: Manifold,
        polarization: Polarization,
        transitions: Transitions,
    ) -> Result<nd::Array2<C64>, HamiltonianError>
    {
        self.electronic.dipole_operator(manifold, polarization, transitions)
            .map(|mu| self.extend_electronic(&mu))
    }

    /// Site number operators extended over all vibrational modes.
    fn system_bath_couplings(&self, manifold: Manifold)
        -> Result<Vec<nd::Array2<C64>>, HamiltonianError>
    {
        Ok(
            (0..self.n_sites())
                .map(|site| self.number_operator(site, manifold))
                .collect()
        )
    }

    fn in_rotating_frame(&self, frequency: f64) -> Self {
        self.with_electronic(self.electronic.in_rotating_frame(frequency))
    }

    fn sample_ensemble(&self, n: usize, random_orientations: bool)
        -> Self::Ensemble
    {
        VibronicEnsemble {
            electronic: self.electronic.sample_ensemble(n, random_orientations),
            template: self.clone(),
        }
    }
}

/// Finite, single-pass iterator over disorder realizations of a
/// [`VibronicHamiltonian`].
///
/// Realizations are drawn from the electronic Hamiltonian and re-dressed with
/// the template's vibrational modes.
#[derive(Clone, Debug)]
pub struct VibronicEnsemble {
    electronic: ElectronicEnsemble,
    template: VibronicHamiltonian,
}

impl Iterator for VibronicEnsemble {
    type Item = VibronicHamiltonian;

    fn next(&mut self) -> Option<Self::Item> {
        self.electronic.next()
            .map(|electronic| self.template.with_electronic(electronic))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.electronic.size_hint()
    }
}

impl ExactSizeIterator for VibronicEnsemble { }

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use crate::bath::ThermalBath;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn real(A: &nd::Array2<C64>) -> nd::Array2<f64> { A.mapv(|a| a.re) }

    fn monomer() -> VibronicHamiltonian {
        let H_el
            = ElectronicHamiltonian::from_real(&nd::array![[1.0]])
            .with_bath(ThermalBath::new(2.0));
        VibronicHamiltonian::new(H_el, vec![2], vec![10.0], nd::array![[5.0]])
    }

    fn dimer() -> VibronicHamiltonian {
        let H_el
            = ElectronicHamiltonian::from_real(&nd::array![
                [1.0, 0.3],
                [0.3, 2.0],
            ])
            .with_dipoles(nd::array![[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]])
            .with_disorder(0.5)
            .with_random_seed(3);
        VibronicHamiltonian::new(
            H_el,
            vec![2, 3],
            vec![0.7, 1.1],
            nd::array![[0.2, 0.0], [0.0, 0.4]],
        )
    }

    #[test]
    fn properties() {
        init();
        let H = monomer();
        assert_eq!(H.n_sites(), 1);
        assert_eq!(H.n_vibrational_states(), 2);
        assert_eq!(H.n_states(Manifold::GEF), 4);
        assert_eq!(
            real(&H.H(Manifold::GE)),
            nd::array![
                [0.0,  0.0, 0.0,  0.0],
                [0.0, 10.0, 0.0,  0.0],
                [0.0,  0.0, 1.0,  5.0],
                [0.0,  0.0, 5.0, 11.0],
            ],
        );
        let rho = H.ground_state(Manifold::G);
        let Z = 1.0 + (-5.0_f64).exp();
        let expected = [[1.0 / Z, 0.0], [0.0, (-5.0_f64).exp() / Z]];
        for ((i, j), r) in rho.indexed_iter() {
            assert_abs_diff_eq!(r.re, expected[i][j], epsilon = 1e-12);
            assert_abs_diff_eq!(r.im, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn ground_state_embedding() {
        let H = monomer();
        let rho = H.ground_state(Manifold::GE);
        assert_eq!(rho.shape(), &[4, 4]);
        let tr: C64 = rho.diag().iter().sum();
        assert_abs_diff_eq!(tr.re, 1.0, epsilon = 1e-12);
        assert!(rho.slice(nd::s![2.., ..]).iter().all(|r| r.norm() < 1e-15));

        let H_el = ElectronicHamiltonian::from_real(&nd::array![[1.0]]);
        let cold = VibronicHamiltonian::new(
            H_el, vec![3], vec![1.0], nd::array![[0.5]]);
        assert_eq!(
            real(&cold.ground_state(Manifold::GE)),
            nd_utils::pad(&nd::array![[C64::from(1.0)]], 6).mapv(|r| r.re),
        );
    }

    #[test]
    fn spectrum_sizes() {
        let H = dimer();
        for manifold in ["g", "e", "f", "ge", "gef"] {
            let manifold: Manifold = manifold.parse().unwrap();
            assert_eq!(H.E(manifold).len(), H.n_states(manifold));
            assert_eq!(
                H.n_states(manifold),
                crate::manifold::n_states(2, manifold) * 6,
            );
        }
        let Hm = H.H(Manifold::GEF);
        assert_eq!(Hm, Hm.t().mapv(|h| h.conj()));
    }

    #[test]
    fn vibrational_parts() {
        let H = dimer();
        let Hv = real(&H.H_vibrational());
        // modes (2 levels, 0.7), (3 levels, 1.1); last mode fastest
        let expected = [0.0, 1.1, 2.2, 0.7, 1.8, 2.9];
        for (k, e) in expected.iter().enumerate() {
            assert_abs_diff_eq!(Hv[[k, k]], *e, epsilon = 1e-12);
        }
        let Hev = H.H_electronic_vibrational(Manifold::G);
        assert!(Hev.iter().all(|h| h.norm() == 0.0));
        let Hev = real(&H.H_electronic_vibrational(Manifold::E));
        // site 0 couples to mode 0: |e0; 0, k> <-> |e0; 1, k>
        assert_abs_diff_eq!(Hev[[0, 3]], 0.2, epsilon = 1e-12);
        // site 1 couples to mode 1: |e1; j, 0> <-> |e1; j, 1>
        assert_abs_diff_eq!(Hev[[6, 7]], 0.4, epsilon = 1e-12);
        assert_abs_diff_eq!(Hev[[7, 8]], 0.4 * 2.0_f64.sqrt(), epsilon = 1e-12);
        assert_abs_diff_eq!(Hev[[0, 1]], 0.0);
    }

    #[test]
    fn operators() {
        let H = monomer();
        let couplings = H.system_bath_couplings(Manifold::GE).unwrap();
        assert_eq!(couplings.len(), 1);
        assert_eq!(
            real(&couplings[0]),
            nd::array![
                [0.0, 0.0, 0.0, 0.0],
                [0.0, 0.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        );
        assert_eq!(
            H.dipole_operator(Manifold::GE, Polarization::X, Transitions::BOTH),
            Err(HamiltonianError::MissingDipoles),
        );
        let mu
            = dimer()
            .dipole_operator(Manifold::GE, Polarization::Y, Transitions::RAISE)
            .unwrap();
        assert_eq!(mu.shape(), &[18, 18]);
        // |e1; v> <- |g; v>
        for v in 0..6 {
            assert_eq!(mu[[12 + v, v]], C64::from(1.0));
        }
        assert!(mu.slice(nd::s![6..12, ..]).iter().all(|m| m.norm() == 0.0));
    }

    #[test]
    fn sample_ensemble() {
        let H = monomer();
        let H_sampled = H.sample_ensemble(1, false).next().unwrap();
        assert_eq!(H_sampled.freq_step(), H.freq_step());
        assert_eq!(H_sampled.time_step(), H.time_step());
        assert_eq!(
            H_sampled.in_mean_rotating_frame().time_step(),
            H.in_mean_rotating_frame().time_step(),
        );
        let H_rw_sampled
            = H.in_mean_rotating_frame().sample_ensemble(1, false)
            .next().unwrap();
        assert_eq!(
            H_sampled.in_mean_rotating_frame().H(Manifold::GEF),
            H_rw_sampled.H(Manifold::GEF),
        );

        let H = dimer();
        let ensemble = H.sample_ensemble(4, true);
        assert_eq!(ensemble.len(), 4);
        for (h, h_el) in ensemble.zip(H.electronic().sample_ensemble(4, true)) {
            assert_eq!(h.electronic().H(Manifold::GEF), h_el.H(Manifold::GEF));
            assert_eq!(h.electronic().dipoles(), h_el.dipoles());
            assert_eq!(h.freq_step(), H.freq_step());
        }
        let lhs: Vec<_>
            = H.sample_ensemble(3, false)
            .map(|h| h.in_rotating_frame(1.5).H(Manifold::GEF))
            .collect();
        let rhs: Vec<_>
            = H.in_rotating_frame(1.5).sample_ensemble(3, false)
            .map(|h| h.H(Manifold::GEF))
            .collect();
        assert_eq!(lhs, rhs);
    }

    #[test]
    fn rotating_frame() {
        let H = monomer();
        let H_rw = H.in_rotating_frame(4.0).in_rotating_frame(1.0);
        assert_eq!(H_rw.rotating_frame_frequency(), 1.0);
        assert_eq!(H_rw.mean_excitation_freq(), H.mean_excitation_freq());
        assert_eq!(
            real(&H_rw.H(Manifold::GE)),
            nd::array![
                [0.0,  0.0, 0.0,  0.0],
                [0.0, 10.0, 0.0,  0.0],
                [0.0,  0.0, 0.0,  5.0],
                [0.0,  0.0, 5.0, 10.0],
            ],
        );
        assert_eq!(
            H_rw.in_rotating_frame(0.0).H(Manifold::GEF),
            H.H(Manifold::GEF),
        );
    }

    #[test]
    #[should_panic]
    fn zero_vibrational_levels() {
        let H_el = ElectronicHamiltonian::from_real(&nd::array![[1.0]]);
        VibronicHamiltonian::new(H_el, vec![0], vec![1.0], nd::array![[0.0]]);
    }

    #[test]
    #[should_panic]
    fn mismatched_couplings() {
        let H_el = ElectronicHamiltonian::from_real(&nd::array![[1.0]]);
        VibronicHamiltonian::new(
            H_el, vec![2], vec![1.0], nd::array![[0.0, 1.0]]);
    }
}
