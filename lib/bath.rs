//! Interface to the thermal environment.

use std::fmt;

/// A dissipative environment coupled to every site.
///
/// Only the temperature is consumed here, in units of energy (Boltzmann's
/// constant absorbed), for building thermal initial states. Spectral densities
/// and correlation functions belong to the propagators that use the
/// [system-bath couplings][couplings].
///
/// [couplings]: crate::hamiltonians::Hamiltonian::system_bath_couplings
pub trait Bath: fmt::Debug + Send + Sync {
    fn temperature(&self) -> f64;
}

/// A bath characterized by nothing but its temperature.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ThermalBath {
    pub temperature: f64,
}

impl ThermalBath {
    pub fn new(temperature: f64) -> Self { Self { temperature } }
}

impl Bath for ThermalBath {
    fn temperature(&self) -> f64 { self.temperature }
}
