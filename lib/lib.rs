#![allow(dead_code, non_snake_case, non_upper_case_globals)]

//! Exciton Hamiltonians for nonlinear-spectroscopy simulations: electronic
//! models over ground, single-, and double-excitation manifolds, optionally
//! dressed with explicit vibrational modes, plus static-disorder ensembles.

pub mod error;
pub mod manifold;
pub mod nd_utils;
pub mod operators;
pub mod bath;
pub mod hamiltonians;

pub use error::{ HamiltonianError, ParseError };
pub use manifold::{ ExcitonBasis, ExcitonState, Manifold, Sector };
pub use operators::{ Polarization, Transitions };
pub use bath::{ Bath, ThermalBath };
pub use hamiltonians::{
    Disorder,
    ElectronicHamiltonian,
    ElectronicParams,
    Hamiltonian,
    VibronicHamiltonian,
};
