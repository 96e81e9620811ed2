//! Numerical helpers on dense `ndarray` matrices: Hermitian eigensolves,
//! thermal states, harmonic-oscillator ladder operators, and Kronecker
//! embeddings.

use ndarray::{ self as nd, s, linalg::kron };
use ndarray_linalg::{ Eigh, EigValsh, UPLO };
use num_complex::Complex64 as C64;
use rand::Rng;
use rand_distr::{ Distribution, StandardNormal };

/// Ratio of the standard deviation of a Gaussian to its full width at half
/// maximum, `1 / (2 √(2 ln 2))`.
pub const GAUSSIAN_SD_FWHM: f64 = 0.42466090014400953;

/// Return the `n × n` complex identity.
pub fn eye(n: usize) -> nd::Array2<C64> { nd::Array2::eye(n) }

/* Eigen-decomposition ********************************************************/

/// Diagonalize a Hermitian matrix, returning eigenvalues in ascending order and
/// the corresponding eigenvectors as columns.
pub fn eigh(H: &nd::Array2<C64>) -> (nd::Array1<f64>, nd::Array2<C64>) {
    if H.is_empty() {
        return (nd::Array1::zeros(0), nd::Array2::zeros((0, 0)));
    }
    match H.eigh(UPLO::Lower) {
        Ok((E, V)) => (E, V),
        Err(err) => panic!("unexpected diagonalization error: {}", err),
    }
}

/// Return the eigenvalues of a Hermitian matrix in ascending order.
pub fn eigvalsh(H: &nd::Array2<C64>) -> nd::Array1<f64> {
    if H.is_empty() { return nd::Array1::zeros(0); }
    match H.eigvalsh(UPLO::Lower) {
        Ok(E) => E,
        Err(err) => panic!("unexpected diagonalization error: {}", err),
    }
}

/// Diagonalize a block-diagonal Hermitian matrix block by block.
///
/// `sizes` gives the dimension of each diagonal block in order. Eigenvalues are
/// sorted within each block only, and the eigenvector matrix is itself
/// block-diagonal.
///
/// *Panics* if `sizes` does not sum to the dimension of `H`.
pub fn eigh_blocks(H: &nd::Array2<C64>, sizes: &[usize])
    -> (nd::Array1<f64>, nd::Array2<C64>)
{
    let n: usize = sizes.iter().sum();
    if H.shape() != [n, n] {
        panic!("eigh_blocks: block sizes do not match matrix shape");
    }
    let mut E: nd::Array1<f64> = nd::Array1::zeros(n);
    let mut V: nd::Array2<C64> = nd::Array2::zeros((n, n));
    let mut start: usize = 0;
    for &size in sizes.iter() {
        let end = start + size;
        let (e, v) = eigh(&H.slice(s![start..end, start..end]).to_owned());
        e.move_into(E.slice_mut(s![start..end]));
        v.move_into(V.slice_mut(s![start..end, start..end]));
        start = end;
    }
    (E, V)
}

/// Like [`eigh_blocks`], but return only the eigenvalues.
pub fn eigvalsh_blocks(H: &nd::Array2<C64>, sizes: &[usize])
    -> nd::Array1<f64>
{
    let mut start: usize = 0;
    let mut E: Vec<f64> = Vec::with_capacity(H.nrows());
    for &size in sizes.iter() {
        let end = start + size;
        E.extend(
            eigvalsh(&H.slice(s![start..end, start..end]).to_owned())
                .iter().copied()
        );
        start = end;
    }
    if start != H.nrows() {
        panic!("eigvalsh_blocks: block sizes do not match matrix shape");
    }
    nd::Array1::from(E)
}

/* States *********************************************************************/

/// Compute the Boltzmann density matrix `exp(-H / T) / Tr exp(-H / T)` for a
/// Hermitian `H`, with temperature in units of energy.
///
/// The spectrum is shifted by its minimum before exponentiating, so the result
/// stays finite for arbitrarily wide spectra.
///
/// *Panics* if `temperature` is not strictly positive; the zero-temperature
/// limit (a ground-state projector) must be handled by the caller.
pub fn thermal_state(H: &nd::Array2<C64>, temperature: f64)
    -> nd::Array2<C64>
{
    if temperature <= 0.0 || temperature.is_nan() {
        panic!("thermal_state: temperature must be positive");
    }
    let (E, V) = eigh(H);
    let e_min: f64 = E.iter().copied().fold(f64::INFINITY, f64::min);
    let boltzmann: nd::Array1<f64>
        = E.mapv(|e| (-(e - e_min) / temperature).exp());
    let Z: f64 = boltzmann.sum();
    let weights: nd::Array2<C64>
        = nd::Array2::from_diag(&boltzmann.mapv(|p| C64::from(p / Z)));
    V.dot(&weights).dot(&V.t().mapv(|v| v.conj()))
}

/// Place `block` at the top-left corner of an otherwise zero `n × n` matrix.
///
/// *Panics* if `block` is larger than `n × n`.
pub fn pad(block: &nd::Array2<C64>, n: usize) -> nd::Array2<C64> {
    let (r, c) = block.dim();
    if r > n || c > n {
        panic!("pad: block does not fit");
    }
    let mut out: nd::Array2<C64> = nd::Array2::zeros((n, n));
    out.slice_mut(s![..r, ..c]).assign(block);
    out
}

/* Ladder operators ***********************************************************/

/// Annihilation operator `b` on a harmonic oscillator truncated to `n`
/// levels.
pub fn annihilation(n: usize) -> nd::Array2<C64> {
    let mut b: nd::Array2<C64> = nd::Array2::zeros((n, n));
    if n < 2 { return b; }
    b.slice_mut(s![..n - 1, 1..n])
        .diag_mut()
        .indexed_iter_mut()
        .for_each(|(k, elem)| {
            *elem = C64::from((k as f64 + 1.0).sqrt());
        });
    b
}

/// Displacement operator `b + b†` on a harmonic oscillator truncated to `n`
/// levels; nonzero only on the rungs adjacent to the diagonal.
pub fn displacement(n: usize) -> nd::Array2<C64> {
    let b = annihilation(n);
    let bdag = b.t().to_owned();
    b + bdag
}

/// Number operator `b†b` on a harmonic oscillator truncated to `n` levels.
pub fn number(n: usize) -> nd::Array2<C64> {
    nd::Array2::from_diag(
        &(0..n).map(|k| C64::from(k as f64)).collect::<nd::Array1<C64>>()
    )
}

/* Product spaces *************************************************************/

/// Embed an operator acting on the `position`-th factor of a tensor product
/// space with factor dimensions `dims`, acting as the identity on all other
/// factors. The first factor is outermost.
///
/// *Panics* if `op` does not match `dims[position]`.
pub fn embed(op: &nd::Array2<C64>, position: usize, dims: &[usize])
    -> nd::Array2<C64>
{
    if op.shape() != [dims[position]; 2] {
        panic!("embed: operator does not match factor dimension");
    }
    dims.iter().enumerate()
        .fold(eye(1), |acc, (k, &d)| {
            if k == position { kron(&acc, op) } else { kron(&acc, &eye(d)) }
        })
}

/* Rotations ******************************************************************/

/// Draw a rotation matrix uniformly from SO(3).
///
/// Built from a unit quaternion whose four components are normalized
/// standard-normal draws.
pub fn random_rotation<R>(rng: &mut R) -> nd::Array2<f64>
where R: Rng + ?Sized
{
    let q: [f64; 4] = [
        StandardNormal.sample(rng),
        StandardNormal.sample(rng),
        StandardNormal.sample(rng),
        StandardNormal.sample(rng),
    ];
    let N: f64 = q.iter().map(|qk| qk * qk).sum::<f64>().sqrt();
    let [w, x, y, z] = q.map(|qk| qk / N);
    nd::array![
        [
            1.0 - 2.0 * (y * y + z * z),
            2.0 * (x * y - z * w),
            2.0 * (x * z + y * w),
        ],
        [
            2.0 * (x * y + z * w),
            1.0 - 2.0 * (x * x + z * z),
            2.0 * (y * z - x * w),
        ],
        [
            2.0 * (x * z - y * w),
            2.0 * (y * z + x * w),
            1.0 - 2.0 * (x * x + y * y),
        ],
    ]
}
