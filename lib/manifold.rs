//! Excitation sectors, manifolds, and the ordering of their basis states.
//!
//! Every operator in this crate is laid out according to [`ExcitonBasis`]:
//! sectors appear in the order ground → single → double, single-exciton
//! states are ordered by site index, and double-exciton states by
//! lexicographic site pair `(i, j)` with `i < j`.

use std::{ fmt, ops::Range, str::FromStr };
use indexmap::IndexSet;
use itertools::Itertools;
use crate::error::ParseError;

/* Sectors ********************************************************************/

/// A block of basis states sharing the same total excitation number.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Sector {
    /// No excitations (`g`).
    Ground,
    /// One excitation (`e`).
    Single,
    /// Two excitations on distinct sites (`f`).
    Double,
}

impl Sector {
    /// All sectors in block order.
    pub const ALL: [Self; 3] = [Self::Ground, Self::Single, Self::Double];

    /// Return the number of excitation quanta carried by every state in the
    /// sector.
    pub fn excitations(self) -> usize {
        match self {
            Self::Ground => 0,
            Self::Single => 1,
            Self::Double => 2,
        }
    }

    /// Return the number of basis states in the sector for `n_sites` sites.
    ///
    /// The double sector of a single site is empty.
    pub fn size(self, n_sites: usize) -> usize {
        match self {
            Self::Ground => 1,
            Self::Single => n_sites,
            Self::Double => n_sites * n_sites.saturating_sub(1) / 2,
        }
    }

    /// Return the single-character tag of the sector.
    pub fn tag(self) -> char {
        match self {
            Self::Ground => 'g',
            Self::Single => 'e',
            Self::Double => 'f',
        }
    }

    /// Parse a single-character tag.
    pub fn from_tag(tag: char) -> Option<Self> {
        match tag {
            'g' => Some(Self::Ground),
            'e' => Some(Self::Single),
            'f' => Some(Self::Double),
            _ => None,
        }
    }

    /// Enumerate the basis states of the sector in their canonical order.
    pub fn states(self, n_sites: usize) -> Vec<ExcitonState> {
        match self {
            Self::Ground => vec![ExcitonState::Ground],
            Self::Single => (0..n_sites).map(ExcitonState::Single).collect(),
            Self::Double
                => (0..n_sites).tuple_combinations()
                .map(|(i, j)| ExcitonState::Double(i, j))
                .collect(),
        }
    }
}

/* Manifolds ******************************************************************/

/// A set of [`Sector`]s over which an operator is built.
///
/// Written as a string of sector tags, e.g. `"gef"`. Character order in the
/// string is irrelevant; blocks always follow [`Sector::ALL`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Manifold {
    ground: bool,
    single: bool,
    double: bool,
}

impl Manifold {
    pub const G: Self = Self::new(true, false, false);
    pub const E: Self = Self::new(false, true, false);
    pub const F: Self = Self::new(false, false, true);
    pub const GE: Self = Self::new(true, true, false);
    pub const EF: Self = Self::new(false, true, true);
    pub const GEF: Self = Self::new(true, true, true);

    /// Create a new manifold from sector flags.
    pub const fn new(ground: bool, single: bool, double: bool) -> Self {
        Self { ground, single, double }
    }

    /// Return `true` if `sector` is included.
    pub fn contains(self, sector: Sector) -> bool {
        match sector {
            Sector::Ground => self.ground,
            Sector::Single => self.single,
            Sector::Double => self.double,
        }
    }

    /// Iterate over the included sectors in block order.
    pub fn sectors(self) -> impl Iterator<Item = Sector> {
        Sector::ALL.into_iter().filter(move |sector| self.contains(*sector))
    }

    /// Return the size of each included sector, in block order.
    pub fn sector_sizes(self, n_sites: usize) -> Vec<usize> {
        self.sectors().map(|sector| sector.size(n_sites)).collect()
    }

    /// Return the total number of basis states.
    pub fn n_states(self, n_sites: usize) -> usize {
        self.sectors().map(|sector| sector.size(n_sites)).sum()
    }
}

impl FromStr for Manifold {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() { return Err(ParseError::EmptyManifold); }
        let mut manifold = Self::new(false, false, false);
        for tag in s.chars() {
            match Sector::from_tag(tag) {
                Some(Sector::Ground) => { manifold.ground = true; },
                Some(Sector::Single) => { manifold.single = true; },
                Some(Sector::Double) => { manifold.double = true; },
                None => { return Err(ParseError::ManifoldTag(tag)); },
            }
        }
        Ok(manifold)
    }
}

impl fmt::Display for Manifold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.sectors().try_for_each(|sector| write!(f, "{}", sector.tag()))
    }
}

/// Return the number of basis states in `manifold` for `n_sites` sites.
pub fn n_states(n_sites: usize, manifold: Manifold) -> usize {
    manifold.n_states(n_sites)
}

/* States *********************************************************************/

/// A single electronic basis state, labeled by its excited sites.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ExcitonState {
    Ground,
    Single(usize),
    /// Always stored with the lower site index first.
    Double(usize, usize),
}

impl ExcitonState {
    /// Return the sector containing `self`.
    pub fn sector(&self) -> Sector {
        match self {
            Self::Ground => Sector::Ground,
            Self::Single(_) => Sector::Single,
            Self::Double(..) => Sector::Double,
        }
    }

    /// Return `true` if `site` carries an excitation in `self`.
    pub fn excites(&self, site: usize) -> bool {
        match *self {
            Self::Ground => false,
            Self::Single(i) => i == site,
            Self::Double(i, j) => i == site || j == site,
        }
    }
}

/* Bases **********************************************************************/

/// The ordered collection of [`ExcitonState`]s spanning a manifold.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExcitonBasis {
    n_sites: usize,
    manifold: Manifold,
    states: IndexSet<ExcitonState>,
}

impl ExcitonBasis {
    /// Enumerate the basis of `manifold` for `n_sites` sites.
    pub fn new(n_sites: usize, manifold: Manifold) -> Self {
        let states: IndexSet<ExcitonState>
            = manifold.sectors()
            .flat_map(|sector| sector.states(n_sites))
            .collect();
        Self { n_sites, manifold, states }
    }

    pub fn n_sites(&self) -> usize { self.n_sites }

    pub fn manifold(&self) -> Manifold { self.manifold }

    /// Return the total number of basis states.
    pub fn len(&self) -> usize { self.states.len() }

    pub fn is_empty(&self) -> bool { self.states.is_empty() }

    /// Return the global index of a state, if present.
    pub fn index_of(&self, state: &ExcitonState) -> Option<usize> {
        self.states.get_index_of(state)
    }

    /// Return the state at a global index, if present.
    pub fn get(&self, index: usize) -> Option<&ExcitonState> {
        self.states.get_index(index)
    }

    /// Iterate over all states in order.
    pub fn iter(&self) -> indexmap::set::Iter<'_, ExcitonState> {
        self.states.iter()
    }

    /// Return the range of global indices covered by `sector`, if it is part of
    /// the manifold.
    pub fn sector_range(&self, sector: Sector) -> Option<Range<usize>> {
        if !self.manifold.contains(sector) { return None; }
        let start: usize
            = self.manifold.sectors()
            .take_while(|s| *s != sector)
            .map(|s| s.size(self.n_sites))
            .sum();
        Some(start..start + sector.size(self.n_sites))
    }

    /// Return the size of each included sector, in block order.
    pub fn sector_sizes(&self) -> Vec<usize> {
        self.manifold.sector_sizes(self.n_sites)
    }
}

impl<'a> IntoIterator for &'a ExcitonBasis {
    type Item = &'a ExcitonState;
    type IntoIter = indexmap::set::Iter<'a, ExcitonState>;

    fn into_iter(self) -> Self::IntoIter { self.states.iter() }
}
