use crate::fock::{FockState, Spin};
use nalgebra::{DMatrix, DVector, SymmetricEigen};
#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::fmt::{Display, Error, Formatter};
use thiserror::Error as ThisError;

/// Errors raised while assembling a block from an association list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
pub enum BlockError {
    /// A block cannot be built from an empty association list.
    #[error("cannot build a block from an empty association list")]
    EmptyAssociations,
    /// A non-identity association must connect states differing in exactly two
    /// spin-orbitals; anything else breaks the single-hop contract.
    #[error("association endpoints differ in {0} spin-orbitals, expected exactly 2")]
    MalformedAssociation(usize),
}

/// One allowed hopping transition between two Fock states.
///
/// The destination's accumulated sign, relative to a sign +1 source, is the
/// fermionic sign of the corresponding hopping matrix element.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Association {
    /// The state the hop was applied to.
    pub source: FockState,
    /// The resulting state, carrying the transition sign.
    pub dest: FockState,
}

impl Association {
    /// Record a transition from `source` to `dest`.
    pub fn new(source: FockState, dest: FockState) -> Self {
        Self { source, dest }
    }

    /// A state associated with itself, the sentinel for basis states with no
    /// allowed hopping move. Such states still form valid 1x1 blocks.
    pub fn identity(state: FockState) -> Self {
        Self {
            source: state,
            dest: state,
        }
    }
}

/// A hopping-closed set of Fock states with its Hamiltonian and lowest eigenpair.
///
/// Member states are ordered by ascending bit pattern; that ordering is the
/// matrix row/column index map. All members share the same electron count and
/// total spin since both are conserved by the hopping term.
#[derive(Clone, Debug)]
pub struct Block {
    states: Vec<FockState>,
    matrix: DMatrix<f64>,
    energy: f64,
    eigenvector: DVector<f64>,
    total_spin: i32,
    electrons: u32,
}

impl Block {
    /// Build and diagonalize a block from the associations discovered by
    /// closure search, given the three couplings and the hopping topology.
    pub fn new(
        associations: &[Association],
        t: f64,
        u: f64,
        mu: f64,
        hopping: &DMatrix<f64>,
    ) -> Result<Self, BlockError> {
        if associations.is_empty() {
            return Err(BlockError::EmptyAssociations);
        }
        let mut states = unique_states(associations);
        let matrix = calculate_matrix(&states, associations, t, u, mu, hopping)?;

        let eigen = SymmetricEigen::new(matrix.clone());
        // The eigensolver does not order its spectrum.
        let mut lowest = 0;
        for (index, &value) in eigen.eigenvalues.iter().enumerate() {
            if value < eigen.eigenvalues[lowest] {
                lowest = index;
            }
        }
        let energy = eigen.eigenvalues[lowest];
        let eigenvector = eigen.eigenvectors.column(lowest).into_owned();

        let total_spin = states[0].total_spin();
        let electrons = states[0].electrons();
        // Sign is transition bookkeeping; canonical members carry +1.
        states.iter_mut().for_each(|state| state.reset_sign());

        Ok(Self {
            states,
            matrix,
            energy,
            eigenvector,
            total_spin,
            electrons,
        })
    }

    /// Member states, in ascending bit-pattern order.
    pub fn states(&self) -> &[FockState] {
        &self.states
    }

    /// The block's Hamiltonian matrix.
    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }

    /// The lowest eigenvalue.
    pub fn energy(&self) -> f64 {
        self.energy
    }

    /// The eigenvector paired with [`Self::energy`].
    pub fn eigenvector(&self) -> &DVector<f64> {
        &self.eigenvector
    }

    /// Total spin shared by every member state.
    pub fn total_spin(&self) -> i32 {
        self.total_spin
    }

    /// Electron count shared by every member state.
    pub fn electrons(&self) -> u32 {
        self.electrons
    }

    /// Number of member states, which is also the matrix dimension.
    pub fn dimension(&self) -> usize {
        self.states.len()
    }
}

impl Display for Block {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        writeln!(f, "Lowest Energy : {}", self.energy)?;
        writeln!(f, "Eigen Vector : {:?}", self.eigenvector.as_slice())?;
        writeln!(
            f,
            "This block has {} electron(s) for a total spin of {}.",
            self.electrons, self.total_spin
        )?;
        let states = self
            .states
            .iter()
            .map(|state| state.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(f, "States : [{}]", states)?;
        write!(f, "{}", self.matrix)
    }
}

/// Deduplicate association endpoints by bit pattern, ascending.
fn unique_states(associations: &[Association]) -> Vec<FockState> {
    let mut by_pattern = BTreeMap::new();
    for association in associations {
        by_pattern
            .entry(association.source.pattern())
            .or_insert(association.source);
        by_pattern
            .entry(association.dest.pattern())
            .or_insert(association.dest);
    }
    by_pattern.into_values().collect()
}

/// The pair of sites whose orbitals differ between the association's endpoints.
fn permutation_sites(association: &Association) -> Result<(usize, usize), BlockError> {
    let differing = association.source.pattern() ^ association.dest.pattern();
    let orbitals = (0..2 * association.source.sites())
        .filter(|index| differing >> index & 1 == 1)
        .collect::<SmallVec<[usize; 2]>>();
    if orbitals.len() != 2 {
        return Err(BlockError::MalformedAssociation(orbitals.len()));
    }
    Ok((orbitals[0] / 2, orbitals[1] / 2))
}

fn calculate_matrix(
    states: &[FockState],
    associations: &[Association],
    t: f64,
    u: f64,
    mu: f64,
    hopping: &DMatrix<f64>,
) -> Result<DMatrix<f64>, BlockError> {
    let sites = states[0].sites();
    let patterns = states.iter().map(|state| state.pattern()).collect::<Vec<_>>();
    let mut matrix = DMatrix::zeros(states.len(), states.len());

    // Hopping. Hermiticity follows from the association list holding both hop
    // directions, it is not enforced here.
    for association in associations {
        if association.source.pattern() == association.dest.pattern() {
            continue;
        }
        let (site_a, site_b) = permutation_sites(association)?;
        if hopping[(site_a, site_b)] != 0.0 {
            let row = patterns
                .binary_search(&association.source.pattern())
                .expect("endpoint missing from block basis");
            let column = patterns
                .binary_search(&association.dest.pattern())
                .expect("endpoint missing from block basis");
            matrix[(row, column)] += t * f64::from(association.dest.sign());
        }
    }

    // On-site interaction. The probe chains both spin channels on one scratch
    // copy, so it survives only when the site is doubly occupied.
    for (index, &pattern) in patterns.iter().enumerate() {
        let mut probe = FockState::new(sites, pattern);
        for site in 0..sites {
            for spin in Spin::both() {
                probe.destroy(site, spin);
                probe.create(site, spin);
            }
            if !probe.is_void() {
                matrix[(index, index)] += u;
            }
            probe.reset(pattern);
        }
    }

    // Chemical potential, -mu per occupied spin-orbital.
    for (index, &pattern) in patterns.iter().enumerate() {
        let mut probe = FockState::new(sites, pattern);
        for site in 0..sites {
            for spin in Spin::both() {
                probe.destroy(site, spin);
                probe.create(site, spin);
                if !probe.is_void() {
                    matrix[(index, index)] -= mu;
                }
                probe.reset(pattern);
            }
        }
    }

    Ok(matrix)
}
