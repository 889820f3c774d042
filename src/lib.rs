#![deny(
    missing_docs,
    unreachable_pub,
    missing_debug_implementations,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unused_import_braces,
    unused_qualifications
)]

//! `hubbard-ed` performs exact diagonalization of finite Fermi-Hubbard lattice
//! models.
//!
//! The many-body occupation basis over `2N` spin-orbitals is enumerated as bit
//! patterns, partitioned into hopping-closed blocks by breadth-first closure
//! search, and each block's Hamiltonian is assembled from the hopping (`t`),
//! on-site interaction (`U`) and chemical potential (`mu`) contributions and
//! diagonalized independently. The global ground state is the lowest eigenpair
//! across all blocks, accumulated over near-degenerate sectors.
//!
//! # Two-site chain example
//! ```
//! use hubbard_ed::lattice::rectangular_hopping;
//! use hubbard_ed::model::HubbardModel;
//!
//! // H = t sum c^dag_i c_j + U sum n_up n_down - mu sum n
//! let hopping = rectangular_hopping(2, 1);
//! let mut model = HubbardModel::new(2, -1.0, 4.0, 2.0, hopping);
//! model.calculate_all_blocks().unwrap();
//!
//! // Half-filled singlet ground state.
//! let energy = model.ground_energy().unwrap();
//! assert!((energy + 4.8284271).abs() < 1e-6);
//! let ground = model.smallest_spin_ground_block().unwrap();
//! assert_eq!(ground.electrons(), 2);
//! assert_eq!(ground.total_spin(), 0);
//! ```

/// Hopping-closed blocks of Fock states and their Hamiltonians.
pub mod block;
/// Bit-encoded Fock states with fermionic operator semantics.
pub mod fock;
/// Hopping-topology generators for rectangular lattices.
pub mod lattice;
/// The Hubbard model manager: block discovery and ground-state search.
pub mod model;
