use hubbard_ed::lattice::{balanced_extents, rectangular_hopping};
use hubbard_ed::model::HubbardModel;
use nalgebra::DMatrix;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn sorted_member_patterns(model: &HubbardModel) -> Vec<u64> {
    let mut patterns = model
        .blocks()
        .flat_map(|block| block.states().iter().map(|state| state.pattern()))
        .collect::<Vec<_>>();
    patterns.sort_unstable();
    patterns
}

fn assert_partitions_fock_space(model: &HubbardModel) {
    let sites = model.sites();
    let full_basis = (0..1u64 << (2 * sites)).collect::<Vec<_>>();
    assert_eq!(sorted_member_patterns(model), full_basis);
    assert_eq!(model.unassigned_states(), 0);
}

#[test]
fn blocks_partition_the_basis_on_small_lattices() {
    for sites in 1..=3 {
        let (rows, columns) = balanced_extents(sites);
        let mut model =
            HubbardModel::new(sites, -1.0, 4.0, 2.0, rectangular_hopping(rows, columns));
        model.calculate_all_blocks().unwrap();
        assert_partitions_fock_space(&model);
    }
}

#[test]
fn blocks_are_sector_uniform() {
    let mut model = HubbardModel::new(3, -1.0, 4.0, 2.0, rectangular_hopping(3, 1));
    model.calculate_all_blocks().unwrap();
    for block in model.blocks() {
        for state in block.states() {
            assert_eq!(state.electrons(), block.electrons());
            assert_eq!(state.total_spin(), block.total_spin());
            assert_eq!(state.sign(), 1);
            assert!(!state.is_void());
        }
    }
}

#[test]
fn zero_topology_isolates_every_state() {
    let sites = 2;
    let mut model = HubbardModel::new(sites, -1.0, 4.0, 2.0, DMatrix::zeros(sites, sites));
    model.calculate_all_blocks().unwrap();
    assert_eq!(model.blocks().count(), 1 << (2 * sites));
    assert!(model.blocks().all(|block| block.dimension() == 1));
    assert_partitions_fock_space(&model);
}

#[test]
fn random_topologies_still_partition() {
    let mut rng = ChaCha8Rng::seed_from_u64(1234);
    let sites = 3;
    for _ in 0..8 {
        let mut hopping = DMatrix::zeros(sites, sites);
        for i in 0..sites {
            for j in 0..i {
                if rng.gen_bool(0.5) {
                    hopping[(i, j)] = 1.0;
                    hopping[(j, i)] = 1.0;
                }
            }
        }
        let mut model = HubbardModel::new(sites, -1.0, 4.0, 2.0, hopping);
        model.calculate_all_blocks().unwrap();
        assert_partitions_fock_space(&model);
    }
}
