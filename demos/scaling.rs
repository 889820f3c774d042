use hubbard_ed::lattice::{balanced_extents, rectangular_hopping};
use hubbard_ed::model::HubbardModel;
use std::time::Instant;

fn main() {
    for sites in 1..=6 {
        let (rows, columns) = balanced_extents(sites);

        let start = Instant::now();
        let mut model =
            HubbardModel::new(sites, -1.0, 4.0, 2.0, rectangular_hopping(rows, columns));
        model
            .calculate_all_blocks()
            .expect("closure search yields well-formed associations");

        println!(
            "N = {} ({}x{}) is done. Ground energy : {:.6}. Time : {:?}",
            sites,
            rows,
            columns,
            model.ground_energy().unwrap_or(f64::NAN),
            start.elapsed()
        );
    }
}
