use hubbard_ed::lattice::rectangular_hopping;
use hubbard_ed::model::HubbardModel;
use std::time::Instant;

fn main() {
    let start = Instant::now();

    let mut model = HubbardModel::new(2, -1.0, 4.0, 2.0, rectangular_hopping(2, 1));
    model
        .calculate_all_blocks()
        .expect("closure search yields well-formed associations");

    println!("{}", model);
    println!("Time : {:?}", start.elapsed());
}
