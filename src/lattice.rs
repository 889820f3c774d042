use itertools::Itertools;
use nalgebra::DMatrix;

/// Nearest-neighbor hopping matrix for a `rows` x `columns` rectangular lattice.
///
/// Sites are ordered row-major. The entry is 1.0 between sites whose lattice
/// coordinates differ by one unit in exactly one coordinate (open boundaries),
/// and 0.0 otherwise, so the result is symmetric with a zero diagonal.
pub fn rectangular_hopping(rows: usize, columns: usize) -> DMatrix<f64> {
    let coords = (0..rows as i64)
        .cartesian_product(0..columns as i64)
        .collect::<Vec<_>>();
    let sites = rows * columns;
    DMatrix::from_fn(sites, sites, |a, b| {
        let hop = (coords[a].0 - coords[b].0, coords[a].1 - coords[b].1);
        match hop {
            (1, 0) | (-1, 0) | (0, 1) | (0, -1) => 1.0,
            _ => 0.0,
        }
    })
}

/// The most balanced `(rows, columns)` factorization of a site count, with
/// `rows >= columns`. Used to sweep lattice sizes without elongating the
/// lattice into a chain.
pub fn balanced_extents(sites: usize) -> (usize, usize) {
    let factors = (1..=sites).filter(|i| sites % i == 0).collect::<Vec<_>>();
    if factors.len() % 2 == 0 {
        (factors[factors.len() / 2], factors[factors.len() / 2 - 1])
    } else {
        let middle = factors[(factors.len() - 1) / 2];
        (middle, middle)
    }
}
