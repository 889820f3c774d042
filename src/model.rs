use crate::block::{Association, Block, BlockError};
use crate::fock::{FockState, Spin};
use itertools::Itertools;
use nalgebra::DMatrix;
use std::fmt::{Display, Error, Formatter};

/// Two blocks within this absolute energy tolerance of each other are treated
/// as degenerate by the ground-state scan.
pub const GROUND_STATE_TOLERANCE: f64 = 0.001;

/// Outcome of a per-sector block request.
///
/// Physically impossible requests are diagnosed no-ops rather than errors; the
/// caller can check whether the sector now exists via [`HubbardModel::block`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SectorStatus {
    /// The sector's block was computed and stored.
    Computed,
    /// The sector's block already existed; nothing was mutated.
    AlreadyComputed,
    /// No basis state realizes the requested sector (parity mismatch between
    /// electron count and spin, or no matching seed state remains).
    ImpossibleSector,
}

/// Exact diagonalization manager for a finite Fermi-Hubbard lattice.
///
/// Owns the unassigned basis bank of all `2^(2N)` patterns and the table of
/// discovered blocks, indexed by electron count and ordered by total spin
/// within each count. Blocks partition the Fock space: once discovered, a
/// block's member patterns leave the bank and can never join another block.
#[derive(Debug)]
pub struct HubbardModel {
    sites: usize,
    t: f64,
    u: f64,
    mu: f64,
    hopping: DMatrix<f64>,
    bank: Vec<u64>,
    blocks: Vec<Vec<Block>>,
    // (electron count, index within the group); valid until blocks mutate,
    // which cannot happen after the full enumeration that computes these.
    gs_sectors: Vec<(usize, usize)>,
    gs_energy: Option<f64>,
}

impl HubbardModel {
    /// Make a model over `sites` lattice sites with hopping amplitude `t`,
    /// on-site interaction `u`, chemical potential `mu`, and the given
    /// site-to-site hopping topology.
    pub fn new(sites: usize, t: f64, u: f64, mu: f64, hopping: DMatrix<f64>) -> Self {
        assert!(
            sites >= 1 && sites <= 31,
            "site count must be in 1..=31 to enumerate the basis"
        );
        assert_eq!(
            hopping.shape(),
            (sites, sites),
            "hopping topology must be sites x sites"
        );
        Self {
            sites,
            t,
            u,
            mu,
            hopping,
            bank: (0..1u64 << (2 * sites)).collect(),
            blocks: vec![Vec::new(); 2 * sites + 1],
            gs_sectors: Vec::new(),
            gs_energy: None,
        }
    }

    /// Number of lattice sites.
    pub fn sites(&self) -> usize {
        self.sites
    }

    /// Number of basis states not yet assigned to any block.
    pub fn unassigned_states(&self) -> usize {
        self.bank.len()
    }

    /// Compute the block for one (electron count, total spin) sector.
    ///
    /// Seeds closure search from the first unassigned basis state matching the
    /// sector; hopping conserves both quantum numbers, so every member of the
    /// resulting block shares them.
    pub fn calculate_block(&mut self, electrons: u32, spin: i32) -> Result<SectorStatus, BlockError> {
        // Electron count and total spin always share parity in the Hubbard basis.
        if electrons % 2 != spin.rem_euclid(2) as u32 {
            return Ok(SectorStatus::ImpossibleSector);
        }
        if self.block(electrons, spin).is_some() {
            return Ok(SectorStatus::AlreadyComputed);
        }
        let seed = self
            .bank
            .iter()
            .map(|&pattern| FockState::new(self.sites, pattern))
            .find(|state| state.electrons() == electrons && state.total_spin() == spin);
        match seed {
            None => Ok(SectorStatus::ImpossibleSector),
            Some(seed) => {
                self.insert_block_from_seed(seed)?;
                Ok(SectorStatus::Computed)
            }
        }
    }

    /// Discover every block by repeatedly seeding from the first unassigned
    /// basis state, then scan all blocks for the global ground state.
    pub fn calculate_all_blocks(&mut self) -> Result<(), BlockError> {
        while let Some(&pattern) = self.bank.first() {
            let seed = FockState::new(self.sites, pattern);
            self.insert_block_from_seed(seed)?;
        }
        self.find_ground_state();
        Ok(())
    }

    /// The block for one sector, if it has been computed.
    pub fn block(&self, electrons: u32, spin: i32) -> Option<&Block> {
        self.blocks
            .get(electrons as usize)?
            .iter()
            .find(|block| block.total_spin() == spin)
    }

    /// Every computed block, by ascending electron count then total spin.
    pub fn blocks(&self) -> impl Iterator<Item = &Block> + '_ {
        self.blocks.iter().flat_map(|group| group.iter())
    }

    /// The global ground energy, once a full scan has run.
    pub fn ground_energy(&self) -> Option<f64> {
        self.gs_energy
    }

    /// The ground-state block with the given total spin, if any.
    pub fn ground_block(&self, spin: i32) -> Option<&Block> {
        self.ground_blocks().find(|block| block.total_spin() == spin)
    }

    /// The ground-state block with the largest total spin.
    pub fn biggest_spin_ground_block(&self) -> Option<&Block> {
        self.ground_blocks().last()
    }

    /// The ground-state block with the smallest total spin.
    pub fn smallest_spin_ground_block(&self) -> Option<&Block> {
        self.ground_blocks().next()
    }

    /// Ground-state blocks in ascending total-spin order.
    pub fn ground_blocks(&self) -> impl Iterator<Item = &Block> + '_ {
        self.gs_sectors
            .iter()
            .map(move |&(electrons, index)| &self.blocks[electrons][index])
    }

    /// All hopping transitions reachable from `seed`, via breadth-first closure
    /// over single-hop applications.
    fn associations_from(&self, seed: FockState) -> Vec<Association> {
        let mut frontier = vec![seed];
        let mut associations = Vec::new();
        let mut cursor = 0;
        while cursor < frontier.len() {
            let state = frontier[cursor];
            for (i, j) in (0..self.sites).cartesian_product(0..self.sites) {
                if i == j || self.hopping[(i, j)] == 0.0 {
                    continue;
                }
                for spin in Spin::both() {
                    let mut hopped = state;
                    hopped.destroy(i, spin);
                    hopped.create(j, spin);
                    if hopped.is_void() {
                        continue;
                    }
                    if frontier
                        .iter()
                        .all(|known| known.pattern() != hopped.pattern())
                    {
                        // Frontier entries are canonical representatives, so
                        // only the association keeps the transition sign.
                        let mut fresh = hopped;
                        fresh.reset_sign();
                        frontier.push(fresh);
                    }
                    associations.push(Association::new(state, hopped));
                }
            }
            cursor += 1;
        }
        if associations.is_empty() {
            // Isolated states still form 1x1 blocks.
            associations.push(Association::identity(frontier[0]));
        }
        associations
    }

    fn insert_block_from_seed(&mut self, seed: FockState) -> Result<(), BlockError> {
        let associations = self.associations_from(seed);
        let block = Block::new(&associations, self.t, self.u, self.mu, &self.hopping)?;
        let members = block
            .states()
            .iter()
            .map(|state| state.pattern())
            .collect::<Vec<_>>();

        let group = &mut self.blocks[block.electrons() as usize];
        let position = group.partition_point(|known| known.total_spin() <= block.total_spin());
        group.insert(position, block);

        // Member patterns are ascending, same as the bank.
        self.bank
            .retain(|pattern| members.binary_search(pattern).is_err());
        Ok(())
    }

    /// Scan every block for the lowest energy, accumulating blocks within
    /// [`GROUND_STATE_TOLERANCE`] of the minimum.
    fn find_ground_state(&mut self) {
        self.gs_sectors.clear();
        self.gs_energy = None;
        let mut minimum = match self.blocks().next() {
            Some(block) => block.energy(),
            None => return,
        };
        for (electrons, group) in self.blocks.iter().enumerate() {
            for (index, block) in group.iter().enumerate() {
                if (block.energy() - minimum).abs() < GROUND_STATE_TOLERANCE {
                    self.gs_sectors.push((electrons, index));
                } else if block.energy() < minimum {
                    minimum = block.energy();
                    self.gs_sectors.clear();
                    self.gs_sectors.push((electrons, index));
                }
            }
        }
        let blocks = &self.blocks;
        self.gs_sectors
            .sort_by_key(|&(electrons, index)| blocks[electrons][index].total_spin());
        self.gs_energy = Some(minimum);
    }
}

impl Display for HubbardModel {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        for (number, block) in self.blocks().enumerate() {
            writeln!(f, ">>> BLOCK #{} <<<", number)?;
            writeln!(f, "{}", block)?;
            writeln!(f)?;
        }
        if let Some(energy) = self.gs_energy {
            writeln!(f, "Ground state energy : {}.", energy)?;
            writeln!(f, "These blocks are part of the GS:")?;
            for block in self.ground_blocks() {
                writeln!(f, "\tN:{}/S:{}", block.electrons(), block.total_spin())?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice::rectangular_hopping;

    fn two_site_chain() -> HubbardModel {
        HubbardModel::new(2, -1.0, 4.0, 2.0, rectangular_hopping(2, 1))
    }

    #[test]
    fn parity_mismatch_is_a_no_op() {
        let mut model = two_site_chain();
        assert_eq!(
            model.calculate_block(1, 0).unwrap(),
            SectorStatus::ImpossibleSector
        );
        assert!(model.block(1, 0).is_none());
        assert_eq!(model.unassigned_states(), 16);
    }

    #[test]
    fn single_sector_calculation() {
        let mut model = two_site_chain();
        assert_eq!(model.calculate_block(1, 1).unwrap(), SectorStatus::Computed);
        let block = model.block(1, 1).expect("sector was just computed");
        assert_eq!(block.electrons(), 1);
        assert_eq!(block.total_spin(), 1);
        assert_eq!(block.dimension(), 2);
        assert_eq!(model.unassigned_states(), 14);
    }

    #[test]
    fn repeated_sector_calculation_is_idempotent() {
        let mut model = two_site_chain();
        assert_eq!(model.calculate_block(2, 0).unwrap(), SectorStatus::Computed);
        let remaining = model.unassigned_states();
        let count = model.blocks().count();
        assert_eq!(
            model.calculate_block(2, 0).unwrap(),
            SectorStatus::AlreadyComputed
        );
        assert_eq!(model.unassigned_states(), remaining);
        assert_eq!(model.blocks().count(), count);
    }

    #[test]
    fn unreachable_sector_is_a_no_op() {
        let mut model = HubbardModel::new(1, 0.0, 4.0, 2.0, DMatrix::zeros(1, 1));
        // Parity is fine but no basis state has spin 3 on one site.
        assert_eq!(
            model.calculate_block(1, 3).unwrap(),
            SectorStatus::ImpossibleSector
        );
    }

    #[test]
    fn out_of_range_lookups_return_none() {
        let mut model = two_site_chain();
        model.calculate_all_blocks().unwrap();
        assert!(model.block(99, 1).is_none());
        assert!(model.ground_block(99).is_none());
    }

    #[test]
    fn block_matrices_are_symmetric() {
        let mut model = two_site_chain();
        model.calculate_all_blocks().unwrap();
        for block in model.blocks() {
            assert_eq!(block.matrix(), &block.matrix().transpose());
        }
    }
}
