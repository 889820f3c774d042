#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Error, Formatter};

/// Odd orbital indices hold the up channel.
const UP_CHANNEL: u64 = 0xAAAA_AAAA_AAAA_AAAA;

/// One spin channel of a site's pair of spin-orbitals.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum Spin {
    /// The down channel, stored on even orbital indices.
    Down,
    /// The up channel, stored on odd orbital indices.
    Up,
}

impl Spin {
    /// Both channels, in the order operator sweeps visit them.
    pub fn both() -> [Spin; 2] {
        [Spin::Up, Spin::Down]
    }

    fn channel(self) -> usize {
        match self {
            Spin::Down => 0,
            Spin::Up => 1,
        }
    }

    /// Contribution of an occupied orbital on this channel to the total spin.
    fn polarity(self) -> i32 {
        match self {
            Spin::Down => -1,
            Spin::Up => 1,
        }
    }
}

/// A many-body basis state encoded as an occupation bit pattern over `2N` spin-orbitals.
///
/// Orbital `2*site + channel` holds the (site, channel) occupation, with channel
/// Down=0 and Up=1. Electron count and total spin are always derivable from the
/// pattern; the sign accumulator tracks fermionic anticommutation across operator
/// applications and is bookkeeping relative to a +1 reference, not part of the
/// state's identity. Deduplication and ordering must use the pattern alone.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct FockState {
    sites: usize,
    pattern: u64,
    electrons: u32,
    total_spin: i32,
    sign: i8,
    void: bool,
}

impl FockState {
    /// Make a state over `sites` lattice sites from an occupation bit pattern.
    pub fn new(sites: usize, pattern: u64) -> Self {
        debug_assert!(sites >= 1 && 2 * sites <= 64);
        debug_assert!(2 * sites == 64 || pattern >> (2 * sites) == 0);
        Self {
            sites,
            pattern,
            electrons: pattern.count_ones(),
            total_spin: total_spin_of(pattern),
            sign: 1,
            void: false,
        }
    }

    /// Apply the creation operator for the given spin-orbital.
    ///
    /// Creating on an occupied orbital violates Pauli exclusion: the state becomes
    /// void, resetting every attribute as if built fresh from pattern 0. Void
    /// states ignore all further operators.
    pub fn create(&mut self, site: usize, spin: Spin) {
        if self.void {
            return;
        }
        let index = 2 * site + spin.channel();
        let op = 1u64 << index;
        if self.pattern & op == 0 {
            self.pattern |= op;
            self.flip_sign_above(index);
            self.total_spin += spin.polarity();
            self.electrons += 1;
        } else {
            self.make_void();
        }
    }

    /// Apply the annihilation operator for the given spin-orbital.
    ///
    /// Destroying an unoccupied orbital voids the state, as with [`Self::create`].
    pub fn destroy(&mut self, site: usize, spin: Spin) {
        if self.void {
            return;
        }
        let index = 2 * site + spin.channel();
        let op = 1u64 << index;
        if self.pattern & op != 0 {
            self.pattern &= !op;
            self.flip_sign_above(index);
            self.total_spin -= spin.polarity();
            self.electrons -= 1;
        } else {
            self.make_void();
        }
    }

    /// Reinitialize in place to a fresh non-void state with sign +1, for reuse
    /// inside scan loops.
    pub fn reset(&mut self, pattern: u64) {
        *self = Self::new(self.sites, pattern);
    }

    /// The occupation bit pattern.
    pub fn pattern(&self) -> u64 {
        self.pattern
    }

    /// Number of lattice sites this state spans.
    pub fn sites(&self) -> usize {
        self.sites
    }

    /// Number of occupied spin-orbitals.
    pub fn electrons(&self) -> u32 {
        self.electrons
    }

    /// Signed total spin: +1 per occupied up orbital, -1 per occupied down orbital.
    pub fn total_spin(&self) -> i32 {
        self.total_spin
    }

    /// Accumulated fermionic sign, always +1 or -1.
    pub fn sign(&self) -> i8 {
        self.sign
    }

    /// Whether an operator violated Pauli exclusion at some point.
    pub fn is_void(&self) -> bool {
        self.void
    }

    pub(crate) fn reset_sign(&mut self) {
        self.sign = 1;
    }

    // Parity of occupied orbitals strictly above `index` in the updated pattern.
    fn flip_sign_above(&mut self, index: usize) {
        let above = (self.pattern >> index) >> 1;
        if above.count_ones() % 2 == 1 {
            self.sign = -self.sign;
        }
    }

    fn make_void(&mut self) {
        *self = Self::new(self.sites, 0);
        self.void = true;
    }
}

impl Display for FockState {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        if self.void {
            f.write_str("void")
        } else {
            write!(f, "{}", i64::from(self.sign) * self.pattern as i64)
        }
    }
}

fn total_spin_of(pattern: u64) -> i32 {
    let up = (pattern & UP_CHANNEL).count_ones() as i32;
    let down = (pattern & !UP_CHANNEL).count_ones() as i32;
    up - down
}
