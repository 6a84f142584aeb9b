//! Strongly-typed identifiers for chambers, valves, ticks, and boat position.

use std::fmt;

/// Number of chambers in the lock chain.
pub const CHAMBER_COUNT: usize = 4;

/// Number of interconnection valves (one between each adjacent chamber pair).
pub const VALVE_COUNT: usize = CHAMBER_COUNT - 1;

/// Monotonically increasing tick counter.
///
/// Incremented each time the simulation advances one step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TickId(pub u64);

impl fmt::Display for TickId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TickId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Identifies one of the four chambers in the lock chain.
///
/// Chamber numbers are 1-based (matching the operator-facing labels);
/// `index()` gives the 0-based array position. Chamber *n* is adjacent
/// only to chambers *n−1* and *n+1*.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChamberId(u8);

impl ChamberId {
    /// All chambers in chain order, entry first.
    pub const ALL: [ChamberId; CHAMBER_COUNT] =
        [ChamberId(1), ChamberId(2), ChamberId(3), ChamberId(4)];

    /// Create a chamber ID from a 1-based chamber number.
    ///
    /// Returns `None` if `number` is not in `1..=4`.
    pub const fn new(number: u8) -> Option<Self> {
        if number >= 1 && number as usize <= CHAMBER_COUNT {
            Some(Self(number))
        } else {
            None
        }
    }

    /// Create a chamber ID from a 0-based array index.
    ///
    /// Returns `None` if `index` is not in `0..4`.
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < CHAMBER_COUNT {
            Some(Self(index as u8 + 1))
        } else {
            None
        }
    }

    /// The 1-based chamber number.
    pub const fn number(self) -> u8 {
        self.0
    }

    /// The 0-based array position.
    pub const fn index(self) -> usize {
        self.0 as usize - 1
    }
}

impl fmt::Display for ChamberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies one of the three interconnection valves.
///
/// Valve *i* (0-based) connects chamber *i+1* and chamber *i+2*; open
/// means equalization flow is permitted between that pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ValveId(u8);

impl ValveId {
    /// All valves in chain order.
    pub const ALL: [ValveId; VALVE_COUNT] = [ValveId(0), ValveId(1), ValveId(2)];

    /// Create a valve ID from a 0-based valve index.
    ///
    /// Returns `None` if `index` is not in `0..3`.
    pub const fn new(index: u8) -> Option<Self> {
        if (index as usize) < VALVE_COUNT {
            Some(Self(index))
        } else {
            None
        }
    }

    /// The 0-based array position.
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// The chamber on the entry side of this valve.
    pub const fn upstream(self) -> ChamberId {
        ChamberId(self.0 + 1)
    }

    /// The chamber on the exit side of this valve.
    pub const fn downstream(self) -> ChamberId {
        ChamberId(self.0 + 2)
    }
}

impl fmt::Display for ValveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.upstream(), self.downstream())
    }
}

/// Position of the boat within the lock chain.
///
/// `0` means outside the lock (no boat in transit); `1..=4` means the
/// boat is aligned with that chamber. Only the transit sequencer moves
/// the boat.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoatPosition(u8);

impl BoatPosition {
    /// The boat is outside the lock chain.
    pub const OUTSIDE: BoatPosition = BoatPosition(0);

    /// Create a boat position. Returns `None` if `position` is not in `0..=4`.
    pub const fn new(position: u8) -> Option<Self> {
        if position as usize <= CHAMBER_COUNT {
            Some(Self(position))
        } else {
            None
        }
    }

    /// Position the boat in the given chamber.
    pub const fn in_chamber(chamber: ChamberId) -> Self {
        Self(chamber.number())
    }

    /// The raw position value (0 = outside, 1..=4 = chamber number).
    pub const fn value(self) -> u8 {
        self.0
    }

    /// The chamber the boat currently occupies, if any.
    pub const fn chamber(self) -> Option<ChamberId> {
        ChamberId::new(self.0)
    }

    /// Whether the boat is outside the lock chain.
    pub const fn is_outside(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for BoatPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
