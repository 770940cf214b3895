//! Strongly typed, zero-cost identifier wrappers.
//!
//! All IDs are `Copy + Ord + Hash` so they can be used as map keys and sorted
//! collection elements without ceremony.  The inner integer is `pub` to allow
//! direct indexing into `Vec`s, but callers should prefer `.index()`.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID".
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl Default for $name {
            /// Returns the `INVALID` sentinel so uninitialized IDs are visibly invalid.
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$name> for usize {
            #[inline(always)]
            fn from(id: $name) -> usize {
                id.0 as usize
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// Index of a weighted node in a simulation's node set.
    pub struct NodeId(u32);
}

typed_id! {
    /// Identifier of a point retained by a dot layer.
    pub struct PointId(u32);
}

typed_id! {
    /// Handle of a shape drawn on a surface.
    pub struct ShapeId(u32);
}

typed_id! {
    /// Identity of one simulation instance.  Frame tokens carry it so a token
    /// requested by a destroyed simulation can never drive its successor.
    pub struct SimulationId(u32);
}

typed_id! {
    /// Identity of a position subscription.
    pub struct SubscriptionId(u32);
}

static NEXT_SIMULATION: AtomicU32 = AtomicU32::new(0);

impl SimulationId {
    /// Allocate a process-unique simulation id.
    pub fn next() -> Self {
        SimulationId(NEXT_SIMULATION.fetch_add(1, Ordering::Relaxed))
    }
}
