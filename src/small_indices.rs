use rustc_hash::{FxHashMap, FxHashSet};
use std::hash::Hash;

pub type IdxHashSet<T> = FxHashSet<T>;
#[allow(dead_code)]
pub type IdxHashMap<K, V> = FxHashMap<K, V>;

/// Small index stored as a `u32` with a reserved invalid value.
pub trait SmallIdx:
    Copy + Ord + Eq + Hash + From<usize> + From<u32> + Into<usize> + Into<u32>
{
    const INVALID: Self;

    fn idx(&self) -> usize;

    fn valid(&self) -> bool {
        *self != Self::INVALID
    }
}

/// Creates an index struct that uses a `u32` to store the index.
#[macro_export]
macro_rules! create_idx_struct {
    ($vis:vis $name:ident) => {
        #[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
        $vis struct $name(pub(crate) u32);

        impl $crate::small_indices::SmallIdx for $name {
            const INVALID: Self = Self(u32::MAX);

            fn idx(&self) -> usize {
                self.0 as usize
            }
        }

        impl ::std::convert::From<usize> for $name {
            fn from(idx: usize) -> Self {
                debug_assert!(<u32 as ::std::convert::TryFrom<usize>>::try_from(idx).is_ok());
                Self(idx as u32)
            }
        }

        impl ::std::convert::From<u32> for $name {
            fn from(idx: u32) -> Self {
                Self(idx)
            }
        }

        impl ::std::convert::From<$name> for usize {
            fn from(idx: $name) -> Self {
                idx.0 as usize
            }
        }

        impl ::std::convert::From<$name> for u32 {
            fn from(idx: $name) -> Self {
                idx.0
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ::std::default::Default for $name {
            fn default() -> Self {
                use $crate::small_indices::SmallIdx;
                Self::INVALID
            }
        }
    };
}
