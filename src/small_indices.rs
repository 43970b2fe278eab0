/// Creates an index struct that uses a `u32` to store the index, with a
/// dedicated `INVALID` sentinel (the all-ones bit pattern) standing in for
/// `Option::None` in the hot structures that cannot afford the niche-less
/// size of a real `Option<u32>` wrapper.
#[macro_export]
macro_rules! create_idx_struct {
    ($name:ident) => {
        #[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
        pub struct $name(u32);

        impl $name {
            #[allow(dead_code)]
            pub const INVALID: Self = Self(u32::max_value());

            pub fn idx(&self) -> usize {
                self.0 as usize
            }

            pub fn valid(&self) -> bool {
                *self != Self::INVALID
            }

            pub fn idx_if_valid(&self) -> Option<usize> {
                self.valid().then(|| self.idx())
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
            fn from(val: $name) -> Self {
                val.idx()
            }
        }

        impl ::std::convert::From<$name> for u32 {
            fn from(val: $name) -> Self {
                val.0
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ::std::default::Default for $name {
            fn default() -> Self {
                Self::INVALID
            }
        }
    };
}
