//! Size limits for configuration
//!
//! Sizes that bound memory (window length, chart history, queue depth) are
//! never allowed to be zero.

/// Generate a `NonZeroUsize` size wrapper with a default value
///
/// Each type gets: new(), get(), DEFAULT, Default, Display, From, FromStr,
/// Serialize, Deserialize
macro_rules! nonzero_size {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident = $default:expr;
    ) => {
        $(#[$meta])*
        #[repr(transparent)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis struct $name(std::num::NonZeroUsize);

        impl $name {
            pub const DEFAULT: Self = match std::num::NonZeroUsize::new($default) {
                Some(nz) => Self(nz),
                None => panic!(concat!(stringify!($name), " default cannot be 0")),
            };

            /// Returns None if value is 0
            #[must_use]
            pub const fn new(value: usize) -> Option<Self> {
                match std::num::NonZeroUsize::new(value) {
                    Some(nz) => Some(Self(nz)),
                    None => None,
                }
            }

            #[must_use]
            #[inline]
            pub const fn get(&self) -> usize {
                self.0.get()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::DEFAULT
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.get())
            }
        }

        impl From<$name> for usize {
            fn from(val: $name) -> Self {
                val.get()
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let value = s
                    .trim()
                    .parse::<usize>()
                    .map_err(|e| format!("Invalid {}: {}", stringify!($name), e))?;
                Self::new(value).ok_or_else(|| concat!(stringify!($name), " cannot be 0").to_string())
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_u64(self.get() as u64)
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let value = usize::deserialize(deserializer)?;
                Self::new(value).ok_or_else(|| {
                    serde::de::Error::custom(concat!(stringify!($name), " cannot be 0"))
                })
            }
        }
    };
}

mod limits;

pub use limits::{ChannelCapacity, HistoryPoints, WindowSize};
