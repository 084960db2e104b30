//! Type-safe identifier wrappers around [`Uuid`].
//!
//! Every entity in the simulation has a strongly-typed ID so that a unit ID
//! can never be passed where a building ID is expected. IDs are random
//! (version 4) UUIDs. The simulation mints them from its own seeded RNG via
//! [`from_random_bytes`](UnitId::from_random_bytes) so that two runs with the
//! same seed produce the same identifiers.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier from the operating system RNG.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Create a version 4 identifier from caller-supplied random bytes.
            ///
            /// The version and variant bits are overwritten, so any 16 bytes
            /// produce a valid v4 UUID.
            pub const fn from_random_bytes(bytes: [u8; 16]) -> Self {
                Self(uuid::Builder::from_random_bytes(bytes).into_uuid())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for a villager or soldier.
    UnitId
}

define_id! {
    /// Unique identifier for a completed building.
    BuildingId
}

define_id! {
    /// Unique identifier for a depletable resource node (tree or deposit).
    NodeId
}

define_id! {
    /// Unique identifier for a construction site.
    SiteId
}

define_id! {
    /// Unique identifier for a pile of dropped cargo.
    DropId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_bytes_produce_v4_ids() {
        let id = BuildingId::from_random_bytes([7; 16]);
        assert_eq!(id.into_inner().get_version_num(), 4);
        assert_eq!(id, BuildingId::from_random_bytes([7; 16]));
    }

    #[test]
    fn id_roundtrip_serde() {
        let original = UnitId::new();
        let json = serde_json::to_string(&original).ok();
        assert!(json.is_some());
        let restored: Result<UnitId, _> = serde_json::from_str(json.as_deref().unwrap_or(""));
        assert_eq!(restored.ok(), Some(original));
    }

    #[test]
    fn id_display_matches_uuid() {
        let id = NodeId::new();
        assert_eq!(id.to_string(), id.into_inner().to_string());
    }
}
