//! Strongly typed surrogate identifiers for the lineage entities.
//!
//! All identifiers wrap the `BIGSERIAL` keys assigned by the store. Creation
//! order follows key order, which is what the resolver's "most recent"
//! tie-break relies on for [`ReleaseId`].

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            serde::Serialize,
            serde::Deserialize,
            utoipa::ToSchema,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw store-assigned key.
            #[must_use]
            pub fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Return the raw key for persistence and wire payloads.
            #[must_use]
            pub fn as_i64(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// Identifier of a service (the root of the hierarchy).
    ServiceId
);
define_id!(
    /// Identifier of a feature owned by a service.
    FeatureId
);
define_id!(
    /// Identifier of a branch.
    BranchId
);
define_id!(
    /// Identifier of one commit observed on one branch.
    IterationId
);
define_id!(
    /// Identifier of a stored configuration.
    ConfigId
);
define_id!(
    /// Identifier of a pipeline definition.
    PipelineId
);
define_id!(
    /// Identifier of a release row binding an iteration to a config.
    ReleaseId
);
