use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Defines a UUID-backed identifier newtype.
///
/// Wrapping the UUID in a distinct type prevents mixing up the many
/// identifier kinds that flow through result entry (contest, counting
/// circle, political business, ballot, ...).
macro_rules! uuid_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an identifier from an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the underlying UUID.
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

uuid_id! {
    /// Unique identifier for an aggregate instance (event stream).
    AggregateId
}

uuid_id! {
    /// Identifier of the contest a political business belongs to.
    ContestId
}

uuid_id! {
    /// Identifier of the counting circle reporting a result.
    CountingCircleId
}

uuid_id! {
    /// Identifier of a political business (vote, majority election or
    /// proportional election).
    PoliticalBusinessId
}

uuid_id! {
    /// Identifier of one ballot (question sheet) of a vote.
    BallotId
}

uuid_id! {
    /// Identifier of an election candidate.
    CandidateId
}

uuid_id! {
    /// Identifier of a proportional election list.
    ListId
}

uuid_id! {
    /// Identifier of the user performing an operation.
    UserId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_creates_unique_ids() {
        assert_ne!(AggregateId::new(), AggregateId::new());
        assert_ne!(ContestId::new(), ContestId::new());
    }

    #[test]
    fn from_uuid_preserves_value() {
        let uuid = Uuid::new_v4();
        assert_eq!(CountingCircleId::from_uuid(uuid).as_uuid(), uuid);
    }

    #[test]
    fn serialization_roundtrip() {
        let id = PoliticalBusinessId::new();
        let json = serde_json::to_string(&id).unwrap();
        let deserialized: PoliticalBusinessId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }

    #[test]
    fn serializes_as_plain_uuid_string() {
        let uuid = Uuid::new_v4();
        let json = serde_json::to_string(&BallotId::from_uuid(uuid)).unwrap();
        assert_eq!(json, format!("\"{uuid}\""));
    }
}
