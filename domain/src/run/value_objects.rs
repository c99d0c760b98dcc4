//! Run domain value objects - identifiers for runs, steps, and executions.

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<&String> for $name {
            fn from(s: &String) -> Self {
                Self(s.clone())
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

string_id!(
    /// Unique identifier for an agent run.
    RunId
);

string_id!(
    /// Unique identifier for one invocation attempt of a tool.
    ExecutionId
);

string_id!(
    /// Identifier of a step, unique within its plan (e.g. "1", "create-db").
    StepId
);

string_id!(
    /// Conversation that owns a run. Opaque to the core.
    ConversationId
);

impl RunId {
    /// Generates a new random RunId (UUID v4).
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl ExecutionId {
    /// Generates a new random ExecutionId (UUID v4).
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids() {
        let id = StepId::new("create-db");
        assert_eq!(id.as_str(), "create-db");
        assert_eq!(id.to_string(), "create-db");

        let from: RunId = "run-1".into();
        assert_eq!(from.as_str(), "run-1");
    }

    #[test]
    fn test_generated_ids_are_unique() {
        assert_ne!(RunId::generate(), RunId::generate());
        assert_ne!(ExecutionId::generate(), ExecutionId::generate());
    }

    #[test]
    fn test_ids_serialize_transparently() {
        let id = ExecutionId::new("exec-1");
        assert_eq!(serde_json::to_value(&id).unwrap(), serde_json::json!("exec-1"));
    }
}
