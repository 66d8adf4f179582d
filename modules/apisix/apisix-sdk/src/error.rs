//! Error types for APISIX clients.

use thiserror::Error;

use crate::models::ResourceKind;

/// Errors returned by the registry, clusters, and resource handlers.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApisixError {
    /// A cluster with this name is already registered (or is the default).
    #[error("duplicated cluster: {name}")]
    DuplicatedCluster {
        /// The rejected cluster name.
        name: String,
    },

    /// The addressed cluster is not registered.
    ///
    /// Raised lazily by the resource handlers of the cluster returned for
    /// unknown names, never by the name lookup itself.
    #[error("cluster not found")]
    ClusterNotFound,

    /// The default cluster cannot be removed.
    #[error("default cluster '{name}' cannot be removed")]
    DefaultClusterRemoval {
        /// The default cluster name.
        name: String,
    },

    /// Removal of a name that is not registered.
    #[error("unknown cluster: {name}")]
    UnknownCluster {
        /// The unknown cluster name.
        name: String,
    },

    /// Cluster options could not be turned into a cluster.
    #[error("invalid options for cluster '{name}': {reason}")]
    InvalidClusterOptions {
        /// Cluster name from the options.
        name: String,
        /// What was wrong.
        reason: String,
    },

    /// The caller cancelled the operation.
    #[error("operation cancelled")]
    Cancelled,

    /// The caller's deadline passed before the operation finished.
    #[error("operation deadline exceeded")]
    DeadlineExceeded,

    /// Update or delete of a resource that carries no id.
    #[error("{kind} has no id")]
    MissingResourceId {
        /// Resource kind.
        kind: ResourceKind,
    },

    /// The cluster does not know the resource.
    #[error("{kind} not found: {id}")]
    ResourceNotFound {
        /// Resource kind.
        kind: ResourceKind,
        /// Requested id (empty for collection requests).
        id: String,
    },

    /// The cluster reported a conflicting change.
    #[error("{kind} conflict: {message}")]
    Conflict {
        /// Resource kind.
        kind: ResourceKind,
        /// Message reported by the cluster.
        message: String,
    },

    /// The cluster rejected the request.
    #[error("request rejected with status {status}: {message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Message reported by the cluster.
        message: String,
    },

    /// The request could not be delivered or the response not read.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),
}

impl ApisixError {
    /// `true` when the caller gave up (cancellation or deadline), as opposed
    /// to the cluster rejecting or failing the call.
    #[must_use]
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled | Self::DeadlineExceeded)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn cancellation_is_distinguished_from_rejection() {
        assert!(ApisixError::Cancelled.is_cancellation());
        assert!(ApisixError::DeadlineExceeded.is_cancellation());
        assert!(!ApisixError::ClusterNotFound.is_cancellation());
        assert!(
            !ApisixError::Rejected {
                status: 400,
                message: "invalid".to_owned()
            }
            .is_cancellation()
        );
    }

    #[test]
    fn messages_name_the_resource_kind() {
        let err = ApisixError::ResourceNotFound {
            kind: ResourceKind::Upstream,
            id: "42".to_owned(),
        };
        assert_eq!(err.to_string(), "upstream not found: 42");

        let err = ApisixError::MissingResourceId {
            kind: ResourceKind::Ssl,
        };
        assert_eq!(err.to_string(), "ssl has no id");
    }
}
