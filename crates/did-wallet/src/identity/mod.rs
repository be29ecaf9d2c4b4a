//! Identity data model — own DIDs, peer DIDs, endpoints, and the
//! requests that create them.

pub mod record;
pub mod request;

pub use record::{
    DidRecord, Endpoint, EndpointRecord, MetadataRecord, OwnIdentity, PairwiseDidRecord,
    PendingKey, RotationState,
};
pub use request::{IdentityRequest, KeySpec, PeerIdentityRequest, RotationRequest};
