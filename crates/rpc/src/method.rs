//! Method descriptors tying each request type to its JSON-RPC name and
//! response shape.
//!
//! Every request type implements [`RpcMethod`] plus exactly one of [`Query`]
//! or [`Mutation`]. Callers that must not mutate remote state can therefore be
//! restricted at the type level.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Result;

/// A typed JSON-RPC method.
pub trait RpcMethod: Serialize {
    /// Wire name, e.g. `hostgroup.get`.
    const METHOD: &'static str;

    /// Decoded `result` payload.
    type Response: DeserializeOwned;
}

/// Read-only method. Safe to execute in any mode.
pub trait Query: RpcMethod {}

/// Method that changes remote state.
pub trait Mutation: RpcMethod {
    /// What callers care about once the call succeeded.
    type Output;

    /// Reduce the raw response to [`Mutation::Output`].
    ///
    /// # Errors
    ///
    /// Returns `InvalidResponse` when the response lacks the expected ids.
    fn output(response: Self::Response) -> Result<Self::Output>;
}
