use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use snafu::ResultExt;

use crate::{error, Result};

/// Any failure of the transport underneath a facade call.
pub type CallError = Box<dyn std::error::Error + Send + Sync>;

/// FacadeCaller makes one request to a remote facade and returns its JSON result.  The object id
/// is empty for requests to the facade as a whole, or names the remote object (e.g. a watcher)
/// the request is for.
pub trait FacadeCaller {
    fn raw_call(
        &self,
        facade: &str,
        id: &str,
        request: &str,
        params: Value,
    ) -> std::result::Result<Value, CallError>;
}

/// Simple helper over a FacadeCaller that serializes the arguments and deserializes the result.
pub fn facade_call<C, A, R>(caller: &C, facade: &str, id: &str, request: &str, args: &A) -> Result<R>
where
    C: FacadeCaller + ?Sized,
    A: Serialize,
    R: DeserializeOwned,
{
    let params = serde_json::to_value(args).context(error::SerializeArgs { facade, request })?;
    trace!("Calling {}.{} ({}) with {}", facade, request, id, params);

    let response = caller
        .raw_call(facade, id, request, params)
        .context(error::Call { facade, request })?;
    trace!("JSON response: {}", response);

    serde_json::from_value(response).context(error::DeserializeResults { facade, request })
}
