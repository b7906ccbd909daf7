//! Controller utils

use futures::future::Future;
use futures::Stream;
use hyper;
use serde::de::DeserializeOwned;
use serde_json;

use errors::Error;

/// Reads a hyper body and deserializes it from json
pub fn parse_body<T>(body: hyper::Body) -> Box<Future<Item = T, Error = Error>>
where
    T: DeserializeOwned + 'static,
{
    Box::new(
        body.concat2()
            .map_err(|_| Error::Parse)
            .and_then(|chunk| serde_json::from_slice::<T>(&chunk).map_err(|_| Error::Parse)),
    )
}
