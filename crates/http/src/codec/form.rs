use bytes::Bytes;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::codec::BodyCodec;
use crate::protocol::ClientError;

/// The `x-www-form-urlencoded` format.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormCodec;

impl BodyCodec for FormCodec {
    fn format(&self) -> &str {
        "x-www-form-urlencoded"
    }

    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Bytes, ClientError> {
        serde_urlencoded::to_string(value).map(Bytes::from).map_err(ClientError::encode)
    }

    fn decode<T: DeserializeOwned>(&self, body: &[u8]) -> Result<T, ClientError> {
        serde_urlencoded::from_bytes(body).map_err(ClientError::decode)
    }
}
