use bytes::Bytes;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::codec::BodyCodec;
use crate::protocol::ClientError;

/// The `json` format.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl BodyCodec for JsonCodec {
    fn format(&self) -> &str {
        "json"
    }

    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Bytes, ClientError> {
        serde_json::to_vec(value).map(Bytes::from).map_err(ClientError::encode)
    }

    fn decode<T: DeserializeOwned>(&self, body: &[u8]) -> Result<T, ClientError> {
        serde_json::from_slice(body).map_err(ClientError::decode)
    }
}
