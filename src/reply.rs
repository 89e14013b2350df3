//! Handler return values and their JSON encoding.
//!
//! A handler returns anything implementing [`IntoReply`]. The dispatcher turns
//! that into a [`Reply`], a closed set of shapes, and encodes it. There is no
//! runtime type inspection: the shape is fixed by the `IntoReply` impl.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::Error;

/// What a handler produced, before encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Encoded as a JSON array.
    Sequence(Vec<Value>),
    /// Encoded as a JSON object.
    Mapping(Map<String, Value>),
    /// Re-encoded if it looks like JSON (`{…}` or `[…]`), written verbatim otherwise.
    Text(String),
    /// Any serde-serializable value, already converted.
    Record(Value),
    /// No body.
    Empty,
}

impl Reply {
    /// Serializes `value` as a structured record.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, Error> {
        Ok(Self::Record(serde_json::to_value(value)?))
    }

    /// Produces the response body bytes.
    ///
    /// Fails only for [`Reply::Text`] that starts like JSON but does not parse;
    /// that is a server fault, not the client's.
    pub fn encode(self) -> Result<Vec<u8>, Error> {
        match self {
            Self::Sequence(items) => Ok(serde_json::to_vec(&items)?),
            Self::Mapping(fields) => Ok(serde_json::to_vec(&fields)?),
            Self::Record(value)   => Ok(serde_json::to_vec(&value)?),
            Self::Text(text) if looks_like_json(&text) => {
                let value: Value = serde_json::from_str(&text)?;
                Ok(serde_json::to_vec(&value)?)
            }
            Self::Text(text) => Ok(text.into_bytes()),
            Self::Empty      => Ok(Vec::new()),
        }
    }
}

fn looks_like_json(text: &str) -> bool {
    text.starts_with('{') || text.starts_with('[')
}

/// Wraps any `Serialize` value so a handler can return it directly:
///
/// ```rust,ignore
/// fn get_file(req: &Request, _res: &mut Response) -> Result<Json<FileInfo>, Error> {
///     Ok(Json(FileInfo { name: "a.txt".into() }))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Json<T>(pub T);

/// Conversion into a [`Reply`].
pub trait IntoReply {
    fn into_reply(self) -> Result<Reply, Error>;
}

impl IntoReply for Reply {
    fn into_reply(self) -> Result<Reply, Error> { Ok(self) }
}

impl IntoReply for () {
    fn into_reply(self) -> Result<Reply, Error> { Ok(Reply::Empty) }
}

impl IntoReply for String {
    fn into_reply(self) -> Result<Reply, Error> { Ok(Reply::Text(self)) }
}

impl IntoReply for &'static str {
    fn into_reply(self) -> Result<Reply, Error> { Ok(Reply::Text(self.to_owned())) }
}

impl IntoReply for Value {
    fn into_reply(self) -> Result<Reply, Error> {
        Ok(match self {
            Value::Array(items)  => Reply::Sequence(items),
            Value::Object(fields) => Reply::Mapping(fields),
            other                => Reply::Record(other),
        })
    }
}

impl<T: Serialize> IntoReply for Json<T> {
    fn into_reply(self) -> Result<Reply, Error> { Reply::json(&self.0) }
}

impl<T: Serialize> IntoReply for Vec<T> {
    fn into_reply(self) -> Result<Reply, Error> {
        let items = self.iter().map(serde_json::to_value).collect::<Result<_, _>>()?;
        Ok(Reply::Sequence(items))
    }
}

impl<T: Serialize, S> IntoReply for HashMap<String, T, S> {
    fn into_reply(self) -> Result<Reply, Error> {
        mapping(self)
    }
}

impl<T: Serialize> IntoReply for BTreeMap<String, T> {
    fn into_reply(self) -> Result<Reply, Error> {
        mapping(self)
    }
}

fn mapping<T: Serialize>(entries: impl IntoIterator<Item = (String, T)>) -> Result<Reply, Error> {
    let fields = entries
        .into_iter()
        .map(|(k, v)| serde_json::to_value(v).map(|v| (k, v)))
        .collect::<Result<_, _>>()?;
    Ok(Reply::Mapping(fields))
}
