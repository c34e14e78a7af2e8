use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::{entities::movie, error::StoreError};

/// Identifier the database assigns to a stored movie.
///
/// Travels as decimal text (`"42"`) so clients treat it as opaque.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct MovieId(i32);

impl MovieId {
    pub fn new(raw: i32) -> Option<Self> {
        (raw > 0).then_some(Self(raw))
    }

    pub fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for MovieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for MovieId {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(StoreError::InvalidId(s.to_string()));
        }
        s.parse::<i32>()
            .ok()
            .and_then(MovieId::new)
            .ok_or_else(|| StoreError::InvalidId(s.to_string()))
    }
}

impl Serialize for MovieId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MovieId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct IdVisitor;

        impl de::Visitor<'_> for IdVisitor {
            type Value = MovieId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a positive movie id")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<MovieId, E> {
                v.parse().map_err(E::custom)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<MovieId, E> {
                i32::try_from(v)
                    .ok()
                    .and_then(MovieId::new)
                    .ok_or_else(|| E::invalid_value(de::Unexpected::Unsigned(v), &self))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<MovieId, E> {
                i32::try_from(v)
                    .ok()
                    .and_then(MovieId::new)
                    .ok_or_else(|| E::invalid_value(de::Unexpected::Signed(v), &self))
            }
        }

        deserializer.deserialize_any(IdVisitor)
    }
}

/// Document content without its identifier.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MovieFields {
    pub name: String,
    pub cover_image: String,
    pub description: String,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Movie {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<MovieId>,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub cover_image: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
}

/// Explicit `null` decodes like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Movie {
    pub fn fields(&self) -> MovieFields {
        MovieFields {
            name: self.name.clone(),
            cover_image: self.cover_image.clone(),
            description: self.description.clone(),
        }
    }

    pub fn with_id(id: MovieId, fields: MovieFields) -> Self {
        Self {
            id: Some(id),
            name: fields.name,
            cover_image: fields.cover_image,
            description: fields.description,
        }
    }
}

impl From<movie::Model> for Movie {
    fn from(row: movie::Model) -> Self {
        Self {
            id: MovieId::new(row.id),
            name: row.name,
            cover_image: row.cover_image,
            description: row.description,
        }
    }
}
