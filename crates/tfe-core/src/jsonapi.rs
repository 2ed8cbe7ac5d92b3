//! JSON:API documents and a schema-driven encoder/decoder.
//!
//! Typed records serialize to a flat object with serde. A [`Schema`] then says,
//! per field, whether it is the primary identifier, an attribute, or a
//! relationship to another resource type, and [`encode`] / [`decode`] move
//! values between the flat object and a [`ResourceObject`].

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Media type used for both requests and responses.
pub const MEDIA_TYPE: &str = "application/vnd.api+json";

/// How a field is represented in a resource object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// The resource's `id`.
    Primary,
    /// A member of `attributes`.
    Attribute,
    /// A member of `relationships`, pointing at resources of the given type.
    Relation(&'static str),
}

/// Encoding rule for a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    /// Field name in the flat serde representation.
    pub name: &'static str,
    /// Member name in the encoded resource object.
    pub key: &'static str,
    /// How the field is encoded.
    pub kind: FieldKind,
    /// Leave the member out entirely when the value is null.
    pub omit_empty: bool,
}

impl Field {
    /// The primary identifier field.
    #[must_use]
    pub const fn primary(name: &'static str) -> Self {
        Self {
            name,
            key: "id",
            kind: FieldKind::Primary,
            omit_empty: true,
        }
    }

    /// An attribute field.
    #[must_use]
    pub const fn attribute(name: &'static str, key: &'static str) -> Self {
        Self {
            name,
            key,
            kind: FieldKind::Attribute,
            omit_empty: false,
        }
    }

    /// A relationship field.
    #[must_use]
    pub const fn relation(name: &'static str, key: &'static str, resource_type: &'static str) -> Self {
        Self {
            name,
            key,
            kind: FieldKind::Relation(resource_type),
            omit_empty: false,
        }
    }

    /// Omit the member when the value is null.
    #[must_use]
    pub const fn omit_empty(mut self) -> Self {
        self.omit_empty = true;
        self
    }
}

/// Encoding schema for one resource type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schema {
    /// JSON:API `type` member, e.g. `vars`.
    pub resource_type: &'static str,
    /// Field rules, in encoding order.
    pub fields: &'static [Field],
}

/// Types that can be encoded to or decoded from a resource object.
pub trait ResourceSchema {
    /// The schema describing this type.
    const SCHEMA: Schema;
}

/// Top-level JSON:API document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Primary data.
    #[serde(default)]
    pub data: PrimaryData,
    /// Non-standard meta information.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

/// Primary data of a document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum PrimaryData {
    /// A collection of resources.
    Many(Vec<ResourceObject>),
    /// A single resource.
    One(Box<ResourceObject>),
    /// Explicit `null` or absent data.
    #[default]
    Null,
}

/// A single resource object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResourceObject {
    /// Resource type.
    #[serde(rename = "type")]
    pub kind: String,
    /// Resource identifier, absent for resources not yet created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Attributes.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attributes: Map<String, Value>,
    /// Relationships.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub relationships: BTreeMap<String, Relationship>,
}

impl ResourceObject {
    /// Create an empty resource object of the given type.
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: None,
            attributes: Map::new(),
            relationships: BTreeMap::new(),
        }
    }
}

/// A relationship member.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Relationship {
    /// Resource linkage; `None` serializes as `null`.
    #[serde(default)]
    pub data: Option<Linkage>,
}

/// Resource linkage of a relationship.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Linkage {
    /// To-many relationship.
    Many(Vec<ResourceIdentifier>),
    /// To-one relationship.
    One(ResourceIdentifier),
}

impl Linkage {
    fn into_value(self) -> Value {
        match self {
            Self::One(identifier) => identifier.into_value(),
            Self::Many(identifiers) => Value::Array(
                identifiers
                    .into_iter()
                    .map(ResourceIdentifier::into_value)
                    .collect(),
            ),
        }
    }
}

/// Type and id of a related resource.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourceIdentifier {
    /// Resource type.
    #[serde(rename = "type")]
    pub kind: String,
    /// Resource identifier.
    pub id: String,
}

impl ResourceIdentifier {
    fn into_value(self) -> Value {
        let mut object = Map::new();
        object.insert("id".to_string(), Value::String(self.id));
        Value::Object(object)
    }
}

/// Document-level meta information.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Meta {
    /// Pagination details for collection responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

/// Pagination details returned with collections.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct Pagination {
    /// Current page number.
    #[serde(default)]
    pub current_page: u32,
    /// Previous page number, if any.
    #[serde(default)]
    pub prev_page: Option<u32>,
    /// Next page number, if any.
    #[serde(default)]
    pub next_page: Option<u32>,
    /// Total number of pages.
    #[serde(default)]
    pub total_pages: u32,
    /// Total number of items.
    #[serde(default)]
    pub total_count: u32,
}

impl Document {
    /// Wrap a single resource object.
    #[must_use]
    pub fn single(resource: ResourceObject) -> Self {
        Self {
            data: PrimaryData::One(Box::new(resource)),
            meta: None,
        }
    }

    /// Encode a typed value as a single-resource document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EncodeError`] if the value does not fit its schema.
    pub fn encode<T>(value: &T) -> Result<Self>
    where
        T: Serialize + ResourceSchema,
    {
        encode(value).map(Self::single)
    }

    /// Pagination metadata, if the server sent any.
    #[must_use]
    pub fn pagination(&self) -> Option<&Pagination> {
        self.meta.as_ref().and_then(|meta| meta.pagination.as_ref())
    }

    /// Decode the primary data as a single record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DecodeError`] if the data is not exactly one resource
    /// of the expected type.
    pub fn into_one<T>(self) -> Result<T>
    where
        T: DeserializeOwned + ResourceSchema,
    {
        match self.data {
            PrimaryData::One(resource) => decode(*resource),
            PrimaryData::Many(_) => Err(Error::DecodeError(format!(
                "expected a single `{}` resource, got a collection",
                T::SCHEMA.resource_type
            ))),
            PrimaryData::Null => Err(Error::DecodeError(format!(
                "expected a single `{}` resource, got null",
                T::SCHEMA.resource_type
            ))),
        }
    }

    /// Decode the primary data as an ordered sequence of records.
    ///
    /// Null data decodes to an empty sequence.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DecodeError`] if the data is a single resource or any
    /// element fails to decode.
    pub fn into_many<T>(self) -> Result<Vec<T>>
    where
        T: DeserializeOwned + ResourceSchema,
    {
        match self.data {
            PrimaryData::Many(resources) => resources.into_iter().map(decode).collect(),
            PrimaryData::Null => Ok(Vec::new()),
            PrimaryData::One(_) => Err(Error::DecodeError(format!(
                "expected a collection of `{}` resources, got a single resource",
                T::SCHEMA.resource_type
            ))),
        }
    }
}

/// Encode a typed value into a resource object according to its schema.
///
/// # Errors
///
/// Returns [`Error::EncodeError`] if the value does not serialize to an object
/// or a present relation has no `id`.
pub fn encode<T>(value: &T) -> Result<ResourceObject>
where
    T: Serialize + ResourceSchema,
{
    let schema = T::SCHEMA;
    let flat = match serde_json::to_value(value).map_err(|err| Error::EncodeError(err.to_string()))? {
        Value::Object(map) => map,
        other => {
            return Err(Error::EncodeError(format!(
                "`{}` must serialize to an object, got {other}",
                schema.resource_type
            )))
        }
    };

    let mut resource = ResourceObject::new(schema.resource_type);
    for field in schema.fields {
        let value = flat.get(field.name).cloned().unwrap_or(Value::Null);
        match field.kind {
            FieldKind::Primary => {
                resource.id = match value {
                    Value::String(id) if !id.is_empty() => Some(id),
                    Value::Null | Value::String(_) => None,
                    other => Some(other.to_string()),
                };
            }
            FieldKind::Attribute => {
                if value.is_null() && field.omit_empty {
                    continue;
                }
                resource.attributes.insert(field.key.to_string(), value);
            }
            FieldKind::Relation(resource_type) => {
                let data = linkage_from_value(resource_type, value)?;
                if data.is_none() && field.omit_empty {
                    continue;
                }
                resource
                    .relationships
                    .insert(field.key.to_string(), Relationship { data });
            }
        }
    }

    Ok(resource)
}

/// Decode a resource object into a typed value according to its schema.
///
/// Attributes missing from the resource are left out of the flat object, so
/// serde defaults apply.
///
/// # Errors
///
/// Returns [`Error::DecodeError`] on a resource type mismatch or when the
/// flattened object does not deserialize into `T`.
pub fn decode<T>(resource: ResourceObject) -> Result<T>
where
    T: DeserializeOwned + ResourceSchema,
{
    let schema = T::SCHEMA;
    if resource.kind != schema.resource_type {
        return Err(Error::DecodeError(format!(
            "expected resource type `{}`, got `{}`",
            schema.resource_type, resource.kind
        )));
    }

    let ResourceObject {
        id,
        mut attributes,
        mut relationships,
        ..
    } = resource;

    let mut flat = Map::new();
    for field in schema.fields {
        match field.kind {
            FieldKind::Primary => {
                if let Some(id) = &id {
                    flat.insert(field.name.to_string(), Value::String(id.clone()));
                }
            }
            FieldKind::Attribute => {
                if let Some(value) = attributes.remove(field.key) {
                    flat.insert(field.name.to_string(), value);
                }
            }
            FieldKind::Relation(_) => {
                if let Some(relationship) = relationships.remove(field.key) {
                    let value = relationship.data.map_or(Value::Null, Linkage::into_value);
                    flat.insert(field.name.to_string(), value);
                }
            }
        }
    }

    serde_json::from_value(Value::Object(flat)).map_err(|err| {
        Error::DecodeError(format!("invalid `{}` resource: {err}", schema.resource_type))
    })
}

fn linkage_from_value(resource_type: &str, value: Value) -> Result<Option<Linkage>> {
    match value {
        Value::Null => Ok(None),
        Value::Array(items) => items
            .into_iter()
            .map(|item| identifier_from_value(resource_type, item))
            .collect::<Result<Vec<_>>>()
            .map(|identifiers| Some(Linkage::Many(identifiers))),
        other => identifier_from_value(resource_type, other).map(|id| Some(Linkage::One(id))),
    }
}

fn identifier_from_value(resource_type: &str, value: Value) -> Result<ResourceIdentifier> {
    let id = match value {
        Value::Object(mut object) => object.remove("id"),
        Value::String(id) => Some(Value::String(id)),
        _ => None,
    };

    match id {
        Some(Value::String(id)) if !id.is_empty() => Ok(ResourceIdentifier {
            kind: resource_type.to_string(),
            id,
        }),
        _ => Err(Error::EncodeError(format!(
            "related `{resource_type}` resource has no id"
        ))),
    }
}
