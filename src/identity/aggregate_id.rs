/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::identity::node::node_id;
use crate::identity::ResourceType;

/// Identifies an aggregate uniquely across the entire cluster.
///
/// An empty `instance` denotes the aggregate root, the "general manager"
/// which handles every command addressed to its `(node, kind)` for which no
/// more specific aggregate is registered.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct AggregateId {
    /// Node on which this aggregate resides.
    pub node: String,
    /// Subsystem this aggregate belongs to.
    pub kind: ResourceType,
    /// Unique id of this aggregate on this node; empty for the aggregate root.
    pub instance: String,
}

/// Failure to parse the dotted text form of an [`AggregateId`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseIdError {
    #[error("invalid node IP {ip:?} in {input:?}")]
    InvalidNodeIp { ip: String, input: String },
    #[error("invalid resource type {0:?}")]
    UnknownResourceType(String),
    #[error("invalid aggregate id {0:?}")]
    Malformed(String),
}

impl AggregateId {
    /// Returns a new id for an aggregate on this node.
    ///
    /// The node field is stamped with the current [`node_id`]; set the node
    /// identifier before creating ids whose locality matters.
    pub fn new(kind: ResourceType, instance: impl Into<String>) -> Self {
        Self {
            node: node_id(),
            kind,
            instance: instance.into(),
        }
    }

    /// True if this id is not sufficiently specified to route anything.
    pub fn is_zero(&self) -> bool {
        self.node.is_empty() || self.kind == ResourceType::Invalid
    }

    /// True if this id points to the local node.
    pub fn is_local(&self) -> bool {
        self.node == node_id()
    }

    /// The resource part of the id: `kind` or `kind.instance`.
    pub fn resource(&self) -> String {
        if self.instance.is_empty() {
            self.kind.to_string()
        } else {
            format!("{}.{}", self.kind, self.instance)
        }
    }
}

impl fmt::Display for AggregateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.node.is_empty() {
            f.write_str(&self.resource())
        } else {
            write!(f, "{}.{}", self.node, self.resource())
        }
    }
}

impl FromStr for AggregateId {
    type Err = ParseIdError;

    /// Parses the dotted grammar.
    ///
    /// One to three fields are `kind`, `node.kind` and `node.kind.instance`
    /// with a dot-free node name. Four to six fields require the node to be
    /// a valid IPv4 address: a solitary address, `ip.kind`, or
    /// `ip.kind.instance`.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = input.split('.').collect();
        let id = match fields.len() {
            6 => Self {
                node: parse_node_ip(&fields[..4], input)?,
                kind: fields[4].parse()?,
                instance: fields[5].to_owned(),
            },
            5 => Self {
                node: parse_node_ip(&fields[..4], input)?,
                kind: fields[4].parse()?,
                instance: String::new(),
            },
            4 => Self {
                node: parse_node_ip(&fields, input)?,
                kind: ResourceType::Invalid,
                instance: String::new(),
            },
            3 => Self {
                node: fields[0].to_owned(),
                kind: fields[1].parse()?,
                instance: fields[2].to_owned(),
            },
            2 => Self {
                node: fields[0].to_owned(),
                kind: fields[1].parse()?,
                instance: String::new(),
            },
            1 => Self {
                node: String::new(),
                kind: fields[0].parse()?,
                instance: String::new(),
            },
            _ => return Err(ParseIdError::Malformed(input.to_owned())),
        };
        Ok(id)
    }
}

fn parse_node_ip(fields: &[&str], input: &str) -> Result<String, ParseIdError> {
    let node = fields.join(".");
    if node.parse::<Ipv4Addr>().is_err() {
        return Err(ParseIdError::InvalidNodeIp {
            ip: node,
            input: input.to_owned(),
        });
    }
    Ok(node)
}

impl Serialize for AggregateId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AggregateId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(D::Error::custom)
    }
}
