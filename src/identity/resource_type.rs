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
use std::str::FromStr;

use crate::identity::ParseIdError;

/// The kind of subsystem an aggregate belongs to.
///
/// The zero value [`ResourceType::Invalid`] is reserved: an
/// [`AggregateId`](crate::identity::AggregateId) carrying it is considered
/// zero and is rejected wherever a routable identity is required.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceType {
    /// No valid resource type has been assigned yet.
    #[default]
    Invalid = 0,
    Cpu = 1,
    Memory = 2,
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            ResourceType::Invalid => "INVALID_RESOURCE",
            ResourceType::Cpu => "CPU",
            ResourceType::Memory => "MEMORY",
        };
        f.write_str(token)
    }
}

impl FromStr for ResourceType {
    type Err = ParseIdError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token {
            "INVALID_RESOURCE" => Ok(ResourceType::Invalid),
            "CPU" => Ok(ResourceType::Cpu),
            "MEMORY" => Ok(ResourceType::Memory),
            other => Err(ParseIdError::UnknownResourceType(other.to_owned())),
        }
    }
}
