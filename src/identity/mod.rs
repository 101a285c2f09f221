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

//! Cluster-wide aggregate identity: the `(node, kind, instance)` triple,
//! its dotted text form, and the process-global node identifier.

mod aggregate_id;
mod node;
mod resource_type;

pub use aggregate_id::{AggregateId, ParseIdError};
pub use node::{node_id, set_node_id};
pub use resource_type::ResourceType;
