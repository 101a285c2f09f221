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

use parking_lot::RwLock;

// The id of this node. Typically the primary IP address, but any stable
// machine identifier works.
static NODE_ID: RwLock<String> = RwLock::new(String::new());

/// Returns the identifier of this node, or `"UNKNOWN"` if none has been set.
pub fn node_id() -> String {
    let id = NODE_ID.read();
    if id.is_empty() {
        "UNKNOWN".to_owned()
    } else {
        id.clone()
    }
}

/// Sets the identifier of this node.
///
/// Must be called once at startup, before any [`AggregateId`] whose locality
/// matters is created; [`AggregateId::is_local`] compares against this value.
///
/// [`AggregateId`]: crate::identity::AggregateId
/// [`AggregateId::is_local`]: crate::identity::AggregateId::is_local
pub fn set_node_id(id: impl Into<String>) {
    *NODE_ID.write() = id.into();
}
