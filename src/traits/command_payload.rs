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

use std::any::Any;
use std::fmt::Debug;

/// A value that can ride inside a [`Command`](crate::message::Command).
///
/// The descriptor is the human-readable name carried through logging and
/// the resulting [`CommandDone`](crate::message::CommandDone) event. Named
/// payload types get it for free from their type name; string payloads are
/// their own descriptor. Only types that implement this trait can become
/// commands, which keeps nil, anonymous and primitive payloads out at
/// compile time.
pub trait CommandPayload: Any + Send + Sync + Debug {
    /// Human-readable name of this payload kind.
    fn descriptor(&self) -> String
    where
        Self: Sized,
    {
        short_type_name::<Self>().to_owned()
    }

    /// Returns the payload as `Any` for downcasting by the receiving
    /// aggregate.
    fn as_any(&self) -> &dyn Any;
}

/// A non-empty string is a command all by itself: the content doubles as
/// the descriptor.
impl CommandPayload for String {
    fn descriptor(&self) -> String {
        self.clone()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl CommandPayload for &'static str {
    fn descriptor(&self) -> String {
        (*self).to_owned()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// The final path segment of a type's name.
pub(crate) fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}
