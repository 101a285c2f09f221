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

use crate::identity::AggregateId;

/// A domain event.
///
/// Events are delivered to the aggregate registered under [`Event::dest`]
/// (if any) and fanned out to every observer. Either endpoint may be zero:
/// a zero destination means "observers only".
pub trait Event: Any + Send + Sync + Debug {
    /// Origin of this event.
    fn source(&self) -> AggregateId;

    /// Intended destination aggregate.
    fn dest(&self) -> AggregateId;

    /// Returns the event as `Any` for downcasting.
    fn as_any(&self) -> &dyn Any;
}
