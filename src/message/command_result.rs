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

use crate::common::BusError;

/// The result of a launched command: the status text reported by the
/// handler, and the error if the command failed or the wait was cut short.
#[derive(Debug, Default)]
pub struct CommandResult {
    /// Return value of the command; may be empty.
    pub result: String,
    /// Why the command failed, if it did.
    pub err: Option<BusError>,
}

impl CommandResult {
    /// A successful result carrying `result` as its status text.
    pub fn ok(result: impl Into<String>) -> Self {
        Self {
            result: result.into(),
            err: None,
        }
    }

    /// A failed result.
    pub fn from_err(err: BusError) -> Self {
        Self {
            result: String::new(),
            err: Some(err),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.err.is_none()
    }
}

impl fmt::Display for CommandResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(err) = &self.err {
            write!(f, "err = {err}")
        } else if self.result.is_empty() {
            f.write_str("OK")
        } else {
            f.write_str(&self.result)
        }
    }
}
