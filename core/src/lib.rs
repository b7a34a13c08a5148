// SPDX-FileCopyrightText: Copyright (c) 2025 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Building blocks shared by the CSDL, query and batch crates.

/// CSDL identifiers and qualified names.
pub mod identifier;
/// EDM primitive kinds and values.
pub mod primitive;
/// Date, time and duration primitives.
pub mod temporal;
/// EDM versions and their namespaces.
pub mod version;

/// Reexport identifiers to make them available through crate root.
pub use identifier::Namespace;
pub use identifier::QualifiedName;
pub use identifier::SimpleIdentifier;
pub use identifier::TypeName;
/// Reexport primitives to make them available through crate root.
pub use primitive::EnumValue;
pub use primitive::PrimitiveKind;
pub use primitive::PrimitiveValue;
pub use primitive::SpatialValue;
/// Reexport temporal types to make them available through crate root.
pub use temporal::EdmDate;
pub use temporal::EdmDateTimeOffset;
pub use temporal::EdmDuration;
pub use temporal::EdmTimeOfDay;
pub use version::EdmVersion;
