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

use crate::model::Annotation;
use odata_core::PrimitiveKind;
use odata_core::SimpleIdentifier;
use tagged_types::TaggedType;

pub type EnumMemberName = TaggedType<SimpleIdentifier, EnumMemberNameTag>;
#[derive(tagged_types::Tag)]
#[implement(Clone, Hash, PartialEq, Eq)]
#[transparent(Debug, Display, FromStr)]
#[capability(inner_access)]
pub enum EnumMemberNameTag {}

/// 10.1 Element edm:EnumType
#[derive(Debug, Clone, PartialEq)]
pub struct EnumType {
    /// 10.1.1 Attribute `Name`
    pub name: SimpleIdentifier,
    /// 10.1.2 Attribute `UnderlyingType`: one of `Byte`, `SByte`,
    /// `Int16`, `Int32` (default) or `Int64`.
    pub underlying_type: PrimitiveKind,
    /// 10.1.3 Attribute `IsFlags`
    pub is_flags: bool,
    pub members: Vec<EnumMember>,
    pub annotations: Vec<Annotation>,
}

/// 10.2 Element edm:Member
#[derive(Debug, Clone, PartialEq)]
pub struct EnumMember {
    /// 10.2.1 Attribute `Name`
    pub name: EnumMemberName,
    /// 10.2.2 Attribute `Value`. `None` means the implicit value: the
    /// previous member's value plus one, zero for the first member.
    pub value: Option<i64>,
    pub annotations: Vec<Annotation>,
}

impl EnumMember {
    #[must_use]
    pub const fn new(name: EnumMemberName, value: Option<i64>) -> Self {
        Self {
            name,
            value,
            annotations: Vec::new(),
        }
    }
}

impl EnumType {
    #[must_use]
    pub const fn new(name: SimpleIdentifier) -> Self {
        Self {
            name,
            underlying_type: PrimitiveKind::Int32,
            is_flags: false,
            members: Vec::new(),
            annotations: Vec::new(),
        }
    }

    /// Effective values of all members in declaration order. A value is
    /// `None` when the implicit increment overflows `i64`; every later
    /// implicit value is then `None` too.
    #[must_use]
    pub fn member_values(&self) -> Vec<(&EnumMember, Option<i64>)> {
        self.members
            .iter()
            .fold(
                (Vec::with_capacity(self.members.len()), Some(-1_i64)),
                |(mut acc, prev), member| {
                    let value = member
                        .value
                        .or_else(|| prev.and_then(|p| p.checked_add(1)));
                    acc.push((member, value));
                    (acc, value)
                },
            )
            .0
    }

    /// Value the member at `position` gets when `Value` is omitted.
    #[must_use]
    pub fn implicit_value(&self, position: usize) -> Option<i64> {
        if position == 0 {
            Some(0)
        } else {
            self.member_values()
                .get(position - 1)
                .and_then(|(_, v)| *v)
                .and_then(|v| v.checked_add(1))
        }
    }

    /// Effective value of the member named `name`.
    #[must_use]
    pub fn value_of(&self, name: &str) -> Option<i64> {
        self.member_values()
            .into_iter()
            .find(|(m, _)| m.name.inner().inner() == name)
            .and_then(|(_, v)| v)
    }

    /// True if `value` fits into the underlying type.
    #[must_use]
    pub fn fits_underlying(&self, value: i64) -> bool {
        match self.underlying_type {
            PrimitiveKind::Byte => u8::try_from(value).is_ok(),
            PrimitiveKind::SByte => i8::try_from(value).is_ok(),
            PrimitiveKind::Int16 => i16::try_from(value).is_ok(),
            PrimitiveKind::Int64 => true,
            _ => i32::try_from(value).is_ok(),
        }
    }
}
