// Copyright 2025 Fondazione LINKS

// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at

//     http://www.apache.org/licenses/LICENSE-2.0

// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use bls12_381_plus::{G1Projective, G2Projective, Scalar};
use ff::Field;
use group::Group;

use crate::container::{Container, ContainerKind, Reader, Writer};
use crate::errors::Error;
use crate::gml::LedgerEntry;
use crate::registry::SchemeId;
use crate::scheme::JoinState;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupKey {
    pub g: G1Projective,  // random generator of G1
    pub gg: G2Projective, // random generator of G2
    pub X: G2Projective,  // gg * x
    pub Y: G2Projective,  // gg * y
}

impl Container for GroupKey {
    const SCHEME: Option<SchemeId> = Some(SchemeId::Ps16);
    const KIND: ContainerKind = ContainerKind::GroupKey;
    const FIELDS: &'static [&'static str] = &["g", "gg", "X", "Y"];

    fn write_fields(&self, w: &mut Writer) {
        w.g1(&self.g);
        w.g2(&self.gg);
        w.g2(&self.X);
        w.g2(&self.Y);
    }

    fn read_fields(r: &mut Reader<'_>) -> Result<Self, Error> {
        Ok(Self {
            g: r.g1("g")?,
            gg: r.g2("gg")?,
            X: r.g2("X")?,
            Y: r.g2("Y")?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ManagerKey {
    pub x: Scalar,
    pub y: Scalar,
}

impl Container for ManagerKey {
    const SCHEME: Option<SchemeId> = Some(SchemeId::Ps16);
    const KIND: ContainerKind = ContainerKind::ManagerKey;
    const FIELDS: &'static [&'static str] = &["x", "y"];

    fn write_fields(&self, w: &mut Writer) {
        w.scalar(&self.x);
        w.scalar(&self.y);
    }

    fn read_fields(r: &mut Reader<'_>) -> Result<Self, Error> {
        Ok(Self {
            x: r.scalar("x")?,
            y: r.scalar("y")?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberKey {
    pub sk: Scalar,
    pub sigma1: G1Projective,
    pub sigma2: G1Projective,
    pub(crate) state: JoinState,
}

impl MemberKey {
    pub fn blank() -> Self {
        Self {
            sk: Scalar::ZERO,
            sigma1: G1Projective::identity(),
            sigma2: G1Projective::identity(),
            state: JoinState::Start,
        }
    }

    pub fn state(&self) -> JoinState {
        self.state
    }
}

impl Container for MemberKey {
    const SCHEME: Option<SchemeId> = Some(SchemeId::Ps16);
    const KIND: ContainerKind = ContainerKind::MemberKey;
    const FIELDS: &'static [&'static str] = &["sk", "sigma1", "sigma2", "state"];

    fn write_fields(&self, w: &mut Writer) {
        w.scalar(&self.sk);
        w.g1(&self.sigma1);
        w.g1(&self.sigma2);
        w.u8(self.state.code());
    }

    fn read_fields(r: &mut Reader<'_>) -> Result<Self, Error> {
        Ok(Self {
            sk: r.scalar("sk")?,
            sigma1: r.g1("sigma1")?,
            sigma2: r.g1("sigma2")?,
            state: JoinState::from_code(r.u8("state")?),
        })
    }
}

/// GML entry: the member's commitment pair from enrollment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GmlEntry {
    pub tau: G1Projective,
    pub ttau: G2Projective,
}

impl LedgerEntry for GmlEntry {
    const SCHEME: SchemeId = SchemeId::Ps16;

    fn write(&self, w: &mut Writer) {
        w.g1(&self.tau);
        w.g2(&self.ttau);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self, Error> {
        Ok(Self {
            tau: r.g1("tau")?,
            ttau: r.g2("ttau")?,
        })
    }
}
