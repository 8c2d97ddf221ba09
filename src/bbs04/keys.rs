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

use bls12_381_plus::{G1Projective, G2Projective, Gt, Scalar};
use ff::Field;
use group::Group;

use crate::container::{Container, ContainerKind, Reader, Writer};
use crate::errors::Error;
use crate::gml::LedgerEntry;
use crate::registry::SchemeId;
use crate::scheme::JoinState;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupKey {
    pub g1: G1Projective,
    pub g2: G2Projective, // random generator of G2
    pub h: G1Projective,  // random element in G1 \ 1
    pub u: G1Projective,  // h * xi1^-1
    pub v: G1Projective,  // h * xi2^-1
    pub w: G2Projective,  // g2 * gamma
    // precomputed pairings used by sign and verify
    pub hw: Gt,   // e(h, w)
    pub hg2: Gt,  // e(h, g2)
    pub g1g2: Gt, // e(g1, g2)
}

impl Container for GroupKey {
    const SCHEME: Option<SchemeId> = Some(SchemeId::Bbs04);
    const KIND: ContainerKind = ContainerKind::GroupKey;
    const FIELDS: &'static [&'static str] =
        &["g1", "g2", "h", "u", "v", "w", "hw", "hg2", "g1g2"];

    fn write_fields(&self, w: &mut Writer) {
        w.g1(&self.g1);
        w.g2(&self.g2);
        w.g1(&self.h);
        w.g1(&self.u);
        w.g1(&self.v);
        w.g2(&self.w);
        w.gt(&self.hw);
        w.gt(&self.hg2);
        w.gt(&self.g1g2);
    }

    fn read_fields(r: &mut Reader<'_>) -> Result<Self, Error> {
        Ok(Self {
            g1: r.g1("g1")?,
            g2: r.g2("g2")?,
            h: r.g1("h")?,
            u: r.g1("u")?,
            v: r.g1("v")?,
            w: r.g2("w")?,
            hw: r.gt("hw")?,
            hg2: r.gt("hg2")?,
            g1g2: r.gt("g1g2")?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ManagerKey {
    pub xi1: Scalar,   // tracing exponent
    pub xi2: Scalar,   // tracing exponent
    pub gamma: Scalar, // issuing exponent
}

impl Container for ManagerKey {
    const SCHEME: Option<SchemeId> = Some(SchemeId::Bbs04);
    const KIND: ContainerKind = ContainerKind::ManagerKey;
    const FIELDS: &'static [&'static str] = &["xi1", "xi2", "gamma"];

    fn write_fields(&self, w: &mut Writer) {
        w.scalar(&self.xi1);
        w.scalar(&self.xi2);
        w.scalar(&self.gamma);
    }

    fn read_fields(r: &mut Reader<'_>) -> Result<Self, Error> {
        Ok(Self {
            xi1: r.scalar("xi1")?,
            xi2: r.scalar("xi2")?,
            gamma: r.scalar("gamma")?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberKey {
    pub x: Scalar,
    pub A: G1Projective, // A = g1 * (gamma + x)^-1
    pub Ag2: Gt,         // e(A, g2), precomputed for signing
    pub(crate) state: JoinState,
}

impl MemberKey {
    /// Fresh key ready to enter the join protocol.
    pub fn blank() -> Self {
        Self {
            x: Scalar::ZERO,
            A: G1Projective::identity(),
            Ag2: Gt::identity(),
            state: JoinState::Start,
        }
    }

    pub fn state(&self) -> JoinState {
        self.state
    }
}

impl Container for MemberKey {
    const SCHEME: Option<SchemeId> = Some(SchemeId::Bbs04);
    const KIND: ContainerKind = ContainerKind::MemberKey;
    const FIELDS: &'static [&'static str] = &["x", "A", "Ag2", "state"];

    fn write_fields(&self, w: &mut Writer) {
        w.scalar(&self.x);
        w.g1(&self.A);
        w.gt(&self.Ag2);
        w.u8(self.state.code());
    }

    fn read_fields(r: &mut Reader<'_>) -> Result<Self, Error> {
        Ok(Self {
            x: r.scalar("x")?,
            A: r.g1("A")?,
            Ag2: r.gt("Ag2")?,
            state: JoinState::from_code(r.u8("state")?),
        })
    }
}

/// GML entry: the credential point the tracing equation recovers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GmlEntry {
    pub A: G1Projective,
}

impl LedgerEntry for GmlEntry {
    const SCHEME: SchemeId = SchemeId::Bbs04;

    fn write(&self, w: &mut Writer) {
        w.g1(&self.A);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self, Error> {
        Ok(Self { A: r.g1("A")? })
    }
}
