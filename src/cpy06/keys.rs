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
    pub q: G1Projective, // Q random in G1
    pub r: G2Projective, // R = g2 * gamma
    pub w: G2Projective, // W random in G2 \ 1
    pub x: G1Projective, // X = Z * xi1^-1
    pub y: G1Projective, // Y = Z * xi2^-1
    pub z: G1Projective, // Z random in G1 \ 1
    // precomputed pairings
    pub e1: Gt, // e(g1, W), used in sign
    pub e2: Gt, // e(Z, g2)
    pub e3: Gt, // e(Z, R)
    pub e4: Gt, // e(g1, g2)
    pub e5: Gt, // e(Q, g2), used in verify
}

impl Container for GroupKey {
    const SCHEME: Option<SchemeId> = Some(SchemeId::Cpy06);
    const KIND: ContainerKind = ContainerKind::GroupKey;
    const FIELDS: &'static [&'static str] =
        &["q", "r", "w", "x", "y", "z", "e1", "e2", "e3", "e4", "e5"];

    fn write_fields(&self, w: &mut Writer) {
        w.g1(&self.q);
        w.g2(&self.r);
        w.g2(&self.w);
        w.g1(&self.x);
        w.g1(&self.y);
        w.g1(&self.z);
        w.gt(&self.e1);
        w.gt(&self.e2);
        w.gt(&self.e3);
        w.gt(&self.e4);
        w.gt(&self.e5);
    }

    fn read_fields(r: &mut Reader<'_>) -> Result<Self, Error> {
        Ok(Self {
            q: r.g1("q")?,
            r: r.g2("r")?,
            w: r.g2("w")?,
            x: r.g1("x")?,
            y: r.g1("y")?,
            z: r.g1("z")?,
            e1: r.gt("e1")?,
            e2: r.gt("e2")?,
            e3: r.gt("e3")?,
            e4: r.gt("e4")?,
            e5: r.gt("e5")?,
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
    const SCHEME: Option<SchemeId> = Some(SchemeId::Cpy06);
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
    pub x: Scalar,       // blinded from the manager during join
    pub t: Scalar,       // chosen by the manager
    pub A: G1Projective, // A = (g1*x + Q) * (gamma + t)^-1
    pub(crate) state: JoinState,
}

impl MemberKey {
    pub fn blank() -> Self {
        Self {
            x: Scalar::ZERO,
            t: Scalar::ZERO,
            A: G1Projective::identity(),
            state: JoinState::Start,
        }
    }

    pub fn state(&self) -> JoinState {
        self.state
    }
}

impl Container for MemberKey {
    const SCHEME: Option<SchemeId> = Some(SchemeId::Cpy06);
    const KIND: ContainerKind = ContainerKind::MemberKey;
    const FIELDS: &'static [&'static str] = &["x", "t", "A", "state"];

    fn write_fields(&self, w: &mut Writer) {
        w.scalar(&self.x);
        w.scalar(&self.t);
        w.g1(&self.A);
        w.u8(self.state.code());
    }

    fn read_fields(r: &mut Reader<'_>) -> Result<Self, Error> {
        Ok(Self {
            x: r.scalar("x")?,
            t: r.scalar("t")?,
            A: r.g1("A")?,
            state: JoinState::from_code(r.u8("state")?),
        })
    }
}

/// GML/CRL entry: credential point plus the member's tracing trapdoor
/// (pi = g1 * x).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GmlEntry {
    pub A: G1Projective,
    pub pi: G1Projective,
}

impl LedgerEntry for GmlEntry {
    const SCHEME: SchemeId = SchemeId::Cpy06;

    fn write(&self, w: &mut Writer) {
        w.g1(&self.A);
        w.g1(&self.pi);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self, Error> {
        Ok(Self {
            A: r.g1("A")?,
            pi: r.g1("pi")?,
        })
    }
}
