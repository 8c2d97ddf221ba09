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
use crate::registry::SchemeId;
use crate::scheme::JoinState;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupKey {
    pub g1: G1Projective,  // random generator of G1
    pub g2: G2Projective,  // random generator of G2
    pub h1: G1Projective,  // random generator of G1
    pub h2: G1Projective,  // random generator of G1
    pub ipk: G2Projective, // issuer public key, g2 * isk
}

impl Container for GroupKey {
    const SCHEME: Option<SchemeId> = Some(SchemeId::Dl21);
    const KIND: ContainerKind = ContainerKind::GroupKey;
    const FIELDS: &'static [&'static str] = &["g1", "g2", "h1", "h2", "ipk"];

    fn write_fields(&self, w: &mut Writer) {
        w.g1(&self.g1);
        w.g2(&self.g2);
        w.g1(&self.h1);
        w.g1(&self.h2);
        w.g2(&self.ipk);
    }

    fn read_fields(r: &mut Reader<'_>) -> Result<Self, Error> {
        Ok(Self {
            g1: r.g1("g1")?,
            g2: r.g2("g2")?,
            h1: r.g1("h1")?,
            h2: r.g1("h2")?,
            ipk: r.g2("ipk")?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ManagerKey {
    pub isk: Scalar, // issuer secret key
}

impl Container for ManagerKey {
    const SCHEME: Option<SchemeId> = Some(SchemeId::Dl21);
    const KIND: ContainerKind = ContainerKind::ManagerKey;
    const FIELDS: &'static [&'static str] = &["isk"];

    fn write_fields(&self, w: &mut Writer) {
        w.scalar(&self.isk);
    }

    fn read_fields(r: &mut Reader<'_>) -> Result<Self, Error> {
        Ok(Self {
            isk: r.scalar("isk")?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberKey {
    pub A: G1Projective, // A = (H + h2*s + g1) * (isk + x)^-1
    pub x: Scalar,       // picked by the issuer
    pub y: Scalar,       // picked by the member, never leaves it
    pub s: Scalar,       // picked by the issuer
    pub H: G1Projective, // member public key, h1 * y
    pub h2s: G1Projective, // h2 * s, precomputed for signing
    pub(crate) state: JoinState,
}

impl MemberKey {
    pub fn blank() -> Self {
        Self {
            A: G1Projective::identity(),
            x: Scalar::ZERO,
            y: Scalar::ZERO,
            s: Scalar::ZERO,
            H: G1Projective::identity(),
            h2s: G1Projective::identity(),
            state: JoinState::Start,
        }
    }

    pub fn state(&self) -> JoinState {
        self.state
    }
}

impl Container for MemberKey {
    const SCHEME: Option<SchemeId> = Some(SchemeId::Dl21);
    const KIND: ContainerKind = ContainerKind::MemberKey;
    const FIELDS: &'static [&'static str] = &["A", "x", "y", "s", "H", "h2s", "state"];

    fn write_fields(&self, w: &mut Writer) {
        w.g1(&self.A);
        w.scalar(&self.x);
        w.scalar(&self.y);
        w.scalar(&self.s);
        w.g1(&self.H);
        w.g1(&self.h2s);
        w.u8(self.state.code());
    }

    fn read_fields(r: &mut Reader<'_>) -> Result<Self, Error> {
        Ok(Self {
            A: r.g1("A")?,
            x: r.scalar("x")?,
            y: r.scalar("y")?,
            s: r.scalar("s")?,
            H: r.g1("H")?,
            h2s: r.g1("h2s")?,
            state: JoinState::from_code(r.u8("state")?),
        })
    }
}
