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
    pub g: G1Projective,    // random generator of G1
    pub gg: G2Projective,   // random generator of G2
    pub XX: G2Projective,   // gg * x (issuer)
    pub YY: G2Projective,   // gg * y (issuer)
    pub ZZ0: G2Projective,  // gg * z0 (opener)
    pub ZZ1: G2Projective,  // gg * z1 (opener)
}

impl Container for GroupKey {
    const SCHEME: Option<SchemeId> = Some(SchemeId::Klap20);
    const KIND: ContainerKind = ContainerKind::GroupKey;
    const FIELDS: &'static [&'static str] = &["g", "gg", "XX", "YY", "ZZ0", "ZZ1"];

    fn write_fields(&self, w: &mut Writer) {
        w.g1(&self.g);
        w.g2(&self.gg);
        w.g2(&self.XX);
        w.g2(&self.YY);
        w.g2(&self.ZZ0);
        w.g2(&self.ZZ1);
    }

    fn read_fields(r: &mut Reader<'_>) -> Result<Self, Error> {
        Ok(Self {
            g: r.g1("g")?,
            gg: r.g2("gg")?,
            XX: r.g2("XX")?,
            YY: r.g2("YY")?,
            ZZ0: r.g2("ZZ0")?,
            ZZ1: r.g2("ZZ1")?,
        })
    }
}

/// Issuing authority (x, y) and opening authority (z0, z1) are distinct
/// secrets; deployments may hold them on different machines.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ManagerKey {
    pub x: Scalar,
    pub y: Scalar,
    pub z0: Scalar,
    pub z1: Scalar,
}

impl Container for ManagerKey {
    const SCHEME: Option<SchemeId> = Some(SchemeId::Klap20);
    const KIND: ContainerKind = ContainerKind::ManagerKey;
    const FIELDS: &'static [&'static str] = &["x", "y", "z0", "z1"];

    fn write_fields(&self, w: &mut Writer) {
        w.scalar(&self.x);
        w.scalar(&self.y);
        w.scalar(&self.z0);
        w.scalar(&self.z1);
    }

    fn read_fields(r: &mut Reader<'_>) -> Result<Self, Error> {
        Ok(Self {
            x: r.scalar("x")?,
            y: r.scalar("y")?,
            z0: r.scalar("z0")?,
            z1: r.scalar("z1")?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberKey {
    pub alpha: Scalar,
    pub u: G1Projective, // u = HashToPoint(f)
    pub v: G1Projective, // v = u*x + w*y, issued credential
    pub w: G1Projective, // w = u*alpha
    pub(crate) state: JoinState,
}

impl MemberKey {
    pub fn blank() -> Self {
        Self {
            alpha: Scalar::ZERO,
            u: G1Projective::identity(),
            v: G1Projective::identity(),
            w: G1Projective::identity(),
            state: JoinState::Start,
        }
    }

    pub fn state(&self) -> JoinState {
        self.state
    }
}

impl Container for MemberKey {
    const SCHEME: Option<SchemeId> = Some(SchemeId::Klap20);
    const KIND: ContainerKind = ContainerKind::MemberKey;
    const FIELDS: &'static [&'static str] = &["alpha", "u", "v", "w", "state"];

    fn write_fields(&self, w: &mut Writer) {
        w.scalar(&self.alpha);
        w.g1(&self.u);
        w.g1(&self.v);
        w.g1(&self.w);
        w.u8(self.state.code());
    }

    fn read_fields(r: &mut Reader<'_>) -> Result<Self, Error> {
        Ok(Self {
            alpha: r.scalar("alpha")?,
            u: r.g1("u")?,
            v: r.g1("v")?,
            w: r.g1("w")?,
            state: JoinState::from_code(r.u8("state")?),
        })
    }
}

/// GML entry: the twin ElGamal escrows of gg^alpha under the two opener
/// shares, plus tau = e(f, gg) pinning the member in GT.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GmlEntry {
    pub SS0: G2Projective,
    pub SS1: G2Projective,
    pub ff0: G2Projective,
    pub ff1: G2Projective,
    pub tau: Gt,
}

impl LedgerEntry for GmlEntry {
    const SCHEME: SchemeId = SchemeId::Klap20;

    fn write(&self, w: &mut Writer) {
        w.g2(&self.SS0);
        w.g2(&self.SS1);
        w.g2(&self.ff0);
        w.g2(&self.ff1);
        w.gt(&self.tau);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self, Error> {
        Ok(Self {
            SS0: r.g2("SS0")?,
            SS1: r.g2("SS1")?,
            ff0: r.g2("ff0")?,
            ff1: r.g2("ff1")?,
            tau: r.gt("tau")?,
        })
    }
}
