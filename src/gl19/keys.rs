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
use crate::utils::arith::random_scalar;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupKey {
    pub g1: G1Projective,  // random generator of G1
    pub g2: G2Projective,  // random generator of G2
    pub g: G1Projective,   // encryption base
    pub h: G1Projective,   // pseudonym base
    pub h1: G1Projective,  // member-key base
    pub h2: G1Projective,  // credential base
    pub h3: G1Projective,  // expiration base
    pub ipk: G2Projective, // issuer public key
    pub cpk: G1Projective, // converter public key
    pub epk: G1Projective, // extractor public key
}

impl Container for GroupKey {
    const SCHEME: Option<SchemeId> = Some(SchemeId::Gl19);
    const KIND: ContainerKind = ContainerKind::GroupKey;
    const FIELDS: &'static [&'static str] =
        &["g1", "g2", "g", "h", "h1", "h2", "h3", "ipk", "cpk", "epk"];

    fn write_fields(&self, w: &mut Writer) {
        w.g1(&self.g1);
        w.g2(&self.g2);
        w.g1(&self.g);
        w.g1(&self.h);
        w.g1(&self.h1);
        w.g1(&self.h2);
        w.g1(&self.h3);
        w.g2(&self.ipk);
        w.g1(&self.cpk);
        w.g1(&self.epk);
    }

    fn read_fields(r: &mut Reader<'_>) -> Result<Self, Error> {
        Ok(Self {
            g1: r.g1("g1")?,
            g2: r.g2("g2")?,
            g: r.g1("g")?,
            h: r.g1("h")?,
            h1: r.g1("h1")?,
            h2: r.g1("h2")?,
            h3: r.g1("h3")?,
            ipk: r.g2("ipk")?,
            cpk: r.g1("cpk")?,
            epk: r.g1("epk")?,
        })
    }
}

/// Issuer, converter and extractor secrets are separate authorities.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ManagerKey {
    pub isk: Scalar,
    pub csk: Scalar,
    pub esk: Scalar,
}

impl Container for ManagerKey {
    const SCHEME: Option<SchemeId> = Some(SchemeId::Gl19);
    const KIND: ContainerKind = ContainerKind::ManagerKey;
    const FIELDS: &'static [&'static str] = &["isk", "csk", "esk"];

    fn write_fields(&self, w: &mut Writer) {
        w.scalar(&self.isk);
        w.scalar(&self.csk);
        w.scalar(&self.esk);
    }

    fn read_fields(r: &mut Reader<'_>) -> Result<Self, Error> {
        Ok(Self {
            isk: r.scalar("isk")?,
            csk: r.scalar("csk")?,
            esk: r.scalar("esk")?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberKey {
    pub A: G1Projective, // A = (H + h2*s + h3*d + g1) * (isk + x)^-1
    pub x: Scalar,       // picked by the issuer
    pub y: Scalar,       // picked by the member
    pub s: Scalar,       // picked by the issuer
    pub expiration: i64, // credential lifetime bound (unix seconds)
    pub d: Scalar,       // Hash(expiration) as a scalar
    pub H: G1Projective, // member public key, h1 * y
    pub h2s: G1Projective, // h2 * s
    pub h3d: G1Projective, // h3 * d
    pub(crate) state: JoinState,
}

impl MemberKey {
    pub fn blank() -> Self {
        Self {
            A: G1Projective::identity(),
            x: Scalar::ZERO,
            y: Scalar::ZERO,
            s: Scalar::ZERO,
            expiration: -1,
            d: Scalar::ZERO,
            H: G1Projective::identity(),
            h2s: G1Projective::identity(),
            h3d: G1Projective::identity(),
            state: JoinState::Start,
        }
    }

    pub fn state(&self) -> JoinState {
        self.state
    }
}

impl Container for MemberKey {
    const SCHEME: Option<SchemeId> = Some(SchemeId::Gl19);
    const KIND: ContainerKind = ContainerKind::MemberKey;
    const FIELDS: &'static [&'static str] =
        &["A", "x", "y", "s", "expiration", "d", "H", "h2s", "h3d", "state"];

    fn write_fields(&self, w: &mut Writer) {
        w.g1(&self.A);
        w.scalar(&self.x);
        w.scalar(&self.y);
        w.scalar(&self.s);
        w.i64(self.expiration);
        w.scalar(&self.d);
        w.g1(&self.H);
        w.g1(&self.h2s);
        w.g1(&self.h3d);
        w.u8(self.state.code());
    }

    fn read_fields(r: &mut Reader<'_>) -> Result<Self, Error> {
        Ok(Self {
            A: r.g1("A")?,
            x: r.scalar("x")?,
            y: r.scalar("y")?,
            s: r.scalar("s")?,
            expiration: r.i64("expiration")?,
            d: r.scalar("d")?,
            H: r.g1("H")?,
            h2s: r.g1("h2s")?,
            h3d: r.g1("h3d")?,
            state: JoinState::from_code(r.u8("state")?),
        })
    }
}

/// Ephemeral re-encryption key pair for the blind pipeline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlindKey {
    pub pk: G1Projective, // g * sk
    pub sk: Scalar,
}

impl BlindKey {
    pub fn from_random(grpkey: &GroupKey) -> Self {
        let sk = random_scalar();
        Self {
            pk: grpkey.g * sk,
            sk,
        }
    }

    /// Public half, as handed to the converter.
    pub fn public(&self) -> G1Projective {
        self.pk
    }
}

impl Container for BlindKey {
    const SCHEME: Option<SchemeId> = Some(SchemeId::Gl19);
    const KIND: ContainerKind = ContainerKind::BlindKey;
    const FIELDS: &'static [&'static str] = &["pk", "sk"];

    fn write_fields(&self, w: &mut Writer) {
        w.g1(&self.pk);
        w.scalar(&self.sk);
    }

    fn read_fields(r: &mut Reader<'_>) -> Result<Self, Error> {
        Ok(Self {
            pk: r.g1("pk")?,
            sk: r.scalar("sk")?,
        })
    }
}
