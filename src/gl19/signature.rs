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

use bls12_381_plus::G1Projective;

use crate::container::{Container, ContainerKind, Reader, Writer};
use crate::errors::Error;
use crate::registry::SchemeId;
use crate::spk::GeneralRepresentationProof;

/// Credential commitments, twin pseudonym encryptions (under the converter
/// and extractor keys) and the representation proof. `expiration` is
/// credential metadata: verification rejects signatures whose credential
/// lifetime has passed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    pub AA: G1Projective,
    pub A_: G1Projective,
    pub d: G1Projective,
    pub nym1: G1Projective,
    pub nym2: G1Projective,
    pub ehy1: G1Projective,
    pub ehy2: G1Projective,
    pub expiration: i64,
    pub pi: GeneralRepresentationProof,
}

impl Container for Signature {
    const SCHEME: Option<SchemeId> = Some(SchemeId::Gl19);
    const KIND: ContainerKind = ContainerKind::Signature;
    const FIELDS: &'static [&'static str] = &[
        "AA", "A_", "d", "nym1", "nym2", "ehy1", "ehy2", "expiration", "pi",
    ];

    fn write_fields(&self, w: &mut Writer) {
        w.g1(&self.AA);
        w.g1(&self.A_);
        w.g1(&self.d);
        w.g1(&self.nym1);
        w.g1(&self.nym2);
        w.g1(&self.ehy1);
        w.g1(&self.ehy2);
        w.i64(self.expiration);
        self.pi.write_fields(w);
    }

    fn read_fields(r: &mut Reader<'_>) -> Result<Self, Error> {
        Ok(Self {
            AA: r.g1("AA")?,
            A_: r.g1("A_")?,
            d: r.g1("d")?,
            nym1: r.g1("nym1")?,
            nym2: r.g1("nym2")?,
            ehy1: r.g1("ehy1")?,
            ehy2: r.g1("ehy2")?,
            expiration: r.i64("expiration")?,
            pi: GeneralRepresentationProof::read_fields(r)?,
        })
    }
}

/// Signature pseudonym re-encrypted toward a blind key, together with the
/// encrypted message digest. `nym3` is only populated between blind and
/// convert.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlindSignature {
    pub nym1: G1Projective,
    pub nym2: G1Projective,
    pub nym3: G1Projective,
    pub c1: G1Projective,
    pub c2: G1Projective,
}

impl Container for BlindSignature {
    const SCHEME: Option<SchemeId> = Some(SchemeId::Gl19);
    const KIND: ContainerKind = ContainerKind::BlindSignature;
    const FIELDS: &'static [&'static str] = &["nym1", "nym2", "nym3", "c1", "c2"];

    fn write_fields(&self, w: &mut Writer) {
        w.g1(&self.nym1);
        w.g1(&self.nym2);
        w.g1(&self.nym3);
        w.g1(&self.c1);
        w.g1(&self.c2);
    }

    fn read_fields(r: &mut Reader<'_>) -> Result<Self, Error> {
        Ok(Self {
            nym1: r.g1("nym1")?,
            nym2: r.g1("nym2")?,
            nym3: r.g1("nym3")?,
            c1: r.g1("c1")?,
            c2: r.g1("c2")?,
        })
    }
}
