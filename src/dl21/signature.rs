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

/// Re-randomized BBS+-style credential, scope pseudonym and the
/// representation proof binding them to the message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    pub AA: G1Projective,
    pub A_: G1Projective,
    pub d: G1Projective,
    pub nym: G1Projective, // HashToPoint(scope) * y
    pub pi: GeneralRepresentationProof,
}

impl Container for Signature {
    const SCHEME: Option<SchemeId> = Some(SchemeId::Dl21);
    const KIND: ContainerKind = ContainerKind::Signature;
    const FIELDS: &'static [&'static str] = &["AA", "A_", "d", "nym", "pi"];

    fn write_fields(&self, w: &mut Writer) {
        w.g1(&self.AA);
        w.g1(&self.A_);
        w.g1(&self.d);
        w.g1(&self.nym);
        self.pi.write_fields(w);
    }

    fn read_fields(r: &mut Reader<'_>) -> Result<Self, Error> {
        Ok(Self {
            AA: r.g1("AA")?,
            A_: r.g1("A_")?,
            d: r.g1("d")?,
            nym: r.g1("nym")?,
            pi: GeneralRepresentationProof::read_fields(r)?,
        })
    }
}
