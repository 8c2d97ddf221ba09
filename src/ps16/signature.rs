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
use crate::spk::DiscreteLogProof;

/// Randomized Pointcheval-Sanders credential plus the proof of knowledge of
/// the signing exponent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    pub sigma1: G1Projective,
    pub sigma2: G1Projective,
    pub pi: DiscreteLogProof,
}

impl Container for Signature {
    const SCHEME: Option<SchemeId> = Some(SchemeId::Ps16);
    const KIND: ContainerKind = ContainerKind::Signature;
    const FIELDS: &'static [&'static str] = &["sigma1", "sigma2", "pi"];

    fn write_fields(&self, w: &mut Writer) {
        w.g1(&self.sigma1);
        w.g1(&self.sigma2);
        self.pi.write_fields(w);
    }

    fn read_fields(r: &mut Reader<'_>) -> Result<Self, Error> {
        Ok(Self {
            sigma1: r.g1("sigma1")?,
            sigma2: r.g1("sigma2")?,
            pi: DiscreteLogProof::read_fields(r)?,
        })
    }
}
