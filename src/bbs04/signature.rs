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

use bls12_381_plus::{G1Projective, Scalar};

use crate::container::{Container, ContainerKind, Reader, Writer};
use crate::errors::Error;
use crate::registry::SchemeId;

/// Linear-encryption commitments (T1, T2, T3) plus the Fiat-Shamir proof
/// responses over (alpha, beta, x, delta1, delta2).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    pub T1: G1Projective,
    pub T2: G1Projective,
    pub T3: G1Projective,
    pub c: Scalar,
    pub s_alpha: Scalar,
    pub s_beta: Scalar,
    pub s_x: Scalar,
    pub s_delta1: Scalar,
    pub s_delta2: Scalar,
}

impl Container for Signature {
    const SCHEME: Option<SchemeId> = Some(SchemeId::Bbs04);
    const KIND: ContainerKind = ContainerKind::Signature;
    const FIELDS: &'static [&'static str] = &[
        "T1", "T2", "T3", "c", "s_alpha", "s_beta", "s_x", "s_delta1", "s_delta2",
    ];

    fn write_fields(&self, w: &mut Writer) {
        w.g1(&self.T1);
        w.g1(&self.T2);
        w.g1(&self.T3);
        w.scalar(&self.c);
        w.scalar(&self.s_alpha);
        w.scalar(&self.s_beta);
        w.scalar(&self.s_x);
        w.scalar(&self.s_delta1);
        w.scalar(&self.s_delta2);
    }

    fn read_fields(r: &mut Reader<'_>) -> Result<Self, Error> {
        Ok(Self {
            T1: r.g1("T1")?,
            T2: r.g1("T2")?,
            T3: r.g1("T3")?,
            c: r.scalar("c")?,
            s_alpha: r.scalar("s_alpha")?,
            s_beta: r.scalar("s_beta")?,
            s_x: r.scalar("s_x")?,
            s_delta1: r.scalar("s_delta1")?,
            s_delta2: r.scalar("s_delta2")?,
        })
    }
}
