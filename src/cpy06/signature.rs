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

use crate::container::{Container, ContainerKind, Reader, Writer};
use crate::errors::Error;
use crate::registry::SchemeId;

/// Commitments (T1..T3 linear encryption, T4/T5 tracing pair) plus the
/// Fiat-Shamir responses over (r1, r2, d1, d2, x, t).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    pub T1: G1Projective,
    pub T2: G1Projective,
    pub T3: G1Projective,
    pub T4: G2Projective,
    pub T5: Gt,
    pub c: Scalar,
    pub sr1: Scalar,
    pub sr2: Scalar,
    pub sd1: Scalar,
    pub sd2: Scalar,
    pub sx: Scalar,
    pub st: Scalar,
}

impl Container for Signature {
    const SCHEME: Option<SchemeId> = Some(SchemeId::Cpy06);
    const KIND: ContainerKind = ContainerKind::Signature;
    const FIELDS: &'static [&'static str] = &[
        "T1", "T2", "T3", "T4", "T5", "c", "sr1", "sr2", "sd1", "sd2", "sx", "st",
    ];

    fn write_fields(&self, w: &mut Writer) {
        w.g1(&self.T1);
        w.g1(&self.T2);
        w.g1(&self.T3);
        w.g2(&self.T4);
        w.gt(&self.T5);
        w.scalar(&self.c);
        w.scalar(&self.sr1);
        w.scalar(&self.sr2);
        w.scalar(&self.sd1);
        w.scalar(&self.sd2);
        w.scalar(&self.sx);
        w.scalar(&self.st);
    }

    fn read_fields(r: &mut Reader<'_>) -> Result<Self, Error> {
        Ok(Self {
            T1: r.g1("T1")?,
            T2: r.g1("T2")?,
            T3: r.g1("T3")?,
            T4: r.g2("T4")?,
            T5: r.gt("T5")?,
            c: r.scalar("c")?,
            sr1: r.scalar("sr1")?,
            sr2: r.scalar("sr2")?,
            sd1: r.scalar("sd1")?,
            sd2: r.scalar("sd2")?,
            sx: r.scalar("sx")?,
            st: r.scalar("st")?,
        })
    }
}
