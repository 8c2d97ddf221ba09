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

//! Signature proofs of knowledge (SPK): non-interactive Schnorr-style
//! proofs via Fiat-Shamir, parameterized by a binding string so a proof
//! cannot be replayed under another message or scope.
//!
//! Three shapes cover every scheme in the crate:
//! - [`discrete_log_sign`]: knowledge of `x` with `Y = g*x`;
//! - [`representation_sign`]: knowledge of a witness vector satisfying
//!   several simultaneous multi-exponentiation equations, possibly spanning
//!   G1 and G2;
//! - [`pairing_homomorphism_sign`] / [`dual_pairing_homomorphism_sign`]:
//!   knowledge of a G2 exponent under one or two pairing-target relations.
//!
//! Blinding scalars are drawn fresh on every call; reusing them across two
//! proofs for the same witness would leak it.

use bls12_381_plus::{G1Projective, G2Projective, Gt, Scalar};
use serde::{Deserialize, Serialize};

use crate::container::{Container, ContainerKind, Reader, Writer};
use crate::errors::Error;
use crate::registry::SchemeId;
use crate::utils::arith::{pair, random_g2, random_scalar, Transcript};

/// Statement element for representation proofs. KLAP20's enrollment
/// statement mixes both source groups, so products are formed through this
/// enum; adding across groups is rejected as an ill-formed statement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Element {
    G1(G1Projective),
    G2(G2Projective),
}

impl Element {
    fn mul(&self, s: &Scalar) -> Element {
        match self {
            Self::G1(p) => Self::G1(p * s),
            Self::G2(p) => Self::G2(p * s),
        }
    }

    fn add(&self, other: &Element) -> Result<Element, Error> {
        match (self, other) {
            (Self::G1(a), Self::G1(b)) => Ok(Self::G1(a + b)),
            (Self::G2(a), Self::G2(b)) => Ok(Self::G2(a + b)),
            _ => Err(Error::Statement("sum spans distinct groups")),
        }
    }

    fn feed(&self, t: &mut Transcript) {
        match self {
            Self::G1(p) => t.g1(p),
            Self::G2(p) => t.g2(p),
        };
    }
}

impl From<G1Projective> for Element {
    fn from(p: G1Projective) -> Self {
        Self::G1(p)
    }
}

impl From<G2Projective> for Element {
    fn from(p: G2Projective) -> Self {
        Self::G2(p)
    }
}

/// Proof of knowledge of a discrete logarithm: `Y = g*x`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscreteLogProof {
    pub c: Scalar,
    pub s: Scalar,
}

impl Container for DiscreteLogProof {
    const SCHEME: Option<SchemeId> = None;
    const KIND: ContainerKind = ContainerKind::Proof;
    const FIELDS: &'static [&'static str] = &["c", "s"];

    fn write_fields(&self, w: &mut Writer) {
        w.scalar(&self.c);
        w.scalar(&self.s);
    }

    fn read_fields(r: &mut Reader<'_>) -> Result<Self, Error> {
        Ok(Self {
            c: r.scalar("c")?,
            s: r.scalar("s")?,
        })
    }
}

/// Proof of knowledge of a witness vector under simultaneous
/// multi-exponentiation equations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralRepresentationProof {
    pub c: Scalar,
    pub s: Vec<Scalar>,
}

impl Container for GeneralRepresentationProof {
    const SCHEME: Option<SchemeId> = None;
    const KIND: ContainerKind = ContainerKind::Proof;
    const FIELDS: &'static [&'static str] = &["c", "s"];

    fn write_fields(&self, w: &mut Writer) {
        w.scalar(&self.c);
        w.scalar_vec(&self.s);
    }

    fn read_fields(r: &mut Reader<'_>) -> Result<Self, Error> {
        Ok(Self {
            c: r.scalar("c")?,
            s: r.scalar_vec("s")?,
        })
    }
}

/// Proof of knowledge of a G2 exponent under a pairing-target relation.
/// `tau` carries the second-relation target for the dual variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PairingHomomorphismProof {
    pub c: Scalar,
    pub s: G2Projective,
    pub tau: Option<Gt>,
}

impl Container for PairingHomomorphismProof {
    const SCHEME: Option<SchemeId> = None;
    const KIND: ContainerKind = ContainerKind::Proof;
    const FIELDS: &'static [&'static str] = &["c", "s", "tau"];

    fn write_fields(&self, w: &mut Writer) {
        w.scalar(&self.c);
        w.g2(&self.s);
        match &self.tau {
            Some(tau) => {
                w.u8(1);
                w.gt(tau);
            }
            None => w.u8(0),
        }
    }

    fn read_fields(r: &mut Reader<'_>) -> Result<Self, Error> {
        let c = r.scalar("c")?;
        let s = r.g2("s")?;
        let tau = match r.u8("tau")? {
            0 => None,
            1 => Some(r.gt("tau")?),
            _ => return Err(Error::decoding("tau", "invalid presence byte")),
        };
        Ok(Self { c, s, tau })
    }
}

pub fn discrete_log_sign(
    Y: &G1Projective,
    g: &G1Projective,
    x: &Scalar,
    binding: &[u8],
) -> DiscreteLogProof {
    let r = random_scalar();
    let gr = g * r;

    let mut t = Transcript::new();
    t.bytes(binding).g1(Y).g1(g).g1(&gr);
    let c = t.challenge();

    // s = r - c*x
    DiscreteLogProof { c, s: r - c * x }
}

pub fn discrete_log_verify(
    Y: &G1Projective,
    g: &G1Projective,
    proof: &DiscreteLogProof,
    binding: &[u8],
) -> bool {
    // g*s + Y*c reproduces the signer's commitment iff s = r - c*x
    let gr = g * proof.s + Y * proof.c;

    let mut t = Transcript::new();
    t.bytes(binding).g1(Y).g1(g).g1(&gr);
    t.challenge() == proof.c
}

/// Validates the statement wiring shared by sign and verify. `wiring` maps
/// each product term to a `(witness index, base index)` pair; `prods[j]`
/// says how many consecutive terms make up equation `j`.
fn check_statement(
    y_len: usize,
    g_len: usize,
    wiring: &[(usize, usize)],
    prods: &[usize],
) -> Result<(), Error> {
    if y_len == 0 || g_len == 0 || wiring.is_empty() {
        return Err(Error::Statement("empty statement vector"));
    }
    if prods.len() != y_len {
        return Err(Error::Statement("one product arity per equation required"));
    }
    if prods.iter().any(|&n| n == 0) {
        return Err(Error::Statement("equation with no terms"));
    }
    if prods.iter().sum::<usize>() != wiring.len() {
        return Err(Error::Statement("product arities do not cover the wiring"));
    }
    if wiring.iter().any(|&(_, gi)| gi >= g_len) {
        return Err(Error::Statement("wiring index out of range"));
    }
    Ok(())
}

fn transcript_challenge(
    binding: &[u8],
    y: &[Element],
    g: &[Element],
    wiring: &[(usize, usize)],
    prod: &[Element],
) -> Scalar {
    let mut t = Transcript::new();
    t.bytes(binding);
    for el in y {
        el.feed(&mut t);
    }
    for el in g {
        el.feed(&mut t);
    }
    for &(xi, gi) in wiring {
        t.bytes(&[
            (xi & 0xff) as u8,
            ((xi >> 8) & 0xff) as u8,
            (gi & 0xff) as u8,
            ((gi >> 8) & 0xff) as u8,
        ]);
    }
    for el in prod {
        el.feed(&mut t);
    }
    t.challenge()
}

pub fn representation_sign(
    y: &[Element],
    g: &[Element],
    x: &[Scalar],
    wiring: &[(usize, usize)],
    prods: &[usize],
    binding: &[u8],
) -> Result<GeneralRepresentationProof, Error> {
    check_statement(y.len(), g.len(), wiring, prods)?;
    if x.is_empty() {
        return Err(Error::Statement("empty witness vector"));
    }
    if wiring.iter().any(|&(xi, _)| xi >= x.len()) {
        return Err(Error::Statement("wiring index out of range"));
    }

    let r: Vec<Scalar> = x.iter().map(|_| random_scalar()).collect();
    let gr: Vec<Element> = wiring.iter().map(|&(xi, gi)| g[gi].mul(&r[xi])).collect();

    // Group the commitment terms into one product per equation.
    let mut prod = Vec::with_capacity(y.len());
    let mut idx = 0;
    for &arity in prods {
        let mut acc = gr[idx];
        for term in &gr[idx + 1..idx + arity] {
            acc = acc.add(term)?;
        }
        prod.push(acc);
        idx += arity;
    }

    let c = transcript_challenge(binding, y, g, wiring, &prod);
    let s = x.iter().zip(&r).map(|(xi, ri)| ri - c * xi).collect();
    Ok(GeneralRepresentationProof { c, s })
}

pub fn representation_verify(
    y: &[Element],
    g: &[Element],
    wiring: &[(usize, usize)],
    prods: &[usize],
    proof: &GeneralRepresentationProof,
    binding: &[u8],
) -> Result<bool, Error> {
    check_statement(y.len(), g.len(), wiring, prods)?;
    // A response vector shorter than the wiring demands is a bad proof,
    // not a bad statement.
    if wiring.iter().any(|&(xi, _)| xi >= proof.s.len()) {
        return Ok(false);
    }

    let mut prod = Vec::with_capacity(y.len());
    let mut idx = 0;
    for (j, &arity) in prods.iter().enumerate() {
        let mut acc = y[j].mul(&proof.c);
        for &(xi, gi) in &wiring[idx..idx + arity] {
            acc = acc.add(&g[gi].mul(&proof.s[xi]))?;
        }
        prod.push(acc);
        idx += arity;
    }

    Ok(transcript_challenge(binding, y, g, wiring, &prod) == proof.c)
}

/// Knowledge of `xx` in G2 with `target = e(g, xx)`.
pub fn pairing_homomorphism_sign(
    g: &G1Projective,
    target: &Gt,
    xx: &G2Projective,
    binding: &[u8],
) -> PairingHomomorphismProof {
    let rr = random_g2();
    let R = pair(g, &rr);

    let mut t = Transcript::new();
    t.bytes(binding).g1(g).gt(target).gt(&R);
    let c = t.challenge();

    // s = r + c*xx; the verifier divides the commitment back out
    PairingHomomorphismProof {
        c,
        s: rr + xx * c,
        tau: None,
    }
}

pub fn pairing_homomorphism_verify(
    g: &G1Projective,
    target: &Gt,
    proof: &PairingHomomorphismProof,
    binding: &[u8],
) -> bool {
    let R = pair(g, &proof.s) - target * proof.c;

    let mut t = Transcript::new();
    t.bytes(binding).g1(g).gt(target).gt(&R);
    t.challenge() == proof.c
}

/// Knowledge of `xx` in G2 with `e1 = e(g1, xx)` and `tau = e(g2, xx)`;
/// `tau` travels inside the proof so the verifier can pin the second
/// relation without access to the prover's ledger.
pub fn dual_pairing_homomorphism_sign(
    xx: &G2Projective,
    g1: &G1Projective,
    g2: &G1Projective,
    e1: &Gt,
    tau: &Gt,
    binding: &[u8],
) -> PairingHomomorphismProof {
    let rr = random_g2();
    let RR1 = pair(g1, &rr);
    let RR2 = pair(g2, &rr);

    let mut t = Transcript::new();
    t.g1(g1).g1(g2).gt(e1).gt(tau).gt(&RR1).gt(&RR2).bytes(binding);
    let c = t.challenge();

    PairingHomomorphismProof {
        c,
        s: rr + xx * c,
        tau: Some(*tau),
    }
}

pub fn dual_pairing_homomorphism_verify(
    proof: &PairingHomomorphismProof,
    g1: &G1Projective,
    g2: &G1Projective,
    e1: &Gt,
    binding: &[u8],
) -> bool {
    let tau = match &proof.tau {
        Some(tau) => tau,
        None => return false,
    };
    let RR1 = pair(g1, &proof.s) - e1 * proof.c;
    let RR2 = pair(g2, &proof.s) - tau * proof.c;

    let mut t = Transcript::new();
    t.g1(g1).g1(g2).gt(e1).gt(tau).gt(&RR1).gt(&RR2).bytes(binding);
    t.challenge() == proof.c
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::arith::{random_g1, random_scalar};
    use ff::Field;

    #[test]
    fn discrete_log_round_trip() {
        let g = random_g1();
        let x = random_scalar();
        let Y = g * x;
        let proof = discrete_log_sign(&Y, &g, &x, b"binding");
        assert!(discrete_log_verify(&Y, &g, &proof, b"binding"));
        assert!(!discrete_log_verify(&Y, &g, &proof, b"other binding"));
        assert!(!discrete_log_verify(&g, &g, &proof, b"binding"));

        let bad = DiscreteLogProof {
            c: proof.c + Scalar::ONE,
            s: proof.s,
        };
        assert!(!discrete_log_verify(&Y, &g, &bad, b"binding"));
    }

    #[test]
    fn representation_round_trip() {
        // Y0 = g0*x0, Y1 = g0*x1 + g1*x2
        let g0 = random_g1();
        let g1 = random_g1();
        let x = [random_scalar(), random_scalar(), random_scalar()];
        let y = [
            Element::from(g0 * x[0]),
            Element::from(g0 * x[1] + g1 * x[2]),
        ];
        let g = [Element::from(g0), Element::from(g1)];
        let wiring = [(0, 0), (1, 0), (2, 1)];
        let prods = [1, 2];

        let proof = representation_sign(&y, &g, &x, &wiring, &prods, b"msg").unwrap();
        assert!(representation_verify(&y, &g, &wiring, &prods, &proof, b"msg").unwrap());
        assert!(!representation_verify(&y, &g, &wiring, &prods, &proof, b"msG").unwrap());

        let mut bad = proof.clone();
        bad.s[1] += Scalar::ONE;
        assert!(!representation_verify(&y, &g, &wiring, &prods, &bad, b"msg").unwrap());

        let mut short = proof;
        short.s.truncate(1);
        assert!(!representation_verify(&y, &g, &wiring, &prods, &short, b"msg").unwrap());
    }

    #[test]
    fn representation_spans_groups() {
        // Same witness under a G1 and a G2 base, as in enrollment proofs.
        let g0 = random_g1();
        let h0 = crate::utils::arith::random_g2();
        let x = [random_scalar()];
        let y = [Element::from(g0 * x[0]), Element::from(h0 * x[0])];
        let g = [Element::from(g0), Element::from(h0)];
        let wiring = [(0, 0), (0, 1)];
        let prods = [1, 1];

        let proof = representation_sign(&y, &g, &x, &wiring, &prods, b"x").unwrap();
        assert!(representation_verify(&y, &g, &wiring, &prods, &proof, b"x").unwrap());
    }

    #[test]
    fn representation_rejects_ill_formed_statements() {
        let g0 = random_g1();
        let x = [random_scalar()];
        let y = [Element::from(g0 * x[0])];
        let g = [Element::from(g0)];

        assert!(matches!(
            representation_sign(&[], &g, &x, &[(0, 0)], &[1], b""),
            Err(Error::Statement(_))
        ));
        assert!(matches!(
            representation_sign(&y, &g, &x, &[(0, 5)], &[1], b""),
            Err(Error::Statement(_))
        ));
        assert!(matches!(
            representation_sign(&y, &g, &x, &[(0, 0)], &[2], b""),
            Err(Error::Statement(_))
        ));
    }

    #[test]
    fn pairing_homomorphism_round_trip() {
        let g = random_g1();
        let xx = random_g2();
        let target = pair(&g, &xx);
        let proof = pairing_homomorphism_sign(&g, &target, &xx, b"sig bytes");
        assert!(pairing_homomorphism_verify(&g, &target, &proof, b"sig bytes"));
        assert!(!pairing_homomorphism_verify(&g, &target, &proof, b"other"));

        let forged = PairingHomomorphismProof {
            c: proof.c,
            s: random_g2(),
            tau: None,
        };
        assert!(!pairing_homomorphism_verify(&g, &target, &forged, b"sig bytes"));
    }

    #[test]
    fn dual_pairing_homomorphism_round_trip() {
        let g1 = random_g1();
        let g2 = random_g1();
        let xx = random_g2();
        let e1 = pair(&g1, &xx);
        let tau = pair(&g2, &xx);
        let proof = dual_pairing_homomorphism_sign(&xx, &g1, &g2, &e1, &tau, b"bound");
        assert!(dual_pairing_homomorphism_verify(&proof, &g1, &g2, &e1, b"bound"));
        assert!(!dual_pairing_homomorphism_verify(&proof, &g1, &g2, &e1, b"unbound"));

        let mut stripped = proof;
        stripped.tau = None;
        assert!(!dual_pairing_homomorphism_verify(&stripped, &g1, &g2, &e1, b"bound"));
    }

    #[test]
    fn proof_containers_round_trip() {
        let p = DiscreteLogProof {
            c: random_scalar(),
            s: random_scalar(),
        };
        assert_eq!(DiscreteLogProof::from_b64(&p.to_b64()).unwrap(), p);

        let p = GeneralRepresentationProof {
            c: random_scalar(),
            s: vec![random_scalar(), random_scalar()],
        };
        assert_eq!(GeneralRepresentationProof::from_b64(&p.to_b64()).unwrap(), p);

        let p = PairingHomomorphismProof {
            c: random_scalar(),
            s: random_g2(),
            tau: Some(pair(&random_g1(), &random_g2())),
        };
        assert_eq!(PairingHomomorphismProof::from_b64(&p.to_b64()).unwrap(), p);
    }
}
