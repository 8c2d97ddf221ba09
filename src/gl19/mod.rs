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

//! GL19 convertibly-blind group signatures (Garms-Lehmann). Signatures
//! encrypt the signer pseudonym under the converter key; a requester can
//! re-blind them toward an ephemeral key, have the converter re-encrypt a
//! batch, and unblind the result to compare pseudonyms without ever
//! learning member identities. Credentials expire after the issuer
//! lifetime.

/// Module for keys
pub mod keys;
/// Module for signatures
pub mod signature;

use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};

use bls12_381_plus::{G1Projective, Scalar};
use group::Curve;
use group::Group;

use crate::errors::Error;
use crate::registry::SchemeId;
use crate::scheme::{JoinState, Scheme, Verdict};
use crate::spk::{
    discrete_log_sign, discrete_log_verify, representation_sign, representation_verify,
    DiscreteLogProof, Element,
};
use crate::utils::arith::{
    hash_to_g1, hash_to_scalar, invert, pair, random_g1, random_g2, random_scalar, unix_now,
};

pub use keys::{BlindKey, GroupKey, ManagerKey, MemberKey};
pub use signature::{BlindSignature, Signature};

/// Default credential lifetime: two weeks.
pub const DEFAULT_LIFETIME: i64 = 60 * 60 * 24 * 14;

/// Credential statement wiring over witnesses
/// (-x, y, r2, r3, -ss, alpha, -y, alpha2): nym1 = g*alpha,
/// nym2 = cpk*alpha + h*y, A_ - d = AA*(-x) + h2*r2,
/// g1 + h3*d = d*r3 + h2*(-ss) + h1*(-y), ehy1 = g*alpha2,
/// ehy2 = epk*alpha2 + h*y.
const SIGN_WIRING: [(usize, usize); 11] = [
    (5, 0),
    (5, 1),
    (1, 2),
    (0, 3),
    (2, 4),
    (3, 5),
    (4, 4),
    (6, 6),
    (7, 0),
    (7, 7),
    (1, 2),
];
const SIGN_PRODS: [usize; 6] = [1, 2, 2, 3, 1, 2];

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum JoinMessage {
    Challenge {
        n: G1Projective,
    },
    /// Member public key H = h1*y with the proof of knowledge of y.
    Commitment {
        n: G1Projective,
        H: G1Projective,
        pi: DiscreteLogProof,
    },
    /// Issued credential with its expiration bound.
    Credential {
        A: G1Projective,
        x: Scalar,
        s: Scalar,
        expiration: i64,
    },
}

pub struct Gl19 {
    grpkey: Option<GroupKey>,
    mgrkey: Option<ManagerKey>,
    lifetime: i64,
}

fn expiration_scalar(expiration: i64) -> Scalar {
    hash_to_scalar(expiration.to_string().as_bytes())
}

fn spk_binding(expiration: i64, message: &[u8]) -> Vec<u8> {
    let mut binding = expiration.to_string().into_bytes();
    binding.push(b'|');
    binding.extend_from_slice(message);
    binding
}

impl Gl19 {
    pub fn new() -> Self {
        Self {
            grpkey: None,
            mgrkey: None,
            lifetime: DEFAULT_LIFETIME,
        }
    }

    pub fn from_group_key(grpkey: GroupKey) -> Self {
        Self {
            grpkey: Some(grpkey),
            mgrkey: None,
            lifetime: DEFAULT_LIFETIME,
        }
    }

    /// Overrides the credential lifetime used for newly issued members.
    pub fn set_lifetime(&mut self, lifetime: i64) {
        self.lifetime = lifetime;
    }

    fn grp(&self) -> Result<&GroupKey, Error> {
        self.grpkey
            .as_ref()
            .ok_or(Error::ProtocolState("setup has not run"))
    }

    fn mgr(&self) -> Result<&ManagerKey, Error> {
        self.mgrkey
            .as_ref()
            .ok_or(Error::ProtocolState("manager key not available"))
    }

    /// Re-encrypts a signature's pseudonym toward `blind_key` (an ephemeral
    /// key is generated when none is supplied) and encrypts the message
    /// digest alongside it.
    pub fn blind(
        &self,
        message: &[u8],
        sig: &Signature,
        blind_key: Option<&BlindKey>,
    ) -> Result<(BlindSignature, BlindKey), Error> {
        let grpkey = self.grp()?;
        let bkey = match blind_key {
            Some(k) => k.clone(),
            None => BlindKey::from_random(grpkey),
        };

        let alpha = random_scalar();
        let beta = random_scalar();
        let gamma = random_scalar();

        // Re-randomize the converter-key layer, add a blind-key layer.
        let bsig = BlindSignature {
            nym1: sig.nym1 + grpkey.g * beta,
            nym2: grpkey.g * alpha,
            nym3: sig.nym2 + grpkey.cpk * beta + bkey.pk * alpha,
            c1: grpkey.g * gamma,
            c2: hash_to_g1(message) + bkey.pk * gamma,
        };
        Ok((bsig, bkey))
    }

    /// Converter-side batch re-encryption toward a requester's blind key.
    /// All pseudonyms are raised to one shared exponent, so equal signers
    /// stay equal after conversion while absolute identities are destroyed;
    /// the batch is returned in shuffled order.
    pub fn convert(
        &self,
        blind_sigs: &[BlindSignature],
        blind_pk: &G1Projective,
    ) -> Result<Vec<BlindSignature>, Error> {
        let grpkey = self.grp()?;
        let csk = self.mgr()?.csk;

        let r = random_scalar();
        let mut converted: Vec<BlindSignature> = blind_sigs
            .iter()
            .map(|bsig| {
                let r1 = random_scalar();
                let r2 = random_scalar();
                // Strip the converter layer, raise to r
                let cnym1 = bsig.nym2 * r;
                let cnym2 = (bsig.nym1 * (-csk) + bsig.nym3) * r;
                BlindSignature {
                    nym1: cnym1 + grpkey.g * r1,
                    nym2: cnym2 + blind_pk * r1,
                    nym3: G1Projective::identity(),
                    c1: bsig.c1 + grpkey.g * r2,
                    c2: bsig.c2 + blind_pk * r2,
                }
            })
            .collect();

        // Fisher-Yates so output order leaks nothing about input order
        let mut rng = rand::thread_rng();
        for i in (1..converted.len()).rev() {
            let j = rng.gen_range(0..=i);
            converted.swap(i, j);
        }
        Ok(converted)
    }

    /// Strips the blind layer from a converted signature, recovering the
    /// converted pseudonym: equal outputs mean equal signers.
    pub fn unblind(
        &self,
        converted: &BlindSignature,
        blind_key: &BlindKey,
    ) -> Result<G1Projective, Error> {
        self.grp()?;
        Ok(converted.nym1 * (-blind_key.sk) + converted.nym2)
    }
}

impl Default for Gl19 {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheme for Gl19 {
    const SCHEME: SchemeId = SchemeId::Gl19;

    type GroupKey = GroupKey;
    type ManagerKey = ManagerKey;
    type MemberKey = MemberKey;
    type Signature = Signature;
    type JoinMessage = JoinMessage;

    fn join_seq() -> usize {
        3
    }

    fn setup(&mut self) -> Result<(), Error> {
        let isk = random_scalar();
        let csk = random_scalar();
        let esk = random_scalar();

        let g1 = random_g1();
        let g = random_g1();
        let h = random_g1();
        let h1 = random_g1();
        let h2 = random_g1();
        let h3 = random_g1();
        let g2 = random_g2();

        self.grpkey = Some(GroupKey {
            g1,
            g2,
            g,
            h,
            h1,
            h2,
            h3,
            ipk: g2 * isk,
            cpk: g * csk,
            epk: g * esk,
        });
        self.mgrkey = Some(ManagerKey { isk, csk, esk });
        Ok(())
    }

    fn group_key(&self) -> Result<&GroupKey, Error> {
        self.grp()
    }

    fn manager_key(&self) -> Result<&ManagerKey, Error> {
        self.mgr()
    }

    fn join_mgr(&mut self, message: Option<&JoinMessage>) -> Result<JoinMessage, Error> {
        let grpkey = self.grp()?;
        match message {
            None => Ok(JoinMessage::Challenge { n: random_g1() }),
            Some(JoinMessage::Commitment { n, H, pi }) => {
                let binding = n.to_affine().to_compressed();
                if !discrete_log_verify(H, &grpkey.h1, pi, &binding) {
                    debug!("gl19 join: enrollment proof rejected");
                    return Err(Error::ProtocolState("enrollment proof rejected"));
                }

                let isk = self.mgr()?.isk;
                let x = random_scalar();
                let s = random_scalar();

                let expiration = unix_now() + self.lifetime;
                let d = expiration_scalar(expiration);

                // A = (H + h2*s + h3*d + g1) * (isk + x)^-1
                let A = (H + grpkey.h2 * s + grpkey.h3 * d + grpkey.g1)
                    * invert(&(isk + x), "isk + x")?;

                Ok(JoinMessage::Credential {
                    A,
                    x,
                    s,
                    expiration,
                })
            }
            Some(_) => Err(Error::ProtocolState("unexpected member message")),
        }
    }

    fn join_mem(
        &self,
        message: &JoinMessage,
        key: &mut MemberKey,
    ) -> Result<Option<JoinMessage>, Error> {
        let grpkey = self.grp()?;
        match (message, key.state) {
            (JoinMessage::Challenge { n }, JoinState::Start) => {
                key.y = random_scalar();
                key.H = grpkey.h1 * key.y;

                let binding = n.to_affine().to_compressed();
                let pi = discrete_log_sign(&key.H, &grpkey.h1, &key.y, &binding);

                key.state = JoinState::Round(2);
                Ok(Some(JoinMessage::Commitment {
                    n: *n,
                    H: key.H,
                    pi,
                }))
            }
            (
                JoinMessage::Credential {
                    A,
                    x,
                    s,
                    expiration,
                },
                JoinState::Round(2),
            ) => {
                let mut candidate = key.clone();
                candidate.A = *A;
                candidate.x = *x;
                candidate.s = *s;
                candidate.expiration = *expiration;
                candidate.d = expiration_scalar(*expiration);
                candidate.h2s = grpkey.h2 * s;
                candidate.h3d = grpkey.h3 * candidate.d;

                if bool::from(candidate.A.is_identity()) {
                    debug!("gl19 join: credential point is the identity");
                    return Err(Error::ProtocolState("issued credential does not verify"));
                }
                // e(A, g2)^x * e(A, ipk) == e(H + h2s + h3d + g1, g2)
                let lhs = pair(&candidate.A, &grpkey.g2) * candidate.x
                    + pair(&candidate.A, &grpkey.ipk);
                let aux = candidate.H + candidate.h2s + candidate.h3d + grpkey.g1;
                if lhs != pair(&aux, &grpkey.g2) {
                    debug!("gl19 join: issued credential does not verify");
                    return Err(Error::ProtocolState("issued credential does not verify"));
                }

                candidate.state = JoinState::Done;
                *key = candidate;
                Ok(None)
            }
            _ => Err(Error::ProtocolState("join message out of sequence")),
        }
    }

    fn sign(&self, message: &[u8], key: &MemberKey) -> Result<Signature, Error> {
        let grpkey = self.grp()?;
        key.state.require_done()?;

        let alpha = random_scalar();
        let r1 = random_scalar();
        let r2 = random_scalar();

        // Pseudonym encryption under the converter key
        let nym1 = grpkey.g * alpha;
        let nym2 = grpkey.cpk * alpha + grpkey.h * key.y;

        // Second encryption of h*y under the extractor key
        let alpha2 = random_scalar();
        let ehy1 = grpkey.g * alpha2;
        let ehy2 = grpkey.epk * alpha2 + grpkey.h * key.y;

        let AA = key.A * r1;
        // aux = (g1 + h1*y + h2*s + h3*d) * r1
        let aux = (grpkey.g1 + key.H + key.h2s + key.h3d) * r1;
        let A_ = AA * (-key.x) + aux;
        let d = aux + grpkey.h2 * (-r2);

        let r3 = invert(&r1, "r1")?;
        let ss = key.s - r2 * r3;

        let g1h3d = grpkey.g1 + key.h3d;

        let y = [
            Element::from(nym1),
            Element::from(nym2),
            Element::from(A_ - d),
            Element::from(g1h3d),
            Element::from(ehy1),
            Element::from(ehy2),
        ];
        let g = [
            Element::from(grpkey.g),
            Element::from(grpkey.cpk),
            Element::from(grpkey.h),
            Element::from(AA),
            Element::from(grpkey.h2),
            Element::from(d),
            Element::from(grpkey.h1),
            Element::from(grpkey.epk),
        ];
        let witnesses = [
            -key.x,
            key.y,
            r2,
            r3,
            -ss,
            alpha,
            -key.y,
            alpha2,
        ];

        let binding = spk_binding(key.expiration, message);
        let pi = representation_sign(&y, &g, &witnesses, &SIGN_WIRING, &SIGN_PRODS, &binding)?;

        Ok(Signature {
            AA,
            A_,
            d,
            nym1,
            nym2,
            ehy1,
            ehy2,
            expiration: key.expiration,
            pi,
        })
    }

    fn verify(&self, message: &[u8], sig: &Signature) -> Result<Verdict, Error> {
        let grpkey = self.grp()?;

        // Stale credentials no longer verify
        if sig.expiration < unix_now() {
            debug!("gl19 verify: credential expired");
            return Ok(Verdict::Invalid);
        }

        let d_scalar = expiration_scalar(sig.expiration);
        let g1h3d = grpkey.h3 * d_scalar + grpkey.g1;

        let y = [
            Element::from(sig.nym1),
            Element::from(sig.nym2),
            Element::from(sig.A_ - sig.d),
            Element::from(g1h3d),
            Element::from(sig.ehy1),
            Element::from(sig.ehy2),
        ];
        let g = [
            Element::from(grpkey.g),
            Element::from(grpkey.cpk),
            Element::from(grpkey.h),
            Element::from(sig.AA),
            Element::from(grpkey.h2),
            Element::from(sig.d),
            Element::from(grpkey.h1),
            Element::from(grpkey.epk),
        ];

        let binding = spk_binding(sig.expiration, message);
        match representation_verify(&y, &g, &SIGN_WIRING, &SIGN_PRODS, &sig.pi, &binding) {
            Ok(true) => Ok(Verdict::Valid),
            Ok(false) => {
                debug!("gl19 verify: representation proof rejected");
                Ok(Verdict::Invalid)
            }
            Err(e) => Err(e),
        }
    }
}
