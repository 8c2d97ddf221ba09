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

//! CPY06 traceable group signatures (Choi-Park-Yung). On top of
//! open, the manager can reveal a member's tracing trapdoor into the CRL so
//! that third parties can trace that member's signatures without learning
//! anything about other members; signers can claim their own signatures and
//! prove that several signatures share an (unopened) author.

/// Module for keys
pub mod keys;
/// Module for signatures
pub mod signature;

use log::debug;
use serde::{Deserialize, Serialize};

use bls12_381_plus::{G1Projective, G2Projective, Scalar};
use group::Curve;

use crate::errors::Error;
use crate::gml::{Ledger, MemberId};
use crate::registry::SchemeId;
use crate::scheme::{JoinState, Scheme, Verdict};
use crate::spk::{
    representation_sign, representation_verify, DiscreteLogProof, Element,
    GeneralRepresentationProof,
};
use crate::utils::arith::{invert, pair, random_g1, random_g2, random_scalar, Transcript};

pub use keys::{GmlEntry, GroupKey, ManagerKey, MemberKey};
pub use signature::Signature;

/// Witness wiring of the enrollment proof: pi = g1*x and
/// pi = g1*v + I*u + Q*rr, over witnesses (x, v, u, rr).
const JOIN_WIRING: [(usize, usize); 4] = [(0, 0), (1, 0), (2, 1), (3, 2)];
const JOIN_PRODS: [usize; 2] = [1, 3];

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum JoinMessage {
    /// Random exponents fixing the member secret as x = u*y + v.
    Challenge { u: Scalar, v: Scalar },
    /// Member commitment I, tracing trapdoor pi = g1*x, and the
    /// representation proof tying them together.
    Commitment {
        I: G1Projective,
        pi: G1Projective,
        proof: GeneralRepresentationProof,
    },
    /// Issued credential.
    Credential { t: Scalar, A: G1Projective },
}

pub struct Cpy06 {
    grpkey: Option<GroupKey>,
    mgrkey: Option<ManagerKey>,
    gml: Ledger<GmlEntry>,
    crl: Ledger<GmlEntry>,
}

impl Cpy06 {
    pub fn new() -> Self {
        Self {
            grpkey: None,
            mgrkey: None,
            gml: Ledger::gml(),
            crl: Ledger::crl(),
        }
    }

    pub fn from_group_key(grpkey: GroupKey) -> Self {
        Self {
            grpkey: Some(grpkey),
            mgrkey: None,
            gml: Ledger::gml(),
            crl: Ledger::crl(),
        }
    }

    pub fn gml(&self) -> &Ledger<GmlEntry> {
        &self.gml
    }

    pub fn crl(&self) -> &Ledger<GmlEntry> {
        &self.crl
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

    /// Recovers the signer's credential point and matches it against the
    /// GML. Anonymity is broken only toward the manager; no proof is
    /// emitted.
    pub fn open(&self, sig: &Signature) -> Result<Option<MemberId>, Error> {
        let mgrkey = self.mgr()?;
        // A = T3 - (T1*xi1 + T2*xi2)
        let A = sig.T3 - (sig.T1 * mgrkey.xi1 + sig.T2 * mgrkey.xi2);
        Ok(self
            .gml
            .iter()
            .find(|(_, entry)| entry.A == A)
            .map(|(id, _)| *id))
    }

    /// Publishes the member's tracing trapdoor into the CRL and returns it,
    /// enabling third-party [`Self::trace`] checks. Idempotent for an
    /// already revealed member.
    pub fn reveal(&mut self, id: &MemberId) -> Result<Option<G1Projective>, Error> {
        self.mgr()?;
        let entry = match self.gml.get(id) {
            Some(entry) => entry.clone(),
            None => return Ok(None),
        };
        if !self.crl.contains(id) {
            self.crl.append(*id, entry.clone())?;
        }
        Ok(Some(entry.pi))
    }

    /// Tests whether the signature was produced by any revealed member.
    /// Plain `verify` still accepts such signatures; tracing only tells
    /// CRL membership apart.
    pub fn trace(&self, sig: &Signature) -> Result<bool, Error> {
        self.grp()?;
        Ok(self
            .crl
            .iter()
            .any(|(_, entry)| pair(&entry.pi, &sig.T4) == sig.T5))
    }

    /// Proves that every signature in `sigs` was produced with this member
    /// key, without opening any of them. The proof only verifies if the
    /// claim is true.
    pub fn prove_equality(
        &self,
        sigs: &[&Signature],
        key: &MemberKey,
    ) -> Result<DiscreteLogProof, Error> {
        self.grp()?;
        key.state.require_done()?;
        if sigs.is_empty() {
            return Err(Error::Statement("no signatures to relate"));
        }
        let g1 = G1Projective::GENERATOR;

        let r = random_scalar();
        let mut t = Transcript::new();
        // The discrete log of T5 to the base e(g1, T4) is the member secret
        // x for every signature of that member; one challenge covers all of
        // them.
        for sig in sigs {
            let e = pair(&g1, &sig.T4);
            t.gt(&(e * r)).gt(&e).gt(&sig.T5);
        }
        let c = t.challenge();
        Ok(DiscreteLogProof { c, s: r + c * key.x })
    }

    pub fn prove_equality_verify(
        &self,
        sigs: &[&Signature],
        proof: &DiscreteLogProof,
    ) -> Result<Verdict, Error> {
        self.grp()?;
        if sigs.is_empty() {
            return Err(Error::Statement("no signatures to relate"));
        }
        let g1 = G1Projective::GENERATOR;

        let mut t = Transcript::new();
        for sig in sigs {
            let e = pair(&g1, &sig.T4);
            // e^s / T5^c recovers e^r iff T5 = e^x throughout
            let er = e * proof.s - sig.T5 * proof.c;
            t.gt(&er).gt(&e).gt(&sig.T5);
        }
        Ok(Verdict::from_bool(t.challenge() == proof.c))
    }

    /// Member-side authorship claim for a single signature.
    pub fn claim(&self, sig: &Signature, key: &MemberKey) -> Result<DiscreteLogProof, Error> {
        self.prove_equality(&[sig], key)
    }

    pub fn claim_verify(
        &self,
        sig: &Signature,
        proof: &DiscreteLogProof,
    ) -> Result<Verdict, Error> {
        self.prove_equality_verify(&[sig], proof)
    }
}

impl Default for Cpy06 {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheme for Cpy06 {
    const SCHEME: SchemeId = SchemeId::Cpy06;

    type GroupKey = GroupKey;
    type ManagerKey = ManagerKey;
    type MemberKey = MemberKey;
    type Signature = Signature;
    type JoinMessage = JoinMessage;

    fn join_seq() -> usize {
        3
    }

    fn setup(&mut self) -> Result<(), Error> {
        let g1 = G1Projective::GENERATOR;
        let g2 = G2Projective::GENERATOR;

        let xi1 = random_scalar();
        let xi2 = random_scalar();
        let gamma = random_scalar();

        let q = random_g1();
        let r = g2 * gamma;
        let w = random_g2();
        let z = random_g1();
        let x = z * invert(&xi1, "xi1")?;
        let y = z * invert(&xi2, "xi2")?;

        self.grpkey = Some(GroupKey {
            q,
            r,
            w,
            x,
            y,
            z,
            e1: pair(&g1, &w),
            e2: pair(&z, &g2),
            e3: pair(&z, &r),
            e4: pair(&g1, &g2),
            e5: pair(&q, &g2),
        });
        self.mgrkey = Some(ManagerKey { xi1, xi2, gamma });
        Ok(())
    }

    fn group_key(&self) -> Result<&GroupKey, Error> {
        self.grp()
    }

    fn manager_key(&self) -> Result<&ManagerKey, Error> {
        self.mgr()
    }

    fn join_mgr(&mut self, message: Option<&JoinMessage>) -> Result<JoinMessage, Error> {
        let grpkey = self.grp()?.clone();
        let mgrkey = self.mgr()?.clone();
        match message {
            None => Ok(JoinMessage::Challenge {
                u: random_scalar(),
                v: random_scalar(),
            }),
            Some(JoinMessage::Commitment { I, pi, proof }) => {
                let g1 = G1Projective::GENERATOR;
                let y = [Element::from(*pi), Element::from(*pi)];
                let g = [Element::from(g1), Element::from(*I), Element::from(grpkey.q)];
                let binding = pi.to_affine().to_compressed();
                if !representation_verify(&y, &g, &JOIN_WIRING, &JOIN_PRODS, proof, &binding)? {
                    debug!("cpy06 join: enrollment proof rejected");
                    return Err(Error::ProtocolState("enrollment proof rejected"));
                }

                let t = random_scalar();
                // A = (pi + Q) * (gamma + t)^-1
                let A = (pi + grpkey.q) * invert(&(mgrkey.gamma + t), "gamma + t")?;

                let mut h = Transcript::new();
                h.g1(&A).g1(pi);
                let id = MemberId::from_digest(h.digest());
                self.gml.append(id, GmlEntry { A, pi: *pi })?;

                Ok(JoinMessage::Credential { t, A })
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
        let g1 = G1Projective::GENERATOR;
        let g2 = G2Projective::GENERATOR;
        match (message, key.state) {
            (JoinMessage::Challenge { u, v }, JoinState::Start) => {
                // Commit to randomness: I = g1*y + Q*r
                let y_rand = random_scalar();
                let r_rand = random_scalar();
                let I = g1 * y_rand + grpkey.q * r_rand;

                // x = u*y + v: neither party picks the member secret alone
                key.x = u * y_rand + v;
                let pi = g1 * key.x;
                let rr = -(u * r_rand);

                let stmt_y = [Element::from(pi), Element::from(pi)];
                let stmt_g = [Element::from(g1), Element::from(I), Element::from(grpkey.q)];
                let witnesses = [key.x, *v, *u, rr];
                let binding = pi.to_affine().to_compressed();
                let proof = representation_sign(
                    &stmt_y,
                    &stmt_g,
                    &witnesses,
                    &JOIN_WIRING,
                    &JOIN_PRODS,
                    &binding,
                )?;

                key.state = JoinState::Round(2);
                Ok(Some(JoinMessage::Commitment { I, pi, proof }))
            }
            (JoinMessage::Credential { t, A }, JoinState::Round(2)) => {
                // e(A, g2*t + R) must equal e(g1*x + Q, g2)
                let lhs = pair(A, &(g2 * t + grpkey.r));
                let rhs = pair(&(g1 * key.x + grpkey.q), &g2);
                if lhs != rhs {
                    debug!("cpy06 join: issued credential does not verify");
                    return Err(Error::ProtocolState("issued credential does not verify"));
                }
                key.t = *t;
                key.A = *A;
                key.state = JoinState::Done;
                Ok(None)
            }
            _ => Err(Error::ProtocolState("join message out of sequence")),
        }
    }

    fn sign(&self, message: &[u8], key: &MemberKey) -> Result<Signature, Error> {
        let grpkey = self.grp()?;
        key.state.require_done()?;
        let g1 = G1Projective::GENERATOR;
        let g2 = G2Projective::GENERATOR;

        let r1 = random_scalar();
        let r2 = random_scalar();
        let r3 = random_scalar();
        let d1 = key.t * r1;
        let d2 = key.t * r2;

        let T1 = grpkey.x * r1;
        let T2 = grpkey.y * r2;
        let T3 = key.A + grpkey.z * (r1 + r2);
        let T4 = grpkey.w * r3;
        // T5 = e(g1, T4)^x = e(g1, W)^(r3*x)
        let T5 = grpkey.e1 * (r3 * key.x);

        let br1 = random_scalar();
        let br2 = random_scalar();
        let bd1 = random_scalar();
        let bd2 = random_scalar();
        let bt = random_scalar();
        let bx = random_scalar();

        let B1 = grpkey.x * br1;
        let B2 = grpkey.y * br2;
        let B3 = T1 * bt - grpkey.x * bd1;
        let B4 = T2 * bt - grpkey.y * bd2;
        let B5 = pair(&g1, &T4) * bx;
        // B6 = e(T3,g2)^bt * e(z,g2)^(-bd1-bd2) * e(z,R)^(-br1-br2)
        //      * e(g1,g2)^(-bx)
        let B6 = pair(&T3, &g2) * bt
            + grpkey.e2 * (-bd1 - bd2)
            + grpkey.e3 * (-br1 - br2)
            + grpkey.e4 * (-bx);

        let mut t = Transcript::new();
        t.bytes(message)
            .g1(&T1)
            .g1(&T2)
            .g1(&T3)
            .g2(&T4)
            .gt(&T5)
            .g1(&B1)
            .g1(&B2)
            .g1(&B3)
            .g1(&B4)
            .gt(&B5)
            .gt(&B6);
        let c = t.challenge();

        Ok(Signature {
            T1,
            T2,
            T3,
            T4,
            T5,
            c,
            sr1: br1 + c * r1,
            sr2: br2 + c * r2,
            sd1: bd1 + c * d1,
            sd2: bd2 + c * d2,
            sx: bx + c * key.x,
            st: bt + c * key.t,
        })
    }

    fn verify(&self, message: &[u8], sig: &Signature) -> Result<Verdict, Error> {
        let grpkey = self.grp()?;
        let g1 = G1Projective::GENERATOR;
        let g2 = G2Projective::GENERATOR;

        let B1 = grpkey.x * sig.sr1 - sig.T1 * sig.c;
        let B2 = grpkey.y * sig.sr2 - sig.T2 * sig.c;
        let B3 = sig.T1 * sig.st - grpkey.x * sig.sd1;
        let B4 = sig.T2 * sig.st - grpkey.y * sig.sd2;
        let B5 = pair(&g1, &sig.T4) * sig.sx - sig.T5 * sig.c;
        // B6 = e(T3,g2)^st * e(z,g2)^(-sd1-sd2) * e(z,R)^(-sr1-sr2)
        //      * e(g1,g2)^(-sx) * (e(T3,R)/e(Q,g2))^c
        let B6 = pair(&sig.T3, &g2) * sig.st
            + grpkey.e2 * (-sig.sd1 - sig.sd2)
            + grpkey.e3 * (-sig.sr1 - sig.sr2)
            + grpkey.e4 * (-sig.sx)
            + (pair(&sig.T3, &grpkey.r) - grpkey.e5) * sig.c;

        let mut t = Transcript::new();
        t.bytes(message)
            .g1(&sig.T1)
            .g1(&sig.T2)
            .g1(&sig.T3)
            .g2(&sig.T4)
            .gt(&sig.T5)
            .g1(&B1)
            .g1(&B2)
            .g1(&B3)
            .g1(&B4)
            .gt(&B5)
            .gt(&B6);

        if t.challenge() != sig.c {
            debug!("cpy06 verify: challenge mismatch");
            return Ok(Verdict::Invalid);
        }
        Ok(Verdict::Valid)
    }
}
