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

//! KLAP20 group signatures with split authorities: the issuer holds (x, y),
//! the opener holds (z0, z1). Enrollment escrows gg^alpha twice under the
//! opener's public shares; opening decrypts one escrow, matches it against
//! the GML and proves the match, so verifiers need not trust the opener
//! blindly.

/// Module for keys
pub mod keys;
/// Module for signatures
pub mod signature;

use log::debug;
use serde::{Deserialize, Serialize};

use bls12_381_plus::{G1Projective, G2Projective};
use group::Curve;

use crate::container::Container;
use crate::errors::Error;
use crate::gml::{Ledger, MemberId};
use crate::registry::SchemeId;
use crate::scheme::{JoinState, Scheme, Verdict};
use crate::spk::{
    self, discrete_log_sign, discrete_log_verify, representation_sign, representation_verify,
    Element, GeneralRepresentationProof, PairingHomomorphismProof,
};
use crate::utils::arith::{hash_to_g1, pair, random_g1, random_g2, random_scalar, Transcript};

pub use keys::{GmlEntry, GroupKey, ManagerKey, MemberKey};
pub use signature::Signature;

/// Enrollment statement wiring over witnesses (alpha, s0, s1):
/// f = g*alpha, w = u*alpha, SS0 = gg*s0, SS1 = gg*s1,
/// ff0 = gg*alpha + ZZ0*s0, ff1 = gg*alpha + ZZ1*s1.
const JOIN_WIRING: [(usize, usize); 8] = [
    (0, 0),
    (0, 1),
    (1, 2),
    (2, 2),
    (0, 2),
    (1, 3),
    (0, 2),
    (2, 4),
];
const JOIN_PRODS: [usize; 6] = [1, 1, 1, 1, 2, 2];

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum JoinMessage {
    Challenge {
        n: G1Projective,
    },
    /// Member commitments plus the enrollment proof over them.
    Commitment {
        n: G1Projective,
        f: G1Projective,
        w: G1Projective,
        SS0: G2Projective,
        SS1: G2Projective,
        ff0: G2Projective,
        ff1: G2Projective,
        proof: GeneralRepresentationProof,
    },
    /// Issued credential.
    Credential { v: G1Projective },
}

pub struct Klap20 {
    grpkey: Option<GroupKey>,
    mgrkey: Option<ManagerKey>,
    gml: Ledger<GmlEntry>,
}

impl Klap20 {
    pub fn new() -> Self {
        Self {
            grpkey: None,
            mgrkey: None,
            gml: Ledger::gml(),
        }
    }

    pub fn from_group_key(grpkey: GroupKey) -> Self {
        Self {
            grpkey: Some(grpkey),
            mgrkey: None,
            gml: Ledger::gml(),
        }
    }

    pub fn gml(&self) -> &Ledger<GmlEntry> {
        &self.gml
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

    /// Decrypts the enrollment escrow with the opener share z0, locates the
    /// signer in the GML and emits a proof of correct opening bound to the
    /// signature bytes.
    pub fn open(
        &self,
        sig: &Signature,
    ) -> Result<Option<(MemberId, PairingHomomorphismProof)>, Error> {
        let grpkey = self.grp()?;
        let mgrkey = self.mgr()?;
        // ww = uu*alpha, so the decrypted gg^alpha must satisfy
        // e(uu, ff) == e(ww, gg)
        let target = pair(&sig.ww, &grpkey.gg);
        for (id, entry) in self.gml.iter() {
            let ff = entry.ff0 - entry.SS0 * mgrkey.z0;
            if pair(&sig.uu, &ff) == target {
                let proof = spk::dual_pairing_homomorphism_sign(
                    &ff,
                    &sig.uu,
                    &grpkey.g,
                    &target,
                    &entry.tau,
                    &sig.to_bytes(),
                );
                return Ok(Some((*id, proof)));
            }
        }
        Ok(None)
    }

    /// Verifies an opening proof: the opened escrow satisfies both
    /// e(uu, ff) == e(ww, gg) and e(g, ff) == tau for the tau named in the
    /// proof, without access to the GML or the opener key.
    pub fn open_verify(
        &self,
        sig: &Signature,
        proof: &PairingHomomorphismProof,
    ) -> Result<Verdict, Error> {
        let grpkey = self.grp()?;
        let target = pair(&sig.ww, &grpkey.gg);
        Ok(Verdict::from_bool(spk::dual_pairing_homomorphism_verify(
            proof,
            &sig.uu,
            &grpkey.g,
            &target,
            &sig.to_bytes(),
        )))
    }
}

impl Default for Klap20 {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheme for Klap20 {
    const SCHEME: SchemeId = SchemeId::Klap20;

    type GroupKey = GroupKey;
    type ManagerKey = ManagerKey;
    type MemberKey = MemberKey;
    type Signature = Signature;
    type JoinMessage = JoinMessage;

    fn join_seq() -> usize {
        3
    }

    fn setup(&mut self) -> Result<(), Error> {
        let x = random_scalar();
        let y = random_scalar();
        let z0 = random_scalar();
        let z1 = random_scalar();

        let g = random_g1();
        let gg = random_g2();

        self.grpkey = Some(GroupKey {
            g,
            gg,
            XX: gg * x,
            YY: gg * y,
            ZZ0: gg * z0,
            ZZ1: gg * z1,
        });
        self.mgrkey = Some(ManagerKey { x, y, z0, z1 });
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
            None => Ok(JoinMessage::Challenge { n: random_g1() }),
            Some(JoinMessage::Commitment {
                n,
                f,
                w,
                SS0,
                SS1,
                ff0,
                ff1,
                proof,
            }) => {
                let u = hash_to_g1(&f.to_affine().to_compressed());

                let y = [
                    Element::from(*f),
                    Element::from(*w),
                    Element::from(*SS0),
                    Element::from(*SS1),
                    Element::from(*ff0),
                    Element::from(*ff1),
                ];
                let g = [
                    Element::from(grpkey.g),
                    Element::from(u),
                    Element::from(grpkey.gg),
                    Element::from(grpkey.ZZ0),
                    Element::from(grpkey.ZZ1),
                ];
                let binding = n.to_affine().to_compressed();
                if !representation_verify(&y, &g, &JOIN_WIRING, &JOIN_PRODS, proof, &binding)? {
                    debug!("klap20 join: enrollment proof rejected");
                    return Err(Error::ProtocolState("enrollment proof rejected"));
                }

                // v = u*x + w*y
                let v = u * mgrkey.x + w * mgrkey.y;

                let tau = pair(f, &grpkey.gg);
                let mut t = Transcript::new();
                t.g2(SS0).g2(SS1).g2(ff0).g2(ff1).gt(&tau);
                let id = MemberId::from_digest(t.digest());
                self.gml.append(
                    id,
                    GmlEntry {
                        SS0: *SS0,
                        SS1: *SS1,
                        ff0: *ff0,
                        ff1: *ff1,
                        tau,
                    },
                )?;

                Ok(JoinMessage::Credential { v })
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
                key.alpha = random_scalar();
                let s0 = random_scalar();
                let s1 = random_scalar();

                let f = grpkey.g * key.alpha;
                key.u = hash_to_g1(&f.to_affine().to_compressed());
                key.w = key.u * key.alpha;

                let SS0 = grpkey.gg * s0;
                let SS1 = grpkey.gg * s1;
                let gg_alpha = grpkey.gg * key.alpha;
                let ff0 = gg_alpha + grpkey.ZZ0 * s0;
                let ff1 = gg_alpha + grpkey.ZZ1 * s1;

                let y = [
                    Element::from(f),
                    Element::from(key.w),
                    Element::from(SS0),
                    Element::from(SS1),
                    Element::from(ff0),
                    Element::from(ff1),
                ];
                let g = [
                    Element::from(grpkey.g),
                    Element::from(key.u),
                    Element::from(grpkey.gg),
                    Element::from(grpkey.ZZ0),
                    Element::from(grpkey.ZZ1),
                ];
                let witnesses = [key.alpha, s0, s1];
                let binding = n.to_affine().to_compressed();
                let proof = representation_sign(
                    &y,
                    &g,
                    &witnesses,
                    &JOIN_WIRING,
                    &JOIN_PRODS,
                    &binding,
                )?;

                key.state = JoinState::Round(2);
                Ok(Some(JoinMessage::Commitment {
                    n: *n,
                    f,
                    w: key.w,
                    SS0,
                    SS1,
                    ff0,
                    ff1,
                    proof,
                }))
            }
            (JoinMessage::Credential { v }, JoinState::Round(2)) => {
                // e(v, gg) must equal e(u, XX) * e(w, YY)
                let expected = pair(&key.u, &grpkey.XX) + pair(&key.w, &grpkey.YY);
                if pair(v, &grpkey.gg) != expected {
                    debug!("klap20 join: issued credential does not verify");
                    return Err(Error::ProtocolState("issued credential does not verify"));
                }
                key.v = *v;
                key.state = JoinState::Done;
                Ok(None)
            }
            _ => Err(Error::ProtocolState("join message out of sequence")),
        }
    }

    fn sign(&self, message: &[u8], key: &MemberKey) -> Result<Signature, Error> {
        self.grp()?;
        key.state.require_done()?;

        // Randomize the credential triple
        let r = random_scalar();
        let uu = key.u * r;
        let vv = key.v * r;
        let ww = key.w * r;

        let pi = discrete_log_sign(&ww, &uu, &key.alpha, message);
        Ok(Signature { uu, vv, ww, pi })
    }

    fn verify(&self, message: &[u8], sig: &Signature) -> Result<Verdict, Error> {
        let grpkey = self.grp()?;

        if !discrete_log_verify(&sig.ww, &sig.uu, &sig.pi, message) {
            debug!("klap20 verify: proof of alpha rejected");
            return Ok(Verdict::Invalid);
        }
        // e(vv, gg) must equal e(uu, XX) * e(ww, YY)
        let expected = pair(&sig.uu, &grpkey.XX) + pair(&sig.ww, &grpkey.YY);
        if pair(&sig.vv, &grpkey.gg) != expected {
            debug!("klap20 verify: credential equation failed");
            return Ok(Verdict::Invalid);
        }
        Ok(Verdict::Valid)
    }
}
