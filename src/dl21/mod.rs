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

//! DL21 linkable group signatures (Diaz-Lehmann). Signatures carry a
//! per-scope pseudonym nym = HashToPoint(scope) * y, so one member's
//! signatures are linkable within a scope and unlinkable across scopes.
//! There is no opening authority: members identify their own signatures
//! locally and can prove that a set of signatures shares one signer.

/// Module for keys
pub mod keys;
/// Module for signatures
pub mod signature;

use log::debug;
use serde::{Deserialize, Serialize};

use bls12_381_plus::{G1Projective, Scalar};
use group::Curve;
use group::Group;

use crate::errors::Error;
use crate::registry::SchemeId;
use crate::scheme::{JoinState, Scheme, Verdict};
use crate::spk::{
    discrete_log_sign, discrete_log_verify, representation_sign, representation_verify,
    DiscreteLogProof, Element, GeneralRepresentationProof,
};
use crate::utils::arith::{hash_to_g1, invert, pair, random_g1, random_g2, random_scalar};

pub use keys::{GroupKey, ManagerKey, MemberKey};
pub use signature::Signature;

/// Scope applied by the plain [`Scheme::sign`]/[`Scheme::verify`] entry
/// points.
pub const DEFAULT_SCOPE: &[u8] = b"def";

/// Credential statement wiring over witnesses
/// (-x, y, r2, r3, -ss, -y): nym = hscp*y,
/// A_ - d = AA*(-x) + h2*r2, g1 = d*r3 + h2*(-ss) + h1*(-y).
const SIGN_WIRING: [(usize, usize); 6] = [(1, 0), (0, 1), (2, 2), (3, 3), (4, 2), (5, 4)];
const SIGN_PRODS: [usize; 3] = [1, 2, 3];

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
    /// Issued credential.
    Credential {
        A: G1Projective,
        x: Scalar,
        s: Scalar,
    },
}

pub struct Dl21 {
    grpkey: Option<GroupKey>,
    mgrkey: Option<ManagerKey>,
}

impl Dl21 {
    pub fn new() -> Self {
        Self {
            grpkey: None,
            mgrkey: None,
        }
    }

    pub fn from_group_key(grpkey: GroupKey) -> Self {
        Self {
            grpkey: Some(grpkey),
            mgrkey: None,
        }
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

    pub fn sign_scoped(
        &self,
        message: &[u8],
        key: &MemberKey,
        scope: &[u8],
    ) -> Result<Signature, Error> {
        let grpkey = self.grp()?;
        key.state.require_done()?;
        sign_core(grpkey, key, message, scope)
    }

    pub fn verify_scoped(
        &self,
        message: &[u8],
        sig: &Signature,
        scope: &[u8],
    ) -> Result<Verdict, Error> {
        let grpkey = self.grp()?;
        Ok(verify_core(
            grpkey, &sig.AA, &sig.A_, &sig.d, &sig.nym, &sig.pi, message, scope,
        ))
    }

    /// O(1) self-test: true iff `sig` was produced with `key` under
    /// `scope`. Needs no manager and reveals nothing to third parties.
    pub fn identify(&self, sig: &Signature, key: &MemberKey, scope: &[u8]) -> Result<bool, Error> {
        self.grp()?;
        key.state.require_done()?;
        Ok(hash_to_g1(scope) * key.y == sig.nym)
    }

    /// Proves that every supplied signature shares this member key's
    /// signer, bound to a fresh `message`. Returns `None` when the
    /// signatures do not all belong to `key` under `scope`.
    pub fn link(
        &self,
        message: &[u8],
        scope: &[u8],
        items: &[(&[u8], &Signature)],
        key: &MemberKey,
    ) -> Result<Option<DiscreteLogProof>, Error> {
        self.grp()?;
        key.state.require_done()?;
        if items.is_empty() {
            return Err(Error::Statement("no signatures to link"));
        }

        let hscp = hash_to_g1(scope);
        let mut nym_sum = G1Projective::identity();
        let mut base_sum = G1Projective::identity();
        for (msg, sig) in items {
            if !self.verify_scoped(msg, sig, scope)?.is_valid()
                || !self.identify(sig, key, scope)?
            {
                debug!("dl21 link: supplied signature not ours");
                return Ok(None);
            }
            nym_sum += sig.nym;
            base_sum += hscp;
        }

        // All nyms share the discrete log y over the summed bases.
        Ok(Some(discrete_log_sign(&nym_sum, &base_sum, &key.y, message)))
    }

    pub fn link_verify(
        &self,
        message: &[u8],
        scope: &[u8],
        items: &[(&[u8], &Signature)],
        proof: &DiscreteLogProof,
    ) -> Result<Verdict, Error> {
        self.grp()?;
        if items.is_empty() {
            return Err(Error::Statement("no signatures to link"));
        }

        let hscp = hash_to_g1(scope);
        let mut nym_sum = G1Projective::identity();
        let mut base_sum = G1Projective::identity();
        for (msg, sig) in items {
            if !self.verify_scoped(msg, sig, scope)?.is_valid() {
                return Ok(Verdict::Invalid);
            }
            nym_sum += sig.nym;
            base_sum += hscp;
        }

        Ok(Verdict::from_bool(discrete_log_verify(
            &nym_sum, &base_sum, proof, message,
        )))
    }
}

impl Default for Dl21 {
    fn default() -> Self {
        Self::new()
    }
}

/// Produces the credential commitments, scope pseudonym and SPK shared by
/// DL21 and DL21SEQ.
pub(crate) fn sign_core(
    grpkey: &GroupKey,
    key: &MemberKey,
    message: &[u8],
    scope: &[u8],
) -> Result<Signature, Error> {
    let r1 = random_scalar();
    let r2 = random_scalar();

    let hscp = hash_to_g1(scope);
    let nym = hscp * key.y;

    let AA = key.A * r1;
    // aux = (g1 + h1*y + h2*s) * r1
    let aux = (grpkey.g1 + key.H + key.h2s) * r1;
    let A_ = AA * (-key.x) + aux;
    let d = aux + grpkey.h2 * (-r2);

    let r3 = invert(&r1, "r1")?;
    let ss = key.s - r2 * r3;

    let y = [
        Element::from(nym),
        Element::from(A_ - d),
        Element::from(grpkey.g1),
    ];
    let g = [
        Element::from(hscp),
        Element::from(AA),
        Element::from(grpkey.h2),
        Element::from(d),
        Element::from(grpkey.h1),
    ];
    let witnesses = [-key.x, key.y, r2, r3, -ss, -key.y];
    let pi = representation_sign(&y, &g, &witnesses, &SIGN_WIRING, &SIGN_PRODS, message)?;

    Ok(Signature { AA, A_, d, nym, pi })
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn verify_core(
    grpkey: &GroupKey,
    AA: &G1Projective,
    A_: &G1Projective,
    d: &G1Projective,
    nym: &G1Projective,
    pi: &GeneralRepresentationProof,
    message: &[u8],
    scope: &[u8],
) -> Verdict {
    if bool::from(AA.is_identity()) {
        debug!("dl21 verify: AA is the identity");
        return Verdict::Invalid;
    }
    // e(AA, ipk) must equal e(A_, g2)
    if pair(AA, &grpkey.ipk) != pair(A_, &grpkey.g2) {
        debug!("dl21 verify: credential equation failed");
        return Verdict::Invalid;
    }

    let hscp = hash_to_g1(scope);
    let y = [
        Element::from(*nym),
        Element::from(A_ - d),
        Element::from(grpkey.g1),
    ];
    let g = [
        Element::from(hscp),
        Element::from(*AA),
        Element::from(grpkey.h2),
        Element::from(*d),
        Element::from(grpkey.h1),
    ];
    match representation_verify(&y, &g, &SIGN_WIRING, &SIGN_PRODS, pi, message) {
        Ok(true) => Verdict::Valid,
        Ok(false) => {
            debug!("dl21 verify: representation proof rejected");
            Verdict::Invalid
        }
        Err(_) => Verdict::Invalid,
    }
}

/// Issues a DL21-style credential; shared with DL21SEQ.
pub(crate) fn issue_credential(
    grpkey: &GroupKey,
    isk: &Scalar,
    H: &G1Projective,
) -> Result<(G1Projective, Scalar, Scalar), Error> {
    let x = random_scalar();
    let s = random_scalar();
    // A = (H + h2*s + g1) * (isk + x)^-1
    let A = (H + grpkey.h2 * s + grpkey.g1) * invert(&(isk + x), "isk + x")?;
    Ok((A, x, s))
}

/// Member-side credential check shared with DL21SEQ:
/// e(A, g2)^x * e(A, ipk) == e(g1 + H + h2*s, g2), A != 1.
pub(crate) fn credential_ok(grpkey: &GroupKey, key: &MemberKey) -> bool {
    if bool::from(key.A.is_identity()) {
        return false;
    }
    let lhs = pair(&key.A, &grpkey.g2) * key.x + pair(&key.A, &grpkey.ipk);
    let rhs = pair(&(grpkey.g1 + key.H + key.h2s), &grpkey.g2);
    lhs == rhs
}

impl Scheme for Dl21 {
    const SCHEME: SchemeId = SchemeId::Dl21;

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
        let g1 = random_g1();
        let h1 = random_g1();
        let h2 = random_g1();
        let g2 = random_g2();

        self.grpkey = Some(GroupKey {
            g1,
            g2,
            h1,
            h2,
            ipk: g2 * isk,
        });
        self.mgrkey = Some(ManagerKey { isk });
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
                    debug!("dl21 join: enrollment proof rejected");
                    return Err(Error::ProtocolState("enrollment proof rejected"));
                }
                let isk = self.mgr()?.isk;
                let (A, x, s) = issue_credential(grpkey, &isk, H)?;
                Ok(JoinMessage::Credential { A, x, s })
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
            (JoinMessage::Credential { A, x, s }, JoinState::Round(2)) => {
                let mut candidate = key.clone();
                candidate.A = *A;
                candidate.x = *x;
                candidate.s = *s;
                candidate.h2s = grpkey.h2 * s;
                if !credential_ok(grpkey, &candidate) {
                    debug!("dl21 join: issued credential does not verify");
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
        self.sign_scoped(message, key, DEFAULT_SCOPE)
    }

    fn verify(&self, message: &[u8], sig: &Signature) -> Result<Verdict, Error> {
        self.verify_scoped(message, sig, DEFAULT_SCOPE)
    }
}
