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

//! DL21SEQ: DL21 linkable signatures extended with sequence tags. Each
//! signature embeds a per-state PRF chain, so linking can additionally
//! prove that a batch of signatures was produced in a specific session
//! order; swapped, replayed or skipped states fail [`Dl21Seq::seqlink_verify`].

/// Module for keys
pub mod keys;
/// Module for signatures
pub mod signature;

use log::debug;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use bls12_381_plus::{G1Projective, Scalar};
use group::Curve;
use group::Group;

use crate::container::{Container, ContainerKind, Reader, Writer};
use crate::dl21;
use crate::errors::Error;
use crate::registry::SchemeId;
use crate::scheme::{JoinState, Scheme, Verdict};
use crate::spk::{discrete_log_sign, discrete_log_verify, DiscreteLogProof};
use crate::utils::arith::{hash_to_g1, prf, random_g1, Transcript};

pub use keys::{GroupKey, ManagerKey, MemberKey};
pub use signature::Signature;

pub use crate::dl21::DEFAULT_SCOPE;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum JoinMessage {
    Challenge {
        n: G1Projective,
    },
    Commitment {
        n: G1Projective,
        H: G1Projective,
        pi: DiscreteLogProof,
    },
    Credential {
        A: G1Projective,
        x: Scalar,
        s: Scalar,
    },
}

/// Link proof carrying the revealed tag chain x_i = PRF(k', seq3_i).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeqLinkProof {
    pub c: Scalar,
    pub s: Scalar,
    pub tags: Vec<[u8; 32]>,
}

impl Container for SeqLinkProof {
    const SCHEME: Option<SchemeId> = None;
    const KIND: ContainerKind = ContainerKind::Proof;
    const FIELDS: &'static [&'static str] = &["c", "s", "tags"];

    fn write_fields(&self, w: &mut Writer) {
        w.scalar(&self.c);
        w.scalar(&self.s);
        w.tag_vec(&self.tags);
    }

    fn read_fields(r: &mut Reader<'_>) -> Result<Self, Error> {
        Ok(Self {
            c: r.scalar("c")?,
            s: r.scalar("s")?,
            tags: r.tag_vec("tags")?,
        })
    }
}

pub struct Dl21Seq {
    grpkey: Option<GroupKey>,
    mgrkey: Option<ManagerKey>,
}

fn sha256(data: &[u8]) -> [u8; 32] {
    let mut t = Transcript::new();
    t.bytes(data);
    t.digest()
}

fn xor32(a: &[u8; 32], b: &[u8; 32]) -> [u8; 32] {
    let mut out = [0u8; 32];
    for (o, (x, y)) in out.iter_mut().zip(a.iter().zip(b)) {
        *o = x ^ y;
    }
    out
}

/// x_i = PRF(k', seq3_i), keyed on the hex rendering of the state tag.
fn chain_tag(kk: &[u8; 32], seq3: &[u8; 32]) -> [u8; 32] {
    prf(kk, hex::encode(seq3).as_bytes())
}

impl Dl21Seq {
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

    /// Signs under an explicit scope and session state counter.
    pub fn sign_state(
        &self,
        message: &[u8],
        key: &MemberKey,
        scope: &[u8],
        state: i64,
    ) -> Result<Signature, Error> {
        let grpkey = self.grp()?;
        key.state.require_done()?;

        let core = dl21::sign_core(&grpkey.as_dl21(), &key.as_dl21(), message, scope)?;

        // seq3 = PRF(k, state); the chain tag x_i stays secret until a
        // seqlink proof reveals it.
        let seq3 = prf(&key.k, state.to_string().as_bytes());
        let xi = chain_tag(&key.kk, &seq3);
        let seq1 = sha256(&xi);

        let prev = prf(&key.k, (state - 1).to_string().as_bytes());
        let xi_prev = chain_tag(&key.kk, &prev);
        let seq2 = sha256(&xor32(&xi, &xi_prev));

        Ok(Signature {
            AA: core.AA,
            A_: core.A_,
            d: core.d,
            nym: core.nym,
            pi: core.pi,
            seq1,
            seq2,
            seq3,
        })
    }

    pub fn verify_scoped(
        &self,
        message: &[u8],
        sig: &Signature,
        scope: &[u8],
    ) -> Result<Verdict, Error> {
        let grpkey = self.grp()?;
        Ok(dl21::verify_core(
            &grpkey.as_dl21(),
            &sig.AA,
            &sig.A_,
            &sig.d,
            &sig.nym,
            &sig.pi,
            message,
            scope,
        ))
    }

    pub fn identify(&self, sig: &Signature, key: &MemberKey, scope: &[u8]) -> Result<bool, Error> {
        self.grp()?;
        key.state.require_done()?;
        Ok(hash_to_g1(scope) * key.y == sig.nym)
    }

    fn aggregate(
        &self,
        scope: &[u8],
        items: &[(&[u8], &Signature)],
    ) -> Result<Option<(G1Projective, G1Projective)>, Error> {
        let hscp = hash_to_g1(scope);
        let mut nym_sum = G1Projective::identity();
        let mut base_sum = G1Projective::identity();
        for (msg, sig) in items {
            if !self.verify_scoped(msg, sig, scope)?.is_valid() {
                return Ok(None);
            }
            nym_sum += sig.nym;
            base_sum += hscp;
        }
        Ok(Some((nym_sum, base_sum)))
    }

    /// Same-signer proof over a batch, as in DL21.
    pub fn link(
        &self,
        message: &[u8],
        scope: &[u8],
        items: &[(&[u8], &Signature)],
        key: &MemberKey,
    ) -> Result<Option<DiscreteLogProof>, Error> {
        key.state.require_done()?;
        if items.is_empty() {
            return Err(Error::Statement("no signatures to link"));
        }
        for (_, sig) in items {
            if !self.identify(sig, key, scope)? {
                debug!("dl21seq link: supplied signature not ours");
                return Ok(None);
            }
        }
        match self.aggregate(scope, items)? {
            Some((nym_sum, base_sum)) => Ok(Some(discrete_log_sign(
                &nym_sum, &base_sum, &key.y, message,
            ))),
            None => Ok(None),
        }
    }

    pub fn link_verify(
        &self,
        message: &[u8],
        scope: &[u8],
        items: &[(&[u8], &Signature)],
        proof: &DiscreteLogProof,
    ) -> Result<Verdict, Error> {
        if items.is_empty() {
            return Err(Error::Statement("no signatures to link"));
        }
        match self.aggregate(scope, items)? {
            Some((nym_sum, base_sum)) => Ok(Verdict::from_bool(discrete_log_verify(
                &nym_sum, &base_sum, proof, message,
            ))),
            None => Ok(Verdict::Invalid),
        }
    }

    /// Same-signer proof that additionally reveals the tag chain, proving
    /// the signatures were produced in the supplied session order.
    pub fn seqlink(
        &self,
        message: &[u8],
        scope: &[u8],
        items: &[(&[u8], &Signature)],
        key: &MemberKey,
    ) -> Result<Option<SeqLinkProof>, Error> {
        let base = match self.link(message, scope, items, key)? {
            Some(proof) => proof,
            None => return Ok(None),
        };
        let tags = items
            .iter()
            .map(|(_, sig)| chain_tag(&key.kk, &sig.seq3))
            .collect();
        Ok(Some(SeqLinkProof {
            c: base.c,
            s: base.s,
            tags,
        }))
    }

    pub fn seqlink_verify(
        &self,
        message: &[u8],
        scope: &[u8],
        items: &[(&[u8], &Signature)],
        proof: &SeqLinkProof,
    ) -> Result<Verdict, Error> {
        if proof.tags.len() != items.len() {
            return Ok(Verdict::Invalid);
        }
        let base = DiscreteLogProof {
            c: proof.c,
            s: proof.s,
        };
        if !self.link_verify(message, scope, items, &base)?.is_valid() {
            return Ok(Verdict::Invalid);
        }

        // Each signature must commit to its revealed tag, and each tag must
        // chain onto its predecessor: reordering or skipping states breaks
        // one of the two hashes.
        for (idx, (_, sig)) in items.iter().enumerate() {
            if sha256(&proof.tags[idx]) != sig.seq1 {
                debug!("dl21seq seqlink: tag commitment mismatch at {idx}");
                return Ok(Verdict::Invalid);
            }
            if idx > 0 && sha256(&xor32(&proof.tags[idx], &proof.tags[idx - 1])) != sig.seq2 {
                debug!("dl21seq seqlink: broken tag chain at {idx}");
                return Ok(Verdict::Invalid);
            }
        }
        Ok(Verdict::Valid)
    }
}

impl Default for Dl21Seq {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheme for Dl21Seq {
    const SCHEME: SchemeId = SchemeId::Dl21Seq;

    type GroupKey = GroupKey;
    type ManagerKey = ManagerKey;
    type MemberKey = MemberKey;
    type Signature = Signature;
    type JoinMessage = JoinMessage;

    fn join_seq() -> usize {
        3
    }

    fn setup(&mut self) -> Result<(), Error> {
        let mut inner = dl21::Dl21::new();
        inner.setup()?;
        let gk = inner.group_key()?;
        self.grpkey = Some(GroupKey {
            g1: gk.g1,
            g2: gk.g2,
            h1: gk.h1,
            h2: gk.h2,
            ipk: gk.ipk,
        });
        self.mgrkey = Some(ManagerKey {
            isk: inner.manager_key()?.isk,
        });
        Ok(())
    }

    fn group_key(&self) -> Result<&GroupKey, Error> {
        self.grp()
    }

    fn manager_key(&self) -> Result<&ManagerKey, Error> {
        self.mgr()
    }

    fn join_mgr(&mut self, message: Option<&JoinMessage>) -> Result<JoinMessage, Error> {
        let grpkey = self.grp()?.as_dl21();
        match message {
            None => Ok(JoinMessage::Challenge { n: random_g1() }),
            Some(JoinMessage::Commitment { n, H, pi }) => {
                let binding = n.to_affine().to_compressed();
                if !discrete_log_verify(H, &grpkey.h1, pi, &binding) {
                    debug!("dl21seq join: enrollment proof rejected");
                    return Err(Error::ProtocolState("enrollment proof rejected"));
                }
                let isk = self.mgr()?.isk;
                let (A, x, s) = dl21::issue_credential(&grpkey, &isk, H)?;
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
        let grpkey = self.grp()?.as_dl21();
        match (message, key.state) {
            (JoinMessage::Challenge { n }, JoinState::Start) => {
                key.y = crate::utils::arith::random_scalar();
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
                let mut candidate = key.as_dl21();
                candidate.A = *A;
                candidate.x = *x;
                candidate.s = *s;
                candidate.h2s = grpkey.h2 * s;
                if !dl21::credential_ok(&grpkey, &candidate) {
                    debug!("dl21seq join: issued credential does not verify");
                    return Err(Error::ProtocolState("issued credential does not verify"));
                }
                key.A = candidate.A;
                key.x = candidate.x;
                key.s = candidate.s;
                key.h2s = candidate.h2s;
                // Mint the PRF keys the sequence tags run on.
                rand::thread_rng().fill_bytes(&mut key.k);
                rand::thread_rng().fill_bytes(&mut key.kk);
                key.state = JoinState::Done;
                Ok(None)
            }
            _ => Err(Error::ProtocolState("join message out of sequence")),
        }
    }

    fn sign(&self, message: &[u8], key: &MemberKey) -> Result<Signature, Error> {
        self.sign_state(message, key, DEFAULT_SCOPE, 0)
    }

    fn verify(&self, message: &[u8], sig: &Signature) -> Result<Verdict, Error> {
        self.verify_scoped(message, sig, DEFAULT_SCOPE)
    }
}
