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

//! BBS04 short group signatures (Boneh-Boyen-Shacham). Single-round join:
//! the manager mints the whole member key, so joining members trust the
//! issuer with their signing exponent. Opening inverts the linear
//! encryption (T1, T2, T3) with the tracing exponents.

/// Module for keys
pub mod keys;
/// Module for signatures
pub mod signature;

use log::debug;
use serde::{Deserialize, Serialize};

use bls12_381_plus::{G1Projective, Scalar};

use crate::errors::Error;
use crate::gml::{Ledger, MemberId};
use crate::registry::SchemeId;
use crate::scheme::{JoinState, Scheme, Verdict};
use crate::utils::arith::{invert, pair, random_g1, random_g2, random_scalar, Transcript};

pub use keys::{GmlEntry, GroupKey, ManagerKey, MemberKey};
pub use signature::Signature;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum JoinMessage {
    /// Complete member credential, minted by the manager.
    Credential { x: Scalar, A: G1Projective },
}

pub struct Bbs04 {
    grpkey: Option<GroupKey>,
    mgrkey: Option<ManagerKey>,
    gml: Ledger<GmlEntry>,
}

impl Bbs04 {
    pub fn new() -> Self {
        Self {
            grpkey: None,
            mgrkey: None,
            gml: Ledger::gml(),
        }
    }

    /// Member-side instance: holds the group key only.
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

    /// Recovers the signer's credential point from a signature and matches
    /// it against the GML.
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
}

impl Default for Bbs04 {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheme for Bbs04 {
    const SCHEME: SchemeId = SchemeId::Bbs04;

    type GroupKey = GroupKey;
    type ManagerKey = ManagerKey;
    type MemberKey = MemberKey;
    type Signature = Signature;
    type JoinMessage = JoinMessage;

    fn join_seq() -> usize {
        1
    }

    fn setup(&mut self) -> Result<(), Error> {
        let g2 = random_g2();
        let g1 = random_g1();
        let h = random_g1();

        let xi1 = random_scalar();
        let xi2 = random_scalar();
        let gamma = random_scalar();

        let u = h * invert(&xi1, "xi1")?;
        let v = h * invert(&xi2, "xi2")?;
        let w = g2 * gamma;

        self.grpkey = Some(GroupKey {
            g1,
            g2,
            h,
            u,
            v,
            w,
            hw: pair(&h, &w),
            hg2: pair(&h, &g2),
            g1g2: pair(&g1, &g2),
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
        if message.is_some() {
            return Err(Error::ProtocolState("join has a single manager round"));
        }
        let grpkey = self.grp()?;
        let mgrkey = self.mgr()?;

        let x = random_scalar();
        // A = g1 * (gamma + x)^-1
        let A = grpkey.g1 * invert(&(mgrkey.gamma + x), "gamma + x")?;

        let mut t = Transcript::new();
        t.g1(&A);
        let id = MemberId::from_digest(t.digest());
        self.gml.append(id, GmlEntry { A })?;

        Ok(JoinMessage::Credential { x, A })
    }

    fn join_mem(
        &self,
        message: &JoinMessage,
        key: &mut MemberKey,
    ) -> Result<Option<JoinMessage>, Error> {
        let grpkey = self.grp()?;
        if key.state != JoinState::Start {
            return Err(Error::ProtocolState("member key already joined"));
        }
        let JoinMessage::Credential { x, A } = message;
        key.x = *x;
        key.A = *A;
        key.Ag2 = pair(A, &grpkey.g2);
        key.state = JoinState::Done;
        Ok(None)
    }

    fn sign(&self, message: &[u8], key: &MemberKey) -> Result<Signature, Error> {
        let grpkey = self.grp()?;
        key.state.require_done()?;

        let alpha = random_scalar();
        let beta = random_scalar();
        let alphabeta = alpha + beta;

        let T1 = grpkey.u * alpha;
        let T2 = grpkey.v * beta;
        let T3 = key.A + grpkey.h * alphabeta;

        let delta1 = key.x * alpha;
        let delta2 = key.x * beta;

        let r_alpha = random_scalar();
        let r_beta = random_scalar();
        let r_x = random_scalar();
        let r_delta1 = random_scalar();
        let r_delta2 = random_scalar();

        // e(T3, g2) = e(A, g2) * e(h, g2)^(alpha+beta), both precomputed
        let T3g2 = key.Ag2 + grpkey.hg2 * alphabeta;

        let R1 = grpkey.u * r_alpha;
        let R2 = grpkey.v * r_beta;
        // R3 = e(T3,g2)^rx * e(h,w)^(-ra-rb) * e(h,g2)^(-rd1-rd2)
        let R3 = T3g2 * r_x + grpkey.hw * (-r_alpha - r_beta) + grpkey.hg2 * (-r_delta1 - r_delta2);
        let R4 = T1 * r_x + grpkey.u * (-r_delta1);
        let R5 = T2 * r_x + grpkey.v * (-r_delta2);

        let mut t = Transcript::new();
        t.bytes(message)
            .g1(&T1)
            .g1(&T2)
            .g1(&T3)
            .g1(&R1)
            .g1(&R2)
            .gt(&R3)
            .g1(&R4)
            .g1(&R5);
        let c = t.challenge();

        Ok(Signature {
            T1,
            T2,
            T3,
            c,
            s_alpha: r_alpha + c * alpha,
            s_beta: r_beta + c * beta,
            s_x: r_x + c * key.x,
            s_delta1: r_delta1 + c * delta1,
            s_delta2: r_delta2 + c * delta2,
        })
    }

    fn verify(&self, message: &[u8], sig: &Signature) -> Result<Verdict, Error> {
        let grpkey = self.grp()?;

        let R1 = grpkey.u * sig.s_alpha - sig.T1 * sig.c;
        let R2 = grpkey.v * sig.s_beta - sig.T2 * sig.c;

        // R3 = e(T3, w^c * g2^sx) * e(h,w)^(-sa-sb) * e(h,g2)^(-sd1-sd2)
        //      * e(g1,g2)^(-c)
        let e1 = pair(&sig.T3, &(grpkey.g2 * sig.s_x + grpkey.w * sig.c));
        let e2 = grpkey.hw * (-sig.s_alpha - sig.s_beta);
        let e3 = grpkey.hg2 * (-sig.s_delta1 - sig.s_delta2);
        let e4 = -(grpkey.g1g2 * sig.c);
        let R3 = e1 + e2 + e3 + e4;

        let R4 = sig.T1 * sig.s_x + grpkey.u * (-sig.s_delta1);
        let R5 = sig.T2 * sig.s_x + grpkey.v * (-sig.s_delta2);

        let mut t = Transcript::new();
        t.bytes(message)
            .g1(&sig.T1)
            .g1(&sig.T2)
            .g1(&sig.T3)
            .g1(&R1)
            .g1(&R2)
            .gt(&R3)
            .g1(&R4)
            .g1(&R5);

        if t.challenge() != sig.c {
            debug!("bbs04 verify: challenge mismatch");
            return Ok(Verdict::Invalid);
        }
        Ok(Verdict::Valid)
    }
}
