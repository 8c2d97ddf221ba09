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

//! The common protocol surface shared by all seven schemes.

use serde::{de::DeserializeOwned, Serialize};

use crate::container::Container;
use crate::errors::Error;
use crate::registry::SchemeId;

/// Outcome of a cryptographic check. An `Invalid` verdict is an expected,
/// frequent result that callers branch on; it is never reported as an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Valid,
    Invalid,
}

impl Verdict {
    pub fn is_valid(self) -> bool {
        matches!(self, Self::Valid)
    }

    pub(crate) fn from_bool(ok: bool) -> Self {
        if ok {
            Self::Valid
        } else {
            Self::Invalid
        }
    }
}

/// Which party emits the first join message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JoinParty {
    Manager,
    Member,
}

/// Join progress carried inside an in-progress member key. Only a key in
/// `Done` state can sign; the round index records which manager message the
/// member expects next.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum JoinState {
    #[default]
    Start,
    Round(u8),
    Done,
}

impl JoinState {
    pub(crate) fn code(self) -> u8 {
        match self {
            Self::Start => 0,
            Self::Round(n) => n,
            Self::Done => u8::MAX,
        }
    }

    pub(crate) fn from_code(code: u8) -> Self {
        match code {
            0 => Self::Start,
            u8::MAX => Self::Done,
            n => Self::Round(n),
        }
    }

    /// Guard used by signing operations.
    pub(crate) fn require_done(self) -> Result<(), Error> {
        if self == Self::Done {
            Ok(())
        } else {
            Err(Error::IncompleteKey)
        }
    }

    pub fn is_done(self) -> bool {
        self == Self::Done
    }
}

/// A group-signature scheme. Manager-side instances own the group and
/// manager keys (plus membership ledgers where the scheme keeps them);
/// member-side instances are built from an exported group key and drive only
/// the member half of the protocol.
///
/// The join protocol is an alternating exchange: starting from
/// `join_mgr(None)`, the caller relays each output to the other party until
/// `join_seq() + 1` calls have run, at which point the member key reports
/// [`JoinState::Done`]. Messages are plain serde values; transporting them
/// is the caller's concern.
pub trait Scheme: Sized {
    const SCHEME: SchemeId;

    type GroupKey: Container + Clone + PartialEq;
    type ManagerKey: Container + Clone + PartialEq;
    type MemberKey: Container + Clone + PartialEq;
    type Signature: Container + Clone + PartialEq;
    type JoinMessage: Serialize + DeserializeOwned + Clone + core::fmt::Debug;

    /// Number of messages exchanged during join.
    fn join_seq() -> usize;

    fn join_start() -> JoinParty {
        JoinParty::Manager
    }

    /// Generates the group and manager keys. No cryptography happens before
    /// this call.
    fn setup(&mut self) -> Result<(), Error>;

    fn group_key(&self) -> Result<&Self::GroupKey, Error>;

    fn manager_key(&self) -> Result<&Self::ManagerKey, Error>;

    /// Manager half of the join protocol. `None` starts a new join session.
    fn join_mgr(
        &mut self,
        message: Option<&Self::JoinMessage>,
    ) -> Result<Self::JoinMessage, Error>;

    /// Member half of the join protocol; accumulates state into `key`.
    /// Returns `None` once the member has nothing further to send.
    fn join_mem(
        &self,
        message: &Self::JoinMessage,
        key: &mut Self::MemberKey,
    ) -> Result<Option<Self::JoinMessage>, Error>;

    /// Signs `message` on behalf of the group. Fails with
    /// [`Error::IncompleteKey`] unless `key` finished the join protocol.
    fn sign(&self, message: &[u8], key: &Self::MemberKey) -> Result<Self::Signature, Error>;

    /// Checks a signature against the group key. Cryptographic invalidity is
    /// a [`Verdict`], not an error.
    fn verify(&self, message: &[u8], signature: &Self::Signature) -> Result<Verdict, Error>;
}
