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

//! Manager-side membership bookkeeping: the group membership list (GML) and
//! the certificate revocation list (CRL).
//!
//! Both are append-only maps from a [`MemberId`] to a scheme-specific entry.
//! Mutation goes through `&mut` on the owning scheme instance, so at most
//! one mutation is in flight per manager; callers sharing a manager across
//! threads must serialize access themselves. Persistence is by whole-ledger
//! snapshot (`to_b64`/`from_b64`).

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use crate::container::{ContainerKind, Reader, Writer};
use crate::errors::Error;
use crate::registry::SchemeId;

/// Identifier assigned to a member when the manager completes its join:
/// the SHA-256 digest of the join-time identifying data, rendered as hex.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MemberId([u8; 32]);

impl MemberId {
    pub(crate) fn from_digest(digest: [u8; 32]) -> Self {
        Self(digest)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl core::fmt::Display for MemberId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl core::fmt::Debug for MemberId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "MemberId({})", self)
    }
}

impl core::str::FromStr for MemberId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        let bytes = hex::decode(s).map_err(|_| Error::decoding("member id", "invalid hex"))?;
        let digest: [u8; 32] = bytes
            .try_into()
            .map_err(|_| Error::decoding("member id", "expected 32 bytes"))?;
        Ok(Self(digest))
    }
}

/// Ledger entry bound to one scheme's join-time data.
pub trait LedgerEntry: Sized + Clone {
    const SCHEME: SchemeId;

    fn write(&self, w: &mut Writer);
    fn read(r: &mut Reader<'_>) -> Result<Self, Error>;
}

/// Append-only member ledger. [`Ledger::gml`] for membership lists,
/// [`Ledger::crl`] for revocation lists.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ledger<E> {
    kind: ContainerKind,
    entries: BTreeMap<MemberId, E>,
}

impl<E: LedgerEntry> Ledger<E> {
    pub fn gml() -> Self {
        Self {
            kind: ContainerKind::Gml,
            entries: BTreeMap::new(),
        }
    }

    pub fn crl() -> Self {
        Self {
            kind: ContainerKind::Crl,
            entries: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &MemberId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn get(&self, id: &MemberId) -> Option<&E> {
        self.entries.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&MemberId, &E)> {
        self.entries.iter()
    }

    /// Appends a new entry. Ledgers are append-only: re-registering an
    /// existing id is a protocol error, and entries are never removed.
    pub fn append(&mut self, id: MemberId, entry: E) -> Result<(), Error> {
        if self.entries.contains_key(&id) {
            return Err(Error::ProtocolState("ledger entry already present"));
        }
        self.entries.insert(id, entry);
        Ok(())
    }

    pub fn to_b64(&self) -> String {
        let mut w = Writer::new();
        w.u8(E::SCHEME.code());
        w.u8(self.kind.code());
        w.u16(self.entries.len() as u16);
        for (id, entry) in &self.entries {
            w.raw(id.as_bytes());
            entry.write(&mut w);
        }
        BASE64.encode(w.into_bytes())
    }

    pub fn from_b64(s: &str, kind: ContainerKind) -> Result<Self, Error> {
        let data = BASE64
            .decode(s.trim())
            .map_err(|_| Error::decoding("ledger", "invalid base64"))?;
        let mut r = Reader::new(&data);
        let (scheme, found_kind) = r.envelope()?;
        if scheme != Some(E::SCHEME) || found_kind != kind {
            return Err(Error::SchemeMismatch {
                expected: format!("{}/{}", E::SCHEME, kind),
                found: format!(
                    "{}/{}",
                    scheme.map(|s| s.name()).unwrap_or("spk"),
                    found_kind
                ),
            });
        }
        let count = r.u16("ledger size")?;
        let mut entries = BTreeMap::new();
        for _ in 0..count {
            let id = MemberId(r.raw32("member id")?);
            let entry = E::read(&mut r)?;
            entries.insert(id, entry);
        }
        r.finish()?;
        Ok(Self { kind, entries })
    }
}
