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

//! Name-based scheme resolution. [`group`] builds a scheme instance from a
//! case-insensitive name; [`key`] and [`signature`] resolve container
//! descriptors used to validate serialized material whose type is only
//! known at runtime. Construction never performs cryptography: `setup()` is
//! a separate, explicit call.

use serde::{Deserialize, Serialize};

use crate::container::{peek, ContainerKind};
use crate::errors::Error;
use crate::scheme::Scheme as _;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchemeId {
    Bbs04,
    Ps16,
    Cpy06,
    Klap20,
    Gl19,
    Dl21,
    Dl21Seq,
}

impl SchemeId {
    pub const ALL: [SchemeId; 7] = [
        SchemeId::Bbs04,
        SchemeId::Ps16,
        SchemeId::Cpy06,
        SchemeId::Klap20,
        SchemeId::Gl19,
        SchemeId::Dl21,
        SchemeId::Dl21Seq,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Bbs04 => "bbs04",
            Self::Ps16 => "ps16",
            Self::Cpy06 => "cpy06",
            Self::Klap20 => "klap20",
            Self::Gl19 => "gl19",
            Self::Dl21 => "dl21",
            Self::Dl21Seq => "dl21seq",
        }
    }

    pub(crate) fn code(self) -> u8 {
        match self {
            Self::Bbs04 => 1,
            Self::Ps16 => 2,
            Self::Cpy06 => 3,
            Self::Klap20 => 4,
            Self::Gl19 => 5,
            Self::Dl21 => 6,
            Self::Dl21Seq => 7,
        }
    }

    pub(crate) fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.code() == code)
    }
}

impl core::fmt::Display for SchemeId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

impl core::str::FromStr for SchemeId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        let lower = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|id| id.name() == lower)
            .ok_or_else(|| Error::Configuration(format!("unknown scheme: {s}")))
    }
}

/// Key container kinds resolvable through [`key`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyKind {
    Group,
    Manager,
    Member,
    Blind,
}

impl KeyKind {
    fn container_kind(self) -> ContainerKind {
        match self {
            Self::Group => ContainerKind::GroupKey,
            Self::Manager => ContainerKind::ManagerKey,
            Self::Member => ContainerKind::MemberKey,
            Self::Blind => ContainerKind::BlindKey,
        }
    }
}

impl core::str::FromStr for KeyKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s.trim().to_ascii_lowercase().as_str() {
            "group" => Ok(Self::Group),
            "manager" => Ok(Self::Manager),
            "member" => Ok(Self::Member),
            "blind" => Ok(Self::Blind),
            _ => Err(Error::Configuration(format!("unknown key type: {s}"))),
        }
    }
}

/// A scheme instance resolved by name. Concrete operations live on the
/// per-scheme types; the enum carries whichever one the name selected.
pub enum AnyScheme {
    Bbs04(crate::bbs04::Bbs04),
    Ps16(crate::ps16::Ps16),
    Cpy06(crate::cpy06::Cpy06),
    Klap20(crate::klap20::Klap20),
    Gl19(crate::gl19::Gl19),
    Dl21(crate::dl21::Dl21),
    Dl21Seq(crate::dl21seq::Dl21Seq),
}

impl AnyScheme {
    pub fn id(&self) -> SchemeId {
        match self {
            Self::Bbs04(_) => SchemeId::Bbs04,
            Self::Ps16(_) => SchemeId::Ps16,
            Self::Cpy06(_) => SchemeId::Cpy06,
            Self::Klap20(_) => SchemeId::Klap20,
            Self::Gl19(_) => SchemeId::Gl19,
            Self::Dl21(_) => SchemeId::Dl21,
            Self::Dl21Seq(_) => SchemeId::Dl21Seq,
        }
    }

    pub fn setup(&mut self) -> Result<(), Error> {
        match self {
            Self::Bbs04(s) => s.setup(),
            Self::Ps16(s) => s.setup(),
            Self::Cpy06(s) => s.setup(),
            Self::Klap20(s) => s.setup(),
            Self::Gl19(s) => s.setup(),
            Self::Dl21(s) => s.setup(),
            Self::Dl21Seq(s) => s.setup(),
        }
    }

    /// Number of join messages for the selected scheme.
    pub fn join_seq(&self) -> usize {
        match self {
            Self::Bbs04(_) => crate::bbs04::Bbs04::join_seq(),
            Self::Ps16(_) => crate::ps16::Ps16::join_seq(),
            Self::Cpy06(_) => crate::cpy06::Cpy06::join_seq(),
            Self::Klap20(_) => crate::klap20::Klap20::join_seq(),
            Self::Gl19(_) => crate::gl19::Gl19::join_seq(),
            Self::Dl21(_) => crate::dl21::Dl21::join_seq(),
            Self::Dl21Seq(_) => crate::dl21seq::Dl21Seq::join_seq(),
        }
    }
}

/// Resolves a scheme name to a fresh (not yet set up) instance.
pub fn group(name: &str) -> Result<AnyScheme, Error> {
    Ok(match name.parse::<SchemeId>()? {
        SchemeId::Bbs04 => AnyScheme::Bbs04(crate::bbs04::Bbs04::new()),
        SchemeId::Ps16 => AnyScheme::Ps16(crate::ps16::Ps16::new()),
        SchemeId::Cpy06 => AnyScheme::Cpy06(crate::cpy06::Cpy06::new()),
        SchemeId::Klap20 => AnyScheme::Klap20(crate::klap20::Klap20::new()),
        SchemeId::Gl19 => AnyScheme::Gl19(crate::gl19::Gl19::new()),
        SchemeId::Dl21 => AnyScheme::Dl21(crate::dl21::Dl21::new()),
        SchemeId::Dl21Seq => AnyScheme::Dl21Seq(crate::dl21seq::Dl21Seq::new()),
    })
}

/// Descriptor of a (scheme, container kind) pair, used to validate
/// serialized containers against an expected type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContainerType {
    pub scheme: SchemeId,
    pub kind: ContainerKind,
}

impl ContainerType {
    /// Checks that a serialized container carries this descriptor's
    /// envelope without decoding its body.
    pub fn check(&self, b64: &str) -> Result<(), Error> {
        let (scheme, kind) = peek(b64)?;
        if scheme != Some(self.scheme) || kind != self.kind {
            return Err(Error::SchemeMismatch {
                expected: format!("{}/{}", self.scheme, self.kind),
                found: format!(
                    "{}/{}",
                    scheme.map(|s| s.name()).unwrap_or("spk"),
                    kind
                ),
            });
        }
        Ok(())
    }
}

/// Resolves the key container type of a scheme. `Blind` keys exist only
/// for gl19.
pub fn key(scheme_name: &str, kind: KeyKind) -> Result<ContainerType, Error> {
    let scheme = scheme_name.parse::<SchemeId>()?;
    if kind == KeyKind::Blind && scheme != SchemeId::Gl19 {
        return Err(Error::Configuration(format!(
            "scheme {scheme} has no blind key"
        )));
    }
    Ok(ContainerType {
        scheme,
        kind: kind.container_kind(),
    })
}

/// Resolves the signature container type of a scheme.
pub fn signature(scheme_name: &str) -> Result<ContainerType, Error> {
    Ok(ContainerType {
        scheme: scheme_name.parse()?,
        kind: ContainerKind::Signature,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_resolve_case_insensitively() {
        assert_eq!("bbs04".parse::<SchemeId>().unwrap(), SchemeId::Bbs04);
        assert_eq!("KLAP20".parse::<SchemeId>().unwrap(), SchemeId::Klap20);
        assert_eq!("Dl21Seq".parse::<SchemeId>().unwrap(), SchemeId::Dl21Seq);
        assert!(matches!(
            "cl03".parse::<SchemeId>(),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn group_builds_the_named_scheme() {
        for id in SchemeId::ALL {
            assert_eq!(group(id.name()).unwrap().id(), id);
        }
        assert!(group("nope").is_err());
    }

    #[test]
    fn blind_keys_are_gl19_only() {
        assert!(key("gl19", KeyKind::Blind).is_ok());
        assert!(matches!(
            key("bbs04", KeyKind::Blind),
            Err(Error::Configuration(_))
        ));
        assert!(key("bbs04", KeyKind::Member).is_ok());
    }

    #[test]
    fn scheme_codes_round_trip() {
        for id in SchemeId::ALL {
            assert_eq!(SchemeId::from_code(id.code()), Some(id));
        }
        assert_eq!(SchemeId::from_code(0), None);
        assert_eq!(SchemeId::from_code(99), None);
    }
}
