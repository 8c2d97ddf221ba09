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

//! Canonical container serialization.
//!
//! Every key, signature and proof serializes to a fixed-order concatenation
//! of its fields' canonical byte encodings behind a two-byte envelope
//! (scheme tag, container kind), wrapped in base64. Decoding a container
//! whose envelope names another scheme or kind fails with
//! [`Error::SchemeMismatch`]; any malformed field fails with
//! [`Error::Decoding`] naming the field. A failed decode never yields a
//! partially populated value.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use bls12_381_plus::{G1Affine, G1Projective, G2Affine, G2Projective, Gt, Scalar};
use group::Curve;
use group::GroupEncoding;

use crate::errors::Error;
use crate::registry::SchemeId;

pub const G1_BYTES: usize = 48;
pub const G2_BYTES: usize = 96;
pub const SCALAR_BYTES: usize = 32;

fn gt_bytes() -> usize {
    <Gt as GroupEncoding>::Repr::default().as_ref().len()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    GroupKey,
    ManagerKey,
    MemberKey,
    BlindKey,
    Signature,
    BlindSignature,
    Proof,
    Gml,
    Crl,
}

impl ContainerKind {
    pub(crate) fn code(self) -> u8 {
        match self {
            Self::GroupKey => 1,
            Self::ManagerKey => 2,
            Self::MemberKey => 3,
            Self::BlindKey => 4,
            Self::Signature => 5,
            Self::BlindSignature => 6,
            Self::Proof => 7,
            Self::Gml => 8,
            Self::Crl => 9,
        }
    }

    pub(crate) fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            1 => Self::GroupKey,
            2 => Self::ManagerKey,
            3 => Self::MemberKey,
            4 => Self::BlindKey,
            5 => Self::Signature,
            6 => Self::BlindSignature,
            7 => Self::Proof,
            8 => Self::Gml,
            9 => Self::Crl,
            _ => return None,
        })
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::GroupKey => "group",
            Self::ManagerKey => "manager",
            Self::MemberKey => "member",
            Self::BlindKey => "blind",
            Self::Signature => "signature",
            Self::BlindSignature => "blind_signature",
            Self::Proof => "proof",
            Self::Gml => "gml",
            Self::Crl => "crl",
        }
    }
}

impl core::fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// Introspection data returned by [`Container::info`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContainerInfo {
    /// `None` for shared toolkit containers (proofs).
    pub scheme: Option<SchemeId>,
    pub kind: ContainerKind,
    pub fields: &'static [&'static str],
}

fn scheme_code(scheme: Option<SchemeId>) -> u8 {
    scheme.map(SchemeId::code).unwrap_or(0)
}

fn scheme_label(scheme: Option<SchemeId>) -> &'static str {
    scheme.map(SchemeId::name).unwrap_or("spk")
}

pub trait Container: Sized {
    const SCHEME: Option<SchemeId>;
    const KIND: ContainerKind;
    const FIELDS: &'static [&'static str];

    fn write_fields(&self, w: &mut Writer);
    fn read_fields(r: &mut Reader<'_>) -> Result<Self, Error>;

    fn info() -> ContainerInfo {
        ContainerInfo {
            scheme: Self::SCHEME,
            kind: Self::KIND,
            fields: Self::FIELDS,
        }
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut w = Writer::new();
        w.u8(scheme_code(Self::SCHEME));
        w.u8(Self::KIND.code());
        self.write_fields(&mut w);
        w.into_bytes()
    }

    fn from_bytes(data: &[u8]) -> Result<Self, Error> {
        let mut r = Reader::new(data);
        let (scheme, kind) = r.envelope()?;
        if scheme != Self::SCHEME || kind != Self::KIND {
            return Err(Error::SchemeMismatch {
                expected: format!("{}/{}", scheme_label(Self::SCHEME), Self::KIND),
                found: format!("{}/{}", scheme_label(scheme), kind),
            });
        }
        let value = Self::read_fields(&mut r)?;
        r.finish()?;
        Ok(value)
    }

    fn to_b64(&self) -> String {
        BASE64.encode(self.to_bytes())
    }

    fn from_b64(s: &str) -> Result<Self, Error> {
        let data = BASE64
            .decode(s.trim())
            .map_err(|_| Error::decoding("container", "invalid base64"))?;
        Self::from_bytes(&data)
    }

    /// In-place variant of [`Container::from_b64`]. The previous value is
    /// only replaced when the whole decode succeeds.
    fn set_b64(&mut self, s: &str) -> Result<(), Error> {
        *self = Self::from_b64(s)?;
        Ok(())
    }
}

/// Reads the envelope of a serialized container without decoding its body.
pub fn peek(b64: &str) -> Result<(Option<SchemeId>, ContainerKind), Error> {
    let data = BASE64
        .decode(b64.trim())
        .map_err(|_| Error::decoding("container", "invalid base64"))?;
    Reader::new(&data).envelope()
}

#[derive(Default)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub fn i64(&mut self, v: i64) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn raw(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn scalar(&mut self, s: &Scalar) {
        self.buf.extend_from_slice(&s.to_be_bytes());
    }

    pub fn g1(&mut self, p: &G1Projective) {
        self.buf.extend_from_slice(&p.to_affine().to_compressed());
    }

    pub fn g2(&mut self, p: &G2Projective) {
        self.buf.extend_from_slice(&p.to_affine().to_compressed());
    }

    pub fn gt(&mut self, p: &Gt) {
        self.buf
            .extend_from_slice(<Gt as GroupEncoding>::to_bytes(p).as_ref());
    }

    pub fn scalar_vec(&mut self, v: &[Scalar]) {
        self.u16(v.len() as u16);
        for s in v {
            self.scalar(s);
        }
    }

    pub fn tag_vec(&mut self, v: &[[u8; 32]]) {
        self.u16(v.len() as u16);
        for t in v {
            self.raw(t);
        }
    }
}

pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn take(&mut self, n: usize, field: &'static str) -> Result<&'a [u8], Error> {
        if self.buf.len() - self.pos < n {
            return Err(Error::decoding(field, "truncated"));
        }
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    pub(crate) fn envelope(&mut self) -> Result<(Option<SchemeId>, ContainerKind), Error> {
        let scheme = match self.u8("scheme tag")? {
            0 => None,
            code => Some(
                SchemeId::from_code(code)
                    .ok_or_else(|| Error::decoding("scheme tag", "unknown scheme code"))?,
            ),
        };
        let kind = ContainerKind::from_code(self.u8("container kind")?)
            .ok_or_else(|| Error::decoding("container kind", "unknown kind code"))?;
        Ok((scheme, kind))
    }

    pub fn u8(&mut self, field: &'static str) -> Result<u8, Error> {
        Ok(self.take(1, field)?[0])
    }

    pub fn i64(&mut self, field: &'static str) -> Result<i64, Error> {
        let bytes: [u8; 8] = self.take(8, field)?.try_into().unwrap();
        Ok(i64::from_be_bytes(bytes))
    }

    pub fn u16(&mut self, field: &'static str) -> Result<u16, Error> {
        let bytes: [u8; 2] = self.take(2, field)?.try_into().unwrap();
        Ok(u16::from_be_bytes(bytes))
    }

    pub fn raw32(&mut self, field: &'static str) -> Result<[u8; 32], Error> {
        Ok(self.take(32, field)?.try_into().unwrap())
    }

    pub fn scalar(&mut self, field: &'static str) -> Result<Scalar, Error> {
        let bytes: [u8; SCALAR_BYTES] = self.take(SCALAR_BYTES, field)?.try_into().unwrap();
        Option::<Scalar>::from(Scalar::from_be_bytes(&bytes))
            .ok_or_else(|| Error::decoding(field, "not a canonical scalar"))
    }

    pub fn g1(&mut self, field: &'static str) -> Result<G1Projective, Error> {
        let bytes: [u8; G1_BYTES] = self.take(G1_BYTES, field)?.try_into().unwrap();
        Option::<G1Affine>::from(G1Affine::from_compressed(&bytes))
            .map(G1Projective::from)
            .ok_or_else(|| Error::decoding(field, "not a point of G1"))
    }

    pub fn g2(&mut self, field: &'static str) -> Result<G2Projective, Error> {
        let bytes: [u8; G2_BYTES] = self.take(G2_BYTES, field)?.try_into().unwrap();
        Option::<G2Affine>::from(G2Affine::from_compressed(&bytes))
            .map(G2Projective::from)
            .ok_or_else(|| Error::decoding(field, "not a point of G2"))
    }

    pub fn gt(&mut self, field: &'static str) -> Result<Gt, Error> {
        let mut repr = <Gt as GroupEncoding>::Repr::default();
        let bytes = self.take(gt_bytes(), field)?;
        repr.as_mut().copy_from_slice(bytes);
        Option::<Gt>::from(<Gt as GroupEncoding>::from_bytes(&repr))
            .ok_or_else(|| Error::decoding(field, "not an element of GT"))
    }

    pub fn scalar_vec(&mut self, field: &'static str) -> Result<Vec<Scalar>, Error> {
        let len = self.u16(field)? as usize;
        let mut out = Vec::with_capacity(len);
        for _ in 0..len {
            out.push(self.scalar(field)?);
        }
        Ok(out)
    }

    pub fn tag_vec(&mut self, field: &'static str) -> Result<Vec<[u8; 32]>, Error> {
        let len = self.u16(field)? as usize;
        let mut out = Vec::with_capacity(len);
        for _ in 0..len {
            out.push(self.raw32(field)?);
        }
        Ok(out)
    }

    pub fn finish(self) -> Result<(), Error> {
        if self.pos != self.buf.len() {
            return Err(Error::decoding("container", "trailing bytes"));
        }
        Ok(())
    }
}
