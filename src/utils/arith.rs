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

//! Thin adaptor over the `bls12_381_plus` algebra: secure randomness,
//! hash-to-scalar, hash-to-point, Fiat-Shamir transcripts and the
//! HMAC-SHA-256 PRF used by sequence-linkable signatures.

use bls12_381_plus::{G1Projective, G2Projective, Gt, Scalar};
use digest::Digest;
use elliptic_curve::hash2curve::{ExpandMsg, ExpandMsgXmd, Expander};
use ff::Field;
use group::Curve;
use group::{Group, GroupEncoding};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::errors::Error;

const SCALAR_DST: &[u8] = b"GROUPSIG_BLS12381_XMD:SHA-256_H2S_";
const POINT_DST: &[u8] = b"GROUPSIG_BLS12381G1_XMD:SHA-256_SSWU_RO_H2P_";

/// Uniform scalar in Z^*_p from the thread CSPRNG.
pub fn random_scalar() -> Scalar {
    loop {
        let s = Scalar::random(rand::thread_rng());
        if !bool::from(s.is_zero()) {
            return s;
        }
    }
}

/// Random element of G1 \ 1.
pub fn random_g1() -> G1Projective {
    loop {
        let p = G1Projective::random(rand::thread_rng());
        if !bool::from(p.is_identity()) {
            return p;
        }
    }
}

/// Random element of G2 \ 1.
pub fn random_g2() -> G2Projective {
    loop {
        let p = G2Projective::random(rand::thread_rng());
        if !bool::from(p.is_identity()) {
            return p;
        }
    }
}

/// Maps arbitrary bytes to a scalar via XMD expansion, never zero.
pub fn hash_to_scalar(data: &[u8]) -> Scalar {
    let mut counter = 0u8;
    loop {
        let mut okm = [0u8; 48];
        ExpandMsgXmd::<Sha256>::expand_message(&[data, &[counter]], &[SCALAR_DST], okm.len())
            .unwrap()
            .fill_bytes(&mut okm);
        let s = Scalar::from_okm(&okm);
        if !bool::from(s.is_zero()) {
            return s;
        }
        counter += 1;
    }
}

/// Maps arbitrary bytes to a point of G1 (RFC 9380 SSWU).
pub fn hash_to_g1(data: &[u8]) -> G1Projective {
    G1Projective::hash::<ExpandMsgXmd<Sha256>>(data, POINT_DST)
}

pub fn pair(p: &G1Projective, q: &G2Projective) -> Gt {
    bls12_381_plus::pairing(&p.to_affine(), &q.to_affine())
}

pub fn invert(s: &Scalar, what: &'static str) -> Result<Scalar, Error> {
    Option::<Scalar>::from(s.invert()).ok_or(Error::Arithmetic(what))
}

pub fn unix_now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// HMAC-SHA-256 pseudorandom function.
pub fn prf(key: &[u8; 32], data: &[u8]) -> [u8; 32] {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(key).expect("HMAC accepts keys of any size");
    mac.update(data);
    mac.finalize().into_bytes().into()
}

/// SHA-256 accumulator for Fiat-Shamir challenges. Every element is fed in
/// its canonical byte encoding, in transcript order.
pub struct Transcript {
    hasher: Sha256,
}

impl Transcript {
    pub fn new() -> Self {
        Self {
            hasher: Sha256::new(),
        }
    }

    pub fn bytes(&mut self, data: &[u8]) -> &mut Self {
        self.hasher.update(data);
        self
    }

    pub fn g1(&mut self, p: &G1Projective) -> &mut Self {
        self.hasher.update(p.to_affine().to_compressed());
        self
    }

    pub fn g2(&mut self, p: &G2Projective) -> &mut Self {
        self.hasher.update(p.to_affine().to_compressed());
        self
    }

    pub fn gt(&mut self, p: &Gt) -> &mut Self {
        self.hasher
            .update(<Gt as GroupEncoding>::to_bytes(p).as_ref());
        self
    }

    /// Reduces the transcript into a non-zero challenge scalar.
    pub fn challenge(self) -> Scalar {
        hash_to_scalar(&self.hasher.finalize())
    }

    /// Raw SHA-256 digest of the transcript, for member identifiers.
    pub fn digest(self) -> [u8; 32] {
        self.hasher.finalize().into()
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_to_scalar_is_deterministic() {
        assert_eq!(hash_to_scalar(b"fixed input"), hash_to_scalar(b"fixed input"));
        assert_ne!(hash_to_scalar(b"fixed input"), hash_to_scalar(b"other input"));
    }

    #[test]
    fn random_elements_are_fresh() {
        assert_ne!(random_scalar(), random_scalar());
        assert_ne!(random_g1(), random_g1());
        assert_ne!(random_g2(), random_g2());
    }

    #[test]
    fn prf_matches_on_same_state() {
        let k = [7u8; 32];
        assert_eq!(prf(&k, b"0"), prf(&k, b"0"));
        assert_ne!(prf(&k, b"0"), prf(&k, b"1"));
        assert_ne!(prf(&[8u8; 32], b"0"), prf(&k, b"0"));
    }

    #[test]
    fn pairing_is_bilinear() {
        let a = random_scalar();
        let p = random_g1();
        let q = random_g2();
        assert_eq!(pair(&(p * a), &q), pair(&p, &q) * a);
    }
}
