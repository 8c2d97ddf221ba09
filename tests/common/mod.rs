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

use groupsig::container::Container;
use groupsig::errors::Error;
use groupsig::scheme::Scheme;

/// Drives the full interactive join: `join_seq() + 1` alternating calls,
/// manager first.
pub fn enroll<S: Scheme>(group: &mut S, key: &mut S::MemberKey) {
    let mut mem_msg: Option<S::JoinMessage> = None;
    for _ in 0..(S::join_seq() + 2) / 2 {
        let mgr_msg = group
            .join_mgr(mem_msg.as_ref())
            .expect("manager join round failed");
        mem_msg = group
            .join_mem(&mgr_msg, key)
            .expect("member join round failed");
    }
}

/// Sets up a fresh group with one enrolled member.
pub fn group_with_member<S: Scheme>(
    new: fn() -> S,
    blank: fn() -> S::MemberKey,
) -> (S, S::MemberKey) {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut group = new();
    group.setup().expect("setup failed");
    let mut key = blank();
    enroll(&mut group, &mut key);
    (group, key)
}

pub fn run_base_suite<S: Scheme>(new: fn() -> S, blank: fn() -> S::MemberKey) {
    let (group, key) = group_with_member(new, blank);

    // join completeness: exactly join_seq() + 1 calls yield a signing key
    let sig = group.sign(b"Hello world!", &key).expect("sign failed");
    assert!(group.verify(b"Hello world!", &sig).unwrap().is_valid());

    // signatures do not transfer to other messages
    assert!(!group.verify(b"World hello!", &sig).unwrap().is_valid());

    // signatures from another group's member do not verify here
    let (other, other_key) = group_with_member(new, blank);
    let foreign = other.sign(b"Hello world!", &other_key).unwrap();
    assert!(!group.verify(b"Hello world!", &foreign).unwrap().is_valid());
}

/// Stopping the join loop one round early leaves a key that refuses to
/// sign. Only meaningful for multi-round schemes.
pub fn run_incomplete_join<S: Scheme>(new: fn() -> S, blank: fn() -> S::MemberKey) {
    assert!(S::join_seq() > 1);
    let mut group = new();
    group.setup().unwrap();
    let mut key = blank();
    let m1 = group.join_mgr(None).unwrap();
    group.join_mem(&m1, &mut key).unwrap();

    assert!(matches!(
        group.sign(b"Hello world!", &key),
        Err(Error::IncompleteKey)
    ));
}

/// Serialization round-trip: `from_b64(to_b64(x)) == x`, attribute-wise.
pub fn assert_roundtrip<C>(container: &C)
where
    C: Container + PartialEq + core::fmt::Debug,
{
    let encoded = container.to_b64();
    let decoded = C::from_b64(&encoded).expect("round-trip decode failed");
    assert_eq!(&decoded, container);
    assert_eq!(decoded.to_b64(), encoded);
}

/// Key/signature export-import across scheme instances, plus tampering:
/// flipping a byte of the canonical encoding must make the signature
/// undecodable or invalid.
pub fn run_tamper<S: Scheme>(new: fn() -> S, blank: fn() -> S::MemberKey) {
    let (group, key) = group_with_member(new, blank);
    let sig = group.sign(b"Hello world!", &key).unwrap();

    let mut bytes = sig.to_bytes();
    // flip one bit in the middle of the encoding, inside commitment or
    // proof material for every scheme
    let mid = bytes.len() / 2;
    bytes[mid] ^= 0x01;

    match S::Signature::from_bytes(&bytes) {
        Err(_) => {}
        Ok(tampered) => {
            assert!(!group.verify(b"Hello world!", &tampered).unwrap().is_valid());
        }
    }
}
