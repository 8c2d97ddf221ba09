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

//! Protocol-shape properties every scheme must satisfy: setup/join/sign/
//! verify happy paths, join completeness and incompleteness, container
//! round-trips, tamper evidence and scheme-tag enforcement.

mod common;

use common::{
    assert_roundtrip, enroll, group_with_member, run_base_suite, run_incomplete_join, run_tamper,
};
use groupsig::container::Container;
use groupsig::errors::Error;
use groupsig::scheme::{JoinState, Scheme};
use groupsig::{bbs04, cpy06, dl21, dl21seq, gl19, klap20, ps16};

#[test]
fn bbs04_base() {
    run_base_suite(bbs04::Bbs04::new, bbs04::MemberKey::blank);
}

#[test]
fn ps16_base() {
    run_base_suite(ps16::Ps16::new, ps16::MemberKey::blank);
}

#[test]
fn cpy06_base() {
    run_base_suite(cpy06::Cpy06::new, cpy06::MemberKey::blank);
}

#[test]
fn klap20_base() {
    run_base_suite(klap20::Klap20::new, klap20::MemberKey::blank);
}

#[test]
fn gl19_base() {
    run_base_suite(gl19::Gl19::new, gl19::MemberKey::blank);
}

#[test]
fn dl21_base() {
    run_base_suite(dl21::Dl21::new, dl21::MemberKey::blank);
}

#[test]
fn dl21seq_base() {
    run_base_suite(dl21seq::Dl21Seq::new, dl21seq::MemberKey::blank);
}

#[test]
fn incomplete_join_refuses_to_sign() {
    run_incomplete_join(ps16::Ps16::new, ps16::MemberKey::blank);
    run_incomplete_join(cpy06::Cpy06::new, cpy06::MemberKey::blank);
    run_incomplete_join(klap20::Klap20::new, klap20::MemberKey::blank);
    run_incomplete_join(gl19::Gl19::new, gl19::MemberKey::blank);
    run_incomplete_join(dl21::Dl21::new, dl21::MemberKey::blank);
    run_incomplete_join(dl21seq::Dl21Seq::new, dl21seq::MemberKey::blank);

    // bbs04 joins in one round; only a never-joined key is incomplete
    let mut group = bbs04::Bbs04::new();
    group.setup().unwrap();
    let key = bbs04::MemberKey::blank();
    assert!(matches!(
        group.sign(b"Hello world!", &key),
        Err(Error::IncompleteKey)
    ));
}

#[test]
fn join_messages_out_of_sequence_fail() {
    let mut group = ps16::Ps16::new();
    group.setup().unwrap();

    let challenge = group.join_mgr(None).unwrap();
    let mut key = ps16::MemberKey::blank();
    let commitment = group.join_mem(&challenge, &mut key).unwrap().unwrap();
    assert_eq!(key.state(), JoinState::Round(2));

    // replaying the challenge against the advanced key
    assert!(matches!(
        group.join_mem(&challenge, &mut key),
        Err(Error::ProtocolState(_))
    ));

    // handing the member's own message back to it
    let mut fresh = ps16::MemberKey::blank();
    assert!(matches!(
        group.join_mem(&commitment, &mut fresh),
        Err(Error::ProtocolState(_))
    ));

    // finish properly, then the key accepts nothing further
    let credential = group.join_mgr(Some(&commitment)).unwrap();
    assert!(group.join_mem(&credential, &mut key).unwrap().is_none());
    assert!(key.state().is_done());
    assert!(matches!(
        group.join_mem(&credential, &mut key),
        Err(Error::ProtocolState(_))
    ));
}

#[test]
fn operations_before_setup_fail() {
    let group = ps16::Ps16::new();
    let key = ps16::MemberKey::blank();
    assert!(matches!(
        group.sign(b"hi", &key),
        Err(Error::ProtocolState(_))
    ));
    assert!(group.group_key().is_err());

    let mut group = bbs04::Bbs04::new();
    assert!(matches!(group.join_mgr(None), Err(Error::ProtocolState(_))));
}

#[test]
fn containers_round_trip() {
    let (group, key) = group_with_member(bbs04::Bbs04::new, bbs04::MemberKey::blank);
    assert_roundtrip(group.group_key().unwrap());
    assert_roundtrip(group.manager_key().unwrap());
    assert_roundtrip(&key);
    assert_roundtrip(&group.sign(b"Hello world!", &key).unwrap());

    let (group, key) = group_with_member(ps16::Ps16::new, ps16::MemberKey::blank);
    assert_roundtrip(group.group_key().unwrap());
    assert_roundtrip(group.manager_key().unwrap());
    assert_roundtrip(&key);
    assert_roundtrip(&group.sign(b"Hello world!", &key).unwrap());

    let (group, key) = group_with_member(cpy06::Cpy06::new, cpy06::MemberKey::blank);
    assert_roundtrip(group.group_key().unwrap());
    assert_roundtrip(group.manager_key().unwrap());
    assert_roundtrip(&key);
    assert_roundtrip(&group.sign(b"Hello world!", &key).unwrap());

    let (group, key) = group_with_member(klap20::Klap20::new, klap20::MemberKey::blank);
    assert_roundtrip(group.group_key().unwrap());
    assert_roundtrip(group.manager_key().unwrap());
    assert_roundtrip(&key);
    assert_roundtrip(&group.sign(b"Hello world!", &key).unwrap());

    let (group, key) = group_with_member(gl19::Gl19::new, gl19::MemberKey::blank);
    assert_roundtrip(group.group_key().unwrap());
    assert_roundtrip(group.manager_key().unwrap());
    assert_roundtrip(&key);
    assert_roundtrip(&group.sign(b"Hello world!", &key).unwrap());
    assert_roundtrip(&gl19::BlindKey::from_random(group.group_key().unwrap()));

    let (group, key) = group_with_member(dl21::Dl21::new, dl21::MemberKey::blank);
    assert_roundtrip(group.group_key().unwrap());
    assert_roundtrip(group.manager_key().unwrap());
    assert_roundtrip(&key);
    assert_roundtrip(&group.sign(b"Hello world!", &key).unwrap());

    let (group, key) = group_with_member(dl21seq::Dl21Seq::new, dl21seq::MemberKey::blank);
    assert_roundtrip(group.group_key().unwrap());
    assert_roundtrip(group.manager_key().unwrap());
    assert_roundtrip(&key);
    assert_roundtrip(&group.sign(b"Hello world!", &key).unwrap());
}

#[test]
fn partial_member_keys_round_trip() {
    // an in-progress key survives export/import with its join state
    let mut group = klap20::Klap20::new();
    group.setup().unwrap();
    let mut key = klap20::MemberKey::blank();
    let challenge = group.join_mgr(None).unwrap();
    let commitment = group.join_mem(&challenge, &mut key).unwrap().unwrap();
    assert_eq!(key.state(), JoinState::Round(2));

    let restored = klap20::MemberKey::from_b64(&key.to_b64()).unwrap();
    assert_eq!(restored, key);
    assert_eq!(restored.state(), JoinState::Round(2));

    // and can finish the join after restoration
    let credential = group.join_mgr(Some(&commitment)).unwrap();
    let mut restored = restored;
    group.join_mem(&credential, &mut restored).unwrap();
    let sig = group.sign(b"Hello world!", &restored).unwrap();
    assert!(group.verify(b"Hello world!", &sig).unwrap().is_valid());
}

#[test]
fn tampered_signatures_do_not_verify() {
    run_tamper(bbs04::Bbs04::new, bbs04::MemberKey::blank);
    run_tamper(ps16::Ps16::new, ps16::MemberKey::blank);
    run_tamper(cpy06::Cpy06::new, cpy06::MemberKey::blank);
    run_tamper(klap20::Klap20::new, klap20::MemberKey::blank);
    run_tamper(gl19::Gl19::new, gl19::MemberKey::blank);
    run_tamper(dl21::Dl21::new, dl21::MemberKey::blank);
    run_tamper(dl21seq::Dl21Seq::new, dl21seq::MemberKey::blank);
}

#[test]
fn scheme_tags_are_enforced() {
    let (group, key) = group_with_member(ps16::Ps16::new, ps16::MemberKey::blank);
    let sig_b64 = group.sign(b"Hello world!", &key).unwrap().to_b64();

    // a ps16 signature is not a bbs04 signature
    assert!(matches!(
        bbs04::Signature::from_b64(&sig_b64),
        Err(Error::SchemeMismatch { .. })
    ));
    // nor a ps16 member key
    assert!(matches!(
        ps16::MemberKey::from_b64(&sig_b64),
        Err(Error::SchemeMismatch { .. })
    ));
    // dl21 and dl21seq tags are distinct
    let (group, key) = group_with_member(dl21::Dl21::new, dl21::MemberKey::blank);
    let sig_b64 = group.sign(b"Hello world!", &key).unwrap().to_b64();
    assert!(matches!(
        dl21seq::Signature::from_b64(&sig_b64),
        Err(Error::SchemeMismatch { .. })
    ));
}

#[test]
fn malformed_containers_name_the_field() {
    let (group, _) = group_with_member(ps16::Ps16::new, ps16::MemberKey::blank);
    let mut bytes = group.group_key().unwrap().to_bytes();
    bytes.truncate(bytes.len() - 10);
    match ps16::GroupKey::from_bytes(&bytes) {
        Err(Error::Decoding { field, .. }) => assert_eq!(field, "Y"),
        other => panic!("expected a decoding error, got {other:?}"),
    }

    assert!(matches!(
        ps16::GroupKey::from_b64("!!not base64!!"),
        Err(Error::Decoding { .. })
    ));
}

#[test]
fn group_keys_transfer_between_instances() {
    // a member-side instance built from the exported group key verifies
    // manager-side signatures, and vice versa
    let (mut group, _) = group_with_member(dl21::Dl21::new, dl21::MemberKey::blank);
    let exported = dl21::GroupKey::from_b64(&group.group_key().unwrap().to_b64()).unwrap();
    let member_side = dl21::Dl21::from_group_key(exported);

    let mut key = dl21::MemberKey::blank();
    let challenge = group.join_mgr(None).unwrap();
    let commitment = member_side.join_mem(&challenge, &mut key).unwrap().unwrap();
    let credential = group.join_mgr(Some(&commitment)).unwrap();
    member_side.join_mem(&credential, &mut key).unwrap();

    let sig = member_side.sign(b"Hello world!", &key).unwrap();
    assert!(group.verify(b"Hello world!", &sig).unwrap().is_valid());
}

#[test]
fn join_messages_survive_json_marshalling() {
    // the caller owns transport; messages must round-trip through serde
    let mut group = klap20::Klap20::new();
    group.setup().unwrap();
    let mut key = klap20::MemberKey::blank();

    let challenge = group.join_mgr(None).unwrap();
    let challenge: klap20::JoinMessage =
        serde_json::from_str(&serde_json::to_string(&challenge).unwrap()).unwrap();
    let commitment = group.join_mem(&challenge, &mut key).unwrap().unwrap();
    let commitment: klap20::JoinMessage =
        serde_json::from_str(&serde_json::to_string(&commitment).unwrap()).unwrap();
    let credential = group.join_mgr(Some(&commitment)).unwrap();
    let credential: klap20::JoinMessage =
        serde_json::from_str(&serde_json::to_string(&credential).unwrap()).unwrap();
    group.join_mem(&credential, &mut key).unwrap();

    let sig = group.sign(b"Hello world!", &key).unwrap();
    assert!(group.verify(b"Hello world!", &sig).unwrap().is_valid());
}

#[test]
fn container_info_describes_the_type() {
    use groupsig::container::ContainerKind;
    use groupsig::registry::SchemeId;

    let info = bbs04::GroupKey::info();
    assert_eq!(info.scheme, Some(SchemeId::Bbs04));
    assert_eq!(info.kind, ContainerKind::GroupKey);
    assert!(info.fields.contains(&"g1") && info.fields.contains(&"w"));

    let info = gl19::BlindKey::info();
    assert_eq!(info.scheme, Some(SchemeId::Gl19));
    assert_eq!(info.kind, ContainerKind::BlindKey);

    let info = dl21seq::Signature::info();
    assert_eq!(info.scheme, Some(SchemeId::Dl21Seq));
    assert_eq!(info.fields, &["AA", "A_", "d", "nym", "pi", "seq1", "seq2", "seq3"]);
}

#[test]
fn gml_grows_with_enrollment() {
    let mut group = cpy06::Cpy06::new();
    group.setup().unwrap();
    for i in 0..5 {
        assert_eq!(group.gml().len(), i);
        let mut key = cpy06::MemberKey::blank();
        enroll(&mut group, &mut key);
    }
    assert_eq!(group.gml().len(), 5);
}
