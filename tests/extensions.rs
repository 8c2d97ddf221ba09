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

//! Scheme-specific extension sets: opening and tracing, equality claims,
//! the blind-conversion pipeline, local linkability and sequence linking.

mod common;

use common::{enroll, group_with_member};
use groupsig::container::{Container, ContainerKind};
use groupsig::gml::Ledger;
use groupsig::registry::{self, KeyKind};
use groupsig::scheme::Scheme;
use groupsig::{bbs04, cpy06, dl21, dl21seq, gl19, klap20, ps16};

#[test]
fn bbs04_open_identifies_the_signer() {
    let mut group = bbs04::Bbs04::new();
    group.setup().unwrap();

    let mut keys = Vec::new();
    for _ in 0..3 {
        let mut key = bbs04::MemberKey::blank();
        enroll(&mut group, &mut key);
        keys.push(key);
    }

    let sig = group.sign(b"Hello world!", &keys[1]).unwrap();
    let opened = group.open(&sig).unwrap().expect("open found nobody");

    // the opened id is the one holding keys[1]'s credential
    let entry = group.gml().get(&opened).unwrap();
    assert_eq!(entry.A, keys[1].A);

    // signatures from another group open to nobody
    let (other, other_key) = group_with_member(bbs04::Bbs04::new, bbs04::MemberKey::blank);
    let foreign = other.sign(b"Hello world!", &other_key).unwrap();
    assert!(group.open(&foreign).unwrap().is_none());
}

#[test]
fn ps16_open_produces_a_verifiable_proof() {
    let (group, key) = group_with_member(ps16::Ps16::new, ps16::MemberKey::blank);
    let sig = group.sign(b"Hello world!", &key).unwrap();

    let (id, proof) = group.open(&sig).unwrap().expect("open found nobody");
    assert!(group.gml().contains(&id));
    assert!(group.open_verify(&sig, &proof).unwrap().is_valid());

    // a proof minted by a different group's opener is rejected
    let (other, other_key) = group_with_member(ps16::Ps16::new, ps16::MemberKey::blank);
    let other_sig = other.sign(b"Hello world!", &other_key).unwrap();
    let (_, forged) = other.open(&other_sig).unwrap().unwrap();
    assert!(!group.open_verify(&other_sig, &forged).unwrap().is_valid());
}

#[test]
fn klap20_open_produces_a_verifiable_proof() {
    let mut group = klap20::Klap20::new();
    group.setup().unwrap();
    let mut key_a = klap20::MemberKey::blank();
    enroll(&mut group, &mut key_a);
    let mut key_b = klap20::MemberKey::blank();
    enroll(&mut group, &mut key_b);

    let sig = group.sign(b"Hello world!", &key_b).unwrap();
    let (id, proof) = group.open(&sig).unwrap().expect("open found nobody");
    assert!(group.gml().contains(&id));
    assert!(group.open_verify(&sig, &proof).unwrap().is_valid());

    // opening is stable across that member's signatures
    let sig2 = group.sign(b"World hello!", &key_b).unwrap();
    let (id2, _) = group.open(&sig2).unwrap().unwrap();
    assert_eq!(id, id2);

    // foreign proofs are rejected
    let (other, other_key) = group_with_member(klap20::Klap20::new, klap20::MemberKey::blank);
    let other_sig = other.sign(b"Hello world!", &other_key).unwrap();
    let (_, forged) = other.open(&other_sig).unwrap().unwrap();
    assert!(!group.open_verify(&other_sig, &forged).unwrap().is_valid());
}

#[test]
fn cpy06_open_reveal_trace() {
    let mut group = cpy06::Cpy06::new();
    group.setup().unwrap();

    let mut keys = Vec::new();
    let mut sigs = Vec::new();
    for i in 0..3 {
        let mut key = cpy06::MemberKey::blank();
        enroll(&mut group, &mut key);
        let sig = group
            .sign(format!("Hello world {i}!").as_bytes(), &key)
            .unwrap();
        keys.push(key);
        sigs.push(sig);
    }

    let id = group.open(&sigs[0]).unwrap().expect("open found nobody");
    assert!(group.reveal(&id).unwrap().is_some());
    assert_eq!(group.crl().len(), 1);

    // the revoked member's signature still verifies but now traces
    assert!(group
        .verify(b"Hello world 0!", &sigs[0])
        .unwrap()
        .is_valid());
    assert!(group.trace(&sigs[0]).unwrap());
    // other members remain untraceable
    assert!(!group.trace(&sigs[2]).unwrap());

    // revealing an unknown id is a miss, not an error
    let (other_group, other_key) = group_with_member(cpy06::Cpy06::new, cpy06::MemberKey::blank);
    let other_sig = other_group.sign(b"Hello world!", &other_key).unwrap();
    let other_id = other_group.open(&other_sig).unwrap().unwrap();
    assert!(group.reveal(&other_id).unwrap().is_none());
}

#[test]
fn cpy06_prove_equality_and_claim() {
    let mut group = cpy06::Cpy06::new();
    group.setup().unwrap();
    let mut key = cpy06::MemberKey::blank();
    enroll(&mut group, &mut key);

    let sigs: Vec<_> = (0..3)
        .map(|i| {
            group
                .sign(format!("Hello world {i}!").as_bytes(), &key)
                .unwrap()
        })
        .collect();
    let refs: Vec<&cpy06::Signature> = sigs.iter().collect();

    let proof = group.prove_equality(&refs, &key).unwrap();
    assert!(group.prove_equality_verify(&refs, &proof).unwrap().is_valid());

    // mixing in another member's signature breaks the relation
    let mut key2 = cpy06::MemberKey::blank();
    enroll(&mut group, &mut key2);
    let stray = group.sign(b"Hello world 1!", &key2).unwrap();
    let mixed = vec![&sigs[0], &stray, &sigs[2]];
    let proof = group.prove_equality(&mixed, &key).unwrap();
    assert!(!group.prove_equality_verify(&mixed, &proof).unwrap().is_valid());

    // claims are the single-signature case
    let claim = group.claim(&sigs[0], &key).unwrap();
    assert!(group.claim_verify(&sigs[0], &claim).unwrap().is_valid());
    assert!(!group.claim_verify(&sigs[1], &claim).unwrap().is_valid());
}

#[test]
fn gl19_blind_convert_unblind() {
    let mut group = gl19::Gl19::new();
    group.setup().unwrap();
    let mut key = gl19::MemberKey::blank();
    enroll(&mut group, &mut key);

    let sig1 = group.sign(b"Hello world!", &key).unwrap();
    let sig2 = group.sign(b"World hello!", &key).unwrap();

    let (bsig1, bkey) = group.blind(b"Hello world!", &sig1, None).unwrap();
    let (bsig2, _) = group.blind(b"World hello!", &sig2, Some(&bkey)).unwrap();

    let converted = group
        .convert(&[bsig1.clone(), bsig2.clone()], &bkey.public())
        .unwrap();
    assert_eq!(converted.len(), 2);

    // both signatures come from one member: equal unblinded pseudonyms
    let nym_a = group.unblind(&converted[0], &bkey).unwrap();
    let nym_b = group.unblind(&converted[1], &bkey).unwrap();
    assert_eq!(nym_a, nym_b);

    // a second member unblinds to a different pseudonym
    let mut key2 = gl19::MemberKey::blank();
    enroll(&mut group, &mut key2);
    let sig3 = group.sign(b"Hello again!", &key2).unwrap();
    let (bsig3, _) = group.blind(b"Hello again!", &sig3, Some(&bkey)).unwrap();
    let converted2 = group.convert(&[bsig1.clone(), bsig3], &bkey.public()).unwrap();
    let nyms: Vec<_> = converted2
        .iter()
        .map(|c| group.unblind(c, &bkey).unwrap())
        .collect();
    assert_ne!(nyms[0], nyms[1]);

    // conversions are not transitive across batches: the converter picks a
    // fresh batch exponent every time
    let conv_a = group.convert(&[bsig1], &bkey.public()).unwrap();
    let conv_b = group.convert(&[bsig2], &bkey.public()).unwrap();
    let nym_1 = group.unblind(&conv_a[0], &bkey).unwrap();
    let nym_2 = group.unblind(&conv_b[0], &bkey).unwrap();
    assert_ne!(nym_1, nym_2);
}

#[test]
fn gl19_expired_credentials_fail_verification() {
    let mut group = gl19::Gl19::new();
    group.setup().unwrap();
    group.set_lifetime(-3600);

    let mut key = gl19::MemberKey::blank();
    enroll(&mut group, &mut key);

    let sig = group.sign(b"Hello world!", &key).unwrap();
    assert!(!group.verify(b"Hello world!", &sig).unwrap().is_valid());
}

#[test]
fn dl21_identify_and_link() {
    let mut group = dl21::Dl21::new();
    group.setup().unwrap();
    let mut key = dl21::MemberKey::blank();
    enroll(&mut group, &mut key);

    let scope = dl21::DEFAULT_SCOPE;
    let sig1 = group.sign_scoped(b"Hello world!", &key, scope).unwrap();
    let sig2 = group.sign_scoped(b"World hello!", &key, scope).unwrap();

    assert!(group.identify(&sig1, &key, scope).unwrap());
    // a signature under another scope is not ours under this one
    assert!(!group.identify(&sig1, &key, b"fed").unwrap());

    // same scope, same signer: signatures are linkable
    let items = [
        (&b"Hello world!"[..], &sig1),
        (&b"World hello!"[..], &sig2),
    ];
    let proof = group
        .link(b"password", scope, &items, &key)
        .unwrap()
        .expect("link refused our own signatures");
    assert!(group
        .link_verify(b"password", scope, &items, &proof)
        .unwrap()
        .is_valid());
    // the proof binds its fresh message
    assert!(!group
        .link_verify(b"password2", scope, &items, &proof)
        .unwrap()
        .is_valid());
    // and its scope
    assert!(!group
        .link_verify(b"password", b"fed", &items, &proof)
        .unwrap()
        .is_valid());

    // another member's signature cannot be linked in
    let mut key2 = dl21::MemberKey::blank();
    enroll(&mut group, &mut key2);
    let stray = group.sign_scoped(b"World hello!", &key2, scope).unwrap();
    let mixed = [
        (&b"Hello world!"[..], &sig1),
        (&b"World hello!"[..], &stray),
    ];
    assert!(group.link(b"password", scope, &mixed, &key).unwrap().is_none());
}

#[test]
fn dl21_scopes_partition_signatures() {
    let mut group = dl21::Dl21::new();
    group.setup().unwrap();
    let mut key = dl21::MemberKey::blank();
    enroll(&mut group, &mut key);

    let sig = group.sign_scoped(b"Hello world!", &key, b"scope-a").unwrap();
    assert!(group
        .verify_scoped(b"Hello world!", &sig, b"scope-a")
        .unwrap()
        .is_valid());
    // the same signature does not verify under another scope
    assert!(!group
        .verify_scoped(b"Hello world!", &sig, b"scope-b")
        .unwrap()
        .is_valid());

    // pseudonyms differ across scopes, so signatures are unlinkable
    let sig_b = group.sign_scoped(b"Hello world!", &key, b"scope-b").unwrap();
    assert_ne!(sig.nym, sig_b.nym);
}

#[test]
fn dl21seq_seqlink_checks_session_order() {
    let mut group = dl21seq::Dl21Seq::new();
    group.setup().unwrap();
    let mut key = dl21seq::MemberKey::blank();
    enroll(&mut group, &mut key);

    let scope = dl21seq::DEFAULT_SCOPE;
    let texts: [&[u8]; 3] = [b"Hello world!", b"World hello!", b"! hello world"];

    let in_order: Vec<_> = (0..3)
        .map(|i| group.sign_state(texts[i], &key, scope, i as i64).unwrap())
        .collect();
    let items: Vec<(&[u8], &dl21seq::Signature)> = texts
        .iter()
        .copied()
        .zip(in_order.iter())
        .collect();

    let proof = group
        .seqlink(b"password", scope, &items, &key)
        .unwrap()
        .expect("seqlink refused our own signatures");
    assert!(group
        .seqlink_verify(b"password", scope, &items, &proof)
        .unwrap()
        .is_valid());

    // swapped states break the chain
    let swapped_states = [0i64, 2, 1];
    let swapped: Vec<_> = (0..3)
        .map(|i| {
            group
                .sign_state(texts[i], &key, scope, swapped_states[i])
                .unwrap()
        })
        .collect();
    let items: Vec<(&[u8], &dl21seq::Signature)> =
        texts.iter().copied().zip(swapped.iter()).collect();
    let proof = group
        .seqlink(b"password", scope, &items, &key)
        .unwrap()
        .unwrap();
    assert!(!group
        .seqlink_verify(b"password", scope, &items, &proof)
        .unwrap()
        .is_valid());

    // skipping a state breaks it too
    let skipped_states = [0i64, 1, 3];
    let skipped: Vec<_> = (0..3)
        .map(|i| {
            group
                .sign_state(texts[i], &key, scope, skipped_states[i])
                .unwrap()
        })
        .collect();
    let items: Vec<(&[u8], &dl21seq::Signature)> =
        texts.iter().copied().zip(skipped.iter()).collect();
    let proof = group
        .seqlink(b"password", scope, &items, &key)
        .unwrap()
        .unwrap();
    assert!(!group
        .seqlink_verify(b"password", scope, &items, &proof)
        .unwrap()
        .is_valid());
}

#[test]
fn registry_resolves_and_validates() {
    let mut any = registry::group("BBS04").unwrap();
    any.setup().unwrap();
    assert_eq!(any.join_seq(), 1);

    let (group, key) = group_with_member(bbs04::Bbs04::new, bbs04::MemberKey::blank);
    let grpkey_b64 = group.group_key().unwrap().to_b64();
    let sig_b64 = group.sign(b"Hello world!", &key).unwrap().to_b64();

    registry::key("bbs04", KeyKind::Group)
        .unwrap()
        .check(&grpkey_b64)
        .unwrap();
    registry::signature("bbs04").unwrap().check(&sig_b64).unwrap();

    // wrong scheme or kind is a mismatch
    assert!(registry::key("ps16", KeyKind::Group)
        .unwrap()
        .check(&grpkey_b64)
        .is_err());
    assert!(registry::key("bbs04", KeyKind::Member)
        .unwrap()
        .check(&grpkey_b64)
        .is_err());
    assert!(registry::signature("gl19").unwrap().check(&sig_b64).is_err());
}

#[test]
fn ledgers_snapshot_and_restore() {
    let mut group = cpy06::Cpy06::new();
    group.setup().unwrap();
    let mut sigs = Vec::new();
    for i in 0..2 {
        let mut key = cpy06::MemberKey::blank();
        enroll(&mut group, &mut key);
        sigs.push(
            group
                .sign(format!("Hello world {i}!").as_bytes(), &key)
                .unwrap(),
        );
    }
    for sig in &sigs {
        let id = group.open(sig).unwrap().unwrap();
        group.reveal(&id).unwrap();
    }

    let gml_b64 = group.gml().to_b64();
    let restored: Ledger<cpy06::GmlEntry> =
        Ledger::from_b64(&gml_b64, ContainerKind::Gml).unwrap();
    assert_eq!(&restored, group.gml());

    let crl_b64 = group.crl().to_b64();
    let restored: Ledger<cpy06::GmlEntry> =
        Ledger::from_b64(&crl_b64, ContainerKind::Crl).unwrap();
    assert_eq!(&restored, group.crl());

    // a CRL snapshot does not pass for a GML
    assert!(Ledger::<cpy06::GmlEntry>::from_b64(&crl_b64, ContainerKind::Gml).is_err());
    // nor does another scheme's ledger
    assert!(Ledger::<ps16::GmlEntry>::from_b64(&gml_b64, ContainerKind::Gml).is_err());
}
