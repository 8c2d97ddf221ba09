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

//! Pairing-based group signatures over BLS12-381.
//!
//! Each scheme lets an enrolled member sign anonymously on behalf of a group,
//! lets anyone holding the group public key verify the signature, and gives a
//! designated authority (or the signer itself) a scheme-specific way to break
//! or relate anonymity after the fact: opening (BBS04, PS16, CPY06, KLAP20),
//! tracing revoked members (CPY06), self-identification and linking (DL21,
//! DL21SEQ) or blind conversion (GL19).
//!
//! Schemes are driven through the [`scheme::Scheme`] trait; serialized keys
//! and signatures travel as base64 [`container::Container`] values; scheme
//! instances are resolved by name through [`registry`].

#![allow(non_snake_case)]

pub mod container;
pub mod errors;
pub mod gml;
pub mod registry;
pub mod scheme;
pub mod spk;
pub mod utils;

pub mod bbs04;
pub mod cpy06;
pub mod dl21;
pub mod dl21seq;
pub mod gl19;
pub mod klap20;
pub mod ps16;
