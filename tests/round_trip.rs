//! Property tests for the encode/decode contract.
//!
//! Properties tested:
//! - Decoding a generated link recovers controller, action and params
//! - Cipher round trip; wrong key and mutated tokens are rejected
//! - Alias → canonical → alias for tables without shared targets
//! - Link generation is stable across calls and cache invalidation

use std::collections::BTreeMap;

use proptest::prelude::*;

use route_codec::codec::{pair, Cipher};
use route_codec::config::UrlType;
use route_codec::routing::AliasTable;
use route_codec::{Params, Scalar};

mod common;

// =============================================================================
// Generators
// =============================================================================

/// Values that exercise escaping in every grammar.
fn arb_value() -> impl Strategy<Value = String> {
    "[a-zA-Zé0-9 /?#%&=+._~-]{1,8}"
}

fn arb_values(max: usize) -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(arb_value(), 1..=max)
}

fn arb_url_type() -> impl Strategy<Value = UrlType> {
    prop::sample::select(UrlType::ALL.to_vec())
}

fn scalars(values: &[String]) -> Vec<Scalar> {
    values.iter().map(Scalar::from).collect()
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn prop_positional_round_trip(kind in arb_url_type(), values in arb_values(6)) {
        prop_assume!(!kind.is_keyed());
        let router = common::router(kind);

        let link = router.url("Main:plain", Params::list(values.clone())).unwrap();
        let decoded = router.decode_url(&link, false).unwrap();

        prop_assert_eq!(decoded.route.controller, "Main");
        prop_assert_eq!(decoded.route.action, "plain");
        prop_assert_eq!(decoded.route.params, Params::List(scalars(&values)));
    }

    #[test]
    fn prop_keyed_round_trip_pairs(
        keyed in prop::sample::select(vec![UrlType::QueryKeyed, UrlType::PathKeyed]),
        half in arb_values(4),
        other in arb_values(4),
    ) {
        let values: Vec<String> = half.iter().zip(other.iter())
            .flat_map(|(k, v)| [k.clone(), v.clone()])
            .collect();
        let router = common::router(keyed);

        let link = router.url("Main:plain", Params::list(values.clone())).unwrap();
        let decoded = router.decode_url(&link, false).unwrap();

        prop_assert_eq!(decoded.route.params, Params::Map(pair(&scalars(&values))));
    }

    #[test]
    fn prop_encrypted_round_trip(kind in arb_url_type(), values in arb_values(6)) {
        prop_assume!(!kind.is_keyed());
        let router = common::router(kind);

        let link = router.secure_url("Main:plain", Params::list(values.clone())).unwrap();
        let decoded = router.decode_url(&link, true).unwrap();

        prop_assert_eq!(decoded.route.params, Params::List(scalars(&values)));
    }

    #[test]
    fn prop_cipher_round_trip(payload in ".{0,64}", key in "[a-z]{1,12}") {
        let cipher = Cipher::new(&key);
        let token = cipher.encrypt(&payload);
        prop_assert_eq!(cipher.decrypt(&token).unwrap(), payload);
    }

    #[test]
    fn prop_cipher_rejects_wrong_key(payload in ".{0,64}", a in "[a-z]{1,12}", b in "[a-z]{1,12}") {
        prop_assume!(a != b);
        let token = Cipher::new(&a).encrypt(&payload);
        prop_assert!(Cipher::new(&b).decrypt(&token).is_err());
    }

    #[test]
    fn prop_cipher_rejects_mutation(payload in ".{0,64}", position in any::<prop::sample::Index>(), flip in 1u8..16) {
        let cipher = Cipher::new("key");
        let token = cipher.encrypt(&payload);

        let mut chars: Vec<char> = token.chars().collect();
        let i = position.index(chars.len());
        let nibble = chars[i].to_digit(16).unwrap() as u8;
        chars[i] = char::from_digit(u32::from(nibble ^ flip), 16).unwrap();
        let mutated: String = chars.into_iter().collect();

        prop_assert!(cipher.decrypt(&mutated).is_err());
    }

    #[test]
    fn prop_alias_round_trip(aliases in prop::collection::btree_set("[a-z]{1,8}", 0..8)) {
        let configured: BTreeMap<String, String> = aliases
            .iter()
            .enumerate()
            .map(|(i, alias)| (alias.clone(), format!("Main:action{i}")))
            .collect();
        let table = AliasTable::build(&configured);

        for alias in &aliases {
            let canonical = table.canonical(alias).unwrap();
            prop_assert_eq!(table.alias_for(canonical), Some(alias.as_str()));
        }
    }

    #[test]
    fn prop_links_are_stable(kind in arb_url_type(), values in arb_values(4), encrypt in any::<bool>()) {
        let router = common::router(kind);
        let link = |router: &route_codec::Router| {
            if encrypt {
                router.secure_url("Main:getUrlSecurityParams", Params::list(values.clone()))
            } else {
                router.url("Main:getUrlSecurityParams", Params::list(values.clone()))
            }
        };

        let first = link(&router).unwrap();
        prop_assert_eq!(&link(&router).unwrap(), &first);

        router.caches().invalidate_app(common::APP);
        prop_assert_eq!(&link(&router).unwrap(), &first);
    }
}
