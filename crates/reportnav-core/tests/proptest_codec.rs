use proptest::prelude::*;
use reportnav_core::params::{FragmentParams, KEY_QUERY, parse, serialize};
use reportnav_core::toggle_token;

fn arb_params() -> impl Strategy<Value = FragmentParams> {
    // Small key alphabet so duplicate keys show up often.
    let key = prop::sample::select(vec!["q", "anchor", "testId", "run", "k"]);
    let value = "[A-Za-z0-9 :@&=+%#?/\"-]{0,12}";
    prop::collection::vec((key, value), 0..8)
        .prop_map(|pairs| pairs.into_iter().collect::<FragmentParams>())
}

fn arb_token() -> impl Strategy<Value = String> {
    prop_oneof![
        "s:[a-z]{1,8}",
        "p:[a-z]{1,8}",
        "@[a-z]{1,8}",
        "[a-z]{1,8}",
    ]
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(2000))]

    #[test]
    fn serialize_then_parse_round_trips(params in arb_params()) {
        prop_assert_eq!(parse(&serialize(&params)), params.clone());
        prop_assert_eq!(parse(&params.to_fragment()), params);
    }

    #[test]
    fn parse_is_total(raw in ".{0,64}") {
        let params = parse(&raw);
        // Whatever came out encodes to something that parses back to itself.
        prop_assert_eq!(parse(&serialize(&params)), params);
    }

    #[test]
    fn plain_toggle_is_idempotent(
        existing in prop::collection::vec(arb_token(), 0..6),
        token in arb_token(),
    ) {
        let mut params = FragmentParams::new();
        params.append(KEY_QUERY, existing.join(" "));

        let once = toggle_token(&params, &token, false);
        let twice = toggle_token(&parse(once.as_str()), &token, false);
        prop_assert_eq!(&once, &twice);

        let parsed = parse(twice.as_str());
        let query = parsed.get(KEY_QUERY).unwrap_or_default();
        let occurrences = query.split(' ').filter(|t| *t == token).count();
        prop_assert_eq!(occurrences, 1);
    }

    #[test]
    fn additive_toggle_twice_restores_membership(
        existing in prop::collection::btree_set(arb_token(), 0..6),
        token in arb_token(),
    ) {
        let existing: Vec<String> = existing.into_iter().collect();
        let mut params = FragmentParams::new();
        params.append(KEY_QUERY, existing.join(" "));

        let once = toggle_token(&params, &token, true);
        let twice = toggle_token(&parse(once.as_str()), &token, true);

        let had = existing.contains(&token);
        let query = parse(twice.as_str()).get(KEY_QUERY).unwrap_or_default().to_string();
        prop_assert_eq!(query.split(' ').any(|t| t == token), had);
    }
}
