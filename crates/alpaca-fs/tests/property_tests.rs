use alpaca_fs::{Format, parse_document};
use proptest::prelude::*;

proptest! {
    #[test]
    fn flat_mapping_round_trips_every_key(
        entries in proptest::collection::btree_map("[a-z]{1,8}", "[a-zA-Z0-9]{1,12}", 0..16)
    ) {
        let text: String = entries
            .iter()
            .map(|(k, v)| format!("\"{k}\": \"{v}\"\n"))
            .collect();

        let map = parse_document("generated", Format::Yaml, &text).unwrap();

        prop_assert_eq!(map.len(), entries.len());
        for (k, v) in &entries {
            prop_assert_eq!(map.get(k), Some(v.as_str()));
        }
    }

    #[test]
    fn parsing_is_deterministic(
        entries in proptest::collection::btree_map("[a-z]{1,6}", "[a-z0-9]{0,6}", 0..10)
    ) {
        let body: String = entries
            .iter()
            .map(|(k, v)| format!("  \"{k}\": \"{v}\"\n"))
            .collect();
        let text = format!("outer:\n{body}");

        let first = parse_document("generated", Format::Yaml, &text).unwrap();
        let second = parse_document("generated", Format::Yaml, &text).unwrap();
        prop_assert_eq!(first, second);
    }
}
