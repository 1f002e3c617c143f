//! Property-based tests comparing trie searches against a sorted set.

use std::collections::{BTreeMap, BTreeSet};

use proptest::prelude::*;
use succinct_trie::{Agent, CacheLevel, Keyset, NodeOrder, TailMode, Trie, TrieConfig};

fn config_strategy() -> impl Strategy<Value = TrieConfig> {
    (
        1u32..=4,
        prop_oneof![
            Just(CacheLevel::Huge),
            Just(CacheLevel::Normal),
            Just(CacheLevel::Tiny)
        ],
        prop_oneof![Just(TailMode::Text), Just(TailMode::Binary)],
        prop_oneof![Just(NodeOrder::Label), Just(NodeOrder::Weight)],
    )
        .prop_map(|(num_tries, cache_level, tail_mode, node_order)| {
            TrieConfig::default()
                .with_num_tries(num_tries)
                .with_cache_level(cache_level)
                .with_tail_mode(tail_mode)
                .with_node_order(node_order)
        })
}

/// Short keys over a small alphabet, so prefixes and shared suffixes abound.
fn keys_strategy() -> impl Strategy<Value = Vec<(Vec<u8>, f32)>> {
    prop::collection::vec(
        (
            prop::collection::vec(prop::sample::select(b"abc\0xyz".to_vec()), 0..12),
            0.0f32..10.0,
        ),
        0..120,
    )
}

/// Keys with small integer weights, so sibling weights sum exactly and tie
/// often.
fn integer_weighted_keys() -> impl Strategy<Value = Vec<(Vec<u8>, f32)>> {
    prop::collection::vec(
        (
            prop::collection::vec(prop::sample::select(b"abc\0xyz".to_vec()), 0..10),
            (0u8..6).prop_map(f32::from),
        ),
        0..120,
    )
}

/// Depth-first enumeration of a byte trie holding `keys`, visiting each node
/// before its children and children heaviest first, ties by byte.
fn weight_ordered(keys: &[(Vec<u8>, f32)], query: &[u8]) -> Vec<Vec<u8>> {
    let mut weights: BTreeMap<Vec<u8>, f64> = BTreeMap::new();
    for (key, weight) in keys {
        *weights.entry(key.clone()).or_default() += f64::from(*weight);
    }
    let subtree_weight = |prefix: &[u8]| -> f64 {
        weights
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(_, weight)| *weight)
            .sum()
    };

    let mut out = Vec::new();
    let mut stack = vec![query.to_vec()];
    while let Some(prefix) = stack.pop() {
        if weights.contains_key(&prefix) {
            out.push(prefix.clone());
        }
        let labels: BTreeSet<u8> = weights
            .keys()
            .filter(|key| key.len() > prefix.len() && key.starts_with(&prefix))
            .map(|key| key[prefix.len()])
            .collect();
        let mut children: Vec<(Vec<u8>, f64)> = labels
            .into_iter()
            .map(|label| {
                let mut child = prefix.clone();
                child.push(label);
                let weight = subtree_weight(&child);
                (child, weight)
            })
            .collect();
        children.sort_by(|a, b| b.1.total_cmp(&a.1));
        stack.extend(children.into_iter().rev().map(|(child, _)| child));
    }
    out
}

fn build(keys: &[(Vec<u8>, f32)], config: TrieConfig) -> (Trie, Keyset) {
    let mut keyset = Keyset::new();
    for (key, weight) in keys {
        keyset.push_weighted(key, *weight).unwrap();
    }
    let trie = Trie::build(&mut keyset, config).unwrap();
    (trie, keyset)
}

fn predictive(trie: &Trie, query: &[u8]) -> Vec<(usize, Vec<u8>)> {
    let mut agent = Agent::new();
    agent.set_query(query);
    let mut out = Vec::new();
    while trie.predictive_search(&mut agent).unwrap() {
        out.push((agent.key().id(), agent.key().as_bytes().to_vec()));
    }
    out
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Every key looks up to its assigned id, and the id restores the key
    #[test]
    fn prop_lookup_reverse_lookup(keys in keys_strategy(), config in config_strategy()) {
        let (trie, keyset) = build(&keys, config);
        let distinct: BTreeSet<&[u8]> = keys.iter().map(|(key, _)| key.as_slice()).collect();
        prop_assert_eq!(trie.num_keys(), distinct.len());

        let mut agent = Agent::new();
        for entry in keyset.iter() {
            agent.set_query(entry.as_bytes());
            prop_assert!(trie.lookup(&mut agent).unwrap());
            prop_assert_eq!(agent.key().id(), entry.id());
            prop_assert_eq!(agent.key().as_bytes(), entry.as_bytes());

            agent.set_query_id(entry.id());
            trie.reverse_lookup(&mut agent).unwrap();
            prop_assert_eq!(agent.key().as_bytes(), entry.as_bytes());
        }

        let ids: BTreeSet<usize> = keyset.iter().map(|entry| entry.id()).collect();
        prop_assert_eq!(ids, (0..distinct.len()).collect::<BTreeSet<_>>());
    }

    /// Strings outside the keyset are never found
    #[test]
    fn prop_lookup_rejects_absent(
        keys in keys_strategy(),
        probes in prop::collection::vec(prop::collection::vec(prop::sample::select(b"abcz".to_vec()), 0..14), 0..40),
        config in config_strategy(),
    ) {
        let (trie, _) = build(&keys, config);
        let present: BTreeSet<&[u8]> = keys.iter().map(|(key, _)| key.as_slice()).collect();
        let mut agent = Agent::new();
        for probe in &probes {
            agent.set_query(probe);
            prop_assert_eq!(trie.lookup(&mut agent).unwrap(), present.contains(probe.as_slice()));
        }
    }

    /// Common-prefix search reports every prefix key, shortest first
    #[test]
    fn prop_common_prefix_search(
        keys in keys_strategy(),
        query in prop::collection::vec(prop::sample::select(b"abc\0xyz".to_vec()), 0..16),
        config in config_strategy(),
    ) {
        let (trie, _) = build(&keys, config);
        let present: BTreeSet<&[u8]> = keys.iter().map(|(key, _)| key.as_slice()).collect();
        let expected: Vec<usize> = (0..=query.len())
            .filter(|&len| present.contains(&query[..len]))
            .collect();

        let mut agent = Agent::new();
        agent.set_query(&query);
        let mut found = Vec::new();
        while trie.common_prefix_search(&mut agent).unwrap() {
            let key = agent.key();
            prop_assert_eq!(key.as_bytes(), &query[..key.len()]);
            found.push(key.len());
        }
        prop_assert_eq!(found, expected);
        prop_assert!(!trie.common_prefix_search(&mut agent).unwrap());
    }

    /// Predictive search reports exactly the keys extending the query
    #[test]
    fn prop_predictive_search(
        keys in keys_strategy(),
        query in prop::collection::vec(prop::sample::select(b"abc\0xyz".to_vec()), 0..4),
        config in config_strategy(),
    ) {
        let (trie, _) = build(&keys, config);
        let expected: BTreeSet<Vec<u8>> = keys
            .iter()
            .filter(|(key, _)| key.starts_with(&query))
            .map(|(key, _)| key.clone())
            .collect();

        let found = predictive(&trie, &query);
        let mut agent = Agent::new();
        for (id, key) in &found {
            agent.set_query_id(*id);
            trie.reverse_lookup(&mut agent).unwrap();
            prop_assert_eq!(agent.key().as_bytes(), key.as_slice());
        }
        let found_set: BTreeSet<Vec<u8>> = found.iter().map(|(_, key)| key.clone()).collect();
        prop_assert_eq!(found.len(), found_set.len());
        prop_assert_eq!(found_set, expected);
    }

    /// Label order enumerates matching keys in sorted order
    #[test]
    fn prop_predictive_search_label_order(
        keys in keys_strategy(),
        query in prop::collection::vec(prop::sample::select(b"abc\0xyz".to_vec()), 0..3),
        num_tries in 1u32..=4,
    ) {
        let config = TrieConfig::default()
            .with_num_tries(num_tries)
            .with_node_order(NodeOrder::Label);
        let (trie, _) = build(&keys, config);
        let expected: Vec<Vec<u8>> = keys
            .iter()
            .map(|(key, _)| key.clone())
            .filter(|key| key.starts_with(&query))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let found: Vec<Vec<u8>> = predictive(&trie, &query).into_iter().map(|(_, key)| key).collect();
        prop_assert_eq!(found, expected);
    }

    /// Weight order enumerates heavier subtrees first, ties by byte
    #[test]
    fn prop_predictive_search_weight_order(
        keys in integer_weighted_keys(),
        query in prop::collection::vec(prop::sample::select(b"abc\0xyz".to_vec()), 0..3),
        num_tries in 1u32..=4,
    ) {
        let config = TrieConfig::default()
            .with_num_tries(num_tries)
            .with_node_order(NodeOrder::Weight);
        let (trie, _) = build(&keys, config);

        let found: Vec<Vec<u8>> = predictive(&trie, &query).into_iter().map(|(_, key)| key).collect();
        prop_assert_eq!(found, weight_ordered(&keys, &query));
    }

    /// Disabling the transition cache changes no result
    #[test]
    fn prop_cache_transparency(keys in keys_strategy(), config in config_strategy()) {
        let (trie, keyset) = build(&keys, config);
        let mut cold = trie.clone();
        cold.invalidate_cache();

        let mut warm_agent = Agent::new();
        let mut cold_agent = Agent::new();
        for entry in keyset.iter() {
            for agent in [&mut warm_agent, &mut cold_agent] {
                agent.set_query(entry.as_bytes());
            }
            prop_assert_eq!(trie.lookup(&mut warm_agent).unwrap(), cold.lookup(&mut cold_agent).unwrap());
            prop_assert_eq!(warm_agent.key().id(), cold_agent.key().id());
        }
        for query in [&b""[..], b"a", b"ab", b"x\0"] {
            prop_assert_eq!(predictive(&trie, query), predictive(&cold, query));
        }
    }

    /// Serialized bytes restore an equivalent trie
    #[test]
    fn prop_bytes_round_trip(keys in keys_strategy(), config in config_strategy()) {
        let (trie, keyset) = build(&keys, config);
        let mut bytes = Vec::new();
        trie.write(&mut bytes).unwrap();
        prop_assert_eq!(bytes.len(), trie.io_size());

        let restored = Trie::from_bytes(&bytes).unwrap();
        prop_assert_eq!(restored.num_keys(), trie.num_keys());
        prop_assert_eq!(restored.num_nodes(), trie.num_nodes());
        prop_assert_eq!(restored.num_tries(), trie.num_tries());
        let mut agent = Agent::new();
        for entry in keyset.iter() {
            agent.set_query(entry.as_bytes());
            prop_assert!(restored.lookup(&mut agent).unwrap());
            prop_assert_eq!(agent.key().id(), entry.id());
        }
    }
}
