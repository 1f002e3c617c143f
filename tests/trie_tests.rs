//! Integration tests for building, searching and persisting tries.

use std::fs;

use succinct_trie::{
    Agent, CacheLevel, Error, Keyset, MapOptions, NodeOrder, TailMode, Trie, TrieConfig,
};
use tempfile::tempdir;

fn keyset(words: &[&str]) -> Keyset {
    words.iter().collect()
}

fn predictive(trie: &Trie, query: &str) -> Vec<String> {
    let mut agent = Agent::new();
    agent.set_query(query);
    let mut out = Vec::new();
    while trie.predictive_search(&mut agent).unwrap() {
        out.push(agent.key().as_str().unwrap().to_owned());
    }
    out
}

fn check_scenario(trie: &Trie) {
    assert_eq!(trie.num_keys(), 4);
    let mut agent = Agent::new();
    for (word, id) in [("check", 0), ("chat", 1), ("bach", 2), ("bet", 3)] {
        agent.set_query(word);
        assert!(trie.lookup(&mut agent).unwrap(), "lookup {word}");
        assert_eq!(agent.key().id(), id);
    }
    assert_eq!(predictive(trie, "c"), ["check", "chat"]);
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_weight_order_scenario() {
    let mut keys = keyset(&["bach", "bet", "chat", "check", "check"]);
    let trie = Trie::build(&mut keys, TrieConfig::default().with_num_tries(1)).unwrap();

    assert_eq!(trie.num_nodes(), 7);
    check_scenario(&trie);
    let ids: Vec<usize> = keys.iter().map(|key| key.id()).collect();
    assert_eq!(ids, [2, 3, 1, 0, 0]);

    let mut agent = Agent::new();
    agent.set_query_id(1);
    trie.reverse_lookup(&mut agent).unwrap();
    assert_eq!(agent.key().as_str(), Some("chat"));
    assert_eq!(agent.key().id(), 1);
}

#[test]
fn test_label_order_scenario() {
    let mut keys = keyset(&["bach", "bet", "chat", "check"]);
    let config = TrieConfig::default().with_node_order(NodeOrder::Label);
    let trie = Trie::build(&mut keys, config).unwrap();

    let ids: Vec<usize> = keys.iter().map(|key| key.id()).collect();
    assert_eq!(ids, [0, 1, 2, 3]);
    assert_eq!(trie.node_order(), Some(NodeOrder::Label));
    assert_eq!(predictive(&trie, ""), ["bach", "bet", "chat", "check"]);
}

#[test]
fn test_label_order_ids_number_nodes_breadth_first() {
    let mut keys = keyset(&["a", "ab", "b"]);
    let config = TrieConfig::default().with_node_order(NodeOrder::Label);
    let trie = Trie::build(&mut keys, config).unwrap();

    let ids: Vec<usize> = keys.iter().map(|key| key.id()).collect();
    assert_eq!(ids, [0, 2, 1]);

    let mut agent = Agent::new();
    let mut found = Vec::new();
    while trie.predictive_search(&mut agent).unwrap() {
        found.push((agent.key().as_str().unwrap().to_owned(), agent.key().id()));
    }
    assert_eq!(
        found,
        [("a".to_owned(), 0), ("ab".to_owned(), 2), ("b".to_owned(), 1)]
    );
}

#[test]
fn test_empty_build() {
    let mut keys = Keyset::new();
    let trie = Trie::build(&mut keys, TrieConfig::default()).unwrap();
    assert_eq!(trie.num_nodes(), 1);
    assert_eq!(trie.num_keys(), 0);
    assert!(trie.is_empty());

    let mut agent = Agent::new();
    for query in ["", "a"] {
        agent.set_query(query);
        assert!(!trie.lookup(&mut agent).unwrap());
        assert!(!trie.common_prefix_search(&mut agent).unwrap());
        assert!(!trie.predictive_search(&mut agent).unwrap());
    }
    agent.set_query_id(0);
    assert!(matches!(
        trie.reverse_lookup(&mut agent),
        Err(Error::Bound { index: 0, len: 0 })
    ));
}

#[test]
fn test_search_before_build() {
    let trie = Trie::new();
    let mut agent = Agent::new();
    agent.set_query("x");
    assert!(matches!(trie.lookup(&mut agent), Err(Error::State(_))));
    assert!(matches!(trie.predictive_search(&mut agent), Err(Error::State(_))));
}

#[test]
fn test_empty_key_is_a_prefix_of_everything() {
    let mut keys = keyset(&["", "a", "ab"]);
    let trie = Trie::build(&mut keys, TrieConfig::default()).unwrap();
    let mut agent = Agent::new();
    agent.set_query("abc");
    let mut lens = Vec::new();
    while trie.common_prefix_search(&mut agent).unwrap() {
        lens.push(agent.key().len());
    }
    assert_eq!(lens, [0, 1, 2]);
}

#[test]
fn test_invalid_config_is_rejected() {
    let mut keys = keyset(&["a"]);
    let config = TrieConfig::default().with_num_tries(0);
    assert!(matches!(Trie::build(&mut keys, config), Err(Error::Range(_))));
    assert!(matches!(TrieConfig::from_flags(0x4_0000), Err(Error::Code(_))));
}

// ============================================================================
// Multi-level tries and tails
// ============================================================================

fn url_like_keys() -> Vec<String> {
    let hosts = ["example.com", "example.org", "rust-lang.org", "docs.rs"];
    let mut keys = Vec::new();
    for (h, host) in hosts.iter().enumerate() {
        for page in 0..150 {
            keys.push(format!("https://{host}/section-{}/page-{page:04}.html", (page + h) % 9));
        }
    }
    keys
}

#[test]
fn test_every_level_count() {
    let words = url_like_keys();
    for num_tries in 1..=5 {
        let mut keys: Keyset = words.iter().collect();
        let config = TrieConfig::default().with_num_tries(num_tries);
        let trie = Trie::build(&mut keys, config).unwrap();
        assert!(trie.num_tries() <= num_tries as usize);
        assert_eq!(trie.num_keys(), words.len());

        let mut agent = Agent::new();
        for key in keys.iter() {
            agent.set_query(key.as_bytes());
            assert!(trie.lookup(&mut agent).unwrap());
            assert_eq!(agent.key().id(), key.id());
            agent.set_query_id(key.id());
            trie.reverse_lookup(&mut agent).unwrap();
            assert_eq!(agent.key().as_bytes(), key.as_bytes());
        }

        let expected = words.iter().filter(|w| w.starts_with("https://docs.rs/section-3/")).count();
        assert_eq!(predictive(&trie, "https://docs.rs/section-3/").len(), expected);
    }
}

#[test]
fn test_nul_bytes_force_binary_tail() {
    let words: [&[u8]; 4] = [b"a\0b", b"a\0bc", b"zz\0\0", b"plain"];
    let mut keys: Keyset = words.iter().collect();
    let config = TrieConfig::default()
        .with_num_tries(1)
        .with_tail_mode(TailMode::Text);
    let trie = Trie::build(&mut keys, config).unwrap();
    assert_eq!(trie.tail_mode(), Some(TailMode::Binary));

    let mut bytes = Vec::new();
    trie.write(&mut bytes).unwrap();
    let trie = Trie::from_bytes(&bytes).unwrap();

    let mut agent = Agent::new();
    for key in keys.iter() {
        agent.set_query_id(key.id());
        trie.reverse_lookup(&mut agent).unwrap();
        assert_eq!(agent.key().as_bytes(), key.as_bytes());
    }
    agent.set_query(b"a\0");
    let mut found = Vec::new();
    while trie.predictive_search(&mut agent).unwrap() {
        found.push(agent.key().as_bytes().to_vec());
    }
    found.sort();
    assert_eq!(found, [b"a\0b".to_vec(), b"a\0bc".to_vec()]);
}

#[test]
fn test_text_tail_without_nul() {
    let mut keys = keyset(&["alpha", "beta", "gamma"]);
    let trie = Trie::build(&mut keys, TrieConfig::default().with_num_tries(1)).unwrap();
    assert_eq!(trie.tail_mode(), Some(TailMode::Text));
}

#[test]
fn test_cache_levels_agree() {
    let words = url_like_keys();
    let mut reference: Option<Vec<usize>> = None;
    for level in [
        CacheLevel::Huge,
        CacheLevel::Large,
        CacheLevel::Normal,
        CacheLevel::Small,
        CacheLevel::Tiny,
    ] {
        let mut keys: Keyset = words.iter().collect();
        let trie = Trie::build(&mut keys, TrieConfig::default().with_cache_level(level)).unwrap();
        assert_eq!(trie.cache_level(), Some(level));
        let ids: Vec<usize> = keys.iter().map(|key| key.id()).collect();
        match &reference {
            Some(expected) => assert_eq!(&ids, expected),
            None => reference = Some(ids),
        }
    }
}

// ============================================================================
// Agents
// ============================================================================

#[test]
fn test_cloned_agent_continues_independently() {
    let words = ["tea", "ted", "ten", "to", "toe", "ton"];
    let mut keys = keyset(&words);
    let trie = Trie::build(&mut keys, TrieConfig::default()).unwrap();

    let mut agent = Agent::new();
    agent.set_query("t");
    assert!(trie.predictive_search(&mut agent).unwrap());
    assert!(trie.predictive_search(&mut agent).unwrap());
    let mut copy = agent.clone();
    assert_eq!(copy.key(), agent.key());

    let drain = |trie: &Trie, agent: &mut Agent| {
        let mut rest = Vec::new();
        while trie.predictive_search(agent).unwrap() {
            rest.push(agent.key().as_str().unwrap().to_owned());
        }
        rest
    };
    let original_rest = drain(&trie, &mut agent);
    assert_eq!(original_rest.len(), words.len() - 2);
    assert_eq!(drain(&trie, &mut copy), original_rest);
}

#[test]
fn test_new_query_restarts_search() {
    let mut keys = keyset(&["a", "ab", "abc"]);
    let trie = Trie::build(&mut keys, TrieConfig::default()).unwrap();
    let mut agent = Agent::new();
    agent.set_query("abc");
    assert!(trie.common_prefix_search(&mut agent).unwrap());
    assert_eq!(agent.key().as_bytes(), b"a");

    agent.set_query("ab");
    let mut lens = Vec::new();
    while trie.common_prefix_search(&mut agent).unwrap() {
        lens.push(agent.key().len());
    }
    assert_eq!(lens, [1, 2]);
}

// ============================================================================
// Persistence
// ============================================================================

#[test]
fn test_file_round_trips() {
    let words = url_like_keys();
    let mut keys: Keyset = words.iter().collect();
    let trie = Trie::build(&mut keys, TrieConfig::default()).unwrap();

    let dir = tempdir().unwrap();
    let path = dir.path().join("urls.trie");
    trie.save(&path).unwrap();
    assert_eq!(fs::metadata(&path).unwrap().len() as usize, trie.io_size());

    let loaded = Trie::load(&path).unwrap();
    let mapped = Trie::mmap(&path).unwrap();
    let populated = Trie::mmap_with(&path, MapOptions::default().populate(true)).unwrap();
    let streamed = Trie::read(fs::File::open(&path).unwrap()).unwrap();

    for restored in [&loaded, &mapped, &populated, &streamed] {
        assert_eq!(restored.num_keys(), trie.num_keys());
        assert_eq!(restored.num_nodes(), trie.num_nodes());
        assert_eq!(restored.io_size(), trie.io_size());
        let mut agent = Agent::new();
        for key in keys.iter().step_by(17) {
            agent.set_query(key.as_bytes());
            assert!(restored.lookup(&mut agent).unwrap());
            assert_eq!(agent.key().id(), key.id());
        }
        assert_eq!(
            predictive(restored, "https://example.org/section-1/"),
            predictive(&trie, "https://example.org/section-1/")
        );
    }

    // A mapped trie writes out the same bytes it was mapped from.
    let mut rewritten = Vec::new();
    mapped.write(&mut rewritten).unwrap();
    assert_eq!(rewritten, fs::read(&path).unwrap());
}

#[test]
fn test_corrupted_header_is_rejected() {
    let mut keys = keyset(&["one", "two", "three"]);
    let trie = Trie::build(&mut keys, TrieConfig::default()).unwrap();
    let mut bytes = Vec::new();
    trie.write(&mut bytes).unwrap();
    bytes[3] ^= 0xFF;

    assert!(matches!(Trie::from_bytes(&bytes), Err(Error::Format(_))));
    assert!(matches!(Trie::read(&bytes[..]), Err(Error::Format(_))));

    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.trie");
    fs::write(&path, &bytes).unwrap();
    assert!(matches!(Trie::mmap(&path), Err(Error::Format(_))));
}

#[test]
fn test_undefined_config_flags_are_rejected() {
    let mut keys = keyset(&["one", "two", "three"]);
    let trie = Trie::build(&mut keys, TrieConfig::default().with_num_tries(1)).unwrap();
    let mut bytes = Vec::new();
    trie.write(&mut bytes).unwrap();

    // The flag word is the final u32.
    let end = bytes.len();
    bytes[end - 1] = 0x80;
    assert!(matches!(Trie::from_bytes(&bytes), Err(Error::Code(_))));
}

#[test]
fn test_truncated_stream_is_io_error() {
    let mut keys = keyset(&["one", "two", "three"]);
    let trie = Trie::build(&mut keys, TrieConfig::default()).unwrap();
    let mut bytes = Vec::new();
    trie.write(&mut bytes).unwrap();
    bytes.truncate(bytes.len() - 4);
    assert!(matches!(Trie::read(&bytes[..]), Err(Error::Io(_))));
    assert!(matches!(Trie::from_bytes(&bytes), Err(Error::Format(_))));
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("absent.trie");
    assert!(matches!(Trie::load(&path), Err(Error::Io(_))));
    assert!(matches!(Trie::mmap(&path), Err(Error::Io(_))));
}

#[cfg(feature = "large-tests")]
#[test]
fn test_million_keys() {
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    let mut rng = ChaCha8Rng::seed_from_u64(0x5EED);
    let words: Vec<String> = (0..1_000_000)
        .map(|_| {
            let len = rng.gen_range(1..24);
            (0..len).map(|_| rng.gen_range(b'a'..=b'p') as char).collect()
        })
        .collect();
    let mut keys: Keyset = words.iter().collect();
    let trie = Trie::build(&mut keys, TrieConfig::default()).unwrap();

    let mut agent = Agent::new();
    for key in keys.iter().step_by(101) {
        agent.set_query(key.as_bytes());
        assert!(trie.lookup(&mut agent).unwrap());
        assert_eq!(agent.key().id(), key.id());
    }
}
