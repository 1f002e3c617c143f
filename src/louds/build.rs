//! Level-by-level construction.
//!
//! Each level is built breadth first from a sorted run of keys. Wherever
//! all keys below an edge agree on more than one byte, the edge becomes a
//! link and the shared bytes are handed to the next level (or the tail) as
//! a new key. The next level reports where each handed-down key ended so
//! this level can record the link.

use std::collections::VecDeque;

use tracing::{debug, trace};

use super::cache::{CacheEntry, INVALID_EXTRA};
use super::key::{Key, KeyView, ReverseKey};
use super::sort;
use super::tail::Tail;
use super::LoudsTrie;
use crate::bits::{BitVectorBuilder, FlatVector};
use crate::config::TrieConfig;
use crate::error::Result;
use crate::keyset::Keyset;
use crate::RankSelect;

/// Keys `[begin, end)` that agree on their first `key_pos` bytes.
#[derive(Clone, Copy, Debug)]
struct Range {
    begin: usize,
    end: usize,
    key_pos: usize,
}

#[derive(Clone, Copy, Debug)]
struct WeightedRange {
    range: Range,
    weight: f32,
}

/// Build the whole trie from `keyset` and assign every key its id.
pub(crate) fn build(keyset: &mut Keyset, config: &TrieConfig) -> Result<LoudsTrie> {
    config.validate()?;

    let keys: Vec<Key<'_>> = keyset
        .iter()
        .map(|entry| Key::new(entry.as_bytes(), entry.weight()))
        .collect();
    let (mut trie, terminals) = build_level(keys, config, 1)?;

    let mut pairs: Vec<(u32, u32)> = terminals
        .iter()
        .enumerate()
        .map(|(i, &terminal)| (terminal, i as u32))
        .collect();
    pairs.sort_unstable();

    // One flag per node plus a trailing zero guarding the last node.
    let mut terminal_flags = BitVectorBuilder::new();
    let mut node_id = 0usize;
    for &(terminal, _) in &pairs {
        let terminal = terminal as usize;
        while node_id < terminal {
            terminal_flags.push(false);
            node_id += 1;
        }
        if node_id == terminal {
            terminal_flags.push(true);
            node_id += 1;
        }
    }
    while node_id < trie.bases.len() {
        terminal_flags.push(false);
        node_id += 1;
    }
    terminal_flags.push(false);
    trie.terminal_flags = terminal_flags.build(false, true)?;

    for &(terminal, index) in &pairs {
        let id = trie.terminal_flags.rank1(terminal as usize);
        keyset.set_id(index as usize, id);
    }

    debug!(
        num_keys = trie.num_keys(),
        num_tries = trie.num_tries(),
        "finished top-level terminal flags"
    );
    Ok(trie)
}

/// Build level `trie_id` and everything below it.
///
/// Returns the level together with, for each input key in input order, the
/// node where that key ends.
fn build_level<const REVERSED: bool>(
    mut keys: Vec<KeyView<'_, REVERSED>>,
    config: &TrieConfig,
    trie_id: u32,
) -> Result<(LoudsTrie, Vec<u32>)> {
    for (i, key) in keys.iter_mut().enumerate() {
        key.set_id(i);
    }
    let num_distinct = sort::sort(&mut keys);

    let mut cache = new_cache(config, trie_id, num_distinct);
    let cache_mask = cache.len() - 1;

    let mut louds = BitVectorBuilder::new();
    let mut link_flags = BitVectorBuilder::new();
    let mut bases: Vec<u8> = Vec::new();
    let mut num_l1_nodes = 0usize;
    let mut next_keys: Vec<KeyView<'_, REVERSED>> = Vec::new();

    louds.push(true);
    louds.push(false);
    bases.push(0);
    link_flags.push(false);

    let mut queue = VecDeque::new();
    let mut w_ranges: Vec<WeightedRange> = Vec::new();
    queue.push_back(Range {
        begin: 0,
        end: keys.len(),
        key_pos: 0,
    });
    while !queue.is_empty() {
        // Nodes are numbered in queue order.
        let node_id = link_flags.len() - queue.len();
        let Some(mut range) = queue.pop_front() else {
            break;
        };

        while range.begin < range.end && keys[range.begin].len() == range.key_pos {
            keys[range.begin].set_terminal(node_id);
            range.begin += 1;
        }
        if range.begin == range.end {
            louds.push(false);
            continue;
        }

        w_ranges.clear();
        let mut weight = f64::from(keys[range.begin].weight());
        for i in range.begin + 1..range.end {
            if keys[i - 1].at(range.key_pos) != keys[i].at(range.key_pos) {
                w_ranges.push(WeightedRange {
                    range: Range { end: i, ..range },
                    weight: weight as f32,
                });
                range.begin = i;
                weight = 0.0;
            }
            weight += f64::from(keys[i].weight());
        }
        w_ranges.push(WeightedRange {
            range,
            weight: weight as f32,
        });
        if config.node_order == crate::config::NodeOrder::Weight {
            // Stable, so equal weights keep label order.
            w_ranges.sort_by(|a, b| b.weight.total_cmp(&a.weight));
        }

        if node_id == 0 {
            num_l1_nodes = w_ranges.len();
        }

        for w_range in &w_ranges {
            let Range { begin, end, .. } = w_range.range;
            let first = keys[begin];
            let label_pos = w_range.range.key_pos;
            let mut key_pos = label_pos + 1;
            while key_pos < first.len()
                && (begin + 1..end).all(|j| keys[j - 1].at(key_pos) == keys[j].at(key_pos))
            {
                key_pos += 1;
            }

            let label = first.at(label_pos);
            let child = bases.len();
            let slot = if REVERSED {
                child & cache_mask
            } else {
                label_cache_slot(node_id, label, cache_mask)
            };
            cache[slot].offer(node_id, child, w_range.weight);

            if key_pos == label_pos + 1 {
                bases.push(label);
                link_flags.push(false);
            } else {
                bases.push(0);
                link_flags.push(true);
                let mut next_key = first.substr(label_pos, key_pos - label_pos);
                next_key.set_weight(w_range.weight);
                next_keys.push(next_key);
            }
            queue.push_back(Range {
                begin,
                end,
                key_pos,
            });
            louds.push(true);
        }
        louds.push(false);
    }
    louds.push(false);
    let louds = louds.build(trie_id == 1, true)?;

    let mut terminals = vec![0u32; keys.len()];
    for key in &keys {
        terminals[key.id()] = key.terminal();
    }
    drop(keys);

    // Hand the multi-byte labels down, reversed.
    let mut next = None;
    let mut tail = Tail::default();
    let mut next_terminals = Vec::new();
    if !next_keys.is_empty() {
        let mut reversed: Vec<ReverseKey<'_>> =
            next_keys.iter().map(|key| key.reversed()).collect();
        drop(next_keys);
        if trie_id == config.num_tries {
            let (built, offsets) = Tail::build(&mut reversed, config.tail_mode)?;
            tail = built;
            next_terminals = offsets;
        } else {
            let (level, level_terminals) = build_level(reversed, config, trie_id + 1)?;
            next = Some(Box::new(level));
            next_terminals = level_terminals;
        }
    }

    let level_config = match &next {
        Some(next) => TrieConfig {
            num_tries: next.num_tries() + 1,
            cache_level: next.cache_level(),
            tail_mode: next.tail_mode(),
            node_order: next.node_order(),
        },
        None => TrieConfig {
            num_tries: 1,
            cache_level: config.cache_level,
            tail_mode: tail.mode(),
            node_order: config.node_order,
        },
    };

    let link_flags = link_flags.build(false, false)?;
    let mut node_id = 0usize;
    for terminal in next_terminals.iter_mut() {
        while !link_flags.get(node_id) {
            node_id += 1;
        }
        bases[node_id] = (*terminal % 256) as u8;
        *terminal /= 256;
        node_id += 1;
    }
    let extras = FlatVector::build(&next_terminals);

    for entry in cache.iter_mut() {
        let child = entry.child();
        if child == 0 {
            entry.clear();
        } else {
            let extra = if link_flags.get(child) {
                extras.get(link_flags.rank1(child))
            } else {
                INVALID_EXTRA
            };
            entry.set_link(bases[child], extra);
        }
    }

    let trie = LoudsTrie {
        louds,
        terminal_flags: Default::default(),
        link_flags,
        bases: bases.into(),
        extras,
        tail,
        next,
        cache: cache.into(),
        cache_mask,
        num_l1_nodes,
        config: level_config,
    };
    debug!(
        trie_id,
        num_nodes = trie.num_nodes(),
        num_links = trie.link_flags.num_1s(),
        cache_slots = cache_mask + 1,
        "built trie level"
    );
    Ok((trie, terminals))
}

/// Cache sized by the number of distinct keys and the cache level.
fn new_cache(config: &TrieConfig, trie_id: u32, num_keys: usize) -> Vec<CacheEntry> {
    let mut size = if trie_id == 1 { 256 } else { 1 };
    while size < num_keys / config.cache_level.divisor() {
        size *= 2;
    }
    trace!(trie_id, size, "reserved transition cache");
    vec![CacheEntry::default(); size]
}

/// Cache slot of the edge leaving `node_id` with `label`.
#[inline]
pub(super) fn label_cache_slot(node_id: usize, label: u8, mask: usize) -> usize {
    (node_id ^ (node_id << 5) ^ label as usize) & mask
}
