//! Lookups and resumable searches over a built trie.

use super::build::label_cache_slot;
use super::state::{History, State, Status, INVALID_KEY_ID, INVALID_LINK_ID};
use super::LoudsTrie;
use crate::error::{Error, Result};

impl LoudsTrie {
    /// Id of the key equal to `query`.
    pub fn lookup(&self, query: &[u8], state: &mut State) -> Option<usize> {
        state.lookup_init();
        while state.query_pos < query.len() {
            if !self.find_child(query, state) {
                return None;
            }
        }
        self.key_id(state.node_id)
    }

    /// Restore key `id` into `state.key_buf`.
    ///
    /// # Errors
    ///
    /// [`Error::Bound`] if `id >= num_keys()`.
    pub fn reverse_lookup(&self, id: usize, state: &mut State) -> Result<()> {
        let num_keys = self.num_keys();
        if id >= num_keys {
            return Err(Error::Bound {
                index: id,
                len: num_keys,
            });
        }
        state.reverse_lookup_init();

        // Labels are collected leaf to root, then flipped.
        let mut node = self.terminal_flags.select1_unchecked(id);
        state.node_id = node;
        if node == 0 {
            return Ok(());
        }
        loop {
            if self.link_flags.get(node) {
                let start = state.key_buf.len();
                self.restore_link(&mut state.key_buf, self.get_link(node));
                state.key_buf[start..].reverse();
            } else {
                state.key_buf.push(self.bases[node]);
            }

            if node <= self.num_l1_nodes {
                state.key_buf.reverse();
                return Ok(());
            }
            node = self.parent_of(node);
            state.node_id = node;
        }
    }

    /// Next key that is a prefix of `query`, shortest first.
    ///
    /// Returns the key id and the key's length. Once exhausted, keeps
    /// returning `None` until the state is reset.
    pub fn common_prefix_search(&self, query: &[u8], state: &mut State) -> Option<(usize, usize)> {
        if state.status == Status::EndOfCommonPrefixSearch {
            return None;
        }

        if state.status != Status::ReadyToCommonPrefixSearch {
            state.common_prefix_search_init();
            if let Some(id) = self.key_id(state.node_id) {
                return Some((id, state.query_pos));
            }
        }

        while state.query_pos < query.len() {
            if !self.find_child(query, state) {
                state.status = Status::EndOfCommonPrefixSearch;
                return None;
            }
            if let Some(id) = self.key_id(state.node_id) {
                return Some((id, state.query_pos));
            }
        }
        state.status = Status::EndOfCommonPrefixSearch;
        None
    }

    /// Next key starting with `query`, written to `state.key_buf`.
    ///
    /// Keys come out depth first, in child order. Once exhausted, keeps
    /// returning `None` until the state is reset.
    pub fn predictive_search(&self, query: &[u8], state: &mut State) -> Option<usize> {
        if state.status == Status::EndOfPredictiveSearch {
            return None;
        }

        if state.status != Status::ReadyToPredictiveSearch {
            state.predictive_search_init();
            while state.query_pos < query.len() {
                if !self.predictive_find_child(query, state) {
                    state.status = Status::EndOfPredictiveSearch;
                    return None;
                }
            }

            state.history.push(History {
                node_id: state.node_id as u32,
                key_pos: state.key_buf.len() as u32,
                ..History::default()
            });
            state.history_pos = 1;

            if let Some(id) = self.key_id(state.node_id) {
                return Some(id);
            }
        }

        loop {
            let pos = state.history_pos;
            if pos == state.history.len() {
                let parent = state.history[pos - 1].node_id as usize;
                let louds_pos = self.louds.select0_unchecked(parent) + 1;
                state.history.push(History {
                    node_id: (louds_pos - parent - 1) as u32,
                    louds_pos: louds_pos as u32,
                    ..History::default()
                });
            }

            // A frame that ran off its sibling block already points at the
            // next node's children, so it is reused as is.
            let next = &mut state.history[pos];
            let has_child = self.louds.get(next.louds_pos as usize);
            next.louds_pos += 1;
            if has_child {
                state.history_pos += 1;
                let node = next.node_id as usize;
                if self.link_flags.get(node) {
                    let link_id = self.next_link_id(
                        (next.link_id != INVALID_LINK_ID).then_some(next.link_id as usize),
                        node,
                    );
                    next.link_id = link_id as u32;
                    self.restore_link(&mut state.key_buf, self.link_at(node, link_id));
                } else {
                    state.key_buf.push(self.bases[node]);
                }
                next.key_pos = state.key_buf.len() as u32;

                if self.terminal_flags.get(node) {
                    next.key_id = if next.key_id == INVALID_KEY_ID {
                        self.terminal_flags.rank1_unchecked(node) as u32
                    } else {
                        next.key_id + 1
                    };
                    return Some(next.key_id as usize);
                }
            } else if pos != 1 {
                state.history[pos - 1].node_id += 1;
                let key_pos = state.history[pos - 2].key_pos as usize;
                state.key_buf.truncate(key_pos);
                state.history_pos -= 1;
            } else {
                state.status = Status::EndOfPredictiveSearch;
                return None;
            }
        }
    }

    #[inline]
    fn key_id(&self, node: usize) -> Option<usize> {
        self.terminal_flags
            .get(node)
            .then(|| self.terminal_flags.rank1_unchecked(node))
    }

    /// Follow the edge labelled by the next query byte.
    fn find_child(&self, query: &[u8], state: &mut State) -> bool {
        debug_assert!(state.query_pos < query.len());

        let label = query[state.query_pos];
        let entry = self.cache[label_cache_slot(state.node_id, label, self.cache_mask)];
        if entry.parent() == state.node_id {
            if entry.is_link() {
                if !self.match_link(query, state, entry.link()) {
                    return false;
                }
            } else {
                state.query_pos += 1;
            }
            state.node_id = entry.child();
            return true;
        }

        let mut louds_pos = self.louds.select0_unchecked(state.node_id) + 1;
        if !self.louds.get(louds_pos) {
            return false;
        }
        state.node_id = louds_pos - state.node_id - 1;
        let mut link_id = None;
        loop {
            let node = state.node_id;
            if self.link_flags.get(node) {
                let id = self.next_link_id(link_id, node);
                link_id = Some(id);
                let prev_query_pos = state.query_pos;
                if self.match_link(query, state, self.link_at(node, id)) {
                    return true;
                }
                // A partial match rules out every sibling.
                if state.query_pos != prev_query_pos {
                    return false;
                }
            } else if self.bases[node] == label {
                state.query_pos += 1;
                return true;
            }
            state.node_id += 1;
            louds_pos += 1;
            if !self.louds.get(louds_pos) {
                return false;
            }
        }
    }

    /// [`find_child`](Self::find_child), also copying labels into the key
    /// buffer and accepting a query that ends inside a link.
    fn predictive_find_child(&self, query: &[u8], state: &mut State) -> bool {
        debug_assert!(state.query_pos < query.len());

        let label = query[state.query_pos];
        let entry = self.cache[label_cache_slot(state.node_id, label, self.cache_mask)];
        if entry.parent() == state.node_id {
            if entry.is_link() {
                if !self.prefix_match_link(query, state, entry.link()) {
                    return false;
                }
            } else {
                state.key_buf.push(entry.label());
                state.query_pos += 1;
            }
            state.node_id = entry.child();
            return true;
        }

        let mut louds_pos = self.louds.select0_unchecked(state.node_id) + 1;
        if !self.louds.get(louds_pos) {
            return false;
        }
        state.node_id = louds_pos - state.node_id - 1;
        let mut link_id = None;
        loop {
            let node = state.node_id;
            if self.link_flags.get(node) {
                let id = self.next_link_id(link_id, node);
                link_id = Some(id);
                let prev_query_pos = state.query_pos;
                if self.prefix_match_link(query, state, self.link_at(node, id)) {
                    return true;
                }
                if state.query_pos != prev_query_pos {
                    return false;
                }
            } else if self.bases[node] == label {
                state.key_buf.push(label);
                state.query_pos += 1;
                return true;
            }
            state.node_id += 1;
            louds_pos += 1;
            if !self.louds.get(louds_pos) {
                return false;
            }
        }
    }

    fn restore_link(&self, key_buf: &mut Vec<u8>, link: usize) {
        match &self.next {
            Some(next) => next.restore_node(key_buf, link),
            None => self.tail.restore(key_buf, link),
        }
    }

    fn match_link(&self, query: &[u8], state: &mut State, link: usize) -> bool {
        match &self.next {
            Some(next) => next.match_node(query, state, link),
            None => self.tail.match_at(query, state, link),
        }
    }

    fn prefix_match_link(&self, query: &[u8], state: &mut State, link: usize) -> bool {
        match &self.next {
            Some(next) => next.prefix_match_node(query, state, link),
            None => self.tail.prefix_match_at(query, state, link),
        }
    }

    /// Append the label spelled from `node` up to the root.
    fn restore_node(&self, key_buf: &mut Vec<u8>, mut node: usize) {
        debug_assert_ne!(node, 0);
        loop {
            let entry = self.cache[node & self.cache_mask];
            if node == entry.child() {
                if entry.is_link() {
                    self.restore_link(key_buf, entry.link());
                } else {
                    key_buf.push(entry.label());
                }
                node = entry.parent();
                if node == 0 {
                    return;
                }
                continue;
            }

            if self.link_flags.get(node) {
                self.restore_link(key_buf, self.get_link(node));
            } else {
                key_buf.push(self.bases[node]);
            }
            if node <= self.num_l1_nodes {
                return;
            }
            node = self.parent_of(node);
        }
    }

    /// Match the label spelled from `node` up to the root against the query.
    fn match_node(&self, query: &[u8], state: &mut State, mut node: usize) -> bool {
        debug_assert!(state.query_pos < query.len());
        debug_assert_ne!(node, 0);
        loop {
            let entry = self.cache[node & self.cache_mask];
            if node == entry.child() {
                if entry.is_link() {
                    if !self.match_link(query, state, entry.link()) {
                        return false;
                    }
                } else if query[state.query_pos] == entry.label() {
                    state.query_pos += 1;
                } else {
                    return false;
                }
                node = entry.parent();
                if node == 0 {
                    return true;
                }
                if state.query_pos >= query.len() {
                    return false;
                }
                continue;
            }

            if self.link_flags.get(node) {
                if !self.match_link(query, state, self.get_link(node)) {
                    return false;
                }
            } else if query[state.query_pos] == self.bases[node] {
                state.query_pos += 1;
            } else {
                return false;
            }
            if node <= self.num_l1_nodes {
                return true;
            }
            if state.query_pos >= query.len() {
                return false;
            }
            node = self.parent_of(node);
        }
    }

    /// Like [`match_node`](Self::match_node), but copies the label into the
    /// key buffer and succeeds when the query ends inside it.
    fn prefix_match_node(&self, query: &[u8], state: &mut State, mut node: usize) -> bool {
        debug_assert!(state.query_pos < query.len());
        debug_assert_ne!(node, 0);
        loop {
            let entry = self.cache[node & self.cache_mask];
            if node == entry.child() {
                if entry.is_link() {
                    if !self.prefix_match_link(query, state, entry.link()) {
                        return false;
                    }
                } else if query[state.query_pos] == entry.label() {
                    state.key_buf.push(entry.label());
                    state.query_pos += 1;
                } else {
                    return false;
                }
                node = entry.parent();
                if node == 0 {
                    return true;
                }
            } else {
                if self.link_flags.get(node) {
                    if !self.prefix_match_link(query, state, self.get_link(node)) {
                        return false;
                    }
                } else if query[state.query_pos] == self.bases[node] {
                    state.key_buf.push(self.bases[node]);
                    state.query_pos += 1;
                } else {
                    return false;
                }
                if node <= self.num_l1_nodes {
                    return true;
                }
                node = self.parent_of(node);
            }

            if state.query_pos >= query.len() {
                self.restore_node(&mut state.key_buf, node);
                return true;
            }
        }
    }

    #[inline]
    fn parent_of(&self, node: usize) -> usize {
        self.louds.select1_unchecked(node) - node - 1
    }

    /// Link of `node`, its rank among link nodes computed from scratch.
    #[inline]
    fn get_link(&self, node: usize) -> usize {
        self.link_at(node, self.link_flags.rank1_unchecked(node))
    }

    /// Link of `node`, given that it is link node number `link_id`.
    #[inline]
    fn link_at(&self, node: usize, link_id: usize) -> usize {
        self.bases[node] as usize | (self.extras.get(link_id) as usize) << 8
    }

    /// Rank of `node` among link nodes, reusing the previous sibling's.
    #[inline]
    fn next_link_id(&self, link_id: Option<usize>, node: usize) -> usize {
        match link_id {
            Some(id) => id + 1,
            None => self.link_flags.rank1_unchecked(node),
        }
    }
}
