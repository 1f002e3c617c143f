//! Resumable search cursor.

/// Sentinel for a link id that has not been computed yet.
pub(crate) const INVALID_LINK_ID: u32 = u32::MAX;

/// Sentinel for a key id that has not been computed yet.
pub(crate) const INVALID_KEY_ID: u32 = u32::MAX;

/// Where a resumable search stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Status {
    ReadyToAll,
    ReadyToCommonPrefixSearch,
    ReadyToPredictiveSearch,
    EndOfCommonPrefixSearch,
    EndOfPredictiveSearch,
}

/// One frame of the predictive search's depth-first walk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct History {
    pub node_id: u32,
    pub louds_pos: u32,
    pub key_pos: u32,
    pub link_id: u32,
    pub key_id: u32,
}

impl Default for History {
    fn default() -> Self {
        Self {
            node_id: 0,
            louds_pos: 0,
            key_pos: 0,
            link_id: INVALID_LINK_ID,
            key_id: INVALID_KEY_ID,
        }
    }
}

/// Per-agent search state.
///
/// A state is reused across searches; each search kind resets the fields it
/// needs when it starts, and suspended searches pick up where they stopped.
#[derive(Clone, Debug)]
pub(crate) struct State {
    pub key_buf: Vec<u8>,
    pub history: Vec<History>,
    pub node_id: usize,
    pub query_pos: usize,
    pub history_pos: usize,
    pub status: Status,
}

impl Default for State {
    fn default() -> Self {
        Self {
            key_buf: Vec::new(),
            history: Vec::new(),
            node_id: 0,
            query_pos: 0,
            history_pos: 0,
            status: Status::ReadyToAll,
        }
    }
}

impl State {
    /// Forget any suspended search.
    pub fn reset(&mut self) {
        self.status = Status::ReadyToAll;
    }

    pub fn lookup_init(&mut self) {
        self.node_id = 0;
        self.query_pos = 0;
        self.status = Status::ReadyToAll;
    }

    pub fn reverse_lookup_init(&mut self) {
        self.key_buf.clear();
        self.key_buf.reserve(32);
        self.status = Status::ReadyToAll;
    }

    pub fn common_prefix_search_init(&mut self) {
        self.node_id = 0;
        self.query_pos = 0;
        self.status = Status::ReadyToCommonPrefixSearch;
    }

    pub fn predictive_search_init(&mut self) {
        self.key_buf.clear();
        self.key_buf.reserve(64);
        self.history.clear();
        self.history.reserve(4);
        self.node_id = 0;
        self.query_pos = 0;
        self.history_pos = 0;
        self.status = Status::ReadyToPredictiveSearch;
    }
}
