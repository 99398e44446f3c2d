use crate::ids::{EdgeId, INVALID_EDGE_ID};

/// Adjacency cursors of one node.
///
/// A node does not own edge lists; it owns four cursors into the shared
/// forward/backward edge arrays. `fw_begin..fw_end` is the half-open
/// range of live outgoing edges, `bw_begin..bw_end` of live incoming
/// ones. Dummy slots sit outside these ranges.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Node {
    pub fw_begin: EdgeId,
    pub fw_end: EdgeId,
    pub bw_begin: EdgeId,
    pub bw_end: EdgeId,
}

impl Default for Node {
    fn default() -> Self {
        Node {
            fw_begin: INVALID_EDGE_ID,
            fw_end: INVALID_EDGE_ID,
            bw_begin: INVALID_EDGE_ID,
            bw_end: INVALID_EDGE_ID,
        }
    }
}

impl Node {
    pub fn nb_fw_edges(&self) -> u32 {
        if self.fw_end == INVALID_EDGE_ID {
            0
        } else {
            self.fw_end.0 - self.fw_begin.0
        }
    }

    pub fn nb_bw_edges(&self) -> u32 {
        if self.bw_end == INVALID_EDGE_ID {
            0
        } else {
            self.bw_end.0 - self.bw_begin.0
        }
    }
}
