use std::fmt;

/// Identifier of a node in the instance graph.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

/// Index of an edge slot inside one of the directional edge arrays.
///
/// An `EdgeId` is only meaningful together with a direction (forward or
/// backward array); the same numeric value addresses different edges in
/// each array.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeId(pub u32);

/// Sentinel for "no node". Also the wildcard in witness cache removal.
pub const INVALID_NODE_ID: NodeId = NodeId(u32::MAX);

/// Sentinel for "no edge slot".
pub const INVALID_EDGE_ID: EdgeId = EdgeId(u32::MAX);

impl NodeId {
    #[inline]
    pub fn idx(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self != INVALID_NODE_ID
    }
}

impl EdgeId {
    #[inline]
    pub fn idx(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self != INVALID_EDGE_ID
    }
}

impl From<usize> for NodeId {
    fn from(v: usize) -> Self {
        NodeId(v as u32)
    }
}

impl From<usize> for EdgeId {
    fn from(v: usize) -> Self {
        EdgeId(v as u32)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
