//! Link registry and placement collaborators
//!
//! The core only asks the registry whether a link already joins two points
//! and records the links it creates. Instantiating the actual link object is
//! the placement sink's job.

use glam::Vec3;
use navlink_common::{Error, Result};

/// Opaque handle to a placed link, issued by the placement sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct LinkHandle(pub u64);

/// Kind of an accepted connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum LinkKind {
    /// Edge-to-edge jump or walk-across link
    Standard,
    /// One-way drop from an edge to ground found below it
    DropDown,
}

/// An accepted connection handed to the placement sink
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Connection {
    pub start: Vec3,
    pub end: Vec3,
    pub kind: LinkKind,
    /// Index of the source edge in the run's edge set
    pub source_edge: usize,
    /// Index of the target edge, `None` for drop-downs
    pub target_edge: Option<usize>,
}

impl Connection {
    pub fn length(&self) -> f32 {
        self.start.distance(self.end)
    }
}

/// A link known to the registry
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct LinkRecord {
    pub start: Vec3,
    pub end: Vec3,
    pub handle: LinkHandle,
    /// True for links created by the generator, false for hand-placed ones
    pub was_generated: bool,
}

impl LinkRecord {
    /// Whether this record joins the two points, in either direction
    pub fn joins(&self, a: Vec3, b: Vec3) -> bool {
        (self.start == a && self.end == b) || (self.start == b && self.end == a)
    }
}

/// Deduplication oracle and output sink for links
pub trait LinkRegistry {
    /// Whether a link joins `a` and `b` (symmetric, exact positions)
    fn exists(&self, a: Vec3, b: Vec3) -> bool;

    /// Records a link
    fn register(&mut self, record: LinkRecord);
}

/// Creates the concrete link object for an accepted connection
pub trait LinkPlacementSink {
    /// Whether links of this kind can be placed at all
    fn supports(&self, kind: LinkKind) -> bool;

    /// Places a link and returns its handle
    fn place(&mut self, connection: &Connection) -> Result<LinkHandle>;
}

/// Registry backed by a plain list of records
#[derive(Debug, Clone, Default)]
pub struct InMemoryLinkRegistry {
    records: Vec<LinkRecord>,
}

impl InMemoryLinkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[LinkRecord] {
        &self.records
    }

    /// Records created by the generator
    pub fn generated(&self) -> impl Iterator<Item = &LinkRecord> {
        self.records.iter().filter(|r| r.was_generated)
    }
}

impl LinkRegistry for InMemoryLinkRegistry {
    fn exists(&self, a: Vec3, b: Vec3) -> bool {
        self.records.iter().any(|r| r.joins(a, b))
    }

    fn register(&mut self, record: LinkRecord) {
        self.records.push(record);
    }
}

/// Placement sink that keeps every accepted connection in memory
#[derive(Debug, Clone)]
pub struct CollectingSink {
    connections: Vec<Connection>,
    standard_enabled: bool,
    drop_down_enabled: bool,
    next_handle: u64,
}

impl Default for CollectingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl CollectingSink {
    /// Creates a sink that accepts both link kinds
    pub fn new() -> Self {
        Self {
            connections: Vec::new(),
            standard_enabled: true,
            drop_down_enabled: true,
            next_handle: 1,
        }
    }

    /// Creates a sink that only accepts standard links
    pub fn standard_only() -> Self {
        Self {
            drop_down_enabled: false,
            ..Self::new()
        }
    }

    /// Creates a sink with no link kinds configured
    pub fn unconfigured() -> Self {
        Self {
            standard_enabled: false,
            drop_down_enabled: false,
            ..Self::new()
        }
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn into_connections(self) -> Vec<Connection> {
        self.connections
    }

    /// Connections of one kind
    pub fn of_kind(&self, kind: LinkKind) -> impl Iterator<Item = &Connection> {
        self.connections.iter().filter(move |c| c.kind == kind)
    }
}

impl LinkPlacementSink for CollectingSink {
    fn supports(&self, kind: LinkKind) -> bool {
        match kind {
            LinkKind::Standard => self.standard_enabled,
            LinkKind::DropDown => self.drop_down_enabled,
        }
    }

    fn place(&mut self, connection: &Connection) -> Result<LinkHandle> {
        if !self.supports(connection.kind) {
            return Err(Error::Placement(format!(
                "{:?} links are not configured",
                connection.kind
            )));
        }

        let handle = LinkHandle(self.next_handle);
        self.next_handle += 1;
        self.connections.push(connection.clone());
        Ok(handle)
    }
}
