//! Field paths.
//!
//! A `FieldPath` records where in the record tree a violation occurred:
//! an ordered sequence of map keys and list indices. Rendering is stable
//! for a given path (`profile.distances[3]`), so paths are safe to log
//! and to compare across runs.

use std::fmt;

/// One step of a path: a map key or a list index.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Segment {
    Field(String),
    Index(usize),
}

/// An ordered path from the record root down to one value.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct FieldPath {
    segments: Vec<Segment>,
}

impl FieldPath {
    /// The empty path, pointing at the record root.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Extend with a map key, returning the child path.
    pub fn field(&self, name: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(Segment::Field(name.into()));
        Self { segments }
    }

    /// Extend with a list index, returning the child path.
    pub fn index(&self, i: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(Segment::Index(i));
        Self { segments }
    }

    /// The last segment, if any.
    pub fn leaf(&self) -> Option<&Segment> {
        self.segments.last()
    }

    /// The last map-key segment, skipping over trailing list indices.
    ///
    /// `profile.distances[3]` resolves to `distances`; useful for keying
    /// per-field lookups off element-level paths.
    pub fn leaf_field(&self) -> Option<&str> {
        self.segments.iter().rev().find_map(|seg| match seg {
            Segment::Field(name) => Some(name.as_str()),
            Segment::Index(_) => None,
        })
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("<root>");
        }
        let mut first = true;
        for seg in &self.segments {
            match seg {
                Segment::Field(name) => {
                    if !first {
                        f.write_str(".")?;
                    }
                    f.write_str(name)?;
                }
                Segment::Index(i) => write!(f, "[{i}]")?,
            }
            first = false;
        }
        Ok(())
    }
}
