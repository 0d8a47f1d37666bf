//! Lazily rendered parameter paths (`jobKey`, `clusters[2]`, `order.1`).
//!
//! Paths are linked through stack borrows and only turned into strings when
//! an error is reported.

use std::fmt;

#[derive(Debug, Clone, Copy)]
enum Segment<'a> {
    Name(&'a str),
    Index(usize),
    Field(usize),
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Path<'a> {
    parent: Option<&'a Path<'a>>,
    segment: Segment<'a>,
}

impl<'a> Path<'a> {
    pub(crate) fn root(name: &'a str) -> Self {
        Self {
            parent: None,
            segment: Segment::Name(name),
        }
    }

    /// Element `i` of an array.
    pub(crate) fn index(&'a self, i: usize) -> Path<'a> {
        Path {
            parent: Some(self),
            segment: Segment::Index(i),
        }
    }

    /// Component `i` of a tuple.
    pub(crate) fn field(&'a self, i: usize) -> Path<'a> {
        Path {
            parent: Some(self),
            segment: Segment::Field(i),
        }
    }
}

impl fmt::Display for Path<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(parent) = self.parent {
            write!(f, "{parent}")?;
        }
        match self.segment {
            Segment::Name(name) => write!(f, "{name}"),
            Segment::Index(i) => write!(f, "[{i}]"),
            Segment::Field(i) => write!(f, ".{i}"),
        }
    }
}
