use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

use crate::diagnostic::Diagnostic;
use crate::force::{ForceConfig, layout_force};
use crate::graph::{Graph, Node};
use crate::grouped::layout_grouped;

/// A point on the 2-D canvas. Renderers treat `y` as growing downward.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn length(self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn scale(self, k: f64) -> Self {
        Self::new(self.x * k, self.y * k)
    }
}

impl Add for Position {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Position {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Positioned nodes, in the same order as the input nodes, plus whatever
/// the pass had to report.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Layout {
    pub nodes: Vec<Node>,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum LayoutStrategy {
    Grouped,
    Force(ForceConfig),
}

/// Run one strategy over a built graph. The returned diagnostics are the
/// builder's followed by the layout's own.
pub fn layout(graph: &Graph, strategy: &LayoutStrategy) -> Layout {
    let mut out = match strategy {
        LayoutStrategy::Grouped => layout_grouped(&graph.nodes, &graph.edges),
        LayoutStrategy::Force(config) => layout_force(&graph.nodes, &graph.edges, config),
    };
    let mut diagnostics = graph.skipped.clone();
    diagnostics.append(&mut out.diagnostics);
    out.diagnostics = diagnostics;
    out
}
