//! Force layout: a fixed-budget spring/repulsion/centering simulation.
//!
//! Only person nodes are simulated. A connection to a talk fans out into one
//! simulated link per speaker of that talk; speaker-of edges add no links.
//! Talks are placed after the run: under their speakers' centroid, or on a
//! ring around the center when they have no speaker.
//!
//! The stopping rule is the iteration count, never convergence.

use std::collections::{HashMap, HashSet};
use std::f64::consts::TAU;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::constants::{
    ALPHA_MIN, CENTER_STRENGTH, MAX_LINK_DISTANCE, MAX_STEP, MIN_DISTANCE, SPRING_STRENGTH,
    TALK_OFFSET, VELOCITY_DECAY,
};
use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::graph::{Edge, EdgeKind, Node, NodeId, NodeKind};
use crate::layout::{Layout, Position};

/// Caller-supplied simulation parameters. Identical config and input give
/// identical output.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForceConfig {
    /// Rest length of every simulated link.
    pub link_distance: f64,
    /// Pairwise repulsion strength; force falls off as `repulsion / distance`.
    pub repulsion: f64,
    pub center: Position,
    pub iterations: usize,
    pub seed: u64,
}

impl Default for ForceConfig {
    fn default() -> Self {
        Self {
            link_distance: 120.0,
            repulsion: 1500.0,
            center: Position::default(),
            iterations: 300,
            seed: 42,
        }
    }
}

impl ForceConfig {
    /// Replace values the simulation cannot use, reporting each one.
    fn sanitized(&self, diagnostics: &mut Vec<Diagnostic>) -> Self {
        let fallback = Self::default();
        let mut cfg = self.clone();
        if !cfg.link_distance.is_finite() || cfg.link_distance < 0.0 {
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::NumericGuard,
                None,
                format!(
                    "link distance {} replaced with {}",
                    cfg.link_distance, fallback.link_distance
                ),
            ));
            cfg.link_distance = fallback.link_distance;
        } else if cfg.link_distance > MAX_LINK_DISTANCE {
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::NumericGuard,
                None,
                format!(
                    "link distance {} clamped to {MAX_LINK_DISTANCE}",
                    cfg.link_distance
                ),
            ));
            cfg.link_distance = MAX_LINK_DISTANCE;
        }
        if !cfg.repulsion.is_finite() || cfg.repulsion < 0.0 {
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::NumericGuard,
                None,
                format!("repulsion {} clamped to 0", cfg.repulsion),
            ));
            cfg.repulsion = 0.0;
        }
        if !cfg.center.is_finite() {
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::NumericGuard,
                None,
                "non-finite center replaced with origin",
            ));
            cfg.center = Position::default();
        }
        cfg
    }
}

pub fn layout_force(nodes: &[Node], edges: &[Edge], config: &ForceConfig) -> Layout {
    let mut diagnostics = Vec::new();
    let cfg = config.sanitized(&mut diagnostics);

    let node_index: HashMap<&NodeId, usize> =
        nodes.iter().enumerate().map(|(i, n)| (&n.id, i)).collect();
    // node index -> simulation body index
    let bodies: Vec<usize> = nodes
        .iter()
        .enumerate()
        .filter(|(_, n)| n.kind() == NodeKind::Person)
        .map(|(i, _)| i)
        .collect();
    let body_of: HashMap<usize, usize> = bodies.iter().enumerate().map(|(b, &i)| (i, b)).collect();
    let body = |id: &NodeId| node_index.get(id).and_then(|i| body_of.get(i)).copied();

    let mut links: Vec<(usize, usize)> = Vec::new();
    for edge in edges {
        match edge.kind {
            EdgeKind::SpeakerOf => {}
            EdgeKind::ConnectionToPerson => {
                if let (Some(s), Some(t)) = (body(&edge.source), body(&edge.target))
                    && s != t
                {
                    links.push((s, t));
                }
            }
            EdgeKind::ConnectionToTalk => {
                let Some(author) = body(&edge.source) else {
                    continue;
                };
                let speakers = node_index
                    .get(&edge.target)
                    .map(|&i| nodes[i].speakers())
                    .unwrap_or_default();
                let before = links.len();
                for speaker in speakers {
                    if let Some(s) = body(&NodeId::person(speaker))
                        && s != author
                    {
                        links.push((author, s));
                    }
                }
                if links.len() == before {
                    diagnostics.push(Diagnostic::new(
                        DiagnosticKind::UnsimulatedLink,
                        Some(edge.id.as_str()),
                        format!("{} has no other speaker to link to", edge.target),
                    ));
                }
            }
        }
    }

    let mut sim = Simulation::seeded(bodies.len(), &cfg);
    let guarded = sim.run(&links, &cfg);
    for b in guarded {
        diagnostics.push(Diagnostic::new(
            DiagnosticKind::NumericGuard,
            Some(nodes[bodies[b]].id.to_string().as_str()),
            "non-finite position reset",
        ));
    }

    let mut positions: Vec<Position> = vec![cfg.center; nodes.len()];
    for (b, &i) in bodies.iter().enumerate() {
        positions[i] = sim.positions[b];
    }
    place_talks(nodes, &mut positions, &body_of, &node_index, &cfg);

    // No non-finite position is returned, talks included.
    for (node, position) in nodes.iter().zip(positions.iter_mut()) {
        if !position.is_finite() {
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::NumericGuard,
                Some(node.id.to_string().as_str()),
                "non-finite position replaced with center",
            ));
            *position = cfg.center;
        }
    }

    tracing::debug!(
        "force layout: {} bodies, {} links, {} iterations, {} diagnostics",
        bodies.len(),
        links.len(),
        cfg.iterations,
        diagnostics.len()
    );

    Layout {
        nodes: nodes
            .iter()
            .zip(positions)
            .map(|(n, position)| {
                let mut node = n.clone();
                node.position = position;
                node
            })
            .collect(),
        diagnostics,
    }
}

/// Talks with speakers sit under the speakers' centroid; the rest are spaced
/// evenly on a ring around the center.
fn place_talks(
    nodes: &[Node],
    positions: &mut [Position],
    body_of: &HashMap<usize, usize>,
    node_index: &HashMap<&NodeId, usize>,
    cfg: &ForceConfig,
) {
    let mut orphans = Vec::new();
    for (i, node) in nodes.iter().enumerate() {
        if node.kind() != NodeKind::Talk {
            continue;
        }
        let anchors: Vec<Position> = node
            .speakers()
            .iter()
            .filter_map(|s| node_index.get(&NodeId::person(s)).copied())
            .filter(|j| body_of.contains_key(j))
            .map(|j| positions[j])
            .collect();
        if anchors.is_empty() {
            orphans.push(i);
            continue;
        }
        let sum = anchors.iter().fold(Position::default(), |acc, &p| acc + p);
        positions[i] = sum.scale(1.0 / anchors.len() as f64) + Position::new(0.0, TALK_OFFSET);
    }

    let radius = 2.0 * cfg.link_distance.max(MIN_DISTANCE);
    let count = orphans.len() as f64;
    for (k, i) in orphans.into_iter().enumerate() {
        let angle = TAU * k as f64 / count - TAU / 4.0;
        positions[i] = cfg.center + Position::new(angle.cos(), angle.sin()).scale(radius);
    }
}

struct Simulation {
    positions: Vec<Position>,
    velocities: Vec<Position>,
}

impl Simulation {
    /// Scatter bodies around the center from the configured seed.
    fn seeded(count: usize, cfg: &ForceConfig) -> Self {
        let mut rng = SmallRng::seed_from_u64(cfg.seed);
        let spread = cfg.link_distance.max(MIN_DISTANCE) * (count as f64).sqrt();
        let positions = (0..count)
            .map(|_| {
                let dx = (rng.random::<f64>() - 0.5) * spread;
                let dy = (rng.random::<f64>() - 0.5) * spread;
                cfg.center + Position::new(dx, dy)
            })
            .collect();
        Self {
            positions,
            velocities: vec![Position::default(); count],
        }
    }

    /// Run the full iteration budget. Returns bodies that had to be reset.
    fn run(&mut self, links: &[(usize, usize)], cfg: &ForceConfig) -> Vec<usize> {
        let mut guarded: HashSet<usize> = HashSet::new();
        if cfg.iterations == 0 || self.positions.is_empty() {
            return Vec::new();
        }

        let alpha_decay = 1.0 - ALPHA_MIN.powf(1.0 / cfg.iterations as f64);
        let mut alpha = 1.0;
        for _ in 0..cfg.iterations {
            self.step(links, cfg, alpha, &mut guarded);
            alpha -= alpha * alpha_decay;
        }

        let mut guarded: Vec<usize> = guarded.into_iter().collect();
        guarded.sort_unstable();
        guarded
    }

    fn step(
        &mut self,
        links: &[(usize, usize)],
        cfg: &ForceConfig,
        alpha: f64,
        guarded: &mut HashSet<usize>,
    ) {
        let n = self.positions.len();
        let mut forces = vec![Position::default(); n];

        for i in 0..n {
            for j in (i + 1)..n {
                let (dir, dist) = direction(self.positions[i], self.positions[j], i, j);
                let push = dir.scale(cfg.repulsion * alpha / dist.max(MIN_DISTANCE));
                forces[i] = forces[i] - push;
                forces[j] = forces[j] + push;
            }
        }

        for &(s, t) in links {
            let (dir, dist) = direction(self.positions[s], self.positions[t], s, t);
            let pull = dir.scale((dist - cfg.link_distance) * SPRING_STRENGTH * alpha * 0.5);
            forces[s] = forces[s] + pull;
            forces[t] = forces[t] - pull;
        }

        for (i, force) in forces.iter_mut().enumerate() {
            *force = *force + (cfg.center - self.positions[i]).scale(CENTER_STRENGTH * alpha);
        }

        for i in 0..n {
            let mut v = (self.velocities[i] + forces[i]).scale(1.0 - VELOCITY_DECAY);
            if !v.is_finite() {
                v = Position::default();
                guarded.insert(i);
            }
            let speed = v.length();
            if speed > MAX_STEP {
                v = v.scale(MAX_STEP / speed);
            }
            let next = self.positions[i] + v;
            if next.is_finite() {
                self.positions[i] = next;
                self.velocities[i] = v;
            } else {
                self.positions[i] = cfg.center + fallback_direction(i, i + 1).scale(MIN_DISTANCE);
                self.velocities[i] = Position::default();
                guarded.insert(i);
            }
        }
    }
}

/// Unit vector from `a` to `b` and the distance between them. Coincident
/// points get a fixed direction derived from their indices.
fn direction(a: Position, b: Position, i: usize, j: usize) -> (Position, f64) {
    let delta = b - a;
    let dist = delta.length();
    if dist > 1e-9 && dist.is_finite() {
        (delta.scale(1.0 / dist), dist)
    } else {
        (fallback_direction(i, j), 0.0)
    }
}

fn fallback_direction(i: usize, j: usize) -> Position {
    let angle = (i as f64 * 0.618_034 + j as f64 * 0.414_214) * TAU;
    Position::new(angle.cos(), angle.sin())
}
