//! Grouped layout: deterministic row and grid placement.
//!
//! Sections, top to bottom:
//! 1. speakers in one row, each with its first talk (by link order) beneath;
//! 2. everyone else in a `PEOPLE_COLUMNS`-wide grid;
//! 3. talks not yet placed in a `TALK_COLUMNS`-wide grid.
//!
//! A talk shared by several speakers goes under whichever speaker comes
//! first in node order and lists it first. Later speakers whose first talk
//! is taken get nothing beneath them; that talk is not retried with their
//! second talk. Edges never move nodes.

use std::collections::{HashMap, HashSet};

use crate::constants::{
    HORIZONTAL_GAP, MARGIN, PEOPLE_COLUMNS, PERSON_HEIGHT, PERSON_WIDTH, TALK_COLUMNS,
    TALK_HEIGHT, TALK_TUCK, TALK_WIDTH, VERTICAL_GAP,
};
use crate::graph::{Edge, Node, NodeId, NodeKind};
use crate::layout::{Layout, Position};

/// Accumulator threaded through the placement passes.
#[derive(Debug)]
struct LayoutContext<'a> {
    /// Top of the next section.
    cursor_y: f64,
    placed: HashMap<&'a NodeId, Position>,
}

impl<'a> LayoutContext<'a> {
    fn new() -> Self {
        Self {
            cursor_y: MARGIN,
            placed: HashMap::new(),
        }
    }

    fn place(&mut self, id: &'a NodeId, at: Position) {
        self.placed.insert(id, at);
    }

    fn is_placed(&self, id: &NodeId) -> bool {
        self.placed.contains_key(id)
    }
}

pub fn layout_grouped(nodes: &[Node], _edges: &[Edge]) -> Layout {
    let talk_ids: HashSet<&NodeId> = nodes
        .iter()
        .filter(|n| n.kind() == NodeKind::Talk)
        .map(|n| &n.id)
        .collect();

    let (speakers, others): (Vec<&Node>, Vec<&Node>) = nodes
        .iter()
        .filter(|n| n.kind() == NodeKind::Person)
        .partition(|n| n.is_speaker());

    let mut ctx = LayoutContext::new();
    place_speaker_row(&mut ctx, &speakers, &talk_ids);
    place_grid(
        &mut ctx,
        others.iter().map(|&n| &n.id),
        PEOPLE_COLUMNS,
        (PERSON_WIDTH, PERSON_HEIGHT),
    );

    let orphans: Vec<&NodeId> = nodes
        .iter()
        .filter(|n| n.kind() == NodeKind::Talk)
        .map(|n| &n.id)
        .filter(|id| !ctx.is_placed(id))
        .collect();
    place_grid(&mut ctx, orphans.into_iter(), TALK_COLUMNS, (TALK_WIDTH, TALK_HEIGHT));

    let positioned = nodes
        .iter()
        .map(|n| {
            let mut node = n.clone();
            node.position = ctx.placed.get(&n.id).copied().unwrap_or_default();
            node
        })
        .collect();

    tracing::debug!(
        "grouped layout: {} speakers, {} others, final cursor {}",
        speakers.len(),
        others.len(),
        ctx.cursor_y
    );

    Layout {
        nodes: positioned,
        diagnostics: Vec::new(),
    }
}

fn place_speaker_row<'a>(
    ctx: &mut LayoutContext<'a>,
    speakers: &[&'a Node],
    talk_ids: &HashSet<&'a NodeId>,
) {
    if speakers.is_empty() {
        return;
    }

    let mut x = MARGIN;
    let y = ctx.cursor_y;
    for &speaker in speakers {
        ctx.place(&speaker.id, Position::new(x, y));

        // Only the first linked talk is considered for the slot beneath.
        if let Some(first) = speaker.talks().first()
            && let Some(&talk) = talk_ids.get(&NodeId::talk(first))
            && !ctx.is_placed(talk)
        {
            let at = Position::new(
                x + (PERSON_WIDTH - TALK_WIDTH) / 2.0,
                y + PERSON_HEIGHT + VERTICAL_GAP - TALK_TUCK,
            );
            ctx.place(talk, at);
        }
        x += PERSON_WIDTH + HORIZONTAL_GAP;
    }

    ctx.cursor_y += PERSON_HEIGHT + TALK_HEIGHT + VERTICAL_GAP * 1.5;
}

/// Fill a fixed-column grid from the cursor and advance past its rows.
fn place_grid<'a>(
    ctx: &mut LayoutContext<'a>,
    ids: impl Iterator<Item = &'a NodeId>,
    columns: usize,
    (width, height): (f64, f64),
) {
    let mut count: usize = 0;
    for (i, id) in ids.enumerate() {
        let col = (i % columns) as f64;
        let row = (i / columns) as f64;
        let at = Position::new(
            MARGIN + col * (width + HORIZONTAL_GAP),
            ctx.cursor_y + row * (height + VERTICAL_GAP),
        );
        ctx.place(id, at);
        count += 1;
    }
    if count == 0 {
        return;
    }
    let rows = count.div_ceil(columns) as f64;
    ctx.cursor_y += rows * (height + VERTICAL_GAP) + VERTICAL_GAP;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{LabelField, Person, Talk, TalkSpeakerLink};
    use crate::graph::{Graph, build};
    use crate::normalize::normalize;

    fn graph(people: &[Person], talks: &[Talk], links: &[TalkSpeakerLink]) -> Graph {
        build(&normalize(people, talks, links, &[]))
    }

    fn pos(layout: &Layout, id: NodeId) -> Position {
        layout
            .nodes
            .iter()
            .find(|n| n.id == id)
            .map(|n| n.position)
            .unwrap()
    }

    fn speaker(id: &str) -> Person {
        Person::new(id, id, LabelField::one("speaker"))
    }

    fn viewer(id: &str) -> Person {
        Person::new(id, id, LabelField::one("viewer"))
    }

    #[test]
    fn test_two_speakers_two_talks() {
        let g = graph(
            &[speaker("a"), speaker("b")],
            &[Talk::new("t1", "One"), Talk::new("t2", "Two")],
            &[TalkSpeakerLink::new("t1", "a"), TalkSpeakerLink::new("t2", "b")],
        );
        let l = layout_grouped(&g.nodes, &g.edges);

        let a = pos(&l, NodeId::person("a"));
        let b = pos(&l, NodeId::person("b"));
        assert_eq!(a, Position::new(MARGIN, MARGIN));
        assert_eq!(b, Position::new(MARGIN + PERSON_WIDTH + HORIZONTAL_GAP, MARGIN));

        let talk_y = MARGIN + PERSON_HEIGHT + VERTICAL_GAP - TALK_TUCK;
        let t1 = pos(&l, NodeId::talk("t1"));
        let t2 = pos(&l, NodeId::talk("t2"));
        assert_eq!(t1, Position::new(a.x + (PERSON_WIDTH - TALK_WIDTH) / 2.0, talk_y));
        assert_eq!(t2.y, talk_y);
        assert!(t2.x > t1.x);
        assert!(l.diagnostics.is_empty());
    }

    #[test]
    fn test_shared_talk_goes_to_first_speaker() {
        let g = graph(
            &[speaker("a"), speaker("b")],
            &[Talk::new("t", "Shared")],
            &[TalkSpeakerLink::new("t", "b"), TalkSpeakerLink::new("t", "a")],
        );
        let l = layout_grouped(&g.nodes, &g.edges);
        let a = pos(&l, NodeId::person("a"));
        let t = pos(&l, NodeId::talk("t"));
        assert_eq!(t.x, a.x + (PERSON_WIDTH - TALK_WIDTH) / 2.0);
    }

    #[test]
    fn test_taken_first_talk_leaves_second_talk_orphaned() {
        // b's first talk is t1, already under a; b's t2 goes to the orphan grid.
        let g = graph(
            &[speaker("a"), speaker("b")],
            &[Talk::new("t1", "One"), Talk::new("t2", "Two")],
            &[
                TalkSpeakerLink::new("t1", "a"),
                TalkSpeakerLink::new("t1", "b"),
                TalkSpeakerLink::new("t2", "b"),
            ],
        );
        let l = layout_grouped(&g.nodes, &g.edges);
        let speaker_section = MARGIN + PERSON_HEIGHT + TALK_HEIGHT + VERTICAL_GAP * 1.5;
        let t2 = pos(&l, NodeId::talk("t2"));
        assert_eq!(t2, Position::new(MARGIN, speaker_section));
    }

    #[test]
    fn test_no_speakers_cursor_stays() {
        let g = graph(&[viewer("v")], &[Talk::new("t", "T")], &[]);
        let l = layout_grouped(&g.nodes, &g.edges);
        assert_eq!(pos(&l, NodeId::person("v")), Position::new(MARGIN, MARGIN));
        let grid_bottom = MARGIN + PERSON_HEIGHT + VERTICAL_GAP + VERTICAL_GAP;
        assert_eq!(pos(&l, NodeId::talk("t")), Position::new(MARGIN, grid_bottom));
    }

    #[test]
    fn test_people_grid_wraps() {
        let people: Vec<Person> = (0..PEOPLE_COLUMNS + 1)
            .map(|i| viewer(&format!("p{i}")))
            .collect();
        let g = graph(&people, &[], &[]);
        let l = layout_grouped(&g.nodes, &g.edges);
        let last = pos(&l, NodeId::person(&format!("p{PEOPLE_COLUMNS}")));
        assert_eq!(last, Position::new(MARGIN, MARGIN + PERSON_HEIGHT + VERTICAL_GAP));
        let fifth = pos(&l, NodeId::person(&format!("p{}", PEOPLE_COLUMNS - 1)));
        assert_eq!(
            fifth.x,
            MARGIN + (PEOPLE_COLUMNS - 1) as f64 * (PERSON_WIDTH + HORIZONTAL_GAP)
        );
    }

    #[test]
    fn test_orphan_talk_grid_wraps_by_orphan_index() {
        let talks: Vec<Talk> = (0..TALK_COLUMNS + 1)
            .map(|i| Talk::new(&format!("t{i}"), "T"))
            .collect();
        let g = graph(&[], &talks, &[]);
        let l = layout_grouped(&g.nodes, &g.edges);
        let last = pos(&l, NodeId::talk(&format!("t{TALK_COLUMNS}")));
        assert_eq!(last, Position::new(MARGIN, MARGIN + TALK_HEIGHT + VERTICAL_GAP));
    }

    #[test]
    fn test_output_order_matches_input() {
        let g = graph(
            &[viewer("v"), speaker("s")],
            &[Talk::new("t", "T")],
            &[TalkSpeakerLink::new("t", "s")],
        );
        let l = layout_grouped(&g.nodes, &g.edges);
        let ids: Vec<&NodeId> = l.nodes.iter().map(|n| &n.id).collect();
        let expected: Vec<&NodeId> = g.nodes.iter().map(|n| &n.id).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_idempotent() {
        let g = graph(
            &[speaker("a"), viewer("b"), speaker("c")],
            &[Talk::new("t1", "One"), Talk::new("t2", "Two")],
            &[TalkSpeakerLink::new("t2", "c")],
        );
        let first = layout_grouped(&g.nodes, &g.edges);
        let second = layout_grouped(&g.nodes, &g.edges);
        assert_eq!(first, second);
    }
}
