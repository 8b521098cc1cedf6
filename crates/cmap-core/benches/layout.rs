//! Layout benchmarks over synthetic conferences of increasing size.
//!
//! Run with: cargo bench -p cmap-core

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use cmap_core::{
    Connection, Dataset, ForceConfig, Graph, LabelField, NormalizedEntities, Person, Talk,
    TalkSpeakerLink, build, layout_force, layout_grouped,
};

/// One talk per ten people, every tenth person its speaker, and two
/// connections per person: one to a talk, one to the next person.
fn conference(people: usize) -> Graph {
    let talks = people.div_ceil(10);
    let ds = Dataset {
        people: (0..people)
            .map(|i| {
                let labels = if i % 10 == 0 {
                    LabelField::one("speaker")
                } else {
                    LabelField::one("rl attendee")
                };
                Person::new(&format!("p{i}"), &format!("Person {i}"), labels)
            })
            .collect(),
        talks: (0..talks)
            .map(|t| Talk::new(&format!("t{t}"), &format!("Talk {t}")))
            .collect(),
        talk_speakers: (0..talks)
            .map(|t| TalkSpeakerLink::new(&format!("t{t}"), &format!("p{}", t * 10)))
            .collect(),
        connections: (0..people)
            .flat_map(|i| {
                [
                    Connection::to_talk(
                        &format!("ct{i}"),
                        &format!("p{i}"),
                        &format!("t{}", i % talks),
                    ),
                    Connection::to_person(
                        &format!("cp{i}"),
                        &format!("p{i}"),
                        &format!("p{}", (i + 1) % people),
                    ),
                ]
            })
            .collect(),
    };
    build(&NormalizedEntities::from_dataset(&ds))
}

fn bench_force(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout_force");
    group.sample_size(10);

    for people in [50, 200, 500] {
        let graph = conference(people);
        let config = ForceConfig::default();
        group.bench_with_input(BenchmarkId::new("default_config", people), &people, |b, _| {
            b.iter(|| layout_force(black_box(&graph.nodes), black_box(&graph.edges), &config));
        });
    }

    group.finish();
}

fn bench_grouped(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout_grouped");

    for people in [50, 500, 5_000] {
        let graph = conference(people);
        group.bench_with_input(BenchmarkId::new("conference", people), &people, |b, _| {
            b.iter(|| layout_grouped(black_box(&graph.nodes), black_box(&graph.edges)));
        });
    }

    group.finish();
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");

    for people in [500, 5_000] {
        group.bench_with_input(BenchmarkId::new("conference", people), &people, |b, &n| {
            b.iter(|| conference(black_box(n)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_force, bench_grouped, bench_build);
criterion_main!(benches);
