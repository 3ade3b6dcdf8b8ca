use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use uml_autolayout::{Diagram, LayoutConfig, LinkKind, NullCanvas, ShapeKind, apply_layout};

/// A class hierarchy `depth` levels deep with `fanout` subclasses per
/// class, plus one association per leaf to make the loose phase work.
fn hierarchy_diagram(depth: usize, fanout: usize) -> Diagram {
    let mut diagram = Diagram::new();
    diagram.ensure_shape("C0", 100.0, 60.0, ShapeKind::Class);

    let mut frontier = vec!["C0".to_string()];
    let mut next_id = 1usize;
    for _ in 1..depth {
        let mut next = Vec::new();
        for parent in &frontier {
            for _ in 0..fanout {
                let id = format!("C{next_id}");
                next_id += 1;
                diagram.ensure_shape(&id, 100.0, 60.0, ShapeKind::Class);
                diagram.add_link(&id, parent, LinkKind::Inheritance);
                next.push(id);
            }
        }
        frontier = next;
    }

    for (i, leaf) in frontier.iter().enumerate() {
        let id = format!("H{i}");
        diagram.ensure_shape(&id, 80.0, 40.0, ShapeKind::Note);
        diagram.add_link(&id, leaf, LinkKind::NoteLink);
    }

    diagram
}

fn bench_layout(c: &mut Criterion) {
    let config = LayoutConfig::default();
    let mut group = c.benchmark_group("apply_layout");

    for (name, depth, fanout) in [("shallow", 3, 3), ("deep", 5, 2), ("wide", 3, 6)] {
        let diagram = hierarchy_diagram(depth, fanout);
        group.bench_with_input(BenchmarkId::from_parameter(name), &diagram, |b, diagram| {
            b.iter(|| {
                let mut scratch = diagram.clone();
                apply_layout(black_box(&mut scratch), &mut NullCanvas, &config).unwrap()
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_layout);
criterion_main!(benches);
