//! Sweep benchmarks: a long chain that survives, and a detached cyclic mesh
//! that is reclaimed in full.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use sweepgraph_core::{Graph, NodeRef};

const NODES: usize = 10_000;

fn chain() -> Graph {
    let mut graph = Graph::builder().capacity(NODES).build();
    let mut tail = graph.set_root(graph.make_node()).unwrap();
    for _ in 1..NODES {
        tail = graph.add_child(tail, graph.make_node()).unwrap();
    }
    graph
}

fn detached_mesh() -> Graph {
    let mut graph = Graph::builder().capacity(NODES).build();
    let root = graph.set_root(graph.make_node()).unwrap();
    let hub = graph.add_child(root, graph.make_node()).unwrap();

    let mut ring: Vec<NodeRef> = Vec::with_capacity(NODES);
    for _ in 0..NODES {
        ring.push(graph.add_child(hub, graph.make_node()).unwrap());
    }
    for pair in ring.windows(2) {
        graph.add_child(pair[1], pair[0]).unwrap();
    }
    graph.add_child(ring[0], hub).unwrap();

    graph.remove_child(root, hub).unwrap();
    graph
}

fn bench_sweep(c: &mut Criterion) {
    c.bench_function("sweep_reachable_chain", |b| {
        b.iter_batched(chain, |mut graph| black_box(graph.shrink_to_fit()), BatchSize::LargeInput)
    });

    c.bench_function("sweep_detached_mesh", |b| {
        b.iter_batched(
            detached_mesh,
            |mut graph| black_box(graph.shrink_to_fit()),
            BatchSize::LargeInput,
        )
    });
}

criterion_group!(benches, bench_sweep);
criterion_main!(benches);
