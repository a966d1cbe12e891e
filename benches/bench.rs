use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use weighted_tree::{BalancedTree, OrderedTree};

#[derive(Clone)]
enum TreeEnum {
    Ordered(OrderedTree<i64>),
    Balanced(BalancedTree<i64>),
}

impl TreeEnum {
    fn has_weight(&self, weight: i64) -> bool {
        match self {
            Self::Ordered(t) => t.has_weight(weight),
            Self::Balanced(t) => t.has_weight(weight),
        }
    }

    fn add(&mut self, weight: i64) {
        match self {
            Self::Ordered(t) => {
                t.add(weight);
            }
            Self::Balanced(t) => {
                t.add(weight);
            }
        }
    }

    fn delete(&mut self, weight: i64) {
        match self {
            Self::Ordered(t) => {
                t.delete(weight);
            }
            Self::Balanced(t) => {
                t.delete(weight);
            }
        }
    }
}

/// Weights `0..num_nodes` in an order that keeps an unbalanced tree full: each range's midpoint
/// comes before both of its halves.
fn balanced_order(xs: &[i64], out: &mut Vec<i64>) {
    if !xs.is_empty() {
        let mid = xs.len() / 2;
        out.push(xs[mid]);
        balanced_order(&xs[..mid], out);
        balanced_order(&xs[mid + 1..], out);
    }
}

/// Helper to bench a function on a weighted tree.
/// It creates a group for the given name and closure and runs tests for various sizes,
/// insertion orders and tree flavours before finishing the group.
fn bench_helper(c: &mut Criterion, name: &str, f: impl Fn(&mut TreeEnum, i64)) {
    let mut group = c.benchmark_group(name);

    for num_levels in [3, 7, 11] {
        let num_nodes = 2i64.pow(num_levels) - 1;
        let largest_weight_in_tree = num_nodes - 1;

        let ascending: Vec<i64> = (0..num_nodes).collect();
        let mut midpoints = Vec::new();
        balanced_order(&ascending, &mut midpoints);

        for (order, weights) in [("ascending", &ascending), ("midpoints", &midpoints)] {
            let tree_tests = [
                (
                    "ordered",
                    TreeEnum::Ordered(weights.iter().copied().collect()),
                ),
                (
                    "balanced",
                    TreeEnum::Balanced(weights.iter().copied().collect()),
                ),
            ];
            for (flavour, tree) in tree_tests {
                let id = BenchmarkId::new(format!("{flavour}/{order}"), largest_weight_in_tree);

                group.bench_function(id, |b| {
                    b.iter_custom(|iters| {
                        let mut time = std::time::Duration::ZERO;
                        for _ in 0..iters {
                            let mut tree = black_box(tree.clone());
                            let instant = std::time::Instant::now();
                            f(&mut tree, black_box(largest_weight_in_tree));
                            let elapsed = instant.elapsed();
                            time += elapsed;
                        }
                        time
                    })
                });
            }
        }
    }

    group.finish();
}

pub fn criterion_benchmark(c: &mut Criterion) {
    bench_helper(c, "find", |tree, w| {
        let _found = black_box(tree.has_weight(w));
    });
    bench_helper(c, "delete", |tree, w| {
        tree.delete(w);
    });

    bench_helper(c, "add", |tree, w| {
        tree.add(w + 1);
    });

    bench_helper(c, "find-miss", |tree, w| {
        let _found = black_box(tree.has_weight(w + 1));
    });
    bench_helper(c, "delete-miss", |tree, w| {
        tree.delete(w + 1);
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
