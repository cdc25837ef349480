use criterion::{criterion_group, criterion_main};

use voxelnode_rs::octree::{
    lod::{FrustumLocation, LodEvaluator, ScaledLodPolicy, ViewFrustum},
    AABox, NodeColor, Octree, OctreeSettings, PathCode, V3c,
};

struct OpenFrustum {
    position: V3c<f32>,
}

impl ViewFrustum for OpenFrustum {
    fn box_in_frustum(&self, _bounds: &AABox) -> FrustumLocation {
        FrustumLocation::Inside
    }

    fn position(&self) -> V3c<f32> {
        self.position
    }
}

/// Colors every node of the given depth inside the first octant of the tree
fn build_tree(settings: OctreeSettings, depth: usize) -> Octree {
    let mut tree = Octree::new();
    tree.settings = settings;
    let mut octants = vec![0u8; depth];
    let leaf_count = 8usize.pow(depth as u32 - 1);
    for index in 0..leaf_count {
        for (level, octant) in octants.iter_mut().skip(1).enumerate() {
            *octant = ((index >> (3 * level)) & 0x07) as u8;
        }
        let path = PathCode::from_octants(&octants).ok().unwrap();
        tree.set_color_at_path(&path, NodeColor::from(0xABCDEF01));
    }
    tree
}

fn criterion_benchmark(c: &mut criterion::Criterion) {
    c.bench_function("path code child and parent", |b| {
        let code = PathCode::from_octants(&[5; 40]).ok().unwrap();
        b.iter(|| {
            let child = code.child(3);
            child.parent()
        });
    });

    c.bench_function("set color at path with reaveraging", |b| {
        b.iter(|| build_tree(OctreeSettings::default(), 4));
    });

    c.bench_function("set color at path with auto collapse", |b| {
        b.iter(|| build_tree(OctreeSettings::default().with_auto_collapse(true), 4));
    });

    c.bench_function("reaverage subtree", |b| {
        let mut tree = build_tree(OctreeSettings::default().with_should_reaverage(false), 4);
        b.iter(|| tree.reaverage_subtree(tree.root()));
    });

    c.bench_function("collect renderable", |b| {
        let mut tree = build_tree(OctreeSettings::default(), 4);
        let evaluator = LodEvaluator::new(ScaledLodPolicy::default(), &tree.settings);
        let frustum = OpenFrustum {
            position: V3c::new(400., 300., -200.),
        };
        b.iter(|| tree.collect_renderable(tree.root(), &evaluator, &frustum));
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
