use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tarrow::geometry::{resolve, Point, Rect, Screen};

fn bench_resolve(c: &mut Criterion) {
    let screens: Vec<Screen> = (0..6)
        .map(|i| Screen::new(format!("DISPLAY{i}"), Rect::new(i * 1920, (i % 2) * 200, 1920, 1080)))
        .collect();
    let points: Vec<Point> = (0..1_000)
        .map(|i| Point::new((i * 131) % 12_500 - 300, (i * 71) % 1_700 - 200))
        .collect();
    c.bench_function("resolve_1k_points_6_screens", |b| {
        b.iter(|| {
            for p in &points {
                black_box(resolve(*p, black_box(&screens)));
            }
        })
    });
}

criterion_group!(benches, bench_resolve);
criterion_main!(benches);
