use criterion::{Criterion, black_box, criterion_group, criterion_main};
use pd_core::Image;
use pd_digitize::{PipelineConfig, process_image};

/// Damped sine over a ruled grid, drawn with 5 px strokes.
fn build_plot_u8(width: usize, height: usize) -> Image<u8> {
    let (w, h) = (width as f32, height as f32);
    Image::from_fn(width, height, |x, y| {
        let (xf, yf) = (x as f32, y as f32);
        let on_grid = x % 80 < 2 || y % 60 < 2;

        let u = xf / w;
        let curve_y = 0.5 * h + 0.3 * h * (-2.0 * u).exp() * (12.0 * u).sin();
        let on_curve = (yf - curve_y).abs() <= 2.5;

        if on_grid || on_curve { 0 } else { 255 }
    })
}

fn bench_pipeline(c: &mut Criterion) {
    let img = build_plot_u8(800, 600);
    let cfg = PipelineConfig::default();

    c.bench_function("process_image_800x600", |b| {
        b.iter(|| {
            let out = process_image(black_box(&img), black_box(&cfg)).expect("pipeline runs");
            black_box(out.curves().len());
        });
    });
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
