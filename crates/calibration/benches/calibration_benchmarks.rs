//! Benchmarks for count calibration.
//!
//! Run with: cargo bench --package calibration --bench calibration_benchmarks

use calibration::planck::{brightness_temperature, PlanckConstants};
use calibration::{CalibrationTable, Calibrator, LookupTable};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use test_utils::create_count_ramp;
use test_utils::fixtures::calibration::TABLE_YAML;

// =============================================================================
// PLANCK BENCHMARKS
// =============================================================================

fn bench_planck(c: &mut Criterion) {
    let mut group = c.benchmark_group("planck");

    let radiances: Vec<f64> = (1..=1000).map(|i| i as f64 * 0.15).collect();
    group.throughput(Throughput::Elements(radiances.len() as u64));
    group.bench_function("inverse_1000", |b| {
        b.iter(|| {
            for &r in &radiances {
                black_box(brightness_temperature(r, 900.0, PlanckConstants::EPS));
            }
        });
    });

    let table = LookupTable::from_planck(900.0, PlanckConstants::EPS, 150.0, 340.0, 0.01)
        .expect("planck table");
    group.bench_function("lookup_1000", |b| {
        b.iter(|| {
            for &r in &radiances {
                black_box(table.radiance_to_temperature(r));
            }
        });
    });

    group.finish();
}

// =============================================================================
// CALIBRATOR BENCHMARKS
// =============================================================================

fn bench_calibrate_swath(c: &mut Criterion) {
    let mut group = c.benchmark_group("calibrate_swath");
    let table = CalibrationTable::from_yaml_str(TABLE_YAML).expect("fixture table");

    for (instrument, channel) in [("AVHRR", "CH4"), ("MODIS", "B1"), ("SSMIS", "LUT")] {
        let cal = Calibrator::new(&table, instrument, channel).expect("calibrator");
        for (width, height) in [(90, 30), (2048, 1000)] {
            let counts: Vec<i16> = create_count_ramp(width * height, -10, 16000)
                .into_iter()
                .map(|c| c as i16)
                .collect();
            group.throughput(Throughput::Elements(counts.len() as u64));
            group.bench_with_input(
                BenchmarkId::new(format!("{}_{}", instrument, channel), width * height),
                &counts,
                |b, counts| b.iter(|| black_box(cal.calibrate(counts))),
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_planck, bench_calibrate_swath);
criterion_main!(benches);
