mod common;

use collector::{CollectorConfig, Coordinator, EpisodeParams, SampleRange, Sink};
use common::{kinematic_pool, lines, SlowWriter};

#[test]
fn slow_sink_never_splits_records() {
    let steps = 30;
    let config = CollectorConfig {
        workers: 8,
        quota_per_worker: 50,
        episode: EpisodeParams {
            steps,
            step_duration: 0.37,
            obstacle_range: SampleRange::symmetric(9.0),
            ..EpisodeParams::default()
        },
        seed: Some(7),
        ..CollectorConfig::default()
    };
    let coordinator = Coordinator::new(&config).unwrap();
    let sink = Sink::new(SlowWriter::default());
    let summary = coordinator.run(kinematic_pool(8), &sink).unwrap();
    assert!(summary.is_complete());

    let out = lines(&sink.finish().unwrap().bytes);
    assert_eq!(out.len(), 400);
    for line in &out {
        let fields: Vec<&str> = line.split(',').collect();
        assert_eq!(fields.len(), steps, "corrupted record: {line}");
        assert!(fields.iter().all(|f| f.parse::<f64>().is_ok()), "{line}");
    }
}

#[test]
fn direct_appends_from_many_threads_stay_whole() {
    let sink = Sink::new(SlowWriter::default());
    std::thread::scope(|s| {
        for t in 0..6 {
            let sink = &sink;
            s.spawn(move || {
                for i in 0..40 {
                    let width = 1 + (t + i) % 9;
                    let line = vec![t.to_string(); width].join(",") + "\n";
                    sink.append(&line).unwrap();
                }
            });
        }
    });
    assert_eq!(sink.records(), 240);

    let out = lines(&sink.finish().unwrap().bytes);
    assert_eq!(out.len(), 240);
    for line in out {
        let fields: Vec<&str> = line.split(',').collect();
        assert!(fields.iter().all(|f| *f == fields[0]), "interleaved: {line}");
    }
}
