use linecount::{
    CountingConfig, CountingLine, CountingPipeline, CountingStrategy, CrossingCounter, Detection,
    DetectionSource, Direction, IntoDetections, LineConfig, RawDetection, VehicleClass,
    VehicleTracker,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn vehicle(center_y: f32, class: VehicleClass) -> Detection {
    Detection::new(100.0, center_y - 25.0, 50.0, 50.0, 0.9, class)
}

/// Runs tracker and counter over per-frame center positions of one vehicle.
fn run_single(centers: &[f32], class: VehicleClass, counter: &mut CrossingCounter) {
    let mut tracker = VehicleTracker::default();
    for &y in centers {
        let tracked = tracker.update(&[vehicle(y, class)]);
        counter.retire(tracker.removed_ids());
        counter.update(&tracked);
    }
}

#[test]
fn test_scenario_no_count_until_band() {
    init_logger();
    let mut tracker = VehicleTracker::default();
    let mut counter = CrossingCounter::new(CountingLine::new(300.0, 5.0), CountingStrategy::Band);

    let frame1 = tracker.update(&[Detection::new(100.0, 100.0, 50.0, 50.0, 0.9, VehicleClass::Car)]);
    assert_eq!(frame1.len(), 1);
    assert_eq!(frame1[0].track_id, 1);
    counter.update(&frame1);

    let frame2 = tracker.update(&[Detection::new(105.0, 102.0, 50.0, 50.0, 0.9, VehicleClass::Car)]);
    assert_eq!(frame2[0].track_id, 1);
    counter.update(&frame2);
    assert_eq!(counter.counts().total(), 0);

    // Walk the car down towards the line in small steps.
    let mut events = Vec::new();
    let mut y = 102.0;
    while y < 400.0 {
        y += 6.0;
        let tracked = tracker.update(&[Detection::new(105.0, y, 50.0, 50.0, 0.9, VehicleClass::Car)]);
        assert_eq!(tracked[0].track_id, 1);
        events.extend(counter.update(&tracked));
    }

    assert_eq!(events.len(), 1);
    assert!(events[0].center_y > 295.0 && events[0].center_y < 305.0);
    assert_eq!(events[0].class, VehicleClass::Car);
    assert_eq!(counter.counts().total(), 1);
}

#[test]
fn test_lingering_in_band_counts_once() {
    init_logger();
    for dwell in [1usize, 3, 25] {
        let mut centers = vec![270.0, 280.0, 290.0];
        centers.extend(std::iter::repeat_n(303.0, dwell));
        centers.extend([310.0, 320.0, 330.0]);

        let mut counter =
            CrossingCounter::new(CountingLine::new(300.0, 5.0), CountingStrategy::Band);
        run_single(&centers, VehicleClass::Bus, &mut counter);
        assert_eq!(counter.counts().get(Direction::Down, VehicleClass::Bus), 1, "dwell {dwell}");
        assert_eq!(counter.counts().total(), 1);
    }
}

#[test]
fn test_recrossing_counts_twice() {
    init_logger();
    let mut counter = CrossingCounter::new(CountingLine::new(300.0, 5.0), CountingStrategy::Band);
    // Down into the band, out below, then back up through it.
    run_single(
        &[280.0, 290.0, 302.0, 312.0, 320.0, 310.0, 298.0, 288.0],
        VehicleClass::Motorcycle,
        &mut counter,
    );
    assert_eq!(counter.counts().get(Direction::Down, VehicleClass::Motorcycle), 1);
    assert_eq!(counter.counts().get(Direction::Up, VehicleClass::Motorcycle), 1);
}

#[test]
fn test_edge_crossing_direction_from_motion() {
    init_logger();
    let mut counter =
        CrossingCounter::new(CountingLine::new(300.0, 5.0), CountingStrategy::EdgeCrossing);
    // Enters the band above the line on the way down; band counting would say "up".
    run_single(&[280.0, 290.0, 297.0, 304.0, 315.0], VehicleClass::Truck, &mut counter);
    assert_eq!(counter.counts().get(Direction::Down, VehicleClass::Truck), 1);
    assert_eq!(counter.counts().total(), 1);
}

struct RawFrames(Vec<Vec<RawDetection>>);

impl DetectionSource for RawFrames {
    type Frame = usize;
    type Error = std::convert::Infallible;

    fn detect(&mut self, frame: &usize) -> Result<Vec<Detection>, Self::Error> {
        Ok(self.0.get(*frame).cloned().unwrap_or_default().into_detections())
    }
}

#[test]
fn test_pipeline_from_raw_detections() {
    init_logger();
    // A car heading down and a person (class 0) standing on the line.
    let frames: Vec<Vec<RawDetection>> = (0..12)
        .map(|i| {
            let top = 250.0 + 6.0 * i as f32;
            vec![
                RawDetection::new(100.0, top, 150.0, top + 50.0, 0.9, 2),
                RawDetection::new(400.0, 280.0, 420.0, 320.0, 0.8, 0),
            ]
        })
        .collect();
    let n = frames.len();

    let mut config = CountingConfig::new(LineConfig::new(300.0));
    config.line.strategy = CountingStrategy::EdgeCrossing;
    let mut pipeline = CountingPipeline::new(RawFrames(frames), config).unwrap();

    let mut crossings = Vec::new();
    for frame in 0..n {
        let report = pipeline.process_frame(&frame).unwrap();
        assert_eq!(report.frame, frame as u64 + 1);
        assert!(report.objects.iter().all(|o| o.object.class == VehicleClass::Car));
        crossings.extend(report.crossings);
    }

    assert_eq!(crossings.len(), 1);
    assert_eq!(crossings[0].track_id, 1);
    assert_eq!(crossings[0].direction, Direction::Down);

    let json = serde_json::to_value(pipeline.counts()).unwrap();
    assert_eq!(json["down"]["car"], 1);
    assert_eq!(json["up"]["car"], 0);

    pipeline.reset_counts();
    assert_eq!(pipeline.counts().total(), 0);
}
