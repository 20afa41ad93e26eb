use std::io::Write;
use std::str::FromStr;

use crate::prelude::*;
use crate::tests::toolkit::{
    navigation, observation, E01_RECORD, G01_RECORD, G07_RECORD, NAV_HEADER, OBS_BODY,
    OBS_HEADER, R03_RECORD,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn g01() -> SV {
    SV::from_str("G01").unwrap()
}

#[test]
fn broadcast_to_emission_states() {
    init_logger();
    let nav = navigation(&[G01_RECORD, E01_RECORD, G07_RECORD, R03_RECORD]);
    let obs = observation();

    assert_eq!(nav.ephemerides.len(), 2, "only GPS records are decoded");
    assert_eq!(obs.epochs.len(), 3);

    let resolver = Resolver::new(Config::default(), &obs.header, &nav.ephemerides).unwrap();
    assert_eq!(
        resolver.rx_position(),
        Vector3::new(4027881.6280, 306998.5370, 4919499.4610)
    );

    let table = resolver.resolve_all(&obs.epochs);
    assert_eq!(table.len(), 3);

    // G05: no ephemeris, G08: blank C1C, E11: not GPS, second G01: ignored
    let first = table.epoch(0).unwrap();
    assert_eq!(first.keys().copied().collect::<Vec<_>>(), vec![g01()]);

    let state = table.state(0, g01()).unwrap();
    assert_eq!(state.pseudorange, 21360580.102);

    let (_, t_rx) = gps_week_sow(obs.epochs[0].epoch);
    assert_eq!(t_rx, 347400.0);
    let expected = t_rx - state.pseudorange / Constants::SPEED_OF_LIGHT - state.clock_bias;
    assert!((state.emission_time - expected).abs() < 1.0E-12);

    assert!(
        (state.light_time - state.line_of_sight.norm() / Constants::SPEED_OF_LIGHT).abs()
            < 1.0E-15
    );
    assert!(state.light_time > 0.06 && state.light_time < 0.12);

    let radius = state.position.norm();
    assert!(radius > 2.6E7 && radius < 2.7E7, "orbit radius: {}", radius);
    assert!(state.kepler.converged);

    // rotation preserves the distance to the Earth's center, not the position
    let unrotated = resolver.rx_position() + state.line_of_sight;
    assert!((unrotated.norm() - radius).abs() < 1.0E-6);
    assert!((unrotated - state.position).norm() > 1.0);

    assert!(table.epoch(1).unwrap().is_empty());

    let last = table.state(2, g01()).unwrap();
    assert_eq!(last.pseudorange, 21366580.102);
    assert!(last.emission_time > state.emission_time + 59.9);
}

#[test]
fn reference_position_at_toe() {
    let nav = navigation(&[G01_RECORD]);
    let eph = &nav.ephemerides[0];
    let orbit = eph.broadcast_orbit().unwrap();
    let toe = eph.toe().unwrap();

    // Values from a separate evaluation of the IS-GPS-200 table 20-IV
    // equations for this record. Not a published precise orbit.
    let state = orbit.position_at(toe);
    assert_eq!(state.t_k, 0.0);
    let reference = Vector3::new(-15218374.638, 21018596.161, -6743402.148);
    assert!(
        (state.position - reference).norm() < 1.0,
        "{} too far from {}",
        state.position,
        reference
    );
    assert!((state.clock_bias - 2.300604246557E-04).abs() < 1.0E-9);

    let state = orbit.position_at(toe + 1800.0 - 0.07);
    let reference = Vector3::new(-14693422.439, 19021448.902, -11969303.122);
    assert!((state.position - reference).norm() < 1.0);
    assert!((state.clock_bias - 2.300450775294635E-04).abs() < 1.0E-9);
}

#[test]
fn resolution_is_reproducible() {
    let nav = navigation(&[G01_RECORD, G07_RECORD]);
    let obs = observation();
    let resolver = Resolver::new(Config::default(), &obs.header, &nav.ephemerides).unwrap();
    assert_eq!(resolver.resolve_all(&obs.epochs), resolver.resolve_all(&obs.epochs));

    let cfg = Config::default().with_selection(EphemerisSelection::NearestToe);
    let nearest = Resolver::new(cfg, &obs.header, &nav.ephemerides).unwrap();
    assert_eq!(nearest.resolve_all(&obs.epochs), resolver.resolve_all(&obs.epochs));
}

#[test]
fn custom_state_sink() {
    #[derive(Default)]
    struct Collector {
        epochs: Vec<Epoch>,
        states: Vec<(usize, SV)>,
    }
    impl StateSink for Collector {
        fn new_epoch(&mut self, _index: usize, epoch: Epoch) {
            self.epochs.push(epoch);
        }
        fn insert(&mut self, index: usize, state: SatelliteState) {
            self.states.push((index, state.sv));
        }
    }

    let nav = navigation(&[G01_RECORD]);
    let obs = observation();
    let resolver = Resolver::new(Config::default(), &obs.header, &nav.ephemerides).unwrap();
    let mut collector = Collector::default();
    resolver.resolve(&obs.epochs, &mut collector);
    assert_eq!(collector.epochs.len(), 3);
    assert_eq!(collector.states, vec![(0, g01()), (2, g01())]);
}

#[test]
fn files_on_disk() {
    let dir = std::env::temp_dir().join(format!("rinex-spp-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();

    let nav_path = dir.join("BRDC00WRD_S_20241230000_01D_MN.rnx");
    let mut fd = std::fs::File::create(&nav_path).unwrap();
    write!(fd, "{}{}{}", NAV_HEADER, G01_RECORD, G07_RECORD).unwrap();

    let obs_path = dir.join("BASE00XXX_R_20241230000_01D_30S_MO.rnx");
    let mut fd = std::fs::File::create(&obs_path).unwrap();
    write!(fd, "{}{}", OBS_HEADER, OBS_BODY).unwrap();

    let nav = Navigation::from_file(&nav_path).unwrap();
    let obs = Observation::from_file(&obs_path).unwrap();
    assert_eq!(nav, navigation(&[G01_RECORD, G07_RECORD]));
    assert_eq!(obs, observation());

    let truncated = dir.join("truncated.rnx");
    let mut fd = std::fs::File::create(&truncated).unwrap();
    let record: Vec<&str> = G01_RECORD.lines().take(5).collect();
    writeln!(fd, "{}{}", NAV_HEADER, record.join("\n")).unwrap();
    match Navigation::from_file(&truncated) {
        Err(Error::Format(e)) => {
            assert_eq!(e.path.as_deref(), Some(truncated.as_path()));
            assert_eq!(e.kind, ParsingError::UnexpectedEof);
            assert!(e.to_string().contains("truncated.rnx:"));
        },
        other => panic!("expecting truncation error, got {:?}", other.map(|_| ())),
    }

    let _ = std::fs::remove_dir_all(&dir);
}

#[cfg(feature = "flate2")]
#[test]
fn gzip_compressed_files() {
    use flate2::{write::GzEncoder, Compression};

    let dir = std::env::temp_dir().join(format!("rinex-spp-gz-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();

    let nav_path = dir.join("BRDC00WRD_S_20241230000_01D_MN.rnx.gz");
    let mut encoder = GzEncoder::new(std::fs::File::create(&nav_path).unwrap(), Compression::default());
    write!(encoder, "{}{}{}", NAV_HEADER, G01_RECORD, G07_RECORD).unwrap();
    encoder.finish().unwrap();

    let obs_path = dir.join("BASE00XXX_R_20241230000_01D_30S_MO.rnx.gz");
    let mut encoder = GzEncoder::new(std::fs::File::create(&obs_path).unwrap(), Compression::default());
    write!(encoder, "{}{}", OBS_HEADER, OBS_BODY).unwrap();
    encoder.finish().unwrap();

    let nav = Navigation::from_file(&nav_path).unwrap();
    let obs = Observation::from_file(&obs_path).unwrap();
    assert_eq!(nav, navigation(&[G01_RECORD, G07_RECORD]));
    assert_eq!(obs, observation());

    let _ = std::fs::remove_dir_all(&dir);
}

#[cfg(not(feature = "flate2"))]
#[test]
fn gzip_requires_feature() {
    let dir = std::env::temp_dir().join(format!("rinex-spp-nogz-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();

    let path = dir.join("BRDC00WRD_S_20241230000_01D_MN.rnx.gz");
    let mut fd = std::fs::File::create(&path).unwrap();
    write!(fd, "{}{}", NAV_HEADER, G01_RECORD).unwrap();

    match Navigation::from_file(&path) {
        Err(Error::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::Unsupported),
        other => panic!("expecting unsupported error, got {:?}", other.map(|_| ())),
    }

    let _ = std::fs::remove_dir_all(&dir);
}
