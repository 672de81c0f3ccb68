#![allow(clippy::float_cmp)]
use approx::assert_relative_eq;
use htcc_algorithms::{reconstruct_event, ReconstructionParameters, SeededClustering};
use htcc_core::hit::{HitTable, RawHit};
use htcc_core::Error;

/// Raw hit at the given detector bins.
fn hit(theta_index: i32, phi_index: i32, nphe: i32, time: f64) -> RawHit {
    let (sector, half) = match phi_index {
        11 => (1, 1),
        p if p % 2 == 0 => (p / 2 + 1, 2),
        p => ((p + 3) / 2, 1),
    };
    RawHit::new(theta_index + 1, sector, half, nphe, time)
}

/// Default parameters without ring time offsets, so raw and corrected times agree.
fn params() -> ReconstructionParameters {
    let mut params = ReconstructionParameters::default();
    params.t0 = [0.0; 4];
    params
}

#[test]
fn test_hit_helper_bins() {
    let table: HitTable = (0..12).map(|iphi| hit(iphi % 4, iphi, 2, 0.0)).collect();
    for iphi in 0..12 {
        assert_eq!(table.phi_index[iphi as usize], iphi);
        assert_eq!(table.theta_index[iphi as usize], iphi % 4);
    }
}

#[test]
fn test_empty_event() {
    let records = reconstruct_event(&HitTable::default(), &params()).unwrap();
    assert!(records.is_empty());
}

#[test]
fn test_filter_excludes_threshold_hit() {
    let table = HitTable::from(&[hit(1, 3, 1, 0.0)][..]);
    let records = reconstruct_event(&table, &params()).unwrap();
    assert!(records.is_empty());
}

#[test]
fn test_seed_threshold_inclusive() {
    let params = params().with_nphe_min_hit(0).with_nphe_min_seed(3);

    let at_threshold = HitTable::from(&[hit(1, 3, 3, 0.0)][..]);
    assert_eq!(reconstruct_event(&at_threshold, &params).unwrap().len(), 1);

    let below = HitTable::from(&[hit(1, 3, 2, 0.0)][..]);
    assert!(reconstruct_event(&below, &params).unwrap().is_empty());
}

#[test]
fn test_single_hit_cluster_matches_hit() {
    let params = ReconstructionParameters::default();
    let table = HitTable::from(&[hit(2, 4, 8, 20.0)][..]);
    let records = reconstruct_event(&table, &params).unwrap();

    assert_eq!(records.len(), 1);
    let record = records[0];
    assert_eq!(record.n_hits, 1);
    assert_eq!(record.nphe, 8);
    assert_eq!(record.theta, params.theta0[2]);
    assert_eq!(record.time, 20.0 - params.t0[2]);
    assert_relative_eq!(record.phi, params.nominal_phi(4).unwrap(), epsilon = 1e-12);
    assert!(record.dtheta.is_infinite());
    assert!(record.dphi.is_infinite());
}

#[test]
fn test_growth_chain_and_separate_hit() {
    let table = HitTable::from(
        &[
            hit(0, 0, 2, 5.0),
            hit(1, 0, 2, 5.0),
            hit(0, 1, 2, 5.0),
            hit(0, 6, 2, 5.0),
        ][..],
    );
    let records = reconstruct_event(&table, &params()).unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].n_hits, 3);
    assert_eq!(records[0].nphe, 6);
    assert_eq!((records[0].n_theta, records[0].n_phi), (2, 2));
    assert_eq!((records[0].theta_min, records[0].theta_max), (0, 1));
    assert_eq!((records[0].phi_min, records[0].phi_max), (0, 1));
    assert_eq!(records[1].n_hits, 1);
    assert_eq!((records[1].phi_min, records[1].phi_max), (6, 6));
}

#[test]
fn test_growth_reaches_neighbours_of_neighbours() {
    // (0,2) is listed before its only neighbour (0,1)
    let table = HitTable::from(&[hit(0, 0, 5, 0.0), hit(0, 2, 2, 0.0), hit(0, 1, 2, 0.0)][..]);
    let records = reconstruct_event(&table, &params().with_max_phi_bins(3)).unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].n_hits, 3);
    assert_eq!((records[0].phi_min, records[0].phi_max), (0, 2));
}

#[test]
fn test_adjacency_rules() {
    // diagonal neighbour merges
    let diagonal = HitTable::from(&[hit(1, 4, 3, 0.0), hit(2, 5, 2, 0.0)][..]);
    assert_eq!(reconstruct_event(&diagonal, &params()).unwrap().len(), 1);

    // two rings apart does not
    let gap = HitTable::from(&[hit(0, 4, 3, 0.0), hit(2, 4, 2, 0.0)][..]);
    assert_eq!(reconstruct_event(&gap, &params()).unwrap().len(), 2);

    // same bin does not
    let same = HitTable::from(&[hit(0, 4, 3, 0.0), hit(0, 4, 2, 0.0)][..]);
    assert_eq!(reconstruct_event(&same, &params()).unwrap().len(), 2);

    // phi wraps around
    let wrap = HitTable::from(&[hit(3, 11, 3, 0.0), hit(3, 0, 2, 0.0)][..]);
    let records = reconstruct_event(&wrap, &params()).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!((records[0].phi_min, records[0].phi_max), (0, 11));
}

#[test]
fn test_time_window_inclusive() {
    let inside = HitTable::from(&[hit(1, 2, 3, 10.0), hit(1, 3, 2, 12.0)][..]);
    assert_eq!(reconstruct_event(&inside, &params()).unwrap().len(), 1);

    let outside = HitTable::from(&[hit(1, 2, 3, 10.0), hit(1, 3, 2, 12.5)][..]);
    assert_eq!(reconstruct_event(&outside, &params()).unwrap().len(), 2);
}

#[test]
fn test_mean_time_moves_during_growth() {
    // (0,1) at t=3 is out of reach of the seed alone (t=0) but within the
    // window once (1,0) pulls the mean to t=1.
    let table = HitTable::from(&[hit(0, 0, 3, 0.0), hit(1, 0, 3, 2.0), hit(0, 1, 2, 3.0)][..]);
    let records = reconstruct_event(&table, &params()).unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].n_hits, 3);
    assert_relative_eq!(records[0].time, 12.0 / 8.0);
}

#[test]
fn test_rejected_cluster_consumes_hits() {
    let params = params().with_max_hits(2);
    let table = HitTable::from(
        &[
            hit(0, 0, 5, 0.0),
            hit(1, 0, 2, 0.0),
            hit(0, 1, 2, 0.0),
            hit(2, 7, 2, 0.0),
        ][..],
    );

    let algo = SeededClustering::new(params);
    let mut state = algo.create_state();
    let clusters = algo.cluster(&table, &mut state).unwrap();

    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0].len(), 1);
    assert_eq!(clusters[0].hit_phi_index(0), Some(7));

    let stats = algo.statistics(&state);
    assert_eq!(stats.clusters_rejected, 1);
    assert_eq!(stats.clusters_found, 1);
    assert_eq!(stats.hits_unclustered, 0);
}

#[test]
fn test_cluster_photoelectron_cut() {
    let params = params().with_nphe_min_cluster(5);
    let table = HitTable::from(&[hit(0, 0, 4, 0.0), hit(3, 6, 3, 0.0), hit(3, 7, 2, 0.0)][..]);
    let records = reconstruct_event(&table, &params).unwrap();

    // the lone 4 pe hit fails the cut, the 3 + 2 pair passes
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].nphe, 5);
}

#[test]
fn test_invalid_ring_is_fatal() {
    let table = HitTable::from(&[RawHit::new(0, 2, 1, 4, 0.0)][..]);
    let err = reconstruct_event(&table, &params()).unwrap_err();
    assert_eq!(err, Error::InvalidThetaIndex(-1));
}

#[test]
fn test_out_of_range_fields_fail_event() {
    let far_sector = HitTable::from(&[RawHit::new(1, 2_000_000_000, 1, 5, 0.0)][..]);
    let err = reconstruct_event(&far_sector, &params()).unwrap_err();
    assert_eq!(err, Error::InvalidPhiIndex(i32::MAX));

    let far_ring = HitTable::from(&[RawHit::new(i32::MIN, 2, 1, 5, 0.0)][..]);
    let err = reconstruct_event(&far_ring, &params()).unwrap_err();
    assert_eq!(err, Error::InvalidThetaIndex(i32::MAX));
}

#[test]
fn test_large_photoelectron_counts_sum() {
    let nphe = 2_000_000_000;
    let table = HitTable::from(
        &[
            hit(0, 0, nphe, 0.0),
            hit(1, 0, nphe, 0.0),
            hit(0, 1, nphe, 0.0),
        ][..],
    );
    let records = reconstruct_event(&table, &params()).unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].n_hits, 3);
    assert_eq!(records[0].nphe, 6_000_000_000);
    assert_eq!(records[0].time, 0.0);
}

#[test]
fn test_repeat_runs_identical() {
    let table = HitTable::from(
        &[
            hit(0, 0, 4, 1.0),
            hit(1, 0, 3, 1.5),
            hit(1, 11, 2, 0.5),
            hit(2, 6, 6, 3.0),
            hit(3, 6, 1, 3.2),
        ][..],
    );
    let first = reconstruct_event(&table, &params()).unwrap();
    let second = reconstruct_event(&table, &params()).unwrap();
    assert_eq!(first, second);
    assert!(!first.is_empty());
}
