//! Property tests for phase resolution and the camera rail

use proptest::prelude::*;
use scroll_rig::controller::{Phase, PhaseKind, PhaseTable};
use scroll_rig::{CameraRail, RigError};

/// Build a table with the given interior boundaries, one kind per slice
fn table_with_cuts(mut cuts: Vec<f32>) -> PhaseTable {
    cuts.sort_by(f32::total_cmp);
    cuts.dedup();
    let mut bounds = vec![0.0];
    bounds.extend(cuts);
    bounds.push(1.0);

    let phases = bounds
        .windows(2)
        .zip(PhaseKind::ALL)
        .map(|(range, kind)| Phase::new(kind, range[0], range[1]))
        .collect();
    PhaseTable::new(phases).unwrap()
}

fn owners(table: &PhaseTable, progress: f32) -> usize {
    let last = table.len() - 1;
    table
        .phases()
        .iter()
        .enumerate()
        .filter(|(i, phase)| phase.contains(progress) || (*i == last && progress == 1.0))
        .count()
}

proptest! {
    #[test]
    fn default_table_resolves_to_exactly_one_phase(progress in 0.0f32..=1.0) {
        let table = PhaseTable::default();
        let (index, phase) = table.resolve(progress);
        prop_assert_eq!(owners(&table, progress), 1);
        prop_assert!(phase.contains(progress) || (index == table.len() - 1 && progress == 1.0));
    }

    #[test]
    fn custom_tables_resolve_to_exactly_one_phase(
        cuts in prop::collection::vec(0.01f32..0.99, 0..4),
        progress in 0.0f32..=1.0,
    ) {
        let table = table_with_cuts(cuts);
        let (_, phase) = table.resolve(progress);
        prop_assert_eq!(owners(&table, progress), 1);
        prop_assert!(progress >= phase.range_start && progress <= phase.range_end);
    }

    #[test]
    fn any_input_resolves_and_maps_into_unit_range(progress in any::<f32>()) {
        let table = PhaseTable::default();
        let (_, phase) = table.resolve(progress);
        let local = phase.local_progress(progress);
        prop_assert!((0.0..=1.0).contains(&local));
    }

    #[test]
    fn camera_height_is_monotonic(a in 0.0f32..=1.0, b in 0.0f32..=1.0) {
        let rail = CameraRail::default();
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(rail.camera_position(low).y <= rail.camera_position(high).y);
    }
}

#[test]
fn test_boundary_belongs_to_following_phase() {
    let table = PhaseTable::default();
    assert_eq!(table.resolve(0.58).1.kind, PhaseKind::Standing);
    assert_eq!(table.resolve(0.58).1.range_start, 0.58);
}

#[test]
fn test_unsorted_phases_rejected() {
    let result = PhaseTable::new(vec![
        Phase::new(PhaseKind::Climbing, 0.5, 1.0),
        Phase::new(PhaseKind::Idle, 0.0, 0.5),
    ]);
    assert!(matches!(result, Err(RigError::InvalidPhaseTable(_))));
}
