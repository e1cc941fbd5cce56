//! # End-to-End Hazard Map Scenarios
//!
//! Worked examples that go through the public API the way a reducer does:
//! build partial maps, merge them, persist the result, and export records.

use hazcurve_core::{HazardConfig, HazardError};
use hazcurve_pmap::{
    combine, convert_to_records, load, map_digest, save, shape_of, CurveMapping,
    ExceedanceCurve, ExceedanceMap, MapShape, StoredArray,
};

#[test]
fn union_ignores_sites_missing_from_the_target() {
    let mut acc = ExceedanceMap::build(2, 1, [10, 20, 30], 0.0).unwrap();
    let part = ExceedanceMap::build(2, 1, [20, 30, 40], 0.5).unwrap();

    acc.union_in_place(&part).unwrap();

    assert_eq!(acc.get(10).unwrap(), &[0.0, 0.0]);
    assert_eq!(acc.get(20).unwrap(), &[0.5, 0.5]);
    assert_eq!(acc.get(30).unwrap(), &[0.5, 0.5]);
    assert!(matches!(acc.get(40), Err(HazardError::NotFound(40))));
    assert_eq!(acc.len(), 3);
}

#[test]
fn rank_two_array_gains_an_inner_axis() {
    let data: Vec<f64> = (0..20).map(|i| i as f64 / 20.0).collect();
    let array = StoredArray::new(vec![5, 4], data.clone()).unwrap();
    let map = ExceedanceMap::from_array(array, vec![1, 2, 3, 4, 5]).unwrap();
    assert_eq!(
        map.shape(),
        MapShape {
            sites: 5,
            levels: 4,
            inner: 1
        }
    );
    assert_eq!(map.values(), data.as_slice());

    let array = StoredArray::new(vec![5, 4], data).unwrap();
    assert!(matches!(
        ExceedanceMap::from_array(array, vec![1, 2, 3, 4]),
        Err(HazardError::ShapeMismatch { .. })
    ));
}

#[test]
fn union_across_realization_counts_fails_untouched() {
    let mut a = ExceedanceMap::build(4, 2, [1, 2], 0.25).unwrap();
    let b = ExceedanceMap::build(4, 3, [1, 2], 0.25).unwrap();
    let before = a.clone();
    assert!(matches!(
        a.union_in_place(&b),
        Err(HazardError::ShapeMismatch { .. })
    ));
    assert_eq!(a, before);
}

#[test]
fn curve_algebra_worked_example() {
    let p = ExceedanceCurve::from_values(5, 1, vec![0.1, 0.2, 0.3, 0.0, 0.0]).unwrap();
    let unioned = p.union_with(&p).unwrap();
    let result = unioned.complement().scaled_by_scalar(0.5);
    let expected = [0.405, 0.32, 0.245, 0.5, 0.5];
    for (got, want) in result.values().iter().zip(expected) {
        assert!((got - want).abs() < 1e-12, "{got} vs {want}");
    }
}

#[test]
fn shape_inference_skips_empty_workers() {
    let maps = vec![
        ExceedanceMap::empty(3, 2),
        ExceedanceMap::build(3, 2, [7, 8], 0.1).unwrap(),
        ExceedanceMap::build(3, 2, [9], 0.1).unwrap(),
    ];
    let shape = shape_of(&maps).unwrap();
    assert_eq!((shape.sites, shape.levels, shape.inner), (2, 3, 2));
    assert!(matches!(
        combine(&[ExceedanceMap::empty(3, 2), ExceedanceMap::empty(3, 2)]),
        Err(HazardError::AllEmpty { count: 2 })
    ));
}

#[test]
fn reduce_persist_and_export() {
    let config = HazardConfig::from_yaml_str(
        "intensity_measure_types_and_levels:\n\
         \x20 - imt: PGA\n\
         \x20   levels: [0.01, 0.1]\n\
         \x20 - imt: SA(0.1)\n\
         \x20   levels: [0.05]\n\
         inner_count: 1\n\
         site_count: 4\n",
    )
    .unwrap();
    let levels = config.level_count();
    assert_eq!(levels, 3);

    let workers = vec![
        ExceedanceMap::build(levels, 1, [0, 2], 0.2).unwrap(),
        ExceedanceMap::build(levels, 1, [2, 3], 0.5).unwrap(),
        ExceedanceMap::empty(levels, 1),
    ];
    let total = combine(&workers).unwrap();
    assert_eq!(total.sids(), &[0, 2, 3]);
    assert!((total.get(2).unwrap()[0] - 0.6).abs() < 1e-12);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("total.hzpm");
    save(&total, &path).unwrap();
    let reloaded = load(&path).unwrap();
    assert_eq!(map_digest(&reloaded), map_digest(&total));

    let records = convert_to_records(&reloaded, &config.imtls, 4, 0).unwrap();
    assert_eq!(records.len(), 4);
    assert_eq!(records[1].get("PGA").unwrap(), &[0.0, 0.0]);
    assert_eq!(records[0].get("SA(0.1)").unwrap(), &[0.2]);
    assert_eq!(records[3].get("PGA").unwrap(), &[0.5, 0.5]);
}

#[test]
fn mapping_trait_is_object_safe() {
    let mut map = ExceedanceMap::build(2, 1, [5], 0.0).unwrap();
    let mapping: &mut dyn CurveMapping = &mut map;
    mapping.set_row(5, &[0.1, 0.2]).unwrap();
    assert_eq!(mapping.site_count(), 1);
    assert_eq!(mapping.curve(5).unwrap().values(), &[0.1, 0.2]);
}

#[test]
fn corrupt_archive_on_disk_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.hzpm");
    std::fs::write(&path, b"not an archive").unwrap();
    let err = load(&path).unwrap_err();
    assert!(matches!(err, HazardError::ArchiveCorrupt(ref r) if r.contains("bad.hzpm")));
}
