use crate::prelude::*;
use crate::tests::toolkit::{
    self, assert_close, geographic_from_local, ground, sample_points, synthetic_query, value_one,
    value_two, SyntheticLoader, INPUT_CRS,
};

#[test]
fn defaults_and_accessors() {
    let mut query = Query::new();
    assert!(!query.squashing());
    assert_eq!(query.squash_min_elev(), 0.0);
    assert_eq!(query.num_models(), 0);

    query.set_squash_min_elev(-2.0e+3);
    assert!(query.squashing());
    assert_eq!(query.squash_min_elev(), -2.0e+3);

    query.set_squashing(false);
    assert!(!query.squashing());
    assert_eq!(query.squash_min_elev(), -2.0e+3);
}

#[test]
fn requires_initialization() {
    let query = Query::new();
    assert!(matches!(
        query.query_elevation(37.75, -122.25),
        Err(Error::NotInitialized)
    ));
    let mut values = [0.0_f64; 2];
    assert!(matches!(
        query.query(&mut values, 37.75, -122.25, -1.0e+3),
        Err(Error::NotInitialized)
    ));
}

#[test]
fn initialize_builds_each_target() {
    let query = synthetic_query(&["one-block-flat", "three-blocks-flat"], &["two", "one"]);
    assert_eq!(query.num_models(), 2);
    assert_eq!(query.value_names(), &["two".to_string(), "one".to_string()]);
    assert_eq!(query.value_units(), &["m/s".to_string(), "m/s".to_string()]);
}

#[test]
fn initialize_rejects_unknown_value() {
    let mut query = Query::with_loader(Box::new(SyntheticLoader));
    let error = query
        .initialize(
            &["one-block-flat", "three-blocks-flat"],
            &["two", "blah"],
            INPUT_CRS,
        )
        .unwrap_err();
    match error {
        Error::UnknownValue { model, name } => {
            assert_eq!(model, "one-block-flat");
            assert_eq!(name, "blah");
        },
        other => panic!("unexpected error: {:?}", other),
    }
    // the failed initialize left the engine unusable
    assert!(matches!(
        query.query_elevation(37.75, -122.25),
        Err(Error::NotInitialized)
    ));
}

#[test]
fn initialize_rejects_unknown_model() {
    let mut query = Query::with_loader(Box::new(SyntheticLoader));
    let error = query
        .initialize(&["no-such-model"], &["one"], INPUT_CRS)
        .unwrap_err();
    assert!(matches!(error, Error::Load { .. }));
}

#[test]
fn initialize_rejects_bad_crs() {
    let mut query = Query::with_loader(Box::new(SyntheticLoader));
    let error = query
        .initialize(&["one-block-flat"], &["one"], "EPSG:99999")
        .unwrap_err();
    assert!(matches!(error, Error::Crs { .. }));
}

#[test]
fn value_buffer_must_match_request() {
    let query = synthetic_query(&["one-block-flat"], &["two", "one"]);
    let mut short = [0.0_f64; 1];
    assert!(matches!(
        query.query(&mut short, 37.75, -122.25, -1.0e+3),
        Err(Error::ValueBufferSize {
            expected: 2,
            got: 1
        })
    ));
}

#[test]
fn flat_models_reversed_value_order() {
    let query = synthetic_query(&["one-block-flat", "three-blocks-flat"], &["two", "one"]);
    let mut values = [0.0_f64; 2];

    let one_block = toolkit::one_block_flat();
    for (x, y) in sample_points() {
        for z in [0.0, -1.0, -2.5e+3, -5.0e+3] {
            let (lat, lon) = geographic_from_local(&one_block, x, y);
            assert!(query.query(&mut values, lat, lon, z).unwrap());
            assert_close(values[0], value_two(x, y, z), "value two");
            assert_close(values[1], value_one(x, y, z), "value one");
        }
    }

    let three_blocks = toolkit::three_blocks_flat();
    for (x, y) in sample_points() {
        for z in [0.0, -4.2e+3, -5.0e+3, -17.3e+3, -45.0e+3] {
            let (lat, lon) = geographic_from_local(&three_blocks, x, y);
            assert!(query.query(&mut values, lat, lon, z).unwrap());
            assert_close(values[0], value_two(x, y, z), "value two");
            assert_close(values[1], value_one(x, y, z), "value one");
        }
    }
}

#[test]
fn out_of_domain_yields_nodata() {
    let query = synthetic_query(&["one-block-flat", "three-blocks-flat"], &["two", "one"]);
    let one_block = toolkit::one_block_flat();
    let mut values = [0.0_f64; 2];

    // outside both footprints
    let (lat, lon) = geographic_from_local(&one_block, -5.0e+3, 1.0e+3);
    assert!(!query.query(&mut values, lat, lon, -1.0e+3).unwrap());
    assert_eq!(values, [NODATA_VALUE, NODATA_VALUE]);

    // inside a footprint, below the grids
    let (lat, lon) = geographic_from_local(&one_block, 12.0e+3, 34.0e+3);
    assert!(!query.query(&mut values, lat, lon, -60.0e+3).unwrap());
    assert_eq!(values, [NODATA_VALUE, NODATA_VALUE]);

    // inside a footprint, above the flat ground surface
    assert!(!query.query(&mut values, lat, lon, 10.0).unwrap());
    assert_eq!(values, [NODATA_VALUE, NODATA_VALUE]);
}

#[test]
fn first_model_answers_in_overlap() {
    let query = synthetic_query(&["constant-ten", "constant-twenty"], &["one"]);
    let model = toolkit::constant_model("constant-ten", 10.0);
    let (lat, lon) = geographic_from_local(&model, 12.0e+3, 34.0e+3);
    let mut values = [0.0_f64; 1];
    assert!(query.query(&mut values, lat, lon, -1.0e+3).unwrap());
    assert_eq!(values[0], 10.0);

    let reversed = synthetic_query(&["constant-twenty", "constant-ten"], &["one"]);
    assert!(reversed.query(&mut values, lat, lon, -1.0e+3).unwrap());
    assert_eq!(values[0], 20.0);
}

#[test]
fn topo_models_below_sea_level() {
    let query = synthetic_query(&["one-block-topo", "three-blocks-topo"], &["two", "one"]);
    let mut values = [0.0_f64; 2];

    let three_blocks = toolkit::three_blocks_topo();
    for (x, y) in sample_points() {
        for z in [-1.0, -4.2e+3, -33.0e+3] {
            let (lat, lon) = geographic_from_local(&three_blocks, x, y);
            assert!(query.query(&mut values, lat, lon, z).unwrap());
            assert_close(values[0], value_two(x, y, z), "value two");
            assert_close(values[1], value_one(x, y, z), "value one");
        }
    }
}

#[test]
fn squashing_folds_topography_out() {
    let mut query = Query::with_loader(Box::new(SyntheticLoader));
    query.set_squash_min_elev(-4.999e+3);
    query
        .initialize(
            &["one-block-topo", "three-blocks-topo"],
            &["two", "one"],
            INPUT_CRS,
        )
        .unwrap();

    let mut values = [0.0_f64; 2];

    // 1 m below the ground surface samples the deformed model at z = -1
    for model in [toolkit::one_block_topo(), toolkit::three_blocks_topo()] {
        for (x, y) in sample_points() {
            let (lat, lon) = geographic_from_local(&model, x, y);
            let z = ground(x, y) - 1.0;
            assert!(query.query(&mut values, lat, lon, z).unwrap());
            assert_close(values[0], value_two(x, y, -1.0), "value two");
            assert_close(values[1], value_one(x, y, -1.0), "value one");
        }
    }

    // geometry below the cutoff is not perturbed
    let three_blocks = toolkit::three_blocks_topo();
    let (x, y) = (12.5e+3, 4.2e+3);
    let (lat, lon) = geographic_from_local(&three_blocks, x, y);
    assert!(query.query(&mut values, lat, lon, -20.0e+3).unwrap());
    assert_close(values[0], value_two(x, y, -20.0e+3), "value two");
    assert_close(values[1], value_one(x, y, -20.0e+3), "value one");
}

#[test]
fn squash_surface_matches_flat_query_at_zero() {
    let mut squashed = Query::with_loader(Box::new(SyntheticLoader));
    squashed.set_squash_min_elev(-4.999e+3);
    squashed
        .initialize(&["one-block-topo"], &["one"], INPUT_CRS)
        .unwrap();

    let plain = synthetic_query(&["one-block-topo"], &["one"]);

    let model = toolkit::one_block_topo();
    let (x, y) = (12.5e+3, 4.2e+3);
    let (lat, lon) = geographic_from_local(&model, x, y);

    let mut on_surface = [0.0_f64; 1];
    assert!(squashed
        .query(&mut on_surface, lat, lon, ground(x, y))
        .unwrap());

    let mut at_zero = [0.0_f64; 1];
    assert!(plain.query(&mut at_zero, lat, lon, 0.0).unwrap());

    assert_close(on_surface[0], at_zero[0], "surface vs sea level");
}

#[test]
fn elevation_only_use() {
    let query = synthetic_query(&["one-block-topo"], &[]);
    let model = toolkit::one_block_topo();
    let (x, y) = (12.0e+3, 34.0e+3);
    let (lat, lon) = geographic_from_local(&model, x, y);

    assert_close(query.query_elevation(lat, lon).unwrap(), ground(x, y), "elevation");

    let mut values = [0.0_f64; 0];
    assert!(query.query(&mut values, lat, lon, -1.0e+3).unwrap());
}

#[test]
fn reinitialize_replaces_state() {
    let mut query = Query::with_loader(Box::new(SyntheticLoader));
    query
        .initialize(&["one-block-flat"], &["two", "one"], INPUT_CRS)
        .unwrap();
    query
        .initialize(&["one-block-flat"], &["two", "one"], INPUT_CRS)
        .unwrap();

    let model = toolkit::one_block_flat();
    let (x, y) = (12.5e+3, 4.2e+3);
    let (lat, lon) = geographic_from_local(&model, x, y);
    let mut values = [0.0_f64; 2];
    assert!(query.query(&mut values, lat, lon, -1.0e+3).unwrap());
    assert_close(values[0], value_two(x, y, -1.0e+3), "value two");
    assert_close(values[1], value_one(x, y, -1.0e+3), "value one");

    // a different request replaces the value selection
    query
        .initialize(&["one-block-flat"], &["one"], INPUT_CRS)
        .unwrap();
    assert_eq!(query.value_names(), &["one".to_string()]);
    let mut single = [0.0_f64; 1];
    assert!(query.query(&mut single, lat, lon, -1.0e+3).unwrap());
    assert_close(single[0], value_one(x, y, -1.0e+3), "value one");
}

#[test]
fn finalize_is_idempotent() {
    let mut query = synthetic_query(&["one-block-flat"], &["one"]);
    query.finalize();
    query.finalize();
    assert_eq!(query.num_models(), 0);
    assert!(matches!(
        query.query_elevation(37.75, -122.25),
        Err(Error::NotInitialized)
    ));

    // a finalized engine can be brought back
    query
        .initialize(&["one-block-flat"], &["one"], INPUT_CRS)
        .unwrap();
    assert_eq!(query.num_models(), 1);
}
