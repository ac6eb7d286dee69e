//! Per-slice comparison against reference text files
//!
//! Runs the comparator on in-memory datasets with reference slices written
//! to a scratch directory.

use ndarray::{s, Array2, Array4};
use std::path::Path;

use wfn_compare::compare::{CompareOptions, Comparison, SliceCounts};
use wfn_compare::reference::{write_coeffs, write_gvecs, ReferenceLayout};
use wfn_compare::{KPointLayout, WfnArrays};

const NGK: [usize; 2] = [2, 3];
const NB: usize = 2;

/// Values that survive the `%13.6e` text format exactly
fn dataset() -> WfnArrays {
    let gvecs = Array2::from_shape_fn((5, 3), |(i, j)| (i as f64) - 2.0 * (j as f64));
    let coeffs = Array4::from_shape_fn((NB, 1, 5, 2), |(b, _, g, c)| {
        (b * 10 + g) as f64 * 0.25 - c as f64 * 0.5
    });
    WfnArrays::new(gvecs, coeffs).unwrap()
}

fn write_reference(dir: &Path, wfn: &WfnArrays) -> ReferenceLayout {
    let refs = ReferenceLayout::in_dir(dir);
    let layout = KPointLayout::new(&NGK);
    for (ik, range) in layout.ranges() {
        let gs = wfn.gvecs.slice(s![range.clone(), ..]).mapv(|g| g as i32);
        write_gvecs(refs.gvecs_path(ik), gs.view()).unwrap();
        for ib in 0..NB {
            write_coeffs(refs.coeffs_path(ik, ib), wfn.coeffs.slice(s![ib, 0, range.clone(), ..])).unwrap();
        }
    }
    refs
}

#[test]
fn test_identical_datasets_match_reference_exactly() {
    let dir = tempfile::tempdir().unwrap();
    let orig = dataset();
    let output = dataset();
    let refs = write_reference(dir.path(), &orig);

    let layout = KPointLayout::new(&NGK);
    let cmp = Comparison::new(&layout, &orig, &output);
    let options = CompareOptions { per_slice: true, reference: refs };
    let mut out = Vec::new();
    let report = cmp
        .run(&options, || Ok(SliceCounts { nk: 2, nb: NB }), &mut out)
        .unwrap();

    assert_eq!(report.kpoints.len(), 2);
    assert_eq!(report.kpoints[1].bands.len(), NB);
    assert_eq!(report.worst(), 0.0);

    let text = String::from_utf8(out).unwrap();
    let expected_kpoint = "G-vectors\n\
        \x20 Text file - orig WFN error: 0.000000e0\n\
        \x20 Text file - output WFN error: 0.000000e0\n\
        \n\
        Coefficients\n\
        \x20 Text file - orig WFN error: 0.000000e0\n\
        \x20 Text file - output WFN error: 0.000000e0\n\
        \x20 Text file - orig WFN error: 0.000000e0\n\
        \x20 Text file - output WFN error: 0.000000e0\n\
        \n";
    let expected = format!(
        "G-vector error: 0.000000e0\nWFN error: 0.000000e0\n{}{}",
        expected_kpoint, expected_kpoint
    );
    assert_eq!(text, expected);
}

#[test]
fn test_perturbed_output_shows_in_its_slice_only() {
    let dir = tempfile::tempdir().unwrap();
    let orig = dataset();
    let mut output = dataset();
    // Row 3 is the second G-vector of k-point 1
    output.coeffs[[1, 0, 3, 0]] += 3.0;
    output.coeffs[[1, 0, 3, 1]] += 4.0;
    let refs = write_reference(dir.path(), &orig);

    let layout = KPointLayout::new(&NGK);
    let cmp = Comparison::new(&layout, &orig, &output);
    let options = CompareOptions { per_slice: true, reference: refs };
    let mut out = Vec::new();
    let report = cmp
        .run(&options, || Ok(SliceCounts { nk: 2, nb: NB }), &mut out)
        .unwrap();

    assert_eq!(report.global.gvecs, 0.0);
    assert_eq!(report.global.coeffs, 5.0);

    let k0 = &report.kpoints[0];
    assert!(k0.bands.iter().all(|e| e.orig == 0.0 && e.output == 0.0));

    let k1 = &report.kpoints[1];
    assert_eq!(k1.gvecs.output, 0.0);
    assert_eq!(k1.bands[0].output, 0.0);
    assert_eq!(k1.bands[1].orig, 0.0);
    assert_eq!(k1.bands[1].output, 5.0);
}

#[test]
fn test_missing_reference_file_aborts() {
    let dir = tempfile::tempdir().unwrap();
    let orig = dataset();
    let refs = write_reference(dir.path(), &orig);
    let missing = refs.coeffs_path(1, 1);
    std::fs::remove_file(&missing).unwrap();

    let layout = KPointLayout::new(&NGK);
    let cmp = Comparison::new(&layout, &orig, &orig);
    let options = CompareOptions { per_slice: true, reference: refs };
    let mut out = Vec::new();
    let err = cmp
        .run(&options, || Ok(SliceCounts { nk: 2, nb: NB }), &mut out)
        .unwrap_err();

    assert!(format!("{:#}", err).contains("coeffs_ik_01_ib_0001.dat"));

    // Everything up to the missing file was already reported
    let text = String::from_utf8(out).unwrap();
    assert_eq!(text.matches("G-vectors").count(), 2);
    assert_eq!(text.matches("output WFN error").count(), 3 + 2);
}

#[test]
fn test_reference_with_wrong_row_count_fails() {
    let dir = tempfile::tempdir().unwrap();
    let orig = dataset();
    let refs = write_reference(dir.path(), &orig);
    std::fs::write(refs.gvecs_path(0), "   0   0   0\n").unwrap();

    let layout = KPointLayout::new(&NGK);
    let cmp = Comparison::new(&layout, &orig, &orig);
    let err = cmp.gvecs_slice(0, &refs).unwrap_err();
    assert!(format!("{:#}", err).contains("Shape mismatch"));
}

#[test]
fn test_nrk_beyond_ngk_fails() {
    let dir = tempfile::tempdir().unwrap();
    let orig = dataset();
    let refs = write_reference(dir.path(), &orig);

    let layout = KPointLayout::new(&NGK);
    let cmp = Comparison::new(&layout, &orig, &orig);
    let options = CompareOptions { per_slice: true, reference: refs };
    let mut out = Vec::new();
    assert!(cmp
        .run(&options, || Ok(SliceCounts { nk: 3, nb: NB }), &mut out)
        .is_err());
}
