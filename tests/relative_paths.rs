//! Runs with relative roots; kept in its own test binary because it changes
//! the working directory of the process.

use std::fs;
use std::path::Path;

use labelkit::remap::batch_remap;
use labelkit::{FileOutcome, IdRemap};

#[test]
fn test_remap_dot_prefixed_roots_mirror_tree() {
    let temp_dir = tempfile::tempdir().unwrap();
    std::env::set_current_dir(temp_dir.path()).unwrap();
    fs::create_dir_all("labels/train").unwrap();
    fs::write("labels/train/a.txt", "0 0.5 0.5 0.1 0.1\n").unwrap();

    let report = batch_remap(Path::new("./labels"), Path::new("./out"), &IdRemap::default()).unwrap();
    assert_eq!(report.failed_conversions(), 0);
    assert_eq!(report.successful_conversions(), 1);

    match &report.files[0].result {
        Ok(FileOutcome::Converted { output, .. }) => {
            assert_eq!(output, Path::new("./out/train/a.txt"));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(
        fs::read_to_string("out/train/a.txt").unwrap(),
        "3 0.5 0.5 0.1 0.1\n"
    );
    assert!(!Path::new("out/labels").exists());
    assert_eq!(
        fs::read_to_string("labels/train/a.txt").unwrap(),
        "0 0.5 0.5 0.1 0.1\n"
    );
}
