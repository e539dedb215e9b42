use covid19ru::check::{check_all, Checker};
use covid19ru::fetch::regions::REGIONS;
use covid19ru::fetch::CSSE2_HEADER;
use std::fs;
use std::path::Path;

/// Write a Format2 snapshot with `n` regions; `confirmed(i)` gives region i's count.
fn write_regions(dir: &Path, name: &str, n: usize, confirmed: impl Fn(usize) -> i64) {
    let mut text = String::from(CSSE2_HEADER);
    for (i, (region, _)) in REGIONS.iter().take(n).enumerate() {
        let c = confirmed(i);
        text.push_str(&format!(
            "\n,,\"{region}\",Russia,2020-03-25 10:00:00,55.0,37.0,{c},0,0,{c},\"{region}, Russia\""
        ));
    }
    text.push('\n');
    fs::write(dir.join(name), text).unwrap();
}

#[test]
fn format1_file_is_skipped_and_full_list_passes() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("03-21-2020.csv"), "not,a,real\nsnapshot").unwrap();
    write_regions(dir.path(), "03-25-2020.csv", 55, |i| 10 + i as i64);

    let errors = check_all(dir.path());
    assert!(errors.is_empty(), "unexpected errors: {errors:?}");
}

#[test]
fn one_region_missing_from_full_list() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("03-21-2020.csv"), "anything").unwrap();
    write_regions(dir.path(), "03-25-2020.csv", 54, |_| 10);

    let errors = check_all(dir.path());
    assert_eq!(errors.len(), 1);
    assert!(errors[0].file.ends_with("03-25-2020.csv"));
    assert!(
        errors[0].message.contains("Expected 55, found 54"),
        "{}",
        errors[0].message
    );
}

#[test]
fn decrease_reported_once_and_baseline_dropped() {
    let dir = tempfile::tempdir().unwrap();
    write_regions(dir.path(), "03-25-2020.csv", 55, |_| 100);
    write_regions(dir.path(), "03-26-2020.csv", 55, |i| if i == 3 { 90 } else { 110 });
    // Lower than 03-25 for every region, but the failed day cleared the baseline.
    write_regions(dir.path(), "03-27-2020.csv", 55, |_| 50);
    write_regions(dir.path(), "03-28-2020.csv", 55, |_| 60);

    let errors = check_all(dir.path());
    assert_eq!(errors.len(), 1, "{errors:?}");
    assert!(errors[0].file.ends_with("03-26-2020.csv"));
    assert!(errors[0].message.contains("confirmed decreased"), "{}", errors[0].message);
    assert!(errors[0].message.contains("100 -> 90"), "{}", errors[0].message);
}

#[test]
fn negative_count_is_ill_formed() {
    let dir = tempfile::tempdir().unwrap();
    write_regions(dir.path(), "03-25-2020.csv", 55, |i| if i == 0 { -1 } else { 5 });

    let errors = check_all(dir.path());
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.starts_with("Ill-formed confirmed"), "{}", errors[0].message);
}

#[test]
fn files_with_undated_names_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("README.csv"), CSSE2_HEADER).unwrap();

    let errors = check_all(dir.path());
    assert_eq!(errors.len(), 1);
    assert!(errors[0].file.ends_with("README.csv"));
}

#[test]
fn nested_folders_checked_after_files() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("archive");
    fs::create_dir(&nested).unwrap();
    write_regions(dir.path(), "03-26-2020.csv", 55, |_| 100);
    write_regions(&nested, "03-25-2020.csv", 55, |_| 80);

    let mut checker = Checker::new();
    let errors = checker.run(dir.path());
    assert_eq!(errors.len(), 1, "{errors:?}");
    assert!(errors[0].file.ends_with("archive/03-25-2020.csv"));
}
