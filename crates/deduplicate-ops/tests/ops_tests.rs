use deduplicate_analyze::DuplicateFinder;
use deduplicate_ops::{DeleteError, DeletionExecutor, KeepError, KeepFilter};
use filetime::{FileTime, set_file_mtime};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn duplicate_set(temp: &TempDir, names: &[&str], mtimes: &[i64]) -> Vec<PathBuf> {
    names
        .iter()
        .zip(mtimes)
        .map(|(name, mtime)| {
            let path = temp.path().join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(&path, "same bytes").unwrap();
            set_file_mtime(&path, FileTime::from_unix_time(*mtime, 0)).unwrap();
            path
        })
        .collect()
}

#[test]
fn test_last_modified_picks_newest() {
    let temp = TempDir::new().unwrap();
    let members = duplicate_set(&temp, &["old", "newest", "mid"], &[1_000, 3_000, 2_000]);

    let kept = KeepFilter::LastModified.select(&members).unwrap();
    assert_eq!(kept, vec![members[1].clone()]);
}

#[test]
fn test_last_modified_tie_goes_to_first() {
    let temp = TempDir::new().unwrap();
    let members = duplicate_set(&temp, &["a", "b", "c"], &[1_000, 5_000, 5_000]);

    let kept = KeepFilter::LastModified.select(&members).unwrap();
    assert_eq!(kept, vec![members[1].clone()]);
}

#[test]
fn test_first_modified_picks_oldest_first_on_ties() {
    let temp = TempDir::new().unwrap();
    let members = duplicate_set(&temp, &["a", "b", "c"], &[9_000, 2_000, 2_000]);

    let kept = KeepFilter::FirstModified.select(&members).unwrap();
    assert_eq!(kept, vec![members[1].clone()]);
}

#[test]
fn test_executor_removes_files() {
    let temp = TempDir::new().unwrap();
    let members = duplicate_set(&temp, &["x/a", "y/b", "z/c"], &[1_000, 3_000, 2_000]);

    let report = DeletionExecutor::new()
        .execute(&KeepFilter::LastModified, &members)
        .unwrap();

    assert_eq!(report.deleted, vec![members[0].clone(), members[2].clone()]);
    assert!(!members[0].exists());
    assert!(members[1].exists());
    assert!(!members[2].exists());
}

#[test]
fn test_dry_run_touches_nothing() {
    let temp = TempDir::new().unwrap();
    let members = duplicate_set(&temp, &["a", "b"], &[1_000, 2_000]);

    let report = DeletionExecutor::dry_run()
        .execute(&KeepFilter::position(1), &members)
        .unwrap();

    assert_eq!(report.deleted, vec![members[1].clone()]);
    assert!(members.iter().all(|p| p.exists()));
}

#[test]
fn test_missing_member_is_recorded_not_fatal() {
    let temp = TempDir::new().unwrap();
    let members = duplicate_set(&temp, &["a", "b", "c"], &[1_000, 2_000, 3_000]);
    fs::remove_file(&members[1]).unwrap();

    let report = DeletionExecutor::new()
        .execute(&KeepFilter::position(1), &members)
        .unwrap();

    assert_eq!(report.deleted, vec![members[2].clone()]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].path, members[1]);
}

#[test]
fn test_position_error_keeps_files() {
    let temp = TempDir::new().unwrap();
    let members = duplicate_set(&temp, &["a", "b"], &[1_000, 2_000]);

    let err = DeletionExecutor::new()
        .execute(&KeepFilter::position(3), &members)
        .unwrap_err();

    assert!(matches!(
        err,
        DeleteError::Keep(KeepError::PositionOutOfRange { .. })
    ));
    assert!(members.iter().all(|p| p.exists()));
}

#[test]
fn test_execute_group_counts_reclaimed_bytes() {
    let temp = TempDir::new().unwrap();
    let members = duplicate_set(&temp, &["a", "b", "c"], &[1_000, 2_000, 3_000]);

    let report = DuplicateFinder::new().find_duplicates(members.clone()).unwrap();
    let group = report.iter().next().unwrap();

    let outcome = DeletionExecutor::new()
        .execute_group(&KeepFilter::Shallowest, group)
        .unwrap();

    assert_eq!(outcome.kept, vec![members[0].clone()]);
    assert_eq!(outcome.bytes_reclaimed, 2 * "same bytes".len() as u64);
    assert!(members[0].exists());
    assert!(!members[1].exists());
}
