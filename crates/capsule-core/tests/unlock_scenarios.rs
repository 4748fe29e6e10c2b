use std::fs;

use chrono::{Duration, Utc};
use secrecy::SecretString;
use tempfile::{tempdir, TempDir};

use capsule_core::scheduler::{FixedPassword, SkipReason};
use capsule_core::storage::{Capsule, CapsuleStatus, ContentType};
use capsule_core::{
    parse_unlock_time, seal, CapsuleError, CapsuleStore, ContentDisplay, Result, Scheduler,
    SealRequest, SqliteCapsuleStore, StoreConfig,
};

const TEST_ITERATIONS: u32 = 1_000;

#[derive(Default)]
struct RecordingDisplay {
    shown: Vec<(ContentType, Vec<u8>, String)>,
    fail: bool,
}

impl ContentDisplay for RecordingDisplay {
    fn show(&mut self, content_type: ContentType, plaintext: &[u8], title: &str) -> Result<()> {
        if self.fail {
            return Err(CapsuleError::Display("no viewer available".to_string()));
        }
        self.shown
            .push((content_type, plaintext.to_vec(), title.to_string()));
        Ok(())
    }
}

fn scheduler() -> (TempDir, Scheduler<SqliteCapsuleStore>) {
    let dir = tempdir().unwrap();
    let store = SqliteCapsuleStore::open(StoreConfig::under(dir.path())).unwrap();
    (
        dir,
        Scheduler::new(store).with_kdf_iterations(TEST_ITERATIONS),
    )
}

fn seal_text(
    scheduler: &mut Scheduler<SqliteCapsuleStore>,
    title: &str,
    message: &[u8],
    password: &str,
    unlock_in: Duration,
) -> i64 {
    seal(
        scheduler.store_mut(),
        &SealRequest {
            title,
            unlock_time: Utc::now() + unlock_in,
            content_type: ContentType::Text,
            plaintext: message,
            password,
        },
        TEST_ITERATIONS,
    )
    .unwrap()
}

fn status(scheduler: &Scheduler<SqliteCapsuleStore>, id: i64) -> CapsuleStatus {
    scheduler.store().get(id).unwrap().unwrap().status
}

#[test]
fn test_due_capsule_is_displayed_once() {
    let (_dir, mut scheduler) = scheduler();
    let id = seal_text(&mut scheduler, "hello", b"hi future me", "pw", Duration::seconds(-1));

    let mut display = RecordingDisplay::default();
    let mut passwords = FixedPassword::new("pw");

    let report = scheduler
        .check_and_unlock(Utc::now(), &mut passwords, &mut display)
        .unwrap();
    assert_eq!(report.unlocked, vec![id]);
    assert!(report.skipped.is_empty());
    assert_eq!(
        display.shown,
        vec![(ContentType::Text, b"hi future me".to_vec(), "hello".to_string())]
    );
    assert_eq!(status(&scheduler, id), CapsuleStatus::Unlocked);
    assert!(scheduler.store().get(id).unwrap().unwrap().unlocked_at.is_some());

    let again = scheduler
        .check_and_unlock(Utc::now(), &mut passwords, &mut display)
        .unwrap();
    assert_eq!(again.due(), 0);
    assert_eq!(display.shown.len(), 1);
}

#[test]
fn test_future_capsule_is_not_touched() {
    let (_dir, mut scheduler) = scheduler();
    let id = seal_text(&mut scheduler, "later", b"not yet", "pw", Duration::days(3));

    let mut display = RecordingDisplay::default();
    let report = scheduler
        .check_and_unlock(Utc::now(), &mut FixedPassword::new("pw"), &mut display)
        .unwrap();

    assert_eq!(report.due(), 0);
    assert!(display.shown.is_empty());
    assert_eq!(status(&scheduler, id), CapsuleStatus::Locked);
}

#[test]
fn test_wrong_password_keeps_capsule_locked() {
    let (_dir, mut scheduler) = scheduler();
    let id = seal_text(&mut scheduler, "secret", b"plans", "right", Duration::seconds(-1));
    let mut display = RecordingDisplay::default();

    let report = scheduler
        .check_and_unlock(Utc::now(), &mut FixedPassword::new("wrong"), &mut display)
        .unwrap();
    assert!(report.unlocked.is_empty());
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].reason, SkipReason::AuthenticationFailed);
    assert!(display.shown.is_empty());
    assert_eq!(status(&scheduler, id), CapsuleStatus::Locked);

    let report = scheduler
        .check_and_unlock(Utc::now(), &mut FixedPassword::new("right"), &mut display)
        .unwrap();
    assert_eq!(report.unlocked, vec![id]);
    assert_eq!(display.shown[0].1, b"plans".to_vec());
}

#[test]
fn test_missing_blob_does_not_block_others() {
    let (dir, mut scheduler) = scheduler();
    let lost = seal_text(&mut scheduler, "lost", b"gone", "pw", Duration::seconds(-2));
    let kept = seal_text(&mut scheduler, "kept", b"still here", "pw", Duration::seconds(-1));

    let lost_ref = scheduler.store().get(lost).unwrap().unwrap().ciphertext_ref;
    fs::remove_file(dir.path().join("capsule_files").join(lost_ref)).unwrap();

    let mut display = RecordingDisplay::default();
    let report = scheduler
        .check_and_unlock(Utc::now(), &mut FixedPassword::new("pw"), &mut display)
        .unwrap();

    assert_eq!(report.unlocked, vec![kept]);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].id, lost);
    assert_eq!(report.skipped[0].reason, SkipReason::BlobMissing);
    assert_eq!(status(&scheduler, lost), CapsuleStatus::Locked);
    assert_eq!(status(&scheduler, kept), CapsuleStatus::Unlocked);
    assert_eq!(display.shown.len(), 1);
    assert_eq!(display.shown[0].2, "kept");
}

#[test]
fn test_display_failure_keeps_capsule_locked() {
    let (_dir, mut scheduler) = scheduler();
    let id = seal_text(&mut scheduler, "photo night", b"bytes", "pw", Duration::seconds(-1));

    let mut failing = RecordingDisplay {
        fail: true,
        ..Default::default()
    };
    let report = scheduler
        .check_and_unlock(Utc::now(), &mut FixedPassword::new("pw"), &mut failing)
        .unwrap();
    assert_eq!(report.skipped[0].reason, SkipReason::Display);
    assert_eq!(status(&scheduler, id), CapsuleStatus::Locked);

    let mut working = RecordingDisplay::default();
    let report = scheduler
        .check_and_unlock(Utc::now(), &mut FixedPassword::new("pw"), &mut working)
        .unwrap();
    assert_eq!(report.unlocked, vec![id]);
}

#[test]
fn test_password_source_can_decline() {
    let (_dir, mut scheduler) = scheduler();
    let declined = seal_text(&mut scheduler, "skip me", b"a", "pw", Duration::seconds(-2));
    let opened = seal_text(&mut scheduler, "open me", b"b", "pw", Duration::seconds(-1));

    let mut passwords = |capsule: &Capsule| -> Result<SecretString> {
        if capsule.title == "skip me" {
            Err(CapsuleError::PasswordUnavailable("cancelled".to_string()))
        } else {
            Ok(SecretString::from("pw".to_string()))
        }
    };
    let mut display = RecordingDisplay::default();

    let report = scheduler
        .check_and_unlock(Utc::now(), &mut passwords, &mut display)
        .unwrap();

    assert_eq!(report.unlocked, vec![opened]);
    assert_eq!(report.skipped[0].id, declined);
    assert_eq!(report.skipped[0].reason, SkipReason::PasswordUnavailable);
}

#[test]
fn test_seal_rejects_blank_title_and_password() {
    let (dir, mut scheduler) = scheduler();
    let request = SealRequest {
        title: "  ",
        unlock_time: Utc::now(),
        content_type: ContentType::Text,
        plaintext: b"x",
        password: "pw",
    };
    assert!(matches!(
        seal(scheduler.store_mut(), &request, TEST_ITERATIONS),
        Err(CapsuleError::EmptyTitle)
    ));

    let request = SealRequest {
        title: "ok",
        password: "",
        ..request
    };
    assert!(matches!(
        seal(scheduler.store_mut(), &request, TEST_ITERATIONS),
        Err(CapsuleError::Validation(_))
    ));

    assert!(scheduler.store().list_all().unwrap().is_empty());
    assert_eq!(
        fs::read_dir(dir.path().join("capsule_files")).unwrap().count(),
        0
    );
}

#[test]
fn test_seal_uses_fresh_salt_and_nonce() {
    let (_dir, mut scheduler) = scheduler();
    let a = seal_text(&mut scheduler, "a", b"same", "pw", Duration::hours(1));
    let b = seal_text(&mut scheduler, "b", b"same", "pw", Duration::hours(1));

    let a = scheduler.store().get(a).unwrap().unwrap();
    let b = scheduler.store().get(b).unwrap().unwrap();
    assert_eq!(a.salt.len(), 16);
    assert_eq!(a.nonce.len(), 12);
    assert_ne!(a.salt, b.salt);
    assert_ne!(a.nonce, b.nonce);
    assert_ne!(
        scheduler.store().read_ciphertext(&a.ciphertext_ref).unwrap(),
        scheduler.store().read_ciphertext(&b.ciphertext_ref).unwrap()
    );
}

#[test]
fn test_seal_trims_title() {
    let (_dir, mut scheduler) = scheduler();
    let id = seal_text(&mut scheduler, "  padded  ", b"x", "pw", Duration::hours(1));
    assert_eq!(scheduler.store().get(id).unwrap().unwrap().title, "padded");
}

#[test]
fn test_far_future_unlock_time_does_not_block_due_capsules() {
    let (_dir, mut scheduler) = scheduler();
    let due = seal_text(&mut scheduler, "due", b"now", "pw", Duration::seconds(-1));

    let far = parse_unlock_time("500000w");
    assert!(matches!(far, Err(CapsuleError::InvalidUnlockTime(_))));

    let result = seal(
        scheduler.store_mut(),
        &SealRequest {
            title: "far",
            unlock_time: Utc::now() + Duration::weeks(500_000),
            content_type: ContentType::Text,
            plaintext: b"later",
            password: "pw",
        },
        TEST_ITERATIONS,
    );
    assert!(matches!(result, Err(CapsuleError::InvalidUnlockTime(_))));

    let mut display = RecordingDisplay::default();
    let report = scheduler
        .check_and_unlock(Utc::now(), &mut FixedPassword::new("pw"), &mut display)
        .unwrap();
    assert_eq!(report.unlocked, vec![due]);
    assert_eq!(scheduler.store().list_all().unwrap().len(), 1);
}
