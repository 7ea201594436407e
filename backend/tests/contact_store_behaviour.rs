//! Behavioural tests for the contact store against in-memory storage.

use std::time::Instant;

use accounts::domain::ports::ContactRecordsError;
use accounts::domain::{
    Channel, Contact, ContactId, ContactStore, Contacts, ErrorCode, OperationContext, UserId,
};
use accounts::test_support::{FixedClock, InMemoryContactRecords};
use chrono::{TimeZone, Utc};
use rstest::{fixture, rstest};
use uuid::Uuid;

#[fixture]
fn store() -> ContactStore {
    let now = Utc
        .with_ymd_and_hms(2026, 3, 14, 9, 0, 0)
        .single()
        .expect("valid fixture timestamp");
    ContactStore::new(FixedClock::shared(now))
}

#[fixture]
fn records() -> InMemoryContactRecords {
    InMemoryContactRecords::new()
}

fn ada() -> UserId {
    UserId::new(1)
}

fn grace() -> UserId {
    UserId::new(2)
}

#[rstest]
#[tokio::test]
async fn creating_the_same_contact_twice_fails(
    store: ContactStore,
    mut records: InMemoryContactRecords,
) {
    let ctx = OperationContext::background();
    let mut first = Contact::new(ada(), Channel::Email, "ada@example.com");
    store
        .create(&ctx, &mut records, &mut first)
        .await
        .expect("first insert succeeds");
    assert_eq!(first.id, Some(ContactId::new(1)));

    let mut second = Contact::new(ada(), Channel::Email, " ADA@example.com ");
    let err = store
        .create(&ctx, &mut records, &mut second)
        .await
        .expect_err("duplicate rejected");

    assert_eq!(err.code(), ErrorCode::AlreadyExists);
    assert_eq!(records.rows().len(), 1);
}

#[rstest]
#[tokio::test]
async fn different_owners_may_share_a_value(
    store: ContactStore,
    mut records: InMemoryContactRecords,
) {
    let ctx = OperationContext::background();
    for owner in [ada(), grace()] {
        let mut contact = Contact::new(owner, Channel::Phone, "202-555-0158");
        store
            .create(&ctx, &mut records, &mut contact)
            .await
            .expect("insert succeeds");
    }

    let mut probe = Contact::new(grace(), Channel::Phone, "+1 202 555 0158");
    store
        .get_existing(&ctx, &mut records, &mut probe)
        .await
        .expect("existing contact found");
    assert_eq!(probe.user_id, ada());
}

#[rstest]
#[tokio::test]
async fn batch_is_all_or_nothing(store: ContactStore, mut records: InMemoryContactRecords) {
    let ctx = OperationContext::background();
    let mut existing = Contact::new(ada(), Channel::Email, "ada@example.com");
    store
        .create(&ctx, &mut records, &mut existing)
        .await
        .expect("seed contact");

    let mut batch = Contacts::from(vec![
        Contact::new(ada(), Channel::Phone, "202-555-0158"),
        Contact::new(ada(), Channel::Email, "Ada@Example.com"),
    ]);
    let err = store
        .batch_create(&ctx, &mut records, &mut batch)
        .await
        .expect_err("duplicate in batch");

    assert_eq!(err.code(), ErrorCode::InvalidArgument);
    assert_eq!(err.message(), "contact already exists");
    assert_eq!(records.rows().len(), 1);
}

#[rstest]
#[tokio::test]
async fn invalid_batch_never_reaches_storage(
    store: ContactStore,
    mut records: InMemoryContactRecords,
) {
    let mut batch = Contacts::from(vec![
        Contact::new(ada(), Channel::Email, "ada@example.com"),
        Contact::new(ada(), Channel::Phone, "12"),
    ]);
    let err = store
        .batch_create(&OperationContext::background(), &mut records, &mut batch)
        .await
        .expect_err("invalid phone");

    assert_eq!(err.code(), ErrorCode::InvalidArgument);
    assert_eq!(records.calls(), 0);
}

#[rstest]
#[tokio::test]
async fn batch_returns_stored_rows(store: ContactStore, mut records: InMemoryContactRecords) {
    let ctx = OperationContext::background();
    let mut batch = Contacts::from(vec![
        Contact::new(ada(), Channel::Email, "ada@example.com"),
        Contact::new(ada(), Channel::Phone, "202-555-0158"),
    ]);
    store
        .batch_create(&ctx, &mut records, &mut batch)
        .await
        .expect("batch succeeds");

    assert!(batch.iter().all(|contact| contact.id.is_some()));
    let found = store
        .find_by_user_id(&ctx, &mut records, ada())
        .await
        .expect("lookup succeeds");
    assert_eq!(found, batch);
}

#[rstest]
#[tokio::test]
async fn update_then_lookup_by_verify_id(
    store: ContactStore,
    mut records: InMemoryContactRecords,
) {
    let ctx = OperationContext::background();
    let mut contact = Contact::new(ada(), Channel::Email, "ada@example.com");
    store
        .create(&ctx, &mut records, &mut contact)
        .await
        .expect("insert succeeds");

    let verify_id = Uuid::new_v4();
    contact.verify_id = Some(verify_id);
    contact.confirmation_requests = 1;
    let affected = store
        .update(&ctx, &mut records, &mut contact)
        .await
        .expect("update succeeds");
    assert_eq!(affected, 1);

    let found = store
        .get_by_verify_id(&ctx, &mut records, verify_id)
        .await
        .expect("contact found by verify id");
    assert_eq!(found.id, contact.id);
    assert_eq!(found.confirmation_requests, 1);
}

#[rstest]
#[tokio::test]
async fn update_of_unknown_id_affects_nothing(
    store: ContactStore,
    mut records: InMemoryContactRecords,
) {
    let mut contact = Contact::new(ada(), Channel::Email, "ada@example.com");
    contact.id = Some(ContactId::new(404));

    let affected = store
        .update(&OperationContext::background(), &mut records, &mut contact)
        .await
        .expect("update runs");

    assert_eq!(affected, 0);
}

#[rstest]
#[tokio::test]
async fn delete_removes_exactly_one_row(
    store: ContactStore,
    mut records: InMemoryContactRecords,
) {
    let ctx = OperationContext::background();
    let mut contact = Contact::new(ada(), Channel::Email, "ada@example.com");
    store
        .create(&ctx, &mut records, &mut contact)
        .await
        .expect("insert succeeds");
    let id = contact.id.expect("stored id");

    store
        .delete_by_id(&ctx, &mut records, id)
        .await
        .expect("delete succeeds");
    let err = store
        .delete_by_id(&ctx, &mut records, id)
        .await
        .expect_err("already deleted");
    assert_eq!(err.code(), ErrorCode::NotFound);

    let err = store
        .get_by_id(&ctx, &mut records, id)
        .await
        .expect_err("row gone");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn unknown_user_has_no_contacts(store: ContactStore, mut records: InMemoryContactRecords) {
    let contacts = store
        .find_by_user_id(&OperationContext::background(), &mut records, grace())
        .await
        .expect("empty result is not an error");

    assert!(contacts.is_empty());
}

#[rstest]
#[tokio::test]
async fn email_exists_spans_all_owners(store: ContactStore, mut records: InMemoryContactRecords) {
    let ctx = OperationContext::background();
    let mut contact = Contact::new(grace(), Channel::Email, "grace@example.com");
    store
        .create(&ctx, &mut records, &mut contact)
        .await
        .expect("insert succeeds");

    assert!(
        store
            .email_exists(&ctx, &mut records, "GRACE@example.com")
            .await
            .expect("check runs")
    );
    assert!(
        !store
            .email_exists(&ctx, &mut records, "ada@example.com")
            .await
            .expect("check runs")
    );
}

#[rstest]
#[tokio::test]
async fn expired_deadline_is_observed_before_storage(
    store: ContactStore,
    mut records: InMemoryContactRecords,
) {
    let ctx = OperationContext::background().with_deadline(Instant::now());

    let err = store
        .find_by_user_id(&ctx, &mut records, ada())
        .await
        .expect_err("deadline passed");

    assert_eq!(err.code(), ErrorCode::Cancelled);
    assert_eq!(records.calls(), 0);
}

#[rstest]
#[tokio::test]
async fn storage_failures_surface_as_internal(
    store: ContactStore,
    mut records: InMemoryContactRecords,
) {
    records.fail_next(ContactRecordsError::connection("connection reset"));

    let err = store
        .get_by_id(&OperationContext::background(), &mut records, ContactId::new(1))
        .await
        .expect_err("storage failure");

    assert_eq!(err.code(), ErrorCode::Internal);
    assert!(err.message().contains("connection reset"));
}
