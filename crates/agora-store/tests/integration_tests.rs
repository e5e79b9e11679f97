//! Integration tests for agora-store
//!
//! These tests verify the atomic mutation primitives the core engine builds
//! on: keyed vote rows, counter increments, cascade deletion.

use agora_domain::traits::{AccountStore, ContentStore, NotificationStore};
use agora_domain::{
    Account, AccountCounter, AccountId, Answer, Authorship, ContentId, ItemKind, Notification,
    NotificationDraft, NotificationKind, Question, VoteDirection,
};
use agora_store::SqliteStore;

fn sample_account() -> Account {
    Account::new(
        AccountId::new(),
        "ada".to_string(),
        "ada@example.org".to_string(),
    )
}

fn sample_question(author: AccountId) -> Question {
    Question {
        id: ContentId::new(),
        title: "How do I test a store?".to_string(),
        body: "With an in-memory database.".to_string(),
        tags: vec!["testing".to_string(), "sqlite".to_string()],
        author: Authorship::Account(author),
        real_author: author,
        is_accepted: false,
        answer_count: 0,
        view_count: 0,
        created_at: 1_000,
    }
}

fn sample_answer(question_id: ContentId, author: AccountId) -> Answer {
    Answer {
        id: ContentId::new(),
        question_id,
        body: "Like this.".to_string(),
        author: Authorship::Account(author),
        real_author: author,
        is_accepted: false,
        created_at: 1_100,
    }
}

#[test]
fn test_store_initialization() {
    let store = SqliteStore::new(":memory:");
    assert!(store.is_ok(), "Store should initialize successfully");
}

#[test]
fn test_on_disk_store_reopens() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("agora.db");

    let account = sample_account();
    {
        let mut store = SqliteStore::new(&path).unwrap();
        store.insert_account(&account).unwrap();
    }

    let store = SqliteStore::new(&path).unwrap();
    let reloaded = store.get_account(account.id).unwrap().unwrap();
    assert_eq!(reloaded, account);
}

#[test]
fn test_account_roundtrip_with_moderation_state() {
    let mut store = SqliteStore::new(":memory:").unwrap();

    let mut account = sample_account();
    account.suspended_from = Some(100);
    account.suspended_until = Some(200);
    account.suspension_reason = Some("spam".to_string());
    account.moderator = true;

    store.insert_account(&account).unwrap();
    let retrieved = store.get_account(account.id).unwrap().unwrap();
    assert_eq!(retrieved, account);

    assert!(store.get_account(AccountId::new()).unwrap().is_none());
}

#[test]
fn test_reputation_and_counter_adjustments() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let account = sample_account();
    store.insert_account(&account).unwrap();

    store.adjust_reputation(account.id, 50).unwrap();
    store.adjust_reputation(account.id, 100).unwrap();
    store
        .adjust_counter(account.id, AccountCounter::QuestionsAsked, 1)
        .unwrap();
    store
        .adjust_counter(account.id, AccountCounter::AcceptedAnswers, 1)
        .unwrap();

    let retrieved = store.get_account(account.id).unwrap().unwrap();
    assert_eq!(retrieved.reputation, 150);
    assert_eq!(retrieved.questions_asked, 1);
    assert_eq!(retrieved.answers_given, 0);
    assert_eq!(retrieved.accepted_answers, 1);

    // Adjusting a missing account surfaces an error, not silence.
    assert!(store.adjust_reputation(AccountId::new(), 1).is_err());
}

#[test]
fn test_question_roundtrip_per_authorship() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let account = sample_account();
    store.insert_account(&account).unwrap();

    for author in [
        Authorship::Account(account.id),
        Authorship::Anonymous("tok-123".to_string()),
        Authorship::Withheld,
    ] {
        let mut question = sample_question(account.id);
        question.author = author.clone();
        store.insert_question(&question).unwrap();

        let retrieved = store.get_question(question.id).unwrap().unwrap();
        assert_eq!(retrieved, question);
        assert_eq!(retrieved.author, author);
    }
}

#[test]
fn test_answers_for_question_in_creation_order() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let account = sample_account();
    store.insert_account(&account).unwrap();
    let question = sample_question(account.id);
    store.insert_question(&question).unwrap();

    let mut first = sample_answer(question.id, account.id);
    first.created_at = 10;
    let mut second = sample_answer(question.id, account.id);
    second.created_at = 20;
    store.insert_answer(&second).unwrap();
    store.insert_answer(&first).unwrap();

    let answers = store.answers_for_question(question.id).unwrap();
    assert_eq!(answers.len(), 2);
    assert_eq!(answers[0].id, first.id);
    assert_eq!(answers[1].id, second.id);
}

#[test]
fn test_vote_upsert_keeps_sets_disjoint() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let account = sample_account();
    store.insert_account(&account).unwrap();
    let question = sample_question(account.id);
    store.insert_question(&question).unwrap();

    let voter = AccountId::new();
    store
        .put_vote(ItemKind::Question, question.id, voter, VoteDirection::Up)
        .unwrap();
    // Same keyed row: the flip replaces, never duplicates.
    store
        .put_vote(ItemKind::Question, question.id, voter, VoteDirection::Down)
        .unwrap();

    let sets = store.vote_sets(ItemKind::Question, question.id).unwrap();
    assert!(sets.upvotes.is_empty());
    assert_eq!(sets.downvotes, vec![voter]);
}

#[test]
fn test_directional_vote_removal() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let account = sample_account();
    store.insert_account(&account).unwrap();
    let question = sample_question(account.id);
    store.insert_question(&question).unwrap();

    let voter = AccountId::new();
    store
        .put_vote(ItemKind::Question, question.id, voter, VoteDirection::Up)
        .unwrap();

    // Removing the opposite direction touches nothing.
    let removed = store
        .remove_vote_in_direction(ItemKind::Question, question.id, voter, VoteDirection::Down)
        .unwrap();
    assert!(!removed);

    let removed = store
        .remove_vote_in_direction(ItemKind::Question, question.id, voter, VoteDirection::Up)
        .unwrap();
    assert!(removed);

    let sets = store.vote_sets(ItemKind::Question, question.id).unwrap();
    assert!(sets.upvotes.is_empty() && sets.downvotes.is_empty());
}

#[test]
fn test_question_cascade_removes_answers_and_votes() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let account = sample_account();
    store.insert_account(&account).unwrap();
    let question = sample_question(account.id);
    store.insert_question(&question).unwrap();
    let answer = sample_answer(question.id, account.id);
    store.insert_answer(&answer).unwrap();

    store
        .put_vote(ItemKind::Answer, answer.id, account.id, VoteDirection::Up)
        .unwrap();
    store
        .put_vote(ItemKind::Question, question.id, account.id, VoteDirection::Up)
        .unwrap();

    let deleted = store.delete_question_cascade(question.id).unwrap();
    assert!(deleted);

    assert!(store.get_question(question.id).unwrap().is_none());
    assert!(store.get_answer(answer.id).unwrap().is_none());
    assert!(store
        .vote_sets(ItemKind::Answer, answer.id)
        .unwrap()
        .upvotes
        .is_empty());
    assert!(store
        .vote_sets(ItemKind::Question, question.id)
        .unwrap()
        .upvotes
        .is_empty());

    // Deleting again reports absence.
    assert!(!store.delete_question_cascade(question.id).unwrap());
}

#[test]
fn test_acceptance_flags_and_count() {
    let mut store = SqliteStore::new(":memory:").unwrap();
    let account = sample_account();
    store.insert_account(&account).unwrap();
    let question = sample_question(account.id);
    store.insert_question(&question).unwrap();
    let answer = sample_answer(question.id, account.id);
    store.insert_answer(&answer).unwrap();

    assert_eq!(store.accepted_answer_count(question.id).unwrap(), 0);

    store.set_answer_accepted(answer.id, true).unwrap();
    assert_eq!(store.accepted_answer_count(question.id).unwrap(), 1);

    store.set_question_accepted(question.id, true).unwrap();
    assert!(store.get_question(question.id).unwrap().unwrap().is_accepted);
}

#[test]
fn test_notification_roundtrip_and_read_flag() {
    let mut store = SqliteStore::new(":memory:").unwrap();

    let recipient = AccountId::new();
    let sender = AccountId::new();
    let draft = NotificationDraft {
        recipient,
        sender: Some(sender),
        kind: NotificationKind::Answer,
        title: "New answer".to_string(),
        message: "Your question received an answer".to_string(),
        question_id: Some(ContentId::new()),
        answer_id: Some(ContentId::new()),
    };
    let notification = Notification::from_draft(draft, 2_000);
    store.insert_notification(&notification).unwrap();

    let listed = store.notifications_for(recipient).unwrap();
    assert_eq!(listed, vec![notification.clone()]);

    // Only the recipient can mark it read.
    assert!(!store.mark_read(notification.id, sender).unwrap());
    assert!(store.mark_read(notification.id, recipient).unwrap());
    assert!(store.notifications_for(recipient).unwrap()[0].read);
}
