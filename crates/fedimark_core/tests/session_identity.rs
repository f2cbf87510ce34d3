mod common;

use common::{Call, FakeDirectory};
use fedimark_core::{DirectoryError, Identity, Session};

fn resolve_calls(directory: &FakeDirectory) -> usize {
    directory.count(|call| matches!(call, Call::ResolveSelf))
}

#[test]
fn identity_is_resolved_once_and_cached() {
    let session = Session::new(FakeDirectory::new());
    assert!(session.cached_identity().is_none());

    let first = session.identity().unwrap().clone();
    let second = session.identity().unwrap().clone();

    assert_eq!(first, second);
    assert_eq!(first.acct, "bot@example.social");
    assert_eq!(resolve_calls(session.client()), 1);
    assert_eq!(session.cached_identity(), Some(&first));
}

#[test]
fn failed_resolution_is_returned_and_not_cached() {
    let directory = FakeDirectory::new();
    directory.fail(|failures| failures.resolve_self = true);
    let session = Session::new(directory);

    assert_eq!(session.identity().unwrap_err(), DirectoryError::Unauthorized);
    assert!(session.cached_identity().is_none());

    session.client().reset_failures();
    assert!(session.identity().is_ok());
    assert_eq!(resolve_calls(session.client()), 2);
}

#[test]
fn concurrent_first_use_resolves_once() {
    let session = Session::new(FakeDirectory::new());
    std::thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| {
                session.identity().unwrap();
            });
        }
    });
    assert_eq!(resolve_calls(session.client()), 1);
}

#[test]
fn preset_identity_skips_resolution() {
    let session = Session::with_identity(FakeDirectory::new(), Identity::new("42", "me@x"));
    assert_eq!(session.identity().unwrap().id, "42");
    assert_eq!(resolve_calls(session.client()), 0);
    assert!(session.into_client().calls().is_empty());
}
