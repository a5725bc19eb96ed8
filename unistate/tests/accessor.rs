//! Thread-local store accessor

use std::cell::Cell;
use std::rc::Rc;

use serde_json::{json, Value};
use unistate::{store_accessor, Action, StoreError};

#[derive(Action, Clone, Debug)]
enum Session {
    Login(String),
    Logout,
}

store_accessor!(
    static SESSION: Session;
);

fn install_reducers() {
    SESSION.with(|session| {
        session
            .reduce(
                SessionKind::Login,
                Some("user"),
                |_: &Value, action: &Session| match action {
                    Session::Login(name) => Some(json!(name)),
                    Session::Logout => None,
                },
            )
            .unwrap();
        session
            .reduce_and_merge(
                SessionKind::Logout,
                None,
                |_: &Value, _: &Session, _: &Value| Some(json!({})),
            )
            .unwrap();
    });
}

#[test]
fn test_accessor_lifecycle() {
    SESSION.with(|session| session.reset().unwrap());
    install_reducers();

    SESSION.with(|session| {
        session.dispatch(Session::Login("ada".into())).unwrap();
        assert_eq!(*session.snapshot().unwrap(), json!({"user": "ada"}));

        session.dispatch(Session::Logout).unwrap();
        assert_eq!(*session.snapshot().unwrap(), json!({}));

        // Replacing the store drops its reducers
        let seeded = json!({"user": "grace"}).as_object().cloned().unwrap();
        session.with_state(seeded).unwrap();
        session.dispatch(Session::Logout).unwrap();
        assert_eq!(*session.snapshot().unwrap(), json!({"user": "grace"}));

        session.reset().unwrap();
        assert!(!session.is_initialized());
    });
}

#[test]
fn test_subscriber_cannot_reenter_accessor() {
    SESSION.with(|session| session.reset().unwrap());
    install_reducers();

    let busy = Rc::new(Cell::new(false));
    SESSION.with(|session| {
        let busy = Rc::clone(&busy);
        session
            .subscribe(move || {
                let result = SESSION.with(|session| session.snapshot());
                busy.set(result == Err(StoreError::AccessorBusy));
            })
            .unwrap();
        session.dispatch(Session::Login("linus".into())).unwrap();
    });

    assert!(busy.get());
}
