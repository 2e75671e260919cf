use std::thread;

use super::*;

fn key(byte: u8) -> PreSharedKey {
    PreSharedKey::from_bytes([byte; 32])
}

#[test]
fn test_default_scope_is_open() {
    let scope = Scope::default();

    assert!(scope.psk().is_none());
    assert!(!scope.is_private());
    assert!(scope.shared_psk().is_none());
}

#[test]
fn test_with_psk_leaves_parent_untouched() {
    let parent = Scope::new();
    let child = parent.with_psk(&key(1));

    assert!(parent.psk().is_none());
    assert_eq!(child.psk(), Some(&key(1)));
}

#[test]
fn test_latest_attach_wins() {
    let first = Scope::new().with_psk(&key(1));
    let second = first.with_psk(&key(2));

    assert_eq!(first.psk(), Some(&key(1)));
    assert_eq!(second.psk(), Some(&key(2)));
}

#[test]
fn test_siblings_do_not_interfere() {
    let parent = Scope::new().with_psk(&key(1));
    let sibling_a = parent.with_psk(&key(2));
    let sibling_b = parent.clone();

    assert_eq!(sibling_a.psk(), Some(&key(2)));
    assert_eq!(sibling_b.psk(), Some(&key(1)));
    assert_eq!(parent.psk(), Some(&key(1)));
}

#[test]
fn test_attach_copies_the_secret() {
    let mut psk = key(9);
    let scope = Scope::new().with_psk(&psk);

    psk = key(0);

    assert_eq!(scope.psk(), Some(&key(9)));
    assert_ne!(scope.psk(), Some(&psk));
}

#[test]
fn test_clones_share_one_copy() {
    let scope = Scope::new().with_psk(&key(3));

    let a = scope.shared_psk().unwrap();
    let b = scope.clone().shared_psk().unwrap();

    assert!(Arc::ptr_eq(&a, &b));
}

#[test]
fn test_concurrent_scopes() {
    let parent = Scope::new();

    let handles = (0_u8..8)
        .map(|i| {
            let parent = parent.clone();
            thread::spawn(move || {
                let scope = if i % 2 == 0 {
                    parent.with_psk(&key(i))
                } else {
                    parent
                };
                (i, scope.psk().cloned())
            })
        })
        .collect::<Vec<_>>();

    for handle in handles {
        let (i, psk) = handle.join().unwrap();
        if i % 2 == 0 {
            assert_eq!(psk, Some(key(i)));
        } else {
            assert_eq!(psk, None);
        }
    }

    assert!(parent.psk().is_none());
}
