use xmlbind::{Namespace, NamespaceUsage, Namespaces};

#[test]
fn test_same_uri_merges_usage() {
    let mut namespaces = Namespaces::new();
    namespaces.add(Namespace::new("urn:a", "a").with_usage(NamespaceUsage::NonVisiblyUsed));
    namespaces.add(Namespace::new("urn:a", "a"));
    assert_eq!(namespaces.len(), 1);
    assert_eq!(
        namespaces.by_prefix("a").unwrap().usage(),
        NamespaceUsage::NonVisiblyUsed
    );
    namespaces.add(Namespace::new("urn:a", "a").with_usage(NamespaceUsage::VisiblyUsed));
    assert_eq!(
        namespaces.by_prefix("a").unwrap().usage(),
        NamespaceUsage::VisiblyUsed
    );
}

#[test]
fn test_conflicting_uri_is_ignored() {
    let mut namespaces = Namespaces::new();
    namespaces.add(Namespace::new("urn:a", "p"));
    namespaces.add(Namespace::new("urn:b", "p").with_usage(NamespaceUsage::VisiblyUsed));
    assert_eq!(namespaces.len(), 1);
    assert_eq!(namespaces.by_prefix("p").unwrap().uri(), "urn:a");
}

#[test]
fn test_always_declared_replaces_conflict() {
    let mut namespaces = Namespaces::new();
    namespaces.add(Namespace::new("urn:a", "p"));
    namespaces.add(Namespace::new("urn:b", "p").always_declared());
    assert_eq!(namespaces.len(), 1);
    let namespace = namespaces.by_prefix("p").unwrap();
    assert_eq!(namespace.uri(), "urn:b");
    assert!(namespace.always_declare());
}

#[test]
fn test_identity_ignores_flags() {
    assert_eq!(
        Namespace::new("urn:a", "a").always_declared(),
        Namespace::new("urn:a", "a").with_usage(NamespaceUsage::VisiblyUsed)
    );
    assert_ne!(Namespace::new("urn:a", "a"), Namespace::new("urn:a", "b"));
}

#[test]
fn test_remove_and_order() {
    let mut namespaces = Namespaces::new();
    namespaces.extend([
        Namespace::new("urn:b", "b"),
        Namespace::new("urn:a", "z"),
        Namespace::new("urn:a", "a"),
    ]);
    let prefixes: Vec<&str> = namespaces.iter().map(Namespace::prefix).collect();
    assert_eq!(prefixes, vec!["a", "z", "b"]);
    assert!(namespaces.remove(&Namespace::new("urn:a", "z")));
    assert!(!namespaces.remove(&Namespace::new("urn:a", "z")));
    assert_eq!(namespaces.len(), 2);
    assert!(!namespaces.is_empty());
}
