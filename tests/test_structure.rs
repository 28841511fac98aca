mod common;

use common::{build_envelope, name, objects, Envelope, Item, Marker, BODY, ENVELOPE, HEADER};
use xmlbind::{AnyElement, Error, QName};

#[test]
fn test_set_child_sets_parent() {
    let mut objects = objects();
    let (envelope, body, item) = build_envelope(&mut objects);
    assert_eq!(objects.parent(body), Some(envelope));
    assert_eq!(objects.parent(item), Some(body));
    assert!(!objects.has_parent(envelope));
    assert_eq!(objects.child_slots(envelope), &[None, Some(body)]);
    assert_eq!(objects.children(envelope).collect::<Vec<_>>(), vec![body]);
    assert_eq!(objects.root(item), envelope);
}

#[test]
fn test_second_parent_fails() {
    let mut objects = objects();
    let (_, body, item) = build_envelope(&mut objects);
    let other = objects.create(name("Body"), AnyElement::new());
    assert!(matches!(
        objects.push_child(other, item),
        Err(Error::StructuralViolation(_))
    ));
    assert_eq!(objects.parent(item), Some(body));
    assert!(!objects.has_children(other));
}

#[test]
fn test_reassign_same_child_is_noop() {
    let mut objects = objects();
    let (envelope, body, _) = build_envelope(&mut objects);
    objects.set_child(envelope, BODY, Some(body)).unwrap();
    assert_eq!(objects.parent(body), Some(envelope));
    assert!(!objects.is_removed(body));
}

#[test]
fn test_replace_child_destroys_old() {
    let mut objects = objects();
    let (envelope, body, item) = build_envelope(&mut objects);
    let new_body = objects.create(name("Body"), AnyElement::new());
    objects.set_child(envelope, BODY, Some(new_body)).unwrap();
    assert!(objects.is_removed(body));
    assert!(objects.is_removed(item));
    assert_eq!(objects.child_slots(envelope), &[None, Some(new_body)]);
}

#[test]
fn test_empty_named_slot() {
    let mut objects = objects();
    let (envelope, body, _) = build_envelope(&mut objects);
    objects.set_child(envelope, BODY, None).unwrap();
    assert!(objects.is_removed(body));
    assert_eq!(objects.child_slots(envelope), &[None, None]);
    assert!(!objects.has_children(envelope));
}

#[test]
fn test_own_ancestor_fails() {
    let mut objects = objects();
    let (envelope, body, _) = build_envelope(&mut objects);
    assert!(matches!(
        objects.push_child(body, envelope),
        Err(Error::StructuralViolation(_))
    ));
}

#[test]
fn test_insert_child_skips_named_slots() {
    let mut objects = objects();
    let envelope = objects.create(name("Envelope"), Envelope::default());
    let extra = objects.create(QName::new("urn:other", "extra"), AnyElement::new());
    assert_eq!(objects.insert_child(envelope, 0, extra).unwrap(), 2);
    assert_eq!(objects.child_slots(envelope), &[None, None, Some(extra)]);
}

#[test]
fn test_childless_objects() {
    let mut objects = objects();
    let marker = objects.create(name("Marker"), Marker);
    let item = objects.create(name("Item"), Item::default());
    assert!(!objects.has_children(marker));
    assert_eq!(objects.children(marker).count(), 0);
    assert!(matches!(
        objects.remove_child(marker, item),
        Err(Error::StructuralViolation(_))
    ));
    assert!(matches!(
        objects.push_child(item, marker),
        Err(Error::StructuralViolation(_))
    ));
    assert!(matches!(
        objects.set_text(marker, Some("x"), 0),
        Err(Error::StructuralViolation(_))
    ));
}

#[test]
fn test_remove_child_keeps_child() {
    let mut objects = objects();
    let (_, body, item) = build_envelope(&mut objects);
    objects.remove_child(body, item).unwrap();
    assert!(!objects.is_removed(item));
    assert!(!objects.has_parent(item));
    assert!(!objects.has_children(body));
    // and it can be adopted again
    objects.push_child(body, item).unwrap();
    assert_eq!(objects.parent(item), Some(body));
}

#[test]
fn test_remove_takes_object_out_of_parent() {
    let mut objects = objects();
    let (_, body, item) = build_envelope(&mut objects);
    objects.remove(item);
    assert!(objects.is_removed(item));
    assert!(!objects.has_children(body));
}

#[test]
fn test_detach_destroys_parent() {
    let mut objects = objects();
    let (envelope, body, item) = build_envelope(&mut objects);
    objects.detach(body).unwrap();
    assert!(objects.is_removed(envelope));
    assert!(!objects.has_parent(body));
    assert_eq!(objects.parent(item), Some(body));
}

#[test]
fn test_detach_grandchild_fails() {
    let mut objects = objects();
    let (envelope, body, item) = build_envelope(&mut objects);
    assert!(matches!(
        objects.detach(item),
        Err(Error::StructuralViolation(_))
    ));
    assert_eq!(objects.parent(item), Some(body));
    assert_eq!(objects.parent(body), Some(envelope));
}

#[test]
fn test_detach_root_is_noop() {
    let mut objects = objects();
    let (envelope, _, _) = build_envelope(&mut objects);
    objects.detach(envelope).unwrap();
    assert!(!objects.is_removed(envelope));
}

#[test]
fn test_detach_moves_document() {
    let mut objects = objects();
    let envelope = objects.parse_str(ENVELOPE).unwrap();
    let document = objects.owned_document(envelope).unwrap();
    let body = objects.child_slots(envelope)[BODY].unwrap();
    objects.detach(body).unwrap();
    assert_eq!(objects.owned_document(body), Some(document));
    assert_eq!(
        objects.to_xml_string(body).unwrap(),
        r#"<t:Body xmlns:t="urn:test:envelope"><t:Item id="a1">x</t:Item></t:Body>"#
    );
}

#[test]
fn test_clone_without_cache_copies_state() {
    let mut objects = objects();
    let (envelope, _, item) = build_envelope(&mut objects);
    let copy = objects.clone_object(envelope).unwrap();
    assert_ne!(copy, envelope);
    assert!(!objects.has_parent(copy));
    let copy_body = objects.child_slots(copy)[BODY].unwrap();
    let copy_item = objects.children(copy_body).next().unwrap();
    assert_ne!(copy_item, item);
    assert_eq!(objects.parent(copy_item), Some(copy_body));
    assert_eq!(objects.text(copy_item, 0), Some("hello"));
    assert_eq!(objects.child_slots(copy)[HEADER], None);

    objects.set_text(copy_item, None, 0).unwrap();
    assert_eq!(objects.text(item, 0), Some("hello"));
}

#[test]
fn test_clone_with_cache_uses_dom() {
    let mut objects = objects();
    let envelope = objects.parse_str(ENVELOPE).unwrap();
    let copy = objects.clone_object(envelope).unwrap();
    assert_ne!(copy, envelope);
    assert!(objects.owned_document(copy).is_some());
    assert_ne!(objects.owned_document(copy), objects.owned_document(envelope));
    assert_eq!(objects.to_xml_string(copy).unwrap(), ENVELOPE);
    let copy_body = objects.child_slots(copy)[BODY].unwrap();
    let copy_item = objects.children(copy_body).next().unwrap();
    assert_eq!(
        objects.value::<Item>(copy_item).unwrap().id.as_deref(),
        Some("a1")
    );
}

#[test]
fn test_typed_access() {
    let mut objects = objects();
    let (envelope, _, item) = build_envelope(&mut objects);
    assert!(objects.is::<Envelope>(envelope));
    assert!(objects.value::<Item>(item).is_ok());
    assert!(matches!(
        objects.value::<Item>(envelope),
        Err(Error::TypeMismatch(_))
    ));
    objects.value_mut::<Item>(item).unwrap().id = Some("b".into());
    assert_eq!(objects.value::<Item>(item).unwrap().id.as_deref(), Some("b"));
}
