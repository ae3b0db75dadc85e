use super::*;

#[test]
fn test_initial_state_is_unknown_without_error() {
    let cell = ValidityCell::new();
    assert_eq!(cell.validity(), Validity::Unknown);
    assert!(cell.error().is_none());
}

#[test]
fn test_mark_valid_from_unknown() {
    let cell = ValidityCell::new();
    let transition = cell.mark_valid("shader #1");
    assert_eq!(transition, Some(Transition { old: Validity::Unknown, new: Validity::Valid }));
    assert_eq!(cell.validity(), Validity::Valid);
    assert!(cell.error().is_none());
}

#[test]
fn test_mark_invalid_carries_error() {
    let cell = ValidityCell::new();
    let transition = cell.mark_invalid("shader #1", "0:3: syntax error".to_string());
    assert_eq!(transition, Some(Transition { old: Validity::Unknown, new: Validity::Invalid }));
    assert_eq!(cell.validity(), Validity::Invalid);
    assert_eq!(cell.error().as_deref(), Some("0:3: syntax error"));
}

#[test]
fn test_reset_clears_error_and_is_idempotent() {
    let cell = ValidityCell::new();
    cell.mark_invalid("program #1", "link failed".to_string());

    let transition = cell.reset();
    assert_eq!(transition, Some(Transition { old: Validity::Invalid, new: Validity::Unknown }));
    assert!(cell.error().is_none());

    assert_eq!(cell.reset(), None);
    assert_eq!(cell.validity(), Validity::Unknown);
}

#[test]
#[cfg(debug_assertions)]
#[should_panic(expected = "mark_valid called while validity is valid")]
fn test_mark_valid_twice_panics_in_debug() {
    let cell = ValidityCell::new();
    cell.mark_valid("shader #1");
    cell.mark_valid("shader #1");
}

#[test]
#[cfg(debug_assertions)]
#[should_panic(expected = "mark_invalid called while validity is valid")]
fn test_mark_invalid_after_valid_panics_in_debug() {
    let cell = ValidityCell::new();
    cell.mark_valid("shader #1");
    cell.mark_invalid("shader #1", "late error".to_string());
}

#[test]
fn test_validity_display() {
    assert_eq!(Validity::Unknown.to_string(), "unknown");
    assert_eq!(Validity::Valid.to_string(), "valid");
    assert_eq!(Validity::Invalid.to_string(), "invalid");
    assert_eq!(Validity::default(), Validity::Unknown);
}
