use super::*;

#[test]
fn test_names_start_at_one() {
    let mut names = NameAllocator::new();
    assert_eq!(names.alloc(), 1);
    assert_eq!(names.alloc(), 2);
    assert_eq!(names.alloc(), 3);
}

#[test]
fn test_new_is_empty() {
    let names = NameAllocator::default();
    assert!(names.is_empty());
    assert_eq!(names.live(), 0);
}

#[test]
fn test_free_list_is_lifo() {
    let mut names = NameAllocator::new();
    let a = names.alloc(); // 1
    let _b = names.alloc(); // 2
    let c = names.alloc(); // 3
    names.free(a);
    names.free(c);

    assert_eq!(names.alloc(), 3);
    assert_eq!(names.alloc(), 1);
    assert_eq!(names.alloc(), 4);
}

#[test]
fn test_live_tracks_allocations() {
    let mut names = NameAllocator::new();
    let a = names.alloc();
    let b = names.alloc();
    assert_eq!(names.live(), 2);

    names.free(a);
    assert_eq!(names.live(), 1);
    names.free(b);
    assert!(names.is_empty());
}

#[test]
#[should_panic(expected = "never allocated")]
#[cfg(debug_assertions)]
fn test_free_null_name_panics_in_debug() {
    let mut names = NameAllocator::new();
    names.alloc();
    names.free(0);
}
