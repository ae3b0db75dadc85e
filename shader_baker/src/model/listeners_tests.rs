use super::*;
use std::cell::Cell;

trait Counter {
    fn hit(&self);
}

struct Hits(Cell<u32>);

impl Counter for Hits {
    fn hit(&self) {
        self.0.set(self.0.get() + 1);
    }
}

fn weak_counter(hits: &Rc<Hits>) -> Weak<dyn Counter> {
    let weak: Weak<Hits> = Rc::downgrade(hits);
    weak
}

#[test]
fn test_live_returns_subscribed_listeners() {
    let listeners: Listeners<dyn Counter> = Listeners::new();
    let a = Rc::new(Hits(Cell::new(0)));
    let b = Rc::new(Hits(Cell::new(0)));
    listeners.subscribe(weak_counter(&a));
    listeners.subscribe(weak_counter(&b));

    for listener in listeners.live() {
        listener.hit();
    }

    assert_eq!(a.0.get(), 1);
    assert_eq!(b.0.get(), 1);
}

#[test]
fn test_unsubscribe_removes_listener() {
    let listeners: Listeners<dyn Counter> = Listeners::new();
    let a = Rc::new(Hits(Cell::new(0)));
    let key = listeners.subscribe(weak_counter(&a));

    assert!(listeners.unsubscribe(key));
    assert!(!listeners.unsubscribe(key));
    assert!(listeners.live().is_empty());
}

#[test]
fn test_dropped_listener_is_pruned() {
    let listeners: Listeners<dyn Counter> = Listeners::new();
    let kept = Rc::new(Hits(Cell::new(0)));
    listeners.subscribe(weak_counter(&kept));
    {
        let dropped = Rc::new(Hits(Cell::new(0)));
        listeners.subscribe(weak_counter(&dropped));
    }
    assert_eq!(listeners.len(), 2);

    assert_eq!(listeners.live().len(), 1);
    assert_eq!(listeners.len(), 1);
}

#[test]
fn test_subscribe_during_iteration_does_not_borrow_panic() {
    let listeners: Rc<Listeners<dyn Counter>> = Rc::new(Listeners::new());
    let a = Rc::new(Hits(Cell::new(0)));
    listeners.subscribe(weak_counter(&a));

    for listener in listeners.live() {
        listener.hit();
        listeners.subscribe(weak_counter(&a));
    }

    assert_eq!(listeners.len(), 2);
}
