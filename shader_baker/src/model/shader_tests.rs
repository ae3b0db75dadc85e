use super::*;
use std::cell::RefCell;

#[derive(Default)]
struct Recorder {
    events: RefCell<Vec<String>>,
}

impl ShaderListener for Recorder {
    fn source_changed(&self, shader: &Shader) {
        self.events.borrow_mut().push(format!("source:{}", shader.source()));
    }

    fn validity_changed(&self, _shader: &Shader, old: Validity, new: Validity) {
        self.events.borrow_mut().push(format!("{}->{}", old, new));
    }
}

#[test]
fn test_new_shader_defaults() {
    let shader = Shader::new(ShaderStage::Fragment);
    assert_eq!(shader.stage(), ShaderStage::Fragment);
    assert_eq!(shader.name(), "FragmentShader");
    assert_eq!(&*shader.source(), "");
    assert_eq!(shader.validity(), Validity::Unknown);
    assert!(shader.compilation_error().is_none());
    assert_eq!(shader.mod_count(), 0);
}

#[test]
fn test_ids_are_unique() {
    let a = Shader::new(ShaderStage::Vertex);
    let b = Shader::new(ShaderStage::Vertex);
    assert_ne!(a.id(), b.id());
    assert!(a.id().to_string().starts_with("shader #"));
}

#[test]
fn test_set_source_bumps_and_resets() {
    let shader = Shader::with_source(ShaderStage::Vertex, "void main() {}");
    shader.mark_invalid("0:1: error");
    let recorder = Rc::new(Recorder::default());
    shader.subscribe(&recorder);

    shader.set_source("void main() { }");

    assert_eq!(shader.mod_count(), 1);
    assert_eq!(shader.validity(), Validity::Unknown);
    assert!(shader.compilation_error().is_none());
    assert_eq!(
        *recorder.events.borrow(),
        vec!["source:void main() { }".to_string(), "invalid->unknown".to_string()]
    );
}

#[test]
fn test_set_source_while_unknown_notifies_source_only() {
    let shader = Shader::new(ShaderStage::Vertex);
    let recorder = Rc::new(Recorder::default());
    shader.subscribe(&recorder);

    shader.set_source("a");
    shader.set_source("b");

    assert_eq!(shader.mod_count(), 2);
    assert_eq!(*recorder.events.borrow(), vec!["source:a".to_string(), "source:b".to_string()]);
}

#[test]
fn test_mod_count_wraps() {
    let shader = Shader::new(ShaderStage::Vertex);
    shader.mod_count.set(u32::MAX);
    shader.set_source("x");
    assert_eq!(shader.mod_count(), 0);
}

#[test]
fn test_mark_valid_and_invalid_notify() {
    let shader = Shader::new(ShaderStage::Fragment);
    let recorder = Rc::new(Recorder::default());
    shader.subscribe(&recorder);

    shader.mark_valid();
    shader.reset_validity();
    shader.mark_invalid("0:2: 'x' undeclared");

    assert_eq!(shader.compilation_error().as_deref(), Some("0:2: 'x' undeclared"));
    assert_eq!(
        *recorder.events.borrow(),
        vec![
            "unknown->valid".to_string(),
            "valid->unknown".to_string(),
            "unknown->invalid".to_string(),
        ]
    );
}

#[test]
fn test_reset_when_unknown_is_silent() {
    let shader = Shader::new(ShaderStage::Fragment);
    let recorder = Rc::new(Recorder::default());
    shader.subscribe(&recorder);

    shader.reset_validity();

    assert!(recorder.events.borrow().is_empty());
}

#[test]
fn test_unsubscribe_stops_notifications() {
    let shader = Shader::new(ShaderStage::Fragment);
    let recorder = Rc::new(Recorder::default());
    let subscription = shader.subscribe(&recorder);

    assert!(shader.unsubscribe(subscription));
    shader.set_source("x");

    assert!(recorder.events.borrow().is_empty());
}

#[test]
fn test_set_name_keeps_validity() {
    let shader = Shader::new(ShaderStage::Geometry);
    shader.mark_valid();
    shader.set_name("Extrude");
    assert_eq!(shader.name(), "Extrude");
    assert_eq!(shader.validity(), Validity::Valid);
    assert_eq!(shader.mod_count(), 0);
}

#[test]
#[cfg(debug_assertions)]
#[should_panic(expected = "mark_valid called while validity is invalid")]
fn test_mark_valid_from_invalid_panics_in_debug() {
    let shader = Shader::new(ShaderStage::Vertex);
    shader.mark_invalid("bad");
    shader.mark_valid();
}
