use super::*;
use std::cell::RefCell;

#[derive(Default)]
struct Recorder {
    events: RefCell<Vec<String>>,
}

impl ProgramListener for Recorder {
    fn shader_attached(&self, _program: &Program, shader: &Rc<Shader>) {
        self.events.borrow_mut().push(format!("attached:{}", shader.stage()));
    }

    fn shader_detached(&self, _program: &Program, shader: &Rc<Shader>) {
        self.events.borrow_mut().push(format!("detached:{}", shader.stage()));
    }

    fn inputs_changed(&self, program: &Program) {
        self.events.borrow_mut().push(format!("inputs:{}", program.mod_count()));
    }

    fn validity_changed(&self, _program: &Program, old: Validity, new: Validity) {
        self.events.borrow_mut().push(format!("{}->{}", old, new));
    }
}

fn watched(program: &Rc<Program>) -> Rc<Recorder> {
    let recorder = Rc::new(Recorder::default());
    program.subscribe(&recorder);
    recorder
}

#[test]
fn test_new_program_is_empty_and_unknown() {
    let program = Program::new();
    assert_eq!(program.name(), "Program");
    assert!(!program.has_shaders());
    assert_eq!(program.attached_stages(), StageFlags::empty());
    assert_eq!(program.validity(), Validity::Unknown);
    assert_eq!(program.mod_count(), 0);
}

#[test]
fn test_attach_notifies_and_bumps() {
    let program = Program::named("Blit");
    let recorder = watched(&program);
    let vertex = Shader::new(ShaderStage::Vertex);

    program.attach_shader(&vertex).unwrap();

    assert_eq!(program.mod_count(), 1);
    assert_eq!(program.attached_stages(), StageFlags::VERTEX);
    assert_eq!(program.shader(ShaderStage::Vertex).unwrap().id(), vertex.id());
    assert_eq!(
        *recorder.events.borrow(),
        vec!["attached:vertex".to_string(), "inputs:1".to_string()]
    );
}

#[test]
fn test_attach_resets_valid_program() {
    let program = Program::new();
    program.mark_valid();
    let recorder = watched(&program);

    program.attach_shader(&Shader::new(ShaderStage::Fragment)).unwrap();

    assert_eq!(program.validity(), Validity::Unknown);
    assert_eq!(
        *recorder.events.borrow(),
        vec![
            "attached:fragment".to_string(),
            "valid->unknown".to_string(),
            "inputs:1".to_string(),
        ]
    );
}

#[test]
fn test_one_shader_per_stage() {
    let program = Program::new();
    program.attach_shader(&Shader::new(ShaderStage::Vertex)).unwrap();

    let result = program.attach_shader(&Shader::new(ShaderStage::Vertex));

    assert!(matches!(result, Err(crate::error::Error::InvalidResource(_))));
    assert_eq!(program.shaders().len(), 1);
    assert_eq!(program.mod_count(), 1);
}

#[test]
fn test_shaders_in_pipeline_order() {
    let program = Program::new();
    let fragment = Shader::new(ShaderStage::Fragment);
    let geometry = Shader::new(ShaderStage::Geometry);
    let vertex = Shader::new(ShaderStage::Vertex);
    program.attach_shader(&fragment).unwrap();
    program.attach_shader(&geometry).unwrap();
    program.attach_shader(&vertex).unwrap();

    let stages: Vec<_> = program.shaders().iter().map(|s| s.stage()).collect();
    assert_eq!(stages, vec![ShaderStage::Vertex, ShaderStage::Geometry, ShaderStage::Fragment]);
}

#[test]
fn test_detach_notifies_and_bumps() {
    let program = Program::new();
    let vertex = Shader::new(ShaderStage::Vertex);
    program.attach_shader(&vertex).unwrap();
    let recorder = watched(&program);

    program.detach_shader(&vertex).unwrap();

    assert!(!program.has_shaders());
    assert_eq!(program.mod_count(), 2);
    assert_eq!(
        *recorder.events.borrow(),
        vec!["detached:vertex".to_string(), "inputs:2".to_string()]
    );
}

#[test]
fn test_detach_unattached_shader_fails() {
    let program = Program::new();
    program.attach_shader(&Shader::new(ShaderStage::Vertex)).unwrap();

    let other = Shader::new(ShaderStage::Vertex);
    assert!(program.detach_shader(&other).is_err());
    assert_eq!(program.mod_count(), 1);
}

#[test]
fn test_detached_shader_no_longer_affects_program() {
    let program = Program::new();
    let vertex = Shader::new(ShaderStage::Vertex);
    program.attach_shader(&vertex).unwrap();
    program.detach_shader(&vertex).unwrap();
    let count = program.mod_count();

    vertex.set_source("void main() {}");

    assert_eq!(program.mod_count(), count);
}

#[test]
fn test_shader_source_edit_resets_program() {
    let program = Program::new();
    let vertex = Shader::new(ShaderStage::Vertex);
    program.attach_shader(&vertex).unwrap();
    vertex.mark_valid();
    program.mark_valid();
    let count = program.mod_count();

    vertex.set_source("void main() { gl_Position = vec4(0.0); }");

    assert_eq!(program.validity(), Validity::Unknown);
    assert!(program.mod_count() != count);
}

#[test]
fn test_source_edit_bumps_even_if_shader_already_unknown() {
    let program = Program::new();
    let vertex = Shader::new(ShaderStage::Vertex);
    program.attach_shader(&vertex).unwrap();
    let count = program.mod_count();

    vertex.set_source("a");

    assert_eq!(program.mod_count(), count.wrapping_add(1));
}

#[test]
fn test_shader_reset_resets_program() {
    let program = Program::new();
    let fragment = Shader::new(ShaderStage::Fragment);
    program.attach_shader(&fragment).unwrap();
    fragment.mark_invalid("0:1: error");
    program.mark_invalid("fragment shader is invalid");
    let count = program.mod_count();

    fragment.reset_validity();

    assert_eq!(program.validity(), Validity::Unknown);
    assert!(program.link_error().is_none());
    assert_eq!(program.mod_count(), count.wrapping_add(1));
}

#[test]
fn test_shader_marked_valid_does_not_bump_program() {
    let program = Program::new();
    let fragment = Shader::new(ShaderStage::Fragment);
    program.attach_shader(&fragment).unwrap();
    let count = program.mod_count();

    fragment.mark_valid();

    assert_eq!(program.mod_count(), count);
}

#[test]
fn test_shader_shared_between_programs() {
    let a = Program::new();
    let b = Program::new();
    let vertex = Shader::new(ShaderStage::Vertex);
    a.attach_shader(&vertex).unwrap();
    b.attach_shader(&vertex).unwrap();
    let (count_a, count_b) = (a.mod_count(), b.mod_count());

    vertex.set_source("x");

    assert_ne!(a.mod_count(), count_a);
    assert_ne!(b.mod_count(), count_b);
}

#[test]
fn test_dropping_program_unsubscribes_from_shaders() {
    let vertex = Shader::new(ShaderStage::Vertex);
    {
        let program = Program::new();
        program.attach_shader(&vertex).unwrap();
        assert_eq!(vertex.listener_count(), 1);
    }
    assert_eq!(vertex.listener_count(), 0);
}

#[test]
fn test_program_keeps_attached_shader_alive() {
    let program = Program::new();
    let weak = {
        let vertex = Shader::new(ShaderStage::Vertex);
        program.attach_shader(&vertex).unwrap();
        Rc::downgrade(&vertex)
    };
    assert!(weak.upgrade().is_some());

    let vertex = weak.upgrade().unwrap();
    program.detach_shader(&vertex).unwrap();
    drop(vertex);
    assert!(weak.upgrade().is_none());
}
