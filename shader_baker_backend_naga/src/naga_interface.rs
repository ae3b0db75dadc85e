/// Stage interface extraction and the vertex → fragment link check.
///
/// Only user-defined varyings (`layout(location = N)`) take part. Built-ins
/// such as `gl_Position` are ignored.

use std::collections::BTreeMap;
use naga::{Binding, Function, Module, Scalar, ScalarKind, Type, TypeInner};

/// Varying type, when it can be compared across modules
///
/// Scalars, vectors and matrices carry no arena handles, so they compare
/// equal across two modules. Anything else is recorded as `None` and only
/// its presence is checked.
pub(crate) type VaryingType = Option<TypeInner>;

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct StageInterface {
    pub inputs: BTreeMap<u32, VaryingType>,
    pub outputs: BTreeMap<u32, VaryingType>,
}

impl StageInterface {
    pub(crate) fn of(module: &Module, entry: &Function) -> Self {
        let mut interface = Self::default();
        for argument in &entry.arguments {
            collect(module, argument.binding.as_ref(), argument.ty, &mut interface.inputs);
        }
        if let Some(result) = &entry.result {
            collect(module, result.binding.as_ref(), result.ty, &mut interface.outputs);
        }
        interface
    }
}

fn collect(
    module: &Module,
    binding: Option<&Binding>,
    ty: naga::Handle<Type>,
    into: &mut BTreeMap<u32, VaryingType>,
) {
    let inner = &module.types[ty].inner;
    match (binding, inner) {
        (Some(Binding::Location { location, .. }), _) => {
            into.insert(*location, comparable(inner));
        }
        (Some(Binding::BuiltIn(_)), _) => {}
        (None, TypeInner::Struct { members, .. }) => {
            for member in members {
                collect(module, member.binding.as_ref(), member.ty, into);
            }
        }
        (None, _) => {}
    }
}

fn comparable(inner: &TypeInner) -> VaryingType {
    match inner {
        TypeInner::Scalar(_) | TypeInner::Vector { .. } | TypeInner::Matrix { .. } => {
            Some(inner.clone())
        }
        _ => None,
    }
}

fn scalar_prefix(scalar: Scalar) -> &'static str {
    match scalar.kind {
        ScalarKind::Float if scalar.width == 8 => "d",
        ScalarKind::Sint => "i",
        ScalarKind::Uint => "u",
        ScalarKind::Bool => "b",
        _ => "",
    }
}

fn scalar_name(scalar: Scalar) -> &'static str {
    match scalar.kind {
        ScalarKind::Float if scalar.width == 8 => "double",
        ScalarKind::Sint => "int",
        ScalarKind::Uint => "uint",
        ScalarKind::Bool => "bool",
        _ => "float",
    }
}

/// GLSL spelling of a varying type, for link logs
pub(crate) fn type_name(ty: &VaryingType) -> String {
    match ty {
        Some(TypeInner::Scalar(scalar)) => scalar_name(*scalar).to_string(),
        Some(TypeInner::Vector { size, scalar }) => {
            format!("{}vec{}", scalar_prefix(*scalar), *size as u8)
        }
        Some(TypeInner::Matrix { columns, rows, scalar }) => {
            format!("{}mat{}x{}", scalar_prefix(*scalar), *columns as u8, *rows as u8)
        }
        _ => "aggregate".to_string(),
    }
}

/// Every fragment input must be written by the vertex stage with the same type
///
/// Returns the link log on failure, one line per problem.
pub(crate) fn check_vertex_fragment(
    vertex: &StageInterface,
    fragment: &StageInterface,
) -> Result<(), String> {
    let mut problems = Vec::new();
    for (location, input) in &fragment.inputs {
        match vertex.outputs.get(location) {
            None => problems.push(format!(
                "error: fragment input at location {} is not written by the vertex shader",
                location
            )),
            Some(output) if input.is_some() && output.is_some() && output != input => {
                problems.push(format!(
                    "error: type mismatch at location {}: vertex writes {}, fragment reads {}",
                    location,
                    type_name(output),
                    type_name(input)
                ))
            }
            Some(_) => {}
        }
    }
    if problems.is_empty() {
        Ok(())
    } else {
        Err(problems.join("\n"))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "naga_interface_tests.rs"]
mod tests;
