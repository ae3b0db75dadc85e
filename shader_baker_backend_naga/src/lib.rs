/*!
# Shader Baker - naga backend

`GraphicsContext` implementation that needs no GPU. Shaders are parsed with
naga's GLSL frontend and the resulting module is run through naga's validator;
linking checks the interface between the vertex and fragment stages.

Only vertex and fragment shaders are supported: naga has no geometry stage, so
geometry shaders always fail to compile with an explanatory log.
*/

mod naga_compile;
mod naga_interface;
mod naga_context;

pub use naga_context::NagaContext;
