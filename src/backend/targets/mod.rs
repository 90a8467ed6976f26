use crate::middle::hir;

mod javascript;

pub use javascript::JavaScriptGenerator;

pub trait CodeGenerator {
    /// Translates a checked (and possibly optimized) program into source text
    /// for the target
    fn translate(&self, program: &hir::Program) -> String;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    JavaScript,
}

impl Target {
    pub fn get_code_generator(self) -> impl CodeGenerator {
        match self {
            Target::JavaScript => JavaScriptGenerator,
        }
    }
}
