//! Names every program can use without declaring them.

use strum::{EnumIter, IntoStaticStr};

use super::{
    hir::{Entity, Function, Variable},
    ty::Type,
};
use crate::frontend::intern::InternedSymbol;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum LibraryItem {
    /// Prints any number of values of any type
    Print,
    Sqrt,
    Sin,
    Cos,
    /// The constant π
    Pi,
}

impl LibraryItem {
    pub fn name(self) -> &'static str {
        self.into()
    }

    pub fn ty(self) -> Type {
        match self {
            LibraryItem::Print => Type::variadic_function(Type::any(), Type::void()),
            LibraryItem::Sqrt | LibraryItem::Sin | LibraryItem::Cos => {
                Type::function([Type::float()], Type::float())
            }
            LibraryItem::Pi => Type::float(),
        }
    }

    /// Builds the entity bound to this item's name in the root scope
    pub fn entity(self) -> Entity {
        let name = InternedSymbol::new(self.name());
        let ty = self.ty();

        match self {
            LibraryItem::Pi => Entity::Variable(Variable {
                name,
                read_only: true,
                ty,
                library: Some(self),
            }),
            LibraryItem::Print => Entity::Function(Function {
                name,
                parameters: Vec::new(),
                return_type: Type::void(),
                ty,
                library: Some(self),
            }),
            LibraryItem::Sqrt | LibraryItem::Sin | LibraryItem::Cos => {
                Entity::Function(Function {
                    name,
                    parameters: Vec::new(),
                    return_type: Type::float(),
                    ty,
                    library: Some(self),
                })
            }
        }
    }
}
