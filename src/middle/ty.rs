use std::rc::Rc;

use colored::Colorize;
use itertools::Itertools;

/// Cheaply clonable handle to a type. Two types are equivalent when their
/// kinds are structurally equal, which is what the derived `PartialEq` checks.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Type(Rc<TypeKind>);

#[derive(Debug, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// absolute
    Boolean,
    /// cred
    Integer,
    /// ket
    Float,
    /// transmission
    String,
    /// void
    ///
    /// Only valid as the return type of a function
    Void,
    /// Accepts a value of any type. Only appears in standard library
    /// signatures.
    Any,
    /// tome<T>
    Array(Type),
    /// holocron<K, V>
    Map { key: Type, value: Type },
    /// (cred, ket) -> absolute
    Function {
        parameters: Rc<[Type]>,
        return_type: Type,
        is_variadic: bool,
    },
}

impl Type {
    pub fn new(kind: TypeKind) -> Self {
        Self(Rc::new(kind))
    }

    pub fn boolean() -> Self {
        Self::new(TypeKind::Boolean)
    }

    pub fn integer() -> Self {
        Self::new(TypeKind::Integer)
    }

    pub fn float() -> Self {
        Self::new(TypeKind::Float)
    }

    pub fn string() -> Self {
        Self::new(TypeKind::String)
    }

    pub fn void() -> Self {
        Self::new(TypeKind::Void)
    }

    pub fn any() -> Self {
        Self::new(TypeKind::Any)
    }

    pub fn array(element: Type) -> Self {
        Self::new(TypeKind::Array(element))
    }

    pub fn map(key: Type, value: Type) -> Self {
        Self::new(TypeKind::Map { key, value })
    }

    pub fn function(parameters: impl Into<Rc<[Type]>>, return_type: Type) -> Self {
        Self::new(TypeKind::Function {
            parameters: parameters.into(),
            return_type,
            is_variadic: false,
        })
    }

    /// A function accepting any number of arguments of the single parameter
    /// type
    pub fn variadic_function(parameter: Type, return_type: Type) -> Self {
        Self::new(TypeKind::Function {
            parameters: Rc::from([parameter]),
            return_type,
            is_variadic: true,
        })
    }

    pub fn is_numeric(&self) -> bool {
        matches!(**self, TypeKind::Integer | TypeKind::Float)
    }

    /// Structural equality
    pub fn is_equivalent_to(&self, other: &Type) -> bool {
        self == other
    }

    /// Returns true if a value of this type can be stored where `target` is
    /// expected. Collections are invariant; functions are covariant in their
    /// return type and contravariant in their parameters.
    pub fn is_assignable_to(&self, target: &Type) -> bool {
        match (&**self, &**target) {
            (_, TypeKind::Any) => true,
            (
                TypeKind::Function {
                    parameters: source_parameters,
                    return_type: source_return,
                    is_variadic: source_variadic,
                },
                TypeKind::Function {
                    parameters: target_parameters,
                    return_type: target_return,
                    is_variadic: target_variadic,
                },
            ) => {
                source_variadic == target_variadic
                    && source_parameters.len() == target_parameters.len()
                    && source_return.is_assignable_to(target_return)
                    && target_parameters
                        .iter()
                        .zip(source_parameters.iter())
                        .all(|(target, source)| target.is_assignable_to(source))
            }
            _ => self.is_equivalent_to(target),
        }
    }
}

impl core::fmt::Debug for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Type").field(&self.0).finish()
    }
}

impl core::ops::Deref for Type {
    type Target = TypeKind;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

impl core::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", **self)
    }
}

impl core::fmt::Display for TypeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Boolean => write!(f, "absolute"),
            Self::Integer => write!(f, "cred"),
            Self::Float => write!(f, "ket"),
            Self::String => write!(f, "transmission"),
            Self::Void => write!(f, "void"),
            Self::Any => write!(f, "any"),
            Self::Array(element) => write!(f, "tome<{element}>"),
            Self::Map { key, value } => write!(f, "holocron<{key}, {value}>"),
            Self::Function {
                parameters,
                return_type,
                is_variadic,
            } => write!(
                f,
                "({}{}) -> {return_type}",
                parameters.iter().join(", "),
                if *is_variadic { "..." } else { "" }
            ),
        }
    }
}

impl Type {
    /// Display form used by the decorated tree printer
    pub fn colored(&self) -> colored::ColoredString {
        self.to_string().yellow()
    }
}
