use strum::{Display, EnumIter, EnumString};

use super::ty::Type;

/// The named types every program can refer to
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, EnumIter, Display)]
#[strum(serialize_all = "lowercase")]
pub enum PrimitiveKind {
    Cred,
    Ket,
    Absolute,
    Transmission,
    Void,
}

impl PrimitiveKind {
    pub fn ty(self) -> Type {
        match self {
            PrimitiveKind::Cred => Type::integer(),
            PrimitiveKind::Ket => Type::float(),
            PrimitiveKind::Absolute => Type::boolean(),
            PrimitiveKind::Transmission => Type::string(),
            PrimitiveKind::Void => Type::void(),
        }
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn names_round_trip_through_types() {
        for primitive in PrimitiveKind::iter() {
            assert_eq!(primitive.ty().to_string(), primitive.to_string());
            assert_eq!(primitive.to_string().parse::<PrimitiveKind>(), Ok(primitive));
        }
    }
}
