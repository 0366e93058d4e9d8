//! Column metadata and type information

/// Inferred cell type for a column
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CellType {
    #[default]
    Null,
    Bool,
    Int,
    Float,
    String,
}

impl CellType {
    /// Widen the type to accommodate another type
    ///
    /// Any mix other than Int/Float collapses to String: such a column is
    /// kept as text in full.
    pub fn widen(self, other: CellType) -> CellType {
        if self == other {
            return self;
        }

        match (self, other) {
            (CellType::Null, t) | (t, CellType::Null) => t,
            (CellType::Int, CellType::Float) | (CellType::Float, CellType::Int) => CellType::Float,
            _ => CellType::String,
        }
    }
}

impl std::fmt::Display for CellType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellType::Null => write!(f, "null"),
            CellType::Bool => write!(f, "bool"),
            CellType::Int => write!(f, "int"),
            CellType::Float => write!(f, "float"),
            CellType::String => write!(f, "string"),
        }
    }
}

/// Column metadata
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Column name (from header)
    pub name: String,
    /// Inferred type from data
    pub inferred_type: CellType,
}

impl Column {
    /// Create a new column with a name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inferred_type: CellType::Null,
        }
    }

    /// Create a column with a specified type
    pub fn with_type(name: impl Into<String>, cell_type: CellType) -> Self {
        Self {
            name: name.into(),
            inferred_type: cell_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widen() {
        assert_eq!(CellType::Null.widen(CellType::Int), CellType::Int);
        assert_eq!(CellType::Int.widen(CellType::Null), CellType::Int);
        assert_eq!(CellType::Int.widen(CellType::Float), CellType::Float);
        assert_eq!(CellType::Bool.widen(CellType::Bool), CellType::Bool);
        assert_eq!(CellType::Bool.widen(CellType::Int), CellType::String);
        assert_eq!(CellType::Float.widen(CellType::String), CellType::String);
    }
}
