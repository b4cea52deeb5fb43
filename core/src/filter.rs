//! Filter expressions and sort direction for table queries

use crate::value::Value;
use smallvec::SmallVec;

/// Comparison operator of a filter term
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Like,
}

/// One term of a filter expression
#[derive(Clone, Debug, PartialEq)]
pub enum FilterExpr {
    /// `column <op> value`
    Cmp {
        column: String,
        op: CmpOp,
        value: Value,
    },
    /// `column IS NULL`
    IsNull(String),
    /// `column IS NOT NULL`
    IsNotNull(String),
    /// Driver-opaque raw term
    Raw(String),
}

impl FilterExpr {
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        FilterExpr::Cmp {
            column: column.into(),
            op: CmpOp::Eq,
            value: value.into(),
        }
    }

    pub fn cmp(column: impl Into<String>, op: CmpOp, value: impl Into<Value>) -> Self {
        FilterExpr::Cmp {
            column: column.into(),
            op,
            value: value.into(),
        }
    }
}

/// An ordered conjunction of filter terms.
///
/// Terms accumulate in call order and are always combined with AND;
/// the combination semantics are fixed, not per-call configurable.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Filter {
    terms: SmallVec<[FilterExpr; 4]>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn and(&mut self, expr: FilterExpr) {
        self.terms.push(expr);
    }

    pub fn terms(&self) -> &[FilterExpr] {
        &self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

impl FromIterator<FilterExpr> for Filter {
    fn from_iter<I: IntoIterator<Item = FilterExpr>>(iter: I) -> Self {
        Filter {
            terms: iter.into_iter().collect(),
        }
    }
}

/// Sort direction for query execution
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortDir {
    #[default]
    Ascending,
    Descending,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terms_accumulate_in_order() {
        let mut filter = Filter::new();
        filter.and(FilterExpr::eq("name", "abc"));
        filter.and(FilterExpr::IsNull("deleted_at".into()));
        assert_eq!(filter.terms().len(), 2);
        assert_eq!(filter.terms()[0], FilterExpr::eq("name", "abc"));
    }
}
