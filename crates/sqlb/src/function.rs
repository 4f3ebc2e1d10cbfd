//! SQL function calls usable as projections and expression operands.

use crate::column::Column;
use crate::dialect::{RenderContext, Symbol};
use crate::expr::Operand;
use crate::meta::ColumnDef;
use crate::render::{Render, sym_len, write_str, write_sym};
use crate::selection::Selection;
use crate::value::Value;

/// Target type of a `CAST`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlType {
    Char,
    Varchar,
    Text,
    Int,
    Float,
    Decimal,
    Binary,
}

impl SqlType {
    fn symbol(self) -> Symbol {
        match self {
            SqlType::Char => Symbol::TypeChar,
            SqlType::Varchar => Symbol::TypeVarchar,
            SqlType::Text => Symbol::TypeText,
            SqlType::Int => Symbol::TypeInt,
            SqlType::Float => Symbol::TypeFloat,
            SqlType::Decimal => Symbol::TypeDecimal,
            SqlType::Binary => Symbol::TypeBinary,
        }
    }
}

/// Which function is called.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionKind {
    Max,
    Min,
    Sum,
    Avg,
    Count,
    CountDistinct,
    /// `COUNT(*)`, the only kind without an operand.
    CountStar,
    Upper,
    Lower,
    CharLength,
    Trim,
    LTrim,
    RTrim,
    Cast(SqlType),
}

impl FunctionKind {
    /// Opening symbol, including the left paren.
    fn open(self) -> Symbol {
        match self {
            FunctionKind::Max => Symbol::Max,
            FunctionKind::Min => Symbol::Min,
            FunctionKind::Sum => Symbol::Sum,
            FunctionKind::Avg => Symbol::Avg,
            FunctionKind::Count | FunctionKind::CountStar => Symbol::Count,
            FunctionKind::CountDistinct => Symbol::CountDistinct,
            FunctionKind::Upper => Symbol::Upper,
            FunctionKind::Lower => Symbol::Lower,
            FunctionKind::CharLength => Symbol::CharLength,
            FunctionKind::Trim => Symbol::Trim,
            FunctionKind::LTrim => Symbol::LTrim,
            FunctionKind::RTrim => Symbol::RTrim,
            FunctionKind::Cast(_) => Symbol::Cast,
        }
    }
}

/// A function call, optionally aliased in the SELECT list.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    kind: FunctionKind,
    arg: Option<Box<Operand>>,
    alias: Option<String>,
}

impl Function {
    /// Call `kind` on `arg`.
    pub fn new(kind: FunctionKind, arg: impl Into<Operand>) -> Self {
        Self {
            kind,
            arg: Some(Box::new(arg.into())),
            alias: None,
        }
    }

    pub fn kind(&self) -> FunctionKind {
        self.kind
    }

    pub fn arg(&self) -> Option<&Operand> {
        self.arg.as_deref()
    }

    /// Set the projection alias (`AS alias`).
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn alias_name(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// The selection the function's column operand reads from, if any.
    pub fn selection(&self) -> Option<Selection> {
        match self.arg.as_deref()? {
            Operand::Projection(p) => p.selection(),
            _ => None,
        }
    }

    pub(crate) fn size_with(&self, ctx: &RenderContext, aliased: bool) -> usize {
        let mut size = sym_len(ctx, self.kind.open());
        match self.arg.as_deref() {
            Some(arg) => size += arg.size(ctx),
            None => size += sym_len(ctx, Symbol::Star),
        }
        if let FunctionKind::Cast(ty) = self.kind {
            size += sym_len(ctx, Symbol::As) + sym_len(ctx, ty.symbol());
        }
        size += sym_len(ctx, Symbol::RParen);
        if aliased && let Some(alias) = &self.alias {
            size += sym_len(ctx, Symbol::As) + alias.len();
        }
        size
    }

    pub(crate) fn scan_with(
        &self,
        ctx: &RenderContext,
        buf: &mut [u8],
        args: &mut [Value],
        cur_arg: &mut usize,
        aliased: bool,
    ) -> usize {
        let mut bw = write_sym(ctx, buf, self.kind.open());
        match self.arg.as_deref() {
            Some(arg) => bw += arg.scan(ctx, &mut buf[bw..], args, cur_arg),
            None => bw += write_sym(ctx, &mut buf[bw..], Symbol::Star),
        }
        if let FunctionKind::Cast(ty) = self.kind {
            bw += write_sym(ctx, &mut buf[bw..], Symbol::As);
            bw += write_sym(ctx, &mut buf[bw..], ty.symbol());
        }
        bw += write_sym(ctx, &mut buf[bw..], Symbol::RParen);
        if aliased && let Some(alias) = &self.alias {
            bw += write_sym(ctx, &mut buf[bw..], Symbol::As);
            bw += write_str(&mut buf[bw..], alias);
        }
        bw
    }
}

impl Render for Function {
    fn size(&self, ctx: &RenderContext) -> usize {
        self.size_with(ctx, true)
    }

    fn arg_count(&self) -> usize {
        self.arg.as_deref().map_or(0, Render::arg_count)
    }

    fn scan(
        &self,
        ctx: &RenderContext,
        buf: &mut [u8],
        args: &mut [Value],
        cur_arg: &mut usize,
    ) -> usize {
        self.scan_with(ctx, buf, args, cur_arg, true)
    }
}

pub fn max(arg: impl Into<Operand>) -> Function {
    Function::new(FunctionKind::Max, arg)
}

pub fn min(arg: impl Into<Operand>) -> Function {
    Function::new(FunctionKind::Min, arg)
}

pub fn sum(arg: impl Into<Operand>) -> Function {
    Function::new(FunctionKind::Sum, arg)
}

pub fn avg(arg: impl Into<Operand>) -> Function {
    Function::new(FunctionKind::Avg, arg)
}

pub fn count(arg: impl Into<Operand>) -> Function {
    Function::new(FunctionKind::Count, arg)
}

pub fn count_distinct(arg: impl Into<Operand>) -> Function {
    Function::new(FunctionKind::CountDistinct, arg)
}

/// `COUNT(*)`
pub fn count_star() -> Function {
    Function {
        kind: FunctionKind::CountStar,
        arg: None,
        alias: None,
    }
}

pub fn upper(arg: impl Into<Operand>) -> Function {
    Function::new(FunctionKind::Upper, arg)
}

pub fn lower(arg: impl Into<Operand>) -> Function {
    Function::new(FunctionKind::Lower, arg)
}

pub fn char_length(arg: impl Into<Operand>) -> Function {
    Function::new(FunctionKind::CharLength, arg)
}

/// Strip whitespace from both ends: `TRIM(x)` on MySQL, `BTRIM(x)` on
/// PostgreSQL.
pub fn trim(arg: impl Into<Operand>) -> Function {
    Function::new(FunctionKind::Trim, arg)
}

/// Strip leading whitespace.
pub fn ltrim(arg: impl Into<Operand>) -> Function {
    Function::new(FunctionKind::LTrim, arg)
}

/// Strip trailing whitespace.
pub fn rtrim(arg: impl Into<Operand>) -> Function {
    Function::new(FunctionKind::RTrim, arg)
}

/// `CAST(x AS ty)` with the type keyword resolved per dialect.
pub fn cast(arg: impl Into<Operand>, ty: SqlType) -> Function {
    Function::new(FunctionKind::Cast(ty), arg)
}

macro_rules! column_functions {
    ($ty:ty) => {
        impl $ty {
            pub fn max(&self) -> Function {
                max(self)
            }

            pub fn min(&self) -> Function {
                min(self)
            }

            pub fn sum(&self) -> Function {
                sum(self)
            }

            pub fn avg(&self) -> Function {
                avg(self)
            }

            pub fn count(&self) -> Function {
                count(self)
            }

            pub fn count_distinct(&self) -> Function {
                count_distinct(self)
            }

            pub fn upper(&self) -> Function {
                upper(self)
            }

            pub fn lower(&self) -> Function {
                lower(self)
            }

            pub fn char_length(&self) -> Function {
                char_length(self)
            }

            pub fn trim(&self) -> Function {
                trim(self)
            }

            pub fn ltrim(&self) -> Function {
                ltrim(self)
            }

            pub fn rtrim(&self) -> Function {
                rtrim(self)
            }

            pub fn cast(&self, ty: SqlType) -> Function {
                cast(self, ty)
            }
        }
    };
}

column_functions!(Column);
column_functions!(ColumnDef);
