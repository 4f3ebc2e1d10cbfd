//! The two-phase rendering protocol.
//!
//! Rendering a node is split in two passes over the same tree:
//!
//! 1. [`Render::size`] and [`Render::arg_count`] report the exact number of
//!    bytes and placeholder arguments the node will produce.
//! 2. [`Render::scan`] writes the bytes into a buffer of exactly that length
//!    and fills argument slots starting at a shared cursor.
//!
//! The driver [`render`] allocates once from the phase-1 numbers and asserts
//! both totals after phase 2. A mismatch is a bug in a node implementation
//! and aborts instead of truncating output.

use crate::dialect::{RenderContext, Symbol};
use crate::value::Value;

/// The renderer protocol implemented by every statement node.
pub trait Render {
    /// Exact number of bytes `scan` will write under `ctx`.
    fn size(&self, ctx: &RenderContext) -> usize;

    /// Exact number of argument slots `scan` will fill.
    fn arg_count(&self) -> usize;

    /// Write into `buf` (starting at index 0) and fill `args[*cur_arg..]`.
    ///
    /// Returns the number of bytes written, which must equal `size(ctx)`, and
    /// advances `cur_arg` by exactly `arg_count()`.
    fn scan(
        &self,
        ctx: &RenderContext,
        buf: &mut [u8],
        args: &mut [Value],
        cur_arg: &mut usize,
    ) -> usize;
}

/// Copy `s` to the front of `buf`, returning the number of bytes copied.
#[inline]
pub(crate) fn write_str(buf: &mut [u8], s: &str) -> usize {
    let n = s.len();
    buf[..n].copy_from_slice(s.as_bytes());
    n
}

/// Copy the literal text of `sym` to the front of `buf`.
#[inline]
pub(crate) fn write_sym(ctx: &RenderContext, buf: &mut [u8], sym: Symbol) -> usize {
    write_str(buf, ctx.sym(sym))
}

/// Byte length of `sym` under `ctx`.
#[inline]
pub(crate) fn sym_len(ctx: &RenderContext, sym: Symbol) -> usize {
    ctx.sym(sym).len()
}

/// Write a placeholder glyph and bind `value` at the cursor.
#[inline]
pub(crate) fn write_placeholder(
    ctx: &RenderContext,
    buf: &mut [u8],
    args: &mut [Value],
    cur_arg: &mut usize,
    value: &Value,
) -> usize {
    args[*cur_arg] = value.clone();
    *cur_arg += 1;
    write_sym(ctx, buf, Symbol::Placeholder)
}

/// Size of `items` joined by `sep`.
pub(crate) fn joined_size<T: Render>(ctx: &RenderContext, items: &[T], sep: Symbol) -> usize {
    let mut size: usize = items.iter().map(|i| i.size(ctx)).sum();
    if items.len() > 1 {
        size += sym_len(ctx, sep) * (items.len() - 1);
    }
    size
}

/// Scan `items` joined by `sep`.
pub(crate) fn joined_scan<T: Render>(
    ctx: &RenderContext,
    items: &[T],
    sep: Symbol,
    buf: &mut [u8],
    args: &mut [Value],
    cur_arg: &mut usize,
) -> usize {
    let mut bw = 0;
    for (x, item) in items.iter().enumerate() {
        if x > 0 {
            bw += write_sym(ctx, &mut buf[bw..], sep);
        }
        bw += item.scan(ctx, &mut buf[bw..], args, cur_arg);
    }
    bw
}

/// Run both phases over `node` and return the SQL text and its arguments.
///
/// Nothing is cached: every call recomputes size and argument count from
/// the node's current state.
pub fn render<R: Render + ?Sized>(node: &R, ctx: &RenderContext) -> (String, Vec<Value>) {
    let size = node.size(ctx);
    let argc = node.arg_count();

    let mut buf = vec![0u8; size];
    let mut args = vec![Value::Null; argc];
    let mut cur_arg = 0;
    let written = node.scan(ctx, &mut buf, &mut args, &mut cur_arg);

    assert_eq!(written, size, "render wrote {written} bytes, sized {size}");
    assert_eq!(cur_arg, argc, "render bound {cur_arg} arguments, counted {argc}");

    let buf = ctx.dialect.interpolate(buf, argc);
    debug_assert_eq!(buf.len(), size + ctx.dialect.interpolation_length(argc));

    #[cfg(feature = "tracing")]
    tracing::debug!(
        dialect = %ctx.dialect,
        bytes = buf.len(),
        args = argc,
        "rendered statement"
    );

    // Every write copies whole `&str` values, so the buffer is valid UTF-8.
    let sql = String::from_utf8(buf)
        .unwrap_or_else(|err| String::from_utf8_lossy(err.as_bytes()).into_owned());
    (sql, args)
}
