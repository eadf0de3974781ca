//! Canonical stringification.
//!
//! Every variant maps to a canonical UTF-8 text. Container kinds delegate
//! to `Container::write_json`, implemented one layer up in `purc-runtime`;
//! everything else is rendered here.

use crate::value::{Variant, serialize_flags};
use std::fmt::Write as _;

pub use crate::value::serialize_flags::*;

fn has(flags: u32, bit: u32) -> bool {
    flags & bit != 0
}

/// Append `v`'s canonical text form to `out`.
///
/// Numeric type suffixes (`L`, `UL`, `FL`) are needed for the parse/
/// serialize round trip, so they are always emitted unless `PLAIN` is
/// set, regardless of `RUNTIME_STRING`; `RUNTIME_STRING` additionally
/// forces them to appear even when `PLAIN` is set.
pub fn write_json(v: &Variant, out: &mut String, flags: u32) {
    let plain = has(flags, PLAIN);
    let force_suffix = has(flags, RUNTIME_STRING);
    let suffixed = !plain || force_suffix;

    match v {
        Variant::Null => out.push_str("null"),
        Variant::Undefined => out.push_str("undefined"),
        Variant::Boolean(b) => out.push_str(if *b { "true" } else { "false" }),
        Variant::Exception(atom) => {
            if plain {
                let _ = write!(out, "{atom}");
            } else {
                let _ = write!(out, "\"{atom}\"");
            }
        }
        Variant::Number(n) => write_float(out, *n, ""),
        Variant::LongInt(n) => {
            let _ = write!(out, "{n}");
            if suffixed {
                out.push('L');
            }
        }
        Variant::ULongInt(n) => {
            let _ = write!(out, "{n}");
            if suffixed {
                out.push_str("UL");
            }
        }
        Variant::LongDouble(n) => write_float(out, *n, if suffixed { "FL" } else { "" }),
        Variant::AtomString(atom) => {
            if plain {
                let _ = write!(out, "{atom}");
            } else {
                escape_json_string(atom.id().to_string().as_str(), out, flags);
            }
        }
        Variant::String(s) => {
            if plain {
                out.push_str(s);
            } else {
                escape_json_string(s, out, flags);
            }
        }
        Variant::Bytes(bytes) => {
            out.push_str("bx");
            for byte in bytes.iter() {
                let _ = write!(out, "{byte:02x}");
            }
        }
        Variant::Dynamic(_) => out.push_str("\"<dynamic>\""),
        Variant::Native(entity) => {
            let _ = write!(out, "\"<native:{}>\"", entity.type_name());
        }
        Variant::Container(c) => c.write_json(out, flags),
    }
}

fn write_float(out: &mut String, n: f64, suffix: &str) {
    if n.is_nan() {
        out.push_str("NaN");
    } else if n.is_infinite() {
        out.push_str(if n > 0.0 { "Infinity" } else { "-Infinity" });
    } else {
        let _ = write!(out, "{n}");
    }
    out.push_str(suffix);
}

/// JSON-escape `s` into a double-quoted string, honoring `NOSLASH_ESCAPE`.
pub fn escape_json_string(s: &str, out: &mut String, flags: u32) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '/' if !has(flags, serialize_flags::NOSLASH_ESCAPE) => out.push_str("\\/"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

/// Render `v` to its canonical text form.
pub fn stringify(v: &Variant, flags: u32) -> String {
    let mut out = String::new();
    write_json(v, &mut out, flags);
    out
}

/// Convenience: `stringify(v, PLAIN)`, used internally by `coerce::compare`.
pub fn stringify_plain(v: &Variant) -> String {
    stringify(v, serialize_flags::PLAIN)
}
