// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Host runtime names: types, literals, defaults and the utility class.

use lsl_ast::{BinaryOp, LslType};
use lsl_library::LibraryConstant;

use crate::{CodegenError, CodegenResult};

pub(crate) const GLOBALS_CLASS: &str = "GLOBALS";
pub(crate) const GLOBALS_FIELD: &str = "Globals";
pub(crate) const GLOBAL_PREFIX: &str = "GV_";
pub(crate) const FUNCTION_PREFIX: &str = "FN_";
pub(crate) const PARAM_PREFIX: &str = "PM_";
pub(crate) const LOCAL_PREFIX: &str = "LV";
pub(crate) const LABEL_PREFIX: &str = "LSLLabel_";

/// Runtime helpers every generated script carries.
pub(crate) const UTILITY_CLASS: &str = "\
private static class UTILITIES
{
	public static void ForceStatement<T>(T val) {}
	public static bool ToBool(LSL_Types.LSLString str)
	{
		return str.Length != 0;
	}
	public static bool ToBool(LSL_Types.key k)
	{
		return (bool)k;
	}
	public static bool ToBool(LSL_Types.Vector3 vec)
	{
		return vec.x != 0 || vec.y != 0 || vec.z != 0;
	}
	public static bool ToBool(LSL_Types.Quaternion rot)
	{
		return rot.x != 0 || rot.y != 0 || rot.z != 0 || rot.s != 1;
	}
	public static bool ToBool(LSL_Types.list lst)
	{
		return lst.Length != 0;
	}
	public static LSL_Types.Quaternion Negate(LSL_Types.Quaternion rot)
	{
		rot.x=(-rot.x);
		rot.y=(-rot.y);
		rot.z=(-rot.z);
		rot.s=(-rot.s);
		return rot;
	}
	public static LSL_Types.Vector3 Negate(LSL_Types.Vector3 vec)
	{
		vec.x=(-vec.x);
		vec.y=(-vec.y);
		vec.z=(-vec.z);
		return vec;
	}
	public static LSL_Types.list CopyList(LSL_Types.list lst)
	{
		return new LSL_Types.list(lst.Data);
	}
	public static LSL_Types.LSLInteger DefaultInteger { get { return new LSL_Types.LSLInteger(0); } set { } }
	public static LSL_Types.LSLFloat DefaultFloat { get { return new LSL_Types.LSLFloat(0.0); } set { } }
	public static LSL_Types.LSLString DefaultString { get { return new LSL_Types.LSLString(\"\"); } set { } }
	public static LSL_Types.Vector3 DefaultVector { get { return new LSL_Types.Vector3(0,0,0); } set { } }
	public static LSL_Types.Quaternion DefaultRotation { get { return new LSL_Types.Quaternion(0,0,0,1); } set { } }
	public static LSL_Types.list DefaultList { get { return new LSL_Types.list(); } set { } }
}";

pub(crate) fn host_type(ty: LslType) -> &'static str {
    match ty {
        LslType::Integer => "LSL_Types.LSLInteger",
        LslType::Float => "LSL_Types.LSLFloat",
        LslType::String | LslType::Key => "LSL_Types.LSLString",
        LslType::Vector => "LSL_Types.Vector3",
        LslType::Rotation => "LSL_Types.Quaternion",
        LslType::List => "LSL_Types.list",
        LslType::Void => "void",
    }
}

/// Initializer for a declaration written without one.
pub(crate) fn default_initializer(ty: LslType) -> CodegenResult<&'static str> {
    Ok(match ty {
        LslType::Integer => "0",
        LslType::Float => "0.0",
        LslType::String | LslType::Key => "\"\"",
        LslType::Vector => "new LSL_Types.Vector3(0,0,0)",
        LslType::Rotation => "new LSL_Types.Quaternion(0,0,0,1)",
        LslType::List => "new LSL_Types.list()",
        LslType::Void => return Err(CodegenError::Internal("void variable declaration".into())),
    })
}

/// Stand-in for a variable whose declaration never executes.
pub(crate) fn dead_variable_default(ty: LslType) -> CodegenResult<&'static str> {
    Ok(match ty {
        LslType::Integer => "UTILITIES.DefaultInteger",
        LslType::Float => "UTILITIES.DefaultFloat",
        LslType::String | LslType::Key => "UTILITIES.DefaultString",
        LslType::Vector => "UTILITIES.DefaultVector",
        LslType::Rotation => "UTILITIES.DefaultRotation",
        LslType::List => "UTILITIES.DefaultList",
        LslType::Void => return Err(CodegenError::Internal("reference to a void variable".into())),
    })
}

/// Generic dispatch entry point for a library function's return type.
pub(crate) fn mod_invoke_method(ty: LslType) -> &'static str {
    match ty {
        LslType::Void => "modInvokeN",
        LslType::String => "modInvokeS",
        LslType::Integer => "modInvokeI",
        LslType::Float => "modInvokeF",
        LslType::Key => "modInvokeK",
        LslType::List => "modInvokeL",
        LslType::Vector => "modInvokeV",
        LslType::Rotation => "modInvokeR",
    }
}

/// One generic binary operation used by the script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct OperatorStub {
    pub left: LslType,
    pub op: BinaryOp,
    pub right: LslType,
    pub result: LslType,
}

impl OperatorStub {
    pub fn name(&self) -> String {
        format!(
            "_op_{}_{}_{}",
            self.left.title(),
            self.op.name(),
            self.right.title()
        )
    }
}

/// Rewrite `1.` and `1.e5` forms the host does not accept.
pub(crate) fn float_literal(text: &str) -> String {
    let body = text.trim_end_matches(['f', 'F']);
    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(at) => body.split_at(at),
        None => (body, ""),
    };
    if mantissa.ends_with('.') {
        format!("{mantissa}0{exponent}")
    } else {
        text.to_string()
    }
}

/// Integer literal text the host accepts. Values past 32 bits become -1.
pub(crate) fn integer_literal(text: &str) -> String {
    match text.parse::<i64>() {
        Ok(v) if v <= i64::from(i32::MAX) => text.to_string(),
        _ => "-1".to_string(),
    }
}

/// Hex literal text. Values with the sign bit set are written as their
/// two's-complement decimal.
pub(crate) fn hex_literal(text: &str) -> String {
    let digits = text.trim_start_matches("0x").trim_start_matches("0X");
    match u64::from_str_radix(digits, 16) {
        Ok(v) if v <= i32::MAX as u64 => text.to_string(),
        Ok(v) if v <= u32::MAX as u64 => (v as u32 as i32).to_string(),
        _ => "-1".to_string(),
    }
}

/// Boxed value of an expanded library constant.
pub(crate) fn expanded_constant(constant: &LibraryConstant) -> CodegenResult<String> {
    let value = constant.value.trim();
    Ok(match constant.ty {
        LslType::Integer => format!("new LSL_Types.LSLInteger({value})"),
        LslType::Float => format!("new LSL_Types.LSLFloat({value})"),
        LslType::String | LslType::Key => format!("new LSL_Types.LSLString({value})"),
        LslType::Vector => format!("new LSL_Types.Vector3({})", strip_delimiters(value, '<', '>')),
        LslType::Rotation => {
            format!("new LSL_Types.Quaternion({})", strip_delimiters(value, '<', '>'))
        }
        LslType::List => {
            let items = split_top_level(strip_delimiters(value, '[', ']'))
                .into_iter()
                .map(list_constant_element)
                .collect::<Vec<_>>();
            format!("new LSL_Types.list({})", items.join(", "))
        }
        LslType::Void => {
            return Err(CodegenError::Internal(format!(
                "library constant `{}` has type void",
                constant.name
            )))
        }
    })
}

fn strip_delimiters(text: &str, open: char, close: char) -> &str {
    text.trim()
        .strip_prefix(open)
        .and_then(|t| t.strip_suffix(close))
        .unwrap_or(text)
        .trim()
}

/// Split on commas that are not inside quotes or angle brackets.
fn split_top_level(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    let mut start = 0;
    for (i, ch) in text.char_indices() {
        match ch {
            _ if escaped => escaped = false,
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '<' if !in_string => depth += 1,
            '>' if !in_string => depth = depth.saturating_sub(1),
            ',' if !in_string && depth == 0 => {
                parts.push(text[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    let last = text[start..].trim();
    if !last.is_empty() {
        parts.push(last);
    }
    parts
}

fn list_constant_element(item: &str) -> String {
    if item.starts_with('"') {
        format!("new LSL_Types.LSLString({item})")
    } else if item.starts_with('<') {
        let inner = strip_delimiters(item, '<', '>');
        if split_top_level(inner).len() == 4 {
            format!("new LSL_Types.Quaternion({inner})")
        } else {
            format!("new LSL_Types.Vector3({inner})")
        }
    } else if item.contains(['.', 'e', 'E']) && !item.starts_with("0x") {
        format!("new LSL_Types.LSLFloat({})", float_literal(item))
    } else {
        format!("new LSL_Types.LSLInteger({item})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_forms() {
        assert_eq!(float_literal("1."), "1.0");
        assert_eq!(float_literal("1.e-5"), "1.0e-5");
        assert_eq!(float_literal("2.5"), "2.5");
        assert_eq!(float_literal("3.f"), "3.0");
        assert_eq!(float_literal(".5"), ".5");
    }

    #[test]
    fn integer_overflow_becomes_minus_one() {
        assert_eq!(integer_literal("2147483647"), "2147483647");
        assert_eq!(integer_literal("2147483648"), "-1");
        assert_eq!(integer_literal("99999999999999999999"), "-1");
    }

    #[test]
    fn hex_wraps_to_signed() {
        assert_eq!(hex_literal("0xFF"), "0xFF");
        assert_eq!(hex_literal("0xFFFFFFFF"), "-1");
        assert_eq!(hex_literal("0x80000000"), "-2147483648");
        assert_eq!(hex_literal("0x1FFFFFFFF"), "-1");
    }

    #[test]
    fn expanded_constants() {
        let v = LibraryConstant::new("ZERO_VECTOR", LslType::Vector, "<0.0, 0.0, 0.0>");
        assert_eq!(expanded_constant(&v).unwrap(), "new LSL_Types.Vector3(0.0, 0.0, 0.0)");
        let k = LibraryConstant::new("NULL_KEY", LslType::Key, "\"0000\"");
        assert_eq!(expanded_constant(&k).unwrap(), "new LSL_Types.LSLString(\"0000\")");
        let l = LibraryConstant::new("L", LslType::List, "[1, \"a,b\", <1,2,3>, 2.5]");
        assert_eq!(
            expanded_constant(&l).unwrap(),
            "new LSL_Types.list(new LSL_Types.LSLInteger(1), new LSL_Types.LSLString(\"a,b\"), \
             new LSL_Types.Vector3(1,2,3), new LSL_Types.LSLFloat(2.5))"
        );
    }

    #[test]
    fn stub_names() {
        let stub = OperatorStub {
            left: LslType::Integer,
            op: BinaryOp::Add,
            right: LslType::Float,
            result: LslType::Float,
        };
        assert_eq!(stub.name(), "_op_Integer_Add_Float");
    }
}
