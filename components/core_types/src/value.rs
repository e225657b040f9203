//! Lox value representation.
//!
//! Values are small and `Copy`: primitives are stored inline and heap
//! payloads are referenced through an [`ObjRef`] handle, never duplicated.

use std::fmt;

/// Handle to an object living in the heap arena.
///
/// Handles are plain indices. Two handles compare equal exactly when they name
/// the same heap slot; because strings are interned this also means equal
/// string handles have equal contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjRef(pub u32);

impl ObjRef {
    /// Returns the arena slot index of this handle.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ObjRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Host function callable from Lox code.
///
/// Receives the call arguments as a slice of the VM stack and returns a
/// single value which replaces the call site.
pub type NativeFn = fn(&[Value]) -> Value;

/// Represents any Lox value.
///
/// # Examples
///
/// ```
/// use core_types::Value;
///
/// assert!(Value::Bool(false).is_falsey());
/// assert!(!Value::Number(0.0).is_falsey());
/// assert_eq!(Value::Number(2.0).as_number(), Some(2.0));
/// ```
#[derive(Debug, Clone, Copy)]
pub enum Value {
    /// `true` or `false`
    Bool(bool),
    /// `nil`
    Nil,
    /// IEEE 754 double-precision number
    Number(f64),
    /// Reference to a heap object
    Obj(ObjRef),
}

impl Value {
    /// Returns whether this value counts as false in a condition.
    ///
    /// Only `nil` and `false` are falsey; `0` and `""` are truthy.
    pub fn is_falsey(&self) -> bool {
        matches!(self, Value::Nil | Value::Bool(false))
    }

    /// Returns the number payload, if any.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the heap handle, if any.
    pub fn as_obj(&self) -> Option<ObjRef> {
        match self {
            Value::Obj(r) => Some(*r),
            _ => None,
        }
    }

    /// Returns true for `Value::Number`.
    pub fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Nil
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Nil, Value::Nil) => true,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Obj(a), Value::Obj(b)) => a == b,
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<ObjRef> for Value {
    fn from(r: ObjRef) -> Self {
        Value::Obj(r)
    }
}

/// Formats a number the way `print` shows it.
///
/// Integral values print without a fractional part, everything else uses the
/// shortest representation that round-trips.
///
/// ```
/// use core_types::format_number;
///
/// assert_eq!(format_number(7.0), "7");
/// assert_eq!(format_number(2.5), "2.5");
/// assert_eq!(format_number(-0.0), "-0");
/// ```
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "nan".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if n == 0.0 && n.is_sign_negative() {
        return "-0".to_string();
    }
    if n.fract() == 0.0 && n.abs() < 1e15 {
        return format!("{}", n as i64);
    }
    let mut buffer = ryu::Buffer::new();
    buffer.format_finite(n).to_string()
}
