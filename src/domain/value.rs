//! Boxed constant values carried by `Constant` nodes.

use std::sync::Arc;

use crate::domain::hashing::{fnv1a_bytes, Fnv1a, OBJECT_SENTINEL};
use crate::domain::symbol::{Sym, TypeRef};

/// The value of a constant node.
///
/// Equality is value equality: variants never compare equal to each other
/// (`I32(1) != I64(1)`), and floats compare by canonical bit pattern so that
/// every NaN equals every other NaN and `-0.0 == 0.0`. Hashing follows the
/// same rules.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Char(char),
    I32(i32),
    I64(i64),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Str(Arc<str>),
    Type(TypeRef),
    Object(Sym),
}

impl Value {
    pub fn string(s: impl Into<String>) -> Self {
        Value::Str(Arc::from(s.into()))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn hash_code(&self) -> u32 {
        let mut acc = Fnv1a::new();
        acc.fold(self.tag());
        match self {
            Value::Null => acc.fold(OBJECT_SENTINEL),
            Value::Bool(b) => acc.fold_bool(*b),
            Value::Char(c) => acc.fold(*c as u32),
            Value::I32(v) => acc.fold(*v as u32),
            Value::I64(v) => fold_u64(&mut acc, *v as u64),
            Value::U32(v) => acc.fold(*v),
            Value::U64(v) => fold_u64(&mut acc, *v),
            Value::F32(v) => acc.fold(canonical_f32(*v)),
            Value::F64(v) => fold_u64(&mut acc, canonical_f64(*v)),
            Value::Str(s) => acc.fold(fnv1a_bytes(s.as_bytes())),
            Value::Type(ty) => acc.fold(ty.hash_code()),
            Value::Object(obj) => acc.fold(obj.hash_code()),
        }
        acc.finish()
    }

    fn tag(&self) -> u32 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Char(_) => 2,
            Value::I32(_) => 3,
            Value::I64(_) => 4,
            Value::U32(_) => 5,
            Value::U64(_) => 6,
            Value::F32(_) => 7,
            Value::F64(_) => 8,
            Value::Str(_) => 9,
            Value::Type(_) => 10,
            Value::Object(_) => 11,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::I32(a), Value::I32(b)) => a == b,
            (Value::I64(a), Value::I64(b)) => a == b,
            (Value::U32(a), Value::U32(b)) => a == b,
            (Value::U64(a), Value::U64(b)) => a == b,
            (Value::F32(a), Value::F32(b)) => canonical_f32(*a) == canonical_f32(*b),
            (Value::F64(a), Value::F64(b)) => canonical_f64(*a) == canonical_f64(*b),
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Type(a), Value::Type(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::I32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::I64(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::F64(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::string(v)
    }
}

fn fold_u64(acc: &mut Fnv1a, v: u64) {
    acc.fold(v as u32);
    acc.fold((v >> 32) as u32);
}

fn canonical_f32(v: f32) -> u32 {
    if v.is_nan() {
        f32::NAN.to_bits()
    } else if v == 0.0 {
        0
    } else {
        v.to_bits()
    }
}

fn canonical_f64(v: f64) -> u64 {
    if v.is_nan() {
        f64::NAN.to_bits()
    } else if v == 0.0 {
        0
    } else {
        v.to_bits()
    }
}
