//! Dynamically-typed values presented to checkers.
//!
//! Checkers receive an obtained value and optional extras without any static type information, so every Rust
//! value is lowered into [`Value`] first. The variants form a closed set:
//!
//! - scalars keep their exact width, so `i32` and `i64` are different [`Kind`]s;
//! - aggregates keep a rendered type name next to their contents, so failures can name the type;
//! - capabilities (callables, stringers, errors, channels) are reference counted and cheap to clone.
//!
//! `Value` is the only currency between the host-independent checkers and the code under test.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::error::Error as StdError;
use std::fmt::{self, Display, Write as _};
use std::hash::BuildHasher;
use std::rc::Rc;

use crate::deep;
use crate::type_name::short_type_name;

// ============================================================================
// Kinds
// ============================================================================

/// The runtime kind of a [`Value`].
///
/// Numeric kinds are per width; two values are only comparable by scalar equality when their kinds match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Nil,
    Bool,
    I8,
    I16,
    I32,
    I64,
    Isize,
    U8,
    U16,
    U32,
    U64,
    Usize,
    F32,
    F64,
    Char,
    Str,
    Seq,
    Array,
    Map,
    Struct,
    Chan,
    Func,
    Stringer,
    Error,
}

impl Kind {
    /// Signed integer of any width.
    pub fn is_signed(self) -> bool {
        matches!(self, Kind::I8 | Kind::I16 | Kind::I32 | Kind::I64 | Kind::Isize)
    }

    /// Unsigned integer of any width.
    pub fn is_unsigned(self) -> bool {
        matches!(self, Kind::U8 | Kind::U16 | Kind::U32 | Kind::U64 | Kind::Usize)
    }

    pub fn is_float(self) -> bool {
        matches!(self, Kind::F32 | Kind::F64)
    }

    /// Kinds compared by plain scalar equality.
    pub fn is_scalar(self) -> bool {
        matches!(self, Kind::Bool | Kind::Char | Kind::Str) || self.is_signed() || self.is_unsigned() || self.is_float()
    }

    /// Kinds with a well-defined length.
    pub fn has_len(self) -> bool {
        matches!(self, Kind::Seq | Kind::Array | Kind::Map | Kind::Str | Kind::Chan)
    }
}

// ============================================================================
// Value
// ============================================================================

/// A dynamically-typed value.
#[derive(Clone)]
pub enum Value {
    /// The canonical absence value (`()`, `None`).
    Nil,
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    Isize(isize),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    Usize(usize),
    F32(f32),
    F64(f64),
    Char(char),
    Str(String),
    /// A growable ordered sequence (`Vec`, `VecDeque`, slices).
    Seq(SeqValue),
    /// A fixed-size array (`[T; N]`).
    Array(SeqValue),
    Map(MapValue),
    Struct(StructValue),
    Chan(ChanValue),
    Func(FuncValue),
    Stringer(StringerValue),
    Error(ErrorValue),
}

impl Value {
    pub fn kind(&self) -> Kind {
        match self {
            Value::Nil => Kind::Nil,
            Value::Bool(_) => Kind::Bool,
            Value::I8(_) => Kind::I8,
            Value::I16(_) => Kind::I16,
            Value::I32(_) => Kind::I32,
            Value::I64(_) => Kind::I64,
            Value::Isize(_) => Kind::Isize,
            Value::U8(_) => Kind::U8,
            Value::U16(_) => Kind::U16,
            Value::U32(_) => Kind::U32,
            Value::U64(_) => Kind::U64,
            Value::Usize(_) => Kind::Usize,
            Value::F32(_) => Kind::F32,
            Value::F64(_) => Kind::F64,
            Value::Char(_) => Kind::Char,
            Value::Str(_) => Kind::Str,
            Value::Seq(_) => Kind::Seq,
            Value::Array(_) => Kind::Array,
            Value::Map(_) => Kind::Map,
            Value::Struct(_) => Kind::Struct,
            Value::Chan(_) => Kind::Chan,
            Value::Func(_) => Kind::Func,
            Value::Stringer(_) => Kind::Stringer,
            Value::Error(_) => Kind::Error,
        }
    }

    /// Rust-style name of the value's type, used in every failure message that names a type.
    pub fn type_name(&self) -> String {
        let name = match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::I8(_) => "i8",
            Value::I16(_) => "i16",
            Value::I32(_) => "i32",
            Value::I64(_) => "i64",
            Value::Isize(_) => "isize",
            Value::U8(_) => "u8",
            Value::U16(_) => "u16",
            Value::U32(_) => "u32",
            Value::U64(_) => "u64",
            Value::Usize(_) => "usize",
            Value::F32(_) => "f32",
            Value::F64(_) => "f64",
            Value::Char(_) => "char",
            Value::Str(_) => "String",
            Value::Seq(seq) | Value::Array(seq) => return seq.ty.clone(),
            Value::Map(map) => return map.ty.clone(),
            Value::Struct(s) => return s.name.clone(),
            Value::Chan(chan) => return chan.ty.clone(),
            Value::Func(func) => return func.ty.clone(),
            Value::Stringer(s) => return s.ty.clone(),
            Value::Error(e) => return e.ty.clone(),
        };
        name.to_string()
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Widens any integer kind to `i128`; `None` for every other kind.
    pub fn as_integer(&self) -> Option<i128> {
        let n = match *self {
            Value::I8(n) => n.into(),
            Value::I16(n) => n.into(),
            Value::I32(n) => n.into(),
            Value::I64(n) => n.into(),
            Value::Isize(n) => n as i128,
            Value::U8(n) => n.into(),
            Value::U16(n) => n.into(),
            Value::U32(n) => n.into(),
            Value::U64(n) => n.into(),
            Value::Usize(n) => n as i128,
            _ => return None,
        };
        Some(n)
    }

    /// Textual form of strings, stringers and errors.
    pub fn text(&self) -> Option<String> {
        match self {
            Value::Str(s) => Some(s.clone()),
            Value::Stringer(s) => Some(s.text()),
            Value::Error(e) => Some(e.message()),
            _ => None,
        }
    }

    /// Length of kinds that have one (see [`Kind::has_len`]). Strings report their byte length.
    pub fn len(&self) -> Option<usize> {
        match self {
            Value::Str(s) => Some(s.len()),
            Value::Seq(seq) | Value::Array(seq) => Some(seq.items.len()),
            Value::Map(map) => Some(map.entries.len()),
            Value::Chan(chan) => Some(chan.len),
            _ => None,
        }
    }

    /// Scalar equality between two values of the same kind.
    ///
    /// ## Returns
    /// - `Some(bool)` when both values share a scalar kind.
    /// - `None` when the kinds differ or are not scalar.
    ///
    /// ## Notes
    /// - Widths are never mixed: `I32(1)` and `I64(1)` yield `None`, not `Some(true)`.
    /// - Floats compare with IEEE `==`, so `NaN` is unequal to itself.
    pub fn scalar_eq(&self, other: &Value) -> Option<bool> {
        let eq = match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::I8(a), Value::I8(b)) => a == b,
            (Value::I16(a), Value::I16(b)) => a == b,
            (Value::I32(a), Value::I32(b)) => a == b,
            (Value::I64(a), Value::I64(b)) => a == b,
            (Value::Isize(a), Value::Isize(b)) => a == b,
            (Value::U8(a), Value::U8(b)) => a == b,
            (Value::U16(a), Value::U16(b)) => a == b,
            (Value::U32(a), Value::U32(b)) => a == b,
            (Value::U64(a), Value::U64(b)) => a == b,
            (Value::Usize(a), Value::Usize(b)) => a == b,
            (Value::F32(a), Value::F32(b)) => a == b,
            (Value::F64(a), Value::F64(b)) => a == b,
            _ => return None,
        };
        Some(eq)
    }

    /// Diagnostic rendering: strings and chars quoted, aggregates rendered recursively.
    pub fn repr(&self) -> String {
        let mut out = String::new();
        // Writing to a String cannot fail.
        let _ = self.write_repr(&mut out);
        out
    }

    fn write_repr(&self, out: &mut String) -> fmt::Result {
        match self {
            Value::Nil => out.write_str("nil"),
            Value::F32(n) => write!(out, "{n:?}"),
            Value::F64(n) => write!(out, "{n:?}"),
            Value::Char(c) => write!(out, "{c:?}"),
            Value::Str(s) => write!(out, "{s:?}"),
            Value::Seq(seq) | Value::Array(seq) => {
                out.push('[');
                for (i, item) in seq.items.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    item.write_repr(out)?;
                }
                out.write_char(']')
            }
            Value::Map(map) => {
                out.push('{');
                for (i, (k, v)) in map.entries.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    k.write_repr(out)?;
                    out.push_str(": ");
                    v.write_repr(out)?;
                }
                out.write_char('}')
            }
            Value::Struct(s) => {
                out.push_str(&s.name);
                if s.fields.is_empty() {
                    return Ok(());
                }
                out.push_str(" { ");
                for (i, (name, v)) in s.fields.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    out.push_str(name);
                    out.push_str(": ");
                    v.write_repr(out)?;
                }
                out.write_str(" }")
            }
            Value::Chan(chan) => write!(out, "{}(len {}, cap {})", chan.ty, chan.len, chan.cap),
            Value::Func(func) => out.write_str(&func.ty),
            Value::Stringer(s) => write!(out, "{}({:?})", s.ty, s.text()),
            Value::Error(e) => write!(out, "{}({:?})", e.ty, e.message()),
            scalar => write!(out, "{scalar}"),
        }
    }

    /// Wraps a value that renders itself as text.
    pub fn stringer<T: Display + 'static>(value: T) -> Value {
        Value::Stringer(StringerValue {
            ty: short_type_name::<T>(),
            inner: Rc::new(value),
        })
    }

    /// Wraps an error value.
    pub fn error<E: StdError + 'static>(err: E) -> Value {
        Value::Error(ErrorValue {
            ty: short_type_name::<E>(),
            inner: Rc::new(err),
        })
    }

    /// Wraps a callable. Only zero-parameter callables can later be invoked.
    ///
    /// ```rust
    /// use checkers_core::Value;
    /// let f = Value::func(|| {});
    /// assert_eq!(f.type_name(), "fn()");
    /// let g = Value::func(|_: i32| {});
    /// assert_eq!(g.type_name(), "fn(i32)");
    /// ```
    pub fn func<Args, F: IntoFunc<Args>>(f: F) -> Value {
        Value::Func(f.into_func())
    }

    /// A channel with `len` buffered messages out of `cap`.
    pub fn channel(ty: impl Into<String>, len: usize, cap: usize) -> Value {
        Value::Chan(ChanValue {
            ty: ty.into(),
            len,
            cap,
        })
    }
}

impl PartialEq for Value {
    /// Structural equality as defined by [`deep::deep_equal`].
    fn eq(&self, other: &Value) -> bool {
        deep::deep_equal(self, other).is_ok()
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.repr())
    }
}

impl Display for Value {
    /// Plain rendering: strings unquoted, everything else as [`Value::repr`].
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::I8(n) => write!(f, "{n}"),
            Value::I16(n) => write!(f, "{n}"),
            Value::I32(n) => write!(f, "{n}"),
            Value::I64(n) => write!(f, "{n}"),
            Value::Isize(n) => write!(f, "{n}"),
            Value::U8(n) => write!(f, "{n}"),
            Value::U16(n) => write!(f, "{n}"),
            Value::U32(n) => write!(f, "{n}"),
            Value::U64(n) => write!(f, "{n}"),
            Value::Usize(n) => write!(f, "{n}"),
            Value::F32(n) => write!(f, "{n}"),
            Value::F64(n) => write!(f, "{n}"),
            Value::Char(c) => write!(f, "{c}"),
            Value::Str(s) => f.write_str(s),
            Value::Stringer(s) => f.write_str(&s.text()),
            Value::Error(e) => f.write_str(&e.message()),
            other => f.write_str(&other.repr()),
        }
    }
}

// ============================================================================
// Aggregate and capability payloads
// ============================================================================

/// Items of a sequence or fixed-size array.
#[derive(Clone)]
pub struct SeqValue {
    ty: String,
    items: Vec<Value>,
}

impl SeqValue {
    pub fn new(ty: impl Into<String>, items: Vec<Value>) -> Self {
        Self { ty: ty.into(), items }
    }

    pub fn items(&self) -> &[Value] {
        &self.items
    }
}

/// Entries of an associative mapping, kept sorted by the keys' [`Value::repr`] so rendering is deterministic.
#[derive(Clone)]
pub struct MapValue {
    ty: String,
    entries: Vec<(Value, Value)>,
}

impl MapValue {
    pub fn new(ty: impl Into<String>, mut entries: Vec<(Value, Value)>) -> Self {
        entries.sort_by_cached_key(|(k, _)| k.repr());
        Self { ty: ty.into(), entries }
    }

    pub fn entries(&self) -> &[(Value, Value)] {
        &self.entries
    }

    /// Looks a key up by structural equality.
    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}

/// Named fields of a struct, in declaration order.
#[derive(Clone)]
pub struct StructValue {
    name: String,
    fields: Vec<(String, Value)>,
}

impl StructValue {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[(String, Value)] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }
}

impl From<StructValue> for Value {
    fn from(s: StructValue) -> Self {
        Value::Struct(s)
    }
}

/// A snapshot of a channel's buffered depth.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChanValue {
    ty: String,
    len: usize,
    cap: usize,
}

impl ChanValue {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn cap(&self) -> usize {
        self.cap
    }
}

/// A callable with a recorded parameter count.
#[derive(Clone)]
pub struct FuncValue {
    ty: String,
    params: usize,
    call: Option<Rc<dyn Fn()>>,
}

impl FuncValue {
    pub fn params(&self) -> usize {
        self.params
    }

    /// The callable itself; only present for zero-parameter callables.
    pub fn callable(&self) -> Option<&dyn Fn()> {
        self.call.as_deref()
    }
}

/// A value exposing a textual representation.
#[derive(Clone)]
pub struct StringerValue {
    ty: String,
    inner: Rc<dyn Display>,
}

impl StringerValue {
    pub fn text(&self) -> String {
        self.inner.to_string()
    }
}

/// An error value.
#[derive(Clone)]
pub struct ErrorValue {
    ty: String,
    inner: Rc<dyn StdError>,
}

impl ErrorValue {
    pub fn message(&self) -> String {
        self.inner.to_string()
    }

    pub fn source(&self) -> &dyn StdError {
        self.inner.as_ref()
    }
}

// ============================================================================
// Callables
// ============================================================================

/// Conversion of closures and function items into [`FuncValue`], keyed by their argument tuple.
pub trait IntoFunc<Args> {
    fn into_func(self) -> FuncValue;
}

impl<F, R> IntoFunc<()> for F
where
    F: Fn() -> R + 'static,
{
    fn into_func(self) -> FuncValue {
        FuncValue {
            ty: "fn()".to_string(),
            params: 0,
            call: Some(Rc::new(move || {
                self();
            })),
        }
    }
}

macro_rules! impl_into_func {
    ($($arg:ident),+) => {
        impl<F, R, $($arg),+> IntoFunc<($($arg,)+)> for F
        where
            F: Fn($($arg),+) -> R + 'static,
        {
            fn into_func(self) -> FuncValue {
                let params = [$(short_type_name::<$arg>()),+];
                FuncValue {
                    ty: format!("fn({})", params.join(", ")),
                    params: params.len(),
                    call: None,
                }
            }
        }
    };
}

impl_into_func!(A);
impl_into_func!(A, B);
impl_into_func!(A, B, C);
impl_into_func!(A, B, C, D);

// ============================================================================
// Conversions
// ============================================================================

macro_rules! impl_from_scalar {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

impl_from_scalar! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    isize => Isize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    usize => Usize,
    f32 => F32,
    f64 => F64,
    char => Char,
    String => Str,
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Nil
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::Str(s.clone())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Nil, Into::into)
    }
}

impl<T: Into<Value>> From<Box<T>> for Value {
    fn from(v: Box<T>) -> Self {
        (*v).into()
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        let ty = short_type_name::<Vec<T>>();
        Value::Seq(SeqValue::new(ty, items.into_iter().map(Into::into).collect()))
    }
}

impl<T: Into<Value>> From<VecDeque<T>> for Value {
    fn from(items: VecDeque<T>) -> Self {
        let ty = short_type_name::<VecDeque<T>>();
        Value::Seq(SeqValue::new(ty, items.into_iter().map(Into::into).collect()))
    }
}

impl<T: Clone + Into<Value>> From<&[T]> for Value {
    fn from(items: &[T]) -> Self {
        let ty = short_type_name::<&[T]>();
        Value::Seq(SeqValue::new(ty, items.iter().cloned().map(Into::into).collect()))
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(items: [T; N]) -> Self {
        let ty = short_type_name::<[T; N]>();
        Value::Array(SeqValue::new(ty, items.into_iter().map(Into::into).collect()))
    }
}

impl<K: Into<Value>, V: Into<Value>, S: BuildHasher> From<HashMap<K, V, S>> for Value {
    fn from(map: HashMap<K, V, S>) -> Self {
        let ty = short_type_name::<HashMap<K, V>>();
        let entries = map.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        Value::Map(MapValue::new(ty, entries))
    }
}

impl<K: Into<Value>, V: Into<Value>> From<BTreeMap<K, V>> for Value {
    fn from(map: BTreeMap<K, V>) -> Self {
        let ty = short_type_name::<BTreeMap<K, V>>();
        let entries = map.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        Value::Map(MapValue::new(ty, entries))
    }
}

#[cfg(feature = "tokio")]
impl<T> From<&tokio::sync::mpsc::Sender<T>> for Value {
    /// Buffered depth of a bounded tokio channel, observed through one of its senders.
    fn from(tx: &tokio::sync::mpsc::Sender<T>) -> Self {
        let cap = tx.max_capacity();
        Value::Chan(ChanValue {
            ty: short_type_name::<tokio::sync::mpsc::Sender<T>>(),
            len: cap - tx.capacity(),
            cap,
        })
    }
}
