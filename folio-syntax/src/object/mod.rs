//! The PDF object model.

use std::borrow::Cow;
use std::fmt::{Debug, Display, Formatter};

pub mod dict;
pub mod name;
pub mod stream;
pub mod string;

pub use dict::Dict;
pub use name::Name;
pub use stream::{LengthStatus, Stream};
pub use string::PdfString;

/// The identifier of an indirect object: an object number and a generation number.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId {
    /// The object number.
    pub num: u32,
    /// The generation number.
    pub gen_num: u16,
}

impl ObjectId {
    /// Create a new object identifier.
    pub fn new(num: u32, gen_num: u16) -> Self {
        Self { num, gen_num }
    }
}

impl Display for ObjectId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.num, self.gen_num)
    }
}

/// A PDF object.
///
/// References are weak: they only name an indirect object and have to be resolved
/// through whatever table owns the objects. They may dangle.
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    /// The null object.
    Null,
    /// A boolean.
    Boolean(bool),
    /// An integer.
    Integer(i64),
    /// A real number.
    Real(f64),
    /// A string.
    String(PdfString),
    /// A name.
    Name(Name),
    /// An array.
    Array(Vec<Object>),
    /// A dictionary.
    Dict(Dict),
    /// A stream.
    Stream(Stream),
    /// A reference to an indirect object.
    Reference(ObjectId),
}

/// The type of an object, without its value.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ObjectKind {
    /// See [`Object::Null`].
    Null,
    /// See [`Object::Boolean`].
    Boolean,
    /// See [`Object::Integer`].
    Integer,
    /// See [`Object::Real`].
    Real,
    /// See [`Object::String`].
    String,
    /// See [`Object::Name`].
    Name,
    /// See [`Object::Array`].
    Array,
    /// See [`Object::Dict`].
    Dict,
    /// See [`Object::Stream`].
    Stream,
    /// See [`Object::Reference`].
    Reference,
}

impl ObjectKind {
    /// A lowercase name for the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Real => "real",
            Self::String => "string",
            Self::Name => "name",
            Self::Array => "array",
            Self::Dict => "dictionary",
            Self::Stream => "stream",
            Self::Reference => "reference",
        }
    }
}

impl Object {
    /// The shared `null` object.
    pub const NULL: &'static Self = &Self::Null;

    /// Return the kind of the object.
    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Null => ObjectKind::Null,
            Self::Boolean(_) => ObjectKind::Boolean,
            Self::Integer(_) => ObjectKind::Integer,
            Self::Real(_) => ObjectKind::Real,
            Self::String(_) => ObjectKind::String,
            Self::Name(_) => ObjectKind::Name,
            Self::Array(_) => ObjectKind::Array,
            Self::Dict(_) => ObjectKind::Dict,
            Self::Stream(_) => ObjectKind::Stream,
            Self::Reference(_) => ObjectKind::Reference,
        }
    }

    /// Whether the object is `null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Return the value of a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Return the value of an integer, or of a real without fractional part.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            Self::Real(r) if r.fract() == 0.0 && r.is_finite() => Some(*r as i64),
            _ => None,
        }
    }

    /// Return the value of any number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(*i as f64),
            Self::Real(r) => Some(*r),
            _ => None,
        }
    }

    /// Return the object as a name.
    pub fn as_name(&self) -> Option<&Name> {
        match self {
            Self::Name(n) => Some(n),
            _ => None,
        }
    }

    /// Return the object as a string.
    pub fn as_string(&self) -> Option<&PdfString> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Return the object as an array.
    pub fn as_array(&self) -> Option<&[Self]> {
        match self {
            Self::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Return the object as a dictionary. Streams are not dictionaries, use
    /// [`Object::as_dict_like`] to accept both.
    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            Self::Dict(d) => Some(d),
            _ => None,
        }
    }

    /// Return the dictionary of a dictionary or stream.
    pub fn as_dict_like(&self) -> Option<&Dict> {
        match self {
            Self::Dict(d) => Some(d),
            Self::Stream(s) => Some(s.dict()),
            _ => None,
        }
    }

    /// Return the object as a stream.
    pub fn as_stream(&self) -> Option<&Stream> {
        match self {
            Self::Stream(s) => Some(s),
            _ => None,
        }
    }

    /// Return the identifier of a reference.
    pub fn as_reference(&self) -> Option<ObjectId> {
        match self {
            Self::Reference(r) => Some(*r),
            _ => None,
        }
    }

    /// Call `f` for every reference contained in this object, recursively.
    pub fn visit_references(&self, f: &mut impl FnMut(ObjectId)) {
        match self {
            Self::Reference(r) => f(*r),
            Self::Array(a) => a.iter().for_each(|o| o.visit_references(f)),
            Self::Dict(d) => d.iter().for_each(|(_, o)| o.visit_references(f)),
            Self::Stream(s) => s.dict().iter().for_each(|(_, o)| o.visit_references(f)),
            _ => {}
        }
    }
}

impl From<Dict> for Object {
    fn from(value: Dict) -> Self {
        Self::Dict(value)
    }
}

impl From<Name> for Object {
    fn from(value: Name) -> Self {
        Self::Name(value)
    }
}

impl From<ObjectId> for Object {
    fn from(value: ObjectId) -> Self {
        Self::Reference(value)
    }
}

/// Something that can look up indirect objects by their identifier.
pub trait Resolve {
    /// Look up the object with the given identifier. Returns `None` if it does not exist.
    fn resolve_ref(&self, id: ObjectId) -> Option<Cow<'_, Object>>;

    /// Resolve an object if it is a reference, otherwise return it as is.
    /// Dangling references resolve to `null`.
    fn resolve<'a>(&'a self, obj: &'a Object) -> Cow<'a, Object> {
        match obj {
            Object::Reference(id) => self
                .resolve_ref(*id)
                .unwrap_or(Cow::Borrowed(Object::NULL)),
            other => Cow::Borrowed(other),
        }
    }
}

/// A resolver that knows no indirect objects at all.
#[derive(Debug, Default, Copy, Clone)]
pub struct NoResolve;

impl Resolve for NoResolve {
    fn resolve_ref(&self, _: ObjectId) -> Option<Cow<'_, Object>> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::{Dict, Name, NoResolve, Object, ObjectId, ObjectKind, Resolve};

    #[test]
    fn numeric_views() {
        assert_eq!(Object::Integer(3).as_f64(), Some(3.0));
        assert_eq!(Object::Real(4.0).as_i64(), Some(4));
        assert_eq!(Object::Real(4.5).as_i64(), None);
        assert_eq!(Object::Null.as_i64(), None);
    }

    #[test]
    fn kinds() {
        assert_eq!(Object::Array(vec![]).kind(), ObjectKind::Array);
        assert_eq!(Object::Dict(Dict::new()).kind().as_str(), "dictionary");
    }

    #[test]
    fn visit_nested_references() {
        let mut dict = Dict::new();
        dict.insert("Kids", Object::Array(vec![ObjectId::new(3, 0).into(), ObjectId::new(4, 0).into()]));
        dict.insert("Parent", ObjectId::new(1, 0).into());
        dict.insert("Type", Name::from("Pages").into());

        let mut seen = vec![];
        Object::Dict(dict).visit_references(&mut |id| seen.push(id.num));
        assert_eq!(seen, vec![3, 4, 1]);
    }

    #[test]
    fn dangling_resolves_to_null() {
        let r = Object::Reference(ObjectId::new(9, 0));
        assert!(NoResolve.resolve(&r).is_null());
        assert_eq!(NoResolve.resolve(&Object::Integer(1)).as_i64(), Some(1));
    }
}
